use log::warn;
use regex::Regex;

// Re-export all the case conversion and string manipulation functions
pub use cruet::{
    case::{
        camel::to_camel_case, kebab::to_kebab_case, pascal::to_pascal_case,
        screaming_snake::to_screaming_snake_case, snake::to_snake_case,
        table::to_table_case, train::to_train_case,
    },
    string::{pluralize::to_plural, singularize::to_singular},
    suffix::foreign_key::to_foreign_key,
};

/// Tests if a string matches a given regular expression pattern.
///
/// An invalid pattern is logged and treated as a non-match.
pub fn regex_filter(val: &str, re: &str) -> bool {
    match Regex::new(re) {
        Ok(re) => re.is_match(val),
        Err(err) => {
            warn!("Invalid regex '{re}': {err}");
            false
        }
    }
}

/// Upper-cases the first character and leaves the rest untouched.
pub fn capitalize_first(val: &str) -> String {
    let mut chars = val.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-cases the first character and leaves the rest untouched.
pub fn uncapitalize_first(val: &str) -> String {
    let mut chars = val.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_filter_matches() {
        assert!(regex_filter("hello123", r"hello\d+"));
    }

    #[test]
    fn test_regex_filter_invalid_regex() {
        assert!(!regex_filter("anything", r"([unclosed"));
    }

    #[test]
    fn capitalizes_only_the_first_character() {
        assert_eq!(capitalize_first("helloWorld"), "HelloWorld");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(uncapitalize_first("HelloWorld"), "helloWorld");
    }
}
