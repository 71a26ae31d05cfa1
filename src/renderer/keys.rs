//! Kebab-case model keys such as `root-package-dir` are not valid identifiers
//! in template expressions, where they would parse as subtraction. Before a
//! template or expression is compiled, every hyphenated name that is a model
//! key is rewritten into a `model["…"]` lookup. Names inside string literals
//! and attribute accesses (`x.some-name`) are left alone.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}").expect("tag pattern is valid")
});

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|[A-Za-z_][A-Za-z0-9_]*(?:-[A-Za-z0-9_]+)+"#,
    )
    .expect("token pattern is valid")
});

/// Rewrites hyphenated model keys inside a single expression.
pub fn rewrite_expression<'a>(expr: &'a str, is_key: &dyn Fn(&str) -> bool) -> Cow<'a, str> {
    let mut out = String::new();
    let mut last = 0;

    for found in TOKEN.find_iter(expr) {
        let token = found.as_str();
        if token.starts_with('\'') || token.starts_with('"') {
            continue;
        }
        let is_attribute = expr[..found.start()].trim_end().ends_with('.');
        if is_attribute || !is_key(token) {
            continue;
        }
        out.push_str(&expr[last..found.start()]);
        out.push_str("model[\"");
        out.push_str(token);
        out.push_str("\"]");
        last = found.end();
    }

    if last == 0 {
        return Cow::Borrowed(expr);
    }
    out.push_str(&expr[last..]);
    Cow::Owned(out)
}

/// Rewrites hyphenated model keys inside every `{{ … }}` and `{% … %}` tag.
/// Literal text outside tags is never touched.
pub fn rewrite_template<'a>(template: &'a str, is_key: &dyn Fn(&str) -> bool) -> Cow<'a, str> {
    let mut out = String::new();
    let mut last = 0;
    let mut changed = false;

    for tag in TAG.find_iter(template) {
        if let Cow::Owned(rewritten) = rewrite_expression(tag.as_str(), is_key) {
            out.push_str(&template[last..tag.start()]);
            out.push_str(&rewritten);
            last = tag.end();
            changed = true;
        }
    }

    if !changed {
        return Cow::Borrowed(template);
    }
    out.push_str(&template[last..]);
    Cow::Owned(out)
}
