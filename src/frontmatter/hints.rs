//! Guesses at the mistake behind a header that does not deserialize.

const LIST_ACTIONS: &[&str] = &["generate", "exec", "inject", "vars"];

fn indent(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn significant<'a>(lines: &'a [&'a str]) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .map(|(index, line)| (index, *line))
}

fn missing_colon_after_action(lines: &[&str]) -> Option<String> {
    significant(lines)
        .map(|(_, line)| line.trim())
        .any(|line| line == "action" || line == "actions")
        .then(|| "You may have forgotten to put a colon after the field 'action'".to_string())
}

fn missing_list_marker(lines: &[&str]) -> Option<String> {
    let entries: Vec<(usize, &str)> = significant(lines).collect();
    for pair in entries.windows(2) {
        let (_, previous) = pair[0];
        let (_, line) = pair[1];
        if previous.trim() != "actions:" || indent(line) < indent(previous) {
            continue;
        }
        let trimmed = line.trim();
        let action = LIST_ACTIONS.iter().find(|name| trimmed.starts_with(&format!("{name}:")));
        if let Some(name) = action {
            return Some(format!(
                "You may have forgotten to add a '-' in front of '{name}' since 'actions' is a YAML list"
            ));
        }
    }
    None
}

fn unquoted_template(lines: &[&str]) -> Option<String> {
    significant(lines)
        .map(|(_, line)| line.trim_start().trim_start_matches("- "))
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            value.trim_start().starts_with("{{").then(|| {
                format!(
                    "The value of '{}' starts with '{{{{' and must be quoted, e.g. \"{{{{name}}}}\"",
                    key.trim()
                )
            })
        })
}

/// The error line falls inside a `data:` block.
fn malformed_vars_data(lines: &[&str], error_line: Option<usize>) -> Option<String> {
    let error_index = error_line?.checked_sub(1)?;
    let mut data_indent = None;
    for (index, line) in significant(lines) {
        if index > error_index {
            break;
        }
        match data_indent {
            Some(level) if indent(line) <= level => data_indent = None,
            _ => {}
        }
        if line.trim() == "data:" {
            data_indent = Some(indent(line));
        }
    }
    data_indent.map(|_| {
        "Entries under 'vars.data' must be 'key: value' pairs nested below 'data:'".to_string()
    })
}

/// Returns the first applicable hint for a header that failed to parse.
/// `error_line` is 1-based within the header.
pub(crate) fn hint_for(header: &str, error_line: Option<usize>) -> Option<String> {
    let lines: Vec<&str> = header.lines().collect();
    missing_colon_after_action(&lines)
        .or_else(|| missing_list_marker(&lines))
        .or_else(|| unquoted_template(&lines))
        .or_else(|| malformed_vars_data(&lines, error_line))
}
