//! Docstring normalization.
//!
//! Every rendering passes through [`clean`] so output does not depend on how
//! documentation text was indented where it was declared.

/// Removes the margin shared by all non-blank lines.
///
/// Lines holding only spaces and tabs are emptied first and do not take part
/// in computing the margin.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| if is_blank(line) { "" } else { line })
        .collect();

    let mut margin: Option<&str> = None;
    for line in lines.iter().filter(|line| !line.is_empty()) {
        let indent = leading_whitespace(line);
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }

    let margin = margin.unwrap_or("");
    lines
        .iter()
        .map(|line| line.strip_prefix(margin).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Dedents `text`, dedents everything after the first line on its own, and
/// collapses runs of three or more newlines to two.
pub fn clean(text: &str) -> String {
    let dedented = dedent(text);
    let joined = match dedented.split_once('\n') {
        Some((first, rest)) => {
            let rest = dedent(rest);
            if rest.is_empty() {
                first.to_string()
            } else {
                format!("{first}\n{rest}")
            }
        }
        None => dedented,
    };
    collapse_blank_lines(joined)
}

pub fn collapse_blank_lines(mut text: String) -> String {
    while text.contains("\n\n\n") {
        text = text.replace("\n\n\n", "\n\n");
    }
    text
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|ch| ch == ' ' || ch == '\t')
}

fn leading_whitespace(line: &str) -> &str {
    let content = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - content.len()]
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(left, right)| left == right)
        .count();
    &a[..len]
}
