//! Cleanup of model output before it is treated as code.

const ZERO_WIDTH: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];
const STREAM_CURSOR: char = '\u{258C}';
const WRAPPER_TAGS: [&str; 4] = ["details", "summary", "pre", "code"];

/// Strip markdown fences, HTML wrapper tags, zero-width characters and
/// channel markers such as `<|channel|>`, collapse blank-line runs and trim.
///
/// Every rule only deletes text, so repeating the pass reaches a fixed point
/// and `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn sanitize_once(input: &str) -> String {
    let text: String = input
        .chars()
        .filter(|c| !ZERO_WIDTH.contains(c) && *c != STREAM_CURSOR)
        .collect();
    let text = strip_fences(&text);
    let text = strip_wrapper_tags(&text);
    let text = strip_markers(&text);
    collapse_blank_lines(&text).trim().to_string()
}

/// Remove "```" together with a following language hint and newline.
fn strip_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 3..];
        let hint_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(after.len());
        let after = &after[hint_len..];
        rest = after.strip_prefix('\n').unwrap_or(after);
    }
    out.push_str(rest);
    out
}

/// Remove `<details ...>`, `</code>` and friends, keeping their content.
fn strip_wrapper_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tag = &rest[pos + 1..];
        let name = tag.strip_prefix('/').unwrap_or(tag);
        let is_wrapper = WRAPPER_TAGS.iter().any(|t| name.starts_with(t));
        match tag.find('>') {
            Some(end) if is_wrapper => rest = &tag[end + 1..],
            _ => {
                out.push('<');
                rest = tag;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Length of a `<|name|>` marker at the start of `text`, if any.
fn marker_len(text: &str) -> Option<usize> {
    let inner = text.strip_prefix("<|")?;
    let name_len = inner.find(['|', '>'])?;
    if name_len == 0 || !inner[name_len..].starts_with("|>") {
        return None;
    }
    Some(2 + name_len + 2)
}

/// Blank out lines that start with a marker, then drop inline markers.
fn strip_markers(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| {
            if marker_len(line.trim_start()).is_some() {
                ""
            } else {
                line
            }
        })
        .collect();
    let joined = lines.join("\n");

    let mut out = String::with_capacity(joined.len());
    let mut rest = joined.as_str();
    while let Some(pos) = rest.find("<|") {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match marker_len(candidate) {
            Some(len) => rest = &candidate[len..],
            None => {
                out.push_str("<|");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Runs of three or more newlines become one blank line.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(c);
            }
        } else {
            newlines = 0;
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[path = "sanitize_tests.rs"]
mod tests;
