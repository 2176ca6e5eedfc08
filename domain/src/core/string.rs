//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Find the first fenced code block tagged with one of `tags` and return its body.
///
/// A fence opens with a line whose trimmed text is ```` ```tag ```` and closes on
/// the next line that trims to ```` ``` ```` (an optional `<end_code>` suffix is
/// tolerated).
pub fn fenced_block<'a>(text: &'a str, tags: &[&str]) -> Option<&'a str> {
    let mut offset = 0;
    let mut body_start: Option<usize> = None;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        match body_start {
            None => {
                if let Some(tag) = trimmed.strip_prefix("```")
                    && tags.contains(&tag.trim())
                {
                    body_start = Some(offset + line.len());
                }
            }
            Some(start) => {
                let closing = trimmed.trim_end_matches("<end_code>");
                if closing == "```" {
                    return Some(&text[start..offset]);
                }
            }
        }
        offset += line.len();
    }

    None
}
