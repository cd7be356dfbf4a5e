//! Logical line assembly.
//!
//! Records are processed line by line after CRLF normalization. A trailing
//! backslash joins the next physical line, and `#` starts a comment unless
//! it sits inside a quoted region.

/// Assemble logical lines from raw record text.
///
/// Returns each logical line paired with the 1-based number of its first
/// physical line, so parse errors can point at the right place.
pub fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let normalized = content.replace("\r\n", "\n");
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, raw) in normalized.split('\n').enumerate() {
        let line_no = index + 1;
        let (start, mut buffer) = match pending.take() {
            Some((start, buffer)) => (start, buffer),
            None => (line_no, String::new()),
        };
        buffer.push_str(raw);

        if ends_with_continuation(&buffer) {
            buffer.pop();
            pending = Some((start, buffer));
            continue;
        }

        let stripped = strip_comment(&buffer);
        if !stripped.trim().is_empty() {
            lines.push((start, stripped.trim_end().to_string()));
        }
    }

    // Trailing continuation with no following line still yields content.
    if let Some((start, buffer)) = pending {
        let stripped = strip_comment(&buffer);
        if !stripped.trim().is_empty() {
            lines.push((start, stripped.trim_end().to_string()));
        }
    }

    lines
}

/// A line continues when it ends with an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
    trailing % 2 == 1
}

/// Drop everything from the first unquoted `#`.
fn strip_comment(line: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double => return &line[..index],
            _ => {},
        }
    }
    line
}
