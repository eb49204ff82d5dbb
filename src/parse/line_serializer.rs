use crate::model::line::Container;

/// Longest physical line, in octets, before folding
pub const FOLD_WIDTH: usize = 75;

/// Split a logical line into physical lines of at most [`FOLD_WIDTH`]
/// octets. Continuation lines start with a single space, which counts
/// toward their width. Splits never fall inside a UTF-8 sequence.
pub fn fold_line(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for ch in line.chars() {
        if current.len() + ch.len_utf8() > FOLD_WIDTH {
            out.push(std::mem::take(&mut current));
            current.push(' ');
        }
        current.push(ch);
    }
    out.push(current);
    out
}

/// Render components as CRLF-terminated, folded text
pub fn serialize_components(components: &[Container]) -> String {
    let mut out = String::new();
    for component in components {
        for line in component.to_lines() {
            for physical in fold_line(&line) {
                out.push_str(&physical);
                out.push_str("\r\n");
            }
        }
    }
    out
}
