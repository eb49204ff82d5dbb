/// Backslash-escape a free-text value for output
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`]. Unknown escape sequences are kept verbatim.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some('r' | 'R') => out.push('\r'),
            Some(';') => out.push(';'),
            Some(',') => out.push(','),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_specials() {
        assert_eq!(escape("a;b,c\\d\ne"), "a\\;b\\,c\\\\d\\ne");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_unescape_specials() {
        assert_eq!(unescape("a\\;b\\,c\\\\d\\ne\\Nf"), "a;b,c\\d\ne\nf");
    }

    #[test]
    fn test_unescape_is_single_pass() {
        // `\\n` is an escaped backslash followed by a literal n
        assert_eq!(unescape("\\\\n"), "\\n");
    }

    #[test]
    fn test_unescape_keeps_unknown_and_trailing() {
        assert_eq!(unescape("C:\\temp"), "C:\\temp");
        assert_eq!(unescape("end\\"), "end\\");
    }
}
