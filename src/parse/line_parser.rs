use crate::model::line::{Container, ContentLine};

/// Error type for reading property-line text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("line {line}: missing ':' before the value")]
    MissingValue { line: usize },
    #[error("line {line}: empty property name")]
    EmptyName { line: usize },
    #[error("line {line}: parameter without '='")]
    MissingParamValue { line: usize },
    #[error("line {line}: unterminated quoted parameter value")]
    UnterminatedQuote { line: usize },
    #[error("line {line}: END:{found} does not close BEGIN:{expected}")]
    MismatchedEnd {
        line: usize,
        expected: String,
        found: String,
    },
    #[error("line {line}: END:{name} without a matching BEGIN")]
    UnexpectedEnd { line: usize, name: String },
    #[error("line {line}: property outside of any component")]
    OrphanProperty { line: usize },
    #[error("component {0} is never closed")]
    Unterminated(String),
}

/// Join folded continuation lines (starting with a space or tab) onto the
/// line before them. Returns each logical line with its 1-based starting
/// line number; blank lines are dropped.
pub fn unfold(text: &str) -> Vec<(usize, String)> {
    let mut out: Vec<(usize, String)> = Vec::new();
    for (idx, raw) in text.split('\n').enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(rest) = raw.strip_prefix([' ', '\t'])
            && let Some((_, last)) = out.last_mut()
        {
            last.push_str(rest);
            continue;
        }
        if raw.trim().is_empty() {
            continue;
        }
        out.push((idx + 1, raw.to_string()));
    }
    out
}

/// Parse one unfolded content line: `NAME *(;PARAM=value *(,value)) :value`
pub fn parse_content_line(s: &str, line_no: usize) -> Result<ContentLine, LineError> {
    let name_end = s
        .find([';', ':'])
        .ok_or(LineError::MissingValue { line: line_no })?;
    let name = s[..name_end].trim();
    if name.is_empty() {
        return Err(LineError::EmptyName { line: line_no });
    }

    let mut line = ContentLine::new(name, "");
    let mut rest = &s[name_end..];

    while let Some(after) = rest.strip_prefix(';') {
        let eq = after
            .find(['=', ':', ';'])
            .filter(|i| after.as_bytes()[*i] == b'=')
            .ok_or(LineError::MissingParamValue { line: line_no })?;
        let param_name = after[..eq].trim().to_ascii_uppercase();

        let mut values = Vec::new();
        let mut cursor = &after[eq + 1..];
        loop {
            let (value, remaining) = if let Some(quoted) = cursor.strip_prefix('"') {
                let close = quoted
                    .find('"')
                    .ok_or(LineError::UnterminatedQuote { line: line_no })?;
                (&quoted[..close], &quoted[close + 1..])
            } else {
                let end = cursor
                    .find([',', ';', ':'])
                    .ok_or(LineError::MissingValue { line: line_no })?;
                (&cursor[..end], &cursor[end..])
            };
            values.push(value.to_string());
            match remaining.strip_prefix(',') {
                Some(next) => cursor = next,
                None => {
                    rest = remaining;
                    break;
                }
            }
        }
        line.params.insert(param_name, values);
    }

    line.value = rest
        .strip_prefix(':')
        .ok_or(LineError::MissingValue { line: line_no })?
        .to_string();
    Ok(line)
}

/// Parse text into its top-level components, nesting `BEGIN`/`END` blocks.
pub fn parse_components(text: &str) -> Result<Vec<Container>, LineError> {
    let mut roots = Vec::new();
    let mut stack: Vec<Container> = Vec::new();

    for (line_no, raw) in unfold(text) {
        let line = parse_content_line(&raw, line_no)?;
        match line.name.as_str() {
            "BEGIN" => stack.push(Container::new(line.value.trim())),
            "END" => {
                let name = line.value.trim().to_ascii_uppercase();
                let Some(done) = stack.pop() else {
                    return Err(LineError::UnexpectedEnd { line: line_no, name });
                };
                if done.name != name {
                    return Err(LineError::MismatchedEnd {
                        line: line_no,
                        expected: done.name,
                        found: name,
                    });
                }
                match stack.last_mut() {
                    Some(parent) => parent.push_component(done),
                    None => roots.push(done),
                }
            }
            _ => match stack.last_mut() {
                Some(current) => current.push_line(line),
                None => return Err(LineError::OrphanProperty { line: line_no }),
            },
        }
    }

    if let Some(open) = stack.pop() {
        return Err(LineError::Unterminated(open.name));
    }
    Ok(roots)
}

/// Collect every component named `name`, at any depth, in document order
pub fn find_components<'a>(roots: &'a [Container], name: &str) -> Vec<&'a Container> {
    fn walk<'a>(container: &'a Container, name: &str, out: &mut Vec<&'a Container>) {
        if container.name.eq_ignore_ascii_case(name) {
            out.push(container);
            return;
        }
        for child in container.components() {
            walk(child, name, out);
        }
    }

    let mut out = Vec::new();
    for root in roots {
        walk(root, name, &mut out);
    }
    out
}
