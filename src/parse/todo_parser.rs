use crate::codec::{TzMap, duration, text, timestamp};
use crate::model::alarm::Alarm;
use crate::model::line::{Container, ContainerItem, ContentLine};
use crate::model::todo::{Todo, TodoError};

/// Component name handled by this module
pub const COMPONENT: &str = "VTODO";

/// Shared state handed to every extractor
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    /// Offsets for the `TZID`s the caller knows about
    pub tz: &'a TzMap,
}

pub type Extracted = Result<(), TodoError>;

/// Handler for a tag that may appear at most once
pub type LineHandler = fn(&mut Todo, &ContentLine, &ExtractContext) -> Extracted;

/// Handler for a repeatable tag; receives every match in source order
pub type ItemsHandler = fn(&mut Todo, &[ContainerItem], &ExtractContext) -> Extracted;

#[derive(Debug, Clone, Copy)]
pub enum Handler {
    Single(LineHandler),
    Multiple(ItemsHandler),
}

/// One row of the extraction table
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    pub tag: &'static str,
    pub required: bool,
    pub handler: Handler,
}

const fn single(tag: &'static str, required: bool, f: LineHandler) -> Extractor {
    Extractor {
        tag,
        required,
        handler: Handler::Single(f),
    }
}

/// Extractors in application order. Input order does not matter: each row
/// claims every item with its tag before the next row runs.
pub static EXTRACTORS: &[Extractor] = &[
    single("DTSTAMP", true, extract_dtstamp),
    single("UID", true, extract_uid),
    single("COMPLETED", false, extract_completed),
    single("DESCRIPTION", false, extract_description),
    single("DTSTART", false, extract_start),
    single("LOCATION", false, extract_location),
    single("PERCENT-COMPLETE", false, extract_percent),
    single("PRIORITY", false, extract_priority),
    single("SUMMARY", false, extract_summary),
    single("URL", false, extract_url),
    single("DUE", false, extract_due),
    single("DURATION", false, extract_duration),
    Extractor {
        tag: "VALARM",
        required: false,
        handler: Handler::Multiple(extract_alarms),
    },
];

/// Build a [`Todo`] from a `VTODO` container.
///
/// Items no extractor claims are kept, in order, for output.
pub fn parse_todo(container: &Container, tz: &TzMap) -> Result<Todo, TodoError> {
    if !container.name.eq_ignore_ascii_case(COMPONENT) {
        return Err(TodoError::WrongComponent {
            expected: COMPONENT.to_string(),
            found: container.name.clone(),
        });
    }

    let ctx = ExtractContext { tz };
    let mut remaining = container.clone();
    let mut todo = Todo::new();

    for extractor in EXTRACTORS {
        let items = remaining.take(extractor.tag);
        if items.is_empty() {
            if extractor.required {
                return Err(TodoError::MissingProperty(extractor.tag.to_string()));
            }
            continue;
        }

        match extractor.handler {
            Handler::Single(f) => {
                if items.len() > 1 {
                    return Err(TodoError::DuplicateProperty {
                        component: COMPONENT.to_string(),
                        name: extractor.tag.to_string(),
                    });
                }
                match &items[0] {
                    ContainerItem::Line(line) => f(&mut todo, line, &ctx)?,
                    ContainerItem::Component(_) => {
                        return Err(TodoError::malformed(
                            extractor.tag,
                            "expected a property, found a component",
                        ));
                    }
                }
            }
            Handler::Multiple(f) => f(&mut todo, &items, &ctx)?,
        }
    }

    for item in remaining.items {
        tracing::debug!(tag = item.tag(), "keeping unrecognized VTODO item");
        todo.push_unused(item);
    }

    tracing::debug!(uid = todo.uid(), unused = todo.unused().len(), "extracted todo");
    Ok(todo)
}

impl Todo {
    /// See [`parse_todo`]
    pub fn from_container(container: &Container, tz: &TzMap) -> Result<Todo, TodoError> {
        parse_todo(container, tz)
    }
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

fn decode_timestamp(
    line: &ContentLine,
    ctx: &ExtractContext<'_>,
) -> Result<timestamp::Timestamp, TodoError> {
    timestamp::decode(line, ctx.tz).map_err(|e| TodoError::malformed(&line.name, e))
}

/// Parse an integer property and check it against `[0, max]`
fn bounded_int(line: &ContentLine, max: u8) -> Result<u8, TodoError> {
    let value: i64 = line
        .value
        .trim()
        .parse()
        .map_err(|_| TodoError::malformed(&line.name, format!("not an integer: {}", line.value)))?;
    if !(0..=i64::from(max)).contains(&value) {
        return Err(TodoError::malformed(
            &line.name,
            format!("{} must be in [0, {}], got {}", line.name, max, value),
        ));
    }
    Ok(value as u8)
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

// DTSTAMP is read into `created`; there is no separate CREATED extractor.
fn extract_dtstamp(todo: &mut Todo, line: &ContentLine, ctx: &ExtractContext) -> Extracted {
    todo.created = Some(decode_timestamp(line, ctx)?);
    Ok(())
}

fn extract_uid(todo: &mut Todo, line: &ContentLine, _: &ExtractContext) -> Extracted {
    todo.set_uid(line.value.clone());
    Ok(())
}

fn extract_completed(todo: &mut Todo, line: &ContentLine, ctx: &ExtractContext) -> Extracted {
    todo.completed = Some(decode_timestamp(line, ctx)?);
    Ok(())
}

fn extract_description(todo: &mut Todo, line: &ContentLine, _: &ExtractContext) -> Extracted {
    todo.description = Some(text::unescape(&line.value));
    Ok(())
}

fn extract_start(todo: &mut Todo, line: &ContentLine, ctx: &ExtractContext) -> Extracted {
    let begin = decode_timestamp(line, ctx)?;
    todo.set_begin(Some(begin))
        .map_err(|e| TodoError::malformed(&line.name, e))
}

fn extract_location(todo: &mut Todo, line: &ContentLine, _: &ExtractContext) -> Extracted {
    todo.location = Some(text::unescape(&line.value));
    Ok(())
}

fn extract_percent(todo: &mut Todo, line: &ContentLine, _: &ExtractContext) -> Extracted {
    let percent = bounded_int(line, 100)?;
    todo.set_percent(Some(percent))
        .map_err(|e| TodoError::malformed(&line.name, e))
}

fn extract_priority(todo: &mut Todo, line: &ContentLine, _: &ExtractContext) -> Extracted {
    let priority = bounded_int(line, 9)?;
    todo.set_priority(Some(priority))
        .map_err(|e| TodoError::malformed(&line.name, e))
}

fn extract_summary(todo: &mut Todo, line: &ContentLine, _: &ExtractContext) -> Extracted {
    todo.name = Some(text::unescape(&line.value));
    Ok(())
}

fn extract_url(todo: &mut Todo, line: &ContentLine, _: &ExtractContext) -> Extracted {
    todo.url = Some(text::unescape(&line.value));
    Ok(())
}

// DUE and DURATION are stored directly: a DUE earlier than DTSTART is
// accepted here even though `set_due` would refuse it.
fn extract_due(todo: &mut Todo, line: &ContentLine, ctx: &ExtractContext) -> Extracted {
    if todo.explicit_duration().is_some() {
        return Err(TodoError::malformed(&line.name, "a todo can't have both DUE and DURATION"));
    }
    let due = decode_timestamp(line, ctx)?;
    todo.put_due_time(Some(due));
    Ok(())
}

fn extract_duration(todo: &mut Todo, line: &ContentLine, _: &ExtractContext) -> Extracted {
    if todo.due_time().is_some() {
        return Err(TodoError::malformed(&line.name, "a todo can't have both DUE and DURATION"));
    }
    let span = duration::decode(&line.value).map_err(|e| TodoError::malformed(&line.name, e))?;
    todo.put_duration(Some(span));
    Ok(())
}

fn extract_alarms(todo: &mut Todo, items: &[ContainerItem], _: &ExtractContext) -> Extracted {
    let alarms = items
        .iter()
        .map(|item| match item {
            ContainerItem::Component(c) => {
                Alarm::from_container(c).map_err(|e| TodoError::malformed("VALARM", e))
            }
            ContainerItem::Line(_) => Err(TodoError::malformed(
                "VALARM",
                "expected a component, found a property",
            )),
        })
        .collect::<Result<Vec<Alarm>, TodoError>>()?;
    todo.alarms = alarms;
    Ok(())
}
