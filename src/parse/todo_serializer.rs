use crate::codec::{duration, text, timestamp, uid};
use crate::model::line::{Container, ContentLine};
use crate::model::todo::Todo;
use crate::parse::todo_parser::COMPONENT;

/// Appends zero or more items for one property
pub type OutputFn = fn(&Todo, &mut Container);

/// One row of the output table
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub tag: &'static str,
    pub write: OutputFn,
}

const fn output(tag: &'static str, write: OutputFn) -> Output {
    Output { tag, write }
}

/// Output producers in emission order
pub static OUTPUTS: &[Output] = &[
    output("UID", output_uid),
    output("COMPLETED", output_completed),
    output("DTSTAMP", output_created),
    output("DESCRIPTION", output_description),
    output("DTSTART", output_start),
    output("LOCATION", output_location),
    output("PERCENT-COMPLETE", output_percent),
    output("PRIORITY", output_priority),
    output("SUMMARY", output_summary),
    output("URL", output_url),
    output("DUE", output_due),
    output("DURATION", output_duration),
    output("VALARM", output_alarms),
];

/// Serialize a todo to a `VTODO` container: every producer in table order,
/// then the unused source items verbatim.
pub fn serialize_todo(todo: &Todo) -> Container {
    let mut container = Container::new(COMPONENT);
    for output in OUTPUTS {
        (output.write)(todo, &mut container);
    }
    container.items.extend(todo.unused().iter().cloned());
    tracing::debug!(uid = todo.uid(), items = container.len(), "serialized todo");
    container
}

impl Todo {
    /// See [`serialize_todo`]
    pub fn to_container(&self) -> Container {
        serialize_todo(self)
    }
}

fn push_text(container: &mut Container, name: &str, value: Option<&String>) {
    if let Some(value) = value {
        container.push_line(ContentLine::new(name, text::escape(value)));
    }
}

fn output_uid(todo: &Todo, container: &mut Container) {
    let value = if todo.uid().is_empty() {
        uid::generate()
    } else {
        todo.uid().to_string()
    };
    container.push_line(ContentLine::new("UID", value));
}

// A missing completion time is stamped with the current instant.
fn output_completed(todo: &Todo, container: &mut Container) {
    let instant = todo.completed.unwrap_or_else(timestamp::now);
    container.push_line(ContentLine::new("COMPLETED", timestamp::encode(&instant)));
}

// `created` goes out as DTSTAMP, mirroring extraction.
fn output_created(todo: &Todo, container: &mut Container) {
    let instant = todo.created.unwrap_or_else(timestamp::now);
    container.push_line(ContentLine::new("DTSTAMP", timestamp::encode(&instant)));
}

fn output_description(todo: &Todo, container: &mut Container) {
    push_text(container, "DESCRIPTION", todo.description.as_ref());
}

fn output_start(todo: &Todo, container: &mut Container) {
    if let Some(begin) = todo.begin() {
        container.push_line(ContentLine::new("DTSTART", timestamp::encode(&begin)));
    }
}

fn output_location(todo: &Todo, container: &mut Container) {
    push_text(container, "LOCATION", todo.location.as_ref());
}

fn output_percent(todo: &Todo, container: &mut Container) {
    if let Some(percent) = todo.percent().filter(|p| *p != 0) {
        container.push_line(ContentLine::new("PERCENT-COMPLETE", percent.to_string()));
    }
}

fn output_priority(todo: &Todo, container: &mut Container) {
    if let Some(priority) = todo.priority().filter(|p| *p != 0) {
        container.push_line(ContentLine::new("PRIORITY", priority.to_string()));
    }
}

fn output_summary(todo: &Todo, container: &mut Container) {
    push_text(container, "SUMMARY", todo.name.as_ref());
}

fn output_url(todo: &Todo, container: &mut Container) {
    push_text(container, "URL", todo.url.as_ref());
}

fn output_due(todo: &Todo, container: &mut Container) {
    if let Some(due) = todo.due_time() {
        container.push_line(ContentLine::new("DUE", timestamp::encode(&due)));
    }
}

fn output_duration(todo: &Todo, container: &mut Container) {
    if let (Some(span), Some(_)) = (todo.explicit_duration(), todo.begin()) {
        container.push_line(ContentLine::new("DURATION", duration::encode(span)));
    }
}

fn output_alarms(todo: &Todo, container: &mut Container) {
    for alarm in &todo.alarms {
        container.push_component(alarm.to_container());
    }
}
