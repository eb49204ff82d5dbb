use serde::Serialize;

use crate::codec::{duration, timestamp};
use crate::model::alarm::Alarm;
use crate::model::todo::Todo;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TodoJson {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alarms: Vec<AlarmJson>,
    /// Number of properties kept verbatim
    #[serde(skip_serializing_if = "is_zero")]
    pub unused: usize,
}

#[derive(Serialize)]
pub struct AlarmJson {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

#[derive(Serialize)]
pub struct CheckJson {
    pub total: usize,
    pub valid: usize,
    pub failures: Vec<CheckFailureJson>,
}

#[derive(Serialize)]
pub struct CheckFailureJson {
    /// 1-based position of the VTODO in the file
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub error: String,
}

#[derive(Serialize)]
pub struct OverlapJson {
    pub first: String,
    pub second: String,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn todo_to_json(todo: &Todo) -> TodoJson {
    TodoJson {
        uid: todo.uid().to_string(),
        name: todo.name.clone(),
        description: todo.description.clone(),
        location: todo.location.clone(),
        url: todo.url.clone(),
        begin: todo.begin().map(|t| t.to_rfc3339()),
        due: todo.due().map(|t| t.to_rfc3339()),
        duration: todo.duration().map(duration::encode),
        percent: todo.percent(),
        priority: todo.priority(),
        created: todo.created.map(|t| t.to_rfc3339()),
        completed: todo.completed.map(|t| t.to_rfc3339()),
        alarms: todo.alarms.iter().map(alarm_to_json).collect(),
        unused: todo.unused().len(),
    }
}

pub fn alarm_to_json(alarm: &Alarm) -> AlarmJson {
    AlarmJson {
        action: alarm.action().as_str().to_string(),
        trigger: alarm.trigger().map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One line per todo: due (or `-`), priority, name, uid
pub fn format_todo_line(todo: &Todo) -> String {
    let due = todo
        .due()
        .map_or_else(|| "-".to_string(), |d| timestamp::encode(&d));
    let priority = match todo.priority() {
        Some(p) if p > 0 => format!("P{}", p),
        _ => "  ".to_string(),
    };
    let name = todo.name.as_deref().unwrap_or("(unnamed)");
    format!("{:<16}  {}  {}  [{}]", due, priority, name, todo.uid())
}

/// Short label used in pair listings
pub fn todo_label(todo: &Todo) -> String {
    match &todo.name {
        Some(name) => format!("{} ({})", todo.uid(), name),
        None => todo.uid().to_string(),
    }
}
