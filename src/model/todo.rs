use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::BitXor;

use chrono::TimeDelta;

use crate::codec::{DurationParts, Timestamp, uid};
use crate::model::alarm::Alarm;
use crate::model::line::ContainerItem;

/// Error type for todo construction, mutation and extraction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("invalid construction: {0}")]
    InvalidConstruction(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("malformed {name}: {reason}")]
    MalformedProperty { name: String, reason: String },
    #[error("missing required property {0}")]
    MissingProperty(String),
    #[error("a {component} must have at most one {name}")]
    DuplicateProperty { component: String, name: String },
    #[error("expected a {expected} component, found {found}")]
    WrongComponent { expected: String, found: String },
    #[error("cannot compare Todo and {0}")]
    TypeMismatch(String),
}

impl TodoError {
    pub(crate) fn malformed(name: &str, reason: impl fmt::Display) -> TodoError {
        TodoError::MalformedProperty {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    fn into_construction(self) -> TodoError {
        match self {
            TodoError::InvalidState(msg) => TodoError::InvalidConstruction(msg),
            other => other,
        }
    }
}

/// A calendar to-do entry (`VTODO`).
///
/// The time model is a start (`begin`) plus either an explicit due time or
/// a duration, never both. Those three fields are private and only change
/// through the setters below, which keep them consistent:
///
/// - setting a due time clears the duration and vice versa;
/// - an explicit due time is never before `begin`;
/// - a duration can only be set once `begin` is.
///
/// Equality and hashing use the `uid` alone.
#[derive(Debug, Clone)]
pub struct Todo {
    uid: String,
    /// Taken from (and written back to) `DTSTAMP`
    pub created: Option<Timestamp>,
    pub completed: Option<Timestamp>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// `SUMMARY`
    pub name: Option<String>,
    pub url: Option<String>,
    percent: Option<u8>,
    priority: Option<u8>,
    begin: Option<Timestamp>,
    due_time: Option<Timestamp>,
    duration: Option<TimeDelta>,
    /// Every `VALARM`, in source order; identical alarms are kept apart
    pub alarms: Vec<Alarm>,
    /// Items no extractor claimed, in source order
    unused: Vec<ContainerItem>,
}

impl Todo {
    /// An empty todo with a freshly generated uid
    pub fn new() -> Self {
        Todo {
            uid: uid::generate(),
            created: None,
            completed: None,
            description: None,
            location: None,
            name: None,
            url: None,
            percent: None,
            priority: None,
            begin: None,
            due_time: None,
            duration: None,
            alarms: Vec::new(),
            unused: Vec::new(),
        }
    }

    pub fn builder() -> TodoBuilder {
        TodoBuilder::default()
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn set_uid(&mut self, uid: impl Into<String>) {
        self.uid = uid.into();
    }

    /// `PERCENT-COMPLETE`, 0 to 100
    pub fn percent(&self) -> Option<u8> {
        self.percent
    }

    pub fn set_percent(&mut self, value: Option<u8>) -> Result<(), TodoError> {
        if let Some(p) = value
            && p > 100
        {
            return Err(TodoError::InvalidState(format!(
                "percent must be in [0, 100], got {}",
                p
            )));
        }
        self.percent = value;
        Ok(())
    }

    /// `PRIORITY`, 0 to 9
    pub fn priority(&self) -> Option<u8> {
        self.priority
    }

    pub fn set_priority(&mut self, value: Option<u8>) -> Result<(), TodoError> {
        if let Some(p) = value
            && p > 9
        {
            return Err(TodoError::InvalidState(format!(
                "priority must be in [0, 9], got {}",
                p
            )));
        }
        self.priority = value;
        Ok(())
    }

    pub fn begin(&self) -> Option<Timestamp> {
        self.begin
    }

    /// Set the start. Only checked against an explicit due time: with a
    /// duration the due moves along with `begin`.
    ///
    /// Clearing the start of a duration-based todo is allowed. The duration
    /// is kept, but `due()` becomes `None` and DURATION is no longer written
    /// until a start is set again.
    pub fn set_begin(&mut self, value: Option<Timestamp>) -> Result<(), TodoError> {
        if let (Some(begin), Some(due)) = (value, self.due_time)
            && begin > due
        {
            return Err(TodoError::InvalidState(
                "begin must be before due time".to_string(),
            ));
        }
        self.begin = value;
        Ok(())
    }

    /// `begin + duration` when a duration is set, else the explicit due time.
    pub fn due(&self) -> Option<Timestamp> {
        match self.duration {
            Some(duration) => self
                .begin
                .and_then(|begin| begin.checked_add_signed(duration)),
            None => self.due_time,
        }
    }

    /// Set an explicit due time. A non-empty value replaces any duration.
    ///
    /// Clearing the due time leaves `begin` untouched.
    pub fn set_due(&mut self, value: Option<Timestamp>) -> Result<(), TodoError> {
        if let (Some(due), Some(begin)) = (value, self.begin)
            && due < begin
        {
            return Err(TodoError::InvalidState(
                "due must be after begin".to_string(),
            ));
        }
        self.due_time = value;
        if value.is_some() {
            self.duration = None;
        }
        Ok(())
    }

    /// The stored duration, or `due - begin` when both ends are known.
    pub fn duration(&self) -> Option<TimeDelta> {
        if self.duration.is_some() {
            return self.duration;
        }
        match (self.due(), self.begin) {
            (Some(due), Some(begin)) => Some(due - begin),
            _ => None,
        }
    }

    /// Set a duration. A non-empty value replaces any explicit due time and
    /// requires `begin` to be set.
    pub fn set_duration(&mut self, value: Option<TimeDelta>) -> Result<(), TodoError> {
        if value.is_some() && self.begin.is_none() {
            return Err(TodoError::InvalidState(
                "a duration requires a begin".to_string(),
            ));
        }
        self.duration = value;
        if value.is_some() {
            self.due_time = None;
        }
        Ok(())
    }

    /// [`Todo::set_duration`] from structured components
    pub fn set_duration_parts(&mut self, parts: DurationParts) -> Result<(), TodoError> {
        let delta = TimeDelta::try_from(parts)
            .map_err(|e| TodoError::InvalidState(e.to_string()))?;
        self.set_duration(Some(delta))
    }

    /// The explicit due time, `None` when the due is duration-based
    pub fn due_time(&self) -> Option<Timestamp> {
        self.due_time
    }

    /// The explicit duration, `None` when the due is time-based
    pub fn explicit_duration(&self) -> Option<TimeDelta> {
        self.duration
    }

    /// Lines and components kept verbatim from the source container
    pub fn unused(&self) -> &[ContainerItem] {
        &self.unused
    }

    // Extraction stores DUE and DURATION as found, without the setter checks.
    pub(crate) fn put_due_time(&mut self, value: Option<Timestamp>) {
        self.due_time = value;
    }

    pub(crate) fn put_duration(&mut self, value: Option<TimeDelta>) {
        self.duration = value;
    }

    pub(crate) fn push_unused(&mut self, item: ContainerItem) {
        self.unused.push(item);
    }

    // -----------------------------------------------------------------------
    // Time relations
    // -----------------------------------------------------------------------

    /// True if this todo's begin lies inside `other`'s `[begin, due]` window
    pub fn starts_within(&self, other: &Todo) -> bool {
        match (self.begin, other.begin, other.due()) {
            (Some(begin), Some(start), Some(end)) => start <= begin && begin <= end,
            _ => false,
        }
    }

    /// True if this todo's due lies inside `other`'s `[begin, due]` window
    pub fn due_within(&self, other: &Todo) -> bool {
        match (self.due(), other.begin, other.due()) {
            (Some(due), Some(start), Some(end)) => start <= due && due <= end,
            _ => false,
        }
    }

    /// True if either todo starts or ends within the other. Also `&a ^ &b`.
    pub fn intersects(&self, other: &Todo) -> bool {
        self.starts_within(other)
            || self.due_within(other)
            || other.starts_within(self)
            || other.due_within(self)
    }

    /// Compare times only: due alone if either lacks a begin, begin alone if
    /// either lacks a due, otherwise both.
    pub fn time_equals(&self, other: &Todo) -> bool {
        let (due, other_due) = (self.due(), other.due());
        if self.begin.is_none() || other.begin.is_none() {
            matches!((due, other_due), (Some(a), Some(b)) if a == b)
        } else if due.is_none() || other_due.is_none() {
            self.begin == other.begin
        } else {
            self.begin == other.begin && due == other_due
        }
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    /// Order by due, todos without a due first. Two todos without a due
    /// fall back to their names, unnamed first.
    ///
    /// This is unrelated to `==`, which compares uids: two different todos
    /// can be `Equal` here.
    pub fn schedule_cmp(&self, other: &Todo) -> Ordering {
        match (self.due(), other.due()) {
            (None, None) => self.name.cmp(&other.name),
            (a, b) => a.cmp(&b),
        }
    }

    fn relate(&self, other: Operand<'_>) -> Result<Ordering, TodoError> {
        match other {
            Operand::Todo(todo) => Ok(self.schedule_cmp(todo)),
            Operand::Instant(instant) => Ok(self.due().cmp(&Some(instant))),
            Operand::Unsupported(type_name) => Err(TodoError::TypeMismatch(type_name.to_string())),
        }
    }

    pub fn try_lt<'a>(&self, other: impl Into<Operand<'a>>) -> Result<bool, TodoError> {
        Ok(self.relate(other.into())? == Ordering::Less)
    }

    pub fn try_le<'a>(&self, other: impl Into<Operand<'a>>) -> Result<bool, TodoError> {
        Ok(self.relate(other.into())? != Ordering::Greater)
    }

    pub fn try_gt<'a>(&self, other: impl Into<Operand<'a>>) -> Result<bool, TodoError> {
        Ok(self.relate(other.into())? == Ordering::Greater)
    }

    pub fn try_ge<'a>(&self, other: impl Into<Operand<'a>>) -> Result<bool, TodoError> {
        Ok(self.relate(other.into())? != Ordering::Less)
    }

    /// Uid equality; anything but another todo is a `TypeMismatch`
    pub fn try_eq<'a>(&self, other: impl Into<Operand<'a>>) -> Result<bool, TodoError> {
        match other.into() {
            Operand::Todo(todo) => Ok(self == todo),
            Operand::Instant(_) => Err(TodoError::TypeMismatch(
                std::any::type_name::<Timestamp>().to_string(),
            )),
            Operand::Unsupported(type_name) => Err(TodoError::TypeMismatch(type_name.to_string())),
        }
    }

    pub fn try_ne<'a>(&self, other: impl Into<Operand<'a>>) -> Result<bool, TodoError> {
        self.try_eq(other).map(|eq| !eq)
    }
}

impl Default for Todo {
    fn default() -> Self {
        Todo::new()
    }
}

impl PartialEq for Todo {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for Todo {}

impl Hash for Todo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uid.hash(state);
    }
}

impl BitXor for &Todo {
    type Output = bool;

    fn bitxor(self, rhs: &Todo) -> bool {
        self.intersects(rhs)
    }
}

impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.begin) {
            (name, Some(begin)) => {
                f.write_str("<Todo ")?;
                if let Some(name) = name {
                    write!(f, "'{}' ", name)?;
                }
                let due = self
                    .due()
                    .map_or_else(|| "none".to_string(), |d| d.to_rfc3339());
                write!(f, "begin:{} due:{}>", begin.to_rfc3339(), due)
            }
            (Some(name), None) => write!(f, "<Todo '{}'>", name),
            (None, None) => f.write_str("<Todo>"),
        }
    }
}

/// The right-hand side of a relational comparison against a [`Todo`].
///
/// Typed callers convert a `&Todo` or a [`Timestamp`] with `into()`;
/// [`Operand::of`] classifies an arbitrary value at runtime.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Todo(&'a Todo),
    Instant(Timestamp),
    Unsupported(&'static str),
}

impl<'a> Operand<'a> {
    pub fn of<T: Any>(value: &'a T) -> Operand<'a> {
        let any: &dyn Any = value;
        if let Some(todo) = any.downcast_ref::<Todo>() {
            Operand::Todo(todo)
        } else if let Some(instant) = any.downcast_ref::<Timestamp>() {
            Operand::Instant(*instant)
        } else {
            Operand::Unsupported(std::any::type_name::<T>())
        }
    }
}

impl<'a> From<&'a Todo> for Operand<'a> {
    fn from(todo: &'a Todo) -> Self {
        Operand::Todo(todo)
    }
}

impl From<Timestamp> for Operand<'_> {
    fn from(instant: Timestamp) -> Self {
        Operand::Instant(instant)
    }
}

/// Field-by-field construction of a [`Todo`].
///
/// `build` rejects a due together with a duration, and a duration without a
/// begin, with [`TodoError::InvalidConstruction`].
#[derive(Debug, Clone, Default)]
pub struct TodoBuilder {
    uid: Option<String>,
    completed: Option<Timestamp>,
    created: Option<Timestamp>,
    description: Option<String>,
    begin: Option<Timestamp>,
    location: Option<String>,
    percent: Option<u8>,
    priority: Option<u8>,
    name: Option<String>,
    url: Option<String>,
    due: Option<Timestamp>,
    duration: Option<TimeDelta>,
    alarms: Vec<Alarm>,
}

impl TodoBuilder {
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn completed(mut self, at: Timestamp) -> Self {
        self.completed = Some(at);
        self
    }

    pub fn created(mut self, at: Timestamp) -> Self {
        self.created = Some(at);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn begin(mut self, at: Timestamp) -> Self {
        self.begin = Some(at);
        self
    }

    pub fn location(mut self, text: impl Into<String>) -> Self {
        self.location = Some(text.into());
        self
    }

    pub fn percent(mut self, percent: u8) -> Self {
        self.percent = Some(percent);
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn due(mut self, at: Timestamp) -> Self {
        self.due = Some(at);
        self
    }

    pub fn duration(mut self, duration: TimeDelta) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn alarm(mut self, alarm: Alarm) -> Self {
        self.alarms.push(alarm);
        self
    }

    pub fn build(self) -> Result<Todo, TodoError> {
        if self.duration.is_some() && self.due.is_some() {
            return Err(TodoError::InvalidConstruction(
                "a todo may not specify a duration and a due date at the same time".to_string(),
            ));
        }
        if self.duration.is_some() && self.begin.is_none() {
            return Err(TodoError::InvalidConstruction(
                "a todo must specify a begin if a duration is specified".to_string(),
            ));
        }

        let mut todo = Todo::new();
        if let Some(uid) = self.uid.filter(|u| !u.is_empty()) {
            todo.uid = uid;
        }
        todo.completed = self.completed;
        todo.created = self.created;
        todo.description = self.description;
        todo.location = self.location;
        todo.name = self.name;
        todo.url = self.url;
        todo.alarms.extend(self.alarms);

        todo.set_percent(self.percent)
            .map_err(TodoError::into_construction)?;
        todo.set_priority(self.priority)
            .map_err(TodoError::into_construction)?;
        todo.set_begin(self.begin)
            .map_err(TodoError::into_construction)?;

        let timing = match self.duration {
            Some(duration) => todo.set_duration(Some(duration)),
            None => todo.set_due(self.due),
        };
        timing.map_err(TodoError::into_construction)?;

        Ok(todo)
    }
}
