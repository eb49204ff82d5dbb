use std::fmt;

use crate::model::line::Container;

/// Error type for alarm resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlarmError {
    #[error("expected a VALARM component, found {0}")]
    WrongComponent(String),
    #[error("VALARM has no ACTION")]
    MissingAction,
}

/// The alarm variant, resolved from its `ACTION` property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmAction {
    Audio,
    Display,
    Email,
    None,
    /// `X-` or IANA actions this crate does not model
    Custom(String),
}

impl AlarmAction {
    pub fn from_value(value: &str) -> AlarmAction {
        match value.trim().to_ascii_uppercase().as_str() {
            "AUDIO" => AlarmAction::Audio,
            "DISPLAY" => AlarmAction::Display,
            "EMAIL" => AlarmAction::Email,
            "NONE" => AlarmAction::None,
            other => AlarmAction::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AlarmAction::Audio => "AUDIO",
            AlarmAction::Display => "DISPLAY",
            AlarmAction::Email => "EMAIL",
            AlarmAction::None => "NONE",
            AlarmAction::Custom(name) => name,
        }
    }
}

/// A `VALARM` attached to a todo.
///
/// Apart from its action and trigger the alarm is opaque: the source
/// component is kept as-is and rendered back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    action: AlarmAction,
    trigger: Option<String>,
    container: Container,
}

impl Alarm {
    /// Resolve a `VALARM` container into an alarm
    pub fn from_container(container: &Container) -> Result<Alarm, AlarmError> {
        if container.name != "VALARM" {
            return Err(AlarmError::WrongComponent(container.name.clone()));
        }
        let action = container
            .line("ACTION")
            .map(|l| AlarmAction::from_value(&l.value))
            .ok_or(AlarmError::MissingAction)?;
        let trigger = container.line("TRIGGER").map(|l| l.value.clone());

        Ok(Alarm {
            action,
            trigger,
            container: container.clone(),
        })
    }

    pub fn action(&self) -> &AlarmAction {
        &self.action
    }

    /// Raw `TRIGGER` value, if any
    pub fn trigger(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    /// Render the alarm back to its component
    pub fn to_container(&self) -> Container {
        self.container.clone()
    }
}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.container.to_lines().join("\n"))
    }
}
