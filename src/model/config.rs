use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::codec::timestamp::{self, TzMap};
use crate::codec::CodecError;

/// Configuration from a `vtodo.toml` file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// `TZID` → UTC offset (`"+01:00"`), used to resolve local timestamps
    #[serde(default)]
    pub timezones: HashMap<String, String>,
    #[serde(default)]
    pub parse: ParseConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseConfig {
    #[serde(default)]
    pub on_error: OnError,
}

/// What to do with a VTODO that fails extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Stop at the first malformed entry
    #[default]
    Abort,
    /// Log it and continue with the rest of the calendar
    Skip,
}

impl CalendarConfig {
    /// Resolve the configured offsets into a [`TzMap`]
    pub fn timezone_map(&self) -> Result<TzMap, CodecError> {
        self.timezones
            .iter()
            .map(|(tzid, offset)| Ok((tzid.clone(), timestamp::parse_offset(offset)?)))
            .collect()
    }
}
