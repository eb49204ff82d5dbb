use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;

use super::CodecError;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([-+]?)P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("duration pattern is valid")
});

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;

/// Structured duration components, e.g. `{ days: 2, hours: 6 }`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationParts {
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl DurationParts {
    fn total_seconds(&self) -> Option<i64> {
        [
            (self.weeks, SECONDS_PER_WEEK),
            (self.days, SECONDS_PER_DAY),
            (self.hours, SECONDS_PER_HOUR),
            (self.minutes, SECONDS_PER_MINUTE),
            (self.seconds, 1),
        ]
        .into_iter()
        .try_fold(0i64, |acc, (n, unit)| acc.checked_add(n.checked_mul(unit)?))
    }
}

impl TryFrom<DurationParts> for TimeDelta {
    type Error = CodecError;

    fn try_from(parts: DurationParts) -> Result<Self, Self::Error> {
        parts
            .total_seconds()
            .and_then(TimeDelta::try_seconds)
            .ok_or(CodecError::DurationOverflow)
    }
}

/// Decode an RFC 5545 duration value such as `P1W2D`, `PT1H30M` or `-PT15M`
pub fn decode(value: &str) -> Result<TimeDelta, CodecError> {
    let value = value.trim();
    let invalid = || CodecError::InvalidDuration(value.to_string());

    let caps = DURATION_RE.captures(value).ok_or_else(invalid)?;
    // `P` and `PT` alone match the pattern but carry no components
    if (2..=6).all(|i| caps.get(i).is_none()) {
        return Err(invalid());
    }

    let field = |i: usize| -> Result<i64, CodecError> {
        caps.get(i)
            .map_or(Ok(0), |m| m.as_str().parse::<i64>().map_err(|_| invalid()))
    };
    let parts = DurationParts {
        weeks: field(2)?,
        days: field(3)?,
        hours: field(4)?,
        minutes: field(5)?,
        seconds: field(6)?,
    };

    let delta = TimeDelta::try_from(parts)?;
    if &caps[1] == "-" { Ok(-delta) } else { Ok(delta) }
}

/// Encode a span as weeks, days, then a `T` section of hours, minutes and
/// seconds. Sub-second precision is dropped.
pub fn encode(delta: TimeDelta) -> String {
    let total = delta.num_seconds();
    let mut out = String::new();
    if total < 0 {
        out.push('-');
    }
    out.push('P');

    let abs = total.unsigned_abs();
    let mut days = abs / SECONDS_PER_DAY as u64;
    let secs = abs % SECONDS_PER_DAY as u64;

    if abs == 0 {
        out.push_str("T0S");
        return out;
    }

    if days / 7 > 0 {
        out.push_str(&format!("{}W", days / 7));
        days %= 7;
    }
    if days > 0 {
        out.push_str(&format!("{}D", days));
    }
    if secs > 0 {
        out.push('T');
        let hours = secs / SECONDS_PER_HOUR as u64;
        let minutes = (secs % SECONDS_PER_HOUR as u64) / SECONDS_PER_MINUTE as u64;
        let seconds = secs % SECONDS_PER_MINUTE as u64;
        if hours > 0 {
            out.push_str(&format!("{}H", hours));
        }
        if minutes > 0 {
            out.push_str(&format!("{}M", minutes));
        }
        if seconds > 0 {
            out.push_str(&format!("{}S", seconds));
        }
    }
    out
}
