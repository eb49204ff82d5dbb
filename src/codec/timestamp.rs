use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use super::CodecError;
use crate::model::line::ContentLine;

/// A timezone-aware instant
pub type Timestamp = DateTime<FixedOffset>;

/// Known `TZID` values and the offsets they resolve to
pub type TzMap = HashMap<String, FixedOffset>;

const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

/// Decode a timestamp-valued property line.
///
/// - `...Z` values are UTC.
/// - `VALUE=DATE` (or a bare 8-digit value) is midnight of that day.
/// - Local values use the offset registered for their `TZID`; an unknown
///   TZID and floating values (no TZID) are read as UTC.
pub fn decode(line: &ContentLine, tz: &TzMap) -> Result<Timestamp, CodecError> {
    let value = line.value.trim();
    let invalid = || CodecError::InvalidTimestamp(value.to_string());

    if let Some(utc) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        let naive =
            NaiveDateTime::parse_from_str(&format!("{}Z", utc), UTC_FORMAT).map_err(|_| invalid())?;
        return Ok(Utc.from_utc_datetime(&naive).fixed_offset());
    }

    let naive = if line.has_param_value("VALUE", "DATE") || !value.contains('T') {
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|_| invalid())?
            .and_hms_opt(0, 0, 0)
            .ok_or_else(invalid)?
    } else {
        NaiveDateTime::parse_from_str(value, LOCAL_FORMAT).map_err(|_| invalid())?
    };

    let offset = match line.param("TZID").and_then(|ids| ids.first()) {
        Some(tzid) => match tz.get(tzid) {
            Some(offset) => *offset,
            None => {
                tracing::warn!(tzid = %tzid, property = %line.name, "unknown TZID, reading as UTC");
                utc_offset()
            }
        },
        None => utc_offset(),
    };

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(invalid)
}

/// Encode an instant as a UTC `YYYYMMDDTHHMMSSZ` value
pub fn encode(instant: &Timestamp) -> String {
    instant.with_timezone(&Utc).format(UTC_FORMAT).to_string()
}

/// The current instant, as stamped on output when a timestamp is missing
pub fn now() -> Timestamp {
    Utc::now().fixed_offset()
}

/// Parse a UTC offset such as `+01:00`, `-0530` or `Z`
pub fn parse_offset(s: &str) -> Result<FixedOffset, CodecError> {
    let invalid = || CodecError::InvalidOffset(s.to_string());
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(utc_offset());
    }

    let (sign, rest) = match s.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
