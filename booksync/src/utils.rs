use chrono::{DateTime, Local, TimeZone};

/// Shown wherever a value is unknown.
pub const UNKNOWN: &str = "-";

/// Format a wall-clock instant as local `HH:MM:SS`.
pub fn clock(at: &DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Format a trade timestamp as local `HH:MM:SS`.
///
/// Accepts RFC 3339 text or epoch milliseconds; anything else is returned
/// verbatim.
pub fn fmt_time(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return clock(&ts.with_timezone(&Local));
    }
    if let Ok(millis) = trimmed.parse::<i64>() {
        if let Some(ts) = Local.timestamp_millis_opt(millis).single() {
            return clock(&ts);
        }
    }
    raw.to_string()
}

/// Format an optional number; `None` renders as [`UNKNOWN`].
pub fn fmt_num(value: Option<f64>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}

/// Format an optional count; `None` renders as [`UNKNOWN`].
pub fn fmt_count(value: Option<u64>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_and_epoch_millis_agree() {
        let from_text = fmt_time("2024-05-01T12:00:00Z");
        let from_millis = fmt_time("1714564800000");
        assert_eq!(from_text, from_millis);
        assert_eq!(from_text.len(), 8);
    }

    #[test]
    fn unparseable_time_is_verbatim() {
        assert_eq!(fmt_time("yesterday"), "yesterday");
        assert_eq!(fmt_time(""), "");
    }

    #[test]
    fn numbers() {
        assert_eq!(fmt_num(Some(100.0)), "100");
        assert_eq!(fmt_num(Some(10.25)), "10.25");
        assert_eq!(fmt_num(None), "-");
        assert_eq!(fmt_count(Some(3)), "3");
        assert_eq!(fmt_count(None), "-");
    }
}
