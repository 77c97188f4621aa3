///! Formatting and parsing helpers
///! Date/time conversion between display and wire form, author stamps and enum labels

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use regex::Regex;
use std::sync::LazyLock;

/// Wire format of schedule start/end times
pub const API_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Author shown when a description carries no stamp
pub const UNKNOWN_AUTHOR: &str = "Unknown";

static DISPLAY_DATE_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2})T?(\d{2}:\d{2})").unwrap()
});

static API_DATE_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})").unwrap()
});

static AUTHOR_STAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\[([^\]]+@[^\]]+)\]\s*$").unwrap()
});

/// Accepted input forms besides the wire format
const INPUT_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Render a wire or display date-time as `YYYY-MM-DD HH:MM`
pub fn format_date_time(value: &str) -> String {
    if value.is_empty() {
        return "N/A".to_string();
    }

    match DISPLAY_DATE_TIME_REGEX.captures(value) {
        Some(caps) => format!("{} {}", &caps[1], &caps[2]),
        None => value.to_string(),
    }
}

/// Normalize operator input to the wire format `YYYY-MM-DDTHH:MM:SS`.
///
/// Input already containing the wire form is cut down to it. Otherwise the
/// value is parsed as RFC 3339 (rendered in local wall-clock time) or one of
/// the plain forms; anything unparsable is returned unchanged.
pub fn to_api_date_time(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    if let Some(caps) = API_DATE_TIME_REGEX.captures(value) {
        return caps[1].to_string();
    }

    parse_loose(value)
        .map(|dt| dt.format(API_DATE_TIME_FORMAT).to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Parse operator input into a wall-clock date-time
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&to_api_date_time(value), API_DATE_TIME_FORMAT).ok()
}

fn parse_loose(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Epoch milliseconds as local `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(millis: Option<i64>) -> String {
    millis
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "—".to_string())
}

/// Monday-first, abbreviated list of weekday names
pub fn format_week_days(days: &[String]) -> String {
    const ORDER: [(&str, &str); 7] = [
        ("MONDAY", "Mon"),
        ("TUESDAY", "Tue"),
        ("WEDNESDAY", "Wed"),
        ("THURSDAY", "Thu"),
        ("FRIDAY", "Fri"),
        ("SATURDAY", "Sat"),
        ("SUNDAY", "Sun"),
    ];

    if days.is_empty() {
        return "None".to_string();
    }

    let position = |day: &str| ORDER.iter().position(|(name, _)| *name == day).unwrap_or(ORDER.len());

    let mut sorted: Vec<&String> = days.iter().collect();
    sorted.sort_by_key(|day| position(day.as_str()));

    sorted
        .into_iter()
        .map(|day| {
            ORDER
                .iter()
                .find(|(name, _)| name == day)
                .map_or(day.as_str(), |(_, short)| *short)
        })
        .collect::<Vec<&str>>()
        .join(", ")
}

/// Description text and author split from a stamped description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDescription {
    pub text: String,
    pub author: String,
}

/// Split a trailing `[user@host]` stamp off a description
pub fn parse_description(description: &str) -> ParsedDescription {
    if description.is_empty() {
        return ParsedDescription {
            text: String::new(),
            author: UNKNOWN_AUTHOR.to_string(),
        };
    }

    match AUTHOR_STAMP_REGEX.captures(description) {
        Some(caps) => ParsedDescription {
            text: AUTHOR_STAMP_REGEX.replace(description, "").trim().to_string(),
            author: caps[1].to_string(),
        },
        None => ParsedDescription {
            text: description.to_string(),
            author: UNKNOWN_AUTHOR.to_string(),
        },
    }
}

/// Append the submitter's stamp to a description
pub fn stamp_description(description: &str, email: &str) -> String {
    let text = description.trim();
    if text.is_empty() {
        format!("[{}]", email)
    } else {
        format!("{} [{}]", text, email)
    }
}

/// Short label of what a suppression level suppresses
pub fn suppression_label(value: &str) -> &str {
    match value {
        "DONT_DETECT_PROBLEMS" => "Problem detection",
        "DETECT_PROBLEMS_DONT_ALERT" => "Alerts only",
        "DETECT_PROBLEMS_AND_ALERT" => "None",
        other => other,
    }
}

/// Long description of a suppression level
pub fn suppression_description(value: &str) -> &str {
    match value {
        "DONT_DETECT_PROBLEMS" => "Don't detect problems",
        "DETECT_PROBLEMS_DONT_ALERT" => "Detect problems but don't alert",
        "DETECT_PROBLEMS_AND_ALERT" => "Detect problems and alert",
        other => other,
    }
}

pub fn schedule_type_label(value: &str) -> &str {
    match value {
        "ONCE" => "Once",
        "DAILY" => "Daily",
        "WEEKLY" => "Weekly",
        "MONTHLY" => "Monthly",
        other => other,
    }
}

pub fn maintenance_type_label(value: &str) -> &str {
    match value {
        "PLANNED" => "Planned",
        "UNPLANNED" => "Unplanned",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_time() {
        assert_eq!(format_date_time("2024-01-01T02:00:00"), "2024-01-01 02:00");
        assert_eq!(format_date_time("2024-01-01 02:00"), "2024-01-01 02:00");
        assert_eq!(format_date_time(""), "N/A");
        assert_eq!(format_date_time("22:00:00"), "22:00:00");
    }

    #[test]
    fn test_to_api_date_time() {
        assert_eq!(to_api_date_time("2024-01-01T02:00:00.000Z"), "2024-01-01T02:00:00");
        assert_eq!(to_api_date_time("2024-03-05 07:30"), "2024-03-05T07:30:00");
        assert_eq!(to_api_date_time("2024-03-05T07:30"), "2024-03-05T07:30:00");
        assert_eq!(to_api_date_time(""), "");
        assert_eq!(to_api_date_time("next tuesday"), "next tuesday");
    }

    #[test]
    fn test_display_round_trip() {
        for input in ["2024-01-01T02:00:00", "x 2023-12-31T23:59:59+01:00", "2024-06-15T12:30:45.123"] {
            let formatted = format_date_time(&to_api_date_time(input));
            let expected = format_date_time(&API_DATE_TIME_REGEX.captures(input).unwrap()[1]);
            assert_eq!(formatted, expected);
        }
        assert_eq!(format_date_time(&to_api_date_time("2024-06-15T12:30:45")), "2024-06-15 12:30");
    }

    #[test]
    fn test_parse_date_time() {
        let start = parse_date_time("2024-01-01T02:00:00").unwrap();
        let end = parse_date_time("2024-01-01 04:00").unwrap();
        assert!(end > start);
        assert!(parse_date_time("soon").is_none());
    }

    #[test]
    fn test_parse_description() {
        let parsed = parse_description("Scheduled downtime [alice@example.com]");
        assert_eq!(parsed.text, "Scheduled downtime");
        assert_eq!(parsed.author, "alice@example.com");

        let empty = parse_description("");
        assert_eq!(empty.text, "");
        assert_eq!(empty.author, "Unknown");

        let unstamped = parse_description("No stamp [here]");
        assert_eq!(unstamped.text, "No stamp [here]");
        assert_eq!(unstamped.author, "Unknown");

        let only_stamp = parse_description("[bob@example.com]");
        assert_eq!(only_stamp.text, "");
        assert_eq!(only_stamp.author, "bob@example.com");
    }

    #[test]
    fn test_stamp_description_round_trip() {
        let stamped = stamp_description("  Kernel patching ", "ops@example.com");
        assert_eq!(stamped, "Kernel patching [ops@example.com]");
        assert_eq!(stamp_description("", "ops@example.com"), "[ops@example.com]");

        let parsed = parse_description(&stamped);
        assert_eq!(parsed.text, "Kernel patching");
        assert_eq!(parsed.author, "ops@example.com");
    }

    #[test]
    fn test_format_week_days() {
        let days = vec!["FRIDAY".to_string(), "MONDAY".to_string(), "WEDNESDAY".to_string()];
        assert_eq!(format_week_days(&days), "Mon, Wed, Fri");
        assert_eq!(format_week_days(&[]), "None");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(None), "—");
        assert_eq!(format_timestamp(Some(0)).len(), "1970-01-01 00:00:00".len());
    }

    #[test]
    fn test_labels() {
        assert_eq!(suppression_label("DETECT_PROBLEMS_DONT_ALERT"), "Alerts only");
        assert_eq!(suppression_description("DONT_DETECT_PROBLEMS"), "Don't detect problems");
        assert_eq!(suppression_label("CUSTOM"), "CUSTOM");
        assert_eq!(schedule_type_label("MONTHLY"), "Monthly");
        assert_eq!(maintenance_type_label("UNPLANNED"), "Unplanned");
    }
}
