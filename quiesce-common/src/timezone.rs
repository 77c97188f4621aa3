///! Timezone registry
///! Canonical zones offered for scheduling, with offsets, display cities and aliases

use std::collections::HashMap;
use std::sync::LazyLock;

/// Fallback zone when nothing else resolves
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// One canonical timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneEntry {
    pub id: &'static str,
    pub offset: &'static str,
    pub city: &'static str,
    pub aliases: &'static [&'static str],
    pub hidden: bool,
}

const fn tz(
    id: &'static str,
    offset: &'static str,
    city: &'static str,
    aliases: &'static [&'static str],
    hidden: bool,
) -> TimezoneEntry {
    TimezoneEntry { id, offset, city, aliases, hidden }
}

pub static TIMEZONES: &[TimezoneEntry] = &[
    tz("Pacific/Honolulu", "−10:00", "Honolulu", &["US/Hawaii"], false),
    tz("America/Anchorage", "−09:00/08:00", "Anchorage", &["US/Alaska"], false),
    tz("America/Los_Angeles", "−08:00/07:00", "Los Angeles", &["US/Pacific", "PST8PDT", "America/Vancouver", "Canada/Pacific"], false),
    tz("America/Phoenix", "−07:00", "Phoenix", &["US/Arizona"], false),
    tz("America/Denver", "−07:00/06:00", "Denver", &["US/Mountain", "MST7MDT", "Canada/Mountain"], false),
    tz("America/Mexico_City", "−06:00", "Mexico City", &[], false),
    tz("America/Chicago", "−06:00/05:00", "Chicago", &["US/Central", "CST6CDT", "Canada/Central"], false),
    tz("America/Bogota", "−05:00", "Bogotá", &[], false),
    tz("America/Lima", "−05:00", "Lima", &[], true),
    tz("America/New_York", "−05:00/04:00", "New York", &["US/Eastern", "EST5EDT", "America/Toronto", "Canada/Eastern"], false),
    tz("America/Caracas", "−04:00", "Caracas", &[], false),
    tz("America/Halifax", "−04:00/03:00", "Halifax", &["AST4ADT", "Canada/Atlantic"], true),
    tz("America/Santiago", "−04:00/03:00", "Santiago", &[], false),
    tz("America/Sao_Paulo", "−03:00", "São Paulo", &[], false),
    tz("America/Buenos_Aires", "−03:00", "Buenos Aires", &[], true),
    tz("UTC", "+00:00", "Accra", &["Etc/UTC", "Etc/GMT"], false),
    tz("Europe/London", "+00:00/01:00", "London", &["Europe/Dublin", "Europe/Lisbon"], false),
    tz("Africa/Lagos", "+01:00", "Lagos", &[], false),
    tz("Europe/Paris", "+01:00/02:00", "Paris", &["Europe/Amsterdam", "Europe/Rome", "Europe/Madrid", "Europe/Stockholm", "Europe/Warsaw"], false),
    tz("Europe/Berlin", "+01:00/02:00", "Berlin", &[], true),
    tz("Africa/Johannesburg", "+02:00", "Johannesburg", &[], true),
    tz("Africa/Cairo", "+02:00", "Cairo", &[], false),
    tz("Europe/Athens", "+02:00/03:00", "Athens", &[], false),
    tz("Europe/Helsinki", "+02:00/03:00", "Helsinki", &["Europe/Bucharest"], true),
    tz("Asia/Jerusalem", "+02:00/03:00", "Jerusalem", &[], true),
    tz("Europe/Moscow", "+03:00", "Moscow", &[], true),
    tz("Europe/Istanbul", "+03:00", "Istanbul", &[], false),
    tz("Asia/Riyadh", "+03:00", "Riyadh", &[], true),
    tz("Asia/Dubai", "+04:00", "Dubai", &[], false),
    tz("Asia/Karachi", "+05:00", "Karachi", &[], false),
    tz("Asia/Kolkata", "+05:30", "Kolkata", &["Asia/Calcutta", "Asia/Mumbai", "Asia/Delhi", "Asia/Chennai", "Asia/Bangalore"], false),
    tz("Asia/Bangkok", "+07:00", "Bangkok", &["Asia/Ho_Chi_Minh"], true),
    tz("Asia/Jakarta", "+07:00", "Jakarta", &[], false),
    tz("Asia/Singapore", "+08:00", "Singapore", &["Asia/Kuala_Lumpur"], true),
    tz("Asia/Hong_Kong", "+08:00", "Hong Kong", &[], true),
    tz("Asia/Shanghai", "+08:00", "Shanghai", &["Asia/Taipei"], false),
    tz("Asia/Manila", "+08:00", "Manila", &[], true),
    tz("Australia/Perth", "+08:00", "Perth", &["Australia/West"], true),
    tz("Asia/Seoul", "+09:00", "Seoul", &[], true),
    tz("Asia/Tokyo", "+09:00", "Tokyo", &[], false),
    tz("Australia/Darwin", "+09:30", "Darwin", &["Australia/North"], false),
    tz("Australia/Adelaide", "+09:30/10:30", "Adelaide", &["Australia/South"], false),
    tz("Australia/Brisbane", "+10:00", "Brisbane", &["Australia/Queensland"], false),
    tz("Australia/Sydney", "+10:00/11:00", "Sydney", &["Australia/Melbourne", "Australia/Victoria", "Australia/NSW"], false),
    tz("Pacific/Auckland", "+12:00/13:00", "Auckland", &[], false),
];

/// Canonical ids and aliases, all pointing at their canonical entry
static LOOKUP: LazyLock<HashMap<&'static str, &'static TimezoneEntry>> = LazyLock::new(|| {
    let mut lookup = HashMap::new();
    for entry in TIMEZONES {
        lookup.insert(entry.id, entry);
        for alias in entry.aliases {
            lookup.insert(*alias, entry);
        }
    }
    lookup
});

/// Resolve an id or alias to its canonical entry
pub fn lookup(id: &str) -> Option<&'static TimezoneEntry> {
    LOOKUP.get(id).copied()
}

/// Canonical id for an id or alias
pub fn canonical_id(id: &str) -> Option<&'static str> {
    lookup(id).map(|entry| entry.id)
}

/// UTC offset of a zone, `?` when unknown
pub fn timezone_offset(id: &str) -> &'static str {
    lookup(id).map_or("?", |entry| entry.offset)
}

/// Display city of a zone, `?` when unknown
pub fn timezone_city(id: &str) -> &'static str {
    lookup(id).map_or("?", |entry| entry.city)
}

/// Zones offered for selection
pub fn timezone_options() -> impl Iterator<Item = &'static TimezoneEntry> {
    TIMEZONES.iter().filter(|entry| !entry.hidden)
}

/// Map the zones reported by the host, most specific first, to a canonical id.
///
/// The first candidate that resolves wins; a POSIX `:` prefix is ignored.
pub fn detect_user_timezone(candidates: &[&str]) -> &'static str {
    candidates
        .iter()
        .map(|zone| zone.trim().trim_start_matches(':'))
        .find_map(canonical_id)
        .unwrap_or(DEFAULT_TIMEZONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_resolution() {
        assert_eq!(canonical_id("US/Eastern"), Some("America/New_York"));
        assert_eq!(canonical_id("Asia/Calcutta"), Some("Asia/Kolkata"));
        assert_eq!(canonical_id("Europe/Paris"), Some("Europe/Paris"));
        assert_eq!(canonical_id("Mars/Olympus_Mons"), None);
    }

    #[test]
    fn test_offset_and_city() {
        assert_eq!(timezone_offset("Etc/UTC"), "+00:00");
        assert_eq!(timezone_city("UTC"), "Accra");
        assert_eq!(timezone_offset("Australia/Melbourne"), "+10:00/11:00");
        assert_eq!(timezone_offset("nowhere"), "?");
        assert_eq!(timezone_city(""), "?");
    }

    #[test]
    fn test_detect_user_timezone() {
        assert_eq!(detect_user_timezone(&["Canada/Pacific"]), "America/Los_Angeles");
        assert_eq!(detect_user_timezone(&["Antarctica/Troll"]), "UTC");
        assert_eq!(detect_user_timezone(&[]), "UTC");
    }

    #[test]
    fn test_detect_user_timezone_falls_through_candidates() {
        assert_eq!(detect_user_timezone(&["Antarctica/Troll", "Europe/Berlin"]), "Europe/Berlin");
        assert_eq!(detect_user_timezone(&[":Asia/Calcutta", "Europe/Berlin"]), "Asia/Kolkata");
        assert_eq!(detect_user_timezone(&["", "US/Eastern"]), "America/New_York");
    }

    #[test]
    fn test_hidden_zones_not_offered() {
        assert!(timezone_options().all(|entry| !entry.hidden));
        assert!(!timezone_options().any(|entry| entry.id == "Europe/Berlin"));
        // hidden zones still resolve
        assert_eq!(timezone_city("Europe/Berlin"), "Berlin");
    }

    #[test]
    fn test_aliases_are_unique() {
        let total: usize = TIMEZONES.iter().map(|entry| 1 + entry.aliases.len()).sum();
        assert_eq!(LOOKUP.len(), total);
    }
}
