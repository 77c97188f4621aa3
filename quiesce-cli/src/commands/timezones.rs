///! Timezone listing

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use quiesce_common::timezone::{timezone_options, TimezoneEntry, TIMEZONES};

use crate::output::{self, OutputFormat};

#[derive(Tabled, Serialize)]
struct TimezoneRow {
    id: String,
    offset: String,
    city: String,
    aliases: String,
}

impl From<&TimezoneEntry> for TimezoneRow {
    fn from(entry: &TimezoneEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            offset: format!("UTC {}", entry.offset),
            city: entry.city.to_string(),
            aliases: entry.aliases.join(", "),
        }
    }
}

fn timezone_rows(include_hidden: bool) -> Vec<TimezoneRow> {
    if include_hidden {
        TIMEZONES.iter().map(TimezoneRow::from).collect()
    } else {
        timezone_options().map(TimezoneRow::from).collect()
    }
}

pub fn handle_timezones_command(all: bool, output_format: OutputFormat) -> Result<()> {
    output::print_output(timezone_rows(all), output_format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_zones_only_with_all() {
        let visible = timezone_rows(false);
        let all = timezone_rows(true);

        assert_eq!(all.len(), TIMEZONES.len());
        assert!(visible.len() < all.len());
        assert!(!visible.iter().any(|row| row.id == "Europe/Berlin"));
        assert!(all.iter().any(|row| row.id == "Europe/Berlin"));
        assert!(visible.iter().all(|row| row.offset.starts_with("UTC ")));
    }
}
