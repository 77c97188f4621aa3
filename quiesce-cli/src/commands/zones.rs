///! Management zone commands

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use quiesce_client::listing::fetch_management_zones;
use quiesce_client::PlatformClient;
use quiesce_common::ManagementZone;

use crate::output::{self, OutputFormat};
use crate::ZoneCommands;

#[derive(Tabled, Serialize)]
struct ZoneRow {
    id: String,
    name: String,
}

impl From<ManagementZone> for ZoneRow {
    fn from(zone: ManagementZone) -> Self {
        Self {
            id: zone.id,
            name: zone.name,
        }
    }
}

pub async fn handle_zones_command(
    command: ZoneCommands,
    api: &PlatformClient,
    output_format: OutputFormat,
) -> Result<()> {
    match command {
        ZoneCommands::List => {
            let zones = fetch_management_zones(api).await;
            let rows: Vec<ZoneRow> = zones.into_iter().map(ZoneRow::from).collect();
            output::print_output(rows, output_format)?;
        }
    }

    Ok(())
}
