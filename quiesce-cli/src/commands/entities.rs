///! Entity type and entity search commands

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use quiesce_client::listing::fetch_entity_types;
use quiesce_client::search::search_entities;
use quiesce_client::PlatformClient;
use quiesce_common::entity_types::{filter_entity_types, EntityTypeOption};
use quiesce_common::EntityReference;

use crate::output::{self, OutputFormat};
use crate::EntityCommands;

#[derive(Tabled, Serialize)]
struct EntityTypeRow {
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    entity_type: String,
    label: String,
}

impl From<&EntityTypeOption> for EntityTypeRow {
    fn from(option: &EntityTypeOption) -> Self {
        Self {
            entity_type: option.value.clone(),
            label: option.label.clone(),
        }
    }
}

#[derive(Tabled, Serialize)]
struct EntityRow {
    id: String,
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    entity_type: String,
    name: String,
}

impl From<EntityReference> for EntityRow {
    fn from(entity: EntityReference) -> Self {
        Self {
            id: entity.entity_id,
            entity_type: entity.entity_type,
            name: entity.display_name,
        }
    }
}

pub async fn handle_entities_command(
    command: EntityCommands,
    api: &PlatformClient,
    output_format: OutputFormat,
) -> Result<()> {
    match command {
        EntityCommands::Types { search } => {
            let types = fetch_entity_types(api).await;
            let rows: Vec<EntityTypeRow> = filter_entity_types(&types, search.as_deref().unwrap_or_default())
                .into_iter()
                .map(EntityTypeRow::from)
                .collect();
            output::print_output(rows, output_format)?;
        }

        EntityCommands::Search { entity_type, term } => {
            let spinner = output::spinner(format!("Searching {} entities...", entity_type));
            let entities = search_entities(api, &entity_type, term.trim()).await;
            spinner.finish_and_clear();

            let rows: Vec<EntityRow> = entities.into_iter().map(EntityRow::from).collect();
            output::print_output(rows, output_format)?;
        }
    }

    Ok(())
}
