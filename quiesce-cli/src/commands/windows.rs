///! Maintenance window commands

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tabled::Tabled;

use quiesce_client::bulk::process_bulk_hosts;
use quiesce_client::create::{plan_creation, save_maintenance_window, CreationPlan};
use quiesce_client::listing::{
    fetch_entity_types, fetch_maintenance_window, fetch_maintenance_windows, fetch_management_zones,
};
use quiesce_client::search::search_entities;
use quiesce_client::{IdentityProvider, PlatformClient, StaticIdentity};
use quiesce_common::compiler::{build_auto_tag_payload, MAINTENANCE_TAG_VALUE};
use quiesce_common::format::{schedule_type_label, suppression_label};
use quiesce_common::session::Session;
use quiesce_common::timezone::{canonical_id, detect_user_timezone, timezone_city, timezone_offset};
use quiesce_common::window::{
    filter_windows, page, total_pages, FilterCard, MaintenanceWindowSummary, WindowDetails, NO_FILTERS_MESSAGE,
};
use quiesce_common::{EntityReference, ManagementZone, SuppressionLevel, TagSpec, UnderlyingOption, WindowDraft};

use crate::config::Config;
use crate::output::{self, OutputFormat};
use crate::{CreateArgs, WindowCommands};

#[derive(Tabled, Serialize)]
struct WindowRow {
    id: String,
    name: String,
    suppression: String,
    schedule: String,
    start: String,
    end: String,
    timezone: String,
    author: String,
}

impl From<&MaintenanceWindowSummary> for WindowRow {
    fn from(window: &MaintenanceWindowSummary) -> Self {
        Self {
            id: window.object_id.clone(),
            name: output::truncate(&window.name, 40),
            suppression: suppression_label(&window.suppression).to_string(),
            schedule: schedule_type_label(&window.schedule_type).to_string(),
            start: window.start_time.clone(),
            end: window.end_time.clone(),
            timezone: format!("UTC {} ({})", window.utc_offset, window.city),
            author: window.author.clone(),
        }
    }
}

/// One filter group as written in a `--filters` file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GroupEntry {
    management_zones: Vec<String>,
    tags: Vec<String>,
    entities: Vec<EntityEntry>,
    include_processes: bool,
    include_services: bool,
    include_hosts: bool,
    include_process_groups: bool,
}

impl GroupEntry {
    fn requested_options(&self) -> Vec<UnderlyingOption> {
        [
            (UnderlyingOption::Processes, self.include_processes),
            (UnderlyingOption::Services, self.include_services),
            (UnderlyingOption::Hosts, self.include_hosts),
            (UnderlyingOption::ProcessGroups, self.include_process_groups),
        ]
        .into_iter()
        .filter_map(|(option, enabled)| enabled.then_some(option))
        .collect()
    }
}

/// Entity by id, or by exact display name looked up on the platform
#[derive(Debug, Deserialize)]
struct EntityEntry {
    #[serde(rename = "type")]
    entity_type: String,
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FilterFile {
    filters: Vec<GroupEntry>,
}

pub async fn handle_windows_command(
    command: WindowCommands,
    api: &PlatformClient,
    config: &Config,
    output_format: OutputFormat,
) -> Result<()> {
    match command {
        WindowCommands::List { all, search, page: page_number } => {
            let spinner = output::spinner("Loading maintenance windows...");
            let windows = fetch_maintenance_windows(api).await;
            spinner.finish_and_clear();

            let visible = filter_windows(&windows, all, search.as_deref().unwrap_or_default());
            let pages = total_pages(visible.len());
            if page_number == 0 || page_number > pages {
                bail!("Page {} is out of range (1-{})", page_number, pages);
            }
            let current = page(&visible, page_number - 1);

            if output_format == OutputFormat::Table {
                let rows: Vec<WindowRow> = current.iter().map(|w| WindowRow::from(*w)).collect();
                output::print_table(rows);
                println!(
                    "{}",
                    format!("Page {} of {} ({} windows)", page_number, pages, visible.len()).dimmed()
                );
            } else {
                output::print_single(&current, output_format)?;
            }
        }

        WindowCommands::Show { id } => {
            let (window, zones, entity_types) = tokio::join!(
                fetch_maintenance_window(api, &id),
                fetch_management_zones(api),
                fetch_entity_types(api),
            );
            let window = window?;

            if output_format == OutputFormat::Table {
                let details = WindowDetails::build(&window, &zones, &entity_types);
                print_details(&window.name, &details);
            } else {
                output::print_single(&window.raw, output_format)?;
            }
        }

        WindowCommands::Create(args) => create_window(args, api, config, output_format).await?,
    }

    Ok(())
}

fn print_details(name: &str, details: &WindowDetails) {
    println!("{}\n", name.bold());
    output::print_section("General", &details.general);
    output::print_section("Schedule", &details.schedule);

    println!("{}", "Filters".bold());
    if details.filters.is_empty() {
        println!("  {}", NO_FILTERS_MESSAGE.dimmed());
    }
    for (index, card) in details.filters.iter().enumerate() {
        println!("  {} {}", "Filter".dimmed(), index + 1);
        print_filter_card(card);
    }
    println!();

    if !details.api.is_empty() {
        output::print_section("API", &details.api);
    }
}

fn print_filter_card(card: &FilterCard) {
    if !card.management_zones.is_empty() {
        println!("    Management zones: {}", card.management_zones.join(", "));
    }
    if !card.tags.is_empty() {
        println!("    Tags: {}", card.tags.join(", "));
    }
    if let Some(entity) = &card.entity {
        println!("    Entity: {}", entity);
    }
    if let Some(entity_type) = &card.entity_type {
        println!("    Entity type: {}", entity_type);
    }
}

async fn create_window(
    args: CreateArgs,
    api: &PlatformClient,
    config: &Config,
    output_format: OutputFormat,
) -> Result<()> {
    let timezone = resolve_timezone(
        args.timezone.as_deref(),
        config.default_timezone.as_deref(),
        &system_timezones(),
    )?;
    let suppression: SuppressionLevel = args.suppression.parse().map_err(|e: String| anyhow!(e))?;

    let mut session = Session::new(timezone)
        .with_name(&args.name)
        .with_description(&args.description)
        .with_schedule(Some(&args.start), Some(&args.end))
        .with_suppression(suppression)
        .with_disable_synthetics(args.disable_synthetics);

    let groups = match &args.filters {
        Some(path) => load_filter_file(path)?,
        None => Vec::new(),
    };

    let needs_zones = !args.zones.is_empty()
        || !args.bulk_zones.is_empty()
        || groups.iter().any(|group| !group.management_zones.is_empty());
    let zones = if needs_zones {
        fetch_management_zones(api).await
    } else {
        Vec::new()
    };

    if !args.zones.is_empty() || !args.tags.is_empty() {
        let group = GroupEntry {
            management_zones: args.zones.clone(),
            tags: args.tags.clone(),
            ..Default::default()
        };
        session = apply_group(session, &group, &zones, Vec::new())?;
    }

    for group in &groups {
        let mut entities = Vec::with_capacity(group.entities.len());
        for entity in &group.entities {
            entities.push(resolve_entity(api, entity).await?);
        }
        session = apply_group(session, group, &zones, entities)?;
    }

    match read_host_input(args.hosts.as_deref(), args.hosts_file.as_deref())? {
        Some(input) => {
            session = session
                .open_bulk()
                .set_bulk_input(&input)
                .set_bulk_include_processes(args.include_processes)
                .set_bulk_include_services(args.include_services);
            for zone in &args.bulk_zones {
                session = session.add_bulk_zone(find_zone(&zones, zone)?);
            }
            for tag in &args.bulk_tags {
                let tag: TagSpec = tag.parse()?;
                session = session.add_bulk_tag(&tag.key, tag.value.as_deref());
            }
            session = commit_bulk_hosts(session, api).await?;
        }
        None => {
            if !args.bulk_zones.is_empty() || !args.bulk_tags.is_empty() || args.include_processes || args.include_services
            {
                output::print_warning("Bulk options are ignored without --hosts or --hosts-file");
            }
        }
    }

    let draft = session.draft;
    let identity = StaticIdentity::new(config.user_email.clone());
    let author = identity.current_user().await?.email;
    let plan = plan_creation(&draft, &author).map_err(|e| anyhow!(e.user_message()))?;

    if args.dry_run {
        let preview = serde_json::json!({
            "autoTag": plan.auto_tag.as_ref().map(|auto_tag| {
                build_auto_tag_payload(&auto_tag.tag_key, MAINTENANCE_TAG_VALUE, auto_tag.rules.clone())
            }),
            "window": plan.window,
        });
        match output_format {
            OutputFormat::Yaml => output::print_yaml(&preview)?,
            _ => output::print_json(&preview)?,
        }
        return Ok(());
    }

    print_plan_summary(&draft, &plan);

    if !args.yes {
        let confirm = dialoguer::Confirm::new()
            .with_prompt("Create this maintenance window?")
            .default(true)
            .interact()?;
        if !confirm {
            output::print_info("Creation aborted");
            return Ok(());
        }
    }

    let spinner = output::spinner(format!("Creating maintenance window '{}'...", draft.name.trim()));
    let result = save_maintenance_window(api, &identity, &draft).await;
    spinner.finish_and_clear();
    let created = result.map_err(|e| anyhow!(e.user_message()))?;

    if let Some(tag_key) = &created.tag_key {
        output::print_success(&format!("Auto-tag '{}' created", tag_key));
    }
    output::print_created(
        "Maintenance window",
        draft.name.trim(),
        created.window_id.as_deref().unwrap_or("unknown"),
    );

    Ok(())
}

/// Zones the host reports: `TZ` first, then the operating system's zone
fn system_timezones() -> Vec<String> {
    let mut zones = Vec::new();
    if let Ok(tz) = std::env::var("TZ") {
        zones.push(tz);
    }
    match iana_time_zone::get_timezone() {
        Ok(zone) => zones.push(zone),
        Err(e) => tracing::debug!("Could not read the system timezone: {}", e),
    }
    zones
}

/// Flag, then configured default, then the host's zone, then UTC
fn resolve_timezone(flag: Option<&str>, configured: Option<&str>, system: &[String]) -> Result<&'static str> {
    if let Some(id) = flag {
        return canonical_id(id.trim()).with_context(|| format!("Unknown timezone: {}", id));
    }
    if let Some(id) = configured.and_then(canonical_id) {
        return Ok(id);
    }
    let candidates: Vec<&str> = system.iter().map(String::as_str).collect();
    Ok(detect_user_timezone(&candidates))
}

fn load_filter_file(path: &Path) -> Result<Vec<GroupEntry>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    parse_filter_file(&contents, is_json).with_context(|| format!("Invalid filter file {}", path.display()))
}

fn parse_filter_file(contents: &str, is_json: bool) -> Result<Vec<GroupEntry>> {
    let file: FilterFile = if is_json {
        serde_json::from_str(contents)?
    } else {
        serde_yaml::from_str(contents)?
    };
    Ok(file.filters)
}

/// Match a zone by id, then by name ignoring case
fn find_zone(zones: &[ManagementZone], id_or_name: &str) -> Result<ManagementZone> {
    let wanted = id_or_name.trim();
    zones
        .iter()
        .find(|zone| zone.id == wanted)
        .or_else(|| zones.iter().find(|zone| zone.name.eq_ignore_ascii_case(wanted)))
        .cloned()
        .with_context(|| format!("Unknown management zone: {}", wanted))
}

/// Append one filter group through the session reducers
fn apply_group(
    session: Session,
    group: &GroupEntry,
    zones: &[ManagementZone],
    entities: Vec<EntityReference>,
) -> Result<Session> {
    let mut session = session.add_filter();
    let filter_id = session
        .draft
        .filters
        .last()
        .map(|filter| filter.id.clone())
        .context("Filter group was not added")?;

    for zone in &group.management_zones {
        session = session.add_management_zone(&filter_id, find_zone(zones, zone)?);
    }
    for tag in &group.tags {
        let tag: TagSpec = tag.parse()?;
        session = session.add_tag(&filter_id, &tag.key, tag.value.as_deref());
    }
    for entity in entities {
        session = session.add_entity(&filter_id, entity);
    }
    for option in group.requested_options() {
        session = session.set_underlying_option(&filter_id, option, true);
    }

    Ok(session)
}

async fn resolve_entity(api: &PlatformClient, entry: &EntityEntry) -> Result<EntityReference> {
    match (&entry.id, &entry.name) {
        (Some(id), name) => Ok(EntityReference::new(id, &entry.entity_type, name.as_deref().unwrap_or(id))),
        (None, Some(name)) => search_entities(api, &entry.entity_type, name)
            .await
            .into_iter()
            .find(|entity| entity.display_name == *name)
            .with_context(|| format!("No {} entity named {}", entry.entity_type, name)),
        (None, None) => bail!("Each entity needs an id or a name"),
    }
}

/// Inline host list and host file joined together, if either was given
fn read_host_input(inline: Option<&str>, file: Option<&Path>) -> Result<Option<String>> {
    let mut parts = Vec::new();
    if let Some(hosts) = inline {
        parts.push(hosts.to_string());
    }
    if let Some(path) = file {
        parts.push(std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?);
    }
    Ok((!parts.is_empty()).then(|| parts.join("\n")))
}

async fn commit_bulk_hosts(session: Session, api: &PlatformClient) -> Result<Session> {
    let Some(bulk) = &session.bulk else {
        return Ok(session);
    };

    let spinner = output::spinner(format!("Resolving {} hosts...", bulk.host_names()?.len()));
    let filters = process_bulk_hosts(api, bulk).await;
    spinner.finish_and_clear();
    let filters = filters.map_err(|e| anyhow!(e.user_message()))?;

    output::print_info(&format!("Resolved {} hosts", filters.len()));
    Ok(session.commit_bulk_filters(filters))
}

fn print_plan_summary(draft: &WindowDraft, plan: &CreationPlan) {
    println!("{}", draft.name.trim().bold());
    println!(
        "  {} {} → {}",
        "Schedule:".dimmed(),
        draft.start.as_deref().unwrap_or_default(),
        draft.end.as_deref().unwrap_or_default()
    );
    println!(
        "  {} UTC {} ({})",
        "Timezone:".dimmed(),
        timezone_offset(&draft.timezone),
        timezone_city(&draft.timezone)
    );
    println!("  {} {}", "Suppression:".dimmed(), suppression_label(draft.suppression.as_str()));
    println!("  {} {}", "Filter groups:".dimmed(), draft.filters.len());
    println!("  {} {}", "Compiled filters:".dimmed(), plan.window.value.filters.len());
    if let Some(auto_tag) = &plan.auto_tag {
        println!(
            "  {} {} ({} rules)",
            "Auto-tag:".dimmed(),
            auto_tag.tag_key,
            auto_tag.rules.len()
        );
    }
}
