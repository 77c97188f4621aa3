//! Maintenance window creation flow
//!
//! Validate, create the auto-tag when the draft needs topology expansion,
//! then submit the window. The tag is created first because the window's
//! filters match on it; nothing waits for the tagging engine to apply it,
//! and a tag created ahead of a failed window submission is not removed.

use tracing::{info, warn};

use quiesce_common::compiler::{build_payload, plan_auto_tagging, AutoTagPlan, MAINTENANCE_TAG_VALUE};
use quiesce_common::validation::validate_form;
use quiesce_common::{MaintenanceWindowValue, SettingsObjectCreate, WindowDraft};

use crate::autotag::create_auto_tag_with_rules;
use crate::error::{ClientError, Result};
use crate::services::{IdentityProvider, SettingsStore};

/// Everything that would be submitted for a draft
#[derive(Debug, Clone, PartialEq)]
pub struct CreationPlan {
    pub auto_tag: Option<AutoTagPlan>,
    pub window: SettingsObjectCreate<MaintenanceWindowValue>,
}

/// Ids of the objects a successful creation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedWindow {
    pub window_id: Option<String>,
    pub auto_tag_id: Option<String>,
    pub tag_key: Option<String>,
}

/// Validate a draft and compile what would be submitted, without side effects
pub fn plan_creation(draft: &WindowDraft, author_email: &str) -> Result<CreationPlan> {
    validate_form(draft)?;
    Ok(compile_plan(draft, author_email))
}

/// Callers validate first
fn compile_plan(draft: &WindowDraft, author_email: &str) -> CreationPlan {
    let auto_tag = plan_auto_tagging(draft);
    let window = build_payload(draft, author_email, auto_tag.as_ref().map(|plan| plan.tag_key.as_str()));

    CreationPlan { auto_tag, window }
}

/// Create a maintenance window, preceded by its auto-tag when needed
pub async fn save_maintenance_window<S, I>(store: &S, identity: &I, draft: &WindowDraft) -> Result<CreatedWindow>
where
    S: SettingsStore + ?Sized,
    I: IdentityProvider + ?Sized,
{
    validate_form(draft)?;

    let user = identity.current_user().await?;
    let plan = compile_plan(draft, &user.email);

    let mut auto_tag_id = None;
    if let Some(auto_tag) = &plan.auto_tag {
        let id = create_auto_tag_with_rules(
            store,
            &auto_tag.tag_key,
            MAINTENANCE_TAG_VALUE,
            auto_tag.rules.clone(),
        )
        .await?;

        match id {
            Some(id) => auto_tag_id = Some(id),
            None => return Err(ClientError::AutoTagNotCreated),
        }
    }

    let body = serde_json::to_value(&plan.window)?;
    let results = store.create_settings_objects(vec![body]).await.map_err(|e| {
        if let Some(tag_id) = &auto_tag_id {
            warn!("Window submission failed, auto-tag {} was left in place", tag_id);
        }
        e
    })?;

    let window_id = results.into_iter().next().and_then(|result| result.object_id);
    info!(
        "Created maintenance window {} ({})",
        draft.name.trim(),
        window_id.as_deref().unwrap_or("no id returned")
    );

    Ok(CreatedWindow {
        window_id,
        auto_tag_id,
        tag_key: plan.auto_tag.map(|plan| plan.tag_key),
    })
}
