///! Pre-submission checks for the create form
///! The first failing check wins; nothing reaches the network until all pass

use crate::format::parse_date_time;
use crate::model::WindowDraft;

/// Why a draft cannot be submitted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name is required.")]
    NameRequired,

    #[error("Start time is required.")]
    StartRequired,

    #[error("End time is required.")]
    EndRequired,

    #[error("{field} time is not a valid date-time: {value}")]
    InvalidTime { field: &'static str, value: String },

    #[error("End time must be after start time.")]
    EndNotAfterStart,

    #[error("You must add at least one entity filter. Without an entity filter, the maintenance window would apply to the entire environment.")]
    NoFilters,

    #[error("Each entity filter must contain at least one management zone, tag, or entity.")]
    EmptyFilter,
}

impl ValidationError {
    /// Message with inline markup for front ends that render it
    pub fn markup(&self) -> String {
        match self {
            Self::NoFilters => "You must add at least one entity filter.<br>Without an entity filter, the maintenance window would apply to the entire environment.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Check a draft before submission
pub fn validate_form(draft: &WindowDraft) -> Result<(), ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }

    let start = draft
        .start
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::StartRequired)?;
    let end = draft
        .end
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::EndRequired)?;

    let start_at = parse_date_time(start).ok_or_else(|| ValidationError::InvalidTime {
        field: "Start",
        value: start.to_string(),
    })?;
    let end_at = parse_date_time(end).ok_or_else(|| ValidationError::InvalidTime {
        field: "End",
        value: end.to_string(),
    })?;

    if end_at <= start_at {
        return Err(ValidationError::EndNotAfterStart);
    }

    if draft.filters.is_empty() {
        return Err(ValidationError::NoFilters);
    }

    if draft.filters.iter().any(|filter| filter.is_empty()) {
        return Err(ValidationError::EmptyFilter);
    }

    Ok(())
}
