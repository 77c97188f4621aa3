//! Interactive entity search

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use quiesce_common::selector::name_contains_selector;
use quiesce_common::EntityReference;

use crate::services::{EntityQuery, EntityService};

/// Relative time window entity lookups are restricted to
pub const SEARCH_WINDOW: &str = "now-30d";

/// Results per interactive search
pub const SEARCH_PAGE_SIZE: u32 = 20;

/// Quiet period before a keystroke-driven search is sent
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Entities of a type whose name contains `term`; failures degrade to no results
pub async fn search_entities<E>(entities: &E, entity_type: &str, term: &str) -> Vec<EntityReference>
where
    E: EntityService + ?Sized,
{
    if entity_type.is_empty() || term.is_empty() {
        return Vec::new();
    }

    let query = EntityQuery {
        entity_selector: name_contains_selector(entity_type, term),
        from: SEARCH_WINDOW.to_string(),
        page_size: SEARCH_PAGE_SIZE,
    };

    match entities.search_entities(&query).await {
        Ok(hits) => hits
            .into_iter()
            .filter_map(|hit| {
                let id = hit.entity_id?;
                let name = hit.display_name.unwrap_or_else(|| id.clone());
                Some(EntityReference::new(&id, entity_type, &name))
            })
            .collect(),
        Err(e) => {
            error!("Failed to search entities: {}", e);
            Vec::new()
        }
    }
}

/// Results of one search request, tagged with its generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub generation: u64,
    pub entities: Vec<EntityReference>,
}

/// Debounced search where only the latest request's results are applied.
///
/// Every call takes a new generation number. A call superseded during the
/// debounce delay never reaches the service; a call superseded while its
/// request was in flight has its results dropped.
pub struct DebouncedSearch<E: ?Sized> {
    entities: Arc<E>,
    generation: AtomicU64,
    delay: Duration,
}

impl<E> DebouncedSearch<E>
where
    E: EntityService + ?Sized,
{
    pub fn new(entities: Arc<E>) -> Self {
        Self {
            entities,
            generation: AtomicU64::new(0),
            delay: SEARCH_DEBOUNCE,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Generation of the most recently issued request
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.latest_generation() == generation
    }

    /// Issue a search; `None` when a newer request superseded this one
    pub async fn search(&self, entity_type: &str, term: &str) -> Option<SearchResults> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if entity_type.is_empty() || term.is_empty() {
            return Some(SearchResults {
                generation,
                entities: Vec::new(),
            });
        }

        tokio::time::sleep(self.delay).await;
        if !self.is_current(generation) {
            return None;
        }

        let entities = search_entities(self.entities.as_ref(), entity_type, term).await;
        if !self.is_current(generation) {
            return None;
        }

        Some(SearchResults { generation, entities })
    }
}
