//! Page-key pagination over settings listings

use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::Result;
use crate::services::{SettingsQuery, SettingsStore};

/// Page keys already followed during one listing
#[derive(Debug, Default)]
pub(crate) struct PageKeys {
    seen: HashSet<String>,
}

impl PageKeys {
    /// Key to request next; `None` ends the listing, either because the
    /// store sent no key or because the key was already followed
    pub(crate) fn next(&mut self, next_page_key: Option<String>, listing: &str) -> Option<String> {
        let key = next_page_key?;
        if self.seen.insert(key.clone()) {
            Some(key)
        } else {
            warn!("Listing {} revisited page key {}, stopping", listing, key);
            None
        }
    }
}

/// Fetch every page of a listing, following `nextPageKey` until absent.
///
/// A page key the store hands back a second time ends the loop.
pub async fn fetch_all_settings<S>(store: &S, query: &SettingsQuery) -> Result<Vec<Value>>
where
    S: SettingsStore + ?Sized,
{
    let mut items = Vec::new();
    let mut keys = PageKeys::default();
    let mut page_key: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store.list_settings(query, page_key.as_deref()).await?;
        pages += 1;
        items.extend(page.items);

        page_key = keys.next(page.next_page_key, &query.schema_ids);
        if page_key.is_none() {
            break;
        }
    }

    debug!("Fetched {} {} objects in {} pages", items.len(), query.schema_ids, pages);
    Ok(items)
}
