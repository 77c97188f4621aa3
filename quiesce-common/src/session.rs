///! Create session state
///! Every reducer consumes the session and returns the next one; operations on
///! an unknown filter id leave the session unchanged

use crate::bulk::BulkHostsDraft;
use crate::model::{
    EntityFilter, EntityReference, ManagementZone, SuppressionLevel, TagSpec, UnderlyingOption,
    UnderlyingOptions, WindowDraft,
};

/// Form state of one create session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub draft: WindowDraft,
    pub bulk: Option<BulkHostsDraft>,
}

impl Session {
    pub fn new(timezone: &str) -> Self {
        Self {
            draft: WindowDraft::new(timezone),
            bulk: None,
        }
    }

    /// Start over with an empty draft
    pub fn reset(self, timezone: &str) -> Self {
        Self::new(timezone)
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.draft.name = name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.draft.description = description.to_string();
        self
    }

    pub fn with_schedule(mut self, start: Option<&str>, end: Option<&str>) -> Self {
        self.draft.start = start.map(String::from);
        self.draft.end = end.map(String::from);
        self
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.draft.timezone = timezone.to_string();
        self
    }

    pub fn with_suppression(mut self, suppression: SuppressionLevel) -> Self {
        self.draft.suppression = suppression;
        self
    }

    pub fn with_disable_synthetics(mut self, disable: bool) -> Self {
        self.draft.disable_synthetics = disable;
        self
    }

    pub fn add_filter(mut self) -> Self {
        self.draft.filters.push(EntityFilter::new());
        self
    }

    pub fn remove_filter(mut self, filter_id: &str) -> Self {
        self.draft.filters.retain(|f| f.id != filter_id);
        self
    }

    pub fn add_management_zone(self, filter_id: &str, zone: ManagementZone) -> Self {
        self.update_filter(filter_id, |mut filter| {
            if !filter.management_zones.iter().any(|mz| mz.id == zone.id) {
                filter.management_zones.push(zone);
            }
            filter
        })
    }

    pub fn remove_management_zone(self, filter_id: &str, zone_id: &str) -> Self {
        self.update_filter(filter_id, |mut filter| {
            filter.management_zones.retain(|mz| mz.id != zone_id);
            filter
        })
    }

    /// Add a tag; a blank key is ignored
    pub fn add_tag(self, filter_id: &str, key: &str, value: Option<&str>) -> Self {
        let Ok(tag) = TagSpec::new(key, value) else {
            return self;
        };

        self.update_filter(filter_id, |mut filter| {
            filter.tags.push(tag);
            filter
        })
    }

    pub fn remove_tag(self, filter_id: &str, index: usize) -> Self {
        self.update_filter(filter_id, |mut filter| {
            if index < filter.tags.len() {
                filter.tags.remove(index);
            }
            filter
        })
    }

    pub fn add_entity(self, filter_id: &str, entity: EntityReference) -> Self {
        self.update_filter(filter_id, |mut filter| {
            if !filter.entities.iter().any(|e| e.entity_id == entity.entity_id) {
                filter.entities.push(entity);
            }
            filter
        })
    }

    /// Remove an entity; removing the last one resets the inclusion flags
    pub fn remove_entity(self, filter_id: &str, entity_id: &str) -> Self {
        self.update_filter(filter_id, |mut filter| {
            if filter.entities.len() <= 1 {
                filter.underlying_options = UnderlyingOptions::default();
            }
            filter.entities.retain(|e| e.entity_id != entity_id);
            filter
        })
    }

    /// Set an inclusion flag if the group's primary entity offers it
    pub fn set_underlying_option(self, filter_id: &str, option: UnderlyingOption, value: bool) -> Self {
        self.update_filter(filter_id, |mut filter| {
            let applies = filter
                .primary_kind()
                .is_some_and(|kind| kind.applicable_options().contains(&option));
            if applies {
                filter.underlying_options = filter.underlying_options.with(option, value);
            }
            filter
        })
    }

    pub fn open_bulk(mut self) -> Self {
        self.bulk = Some(BulkHostsDraft::new());
        self
    }

    pub fn close_bulk(mut self) -> Self {
        self.bulk = None;
        self
    }

    pub fn set_bulk_input(self, input: &str) -> Self {
        self.update_bulk(|mut bulk| {
            bulk.input = input.to_string();
            bulk
        })
    }

    pub fn add_bulk_zone(self, zone: ManagementZone) -> Self {
        self.update_bulk(|mut bulk| {
            if !bulk.management_zones.iter().any(|mz| mz.id == zone.id) {
                bulk.management_zones.push(zone);
            }
            bulk
        })
    }

    pub fn remove_bulk_zone(self, zone_id: &str) -> Self {
        self.update_bulk(|mut bulk| {
            bulk.management_zones.retain(|mz| mz.id != zone_id);
            bulk
        })
    }

    pub fn add_bulk_tag(self, key: &str, value: Option<&str>) -> Self {
        let Ok(tag) = TagSpec::new(key, value) else {
            return self;
        };

        self.update_bulk(|mut bulk| {
            bulk.tags.push(tag);
            bulk
        })
    }

    pub fn remove_bulk_tag(self, index: usize) -> Self {
        self.update_bulk(|mut bulk| {
            if index < bulk.tags.len() {
                bulk.tags.remove(index);
            }
            bulk
        })
    }

    pub fn set_bulk_include_processes(self, value: bool) -> Self {
        self.update_bulk(|mut bulk| {
            bulk.include_processes = value;
            bulk
        })
    }

    pub fn set_bulk_include_services(self, value: bool) -> Self {
        self.update_bulk(|mut bulk| {
            bulk.include_services = value;
            bulk
        })
    }

    /// Append the groups materialized from the bulk surface and close it
    pub fn commit_bulk_filters(mut self, filters: Vec<EntityFilter>) -> Self {
        if self.bulk.take().is_some() {
            self.draft.filters.extend(filters);
        }
        self
    }

    fn update_filter(mut self, filter_id: &str, f: impl FnOnce(EntityFilter) -> EntityFilter) -> Self {
        if let Some(pos) = self.draft.filters.iter().position(|filter| filter.id == filter_id) {
            let filter = self.draft.filters.remove(pos);
            self.draft.filters.insert(pos, f(filter));
        }
        self
    }

    fn update_bulk(mut self, f: impl FnOnce(BulkHostsDraft) -> BulkHostsDraft) -> Self {
        self.bulk = self.bulk.map(f);
        self
    }
}
