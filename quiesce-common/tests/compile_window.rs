use quiesce_common::compiler::{build_auto_tag_payload, build_payload, plan_auto_tagging, MAINTENANCE_TAG_VALUE};
use quiesce_common::session::Session;
use quiesce_common::validation::validate_form;
use quiesce_common::{EntityReference, UnderlyingOption};

fn db_upgrade_session() -> Session {
    let session = Session::new("UTC")
        .with_name("DB upgrade")
        .with_schedule(Some("2024-01-01T02:00:00"), Some("2024-01-01T04:00:00"))
        .add_filter();
    let filter_id = session.draft.filters[0].id.clone();

    session
        .add_entity(&filter_id, EntityReference::new("HOST-42", "HOST", "db-01"))
        .set_underlying_option(&filter_id, UnderlyingOption::Services, true)
}

#[test]
fn db_upgrade_window_is_compiled_through_an_auto_tag() {
    let session = db_upgrade_session();
    validate_form(&session.draft).expect("draft should validate");

    let plan = plan_auto_tagging(&session.draft).expect("host with services needs auto-tagging");
    assert_eq!(plan.tag_key, "Maintenance — DB upgrade");

    let service_rules: Vec<_> = plan
        .rules
        .iter()
        .filter(|rule| rule.entity_selector.starts_with("type(SERVICE_INSTANCE)"))
        .collect();
    assert_eq!(service_rules.len(), 1);
    assert_eq!(
        service_rules[0].entity_selector,
        r#"type(SERVICE_INSTANCE),fromRelationships.runsOnHost(entityId("HOST-42"))"#
    );
    assert!(plan.rules.iter().all(|rule| rule.value_format == MAINTENANCE_TAG_VALUE));

    let tag = build_auto_tag_payload(&plan.tag_key, MAINTENANCE_TAG_VALUE, plan.rules.clone());
    assert_eq!(tag.value.name, "Maintenance — DB upgrade");

    let payload = build_payload(&session.draft, "dba@example.com", Some(&plan.tag_key));
    let filters = &payload.value.filters;
    assert!(!filters.is_empty());
    for filter in filters {
        assert!(filter.entity_id.is_none());
        assert!(filter
            .entity_tags
            .contains(&"Maintenance — DB upgrade:delete after expiration".to_string()));
    }
    assert!(filters
        .iter()
        .any(|f| f.entity_type.as_deref() == Some("SERVICE_INSTANCE")));

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["value"]["schedule"]["onceRecurrence"]["timeZone"], "UTC");
    assert_eq!(json["value"]["generalProperties"]["description"], "[dba@example.com]");
}

#[test]
fn plain_host_window_needs_no_auto_tag() {
    let session = db_upgrade_session();
    let filter_id = session.draft.filters[0].id.clone();
    let session = session.set_underlying_option(&filter_id, UnderlyingOption::Services, false);

    assert!(plan_auto_tagging(&session.draft).is_none());

    let payload = build_payload(&session.draft, "dba@example.com", None);
    assert_eq!(payload.value.filters.len(), 1);
    assert_eq!(payload.value.filters[0].entity_id.as_deref(), Some("HOST-42"));
}
