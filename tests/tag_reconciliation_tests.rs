//! Tag Reconciliation Tests
//!
//! Covers consolidation of the three tag sources and the add/remove deltas
//! between deployments, including the asymmetry between the two diffs: a
//! changed value is an addition but never a removal of its own key.
//!
//! # Test Coverage
//!
//! - **Source Precedence**: resource tags over stack tags over system tags
//! - **Consolidation**: every key from every source survives the merge
//! - **Deltas**: key-difference removals, entry-difference additions
//! - **Idempotence**: diffing a tag set against itself yields nothing
//! - **Handler Wiring**: handler requests consolidate the same way

use pretty_assertions::assert_eq;
use ssmbridge::handlers::HandlerRequest;
use ssmbridge::model::maintenance_window::MaintenanceWindowModel;
use ssmbridge::tags::{consolidate_tags, tags_to_create, tags_to_delete, TagMap};

/// Helper to build a tag map from key/value pairs
fn tag_map(entries: &[(&str, &str)]) -> TagMap {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

// ============================================================================
// Consolidation
// ============================================================================

#[test]
fn test_consolidate_merges_disjoint_sources() {
    let stack_tags = tag_map(&[("stackkey", "stackvalue")]);
    let system_tags = tag_map(&[("aws:somekey", "somevalue")]);
    let resource_tags = tag_map(&[("foo", "bar")]);

    let consolidated = consolidate_tags(
        Some(&stack_tags),
        Some(&system_tags),
        Some(&resource_tags),
    );

    assert_eq!(
        consolidated,
        tag_map(&[
            ("foo", "bar"),
            ("stackkey", "stackvalue"),
            ("aws:somekey", "somevalue"),
        ])
    );
}

#[test]
fn test_consolidate_resource_tags_win_collisions() {
    let stack_tags = tag_map(&[("allThree", "stack"), ("stackAndCloudformation", "stack")]);
    let system_tags = tag_map(&[
        ("allThree", "cloudformation"),
        ("stackAndCloudformation", "cloudformation"),
    ]);
    let resource_tags = tag_map(&[("allThree", "resource")]);

    let consolidated = consolidate_tags(
        Some(&stack_tags),
        Some(&system_tags),
        Some(&resource_tags),
    );

    // Resource tags beat both other sources; stack tags beat system tags.
    assert_eq!(consolidated["allThree"], "resource");
    assert_eq!(consolidated["stackAndCloudformation"], "stack");
    assert_eq!(consolidated.len(), 2);
}

#[test]
fn test_consolidate_contains_every_source_key() {
    let stack_tags = tag_map(&[("a", "1"), ("shared", "stack")]);
    let system_tags = tag_map(&[("b", "2"), ("shared", "system")]);
    let resource_tags = tag_map(&[("c", "3")]);

    let consolidated = consolidate_tags(
        Some(&stack_tags),
        Some(&system_tags),
        Some(&resource_tags),
    );

    for key in ["a", "b", "c", "shared"] {
        assert!(consolidated.contains_key(key), "missing key {}", key);
    }
    assert_eq!(consolidated["shared"], "stack");
}

#[test]
fn test_consolidate_missing_sources() {
    assert_eq!(consolidate_tags(None, None, None), TagMap::new());

    let resource_tags = tag_map(&[("foo", "bar")]);
    assert_eq!(
        consolidate_tags(None, None, Some(&resource_tags)),
        resource_tags
    );

    let system_tags = tag_map(&[("aws:cloudformation:stack-name", "demo")]);
    assert_eq!(
        consolidate_tags(None, Some(&system_tags), None),
        system_tags
    );
}

// ============================================================================
// Deltas
// ============================================================================

#[test]
fn test_delta_between_deployments() {
    let new_tags = tag_map(&[
        ("Key1", "Value1"),
        ("Key2", "Value2"),
        ("Key4", "Value4"),
    ]);
    let old_tags = tag_map(&[
        ("Key1", "Value1"),
        ("Key2", "Value4"),
        ("Key3", "Value3"),
    ]);

    // Key2 changed value, Key4 is new; Key1 is unchanged.
    assert_eq!(
        tags_to_create(&new_tags, &old_tags),
        tag_map(&[("Key2", "Value2"), ("Key4", "Value4")])
    );
    // Only Key3 fully disappeared; Key2 survives under a new value.
    assert_eq!(
        tags_to_delete(&new_tags, &old_tags),
        tag_map(&[("Key3", "Value3")])
    );
}

#[test]
fn test_create_delta_is_subset_of_new() {
    let new_tags = tag_map(&[("a", "1"), ("b", "2")]);
    let old_tags = tag_map(&[("b", "stale"), ("c", "3")]);

    let to_create = tags_to_create(&new_tags, &old_tags);
    for (key, value) in &to_create {
        assert_eq!(new_tags.get(key), Some(value));
    }
}

#[test]
fn test_delete_delta_is_subset_of_old() {
    let new_tags = tag_map(&[("a", "1")]);
    let old_tags = tag_map(&[("a", "stale"), ("b", "2"), ("c", "3")]);

    let to_delete = tags_to_delete(&new_tags, &old_tags);
    assert_eq!(to_delete, tag_map(&[("b", "2"), ("c", "3")]));
    for (key, value) in &to_delete {
        assert_eq!(old_tags.get(key), Some(value));
        assert!(!new_tags.contains_key(key));
    }
}

#[test]
fn test_deltas_of_identical_sets_are_empty() {
    let tags = tag_map(&[("Environment", "Production"), ("Team", "Backend")]);

    assert_eq!(tags_to_create(&tags, &tags), TagMap::new());
    assert_eq!(tags_to_delete(&tags, &tags), TagMap::new());
}

#[test]
fn test_changed_value_never_produces_removal() {
    let new_tags = tag_map(&[("flip", "after")]);
    let old_tags = tag_map(&[("flip", "before")]);

    assert_eq!(
        tags_to_create(&new_tags, &old_tags),
        tag_map(&[("flip", "after")])
    );
    assert_eq!(tags_to_delete(&new_tags, &old_tags), TagMap::new());
}

// ============================================================================
// Handler wiring
// ============================================================================

#[test]
fn test_handler_request_consolidates_sources() {
    let model = MaintenanceWindowModel {
        name: Some("nightly".to_string()),
        tags: Some(tag_map(&[("owner", "platform")])),
        ..MaintenanceWindowModel::default()
    };
    let resource_tags = model.tags.clone();

    let request = HandlerRequest {
        desired: Some(model),
        previous: None,
        stack_tags: Some(tag_map(&[("owner", "stack"), ("stack", "demo")])),
        system_tags: Some(tag_map(&[("aws:cloudformation:stack-name", "demo")])),
        previous_tags: None,
    };

    let consolidated = request.desired_tags(resource_tags.as_ref());
    assert_eq!(
        consolidated,
        tag_map(&[
            ("owner", "platform"),
            ("stack", "demo"),
            ("aws:cloudformation:stack-name", "demo"),
        ])
    );
    assert_eq!(request.previous_tag_set(), TagMap::new());
}
