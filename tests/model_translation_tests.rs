//! Model Translation Tests
//!
//! Exercises the translation seams between template-author models and the
//! SSM service shapes: PascalCase serde handling, empty-value
//! normalization in both directions, and the fallible conversions for
//! shapes the service requires to be complete.

use aws_sdk_ssm as ssm;
use pretty_assertions::assert_eq;
use ssmbridge::model::association::{self, AssociationModel};
use ssmbridge::model::maintenance_window_target;
use ssmbridge::model::maintenance_window_task::{self, LoggingInfo, TaskInvocationParameters};
use ssmbridge::model::ops_metadata;
use ssmbridge::model::patch_baseline::{self, PatchFilter, PatchFilterGroup};
use ssmbridge::model::{sdk_tags_to_map, tag_map_to_sdk, targets_to_sdk, TargetSelector};
use ssmbridge::tags::TagMap;
use std::collections::HashMap;

// ============================================================================
// Template-author serde shape
// ============================================================================

#[test]
fn test_association_model_reads_template_json() {
    let template = r#"{
        "Name": "AWS-RunPatchBaseline",
        "ScheduleExpression": "cron(0 2 ? * SUN *)",
        "Targets": [{"Key": "tag:Patch Group", "Values": ["web-servers"]}],
        "Parameters": {"Operation": ["Install"]},
        "MaxConcurrency": "10%",
        "ApplyOnlyAtCronInterval": true
    }"#;

    let model: AssociationModel = serde_json::from_str(template).expect("valid template");
    assert_eq!(model.name.as_deref(), Some("AWS-RunPatchBaseline"));
    assert_eq!(
        model.schedule_expression.as_deref(),
        Some("cron(0 2 ? * SUN *)")
    );
    assert_eq!(model.apply_only_at_cron_interval, Some(true));
    assert_eq!(model.max_concurrency.as_deref(), Some("10%"));
    assert_eq!(
        model.targets,
        Some(vec![TargetSelector {
            key: Some("tag:Patch Group".to_string()),
            values: Some(vec!["web-servers".to_string()]),
        }])
    );
    // Members the template left out stay absent.
    assert_eq!(model.association_id, None);
    assert_eq!(model.output_location, None);
}

#[test]
fn test_model_json_round_trip_keeps_pascal_case() {
    let model = AssociationModel {
        association_name: Some("patch-every-sunday".to_string()),
        schedule_offset: Some(2),
        ..AssociationModel::default()
    };

    let value = serde_json::to_value(&model).expect("serializable");
    assert_eq!(value["AssociationName"], "patch-every-sunday");
    assert_eq!(value["ScheduleOffset"], 2);

    let back: AssociationModel = serde_json::from_value(value).expect("deserializable");
    assert_eq!(back, model);
}

// ============================================================================
// Service-shape translation
// ============================================================================

#[test]
fn test_association_description_to_model() {
    let mut parameters = HashMap::new();
    parameters.insert("Operation".to_string(), vec!["Install".to_string()]);

    let description = ssm::types::AssociationDescription::builder()
        .association_id("f8d1c0a2-example")
        .association_name("patch-every-sunday")
        .name("AWS-RunPatchBaseline")
        .schedule_expression("cron(0 2 ? * SUN *)")
        .set_parameters(Some(parameters.clone()))
        .targets(
            ssm::types::Target::builder()
                .key("tag:Patch Group")
                .values("web-servers")
                .build(),
        )
        .max_concurrency("10%")
        .build();

    let model = association::from_association_description(&description);
    assert_eq!(model.association_id.as_deref(), Some("f8d1c0a2-example"));
    assert_eq!(model.name.as_deref(), Some("AWS-RunPatchBaseline"));
    assert_eq!(model.parameters, Some(parameters));
    assert_eq!(model.max_concurrency.as_deref(), Some("10%"));
    assert_eq!(
        model.targets,
        Some(vec![TargetSelector {
            key: Some("tag:Patch Group".to_string()),
            values: Some(vec!["web-servers".to_string()]),
        }])
    );
    // Tags ride on a separate API and are filled in by the handler.
    assert_eq!(model.tags, None);
}

#[test]
fn test_window_target_empty_members_normalize_to_absent() {
    let target = ssm::types::MaintenanceWindowTarget::builder()
        .window_id("mw-0example")
        .window_target_id("e32eecb2-example")
        .resource_type(ssm::types::MaintenanceWindowResourceType::Instance)
        .name("")
        .owner_information("")
        .build();

    let model = maintenance_window_target::from_window_target(&target);
    assert_eq!(model.window_id.as_deref(), Some("mw-0example"));
    assert_eq!(model.resource_type.as_deref(), Some("INSTANCE"));
    assert_eq!(model.name, None);
    assert_eq!(model.owner_information, None);
    assert_eq!(model.targets, None);
}

#[test]
fn test_blank_target_selector_members_stay_off_the_wire() {
    let selectors = vec![TargetSelector {
        key: Some(String::new()),
        values: Some(Vec::new()),
    }];

    let sdk = targets_to_sdk(&selectors);
    assert_eq!(sdk.len(), 1);
    assert_eq!(sdk[0].key(), None);
    assert!(sdk[0].values().is_empty());
}

#[test]
fn test_tag_conversion_round_trip_is_sorted() {
    let mut tags = TagMap::new();
    tags.insert("Team".to_string(), "Backend".to_string());
    tags.insert("Environment".to_string(), "Production".to_string());

    let sdk = tag_map_to_sdk(&tags).expect("valid tags");
    let keys: Vec<&str> = sdk.iter().map(|tag| tag.key()).collect();
    assert_eq!(keys, vec!["Environment", "Team"]);
    assert_eq!(sdk_tags_to_map(&sdk), tags);
}

// ============================================================================
// Fallible conversions
// ============================================================================

#[test]
fn test_patch_filter_group_requires_complete_filters() {
    let complete = PatchFilterGroup {
        patch_filters: Some(vec![PatchFilter {
            key: Some("PRODUCT".to_string()),
            values: Some(vec!["WindowsServer2019".to_string()]),
        }]),
    };
    let group = patch_baseline::filter_group_to_sdk(&complete).expect("complete filter");
    assert_eq!(group.patch_filters().len(), 1);
    assert_eq!(group.patch_filters()[0].values(), ["WindowsServer2019"]);

    let incomplete = PatchFilterGroup {
        patch_filters: Some(vec![PatchFilter {
            key: Some("PRODUCT".to_string()),
            values: None,
        }]),
    };
    assert!(patch_baseline::filter_group_to_sdk(&incomplete).is_err());
}

#[test]
fn test_logging_info_requires_bucket_and_region() {
    let complete = LoggingInfo {
        s3_bucket: Some("mw-task-logs".to_string()),
        s3_prefix: None,
        region: Some("us-east-1".to_string()),
    };
    let logging = maintenance_window_task::logging_info_to_sdk(&complete).expect("complete");
    assert_eq!(logging.s3_bucket_name(), "mw-task-logs");
    assert_eq!(logging.s3_region(), "us-east-1");

    let incomplete = LoggingInfo {
        s3_bucket: Some("mw-task-logs".to_string()),
        s3_prefix: Some("nightly/".to_string()),
        region: None,
    };
    assert!(maintenance_window_task::logging_info_to_sdk(&incomplete).is_err());
}

#[test]
fn test_run_command_invocation_parameters_translate() {
    let mut run_command_parameters = HashMap::new();
    run_command_parameters.insert("commands".to_string(), vec!["uptime".to_string()]);

    let parameters = TaskInvocationParameters {
        maintenance_window_run_command_parameters: Some(
            maintenance_window_task::RunCommandParameters {
                comment: Some("weekly check".to_string()),
                parameters: Some(run_command_parameters.clone()),
                timeout_seconds: Some(600),
                ..maintenance_window_task::RunCommandParameters::default()
            },
        ),
        ..TaskInvocationParameters::default()
    };

    let sdk = maintenance_window_task::invocation_parameters_to_sdk(&parameters);
    let run_command = sdk.run_command().expect("run command block");
    assert_eq!(run_command.comment(), Some("weekly check"));
    assert_eq!(run_command.parameters(), Some(&run_command_parameters));
    assert!(sdk.automation().is_none());
    assert!(sdk.lambda().is_none());
}

// ============================================================================
// Ops metadata flattening
// ============================================================================

#[test]
fn test_metadata_round_trip_flattens_values() {
    let mut metadata = HashMap::new();
    metadata.insert(
        "/aws/ssm/app/environment".to_string(),
        "production".to_string(),
    );

    let sdk = ops_metadata::metadata_to_sdk(&metadata);
    assert_eq!(
        sdk["/aws/ssm/app/environment"].value(),
        Some("production")
    );
    assert_eq!(ops_metadata::metadata_from_sdk(&sdk), metadata);
}
