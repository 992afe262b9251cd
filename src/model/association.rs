//! State Manager association model and translation.

use super::{bool_field, num_field, opt_map, opt_string, opt_vec, sdk_targets_to_model, TargetSelector};
use crate::redaction::SafeLog;
use crate::tags::TagMap;
use aws_sdk_ssm as ssm;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Template-author shape of a State Manager association.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AssociationModel {
    pub association_id: Option<String>,
    pub association_name: Option<String>,
    /// Name of the SSM document the association applies.
    pub name: Option<String>,
    pub document_version: Option<String>,
    pub instance_id: Option<String>,
    pub parameters: Option<HashMap<String, Vec<String>>>,
    pub schedule_expression: Option<String>,
    pub schedule_offset: Option<i32>,
    pub targets: Option<Vec<TargetSelector>>,
    pub output_location: Option<OutputLocation>,
    pub automation_target_parameter_name: Option<String>,
    pub max_errors: Option<String>,
    pub max_concurrency: Option<String>,
    pub compliance_severity: Option<String>,
    pub sync_compliance: Option<String>,
    pub apply_only_at_cron_interval: Option<bool>,
    pub calendar_names: Option<Vec<String>>,
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OutputLocation {
    pub s3_location: Option<S3OutputLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct S3OutputLocation {
    pub output_s3_region: Option<String>,
    pub output_s3_bucket_name: Option<String>,
    pub output_s3_key_prefix: Option<String>,
}

impl SafeLog for AssociationModel {
    fn allowed_fields() -> &'static [&'static str] {
        &[
            "AssociationId",
            "AssociationName",
            "Name",
            "DocumentVersion",
            "InstanceId",
            "ScheduleExpression",
            "ScheduleOffset",
            "MaxErrors",
            "MaxConcurrency",
            "ComplianceSeverity",
            "SyncCompliance",
            "ApplyOnlyAtCronInterval",
            "CalendarNames",
        ]
    }
}

/// Convert a model output location into the SDK shape.
pub fn output_location_to_sdk(
    location: &OutputLocation,
) -> ssm::types::InstanceAssociationOutputLocation {
    let s3 = location.s3_location.as_ref().map(|s3| {
        ssm::types::S3OutputLocation::builder()
            .set_output_s3_region(opt_string(s3.output_s3_region.clone()))
            .set_output_s3_bucket_name(opt_string(s3.output_s3_bucket_name.clone()))
            .set_output_s3_key_prefix(opt_string(s3.output_s3_key_prefix.clone()))
            .build()
    });
    ssm::types::InstanceAssociationOutputLocation::builder()
        .set_s3_location(s3)
        .build()
}

fn output_location_from_sdk(
    location: &ssm::types::InstanceAssociationOutputLocation,
) -> OutputLocation {
    OutputLocation {
        s3_location: location.s3_location().map(|s3| S3OutputLocation {
            output_s3_region: s3.output_s3_region().map(str::to_string),
            output_s3_bucket_name: s3.output_s3_bucket_name().map(str::to_string),
            output_s3_key_prefix: s3.output_s3_key_prefix().map(str::to_string),
        }),
    }
}

/// Map a full association description into the resource model.
///
/// Tags are not part of the description and are filled in by the caller.
pub fn from_association_description(
    description: &ssm::types::AssociationDescription,
) -> AssociationModel {
    AssociationModel {
        association_id: description.association_id().map(str::to_string),
        association_name: description.association_name().map(str::to_string),
        name: description.name().map(str::to_string),
        document_version: description.document_version().map(str::to_string),
        instance_id: description.instance_id().map(str::to_string),
        parameters: opt_map(description.parameters().cloned()),
        schedule_expression: opt_string(description.schedule_expression().map(str::to_string)),
        schedule_offset: num_field(description.schedule_offset),
        targets: sdk_targets_to_model(description.targets()),
        output_location: description.output_location().map(output_location_from_sdk),
        automation_target_parameter_name: description
            .automation_target_parameter_name()
            .map(str::to_string),
        max_errors: description.max_errors().map(str::to_string),
        max_concurrency: description.max_concurrency().map(str::to_string),
        compliance_severity: description
            .compliance_severity()
            .map(|severity| severity.as_str().to_string()),
        sync_compliance: description
            .sync_compliance()
            .map(|compliance| compliance.as_str().to_string()),
        apply_only_at_cron_interval: bool_field(description.apply_only_at_cron_interval),
        calendar_names: opt_vec(Some(description.calendar_names().to_vec())),
        tags: None,
    }
}

/// Map a list-call association summary into the resource model.
pub fn from_association_summary(summary: &ssm::types::Association) -> AssociationModel {
    AssociationModel {
        association_id: summary.association_id().map(str::to_string),
        association_name: summary.association_name().map(str::to_string),
        name: summary.name().map(str::to_string),
        document_version: summary.document_version().map(str::to_string),
        instance_id: summary.instance_id().map(str::to_string),
        schedule_expression: opt_string(summary.schedule_expression().map(str::to_string)),
        schedule_offset: num_field(summary.schedule_offset),
        targets: sdk_targets_to_model(summary.targets()),
        ..AssociationModel::default()
    }
}
