//! Ops metadata model and translation.

use crate::redaction::SafeLog;
use crate::tags::TagMap;
use aws_sdk_ssm as ssm;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Template-author shape of an ops metadata blob.
///
/// The service wraps each metadata value in a structure; the model
/// flattens it to plain key/value pairs, which also lets the handlers
/// diff metadata with the same arithmetic used for tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OpsMetadataModel {
    pub ops_metadata_arn: Option<String>,
    pub resource_id: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
    pub tags: Option<TagMap>,
}

impl SafeLog for OpsMetadataModel {
    fn allowed_fields() -> &'static [&'static str] {
        &["OpsMetadataArn", "ResourceId"]
    }
}

/// Wrap a flat metadata map into the SDK value structures.
pub fn metadata_to_sdk(
    metadata: &HashMap<String, String>,
) -> HashMap<String, ssm::types::MetadataValue> {
    metadata
        .iter()
        .map(|(key, value)| {
            (
                key.clone(),
                ssm::types::MetadataValue::builder().value(value).build(),
            )
        })
        .collect()
}

/// Flatten SDK metadata value structures into a plain map.
pub fn metadata_from_sdk(
    metadata: &HashMap<String, ssm::types::MetadataValue>,
) -> HashMap<String, String> {
    metadata
        .iter()
        .map(|(key, value)| (key.clone(), value.value().unwrap_or_default().to_string()))
        .collect()
}

/// Map a list-call ops metadata summary into the resource model.
pub fn from_ops_metadata_summary(summary: &ssm::types::OpsMetadata) -> OpsMetadataModel {
    OpsMetadataModel {
        ops_metadata_arn: summary.ops_metadata_arn().map(str::to_string),
        resource_id: summary.resource_id().map(str::to_string),
        ..OpsMetadataModel::default()
    }
}
