//! Maintenance window target model and translation.

use super::{opt_string, sdk_targets_to_model, TargetSelector};
use crate::redaction::SafeLog;
use aws_sdk_ssm as ssm;
use serde::{Deserialize, Serialize};

/// Template-author shape of a maintenance window target registration.
///
/// Targets are not taggable in the SSM tagging API, so the model carries no
/// tag member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MaintenanceWindowTargetModel {
    pub window_id: Option<String>,
    pub window_target_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Free-form text the window owner attaches to the registration; kept
    /// out of logs.
    pub owner_information: Option<String>,
    pub resource_type: Option<String>,
    pub targets: Option<Vec<TargetSelector>>,
}

impl SafeLog for MaintenanceWindowTargetModel {
    fn allowed_fields() -> &'static [&'static str] {
        &["WindowId", "WindowTargetId", "Name", "ResourceType"]
    }
}

/// Map a described target registration into the resource model.
pub fn from_window_target(
    target: &ssm::types::MaintenanceWindowTarget,
) -> MaintenanceWindowTargetModel {
    MaintenanceWindowTargetModel {
        window_id: target.window_id().map(str::to_string),
        window_target_id: target.window_target_id().map(str::to_string),
        name: opt_string(target.name().map(str::to_string)),
        description: opt_string(target.description().map(str::to_string)),
        owner_information: opt_string(target.owner_information().map(str::to_string)),
        resource_type: target
            .resource_type()
            .map(|resource_type| resource_type.as_str().to_string()),
        targets: sdk_targets_to_model(target.targets()),
    }
}
