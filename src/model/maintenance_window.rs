//! Maintenance window model and translation.

use super::{bool_field, num_field, opt_string};
use crate::redaction::SafeLog;
use crate::tags::TagMap;
use aws_sdk_ssm as ssm;
use serde::{Deserialize, Serialize};

/// Template-author shape of a maintenance window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MaintenanceWindowModel {
    pub window_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub schedule: Option<String>,
    pub schedule_timezone: Option<String>,
    pub schedule_offset: Option<i32>,
    pub duration: Option<i32>,
    pub cutoff: Option<i32>,
    pub allow_unassociated_targets: Option<bool>,
    /// Read-only; the service reports whether the window is enabled.
    pub enabled: Option<bool>,
    pub tags: Option<TagMap>,
}

impl SafeLog for MaintenanceWindowModel {
    fn allowed_fields() -> &'static [&'static str] {
        &[
            "WindowId",
            "Name",
            "StartDate",
            "EndDate",
            "Schedule",
            "ScheduleTimezone",
            "ScheduleOffset",
            "Duration",
            "Cutoff",
            "AllowUnassociatedTargets",
            "Enabled",
        ]
    }
}

/// Map a GetMaintenanceWindow response into the resource model.
///
/// Tags are fetched separately by the caller.
pub fn from_get_window(
    output: &ssm::operation::get_maintenance_window::GetMaintenanceWindowOutput,
) -> MaintenanceWindowModel {
    MaintenanceWindowModel {
        window_id: output.window_id().map(str::to_string),
        name: output.name().map(str::to_string),
        description: opt_string(output.description().map(str::to_string)),
        start_date: opt_string(output.start_date().map(str::to_string)),
        end_date: opt_string(output.end_date().map(str::to_string)),
        schedule: output.schedule().map(str::to_string),
        schedule_timezone: opt_string(output.schedule_timezone().map(str::to_string)),
        schedule_offset: num_field(output.schedule_offset),
        duration: num_field(output.duration),
        cutoff: num_field(output.cutoff),
        allow_unassociated_targets: bool_field(output.allow_unassociated_targets),
        enabled: bool_field(output.enabled),
        tags: None,
    }
}

/// Map a list-call window identity into the resource model.
pub fn from_window_identity(
    identity: &ssm::types::MaintenanceWindowIdentity,
) -> MaintenanceWindowModel {
    MaintenanceWindowModel {
        window_id: identity.window_id().map(str::to_string),
        name: identity.name().map(str::to_string),
        description: opt_string(identity.description().map(str::to_string)),
        start_date: opt_string(identity.start_date().map(str::to_string)),
        end_date: opt_string(identity.end_date().map(str::to_string)),
        schedule: identity.schedule().map(str::to_string),
        schedule_timezone: opt_string(identity.schedule_timezone().map(str::to_string)),
        schedule_offset: num_field(identity.schedule_offset),
        duration: num_field(identity.duration),
        cutoff: num_field(identity.cutoff),
        enabled: bool_field(identity.enabled),
        ..MaintenanceWindowModel::default()
    }
}
