//! Maintenance window task model and translation.
//!
//! The task model carries the deepest nesting in the crate: four mutually
//! exclusive invocation parameter blocks, S3 logging configuration, and
//! the legacy flat task-parameter map. Everything stays optional so a
//! template can state exactly as much as it needs.

use super::{bool_field, num_field, opt_map, opt_string, opt_vec, sdk_targets_to_model, TargetSelector};
use crate::redaction::SafeLog;
use anyhow::{Context, Result};
use aws_sdk_ssm as ssm;
use aws_smithy_types::Blob;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Template-author shape of a maintenance window task registration.
///
/// Tasks are not taggable in the SSM tagging API, so the model carries no
/// tag member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MaintenanceWindowTaskModel {
    pub window_id: Option<String>,
    pub window_task_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub task_arn: Option<String>,
    pub task_type: Option<String>,
    pub service_role_arn: Option<String>,
    pub priority: Option<i32>,
    pub max_concurrency: Option<String>,
    pub max_errors: Option<String>,
    pub cutoff_behavior: Option<String>,
    pub targets: Option<Vec<TargetSelector>>,
    /// Legacy flat parameter map; superseded by
    /// `TaskInvocationParameters` but still accepted.
    pub task_parameters: Option<HashMap<String, Vec<String>>>,
    pub task_invocation_parameters: Option<TaskInvocationParameters>,
    pub logging_info: Option<LoggingInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskInvocationParameters {
    pub maintenance_window_run_command_parameters: Option<RunCommandParameters>,
    pub maintenance_window_automation_parameters: Option<AutomationParameters>,
    pub maintenance_window_lambda_parameters: Option<LambdaParameters>,
    pub maintenance_window_step_functions_parameters: Option<StepFunctionsParameters>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RunCommandParameters {
    pub comment: Option<String>,
    pub document_hash: Option<String>,
    pub document_hash_type: Option<String>,
    pub document_version: Option<String>,
    pub output_s3_bucket_name: Option<String>,
    pub output_s3_key_prefix: Option<String>,
    pub parameters: Option<HashMap<String, Vec<String>>>,
    pub service_role_arn: Option<String>,
    pub timeout_seconds: Option<i32>,
    pub cloud_watch_output_config: Option<CloudWatchOutputConfig>,
    pub notification_config: Option<NotificationConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AutomationParameters {
    pub document_version: Option<String>,
    pub parameters: Option<HashMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LambdaParameters {
    pub client_context: Option<String>,
    pub qualifier: Option<String>,
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StepFunctionsParameters {
    pub input: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoggingInfo {
    pub s3_bucket: Option<String>,
    pub s3_prefix: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CloudWatchOutputConfig {
    pub cloud_watch_log_group_name: Option<String>,
    pub cloud_watch_output_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NotificationConfig {
    pub notification_arn: Option<String>,
    pub notification_events: Option<Vec<String>>,
    pub notification_type: Option<String>,
}

impl SafeLog for MaintenanceWindowTaskModel {
    fn allowed_fields() -> &'static [&'static str] {
        &[
            "WindowId",
            "WindowTaskId",
            "Name",
            "TaskArn",
            "TaskType",
            "ServiceRoleArn",
            "Priority",
            "MaxConcurrency",
            "MaxErrors",
            "CutoffBehavior",
        ]
    }
}

/// Convert a model logging configuration into the SDK shape.
pub fn logging_info_to_sdk(logging: &LoggingInfo) -> Result<ssm::types::LoggingInfo> {
    ssm::types::LoggingInfo::builder()
        .set_s3_bucket_name(opt_string(logging.s3_bucket.clone()))
        .set_s3_key_prefix(opt_string(logging.s3_prefix.clone()))
        .set_s3_region(opt_string(logging.region.clone()))
        .build()
        .context("logging info requires an S3 bucket and region")
}

fn logging_info_from_sdk(logging: &ssm::types::LoggingInfo) -> LoggingInfo {
    LoggingInfo {
        s3_bucket: Some(logging.s3_bucket_name().to_string()),
        s3_prefix: logging.s3_key_prefix().map(str::to_string),
        region: Some(logging.s3_region().to_string()),
    }
}

/// Convert model invocation parameters into the SDK shape.
pub fn invocation_parameters_to_sdk(
    parameters: &TaskInvocationParameters,
) -> ssm::types::MaintenanceWindowTaskInvocationParameters {
    let run_command = parameters
        .maintenance_window_run_command_parameters
        .as_ref()
        .map(|rc| {
            ssm::types::MaintenanceWindowRunCommandParameters::builder()
                .set_comment(opt_string(rc.comment.clone()))
                .set_document_hash(opt_string(rc.document_hash.clone()))
                .set_document_hash_type(
                    rc.document_hash_type
                        .as_deref()
                        .map(ssm::types::DocumentHashType::from),
                )
                .set_document_version(opt_string(rc.document_version.clone()))
                .set_output_s3_bucket_name(opt_string(rc.output_s3_bucket_name.clone()))
                .set_output_s3_key_prefix(opt_string(rc.output_s3_key_prefix.clone()))
                .set_parameters(opt_map(rc.parameters.clone()))
                .set_service_role_arn(opt_string(rc.service_role_arn.clone()))
                .set_timeout_seconds(rc.timeout_seconds)
                .set_cloud_watch_output_config(rc.cloud_watch_output_config.as_ref().map(|cw| {
                    ssm::types::CloudWatchOutputConfig::builder()
                        .set_cloud_watch_log_group_name(opt_string(
                            cw.cloud_watch_log_group_name.clone(),
                        ))
                        .set_cloud_watch_output_enabled(cw.cloud_watch_output_enabled)
                        .build()
                }))
                .set_notification_config(rc.notification_config.as_ref().map(|nc| {
                    ssm::types::NotificationConfig::builder()
                        .set_notification_arn(opt_string(nc.notification_arn.clone()))
                        .set_notification_events(opt_vec(nc.notification_events.clone()).map(
                            |events| {
                                events
                                    .iter()
                                    .map(|event| ssm::types::NotificationEvent::from(event.as_str()))
                                    .collect()
                            },
                        ))
                        .set_notification_type(
                            nc.notification_type
                                .as_deref()
                                .map(ssm::types::NotificationType::from),
                        )
                        .build()
                }))
                .build()
        });

    let automation = parameters
        .maintenance_window_automation_parameters
        .as_ref()
        .map(|auto| {
            ssm::types::MaintenanceWindowAutomationParameters::builder()
                .set_document_version(opt_string(auto.document_version.clone()))
                .set_parameters(opt_map(auto.parameters.clone()))
                .build()
        });

    let lambda = parameters
        .maintenance_window_lambda_parameters
        .as_ref()
        .map(|lambda| {
            ssm::types::MaintenanceWindowLambdaParameters::builder()
                .set_client_context(opt_string(lambda.client_context.clone()))
                .set_qualifier(opt_string(lambda.qualifier.clone()))
                .set_payload(
                    opt_string(lambda.payload.clone()).map(|payload| Blob::new(payload.into_bytes())),
                )
                .build()
        });

    let step_functions = parameters
        .maintenance_window_step_functions_parameters
        .as_ref()
        .map(|sf| {
            ssm::types::MaintenanceWindowStepFunctionsParameters::builder()
                .set_input(opt_string(sf.input.clone()))
                .set_name(opt_string(sf.name.clone()))
                .build()
        });

    ssm::types::MaintenanceWindowTaskInvocationParameters::builder()
        .set_run_command(run_command)
        .set_automation(automation)
        .set_lambda(lambda)
        .set_step_functions(step_functions)
        .build()
}

fn invocation_parameters_from_sdk(
    parameters: &ssm::types::MaintenanceWindowTaskInvocationParameters,
) -> TaskInvocationParameters {
    TaskInvocationParameters {
        maintenance_window_run_command_parameters: parameters.run_command().map(|rc| {
            RunCommandParameters {
                comment: rc.comment().map(str::to_string),
                document_hash: rc.document_hash().map(str::to_string),
                document_hash_type: rc
                    .document_hash_type()
                    .map(|hash_type| hash_type.as_str().to_string()),
                document_version: rc.document_version().map(str::to_string),
                output_s3_bucket_name: rc.output_s3_bucket_name().map(str::to_string),
                output_s3_key_prefix: rc.output_s3_key_prefix().map(str::to_string),
                parameters: opt_map(rc.parameters().cloned()),
                service_role_arn: rc.service_role_arn().map(str::to_string),
                timeout_seconds: num_field(rc.timeout_seconds),
                cloud_watch_output_config: rc.cloud_watch_output_config().map(|cw| {
                    CloudWatchOutputConfig {
                        cloud_watch_log_group_name: cw
                            .cloud_watch_log_group_name()
                            .map(str::to_string),
                        cloud_watch_output_enabled: bool_field(cw.cloud_watch_output_enabled),
                    }
                }),
                notification_config: rc.notification_config().map(|nc| NotificationConfig {
                    notification_arn: nc.notification_arn().map(str::to_string),
                    notification_events: opt_vec(Some(
                        nc.notification_events()
                            .iter()
                            .map(|event| event.as_str().to_string())
                            .collect(),
                    )),
                    notification_type: nc
                        .notification_type()
                        .map(|notification_type| notification_type.as_str().to_string()),
                }),
            }
        }),
        maintenance_window_automation_parameters: parameters.automation().map(|auto| {
            AutomationParameters {
                document_version: auto.document_version().map(str::to_string),
                parameters: opt_map(auto.parameters().cloned()),
            }
        }),
        maintenance_window_lambda_parameters: parameters.lambda().map(|lambda| LambdaParameters {
            client_context: lambda.client_context().map(str::to_string),
            qualifier: lambda.qualifier().map(str::to_string),
            payload: lambda
                .payload()
                .map(|payload| String::from_utf8_lossy(payload.as_ref()).into_owned()),
        }),
        maintenance_window_step_functions_parameters: parameters.step_functions().map(|sf| {
            StepFunctionsParameters {
                input: sf.input().map(str::to_string),
                name: sf.name().map(str::to_string),
            }
        }),
    }
}

/// Convert the legacy flat task-parameter map into the SDK expression map.
pub fn task_parameters_to_sdk(
    parameters: &HashMap<String, Vec<String>>,
) -> HashMap<String, ssm::types::MaintenanceWindowTaskParameterValueExpression> {
    parameters
        .iter()
        .map(|(key, values)| {
            (
                key.clone(),
                ssm::types::MaintenanceWindowTaskParameterValueExpression::builder()
                    .set_values(opt_vec(Some(values.clone())))
                    .build(),
            )
        })
        .collect()
}

fn task_parameters_from_sdk(
    parameters: &HashMap<String, ssm::types::MaintenanceWindowTaskParameterValueExpression>,
) -> HashMap<String, Vec<String>> {
    parameters
        .iter()
        .map(|(key, expression)| (key.clone(), expression.values().to_vec()))
        .collect()
}

/// Map a GetMaintenanceWindowTask response into the resource model.
pub fn from_get_task(
    output: &ssm::operation::get_maintenance_window_task::GetMaintenanceWindowTaskOutput,
) -> MaintenanceWindowTaskModel {
    MaintenanceWindowTaskModel {
        window_id: output.window_id().map(str::to_string),
        window_task_id: output.window_task_id().map(str::to_string),
        name: opt_string(output.name().map(str::to_string)),
        description: opt_string(output.description().map(str::to_string)),
        task_arn: output.task_arn().map(str::to_string),
        task_type: output.task_type().map(|task_type| task_type.as_str().to_string()),
        service_role_arn: output.service_role_arn().map(str::to_string),
        priority: num_field(output.priority),
        max_concurrency: output.max_concurrency().map(str::to_string),
        max_errors: output.max_errors().map(str::to_string),
        cutoff_behavior: output
            .cutoff_behavior()
            .map(|behavior| behavior.as_str().to_string()),
        targets: sdk_targets_to_model(output.targets()),
        task_parameters: opt_map(output.task_parameters().map(task_parameters_from_sdk)),
        task_invocation_parameters: output
            .task_invocation_parameters()
            .map(invocation_parameters_from_sdk),
        logging_info: output.logging_info().map(logging_info_from_sdk),
    }
}

/// Map a list-call task summary into the resource model.
pub fn from_task_summary(task: &ssm::types::MaintenanceWindowTask) -> MaintenanceWindowTaskModel {
    MaintenanceWindowTaskModel {
        window_id: task.window_id().map(str::to_string),
        window_task_id: task.window_task_id().map(str::to_string),
        name: opt_string(task.name().map(str::to_string)),
        description: opt_string(task.description().map(str::to_string)),
        task_arn: task.task_arn().map(str::to_string),
        task_type: task.r#type().map(|task_type| task_type.as_str().to_string()),
        service_role_arn: task.service_role_arn().map(str::to_string),
        priority: num_field(task.priority),
        max_concurrency: task.max_concurrency().map(str::to_string),
        max_errors: task.max_errors().map(str::to_string),
        cutoff_behavior: task
            .cutoff_behavior()
            .map(|behavior| behavior.as_str().to_string()),
        targets: sdk_targets_to_model(task.targets()),
        task_parameters: opt_map(task.task_parameters().map(task_parameters_from_sdk)),
        logging_info: task.logging_info().map(logging_info_from_sdk),
        ..MaintenanceWindowTaskModel::default()
    }
}
