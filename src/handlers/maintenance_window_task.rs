//! Lifecycle handler for maintenance window tasks.

use super::HandlerRequest;
use crate::model::maintenance_window_task::{self, MaintenanceWindowTaskModel};
use crate::model::{opt_string, targets_to_sdk};
use crate::redaction::SafeLog;
use anyhow::{Context, Result};
use aws_sdk_ssm as ssm;

pub struct MaintenanceWindowTaskHandler {
    client: ssm::Client,
}

impl MaintenanceWindowTaskHandler {
    pub fn new(client: ssm::Client) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        request: &HandlerRequest<MaintenanceWindowTaskModel>,
    ) -> Result<MaintenanceWindowTaskModel> {
        let model = request
            .desired
            .as_ref()
            .context("create requires a desired state")?;
        let window_id = model
            .window_id
            .as_deref()
            .context("task registration requires a window id")?;
        tracing::info!(window_id, model = %model.safe_log(), "registering window task");

        let logging_info = model
            .logging_info
            .as_ref()
            .map(maintenance_window_task::logging_info_to_sdk)
            .transpose()?;

        let response = self
            .client
            .register_task_with_maintenance_window()
            .window_id(window_id)
            .set_task_arn(opt_string(model.task_arn.clone()))
            .set_task_type(
                model
                    .task_type
                    .as_deref()
                    .map(ssm::types::MaintenanceWindowTaskType::from),
            )
            .set_service_role_arn(opt_string(model.service_role_arn.clone()))
            .set_priority(model.priority)
            .set_max_concurrency(opt_string(model.max_concurrency.clone()))
            .set_max_errors(opt_string(model.max_errors.clone()))
            .set_cutoff_behavior(
                model
                    .cutoff_behavior
                    .as_deref()
                    .map(ssm::types::MaintenanceWindowTaskCutoffBehavior::from),
            )
            .set_targets(model.targets.as_deref().map(targets_to_sdk))
            .set_task_parameters(
                model
                    .task_parameters
                    .as_ref()
                    .map(maintenance_window_task::task_parameters_to_sdk),
            )
            .set_task_invocation_parameters(
                model
                    .task_invocation_parameters
                    .as_ref()
                    .map(maintenance_window_task::invocation_parameters_to_sdk),
            )
            .set_logging_info(logging_info)
            .set_name(opt_string(model.name.clone()))
            .set_description(opt_string(model.description.clone()))
            .send()
            .await
            .with_context(|| format!("RegisterTaskWithMaintenanceWindow failed for {}", window_id))?;

        let window_task_id = response
            .window_task_id
            .context("RegisterTaskWithMaintenanceWindow returned no task id")?;
        tracing::info!(window_id, %window_task_id, "window task registered");

        let mut created = model.clone();
        created.window_task_id = Some(window_task_id);
        Ok(created)
    }

    pub async fn read(
        &self,
        window_id: &str,
        window_task_id: &str,
    ) -> Result<MaintenanceWindowTaskModel> {
        let response = self
            .client
            .get_maintenance_window_task()
            .window_id(window_id)
            .window_task_id(window_task_id)
            .send()
            .await
            .with_context(|| {
                format!(
                    "GetMaintenanceWindowTask failed for {} in {}",
                    window_task_id, window_id
                )
            })?;
        Ok(maintenance_window_task::from_get_task(&response))
    }

    /// Replace the task definition.
    pub async fn update(
        &self,
        request: &HandlerRequest<MaintenanceWindowTaskModel>,
    ) -> Result<MaintenanceWindowTaskModel> {
        let model = request
            .desired
            .as_ref()
            .context("update requires a desired state")?;
        let previous = request.previous.as_ref();
        let window_id = model
            .window_id
            .as_deref()
            .or_else(|| previous.and_then(|p| p.window_id.as_deref()))
            .context("update requires a window id")?;
        let window_task_id = model
            .window_task_id
            .as_deref()
            .or_else(|| previous.and_then(|p| p.window_task_id.as_deref()))
            .context("update requires a window task id")?;
        tracing::info!(window_id, window_task_id, model = %model.safe_log(), "updating window task");

        let logging_info = model
            .logging_info
            .as_ref()
            .map(maintenance_window_task::logging_info_to_sdk)
            .transpose()?;

        self.client
            .update_maintenance_window_task()
            .window_id(window_id)
            .window_task_id(window_task_id)
            .set_task_arn(opt_string(model.task_arn.clone()))
            .set_service_role_arn(opt_string(model.service_role_arn.clone()))
            .set_priority(model.priority)
            .set_max_concurrency(opt_string(model.max_concurrency.clone()))
            .set_max_errors(opt_string(model.max_errors.clone()))
            .set_cutoff_behavior(
                model
                    .cutoff_behavior
                    .as_deref()
                    .map(ssm::types::MaintenanceWindowTaskCutoffBehavior::from),
            )
            .set_targets(model.targets.as_deref().map(targets_to_sdk))
            .set_task_parameters(
                model
                    .task_parameters
                    .as_ref()
                    .map(maintenance_window_task::task_parameters_to_sdk),
            )
            .set_task_invocation_parameters(
                model
                    .task_invocation_parameters
                    .as_ref()
                    .map(maintenance_window_task::invocation_parameters_to_sdk),
            )
            .set_logging_info(logging_info)
            .set_name(opt_string(model.name.clone()))
            .set_description(opt_string(model.description.clone()))
            .set_replace(Some(true))
            .send()
            .await
            .with_context(|| {
                format!(
                    "UpdateMaintenanceWindowTask failed for {} in {}",
                    window_task_id, window_id
                )
            })?;

        let mut updated = model.clone();
        updated.window_id = Some(window_id.to_string());
        updated.window_task_id = Some(window_task_id.to_string());
        Ok(updated)
    }

    pub async fn delete(&self, window_id: &str, window_task_id: &str) -> Result<()> {
        tracing::info!(window_id, window_task_id, "deregistering window task");
        self.client
            .deregister_task_from_maintenance_window()
            .window_id(window_id)
            .window_task_id(window_task_id)
            .send()
            .await
            .with_context(|| {
                format!(
                    "DeregisterTaskFromMaintenanceWindow failed for {} in {}",
                    window_task_id, window_id
                )
            })?;
        Ok(())
    }

    /// List all task registrations of a window.
    pub async fn list(&self, window_id: &str) -> Result<Vec<MaintenanceWindowTaskModel>> {
        let mut paginator = self
            .client
            .describe_maintenance_window_tasks()
            .window_id(window_id)
            .into_paginator()
            .send();

        let mut models = Vec::new();
        while let Some(page) = paginator.next().await {
            let page = page
                .with_context(|| format!("DescribeMaintenanceWindowTasks failed for {}", window_id))?;
            if let Some(tasks) = page.tasks {
                for task in tasks {
                    models.push(maintenance_window_task::from_task_summary(&task));
                }
            }
        }
        tracing::debug!(window_id, count = models.len(), "listed window tasks");
        Ok(models)
    }
}
