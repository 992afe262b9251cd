//! Lifecycle handler for maintenance window targets.
//!
//! The service has no Get call for target registrations; reads filter a
//! Describe call down to the one registration id.

use super::HandlerRequest;
use crate::model::maintenance_window_target::{self, MaintenanceWindowTargetModel};
use crate::model::{opt_string, targets_to_sdk};
use crate::redaction::SafeLog;
use anyhow::{Context, Result};
use aws_sdk_ssm as ssm;

pub struct MaintenanceWindowTargetHandler {
    client: ssm::Client,
}

impl MaintenanceWindowTargetHandler {
    pub fn new(client: ssm::Client) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        request: &HandlerRequest<MaintenanceWindowTargetModel>,
    ) -> Result<MaintenanceWindowTargetModel> {
        let model = request
            .desired
            .as_ref()
            .context("create requires a desired state")?;
        let window_id = model
            .window_id
            .as_deref()
            .context("target registration requires a window id")?;
        tracing::info!(window_id, model = %model.safe_log(), "registering window target");

        let response = self
            .client
            .register_target_with_maintenance_window()
            .window_id(window_id)
            .set_resource_type(
                model
                    .resource_type
                    .as_deref()
                    .map(ssm::types::MaintenanceWindowResourceType::from),
            )
            .set_targets(model.targets.as_deref().map(targets_to_sdk))
            .set_owner_information(opt_string(model.owner_information.clone()))
            .set_name(opt_string(model.name.clone()))
            .set_description(opt_string(model.description.clone()))
            .send()
            .await
            .with_context(|| format!("RegisterTargetWithMaintenanceWindow failed for {}", window_id))?;

        let window_target_id = response
            .window_target_id
            .context("RegisterTargetWithMaintenanceWindow returned no target id")?;
        tracing::info!(window_id, %window_target_id, "window target registered");

        let mut created = model.clone();
        created.window_target_id = Some(window_target_id);
        Ok(created)
    }

    /// Read one target registration out of the window's describe listing.
    pub async fn read(
        &self,
        window_id: &str,
        window_target_id: &str,
    ) -> Result<MaintenanceWindowTargetModel> {
        let filter = ssm::types::MaintenanceWindowFilter::builder()
            .key("WindowTargetId")
            .values(window_target_id)
            .build();
        let response = self
            .client
            .describe_maintenance_window_targets()
            .window_id(window_id)
            .filters(filter)
            .send()
            .await
            .with_context(|| format!("DescribeMaintenanceWindowTargets failed for {}", window_id))?;

        let target = response
            .targets
            .unwrap_or_default()
            .into_iter()
            .find(|target| target.window_target_id() == Some(window_target_id))
            .with_context(|| {
                format!(
                    "target {} not found in window {}",
                    window_target_id, window_id
                )
            })?;
        Ok(maintenance_window_target::from_window_target(&target))
    }

    /// Replace the registration definition.
    pub async fn update(
        &self,
        request: &HandlerRequest<MaintenanceWindowTargetModel>,
    ) -> Result<MaintenanceWindowTargetModel> {
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
        let window_target_id = model
            .window_target_id
            .as_deref()
            .or_else(|| previous.and_then(|p| p.window_target_id.as_deref()))
            .context("update requires a window target id")?;
        tracing::info!(window_id, window_target_id, model = %model.safe_log(), "updating window target");

        self.client
            .update_maintenance_window_target()
            .window_id(window_id)
            .window_target_id(window_target_id)
            .set_targets(model.targets.as_deref().map(targets_to_sdk))
            .set_owner_information(opt_string(model.owner_information.clone()))
            .set_name(opt_string(model.name.clone()))
            .set_description(opt_string(model.description.clone()))
            .set_replace(Some(true))
            .send()
            .await
            .with_context(|| {
                format!(
                    "UpdateMaintenanceWindowTarget failed for {} in {}",
                    window_target_id, window_id
                )
            })?;

        let mut updated = model.clone();
        updated.window_id = Some(window_id.to_string());
        updated.window_target_id = Some(window_target_id.to_string());
        Ok(updated)
    }

    pub async fn delete(&self, window_id: &str, window_target_id: &str) -> Result<()> {
        tracing::info!(window_id, window_target_id, "deregistering window target");
        self.client
            .deregister_target_from_maintenance_window()
            .window_id(window_id)
            .window_target_id(window_target_id)
            .send()
            .await
            .with_context(|| {
                format!(
                    "DeregisterTargetFromMaintenanceWindow failed for {} in {}",
                    window_target_id, window_id
                )
            })?;
        Ok(())
    }

    /// List all target registrations of a window.
    pub async fn list(&self, window_id: &str) -> Result<Vec<MaintenanceWindowTargetModel>> {
        let mut paginator = self
            .client
            .describe_maintenance_window_targets()
            .window_id(window_id)
            .into_paginator()
            .send();

        let mut models = Vec::new();
        while let Some(page) = paginator.next().await {
            let page = page
                .with_context(|| format!("DescribeMaintenanceWindowTargets failed for {}", window_id))?;
            if let Some(targets) = page.targets {
                for target in targets {
                    models.push(maintenance_window_target::from_window_target(&target));
                }
            }
        }
        tracing::debug!(window_id, count = models.len(), "listed window targets");
        Ok(models)
    }
}
