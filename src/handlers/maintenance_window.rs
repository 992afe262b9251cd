//! Lifecycle handler for maintenance windows.

use super::{fetch_resource_tags, reconcile_tags, HandlerRequest};
use crate::errors;
use crate::model::maintenance_window::{self, MaintenanceWindowModel};
use crate::model::{opt_map, opt_string, tag_map_to_sdk};
use crate::redaction::SafeLog;
use anyhow::{Context, Result};
use aws_sdk_ssm as ssm;
use ssm::types::ResourceTypeForTagging;

pub struct MaintenanceWindowHandler {
    client: ssm::Client,
}

impl MaintenanceWindowHandler {
    pub fn new(client: ssm::Client) -> Self {
        Self { client }
    }

    /// Create the window with its consolidated tag set attached.
    pub async fn create(
        &self,
        request: &HandlerRequest<MaintenanceWindowModel>,
    ) -> Result<MaintenanceWindowModel> {
        let model = request
            .desired
            .as_ref()
            .context("create requires a desired state")?;
        tracing::info!(model = %model.safe_log(), "creating maintenance window");

        let desired_tags = request.desired_tags(model.tags.as_ref());
        let sdk_tags = if desired_tags.is_empty() {
            None
        } else {
            Some(tag_map_to_sdk(&desired_tags)?)
        };

        let response = self
            .client
            .create_maintenance_window()
            .set_name(opt_string(model.name.clone()))
            .set_description(opt_string(model.description.clone()))
            .set_start_date(opt_string(model.start_date.clone()))
            .set_end_date(opt_string(model.end_date.clone()))
            .set_schedule(opt_string(model.schedule.clone()))
            .set_schedule_timezone(opt_string(model.schedule_timezone.clone()))
            .set_schedule_offset(model.schedule_offset)
            .set_duration(model.duration)
            .set_cutoff(model.cutoff)
            .set_allow_unassociated_targets(model.allow_unassociated_targets)
            .set_tags(sdk_tags)
            .send()
            .await
            .context("CreateMaintenanceWindow failed")?;

        let window_id = response
            .window_id
            .context("CreateMaintenanceWindow returned no window id")?;
        tracing::info!(%window_id, "maintenance window created");

        let mut created = model.clone();
        created.window_id = Some(window_id);
        created.tags = opt_map(Some(desired_tags));
        Ok(created)
    }

    /// Read the window and its live tags.
    pub async fn read(&self, window_id: &str) -> Result<MaintenanceWindowModel> {
        let response = self
            .client
            .get_maintenance_window()
            .window_id(window_id)
            .send()
            .await
            .with_context(|| format!("GetMaintenanceWindow failed for {}", window_id))?;

        let mut model = maintenance_window::from_get_window(&response);
        let live_tags = fetch_resource_tags(
            &self.client,
            ResourceTypeForTagging::MaintenanceWindow,
            window_id,
        )
        .await?;
        model.tags = opt_map(Some(live_tags));
        Ok(model)
    }

    /// Replace the window definition and reconcile tags.
    ///
    /// `Replace` is set so members absent from the desired model are
    /// cleared on the service side rather than silently retained.
    pub async fn update(
        &self,
        request: &HandlerRequest<MaintenanceWindowModel>,
    ) -> Result<MaintenanceWindowModel> {
        let model = request
            .desired
            .as_ref()
            .context("update requires a desired state")?;
        let window_id = model
            .window_id
            .as_deref()
            .or_else(|| {
                request
                    .previous
                    .as_ref()
                    .and_then(|previous| previous.window_id.as_deref())
            })
            .context("update requires a window id")?;
        tracing::info!(window_id, model = %model.safe_log(), "updating maintenance window");

        self.client
            .update_maintenance_window()
            .window_id(window_id)
            .set_name(opt_string(model.name.clone()))
            .set_description(opt_string(model.description.clone()))
            .set_start_date(opt_string(model.start_date.clone()))
            .set_end_date(opt_string(model.end_date.clone()))
            .set_schedule(opt_string(model.schedule.clone()))
            .set_schedule_timezone(opt_string(model.schedule_timezone.clone()))
            .set_schedule_offset(model.schedule_offset)
            .set_duration(model.duration)
            .set_cutoff(model.cutoff)
            .set_allow_unassociated_targets(model.allow_unassociated_targets)
            .set_replace(Some(true))
            .send()
            .await
            .with_context(|| format!("UpdateMaintenanceWindow failed for {}", window_id))?;

        let desired_tags = request.desired_tags(model.tags.as_ref());
        reconcile_tags(
            &self.client,
            ResourceTypeForTagging::MaintenanceWindow,
            window_id,
            &desired_tags,
            &request.previous_tag_set(),
        )
        .await?;

        let mut updated = model.clone();
        updated.window_id = Some(window_id.to_string());
        updated.tags = opt_map(Some(desired_tags));
        Ok(updated)
    }

    pub async fn delete(&self, window_id: &str) -> Result<()> {
        tracing::info!(window_id, "deleting maintenance window");
        if let Err(error) = self
            .client
            .delete_maintenance_window()
            .window_id(window_id)
            .send()
            .await
            .map_err(anyhow::Error::from)
        {
            if errors::is_missing(&error) {
                tracing::warn!(window_id, "maintenance window already gone");
                return Ok(());
            }
            return Err(error)
                .with_context(|| format!("DeleteMaintenanceWindow failed for {}", window_id));
        }
        Ok(())
    }

    /// List window summaries, enriched with each window's tags.
    ///
    /// Tag fetches run concurrently; a window whose tags cannot be read is
    /// still listed, with the failure kind logged.
    pub async fn list(&self) -> Result<Vec<MaintenanceWindowModel>> {
        let mut paginator = self
            .client
            .describe_maintenance_windows()
            .into_paginator()
            .send();

        let mut models = Vec::new();
        while let Some(page) = paginator.next().await {
            let page = page.context("DescribeMaintenanceWindows failed")?;
            if let Some(identities) = page.window_identities {
                for identity in identities {
                    models.push(maintenance_window::from_window_identity(&identity));
                }
            }
        }

        let tag_fetches = models.iter().map(|model| {
            let client = self.client.clone();
            let window_id = model.window_id.clone();
            async move {
                match window_id {
                    Some(id) => fetch_resource_tags(
                        &client,
                        ResourceTypeForTagging::MaintenanceWindow,
                        &id,
                    )
                    .await
                    .map(Some),
                    None => Ok(None),
                }
            }
        });
        let fetched = futures::future::join_all(tag_fetches).await;

        for (model, tags) in models.iter_mut().zip(fetched) {
            match tags {
                Ok(tags) => model.tags = opt_map(tags),
                Err(error) => {
                    let kind = errors::categorize(&error);
                    tracing::warn!(
                        window_id = model.window_id.as_deref().unwrap_or("unknown"),
                        ?kind,
                        "failed to fetch tags for listed window"
                    );
                }
            }
        }

        tracing::debug!(count = models.len(), "listed maintenance windows");
        Ok(models)
    }
}
