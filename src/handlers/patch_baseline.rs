//! Lifecycle handler for patch baselines.
//!
//! Beyond the baseline document itself, the handler manages two pieces of
//! registration state: membership of patch groups and the account default
//! baseline for an operating system. Group membership is reconciled with
//! the same add/remove arithmetic used for tags, on plain string sets.

use super::{fetch_resource_tags, reconcile_tags, HandlerRequest};
use crate::errors;
use crate::model::patch_baseline::{self, PatchBaselineModel};
use crate::model::{opt_map, opt_string, opt_vec, tag_map_to_sdk};
use crate::redaction::SafeLog;
use anyhow::{Context, Result};
use aws_sdk_ssm as ssm;
use ssm::types::ResourceTypeForTagging;
use std::collections::HashSet;

pub struct PatchBaselineHandler {
    client: ssm::Client,
}

impl PatchBaselineHandler {
    pub fn new(client: ssm::Client) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        request: &HandlerRequest<PatchBaselineModel>,
    ) -> Result<PatchBaselineModel> {
        let model = request
            .desired
            .as_ref()
            .context("create requires a desired state")?;
        tracing::info!(model = %model.safe_log(), "creating patch baseline");

        let desired_tags = request.desired_tags(model.tags.as_ref());
        let sdk_tags = if desired_tags.is_empty() {
            None
        } else {
            Some(tag_map_to_sdk(&desired_tags)?)
        };

        let response = self
            .client
            .create_patch_baseline()
            .set_name(opt_string(model.name.clone()))
            .set_description(opt_string(model.description.clone()))
            .set_operating_system(
                model
                    .operating_system
                    .as_deref()
                    .map(ssm::types::OperatingSystem::from),
            )
            .set_approval_rules(
                model
                    .approval_rules
                    .as_ref()
                    .map(patch_baseline::rule_group_to_sdk)
                    .transpose()?,
            )
            .set_global_filters(
                model
                    .global_filters
                    .as_ref()
                    .map(patch_baseline::filter_group_to_sdk)
                    .transpose()?,
            )
            .set_approved_patches(opt_vec(model.approved_patches.clone()))
            .set_approved_patches_compliance_level(
                model
                    .approved_patches_compliance_level
                    .as_deref()
                    .map(ssm::types::PatchComplianceLevel::from),
            )
            .set_approved_patches_enable_non_security(model.approved_patches_enable_non_security)
            .set_rejected_patches(opt_vec(model.rejected_patches.clone()))
            .set_rejected_patches_action(
                model
                    .rejected_patches_action
                    .as_deref()
                    .map(ssm::types::PatchAction::from),
            )
            .set_sources(
                model
                    .sources
                    .as_deref()
                    .map(patch_baseline::sources_to_sdk)
                    .transpose()?,
            )
            .set_tags(sdk_tags)
            .send()
            .await
            .context("CreatePatchBaseline failed")?;

        let baseline_id = response
            .baseline_id
            .context("CreatePatchBaseline returned no baseline id")?;
        tracing::info!(%baseline_id, "patch baseline created");

        for group in model.patch_groups.as_deref().unwrap_or_default() {
            self.register_patch_group(&baseline_id, group).await?;
        }
        if model.default_baseline == Some(true) {
            self.register_default(&baseline_id).await?;
        }

        let mut created = model.clone();
        created.baseline_id = Some(baseline_id);
        created.tags = opt_map(Some(desired_tags));
        Ok(created)
    }

    /// Read the baseline, its live tags, and its default-baseline status.
    pub async fn read(&self, baseline_id: &str) -> Result<PatchBaselineModel> {
        let response = self
            .client
            .get_patch_baseline()
            .baseline_id(baseline_id)
            .send()
            .await
            .with_context(|| format!("GetPatchBaseline failed for {}", baseline_id))?;

        let mut model = patch_baseline::from_get_baseline(&response);

        if let Some(os) = response.operating_system() {
            let default = self
                .client
                .get_default_patch_baseline()
                .operating_system(os.clone())
                .send()
                .await
                .context("GetDefaultPatchBaseline failed")?;
            model.default_baseline = Some(default.baseline_id() == Some(baseline_id));
        }

        let live_tags = fetch_resource_tags(
            &self.client,
            ResourceTypeForTagging::PatchBaseline,
            baseline_id,
        )
        .await?;
        model.tags = opt_map(Some(live_tags));
        Ok(model)
    }

    /// Replace the baseline document, reconcile group membership, default
    /// status, and tags.
    pub async fn update(
        &self,
        request: &HandlerRequest<PatchBaselineModel>,
    ) -> Result<PatchBaselineModel> {
        let model = request
            .desired
            .as_ref()
            .context("update requires a desired state")?;
        let baseline_id = model
            .baseline_id
            .as_deref()
            .or_else(|| {
                request
                    .previous
                    .as_ref()
                    .and_then(|previous| previous.baseline_id.as_deref())
            })
            .context("update requires a baseline id")?;
        tracing::info!(baseline_id, model = %model.safe_log(), "updating patch baseline");

        self.client
            .update_patch_baseline()
            .baseline_id(baseline_id)
            .set_name(opt_string(model.name.clone()))
            .set_description(opt_string(model.description.clone()))
            .set_approval_rules(
                model
                    .approval_rules
                    .as_ref()
                    .map(patch_baseline::rule_group_to_sdk)
                    .transpose()?,
            )
            .set_global_filters(
                model
                    .global_filters
                    .as_ref()
                    .map(patch_baseline::filter_group_to_sdk)
                    .transpose()?,
            )
            .set_approved_patches(opt_vec(model.approved_patches.clone()))
            .set_approved_patches_compliance_level(
                model
                    .approved_patches_compliance_level
                    .as_deref()
                    .map(ssm::types::PatchComplianceLevel::from),
            )
            .set_approved_patches_enable_non_security(model.approved_patches_enable_non_security)
            .set_rejected_patches(opt_vec(model.rejected_patches.clone()))
            .set_rejected_patches_action(
                model
                    .rejected_patches_action
                    .as_deref()
                    .map(ssm::types::PatchAction::from),
            )
            .set_sources(
                model
                    .sources
                    .as_deref()
                    .map(patch_baseline::sources_to_sdk)
                    .transpose()?,
            )
            .set_replace(Some(true))
            .send()
            .await
            .with_context(|| format!("UpdatePatchBaseline failed for {}", baseline_id))?;

        self.reconcile_patch_groups(baseline_id, request).await?;
        if model.default_baseline == Some(true) {
            self.register_default(baseline_id).await?;
        }

        let desired_tags = request.desired_tags(model.tags.as_ref());
        reconcile_tags(
            &self.client,
            ResourceTypeForTagging::PatchBaseline,
            baseline_id,
            &desired_tags,
            &request.previous_tag_set(),
        )
        .await?;

        let mut updated = model.clone();
        updated.baseline_id = Some(baseline_id.to_string());
        updated.tags = opt_map(Some(desired_tags));
        Ok(updated)
    }

    /// Delete the baseline, deregistering its patch groups first.
    pub async fn delete(&self, baseline_id: &str) -> Result<()> {
        tracing::info!(baseline_id, "deleting patch baseline");

        let groups = match self
            .client
            .get_patch_baseline()
            .baseline_id(baseline_id)
            .send()
            .await
            .map_err(anyhow::Error::from)
        {
            Ok(response) => response.patch_groups().to_vec(),
            Err(error) if errors::is_missing(&error) => {
                tracing::warn!(baseline_id, "patch baseline already gone");
                return Ok(());
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("GetPatchBaseline failed for {}", baseline_id));
            }
        };
        for group in &groups {
            self.deregister_patch_group(baseline_id, group).await?;
        }

        self.client
            .delete_patch_baseline()
            .baseline_id(baseline_id)
            .send()
            .await
            .with_context(|| format!("DeletePatchBaseline failed for {}", baseline_id))?;
        Ok(())
    }

    /// List baseline summaries across the account and region.
    pub async fn list(&self) -> Result<Vec<PatchBaselineModel>> {
        let mut paginator = self
            .client
            .describe_patch_baselines()
            .into_paginator()
            .send();

        let mut models = Vec::new();
        while let Some(page) = paginator.next().await {
            let page = page.context("DescribePatchBaselines failed")?;
            if let Some(identities) = page.baseline_identities {
                for identity in identities {
                    models.push(patch_baseline::from_baseline_identity(&identity));
                }
            }
        }
        tracing::debug!(count = models.len(), "listed patch baselines");
        Ok(models)
    }

    /// Register and deregister patch groups so membership matches the
    /// desired model.
    async fn reconcile_patch_groups(
        &self,
        baseline_id: &str,
        request: &HandlerRequest<PatchBaselineModel>,
    ) -> Result<()> {
        let desired: HashSet<String> = request
            .desired
            .as_ref()
            .and_then(|model| model.patch_groups.clone())
            .unwrap_or_default()
            .into_iter()
            .collect();
        let previous: HashSet<String> = request
            .previous
            .as_ref()
            .and_then(|model| model.patch_groups.clone())
            .unwrap_or_default()
            .into_iter()
            .collect();

        for group in desired.difference(&previous) {
            self.register_patch_group(baseline_id, group).await?;
        }
        for group in previous.difference(&desired) {
            self.deregister_patch_group(baseline_id, group).await?;
        }
        Ok(())
    }

    async fn register_patch_group(&self, baseline_id: &str, group: &str) -> Result<()> {
        tracing::debug!(baseline_id, group, "registering patch group");
        self.client
            .register_patch_baseline_for_patch_group()
            .baseline_id(baseline_id)
            .patch_group(group)
            .send()
            .await
            .with_context(|| format!("failed to register patch group {} on {}", group, baseline_id))?;
        Ok(())
    }

    async fn deregister_patch_group(&self, baseline_id: &str, group: &str) -> Result<()> {
        tracing::debug!(baseline_id, group, "deregistering patch group");
        self.client
            .deregister_patch_baseline_for_patch_group()
            .baseline_id(baseline_id)
            .patch_group(group)
            .send()
            .await
            .with_context(|| {
                format!("failed to deregister patch group {} on {}", group, baseline_id)
            })?;
        Ok(())
    }

    async fn register_default(&self, baseline_id: &str) -> Result<()> {
        tracing::debug!(baseline_id, "registering default patch baseline");
        self.client
            .register_default_patch_baseline()
            .baseline_id(baseline_id)
            .send()
            .await
            .with_context(|| format!("failed to set {} as default baseline", baseline_id))?;
        Ok(())
    }
}
