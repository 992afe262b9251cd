//! Lifecycle handler for State Manager associations.

use super::{fetch_resource_tags, reconcile_tags, HandlerRequest};
use crate::model::association::{self, AssociationModel};
use crate::model::{opt_map, opt_string, opt_vec, targets_to_sdk};
use crate::redaction::SafeLog;
use crate::tags::TagMap;
use anyhow::{Context, Result};
use aws_sdk_ssm as ssm;
use ssm::types::ResourceTypeForTagging;

pub struct AssociationHandler {
    client: ssm::Client,
}

impl AssociationHandler {
    pub fn new(client: ssm::Client) -> Self {
        Self { client }
    }

    /// Create the association, then apply the consolidated tag set.
    ///
    /// CreateAssociation only hands back the association id in its
    /// response, so tagging happens as a follow-up call.
    pub async fn create(
        &self,
        request: &HandlerRequest<AssociationModel>,
    ) -> Result<AssociationModel> {
        let model = request
            .desired
            .as_ref()
            .context("create requires a desired state")?;
        tracing::info!(model = %model.safe_log(), "creating association");

        let response = self
            .client
            .create_association()
            .set_name(opt_string(model.name.clone()))
            .set_association_name(opt_string(model.association_name.clone()))
            .set_document_version(opt_string(model.document_version.clone()))
            .set_instance_id(opt_string(model.instance_id.clone()))
            .set_parameters(opt_map(model.parameters.clone()))
            .set_schedule_expression(opt_string(model.schedule_expression.clone()))
            .set_schedule_offset(model.schedule_offset)
            .set_targets(model.targets.as_deref().map(targets_to_sdk))
            .set_output_location(
                model
                    .output_location
                    .as_ref()
                    .map(association::output_location_to_sdk),
            )
            .set_automation_target_parameter_name(opt_string(
                model.automation_target_parameter_name.clone(),
            ))
            .set_max_errors(opt_string(model.max_errors.clone()))
            .set_max_concurrency(opt_string(model.max_concurrency.clone()))
            .set_compliance_severity(
                model
                    .compliance_severity
                    .as_deref()
                    .map(ssm::types::AssociationComplianceSeverity::from),
            )
            .set_sync_compliance(
                model
                    .sync_compliance
                    .as_deref()
                    .map(ssm::types::AssociationSyncCompliance::from),
            )
            .set_apply_only_at_cron_interval(model.apply_only_at_cron_interval)
            .set_calendar_names(opt_vec(model.calendar_names.clone()))
            .send()
            .await
            .context("CreateAssociation failed")?;

        let description = response
            .association_description
            .context("CreateAssociation returned no description")?;
        let association_id = description
            .association_id()
            .map(str::to_string)
            .context("CreateAssociation returned no association id")?;
        tracing::info!(%association_id, "association created");

        let desired_tags = request.desired_tags(model.tags.as_ref());
        if !desired_tags.is_empty() {
            reconcile_tags(
                &self.client,
                ResourceTypeForTagging::Association,
                &association_id,
                &desired_tags,
                &TagMap::new(),
            )
            .await?;
        }

        let mut created = association::from_association_description(&description);
        created.tags = opt_map(Some(desired_tags));
        Ok(created)
    }

    /// Read the association and its live tags.
    pub async fn read(&self, association_id: &str) -> Result<AssociationModel> {
        let response = self
            .client
            .describe_association()
            .association_id(association_id)
            .send()
            .await
            .with_context(|| format!("DescribeAssociation failed for {}", association_id))?;
        let description = response
            .association_description
            .with_context(|| format!("association {} has no description", association_id))?;

        let mut model = association::from_association_description(&description);
        let live_tags = fetch_resource_tags(
            &self.client,
            ResourceTypeForTagging::Association,
            association_id,
        )
        .await?;
        model.tags = opt_map(Some(live_tags));
        Ok(model)
    }

    /// Push the desired state and reconcile tags against the previous
    /// deployment.
    pub async fn update(
        &self,
        request: &HandlerRequest<AssociationModel>,
    ) -> Result<AssociationModel> {
        let model = request
            .desired
            .as_ref()
            .context("update requires a desired state")?;
        let association_id = model
            .association_id
            .as_deref()
            .or_else(|| {
                request
                    .previous
                    .as_ref()
                    .and_then(|previous| previous.association_id.as_deref())
            })
            .context("update requires an association id")?;
        tracing::info!(association_id, model = %model.safe_log(), "updating association");

        let response = self
            .client
            .update_association()
            .association_id(association_id)
            .set_name(opt_string(model.name.clone()))
            .set_association_name(opt_string(model.association_name.clone()))
            .set_document_version(opt_string(model.document_version.clone()))
            .set_parameters(opt_map(model.parameters.clone()))
            .set_schedule_expression(opt_string(model.schedule_expression.clone()))
            .set_schedule_offset(model.schedule_offset)
            .set_targets(model.targets.as_deref().map(targets_to_sdk))
            .set_output_location(
                model
                    .output_location
                    .as_ref()
                    .map(association::output_location_to_sdk),
            )
            .set_automation_target_parameter_name(opt_string(
                model.automation_target_parameter_name.clone(),
            ))
            .set_max_errors(opt_string(model.max_errors.clone()))
            .set_max_concurrency(opt_string(model.max_concurrency.clone()))
            .set_compliance_severity(
                model
                    .compliance_severity
                    .as_deref()
                    .map(ssm::types::AssociationComplianceSeverity::from),
            )
            .set_sync_compliance(
                model
                    .sync_compliance
                    .as_deref()
                    .map(ssm::types::AssociationSyncCompliance::from),
            )
            .set_apply_only_at_cron_interval(model.apply_only_at_cron_interval)
            .set_calendar_names(opt_vec(model.calendar_names.clone()))
            .send()
            .await
            .with_context(|| format!("UpdateAssociation failed for {}", association_id))?;

        let desired_tags = request.desired_tags(model.tags.as_ref());
        reconcile_tags(
            &self.client,
            ResourceTypeForTagging::Association,
            association_id,
            &desired_tags,
            &request.previous_tag_set(),
        )
        .await?;

        let mut updated = response
            .association_description
            .as_ref()
            .map(association::from_association_description)
            .unwrap_or_else(|| model.clone());
        updated.tags = opt_map(Some(desired_tags));
        Ok(updated)
    }

    pub async fn delete(&self, association_id: &str) -> Result<()> {
        tracing::info!(association_id, "deleting association");
        self.client
            .delete_association()
            .association_id(association_id)
            .send()
            .await
            .with_context(|| format!("DeleteAssociation failed for {}", association_id))?;
        Ok(())
    }

    /// List association summaries across the account and region.
    pub async fn list(&self) -> Result<Vec<AssociationModel>> {
        let mut paginator = self.client.list_associations().into_paginator().send();

        let mut models = Vec::new();
        while let Some(page) = paginator.next().await {
            let page = page.context("ListAssociations failed")?;
            if let Some(associations) = page.associations {
                for summary in associations {
                    models.push(association::from_association_summary(&summary));
                }
            }
        }
        tracing::debug!(count = models.len(), "listed associations");
        Ok(models)
    }
}
