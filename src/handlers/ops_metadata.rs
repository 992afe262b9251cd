//! Lifecycle handler for ops metadata.
//!
//! Metadata updates ride on the same arithmetic as tags: entries to write
//! are the entry-difference against the previous state, keys to delete are
//! the key-difference. The service call takes both sets in one request.

use super::{fetch_resource_tags, reconcile_tags, HandlerRequest};
use crate::errors;
use crate::model::ops_metadata::{self, OpsMetadataModel};
use crate::model::{opt_map, tag_map_to_sdk};
use crate::redaction::SafeLog;
use crate::tags;
use anyhow::{Context, Result};
use aws_sdk_ssm as ssm;
use ssm::types::ResourceTypeForTagging;
use std::collections::HashMap;

pub struct OpsMetadataHandler {
    client: ssm::Client,
}

impl OpsMetadataHandler {
    pub fn new(client: ssm::Client) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        request: &HandlerRequest<OpsMetadataModel>,
    ) -> Result<OpsMetadataModel> {
        let model = request
            .desired
            .as_ref()
            .context("create requires a desired state")?;
        let resource_id = model
            .resource_id
            .as_deref()
            .context("ops metadata requires a resource id")?;
        tracing::info!(resource_id, model = %model.safe_log(), "creating ops metadata");

        let desired_tags = request.desired_tags(model.tags.as_ref());
        let sdk_tags = if desired_tags.is_empty() {
            None
        } else {
            Some(tag_map_to_sdk(&desired_tags)?)
        };

        let response = self
            .client
            .create_ops_metadata()
            .resource_id(resource_id)
            .set_metadata(
                opt_map(model.metadata.clone())
                    .as_ref()
                    .map(ops_metadata::metadata_to_sdk),
            )
            .set_tags(sdk_tags)
            .send()
            .await
            .with_context(|| format!("CreateOpsMetadata failed for {}", resource_id))?;

        let ops_metadata_arn = response
            .ops_metadata_arn
            .context("CreateOpsMetadata returned no ARN")?;
        tracing::info!(%ops_metadata_arn, "ops metadata created");

        let mut created = model.clone();
        created.ops_metadata_arn = Some(ops_metadata_arn);
        created.tags = opt_map(Some(desired_tags));
        Ok(created)
    }

    /// Read the metadata blob and its live tags.
    ///
    /// GetOpsMetadata pages its key/value entries, so reads follow the
    /// token until the map is complete.
    pub async fn read(&self, ops_metadata_arn: &str) -> Result<OpsMetadataModel> {
        let mut metadata = HashMap::new();
        let mut resource_id = None;
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .get_ops_metadata()
                .ops_metadata_arn(ops_metadata_arn)
                .set_next_token(next_token.clone())
                .send()
                .await
                .with_context(|| format!("GetOpsMetadata failed for {}", ops_metadata_arn))?;

            if let Some(id) = response.resource_id {
                resource_id = Some(id);
            }
            if let Some(page) = response.metadata {
                metadata.extend(ops_metadata::metadata_from_sdk(&page));
            }
            next_token = response.next_token;
            if next_token.is_none() {
                break;
            }
        }

        let live_tags = fetch_resource_tags(
            &self.client,
            ResourceTypeForTagging::Opsmetadata,
            ops_metadata_arn,
        )
        .await?;

        Ok(OpsMetadataModel {
            ops_metadata_arn: Some(ops_metadata_arn.to_string()),
            resource_id,
            metadata: opt_map(Some(metadata)),
            tags: opt_map(Some(live_tags)),
        })
    }

    /// Diff the metadata map against the previous deployment and push the
    /// delta, then reconcile tags.
    pub async fn update(
        &self,
        request: &HandlerRequest<OpsMetadataModel>,
    ) -> Result<OpsMetadataModel> {
        let model = request
            .desired
            .as_ref()
            .context("update requires a desired state")?;
        let ops_metadata_arn = model
            .ops_metadata_arn
            .as_deref()
            .or_else(|| {
                request
                    .previous
                    .as_ref()
                    .and_then(|previous| previous.ops_metadata_arn.as_deref())
            })
            .context("update requires an ops metadata ARN")?;
        tracing::info!(ops_metadata_arn, model = %model.safe_log(), "updating ops metadata");

        let desired_metadata = model.metadata.clone().unwrap_or_default();
        let previous_metadata = request
            .previous
            .as_ref()
            .and_then(|previous| previous.metadata.clone())
            .unwrap_or_default();

        let metadata_to_update = tags::tags_to_create(&desired_metadata, &previous_metadata);
        let keys_to_delete: Vec<String> =
            tags::tags_to_delete(&desired_metadata, &previous_metadata)
                .into_keys()
                .collect();

        if !metadata_to_update.is_empty() || !keys_to_delete.is_empty() {
            self.client
                .update_ops_metadata()
                .ops_metadata_arn(ops_metadata_arn)
                .set_metadata_to_update(if metadata_to_update.is_empty() {
                    None
                } else {
                    Some(ops_metadata::metadata_to_sdk(&metadata_to_update))
                })
                .set_keys_to_delete(if keys_to_delete.is_empty() {
                    None
                } else {
                    Some(keys_to_delete)
                })
                .send()
                .await
                .with_context(|| format!("UpdateOpsMetadata failed for {}", ops_metadata_arn))?;
        }

        let desired_tags = request.desired_tags(model.tags.as_ref());
        reconcile_tags(
            &self.client,
            ResourceTypeForTagging::Opsmetadata,
            ops_metadata_arn,
            &desired_tags,
            &request.previous_tag_set(),
        )
        .await?;

        let mut updated = model.clone();
        updated.ops_metadata_arn = Some(ops_metadata_arn.to_string());
        updated.tags = opt_map(Some(desired_tags));
        Ok(updated)
    }

    pub async fn delete(&self, ops_metadata_arn: &str) -> Result<()> {
        tracing::info!(ops_metadata_arn, "deleting ops metadata");
        if let Err(error) = self
            .client
            .delete_ops_metadata()
            .ops_metadata_arn(ops_metadata_arn)
            .send()
            .await
            .map_err(anyhow::Error::from)
        {
            if errors::is_missing(&error) {
                tracing::warn!(ops_metadata_arn, "ops metadata already gone");
                return Ok(());
            }
            return Err(error)
                .with_context(|| format!("DeleteOpsMetadata failed for {}", ops_metadata_arn));
        }
        Ok(())
    }

    /// List ops metadata summaries across the account and region.
    pub async fn list(&self) -> Result<Vec<OpsMetadataModel>> {
        let mut paginator = self.client.list_ops_metadata().into_paginator().send();

        let mut models = Vec::new();
        while let Some(page) = paginator.next().await {
            let page = page.context("ListOpsMetadata failed")?;
            if let Some(summaries) = page.ops_metadata_list {
                for summary in summaries {
                    models.push(ops_metadata::from_ops_metadata_summary(&summary));
                }
            }
        }
        tracing::debug!(count = models.len(), "listed ops metadata");
        Ok(models)
    }
}
