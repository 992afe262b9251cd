//! Lifecycle handlers for the SSM sub-resources.
//!
//! Each handler owns an SSM client and exposes the create/read/update/
//! delete/list operations for one resource. The deployment engine driving
//! them supplies a [`HandlerRequest`]: the desired and previous models plus
//! the tag sources described in the tag module.

pub mod association;
pub mod maintenance_window;
pub mod maintenance_window_target;
pub mod maintenance_window_task;
pub mod ops_metadata;
pub mod patch_baseline;

use crate::model::{sdk_tags_to_map, tag_map_to_sdk};
use crate::tags::{self, TagMap};
use anyhow::{Context, Result};
use aws_sdk_ssm as ssm;
use ssm::types::ResourceTypeForTagging;

/// What the deployment engine hands a lifecycle handler.
#[derive(Debug, Clone)]
pub struct HandlerRequest<M> {
    /// Desired resource state; absent for delete and list calls.
    pub desired: Option<M>,
    /// Previously applied resource state; absent for create calls.
    pub previous: Option<M>,
    /// Tags propagated from the enclosing stack.
    pub stack_tags: Option<TagMap>,
    /// Tags injected by the platform, outside user control.
    pub system_tags: Option<TagMap>,
    /// Consolidated tag set applied by the previous deployment.
    pub previous_tags: Option<TagMap>,
}

impl<M> Default for HandlerRequest<M> {
    fn default() -> Self {
        Self {
            desired: None,
            previous: None,
            stack_tags: None,
            system_tags: None,
            previous_tags: None,
        }
    }
}

impl<M> HandlerRequest<M> {
    /// Request carrying only a desired state.
    pub fn of(desired: M) -> Self {
        Self {
            desired: Some(desired),
            ..Self::default()
        }
    }

    /// The effective tag set for the desired state, given the
    /// resource-level tags from the desired model.
    pub fn desired_tags(&self, resource_tags: Option<&TagMap>) -> TagMap {
        tags::consolidate_tags(self.stack_tags.as_ref(), self.system_tags.as_ref(), resource_tags)
    }

    /// The consolidated tag set of the previous deployment, or empty when
    /// none was recorded.
    pub fn previous_tag_set(&self) -> TagMap {
        self.previous_tags.clone().unwrap_or_default()
    }
}

/// Apply the tag delta between two consolidated tag sets to a live
/// resource.
///
/// Removals go first so a changed value lands as a single overwrite-add;
/// a changed value never produces a removal for its own key.
pub(crate) async fn reconcile_tags(
    client: &ssm::Client,
    resource_type: ResourceTypeForTagging,
    resource_id: &str,
    desired: &TagMap,
    previous: &TagMap,
) -> Result<()> {
    let to_delete = tags::tags_to_delete(desired, previous);
    if !to_delete.is_empty() {
        let mut keys: Vec<String> = to_delete.into_keys().collect();
        keys.sort();
        tracing::debug!(resource_id, count = keys.len(), "removing stale tags");
        client
            .remove_tags_from_resource()
            .resource_type(resource_type.clone())
            .resource_id(resource_id)
            .set_tag_keys(Some(keys))
            .send()
            .await
            .with_context(|| format!("failed to remove tags from {}", resource_id))?;
    }

    let to_create = tags::tags_to_create(desired, previous);
    if !to_create.is_empty() {
        tracing::debug!(resource_id, count = to_create.len(), "applying new tags");
        client
            .add_tags_to_resource()
            .resource_type(resource_type)
            .resource_id(resource_id)
            .set_tags(Some(tag_map_to_sdk(&to_create)?))
            .send()
            .await
            .with_context(|| format!("failed to add tags to {}", resource_id))?;
    }

    Ok(())
}

/// Fetch the live tag set of a resource.
pub(crate) async fn fetch_resource_tags(
    client: &ssm::Client,
    resource_type: ResourceTypeForTagging,
    resource_id: &str,
) -> Result<TagMap> {
    let response = client
        .list_tags_for_resource()
        .resource_type(resource_type)
        .resource_id(resource_id)
        .send()
        .await
        .with_context(|| format!("failed to list tags for {}", resource_id))?;
    Ok(sdk_tags_to_map(response.tag_list()))
}
