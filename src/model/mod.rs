//! Resource models and their SDK translations.
//!
//! Models mirror what a template author writes: PascalCase members, every
//! field optional. Translation between a model and the wire treats empty
//! strings, lists, and maps as absent in both directions, so a blank
//! template value never reaches the service and a blank service value
//! never shows up as a set model field.

pub mod association;
pub mod maintenance_window;
pub mod maintenance_window_target;
pub mod maintenance_window_task;
pub mod ops_metadata;
pub mod patch_baseline;

use crate::tags::TagMap;
use anyhow::{Context, Result};
use aws_sdk_ssm as ssm;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalize an optional string: empty means absent.
pub fn opt_string(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Normalize an optional list: empty means absent.
pub fn opt_vec<T>(value: Option<Vec<T>>) -> Option<Vec<T>> {
    value.filter(|v| !v.is_empty())
}

/// Normalize an optional map: empty means absent.
pub fn opt_map<K, V>(value: Option<HashMap<K, V>>) -> Option<HashMap<K, V>> {
    value.filter(|m| !m.is_empty())
}

/// Bridge a numeric SDK member that codegen emits either bare or boxed.
pub(crate) fn num_field(value: impl Into<Option<i32>>) -> Option<i32> {
    value.into()
}

/// Bridge a boolean SDK member that codegen emits either bare or boxed.
pub(crate) fn bool_field(value: impl Into<Option<bool>>) -> Option<bool> {
    value.into()
}

/// A target selector, shared by associations and maintenance window
/// registrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TargetSelector {
    pub key: Option<String>,
    pub values: Option<Vec<String>>,
}

/// Convert model target selectors into SDK targets.
pub fn targets_to_sdk(targets: &[TargetSelector]) -> Vec<ssm::types::Target> {
    targets
        .iter()
        .map(|target| {
            ssm::types::Target::builder()
                .set_key(opt_string(target.key.clone()))
                .set_values(opt_vec(target.values.clone()))
                .build()
        })
        .collect()
}

/// Convert SDK targets back into model target selectors.
pub fn sdk_targets_to_model(targets: &[ssm::types::Target]) -> Option<Vec<TargetSelector>> {
    let converted: Vec<TargetSelector> = targets
        .iter()
        .map(|target| TargetSelector {
            key: target.key().map(str::to_string),
            values: opt_vec(Some(target.values().to_vec())),
        })
        .collect();
    opt_vec(Some(converted))
}

/// Convert a tag map into SDK tag structures, sorted for stable requests.
pub fn tag_map_to_sdk(tags: &TagMap) -> Result<Vec<ssm::types::Tag>> {
    let mut entries: Vec<(&String, &String)> = tags.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
        .into_iter()
        .map(|(key, value)| {
            ssm::types::Tag::builder()
                .key(key)
                .value(value)
                .build()
                .with_context(|| format!("invalid tag entry for key {}", key))
        })
        .collect()
}

/// Collect SDK tag structures into a tag map.
pub fn sdk_tags_to_map(tags: &[ssm::types::Tag]) -> TagMap {
    tags.iter()
        .map(|tag| (tag.key().to_string(), tag.value().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_opt_string_drops_empty() {
        assert_eq!(opt_string(Some(String::new())), None);
        assert_eq!(opt_string(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(opt_string(None), None);
    }

    #[test]
    fn test_opt_vec_drops_empty() {
        assert_eq!(opt_vec::<String>(Some(Vec::new())), None);
        assert_eq!(opt_vec(Some(vec![1])), Some(vec![1]));
    }

    #[test]
    fn test_opt_map_drops_empty() {
        assert_eq!(opt_map::<String, String>(Some(HashMap::new())), None);

        let mut map = HashMap::new();
        map.insert("k", "v");
        assert_eq!(opt_map(Some(map.clone())), Some(map));
    }

    #[test]
    fn test_target_round_trip_skips_empty_members() {
        let targets = vec![TargetSelector {
            key: Some("InstanceIds".to_string()),
            values: Some(vec!["i-0abc".to_string()]),
        }];

        let sdk = targets_to_sdk(&targets);
        assert_eq!(sdk.len(), 1);
        assert_eq!(sdk_targets_to_model(&sdk), Some(targets));

        let blank = vec![TargetSelector {
            key: Some(String::new()),
            values: Some(Vec::new()),
        }];
        let sdk = targets_to_sdk(&blank);
        assert_eq!(sdk[0].key(), None);
        assert!(sdk[0].values().is_empty());
    }

    #[test]
    fn test_tag_conversion_round_trip() {
        let mut tags = TagMap::new();
        tags.insert("Environment".to_string(), "Production".to_string());
        tags.insert("Team".to_string(), "Backend".to_string());

        let sdk = tag_map_to_sdk(&tags).expect("valid tags");
        assert_eq!(sdk.len(), 2);
        // Sorted by key for request stability.
        assert_eq!(sdk[0].key(), "Environment");
        assert_eq!(sdk_tags_to_map(&sdk), tags);
    }
}
