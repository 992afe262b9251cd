//! Patch baseline model and translation.
//!
//! The baseline model nests two levels of filter structure (approval rules
//! hold filter groups, filter groups hold filters) plus alternative patch
//! sources. The SDK requires filter keys and values, so the conversion
//! surfaces an error for a rule a template left incomplete instead of
//! sending it to the service.

use super::{bool_field, num_field, opt_string, opt_vec};
use crate::redaction::SafeLog;
use crate::tags::TagMap;
use anyhow::{Context, Result};
use aws_sdk_ssm as ssm;
use serde::{Deserialize, Serialize};

/// Template-author shape of a patch baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatchBaselineModel {
    pub baseline_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub operating_system: Option<String>,
    pub approval_rules: Option<RuleGroup>,
    pub global_filters: Option<PatchFilterGroup>,
    pub approved_patches: Option<Vec<String>>,
    pub approved_patches_compliance_level: Option<String>,
    pub approved_patches_enable_non_security: Option<bool>,
    pub rejected_patches: Option<Vec<String>>,
    pub rejected_patches_action: Option<String>,
    /// Alternative patch source repositories; configuration strings may
    /// embed credentials and are kept out of logs.
    pub sources: Option<Vec<PatchSource>>,
    pub patch_groups: Option<Vec<String>>,
    pub default_baseline: Option<bool>,
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RuleGroup {
    pub patch_rules: Option<Vec<Rule>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Rule {
    pub approve_after_days: Option<i32>,
    pub approve_until_date: Option<String>,
    pub compliance_level: Option<String>,
    pub enable_non_security: Option<bool>,
    pub patch_filter_group: Option<PatchFilterGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatchFilterGroup {
    pub patch_filters: Option<Vec<PatchFilter>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatchFilter {
    pub key: Option<String>,
    pub values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatchSource {
    pub name: Option<String>,
    pub products: Option<Vec<String>>,
    pub configuration: Option<String>,
}

impl SafeLog for PatchBaselineModel {
    fn allowed_fields() -> &'static [&'static str] {
        &[
            "BaselineId",
            "Name",
            "OperatingSystem",
            "ApprovedPatches",
            "ApprovedPatchesComplianceLevel",
            "ApprovedPatchesEnableNonSecurity",
            "RejectedPatches",
            "RejectedPatchesAction",
            "PatchGroups",
            "DefaultBaseline",
        ]
    }
}

/// Convert a model filter group into the SDK shape.
pub fn filter_group_to_sdk(group: &PatchFilterGroup) -> Result<ssm::types::PatchFilterGroup> {
    let filters = group
        .patch_filters
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|filter| {
            ssm::types::PatchFilter::builder()
                .set_key(
                    filter
                        .key
                        .as_deref()
                        .map(ssm::types::PatchFilterKey::from),
                )
                .set_values(opt_vec(filter.values.clone()))
                .build()
                .context("patch filter requires a key and at least one value")
        })
        .collect::<Result<Vec<_>>>()?;

    ssm::types::PatchFilterGroup::builder()
        .set_patch_filters(Some(filters))
        .build()
        .context("invalid patch filter group")
}

fn filter_group_from_sdk(group: &ssm::types::PatchFilterGroup) -> PatchFilterGroup {
    PatchFilterGroup {
        patch_filters: opt_vec(Some(
            group
                .patch_filters()
                .iter()
                .map(|filter| PatchFilter {
                    key: Some(filter.key().as_str().to_string()),
                    values: opt_vec(Some(filter.values().to_vec())),
                })
                .collect(),
        )),
    }
}

/// Convert a model rule group into the SDK shape.
pub fn rule_group_to_sdk(group: &RuleGroup) -> Result<ssm::types::PatchRuleGroup> {
    let rules = group
        .patch_rules
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|rule| {
            let filter_group = rule
                .patch_filter_group
                .as_ref()
                .context("approval rule requires a patch filter group")
                .and_then(filter_group_to_sdk)?;
            Ok(ssm::types::PatchRule::builder()
                .patch_filter_group(filter_group)
                .set_approve_after_days(rule.approve_after_days)
                .set_approve_until_date(opt_string(rule.approve_until_date.clone()))
                .set_compliance_level(
                    rule.compliance_level
                        .as_deref()
                        .map(ssm::types::PatchComplianceLevel::from),
                )
                .set_enable_non_security(rule.enable_non_security)
                .build())
        })
        .collect::<Result<Vec<_>>>()?;

    ssm::types::PatchRuleGroup::builder()
        .set_patch_rules(Some(rules))
        .build()
        .context("invalid approval rule group")
}

fn rule_group_from_sdk(group: &ssm::types::PatchRuleGroup) -> RuleGroup {
    RuleGroup {
        patch_rules: opt_vec(Some(
            group
                .patch_rules()
                .iter()
                .map(|rule| Rule {
                    approve_after_days: num_field(rule.approve_after_days),
                    approve_until_date: rule.approve_until_date().map(str::to_string),
                    compliance_level: rule
                        .compliance_level()
                        .map(|level| level.as_str().to_string()),
                    enable_non_security: bool_field(rule.enable_non_security),
                    patch_filter_group: rule.patch_filter_group().map(filter_group_from_sdk),
                })
                .collect(),
        )),
    }
}

/// Convert model patch sources into the SDK shape.
pub fn sources_to_sdk(sources: &[PatchSource]) -> Result<Vec<ssm::types::PatchSource>> {
    sources
        .iter()
        .map(|source| {
            ssm::types::PatchSource::builder()
                .set_name(opt_string(source.name.clone()))
                .set_products(opt_vec(source.products.clone()))
                .set_configuration(opt_string(source.configuration.clone()))
                .build()
                .context("patch source requires a name, products, and configuration")
        })
        .collect()
}

fn sources_from_sdk(sources: &[ssm::types::PatchSource]) -> Option<Vec<PatchSource>> {
    opt_vec(Some(
        sources
            .iter()
            .map(|source| PatchSource {
                name: Some(source.name().to_string()),
                products: opt_vec(Some(source.products().to_vec())),
                configuration: Some(source.configuration().to_string()),
            })
            .collect(),
    ))
}

/// Map a GetPatchBaseline response into the resource model.
///
/// Tags, patch-group membership beyond the response, and default-baseline
/// status are filled in by the caller.
pub fn from_get_baseline(
    output: &ssm::operation::get_patch_baseline::GetPatchBaselineOutput,
) -> PatchBaselineModel {
    PatchBaselineModel {
        baseline_id: output.baseline_id().map(str::to_string),
        name: output.name().map(str::to_string),
        description: opt_string(output.description().map(str::to_string)),
        operating_system: output
            .operating_system()
            .map(|os| os.as_str().to_string()),
        approval_rules: output.approval_rules().map(rule_group_from_sdk),
        global_filters: output.global_filters().map(filter_group_from_sdk),
        approved_patches: opt_vec(Some(output.approved_patches().to_vec())),
        approved_patches_compliance_level: output
            .approved_patches_compliance_level()
            .map(|level| level.as_str().to_string()),
        approved_patches_enable_non_security: bool_field(
            output.approved_patches_enable_non_security,
        ),
        rejected_patches: opt_vec(Some(output.rejected_patches().to_vec())),
        rejected_patches_action: output
            .rejected_patches_action()
            .map(|action| action.as_str().to_string()),
        sources: sources_from_sdk(output.sources()),
        patch_groups: opt_vec(Some(output.patch_groups().to_vec())),
        default_baseline: None,
        tags: None,
    }
}

/// Map a list-call baseline identity into the resource model.
pub fn from_baseline_identity(
    identity: &ssm::types::PatchBaselineIdentity,
) -> PatchBaselineModel {
    PatchBaselineModel {
        baseline_id: identity.baseline_id().map(str::to_string),
        name: identity.baseline_name().map(str::to_string),
        description: opt_string(identity.baseline_description().map(str::to_string)),
        operating_system: identity
            .operating_system()
            .map(|os| os.as_str().to_string()),
        default_baseline: bool_field(identity.default_baseline),
        ..PatchBaselineModel::default()
    }
}
