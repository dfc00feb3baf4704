//! Policy assembly from command line, environment and an optional TOML file
//!
//! Precedence per key: command line flag or environment variable (both
//! handled by clap in the binary), then the TOML file, then the built-in
//! default.

use crate::error::{Error, Result};
use crate::policy::{Policy, parse_label_list};
use crate::types::MergeMethod;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Default for `allow-labels`
pub const DEFAULT_ALLOW_LABELS: &str = "automerge";

/// A label list written either as `"a, b"` or `["a", "b"]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LabelList {
    /// Comma-separated string
    Csv(String),
    /// TOML array
    List(Vec<String>),
}

impl LabelList {
    fn into_set(self) -> BTreeSet<String> {
        match self {
            Self::Csv(csv) => parse_label_list(&csv),
            Self::List(labels) => labels
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// Policy keys as they appear in a TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct PolicyFile {
    /// Labels a PR must carry
    pub allow_labels: Option<LabelList>,
    /// Labels a PR must not carry
    pub block_labels: Option<LabelList>,
    /// Merge PRs from forks
    pub merge_forks: Option<bool>,
    /// Update branches that are behind
    pub auto_update: Option<bool>,
    /// Merge behind branches when not updating them
    pub merge_when_behind: Option<bool>,
    /// Close conflicting PRs
    pub close_on_conflict: Option<bool>,
    /// Delete the head branch of closed PRs
    pub delete_branch_on_close: Option<bool>,
    /// Fall back to a merge commit
    pub fallback_to_merge: Option<bool>,
    /// `merge`, `squash` or `rebase`
    pub merge_method: Option<String>,
}

/// Read and parse a policy file
pub fn load_policy_file(path: &Path) -> Result<PolicyFile> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Parse a boolean setting such as `true`, `False`, `1` or `off`
pub fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "{name}: expected true or false, got '{other}'"
        ))),
    }
}

/// Raw policy values from the command line or environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySettings {
    /// `allow-labels`
    pub allow_labels: Option<String>,
    /// `block-labels`
    pub block_labels: Option<String>,
    /// `merge-forks`
    pub merge_forks: Option<String>,
    /// `auto-update`
    pub auto_update: Option<String>,
    /// `merge-when-behind`
    pub merge_when_behind: Option<String>,
    /// `close-on-conflict`
    pub close_on_conflict: Option<String>,
    /// `delete-branch-on-close`
    pub delete_branch_on_close: Option<String>,
    /// `fallback-to-merge`
    pub fallback_to_merge: Option<String>,
    /// `merge-method`
    pub merge_method: Option<String>,
}

fn resolve_flag(
    name: &str,
    setting: Option<&str>,
    file: Option<bool>,
    default: bool,
) -> Result<bool> {
    match setting {
        Some(value) => parse_flag(name, value),
        None => Ok(file.unwrap_or(default)),
    }
}

impl PolicySettings {
    /// Combine with an optional file and defaults into a validated [`Policy`]
    pub fn into_policy(self, file: Option<PolicyFile>) -> Result<Policy> {
        let file = file.unwrap_or_default();

        let allow_labels = match (self.allow_labels, file.allow_labels) {
            (Some(csv), _) => parse_label_list(&csv),
            (None, Some(list)) => list.into_set(),
            (None, None) => parse_label_list(DEFAULT_ALLOW_LABELS),
        };
        let block_labels = match (self.block_labels, file.block_labels) {
            (Some(csv), _) => parse_label_list(&csv),
            (None, Some(list)) => list.into_set(),
            (None, None) => BTreeSet::new(),
        };

        let mut policy = Policy::new(allow_labels, block_labels)?;
        policy.merge_forks = resolve_flag(
            "merge-forks",
            self.merge_forks.as_deref(),
            file.merge_forks,
            false,
        )?;
        policy.auto_update = resolve_flag(
            "auto-update",
            self.auto_update.as_deref(),
            file.auto_update,
            true,
        )?;
        policy.merge_when_behind = resolve_flag(
            "merge-when-behind",
            self.merge_when_behind.as_deref(),
            file.merge_when_behind,
            true,
        )?;
        policy.close_on_conflict = resolve_flag(
            "close-on-conflict",
            self.close_on_conflict.as_deref(),
            file.close_on_conflict,
            false,
        )?;
        policy.delete_branch_on_close = resolve_flag(
            "delete-branch-on-close",
            self.delete_branch_on_close.as_deref(),
            file.delete_branch_on_close,
            false,
        )?;
        policy.fallback_to_merge = resolve_flag(
            "fallback-to-merge",
            self.fallback_to_merge.as_deref(),
            file.fallback_to_merge,
            false,
        )?;
        policy.merge_method = match self.merge_method.or(file.merge_method) {
            Some(method) => method.parse()?,
            None => MergeMethod::Merge,
        };

        Ok(policy)
    }
}
