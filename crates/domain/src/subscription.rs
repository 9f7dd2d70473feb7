//! Raw subscription records — rule configuration as delivered by a rule source.
//!
//! These records are already parsed; nothing here reads files. Rules keep
//! shared back-references to them for bookkeeping, and settings that are
//! absent on a rule are inherited from its group, then its app.

use serde::{Deserialize, Serialize};

use crate::id::SubscriptionId;

/// A subscription a rule set was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsItem {
    pub id: SubscriptionId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "enabled")]
    pub enable: bool,
}

/// All groups configured for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRaw {
    /// Application identity, e.g. `com.example.news`.
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cd: Option<u64>,
    #[serde(default)]
    pub activity_ids: Option<Vec<String>>,
    #[serde(default)]
    pub exclude_activity_ids: Option<Vec<String>>,
    #[serde(default)]
    pub groups: Vec<GroupRaw>,
}

/// A named group of rules within an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRaw {
    pub key: i32,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub enable: Option<bool>,
    #[serde(default)]
    pub cd: Option<u64>,
    #[serde(default)]
    pub delay: Option<u64>,
    #[serde(default)]
    pub quick_find: Option<bool>,
    #[serde(default)]
    pub match_launcher: Option<bool>,
    #[serde(default)]
    pub activity_ids: Option<Vec<String>>,
    #[serde(default)]
    pub exclude_activity_ids: Option<Vec<String>>,
    #[serde(default)]
    pub rules: Vec<RuleRaw>,
}

impl GroupRaw {
    /// Groups are enabled unless explicitly switched off.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enable.unwrap_or(true)
    }
}

/// One rule as configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRaw {
    #[serde(default)]
    pub key: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    /// Action tag: `clickNode`, `clickCenter`, anything else means `click`.
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub matches: Vec<String>,
    #[serde(default)]
    pub exclude_matches: Vec<String>,
    #[serde(default)]
    pub pre_keys: Vec<i32>,
    /// Cooldown in milliseconds.
    #[serde(default)]
    pub cd: Option<u64>,
    /// Delay in milliseconds.
    #[serde(default)]
    pub delay: Option<u64>,
    #[serde(default)]
    pub match_launcher: Option<bool>,
    #[serde(default)]
    pub quick_find: Option<bool>,
    #[serde(default)]
    pub activity_ids: Option<Vec<String>>,
    #[serde(default)]
    pub exclude_activity_ids: Option<Vec<String>>,
}

fn enabled() -> bool {
    true
}
