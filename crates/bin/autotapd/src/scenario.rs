//! Replay scenarios — raw rule records plus a timeline of UI snapshots.
//!
//! ```json
//! {
//!   "subsItem": { "id": "…" },
//!   "app": { "id": "com.example.news", "groups": [ … ] },
//!   "snapshots": [
//!     { "atMs": 0, "activityId": "com.example.news.SplashActivity", "root": { … } }
//!   ]
//! }
//! ```

use std::path::Path;

use autotap_adapter_virtual::NodeRecord;
use autotap_domain::subscription::{AppRaw, SubsItem};
use serde::Deserialize;

/// A scenario file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub subs_item: SubsItem,
    pub app: AppRaw,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

/// The foreground window at a point of the timeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Offset from the start of the replay, in milliseconds.
    pub at_ms: u64,
    #[serde(default)]
    pub activity_id: Option<String>,
    /// `None` when no window is available.
    #[serde(default)]
    pub root: Option<NodeRecord>,
}

impl Scenario {
    /// Read and validate a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] if the file cannot be read, is not valid
    /// JSON, or its snapshots are out of order.
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Parse`] for malformed JSON and
    /// [`ScenarioError::Unordered`] when snapshot offsets decrease.
    pub fn from_json(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        let unordered = self
            .snapshots
            .windows(2)
            .position(|pair| pair[1].at_ms < pair[0].at_ms);
        match unordered {
            Some(position) => Err(ScenarioError::Unordered { index: position + 1 }),
            None => Ok(()),
        }
    }
}

/// Scenario loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario")]
    Parse(#[from] serde_json::Error),
    /// A snapshot is scheduled before the one preceding it.
    #[error("snapshot {index} is scheduled before its predecessor")]
    Unordered { index: usize },
}
