// Publish Result - the hand-off artifact for downstream automation

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name/type/id summary of one created component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub name: String,
    pub file_type: String,
    pub id: String,
}

/// Result of a publish execution.
///
/// The sole hand-off artifact to transfer/automation layers; fully
/// serializable to a flat key-value document. A failed result always carries
/// a non-empty `error_message`; a successful one never does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResult {
    pub succeeded: bool,
    pub error_message: Option<String>,

    // Version info (for automation)
    pub version_id: Option<String>,
    /// Monotonic per asset, assigned by the tracking service
    pub version_number: Option<i64>,
    pub asset_id: Option<String>,
    pub asset_name: Option<String>,

    // Component info (for the transfer queue). Ordered parallel to the
    // enabled components actually created; partial on partial failure.
    #[serde(default)]
    pub component_ids: Vec<String>,
    /// component id -> resolved path
    #[serde(default)]
    pub component_paths: IndexMap<String, String>,
    #[serde(default)]
    pub created_components: Vec<ComponentSummary>,

    // Time accounting (0 when skipped or failed; never fatal)
    pub timelog_id: Option<String>,
    #[serde(default)]
    pub time_logged_seconds: f64,

    /// Human-readable "would create/update" plan; populated only by preview
    #[serde(default)]
    pub planned_actions: Vec<String>,
}

impl PublishResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            error_message: Some(message.into()),
            ..Self::empty()
        }
    }

    pub fn empty() -> Self {
        Self {
            succeeded: false,
            error_message: None,
            version_id: None,
            version_number: None,
            asset_id: None,
            asset_name: None,
            component_ids: Vec::new(),
            component_paths: IndexMap::new(),
            created_components: Vec::new(),
            timelog_id: None,
            time_logged_seconds: 0.0,
            planned_actions: Vec::new(),
        }
    }
}
