// Publish Job Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::{ComponentEntry, ComponentKind};

/// A complete publish request.
///
/// Constructed once by a builder from a producer's raw state, validated (any
/// number of times, idempotently) and handed to the executor, which never
/// mutates it. Exactly one asset binding scheme must be resolved before use:
/// either `asset_id` (existing asset) or `asset_name` + `asset_type` (new
/// asset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishJob {
    /// Target task id (required)
    pub task_id: String,

    /// Existing asset id, when publishing into a bound asset
    pub asset_id: Option<String>,

    /// Asset name, when creating or reusing an asset by name
    pub asset_name: Option<String>,

    /// Asset type, required alongside `asset_name`
    pub asset_type: Option<String>,

    /// Version comment, may be empty
    #[serde(default)]
    pub comment: String,

    /// Ordered components to publish
    #[serde(default)]
    pub components: Vec<ComponentEntry>,

    /// Originating tool tag (e.g. "houdini", "maya", "standalone")
    #[serde(default = "default_origin_tool")]
    pub origin_tool: String,

    /// Path of the scene the publish came from, if saved
    pub origin_scene: Option<String>,

    /// Construction timestamp, epoch milliseconds (injected, not system time)
    #[serde(default)]
    pub created_at: i64,
}

fn default_origin_tool() -> String {
    "unknown".to_string()
}

impl PublishJob {
    pub fn new(task_id: impl Into<String>, origin_tool: impl Into<String>, created_at: i64) -> Self {
        Self {
            task_id: task_id.into(),
            asset_id: None,
            asset_name: None,
            asset_type: None,
            comment: String::new(),
            components: Vec::new(),
            origin_tool: origin_tool.into(),
            origin_scene: None,
            created_at,
        }
    }

    /// Validate the job before execution.
    ///
    /// Pure and idempotent; all errors are collected, never short-circuited.
    /// Returns `(ok, errors)`.
    pub fn validate(&self) -> (bool, Vec<String>) {
        let mut errors = Vec::new();

        if self.task_id.is_empty() {
            errors.push("task_id is required".to_string());
        }

        if self.asset_id.is_none() && self.asset_name.is_none() {
            errors.push("Either asset_id or asset_name is required".to_string());
        }

        if self.asset_id.is_none() && self.asset_name.is_some() && self.asset_type.is_none() {
            errors.push("asset_type is required when creating a new asset".to_string());
        }

        let enabled: Vec<&ComponentEntry> = self.enabled_components().collect();
        if enabled.is_empty() {
            errors.push("No components enabled for publish".to_string());
        }

        for comp in enabled {
            if comp.name.is_empty() {
                errors.push("Component has no name".to_string());
            }

            // Path required for everything except snapshots, which may be
            // materialized just-in-time by the producer.
            if comp.kind != ComponentKind::Snapshot && comp.resolved_path().is_none() {
                errors.push(format!("Component '{}' has no resolvable path", comp.name));
            }
        }

        (errors.is_empty(), errors)
    }

    /// Order-preserving view over enabled components
    pub fn enabled_components(&self) -> impl Iterator<Item = &ComponentEntry> {
        self.components.iter().filter(|c| c.enabled)
    }
}

#[cfg(test)]
#[path = "job_test.rs"]
mod job_test;
