//! Job building - assembles a [`PublishJob`] from a producer's raw state.
//!
//! One builder entry point per producer kind: parameter-backed (any DCC
//! bridge implementing [`ParameterStore`]) and JSON-backed (tests, saved
//! jobs, the CLI). All entry points populate the same field set.
//!
//! Parameter schema (indexed names are 1-based, matching node multiparms):
//! `use_snapshot`, `snapshot_path`, `use_media`, `media_path`,
//! `component_count`, `comp_name{i}`, `file_path{i}`, `file_path_raw{i}`,
//! `export{i}`, `meta_count{i}`, `key{i}_{m}`, `value{i}_{m}`, plus the
//! confirmed target values `p_task_id`, `p_asset_id`, `p_asset_name`,
//! `p_asset_type`, `comment`, `scene_path`.

use tracing::{debug, info};

use crate::application::sequence;
use crate::domain::{ComponentEntry, Metadata, PublishJob};
use crate::error::Result;
use crate::port::parameters::{ParameterStore, ParameterStoreExt};
use crate::port::TimeProvider;

pub struct JobBuilder;

impl JobBuilder {
    /// Build a job from a producer's parameter store.
    pub fn from_parameters(
        params: &dyn ParameterStore,
        origin_tool: &str,
        time: &dyn TimeProvider,
    ) -> PublishJob {
        let mut components = Vec::new();

        // 1. Snapshot component: no dcc tag, path may be materialized later.
        if params.get_flag("use_snapshot") {
            debug!("Adding snapshot component");
            components.push(ComponentEntry::snapshot(
                params.get_nonempty("snapshot_path"),
                Metadata::new(),
            ));
        }

        // 2. Media component
        if params.get_flag("use_media") {
            let mut path = params.get_parameter("media_path").unwrap_or_default();
            // Media rendered as a frame sequence is handed over as the
            // canonical pattern.
            if let Some(seq) = sequence::detect(&path, None) {
                path = seq.pattern;
            }
            debug!(path = %path, "Adding media component");
            let mut metadata = Metadata::new();
            metadata.insert("dcc".to_string(), origin_tool.to_string());
            components.push(ComponentEntry::media("media", path, metadata));
        }

        // 3. File components
        let count = params.get_count("component_count");
        debug!(count, "Processing file components");
        for i in 1..=count {
            let name = params
                .get_nonempty(&format!("comp_name{i}"))
                .unwrap_or_else(|| format!("component_{i}"));
            let path = params
                .get_parameter(&format!("file_path{i}"))
                .unwrap_or_default();
            let raw_path = params.get_parameter(&format!("file_path_raw{i}"));

            // Placeholder paths ("*.abc" templates) and blanks are not
            // publishable components.
            if path.trim().is_empty() || path.starts_with('*') {
                debug!(i, path = %path, "Skipping placeholder/empty component path");
                continue;
            }

            // Export toggle defaults to enabled when the parameter is absent.
            let enabled = match params.get_parameter(&format!("export{i}")) {
                None => true,
                Some(v) => matches!(v.as_str(), "1" | "true" | "on"),
            };

            let mut metadata = Metadata::new();
            metadata.insert("dcc".to_string(), origin_tool.to_string());
            let meta_count = params.get_count(&format!("meta_count{i}"));
            for m in 1..=meta_count {
                if let Some(key) = params.get_nonempty(&format!("key{i}_{m}")) {
                    let value = params
                        .get_parameter(&format!("value{i}_{m}"))
                        .unwrap_or_default();
                    metadata.insert(key, value);
                }
            }

            let entry = Self::classify(&name, &path, raw_path.as_deref(), metadata);
            debug!(
                i,
                name = %entry.name,
                kind = %entry.kind,
                enabled,
                path = ?entry.source_path,
                "Adding component"
            );
            components.push(if enabled { entry } else { entry.disabled() });
        }

        let mut job = PublishJob::new(
            params.get_nonempty("p_task_id").unwrap_or_default(),
            origin_tool,
            time.now_millis(),
        );
        job.asset_id = params.get_nonempty("p_asset_id");
        job.asset_name = params.get_nonempty("p_asset_name");
        job.asset_type = params.get_nonempty("p_asset_type");
        job.comment = params.get_parameter("comment").unwrap_or_default();
        job.origin_scene = params.get_nonempty("scene_path");
        job.components = components;

        info!(
            task = %job.task_id,
            asset = %job
                .asset_id
                .clone()
                .or_else(|| job.asset_name.clone())
                .unwrap_or_default(),
            components = job.components.len(),
            "Built publish job"
        );
        job
    }

    /// Build a job from a JSON document (tests, saved jobs, CLI job files).
    /// A missing/zero `created_at` is stamped from the time provider.
    pub fn from_value(value: serde_json::Value, time: &dyn TimeProvider) -> Result<PublishJob> {
        let mut job: PublishJob = serde_json::from_value(value)?;
        if job.created_at == 0 {
            job.created_at = time.now_millis();
        }
        Ok(job)
    }

    /// Decide file vs sequence for a path: a sequence found on disk wins,
    /// then an explicit frame token in the path, then plain file.
    fn classify(
        name: &str,
        path: &str,
        raw_path: Option<&str>,
        metadata: Metadata,
    ) -> ComponentEntry {
        if let Some(seq) = sequence::detect(path, raw_path) {
            return ComponentEntry::sequence(name, seq.pattern, seq.frame_range, metadata);
        }
        if sequence::has_frame_token(path) {
            // Token present but nothing on disk yet: keep the pattern as
            // typed; the backing store resolves it per frame at storage time.
            let mut entry = ComponentEntry::file(name, path, metadata);
            entry.kind = crate::domain::ComponentKind::Sequence;
            entry.sequence_pattern = Some(path.to_string());
            return entry;
        }
        ComponentEntry::file(name, path, metadata)
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
