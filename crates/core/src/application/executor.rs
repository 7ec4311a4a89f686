//! Publish execution - turns a validated [`PublishJob`] into remote
//! entities, or into a side-effect-free preview of what would be created.
//!
//! Real execution is strictly sequential: task fetch, asset resolution,
//! version creation (committed immediately to obtain the server-assigned
//! version number), note, per-component creation, metadata index update,
//! final commit, then best-effort cache warm-up and time accounting. A
//! single component's failure never aborts its siblings; auxiliary steps
//! never fail the job.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::application::sequence;
use crate::domain::{ComponentEntry, ComponentKind, ComponentSummary, PublishJob, PublishResult};
use crate::port::{Entity, EntityClient, TimeAccountant};

/// Execution mode shared by one entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// No remote mutation; deterministic placeholder ids and an action plan
    Preview,
    /// Real publish against the tracking service
    Publish,
}

pub struct PublishExecutor {
    client: Arc<dyn EntityClient>,
    mode: ExecutionMode,
    time_accountant: Option<Arc<dyn TimeAccountant>>,
}

impl PublishExecutor {
    pub fn new(client: Arc<dyn EntityClient>, mode: ExecutionMode) -> Self {
        Self {
            client,
            mode,
            time_accountant: None,
        }
    }

    /// Attach the optional time-accounting collaborator. Its failures are
    /// never fatal to a publish.
    pub fn with_time_accountant(mut self, accountant: Arc<dyn TimeAccountant>) -> Self {
        self.time_accountant = Some(accountant);
        self
    }

    /// Execute a publish job. The job is validated first; a job that fails
    /// validation never reaches the remote system.
    pub async fn execute(&self, job: &PublishJob) -> PublishResult {
        info!(mode = ?self.mode, task = %job.task_id, "Executing publish job");

        let (ok, errors) = job.validate();
        if !ok {
            let message = format!(
                "Validation failed:\n{}",
                errors
                    .iter()
                    .map(|e| format!("  - {e}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
            error!(task = %job.task_id, %message, "Job rejected");
            return PublishResult::failure(message);
        }

        match self.mode {
            ExecutionMode::Preview => self.execute_preview(job),
            ExecutionMode::Publish => self.execute_real(job).await,
        }
    }

    /// Preview pass: structurally identical results on every call, ids
    /// aside, and no remote calls of any kind.
    fn execute_preview(&self, job: &PublishJob) -> PublishResult {
        let mut result = PublishResult::empty();
        result.succeeded = true;
        result.version_id = Some("preview-version-id".to_string());
        result.version_number = Some(999);
        result.asset_id = Some(
            job.asset_id
                .clone()
                .unwrap_or_else(|| "preview-asset-id".to_string()),
        );
        result.asset_name = Some(
            job.asset_name
                .clone()
                .unwrap_or_else(|| "(existing asset)".to_string()),
        );

        let mut plan = Vec::new();
        match &job.asset_id {
            Some(id) => plan.push(format!("1. Use existing asset: {id}")),
            None => plan.push(format!(
                "1. Create new asset: '{}' (type: {})",
                job.asset_name.as_deref().unwrap_or_default(),
                job.asset_type.as_deref().unwrap_or_default()
            )),
        }
        plan.push(format!(
            "2. Create version (comment: '{}')",
            if job.comment.is_empty() {
                "none"
            } else {
                &job.comment
            }
        ));

        for (i, comp) in job.enabled_components().enumerate() {
            let path = comp.resolved_path().unwrap_or("(will be generated)");
            let step = match comp.kind {
                ComponentKind::Snapshot => {
                    format!("3.{}. Create 'snapshot' component from: {path}", i + 1)
                }
                ComponentKind::Media => format!("3.{}. Encode media: {path}", i + 1),
                _ => format!(
                    "3.{}. Create component '{}' from: {path}",
                    i + 1,
                    comp.name
                ),
            };
            plan.push(step);

            let id = format!("preview-comp-{i}");
            result
                .component_paths
                .insert(id.clone(), path.to_string());
            result.created_components.push(ComponentSummary {
                name: comp.name.clone(),
                file_type: String::new(),
                id: id.clone(),
            });
            result.component_ids.push(id);
        }

        plan.push("4. Update asset metadata index".to_string());
        plan.push("5. Commit session".to_string());
        result.planned_actions = plan;

        info!(
            components = result.component_ids.len(),
            "Preview complete, no changes made"
        );
        result
    }

    async fn execute_real(&self, job: &PublishJob) -> PublishResult {
        let mut result = PublishResult::empty();

        // 1. Task fetch; a missing task is fatal.
        let task = match self.client.get("Task", &job.task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                error!(task = %job.task_id, "Task not found");
                return PublishResult::failure(format!("Task not found: {}", job.task_id));
            }
            Err(e) => {
                error!(task = %job.task_id, error = %e, "Failed to fetch task");
                return PublishResult::failure(format!("Failed to fetch task: {e}"));
            }
        };
        let parent_id = match task.require_str("parent_id") {
            Ok(id) => id.to_string(),
            Err(e) => return PublishResult::failure(e.to_string()),
        };

        // 2. Asset resolution.
        let asset = match self.resolve_asset(job, &parent_id).await {
            Ok(asset) => asset,
            Err(message) => {
                error!(%message, "Asset resolution failed");
                return PublishResult::failure(message);
            }
        };
        result.asset_id = Some(asset.id.clone());
        result.asset_name = asset.str_field("name").map(str::to_string);

        // 3. Version creation; committed immediately to obtain the
        //    server-assigned version number. Failure is fatal.
        info!(asset = %asset.id, "Creating version");
        let mut fields = serde_json::Map::new();
        fields.insert("asset_id".to_string(), json!(asset.id));
        fields.insert("task_id".to_string(), json!(job.task_id));
        let version = match self.client.create("AssetVersion", fields).await {
            Ok(version) => version,
            Err(e) => {
                error!(error = %e, "Failed to create version");
                return result_failure(result, format!("Failed to create version: {e}"));
            }
        };
        if let Err(e) = self.client.commit().await {
            error!(error = %e, "Version commit failed");
            return result_failure(result, format!("Version commit failed: {e}"));
        }
        let version_number = version.i64_field("version");
        result.version_id = Some(version.id.clone());
        result.version_number = version_number;
        info!(version = %version.id, number = ?version_number, "Version created");

        // 4. Comment note; logged but never fatal.
        if !job.comment.is_empty() {
            self.attach_note(&version.id, &job.comment).await;
        }

        // 5. Components, each in isolation.
        for comp in job.enabled_components() {
            self.publish_component(comp, &version.id, &mut result).await;
        }

        // 6. Denormalized name -> component-id index on the asset metadata.
        //    Read-modify-write with no version check; concurrent publishers
        //    to the same asset can race and lose entries.
        self.update_metadata_index(&asset.id, &result.created_components)
            .await;

        // 7. Final commit. On failure the partially-created entities remain;
        //    the caller must treat this as partially published.
        if let Err(e) = self.client.commit().await {
            error!(error = %e, "Final commit failed");
            return result_failure(
                result,
                format!("Final commit failed, publish is partial: {e}"),
            );
        }

        // 8. Best-effort cache warm-up and time accounting.
        self.warm_cache(&version.id, &result).await;
        if let Some(accountant) = &self.time_accountant {
            match accountant.log_publish(&job.task_id, 1).await {
                Ok(log) => {
                    result.timelog_id = log.id;
                    result.time_logged_seconds = log.seconds;
                }
                Err(e) => warn!(error = %e, "Time accounting failed (non-critical)"),
            }
        }

        info!(
            version = ?result.version_number,
            components = result.component_ids.len(),
            "Publish complete"
        );
        result.succeeded = true;
        result
    }

    /// Resolve the target asset: by bound id, by case-insensitive name reuse
    /// under the task's parent, or by creating a new asset entity.
    async fn resolve_asset(
        &self,
        job: &PublishJob,
        parent_id: &str,
    ) -> std::result::Result<Entity, String> {
        if let Some(asset_id) = &job.asset_id {
            info!(asset = %asset_id, "Using existing asset");
            return match self.client.get("Asset", asset_id).await {
                Ok(Some(asset)) => Ok(asset),
                Ok(None) => Err(format!("Asset not found: {asset_id}")),
                Err(e) => Err(format!("Failed to fetch asset: {e}")),
            };
        }

        let name = job.asset_name.as_deref().unwrap_or_default();
        let existing = self
            .client
            .query(&format!("Asset where parent.id is \"{parent_id}\""))
            .await
            .map_err(|e| format!("Failed to query assets: {e}"))?;
        if let Some(found) = existing.into_iter().find(|a| {
            a.str_field("name")
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        }) {
            info!(asset = %found.id, name, "Reusing existing asset by name");
            return Ok(found);
        }

        let type_name = job.asset_type.as_deref().unwrap_or_default();
        info!(name, type_name, "Creating new asset");
        let mut fields = serde_json::Map::new();
        fields.insert("name".to_string(), json!(name));
        fields.insert("type_name".to_string(), json!(type_name));
        fields.insert("parent_id".to_string(), json!(parent_id));
        self.client
            .create("Asset", fields)
            .await
            .map_err(|e| format!("Failed to create asset: {e}"))
    }

    /// Attach the version comment as a note authored by the current API
    /// principal. Never fatal.
    async fn attach_note(&self, version_id: &str, comment: &str) {
        let api_user = self.client.api_user().to_string();
        let user = match self
            .client
            .query(&format!("User where username is \"{api_user}\""))
            .await
        {
            Ok(users) => users.into_iter().next(),
            Err(e) => {
                warn!(error = %e, "User lookup for note failed");
                return;
            }
        };
        let Some(user) = user else {
            warn!(username = %api_user, "Could not find user for note author");
            return;
        };
        match self.client.create_note(version_id, comment, &user.id).await {
            Ok(_) => debug!(version = %version_id, "Note created"),
            Err(e) => warn!(error = %e, "Failed to create note (non-critical)"),
        }
    }

    /// Create one component. Failures are logged and the component is
    /// skipped; siblings proceed.
    async fn publish_component(
        &self,
        comp: &ComponentEntry,
        version_id: &str,
        result: &mut PublishResult,
    ) {
        info!(name = %comp.name, kind = %comp.kind, "Processing component");

        let Some(path) = comp.resolved_path() else {
            // Snapshot whose path was never materialized.
            warn!(name = %comp.name, "Component has no path at execution time, skipping");
            return;
        };
        let path = path.replace('\\', "/");

        if comp.kind == ComponentKind::Media {
            if let Err(e) = self.client.encode_media(version_id, &path).await {
                error!(name = %comp.name, error = %e, "Failed to encode media, skipping");
                return;
            }
            // Media commits individually; the encode already happened, so a
            // commit failure here is not worth failing the component over.
            if let Err(e) = self.client.commit().await {
                warn!(error = %e, "Commit after media encode failed");
            }
            // Media never contributes to component_ids.
            return;
        }

        // Literal file paths must exist on disk. Sequences never get the
        // check: their path is a pattern (printf, `$F`, `#`) resolved
        // per-frame by the backing store at storage time.
        if comp.kind == ComponentKind::File
            && !sequence::looks_like_pattern(&path)
            && !Path::new(&path).exists()
        {
            warn!(name = %comp.name, path = %path, "File not found, skipping component");
            return;
        }

        match self
            .client
            .create_component(version_id, &path, &comp.name, &comp.metadata)
            .await
        {
            Ok(entity) => {
                debug!(component = %entity.id, "Component created");
                result
                    .component_paths
                    .insert(entity.id.clone(), path.clone());
                result.created_components.push(ComponentSummary {
                    name: entity.str_field("name").unwrap_or(&comp.name).to_string(),
                    file_type: entity.str_field("file_type").unwrap_or_default().to_string(),
                    id: entity.id.clone(),
                });
                result.component_ids.push(entity.id);
            }
            Err(e) => {
                error!(name = %comp.name, error = %e, "Failed to create component, skipping");
            }
        }
    }

    /// Update the asset's name -> component-id metadata index. Key is
    /// `"<name>.<ext>"` when both are known, else the bare name. Never
    /// fatal.
    async fn update_metadata_index(&self, asset_id: &str, created: &[ComponentSummary]) {
        let asset = match self.client.get("Asset", asset_id).await {
            Ok(Some(asset)) => asset,
            Ok(None) => {
                warn!(asset = %asset_id, "Asset disappeared before index update");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to re-read asset for index update");
                return;
            }
        };

        let mut index = match asset.fields.get("metadata") {
            Some(Value::Object(map)) => map.clone(),
            _ => serde_json::Map::new(),
        };
        for summary in created {
            let ext = summary.file_type.trim_start_matches('.');
            let key = if !summary.name.is_empty() && !ext.is_empty() {
                format!("{}.{}", summary.name, ext)
            } else {
                summary.name.clone()
            };
            if key.is_empty() {
                continue;
            }
            debug!(key = %key, id = %summary.id, "Indexing component on asset metadata");
            index.insert(key, json!(summary.id));
        }

        let mut fields = serde_json::Map::new();
        fields.insert("metadata".to_string(), Value::Object(index));
        match self.client.update("Asset", asset_id, fields).await {
            Ok(()) => info!(count = created.len(), "Asset metadata index updated"),
            Err(e) => warn!(error = %e, "Failed to update asset metadata index"),
        }
    }

    /// Re-read the created entities so a shared read cache is warm for
    /// browsers. Failures only logged at debug level.
    async fn warm_cache(&self, version_id: &str, result: &PublishResult) {
        if let Err(e) = self.client.get("AssetVersion", version_id).await {
            debug!(error = %e, "Cache warm-up (non-critical)");
            return;
        }
        for id in &result.component_ids {
            if let Err(e) = self.client.get("Component", id).await {
                debug!(error = %e, "Cache warm-up (non-critical)");
                return;
            }
        }
        if let Some(asset_id) = &result.asset_id {
            if let Err(e) = self.client.get("Asset", asset_id).await {
                debug!(error = %e, "Cache warm-up (non-critical)");
            }
        }
    }
}

/// Fail a result while keeping whatever partial fields are already known.
fn result_failure(mut result: PublishResult, message: String) -> PublishResult {
    result.succeeded = false;
    result.error_message = Some(message);
    result
}
