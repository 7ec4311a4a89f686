//! Asset/task resolution - reconciles which task and which asset a publish
//! will target against remote state.
//!
//! The interesting branch is a task change after an asset was already
//! chosen: when the new task lives under a different parent or project, the
//! previously bound asset cannot be carried over silently, so the resolver
//! asks the caller to choose through the [`ConflictPrompt`] port. All
//! resolution state lives only for the duration of one call; nothing is
//! cached.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::port::{ConflictPrompt, Entity, EntityClient};

/// Labels of a task and its ancestry, for display and change detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskContext {
    pub task_id: String,
    pub task_name: String,
    pub parent_id: String,
    pub parent_name: String,
    pub project_id: String,
    pub project_name: String,
}

/// The asset half of a publish target. Either `asset_id` is bound (existing
/// asset) or `asset_name`/`asset_type` describe one to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetBinding {
    pub asset_id: Option<String>,
    pub asset_name: Option<String>,
    pub asset_type: Option<String>,
}

/// A confirmed (task, asset) pair
#[derive(Debug, Clone)]
pub struct ResolvedBinding {
    pub task: TaskContext,
    pub asset: AssetBinding,
}

/// Ordered asset listing for a selection menu, de-duplicated by name
#[derive(Debug, Clone, Default)]
pub struct AssetListing {
    /// name -> asset id
    pub ids: IndexMap<String, String>,
    /// name -> asset type
    pub types: IndexMap<String, String>,
}

/// A menu selection: the id list backing the menu plus the chosen index
#[derive(Debug, Clone)]
pub struct AssetSelection {
    pub menu_ids: Vec<String>,
    pub index: usize,
}

/// A free-typed (name, type) pair
#[derive(Debug, Clone)]
pub struct TypedAsset {
    pub name: String,
    pub asset_type: String,
}

/// Menu label that stands for "no selection"
const NEW_ASSET_SENTINEL: &str = "new_asset";

pub struct AssetTaskResolver {
    client: Arc<dyn EntityClient>,
}

impl AssetTaskResolver {
    pub fn new(client: Arc<dyn EntityClient>) -> Self {
        Self { client }
    }

    /// Fetch a task and its parent/project labels.
    pub async fn describe_task(&self, task_id: &str) -> Result<TaskContext> {
        if task_id.is_empty() {
            return Err(AppError::Validation("task id is empty".to_string()));
        }
        let task = self
            .client
            .get("Task", task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task not found: {task_id}")))?;
        let (parent, project) = self.ancestry(&task).await?;

        Ok(TaskContext {
            task_id: task_id.to_string(),
            task_name: task.require_str("name")?.to_string(),
            parent_id: parent.id.clone(),
            parent_name: parent.require_str("name")?.to_string(),
            project_id: project.id.clone(),
            project_name: project.require_str("name")?.to_string(),
        })
    }

    /// Resolve a task change against the current asset binding.
    ///
    /// Returns `Ok(None)` when the caller cancels a conflict choice: the
    /// task binding is then left unapplied, which is a pending decision, not
    /// an error. All non-cancel choices apply the task binding.
    pub async fn resolve(
        &self,
        task_id: &str,
        current: &AssetBinding,
        prompt: &dyn ConflictPrompt,
    ) -> Result<Option<ResolvedBinding>> {
        let ctx = self.describe_task(task_id).await?;

        // Unbound: nothing to reconcile, no conflict queries.
        let Some(asset_id) = current.asset_id.as_deref().filter(|id| !id.is_empty()) else {
            debug!(task_id, "No asset bound; applying task context only");
            return Ok(Some(ResolvedBinding {
                task: ctx,
                asset: current.clone(),
            }));
        };

        let asset = self
            .client
            .get("Asset", asset_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset not found: {asset_id}")))?;
        let (asset_parent, asset_project) = self.ancestry(&asset).await?;

        if asset_parent.id == ctx.parent_id && asset_project.id == ctx.project_id {
            debug!(task_id, asset_id, "Parent/project unchanged; asset binding kept");
            return Ok(Some(ResolvedBinding {
                task: ctx,
                asset: current.clone(),
            }));
        }

        // Conflict branch: the bound asset lives under a different parent.
        // Its (name, type) become pending re-creation values.
        let pending_name = asset.require_str("name")?.to_string();
        let pending_type = asset.require_str("type_name")?.to_string();
        info!(
            task_id,
            asset = %pending_name,
            old_parent = %asset_parent.id,
            new_parent = %ctx.parent_id,
            "Task parent changed; reconciling asset binding"
        );

        let existing = self
            .client
            .query(&format!(
                "Asset where name is \"{}\" and parent.id is \"{}\"",
                pending_name, ctx.parent_id
            ))
            .await?
            .into_iter()
            .next();

        let asset = match existing {
            None => {
                let message = format!(
                    "The asset '{pending_name}' does not exist within this parent."
                );
                match prompt.ask(&message, &["Copy current", "Create new", "Cancel"]) {
                    Some(0) => AssetBinding {
                        asset_id: None,
                        asset_name: Some(pending_name),
                        asset_type: Some(pending_type),
                    },
                    Some(1) => AssetBinding {
                        asset_id: None,
                        asset_name: None,
                        asset_type: Some(pending_type),
                    },
                    _ => {
                        info!(task_id, "Asset reconciliation cancelled");
                        return Ok(None);
                    }
                }
            }
            Some(existing) => {
                let existing_type = existing.require_str("type_name")?.to_string();
                if existing_type == pending_type {
                    let message = format!(
                        "The asset '{pending_name}' already exists within this parent."
                    );
                    match prompt.ask(&message, &["Use existing", "Create new", "Cancel"]) {
                        Some(0) => AssetBinding {
                            asset_id: Some(existing.id.clone()),
                            asset_name: Some(pending_name),
                            asset_type: Some(existing_type),
                        },
                        Some(1) => AssetBinding {
                            asset_id: None,
                            asset_name: None,
                            asset_type: Some(pending_type),
                        },
                        _ => {
                            info!(task_id, "Asset reconciliation cancelled");
                            return Ok(None);
                        }
                    }
                } else {
                    // Different type: no silent coercion offered.
                    let message = format!(
                        "The asset '{pending_name}' already exists within this parent, \
                         but type is different (current: {pending_type}, existing: {existing_type})."
                    );
                    match prompt.ask(&message, &["Create new", "Cancel"]) {
                        Some(0) => AssetBinding {
                            asset_id: None,
                            asset_name: None,
                            asset_type: Some(pending_type),
                        },
                        _ => {
                            info!(task_id, "Asset reconciliation cancelled (type mismatch)");
                            return Ok(None);
                        }
                    }
                }
            }
        };

        Ok(Some(ResolvedBinding { task: ctx, asset }))
    }

    /// Bind an asset from either a menu selection or a free-typed
    /// (name, type) pair.
    ///
    /// The menu path treats an exact `new_asset` label as "no selection"
    /// and falls through to the typed pair; the typed path checks name
    /// conflicts with an exact-match query against the task's parent.
    pub async fn bind_by_name_or_selection(
        &self,
        task_id: &str,
        selection: Option<AssetSelection>,
        typed: Option<TypedAsset>,
    ) -> Result<AssetBinding> {
        if let Some(sel) = selection {
            if let Some(asset_id) = sel.menu_ids.get(sel.index) {
                let asset = self
                    .client
                    .get("Asset", asset_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Asset not found: {asset_id}")))?;
                let name = asset.require_str("name")?;
                if name != NEW_ASSET_SENTINEL {
                    debug!(asset_id, name, "Bound asset from menu selection");
                    return Ok(AssetBinding {
                        asset_id: Some(asset.id.clone()),
                        asset_name: Some(name.to_string()),
                        asset_type: Some(asset.require_str("type_name")?.to_string()),
                    });
                }
                // Sentinel row: treated as no selection, fall through.
            } else {
                warn!(index = sel.index, "Menu selection index out of range");
            }
        }

        let Some(typed) = typed.filter(|t| !t.name.is_empty()) else {
            return Err(AppError::Validation(
                "No asset selected: pick one from the list or type a new name".to_string(),
            ));
        };

        if task_id.is_empty() {
            return Err(AppError::Validation(
                "Task id is empty. Set the task first.".to_string(),
            ));
        }

        let task = self
            .client
            .get("Task", task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task not found: {task_id}")))?;
        let parent_id = task.require_str("parent_id")?;

        // The typed name must not collide with any asset or higher-level
        // container under the same parent.
        for entity_type in ["Asset", "AssetBuild"] {
            let hits = self
                .client
                .query(&format!(
                    "{} where name is \"{}\" and parent.id is \"{}\"",
                    entity_type, typed.name, parent_id
                ))
                .await?;
            if !hits.is_empty() {
                return Err(AppError::Conflict(format!(
                    "Name '{}' already exists. Try to select from existing assets.",
                    typed.name
                )));
            }
        }

        debug!(name = %typed.name, asset_type = %typed.asset_type, "Bound new asset by typed name");
        Ok(AssetBinding {
            asset_id: None,
            asset_name: Some(typed.name),
            asset_type: Some(typed.asset_type),
        })
    }

    /// Ordered name->id / name->type listing of the assets under a task's
    /// parent. Sorted by lowercased name; duplicate names keep the first
    /// occurrence.
    pub async fn list_assets_for_task(&self, task_id: &str) -> Result<AssetListing> {
        let task = self
            .client
            .get("Task", task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task not found: {task_id}")))?;
        let parent_id = task.require_str("parent_id")?;

        let mut assets = self
            .client
            .query(&format!("Asset where parent.id is \"{parent_id}\""))
            .await?;
        assets.sort_by_key(|a| a.str_field("name").unwrap_or_default().to_lowercase());

        let mut listing = AssetListing::default();
        for asset in assets {
            let Some(name) = asset.str_field("name") else {
                continue;
            };
            if listing.ids.contains_key(name) {
                continue;
            }
            let type_name = asset.str_field("type_name").unwrap_or_default();
            listing.ids.insert(name.to_string(), asset.id.clone());
            listing.types.insert(name.to_string(), type_name.to_string());
        }
        debug!(task_id, count = listing.ids.len(), "Asset listing built");
        Ok(listing)
    }

    /// Parent and project entities of a task or asset, read transitively.
    async fn ancestry(&self, entity: &Entity) -> Result<(Entity, Entity)> {
        let parent_id = entity.require_str("parent_id")?;
        let parent = self
            .client
            .get("Context", parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Context not found: {parent_id}")))?;
        let project_id = parent.require_str("project_id")?;
        let project = self
            .client
            .get("Project", project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project not found: {project_id}")))?;
        Ok((parent, project))
    }
}
