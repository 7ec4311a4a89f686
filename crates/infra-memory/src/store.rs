// In-memory EntityClient implementation
//
// Mirrors the verbs of the remote tracking service over a process-local
// entity map: predicate-string queries, per-asset monotonic version
// numbers, and a commit counter. Every mutating verb is counted so tests
// can assert that preview execution touches nothing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use shotlink_core::domain::Metadata;
use shotlink_core::error::{AppError, Result};
use shotlink_core::port::{Entity, EntityClient};

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Malformed seed document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Duplicate entity id in seed: {0}")]
    DuplicateId(String),
}

#[derive(Deserialize)]
struct SeedDoc {
    #[serde(default)]
    projects: Vec<SeedProject>,
}

#[derive(Deserialize)]
struct SeedProject {
    id: Option<String>,
    name: String,
    #[serde(default)]
    contexts: Vec<SeedContext>,
}

#[derive(Deserialize)]
struct SeedContext {
    id: Option<String>,
    name: String,
    #[serde(default)]
    tasks: Vec<SeedTask>,
    #[serde(default)]
    assets: Vec<SeedAsset>,
}

#[derive(Deserialize)]
struct SeedTask {
    id: Option<String>,
    name: String,
}

#[derive(Deserialize)]
struct SeedAsset {
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    asset_type: String,
}

#[derive(Default)]
struct Store {
    entities: HashMap<String, Entity>,
    commit_count: u64,
    mutation_count: u64,
    /// (version_id, path) of every media encode request
    encoded_media: Vec<(String, String)>,
}

pub struct InMemoryEntityClient {
    inner: Mutex<Store>,
    api_user: String,
}

impl InMemoryEntityClient {
    pub fn new(api_user: impl Into<String>) -> Self {
        let client = Self {
            inner: Mutex::new(Store::default()),
            api_user: api_user.into(),
        };
        // The API principal exists as a User entity so note authoring works.
        let user = client.api_user.clone();
        client.insert_with_id("User", Uuid::new_v4().to_string(), |e| {
            e.with_field("username", user.as_str())
        });
        client
    }

    /// Load a seed document describing a project hierarchy:
    /// `{"projects": [{"name", "contexts": [{"name", "tasks": [...],
    /// "assets": [...]}]}]}`. Entries may carry explicit `id`s so job files
    /// can reference them.
    pub fn load_seed(&self, seed: &str) -> std::result::Result<(), SeedError> {
        let doc: SeedDoc = serde_json::from_str(seed)?;
        for project in doc.projects {
            let project_id = self.claim_id(project.id)?;
            self.insert_with_id("Project", project_id.clone(), |e| {
                e.with_field("name", project.name.as_str())
            });
            for ctx in project.contexts {
                let ctx_id = self.claim_id(ctx.id)?;
                self.insert_with_id("Context", ctx_id.clone(), |e| {
                    e.with_field("name", ctx.name.as_str())
                        .with_field("project_id", project_id.as_str())
                });
                for task in ctx.tasks {
                    let task_id = self.claim_id(task.id)?;
                    self.insert_with_id("Task", task_id, |e| {
                        e.with_field("name", task.name.as_str())
                            .with_field("parent_id", ctx_id.as_str())
                    });
                }
                for asset in ctx.assets {
                    let asset_id = self.claim_id(asset.id)?;
                    self.insert_with_id("Asset", asset_id, |e| {
                        e.with_field("name", asset.name.as_str())
                            .with_field("type_name", asset.asset_type.as_str())
                            .with_field("parent_id", ctx_id.as_str())
                    });
                }
            }
        }
        Ok(())
    }

    // ---- seeding helpers (tests and CLI wiring) ----

    pub fn seed_project(&self, name: &str) -> String {
        self.insert("Project", |e| e.with_field("name", name))
    }

    pub fn seed_context(&self, project_id: &str, name: &str) -> String {
        self.insert("Context", |e| {
            e.with_field("name", name).with_field("project_id", project_id)
        })
    }

    pub fn seed_task(&self, parent_id: &str, name: &str) -> String {
        self.insert("Task", |e| {
            e.with_field("name", name).with_field("parent_id", parent_id)
        })
    }

    pub fn seed_asset(&self, parent_id: &str, name: &str, type_name: &str) -> String {
        self.insert("Asset", |e| {
            e.with_field("name", name)
                .with_field("type_name", type_name)
                .with_field("parent_id", parent_id)
        })
    }

    // ---- inspection (tests) ----

    pub fn commit_count(&self) -> u64 {
        self.inner.lock().unwrap().commit_count
    }

    /// Count of create/update/encode/note/commit calls since construction
    pub fn mutation_count(&self) -> u64 {
        self.inner.lock().unwrap().mutation_count
    }

    pub fn encoded_media(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().encoded_media.clone()
    }

    pub fn entities_of_type(&self, entity_type: &str) -> Vec<Entity> {
        let store = self.inner.lock().unwrap();
        let mut out: Vec<Entity> = store
            .entities
            .values()
            .filter(|e| e.entity_type == entity_type)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    // ---- internals ----

    fn insert(&self, entity_type: &str, build: impl FnOnce(Entity) -> Entity) -> String {
        self.insert_with_id(entity_type, Uuid::new_v4().to_string(), build)
    }

    fn insert_with_id(
        &self,
        entity_type: &str,
        id: String,
        build: impl FnOnce(Entity) -> Entity,
    ) -> String {
        let entity = build(Entity::new(entity_type, id.clone()));
        self.inner.lock().unwrap().entities.insert(id.clone(), entity);
        id
    }

    fn claim_id(&self, id: Option<String>) -> std::result::Result<String, SeedError> {
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        if self.inner.lock().unwrap().entities.contains_key(&id) {
            return Err(SeedError::DuplicateId(id));
        }
        Ok(id)
    }

    fn next_version_number(store: &Store, asset_id: &str) -> i64 {
        store
            .entities
            .values()
            .filter(|e| {
                e.entity_type == "AssetVersion"
                    && e.str_field("asset_id") == Some(asset_id)
            })
            .filter_map(|e| e.i64_field("version"))
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[async_trait]
impl EntityClient for InMemoryEntityClient {
    async fn get(&self, entity_type: &str, id: &str) -> Result<Option<Entity>> {
        let store = self.inner.lock().unwrap();
        Ok(store
            .entities
            .get(id)
            .filter(|e| e.entity_type == entity_type)
            .cloned())
    }

    async fn query(&self, expr: &str) -> Result<Vec<Entity>> {
        let (entity_type, clauses) = parse_predicate(expr)?;
        let store = self.inner.lock().unwrap();
        let mut hits: Vec<Entity> = store
            .entities
            .values()
            .filter(|e| {
                e.entity_type == entity_type
                    && clauses
                        .iter()
                        .all(|(field, value)| e.str_field(field) == Some(value.as_str()))
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(expr, hits = hits.len(), "Query evaluated");
        Ok(hits)
    }

    async fn create(
        &self,
        entity_type: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<Entity> {
        let mut store = self.inner.lock().unwrap();
        store.mutation_count += 1;

        let mut entity = Entity::new(entity_type, Uuid::new_v4().to_string());
        entity.fields = fields;

        // Version numbers are assigned server-side, monotonic per asset.
        if entity_type == "AssetVersion" {
            let asset_id = entity
                .str_field("asset_id")
                .ok_or_else(|| {
                    AppError::Remote("AssetVersion requires an asset_id field".to_string())
                })?
                .to_string();
            let number = Self::next_version_number(&store, &asset_id);
            entity.fields.insert("version".to_string(), json!(number));
        }

        debug!(entity_type, id = %entity.id, "Entity created");
        store.entities.insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    async fn update(
        &self,
        entity_type: &str,
        id: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<()> {
        let mut store = self.inner.lock().unwrap();
        store.mutation_count += 1;
        let entity = store
            .entities
            .get_mut(id)
            .filter(|e| e.entity_type == entity_type)
            .ok_or_else(|| AppError::NotFound(format!("{entity_type} not found: {id}")))?;
        for (key, value) in fields {
            entity.fields.insert(key, value);
        }
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let mut store = self.inner.lock().unwrap();
        store.commit_count += 1;
        store.mutation_count += 1;
        Ok(())
    }

    async fn create_component(
        &self,
        version_id: &str,
        path: &str,
        name: &str,
        metadata: &Metadata,
    ) -> Result<Entity> {
        let file_type = component_file_type(path);
        let metadata_value: serde_json::Map<String, Value> = metadata
            .iter()
            .map(|(k, v)| (k.clone(), json!(v)))
            .collect();

        let mut fields = serde_json::Map::new();
        fields.insert("name".to_string(), json!(name));
        fields.insert("file_type".to_string(), json!(file_type));
        fields.insert("version_id".to_string(), json!(version_id));
        fields.insert("path".to_string(), json!(path));
        fields.insert("metadata".to_string(), Value::Object(metadata_value));
        self.create("Component", fields).await
    }

    async fn encode_media(&self, version_id: &str, path: &str) -> Result<()> {
        let mut store = self.inner.lock().unwrap();
        store.mutation_count += 1;
        store
            .encoded_media
            .push((version_id.to_string(), path.to_string()));
        Ok(())
    }

    async fn create_note(&self, version_id: &str, text: &str, author_id: &str) -> Result<Entity> {
        let mut fields = serde_json::Map::new();
        fields.insert("version_id".to_string(), json!(version_id));
        fields.insert("text".to_string(), json!(text));
        fields.insert("author_id".to_string(), json!(author_id));
        self.create("Note", fields).await
    }

    fn api_user(&self) -> &str {
        &self.api_user
    }
}

/// Parse `<Type> where <path> is "<value>" [and ...]`. Dotted paths map
/// onto the flat field layout (`parent.id` -> `parent_id`).
fn parse_predicate(expr: &str) -> Result<(String, Vec<(String, String)>)> {
    let (entity_type, conditions) = expr
        .split_once(" where ")
        .ok_or_else(|| AppError::Remote(format!("Unsupported query: {expr}")))?;

    let mut clauses = Vec::new();
    for clause in conditions.split(" and ") {
        let (path, value) = clause
            .split_once(" is ")
            .ok_or_else(|| AppError::Remote(format!("Unsupported clause: {clause}")))?;
        let value = value
            .trim()
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .ok_or_else(|| AppError::Remote(format!("Unquoted value in clause: {clause}")))?;
        clauses.push((path.trim().replace('.', "_"), value.to_string()));
    }
    Ok((entity_type.trim().to_string(), clauses))
}

/// Extension tag of a created component, dot included, range suffix and
/// printf tokens ignored: `/x/beauty.%04d.exr [1-5]` -> `.exr`.
fn component_file_type(path: &str) -> String {
    let path = match path.find(" [") {
        Some(idx) => &path[..idx],
        None => path,
    };
    match path.rfind('.') {
        Some(idx) => path[idx..].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
