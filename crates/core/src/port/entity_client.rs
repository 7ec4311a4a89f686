// Remote Entity Client Port (Interface)
//
// The tracking service is a collaborator behind this port: a thin CRUD API
// whose per-call semantics are assumed reliable. All field access is by
// string key; nested relations (task.parent.project) are read transitively
// via repeated `get` calls.

use crate::domain::Metadata;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A remote entity as seen through the client: a type tag, an id and a flat
/// string-keyed field map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub entity_type: String,
    pub fields: serde_json::Map<String, Value>,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            fields: serde_json::Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// String field by key, `None` when absent or not a string
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn i64_field(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }

    /// String field that must exist, mapped to a remote error otherwise
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.str_field(key).ok_or_else(|| {
            crate::error::AppError::Remote(format!(
                "{} {} has no '{}' field",
                self.entity_type, self.id, key
            ))
        })
    }
}

/// Client interface for the production-tracking service.
///
/// Mutating verbs buffer into a session; `commit` flushes it. Convenience
/// verbs (`create_component`, `encode_media`, `create_note`) mirror the
/// service API and exist because their server-side behavior goes beyond a
/// plain `create`.
#[async_trait]
pub trait EntityClient: Send + Sync {
    /// Fetch one entity by type and id
    async fn get(&self, entity_type: &str, id: &str) -> Result<Option<Entity>>;

    /// Run a predicate-string query, e.g.
    /// `Asset where parent.id is "abc" and name is "hero"`
    async fn query(&self, expr: &str) -> Result<Vec<Entity>>;

    /// Create an entity with the given fields
    async fn create(&self, entity_type: &str, fields: serde_json::Map<String, Value>)
        -> Result<Entity>;

    /// Overwrite fields on an existing entity
    async fn update(
        &self,
        entity_type: &str,
        id: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<()>;

    /// Flush the pending session
    async fn commit(&self) -> Result<()>;

    /// Create a file component under a version; the backing store resolves
    /// the path (per-frame for sequence patterns) at storage time.
    async fn create_component(
        &self,
        version_id: &str,
        path: &str,
        name: &str,
        metadata: &Metadata,
    ) -> Result<Entity>;

    /// Hand a media file to the service's encoder
    async fn encode_media(&self, version_id: &str, path: &str) -> Result<()>;

    /// Attach a note to a version
    async fn create_note(&self, version_id: &str, text: &str, author_id: &str) -> Result<Entity>;

    /// Username of the current API principal
    fn api_user(&self) -> &str;
}
