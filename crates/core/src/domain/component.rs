// Component Domain Model

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered string->string metadata attached to a component.
///
/// Non-snapshot components always carry a `dcc` tag identifying the
/// originating tool.
pub type Metadata = IndexMap<String, String>;

/// Inclusive frame range of a file sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
}

impl FrameRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Number of frames assuming a contiguous range
    pub fn count(&self) -> i64 {
        self.end - self.start + 1
    }
}

impl std::fmt::Display for FrameRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Kind of a publish component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Scene snapshot; its path may be materialized just-in-time before
    /// execution, so no existence check is ever performed.
    Snapshot,
    /// Reviewable media, encoded by the tracking service rather than stored
    /// as a plain file component.
    Media,
    /// A single literal file on disk.
    File,
    /// A frame sequence described by a canonical pattern string.
    Sequence,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Snapshot => "snapshot",
            ComponentKind::Media => "media",
            ComponentKind::File => "file",
            ComponentKind::Sequence => "sequence",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComponentKind {
    type Err = crate::domain::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snapshot" => Ok(ComponentKind::Snapshot),
            "media" => Ok(ComponentKind::Media),
            "file" => Ok(ComponentKind::File),
            "sequence" => Ok(ComponentKind::Sequence),
            other => Err(crate::domain::DomainError::UnknownKind(other.to_string())),
        }
    }
}

/// One named file/sequence/media attachment of a publish job.
///
/// Immutable after construction: edits replace the entry, they never mutate
/// it in place. `name` is unique within a job by convention only; collisions
/// are allowed but discouraged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub name: String,

    /// Path to the file or sequence. `None` only for a snapshot that has not
    /// been materialized yet.
    pub source_path: Option<String>,

    pub kind: ComponentKind,

    pub enabled: bool,

    #[serde(default)]
    pub metadata: Metadata,

    /// Canonical printf-style pattern, only for sequences
    pub sequence_pattern: Option<String>,

    /// Inclusive frame range, only for sequences
    pub frame_range: Option<FrameRange>,
}

impl ComponentEntry {
    /// A plain file component
    pub fn file(name: impl Into<String>, path: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            name: name.into(),
            source_path: Some(path.into()),
            kind: ComponentKind::File,
            enabled: true,
            metadata,
            sequence_pattern: None,
            frame_range: None,
        }
    }

    /// A sequence component carrying the detector's canonical pattern
    pub fn sequence(
        name: impl Into<String>,
        pattern: impl Into<String>,
        frame_range: FrameRange,
        metadata: Metadata,
    ) -> Self {
        let pattern = pattern.into();
        Self {
            name: name.into(),
            source_path: Some(pattern.clone()),
            kind: ComponentKind::Sequence,
            enabled: true,
            metadata,
            sequence_pattern: Some(pattern),
            frame_range: Some(frame_range),
        }
    }

    /// A media component, encoded by the tracking service
    pub fn media(name: impl Into<String>, path: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            name: name.into(),
            source_path: Some(path.into()),
            kind: ComponentKind::Media,
            enabled: true,
            metadata,
            sequence_pattern: None,
            frame_range: None,
        }
    }

    /// A snapshot component; `path` is `None` until the producer materializes
    /// the snapshot file.
    pub fn snapshot(path: Option<String>, metadata: Metadata) -> Self {
        Self {
            name: "snapshot".to_string(),
            source_path: path,
            kind: ComponentKind::Snapshot,
            enabled: true,
            metadata,
            sequence_pattern: None,
            frame_range: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The path the component resolves to at execution time: the sequence
    /// pattern when present, else the source path.
    pub fn resolved_path(&self) -> Option<&str> {
        self.sequence_pattern
            .as_deref()
            .or(self.source_path.as_deref())
            .filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
#[path = "component_test.rs"]
mod component_test;
