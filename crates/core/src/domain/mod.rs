// Domain Layer - Pure value objects for the publish pipeline

pub mod component;
pub mod error;
pub mod job;
pub mod result;

// Re-exports
pub use component::{ComponentEntry, ComponentKind, FrameRange, Metadata};
pub use error::DomainError;
pub use job::PublishJob;
pub use result::{ComponentSummary, PublishResult};
