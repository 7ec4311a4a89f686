// Application Layer - Use Cases of the publish pipeline

pub mod builder;
pub mod executor;
pub mod resolver;
pub mod sequence;

// Re-exports
pub use builder::JobBuilder;
pub use executor::{ExecutionMode, PublishExecutor};
pub use resolver::{
    AssetBinding, AssetListing, AssetSelection, AssetTaskResolver, ResolvedBinding, TaskContext,
    TypedAsset,
};
pub use sequence::{detect, has_frame_token, looks_like_pattern, SequenceInfo};
