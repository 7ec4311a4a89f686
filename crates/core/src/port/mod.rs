// Port Layer - Interfaces for external dependencies

pub mod conflict;
pub mod entity_client;
pub mod parameters;
pub mod time_accountant;
pub mod time_provider;

// Re-exports
pub use conflict::ConflictPrompt;
pub use entity_client::{Entity, EntityClient};
pub use parameters::{ParameterStore, Severity};
pub use time_accountant::{TimeAccountant, TimeLog};
pub use time_provider::{SystemTimeProvider, TimeProvider};
