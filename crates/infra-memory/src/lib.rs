// Shotlink In-Memory Infrastructure
//
// An EntityClient adapter backed by process memory, plus producer-side test
// doubles. Serves the integration tests and the offline CLI; it is NOT a
// client for any real tracking service.

mod params;
mod store;

pub use params::{AlwaysPrompt, MapParameterStore, RecordingPrompt, ScriptedPrompt};
pub use store::{InMemoryEntityClient, SeedError};
