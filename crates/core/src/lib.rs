// Shotlink Core - Domain Logic & Ports
// NO infrastructure dependencies: the tracking service, producers and
// time accounting are all behind ports.

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
