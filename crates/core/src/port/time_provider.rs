// Clock Port
//
// Job timestamps are injected, never read from the system clock directly,
// so builders stay deterministic under test.

/// Source of "now" for job construction
pub trait TimeProvider: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall-clock provider wired in by the composition root
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
