// Time Accountant Port
//
// Optional collaborator that records working time against a task after a
// successful publish. Failures here are always absorbed by the caller.

use crate::error::Result;
use async_trait::async_trait;

/// One recorded time log
#[derive(Debug, Clone)]
pub struct TimeLog {
    /// Remote Timelog entity id, when the service accepted it
    pub id: Option<String>,
    pub seconds: f64,
}

#[async_trait]
pub trait TimeAccountant: Send + Sync {
    /// Record publish time against `task_id`. `task_count` is the number of
    /// tasks published in the same action; the elapsed span is split evenly
    /// across them.
    async fn log_publish(&self, task_id: &str, task_count: usize) -> Result<TimeLog>;
}
