use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use shotlink_core::port::{Entity, EntityClient, TimeAccountant, TimeLog};
use shotlink_core::{AppError, Result};

/// Where the daily logs live and when the working day begins.
#[derive(Debug, Clone)]
pub struct TimelogConfig {
    pub dir: PathBuf,
    /// First publish of a day counts from here
    pub day_start: NaiveTime,
}

impl TimelogConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            day_start: default_day_start(),
        }
    }

    pub fn with_day_start(mut self, day_start: NaiveTime) -> Self {
        self.day_start = day_start;
        self
    }
}

fn default_day_start() -> NaiveTime {
    // 10:00 local
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()
}

/// Parse a `HH:MM` day-start string, e.g. from `SHOTLINK_DAY_START`.
pub fn parse_day_start(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").ok()
}

/// One day of publish timestamps, RFC 3339.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DayLog {
    publishes: Vec<String>,
}

impl DayLog {
    fn load(path: &Path) -> Self {
        let Ok(raw) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&raw) {
            Ok(log) => log,
            Err(err) => {
                warn!(path = %path.display(), %err, "unreadable timelog file, starting fresh");
                Self::default()
            }
        }
    }

    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn last_publish(&self) -> Option<DateTime<Local>> {
        let raw = self.publishes.last()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Local))
    }
}

/// TimeAccountant over a directory of `{YYYY-MM-DD}.json` files.
pub struct FileTimeAccountant {
    client: Arc<dyn EntityClient>,
    config: TimelogConfig,
}

impl FileTimeAccountant {
    pub fn new(client: Arc<dyn EntityClient>, config: TimelogConfig) -> Self {
        Self { client, config }
    }

    fn day_file(&self, now: DateTime<Local>) -> PathBuf {
        self.config.dir.join(format!("{}.json", now.format("%Y-%m-%d")))
    }

    /// Seconds since the previous publish today (or since day start), split
    /// across `task_count` tasks. Appends `now` to the day file.
    fn record_elapsed(&self, now: DateTime<Local>, task_count: usize) -> Result<f64> {
        let path = self.day_file(now);
        let mut log = DayLog::load(&path);

        let baseline = log.last_publish().or_else(|| {
            Local
                .from_local_datetime(&now.date_naive().and_time(self.config.day_start))
                .single()
        });
        let elapsed = match baseline {
            Some(start) => (now - start).num_milliseconds().max(0) as f64 / 1000.0,
            None => 0.0,
        };

        log.publishes.push(now.to_rfc3339());
        log.save(&path)?;

        Ok(elapsed / task_count.max(1) as f64)
    }

    async fn create_timelog(&self, task_id: &str, seconds: f64) -> Result<Entity> {
        let user_id = self.resolve_user().await;

        let mut fields = serde_json::Map::new();
        fields.insert("duration".into(), seconds.into());
        fields.insert("comment".into(), "shotlink publish".into());
        fields.insert("context_id".into(), task_id.into());
        if let Some(user_id) = user_id {
            fields.insert("user_id".into(), user_id.into());
        }

        let entity = self.client.create("Timelog", fields).await?;
        self.client.commit().await?;
        Ok(entity)
    }

    async fn resolve_user(&self) -> Option<String> {
        let expr = format!(r#"User where username is "{}""#, self.client.api_user());
        match self.client.query(&expr).await {
            Ok(users) => users.into_iter().next().map(|u| u.id),
            Err(err) => {
                debug!(%err, "user lookup failed, logging time without user");
                None
            }
        }
    }

    pub(crate) async fn log_publish_at(
        &self,
        task_id: &str,
        task_count: usize,
        now: DateTime<Local>,
    ) -> Result<TimeLog> {
        if task_id.is_empty() {
            return Err(AppError::Validation("timelog needs a task id".into()));
        }
        let seconds = self.record_elapsed(now, task_count)?;
        let entity = self.create_timelog(task_id, seconds).await?;
        debug!(task_id, seconds, timelog_id = %entity.id, "time logged");
        Ok(TimeLog {
            id: Some(entity.id),
            seconds,
        })
    }
}

#[async_trait]
impl TimeAccountant for FileTimeAccountant {
    async fn log_publish(&self, task_id: &str, task_count: usize) -> Result<TimeLog> {
        self.log_publish_at(task_id, task_count, Local::now()).await
    }
}

/// Human-readable duration, e.g. `1h 23m`, `45m`, `30s`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{total}s")
    }
}

/// Parse `1h 30m` / `90m` / `45s` / plain seconds into seconds.
pub fn parse_duration(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(plain) = text.parse::<f64>() {
        return (plain >= 0.0).then_some(plain);
    }

    let mut total = 0.0;
    for part in text.split_whitespace() {
        let unit = part.chars().last()?;
        let number = &part[..part.len() - unit.len_utf8()];
        let value: f64 = number.parse().ok()?;
        total += match unit {
            'h' => value * 3600.0,
            'm' => value * 60.0,
            's' => value,
            _ => return None,
        };
    }
    Some(total)
}

#[cfg(test)]
#[path = "accountant_test.rs"]
mod accountant_test;
