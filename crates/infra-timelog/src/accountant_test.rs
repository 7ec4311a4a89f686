use super::*;

use chrono::TimeZone;
use shotlink_infra_memory::InMemoryEntityClient;
use tempfile::TempDir;

fn accountant(dir: &TempDir) -> (Arc<InMemoryEntityClient>, FileTimeAccountant) {
    let client = Arc::new(InMemoryEntityClient::new("artist"));
    let acc = FileTimeAccountant::new(client.clone(), TimelogConfig::new(dir.path()));
    (client, acc)
}

fn at(hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 3, 5, hour, minute, 0)
        .single()
        .unwrap()
}

#[tokio::test]
async fn first_publish_counts_from_day_start() {
    let dir = TempDir::new().unwrap();
    let (_, acc) = accountant(&dir);

    let log = acc.log_publish_at("task-1", 1, at(12, 0)).await.unwrap();
    // day start 10:00 -> 2 hours
    assert_eq!(log.seconds, 7200.0);
    assert!(log.id.is_some());
}

#[tokio::test]
async fn later_publish_counts_from_previous_one() {
    let dir = TempDir::new().unwrap();
    let (_, acc) = accountant(&dir);

    acc.log_publish_at("task-1", 1, at(12, 0)).await.unwrap();
    let log = acc.log_publish_at("task-1", 1, at(12, 30)).await.unwrap();
    assert_eq!(log.seconds, 1800.0);
}

#[tokio::test]
async fn elapsed_is_split_across_tasks() {
    let dir = TempDir::new().unwrap();
    let (_, acc) = accountant(&dir);

    acc.log_publish_at("task-1", 1, at(11, 0)).await.unwrap();
    let log = acc.log_publish_at("task-2", 2, at(12, 0)).await.unwrap();
    assert_eq!(log.seconds, 1800.0);
}

#[tokio::test]
async fn garbage_day_file_is_treated_as_empty() {
    let dir = TempDir::new().unwrap();
    let (_, acc) = accountant(&dir);

    std::fs::write(dir.path().join("2026-03-05.json"), "not json").unwrap();
    let log = acc.log_publish_at("task-1", 1, at(10, 30)).await.unwrap();
    assert_eq!(log.seconds, 1800.0);
}

#[tokio::test]
async fn timelog_entity_carries_duration_and_context() {
    let dir = TempDir::new().unwrap();
    let (client, acc) = accountant(&dir);

    acc.log_publish_at("task-1", 1, at(10, 30)).await.unwrap();

    let logs = client.entities_of_type("Timelog");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].str_field("context_id"), Some("task-1"));
    assert_eq!(logs[0].fields["duration"].as_f64(), Some(1800.0));
    assert!(logs[0].str_field("user_id").is_some());
    assert!(client.commit_count() >= 1);
}

#[tokio::test]
async fn empty_task_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (_, acc) = accountant(&dir);
    assert!(acc.log_publish_at("", 1, at(11, 0)).await.is_err());
}

#[test]
fn custom_day_start_is_honored() {
    let dir = TempDir::new().unwrap();
    let client = Arc::new(InMemoryEntityClient::new("artist"));
    let config = TimelogConfig::new(dir.path())
        .with_day_start(parse_day_start("09:00").unwrap());
    let acc = FileTimeAccountant::new(client, config);

    let seconds = acc.record_elapsed(at(9, 45), 1).unwrap();
    assert_eq!(seconds, 2700.0);
}

#[test]
fn duration_formatting() {
    assert_eq!(format_duration(0.0), "0s");
    assert_eq!(format_duration(45.0), "45s");
    assert_eq!(format_duration(2700.0), "45m");
    assert_eq!(format_duration(4980.0), "1h 23m");
    assert_eq!(format_duration(-5.0), "0s");
}

#[test]
fn duration_parsing() {
    assert_eq!(parse_duration("90"), Some(90.0));
    assert_eq!(parse_duration("45s"), Some(45.0));
    assert_eq!(parse_duration("90m"), Some(5400.0));
    assert_eq!(parse_duration("1h 30m"), Some(5400.0));
    assert_eq!(parse_duration(""), None);
    assert_eq!(parse_duration("soon"), None);
}

#[test]
fn day_start_parsing() {
    assert!(parse_day_start("10:00").is_some());
    assert!(parse_day_start(" 09:30 ").is_some());
    assert!(parse_day_start("ten").is_none());
}
