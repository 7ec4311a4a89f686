use std::collections::HashMap;
use std::sync::Mutex;

use super::*;
use crate::domain::ComponentKind;
use crate::port::parameters::Severity;

struct FixedTime(i64);

impl TimeProvider for FixedTime {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

struct TestParams {
    values: Mutex<HashMap<String, String>>,
}

impl TestParams {
    fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: Mutex::new(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }
}

impl ParameterStore for TestParams {
    fn get_parameter(&self, name: &str) -> Option<String> {
        self.values.lock().unwrap().get(name).cloned()
    }

    fn set_parameter(&self, name: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn show_message(&self, _text: &str, _severity: Severity) {}
}

#[test]
fn builds_job_from_parameter_schema() {
    let params = TestParams::new(&[
        ("p_task_id", "task-7"),
        ("p_asset_name", "hero"),
        ("p_asset_type", "geo"),
        ("comment", "first pass"),
        ("scene_path", "/scenes/shot010.hip"),
        ("use_snapshot", "1"),
        ("use_media", "1"),
        ("media_path", "/renders/preview.mp4"),
        ("component_count", "2"),
        ("comp_name1", "main.abc"),
        ("file_path1", "/caches/main.abc"),
        ("export1", "1"),
        ("meta_count1", "1"),
        ("key1_1", "lod"),
        ("value1_1", "high"),
        ("comp_name2", "extra"),
        ("file_path2", "/caches/extra.abc"),
        ("export2", "0"),
    ]);

    let job = JobBuilder::from_parameters(&params, "houdini", &FixedTime(42));

    assert_eq!(job.task_id, "task-7");
    assert_eq!(job.asset_name.as_deref(), Some("hero"));
    assert_eq!(job.asset_type.as_deref(), Some("geo"));
    assert_eq!(job.comment, "first pass");
    assert_eq!(job.origin_scene.as_deref(), Some("/scenes/shot010.hip"));
    assert_eq!(job.created_at, 42);
    assert_eq!(job.components.len(), 4);

    let snapshot = &job.components[0];
    assert_eq!(snapshot.kind, ComponentKind::Snapshot);
    assert!(snapshot.metadata.is_empty());

    let media = &job.components[1];
    assert_eq!(media.kind, ComponentKind::Media);
    assert_eq!(media.metadata.get("dcc").map(String::as_str), Some("houdini"));

    let main = &job.components[2];
    assert_eq!(main.kind, ComponentKind::File);
    assert!(main.enabled);
    assert_eq!(main.metadata.get("lod").map(String::as_str), Some("high"));

    let extra = &job.components[3];
    assert!(!extra.enabled);
}

#[test]
fn placeholder_and_empty_paths_are_skipped() {
    let params = TestParams::new(&[
        ("p_task_id", "task-7"),
        ("component_count", "2"),
        ("comp_name1", "template"),
        ("file_path1", "*.abc"),
        ("comp_name2", "blank"),
        ("file_path2", "   "),
    ]);

    let job = JobBuilder::from_parameters(&params, "maya", &FixedTime(0));
    assert!(job.components.is_empty());
}

#[test]
fn missing_export_toggle_defaults_to_enabled() {
    let params = TestParams::new(&[
        ("p_task_id", "task-7"),
        ("component_count", "1"),
        ("comp_name1", "main"),
        ("file_path1", "/caches/main.abc"),
    ]);

    let job = JobBuilder::from_parameters(&params, "maya", &FixedTime(0));
    assert_eq!(job.components.len(), 1);
    assert!(job.components[0].enabled);
}

#[test]
fn frame_token_path_becomes_sequence_without_disk_hits() {
    let params = TestParams::new(&[
        ("p_task_id", "task-7"),
        ("component_count", "1"),
        ("comp_name1", "render"),
        ("file_path1", "/renders/beauty.%04d.exr"),
    ]);

    let job = JobBuilder::from_parameters(&params, "houdini", &FixedTime(0));
    let comp = &job.components[0];
    assert_eq!(comp.kind, ComponentKind::Sequence);
    assert_eq!(
        comp.sequence_pattern.as_deref(),
        Some("/renders/beauty.%04d.exr")
    );
    assert!(comp.frame_range.is_none());
}

#[test]
fn unnamed_component_gets_indexed_fallback_name() {
    let params = TestParams::new(&[
        ("p_task_id", "task-7"),
        ("component_count", "1"),
        ("file_path1", "/caches/main.abc"),
    ]);

    let job = JobBuilder::from_parameters(&params, "maya", &FixedTime(0));
    assert_eq!(job.components[0].name, "component_1");
}

#[test]
fn from_value_stamps_missing_created_at() {
    let value = serde_json::json!({
        "task_id": "task-1",
        "asset_name": "hero",
        "asset_type": "geo",
        "components": [{
            "name": "main.abc",
            "source_path": "/tmp/main.abc",
            "kind": "file",
            "enabled": true
        }]
    });

    let job = JobBuilder::from_value(value, &FixedTime(777)).unwrap();
    assert_eq!(job.created_at, 777);
    assert_eq!(job.origin_tool, "unknown");
    let (ok, _) = job.validate();
    assert!(ok);
}
