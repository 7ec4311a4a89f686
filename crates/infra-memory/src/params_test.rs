use super::*;

use shotlink_core::port::parameters::ParameterStoreExt;

#[test]
fn map_store_round_trips_values() {
    let store = MapParameterStore::from_pairs([("comp_name0", "beauty")]);
    assert_eq!(store.get_parameter("comp_name0").as_deref(), Some("beauty"));
    assert_eq!(store.get_parameter("comp_name1"), None);

    store.set_parameter("comp_name1", "depth");
    assert_eq!(store.get_parameter("comp_name1").as_deref(), Some("depth"));
}

#[test]
fn map_store_flag_and_count_helpers() {
    let store = MapParameterStore::from_pairs([
        ("use_media", "1"),
        ("use_snapshot", "off"),
        ("component_count", "3"),
    ]);
    assert!(store.get_flag("use_media"));
    assert!(!store.get_flag("use_snapshot"));
    assert!(!store.get_flag("missing"));
    assert_eq!(store.get_count("component_count"), 3);
    assert_eq!(store.get_count("missing"), 0);
}

#[test]
fn scripted_prompt_replays_in_order_then_cancels() {
    let prompt = ScriptedPrompt::new(vec![Some(1), Some(0)]);
    assert_eq!(prompt.ask("first?", &["a", "b"]), Some(1));
    assert_eq!(prompt.ask("second?", &["a", "b"]), Some(0));
    // exhausted
    assert_eq!(prompt.ask("third?", &["a", "b"]), None);
    assert_eq!(prompt.questions(), vec!["first?", "second?", "third?"]);
}

#[test]
fn scripted_prompt_rejects_out_of_range_answer() {
    let prompt = ScriptedPrompt::new(vec![Some(5)]);
    assert_eq!(prompt.ask("pick", &["only"]), None);
}

#[test]
fn recording_prompt_cancels_everything() {
    let prompt = RecordingPrompt::new();
    assert_eq!(prompt.ask("continue?", &["yes", "no"]), None);
    assert_eq!(prompt.questions(), vec!["continue?"]);
}
