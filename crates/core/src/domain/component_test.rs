use super::*;

#[test]
fn resolved_path_prefers_sequence_pattern() {
    let comp = ComponentEntry::sequence(
        "render",
        "/out/beauty.%04d.exr [1001-1096]",
        FrameRange::new(1001, 1096),
        Metadata::new(),
    );
    assert_eq!(
        comp.resolved_path(),
        Some("/out/beauty.%04d.exr [1001-1096]")
    );
    assert_eq!(comp.frame_range.unwrap().count(), 96);
}

#[test]
fn resolved_path_empty_string_is_none() {
    let comp = ComponentEntry::file("geo", "", Metadata::new());
    assert_eq!(comp.resolved_path(), None);
}

#[test]
fn snapshot_without_path_has_no_resolved_path() {
    let comp = ComponentEntry::snapshot(None, Metadata::new());
    assert_eq!(comp.kind, ComponentKind::Snapshot);
    assert_eq!(comp.resolved_path(), None);
}

#[test]
fn kind_round_trips_through_str() {
    for kind in [
        ComponentKind::Snapshot,
        ComponentKind::Media,
        ComponentKind::File,
        ComponentKind::Sequence,
    ] {
        let parsed: ComponentKind = kind.as_str().parse().unwrap();
        assert_eq!(parsed, kind);
    }
    assert!("playblast".parse::<ComponentKind>().is_err());
}

#[test]
fn component_serializes_with_snake_case_kind() {
    let comp = ComponentEntry::file("cache", "/tmp/cache.abc", Metadata::new());
    let value = serde_json::to_value(&comp).unwrap();
    assert_eq!(value["kind"], "file");
    assert_eq!(value["enabled"], true);
}
