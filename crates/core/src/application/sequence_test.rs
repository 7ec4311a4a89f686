use super::*;
use std::fs::File;
use tempfile::TempDir;

fn touch(dir: &TempDir, name: &str) {
    File::create(dir.path().join(name)).unwrap();
}

fn dir_str(dir: &TempDir) -> String {
    dir.path().to_string_lossy().replace('\\', "/")
}

#[test]
fn non_sequenceable_extension_is_rejected_without_disk_access() {
    // The directory does not exist; a disk scan would fail loudly.
    assert_eq!(detect("/definitely/missing/scene.hip", None), None);
    assert_eq!(detect("/definitely/missing/notes.txt", None), None);
}

#[test]
fn detects_siblings_around_a_missing_evaluated_frame() {
    let dir = TempDir::new().unwrap();
    touch(&dir, "shot.1128.exr");
    touch(&dir, "shot.1135.exr");

    // Evaluated frame 1130 does not exist on disk.
    let evaluated = format!("{}/shot.1130.exr", dir_str(&dir));
    let info = detect(&evaluated, Some("shot.$F4.exr")).unwrap();

    assert_eq!(info.frame_range, FrameRange::new(1128, 1135));
    assert_eq!(info.frame_count, 2);
    assert_eq!(
        info.pattern,
        format!("{}/shot.%04d.exr [1128-1135]", dir_str(&dir))
    );
}

#[test]
fn raw_token_fallback_finds_padded_frames_from_unpadded_expansion() {
    let dir = TempDir::new().unwrap();
    touch(&dir, "maya_part.1128.sc");
    touch(&dir, "maya_part.1129.sc");
    touch(&dir, "maya_part.1130.sc");

    // $F expands to the bare current frame; no trailing-digit skeleton of
    // width 0 exists, so only the raw-path rewrite can find the files.
    let evaluated = format!("{}/maya_part.f.sc", dir_str(&dir));
    let raw = format!("{}/maya_part.$F4.sc", dir_str(&dir));
    let info = detect(&evaluated, Some(&raw)).unwrap();

    assert_eq!(info.frame_range, FrameRange::new(1128, 1130));
    assert_eq!(info.frame_count, 3);
    assert!(info.pattern.ends_with("maya_part.%04d.sc [1128-1130]"));
}

#[test]
fn single_frame_is_not_a_sequence() {
    let dir = TempDir::new().unwrap();
    touch(&dir, "frame.0001.exr");

    let evaluated = format!("{}/frame.0001.exr", dir_str(&dir));
    assert_eq!(detect(&evaluated, None), None);
}

#[test]
fn longest_group_wins_when_padding_widths_compete() {
    let dir = TempDir::new().unwrap();
    touch(&dir, "part.1.sc");
    touch(&dir, "part.0001.sc");
    touch(&dir, "part.0002.sc");
    touch(&dir, "part.0003.sc");

    let evaluated = format!("{}/part.x.sc", dir_str(&dir));
    let raw = format!("{}/part.$F4.sc", dir_str(&dir));
    let info = detect(&evaluated, Some(&raw)).unwrap();

    // The width-4 group has three frames, the width-1 group only one.
    assert_eq!(info.frame_range, FrameRange::new(1, 3));
    assert!(info.pattern.contains("%04d"));
}

#[test]
fn inconsistent_padding_falls_back_to_natural_width() {
    let dir = TempDir::new().unwrap();
    touch(&dir, "cache.998.vdb");
    touch(&dir, "cache.1002.vdb");

    let evaluated = format!("{}/cache.998.vdb", dir_str(&dir));
    let info = detect(&evaluated, None).unwrap();

    assert_eq!(info.frame_range, FrameRange::new(998, 1002));
    // Mixed 3- and 4-digit tokens: width of the largest frame number.
    assert!(info.pattern.contains("%04d"));
}

#[test]
fn unreadable_directory_yields_none() {
    assert_eq!(detect("/no/such/dir/shot.0001.exr", None), None);
}

#[test]
fn compound_extensions_are_recognized() {
    let dir = TempDir::new().unwrap();
    touch(&dir, "sim.0001.bgeo.sc");
    touch(&dir, "sim.0002.bgeo.sc");

    let evaluated = format!("{}/sim.0001.bgeo.sc", dir_str(&dir));
    let info = detect(&evaluated, None).unwrap();
    assert!(info.pattern.ends_with("sim.%04d.bgeo.sc [1-2]"));
}

#[test]
fn frame_token_markers() {
    assert!(has_frame_token("/x/a.%04d.exr"));
    assert!(has_frame_token("/x/a.$F4.exr"));
    assert!(has_frame_token("/x/a.@.exr"));
    assert!(has_frame_token("/x/a.####.exr"));
    assert!(has_frame_token("/x/a_###_b.exr"));
    assert!(has_frame_token("/x/a.exr#"));
    assert!(!has_frame_token("/x/a#b.exr"));
    assert!(!has_frame_token("/x/a.0001.exr"));
    assert!(!has_frame_token(""));
}

#[test]
fn pattern_path_markers() {
    assert!(looks_like_pattern("/x/a.%04d.exr"));
    assert!(looks_like_pattern("/x/a.%04d.exr [1-10]"));
    assert!(looks_like_pattern("/x/a.@.exr"));
    assert!(!looks_like_pattern("/x/a.0001.exr"));
}
