//! Sequence detection - derives a canonical frame-range pattern from a
//! single observed file path.
//!
//! The observed path may not exist on disk: DCCs expand frame tokens to the
//! *current* frame (e.g. `$F4` -> `0001`) while the rendered sequence starts
//! elsewhere. Detection therefore scans the directory for same-skeleton
//! siblings, with a raw-path fallback that rewrites the unexpanded token to
//! a wildcard. A single matching file is never a sequence.

use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::domain::FrameRange;

/// Extensions that can belong to frame sequences: images, volumetric and
/// particle caches, certain geometry caches. Compound extensions are listed
/// before their simple suffixes so they match first.
const SEQUENCE_EXTENSIONS: &[&str] = &[
    ".bgeo.sc", ".geo.sc", ".vdb", ".exr", ".jpg", ".jpeg", ".bgeo", ".tiff", ".tif", ".png",
    ".geo", ".sc", ".abc", ".ass",
];

/// A detected sequence: canonical pattern plus frame bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceInfo {
    /// Canonical form `<dir>/<prefix>%0Nd<ext> [<start>-<end>]`. The
    /// bracketed range is part of the string so consumers can parse frame
    /// bounds back out without a second disk scan.
    pub pattern: String,
    pub frame_range: FrameRange,
    /// Frames actually present on disk (not the range span)
    pub frame_count: usize,
}

/// True when a path carries a frame token a producer would type: printf
/// (`%d`, `%04d`), Houdini (`$F4`), Nuke-style (`@`), or `#` between
/// `.`/`_` separators or at the end of the path.
pub fn has_frame_token(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    if path.contains("%d") || path.contains("%0") || path.contains("$F") || path.contains('@') {
        return true;
    }
    if path.contains('#') {
        // Bare '#' only counts as part of a filename pattern
        let sep = Regex::new(r"[._]#+[._]").expect("static regex");
        return sep.is_match(path) || path.ends_with('#');
    }
    false
}

/// True when a path is a pattern rather than a literal file: printf marker,
/// wildcard frame marker, or a bracketed frame range. Used to decide whether
/// an on-disk existence check makes sense.
pub fn looks_like_pattern(path: &str) -> bool {
    path.contains('%') || path.contains('@') || (path.contains('[') && path.contains(']'))
}

/// Detect whether `evaluated_path` belongs to a frame sequence on disk.
///
/// `raw_path` is the unevaluated/templated form when the producer has one
/// (e.g. `shot.$F4.exr`); it drives the fallback scan when the evaluated
/// frame number does not line up with what is on disk.
///
/// Any I/O error, unreadable directory or unparsable name yields `None`,
/// never an error: a file the detector cannot classify is a plain file.
pub fn detect(evaluated_path: &str, raw_path: Option<&str>) -> Option<SequenceInfo> {
    if evaluated_path.is_empty() {
        return None;
    }

    // Cheap gate before any disk access: non-sequenceable formats can never
    // be sequences.
    let ext = sequence_extension(evaluated_path)?;

    let path = Path::new(evaluated_path);
    let dir = path.parent()?;
    let basename = path.file_name()?.to_str()?;
    let stem = &basename[..basename.len() - ext.len()];

    // 1. Anchored scan: same-skeleton files next to the evaluated path.
    if let Some((prefix, _token)) = split_trailing_digits(stem) {
        if let Some(info) = scan_skeleton(dir, prefix, ext) {
            return Some(info);
        }
    }

    // 2. Fallback: rewrite an unexpanded frame token (or the evaluated
    //    digits) to a wildcard skeleton and pick the longest group.
    let (fb_prefix, fb_suffix) = fallback_skeleton(stem, ext, raw_path)?;
    scan_grouped(dir, &fb_prefix, &fb_suffix)
}

/// The matching sequenceable extension of `path`, preserving its original
/// spelling, or `None`.
fn sequence_extension(path: &str) -> Option<&str> {
    let lower = path.to_lowercase();
    for ext in SEQUENCE_EXTENSIONS {
        if lower.ends_with(ext) {
            return Some(&path[path.len() - ext.len()..]);
        }
    }
    None
}

/// Split `stem` into (prefix, trailing digit run), e.g. `shot.1130` ->
/// (`shot.`, `1130`).
fn split_trailing_digits(stem: &str) -> Option<(&str, &str)> {
    let digits_start = stem
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    let token = &stem[digits_start..];
    if token.is_empty() {
        return None;
    }
    Some((&stem[..digits_start], token))
}

/// Collect frames for `<prefix><digits><ext>` in `dir`, any digit width.
fn scan_skeleton(dir: &Path, prefix: &str, ext: &str) -> Option<SequenceInfo> {
    let mut frames: BTreeSet<i64> = BTreeSet::new();
    let mut widths: BTreeSet<usize> = BTreeSet::new();

    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(token) = strip_skeleton(name, prefix, ext) else {
            continue;
        };
        if let Ok(frame) = token.parse::<i64>() {
            frames.insert(frame);
            widths.insert(token.len());
        }
    }

    build_info(dir, prefix, ext, &frames, &widths)
}

/// Wildcard skeleton for the fallback scan: (prefix, suffix) of the frame
/// token within the basename. Prefers a raw path containing `$F`; otherwise
/// rewrites the evaluated trailing digits.
fn fallback_skeleton(stem: &str, ext: &str, raw_path: Option<&str>) -> Option<(String, String)> {
    if let Some(raw) = raw_path {
        if raw.contains("$F") {
            let raw_base = Path::new(raw).file_name()?.to_str()?;
            let token = Regex::new(r"\$F\d*").expect("static regex");
            let m = token.find(raw_base)?;
            debug!(raw = raw_base, "Using raw path for sequence fallback");
            return Some((
                raw_base[..m.start()].to_string(),
                raw_base[m.end()..].to_string(),
            ));
        }
    }
    let (prefix, _token) = split_trailing_digits(stem)?;
    Some((prefix.to_string(), ext.to_string()))
}

/// Scan `dir` for `^prefix(\d+)suffix$`, group by digit width, and build the
/// result from the longest group (ties broken by first frame seen).
fn scan_grouped(dir: &Path, prefix: &str, suffix: &str) -> Option<SequenceInfo> {
    // width -> (frames, scan order of first hit)
    let mut groups: Vec<(usize, BTreeSet<i64>, usize)> = Vec::new();
    let mut order = 0usize;

    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(rest) = name.strip_prefix(prefix) else {
            continue;
        };
        let Some(token) = rest.strip_suffix(suffix) else {
            continue;
        };
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let Ok(frame) = token.parse::<i64>() else {
            continue;
        };
        match groups.iter_mut().find(|(w, _, _)| *w == token.len()) {
            Some((_, frames, _)) => {
                frames.insert(frame);
            }
            None => {
                let mut frames = BTreeSet::new();
                frames.insert(frame);
                groups.push((token.len(), frames, order));
            }
        }
        order += 1;
    }

    // Longest group wins; earlier first-hit wins ties.
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.2.cmp(&b.2)));
    let (width, frames, _) = groups.into_iter().next()?;

    let mut widths = BTreeSet::new();
    widths.insert(width);
    build_info(dir, prefix, suffix, &frames, &widths)
}

/// Strip `<prefix>` and `<ext>` off `name`, returning the digit token, or
/// `None` when the name does not fit the skeleton.
fn strip_skeleton<'a>(name: &'a str, prefix: &str, ext: &str) -> Option<&'a str> {
    let rest = name.strip_prefix(prefix)?;
    let token = rest.strip_suffix(ext)?;
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(token)
}

fn build_info(
    dir: &Path,
    prefix: &str,
    suffix: &str,
    frames: &BTreeSet<i64>,
    widths: &BTreeSet<usize>,
) -> Option<SequenceInfo> {
    // A single frame is not a sequence.
    if frames.len() < 2 {
        return None;
    }
    let start = *frames.iter().next()?;
    let end = *frames.iter().next_back()?;

    // Natural digit width of the frame token: uniform width when padding is
    // consistent, else the width of the largest frame number (tolerates
    // inconsistently padded strays).
    let width = if widths.len() == 1 {
        *widths.iter().next()?
    } else {
        end.to_string().len()
    };

    let dir_str = dir.to_string_lossy().replace('\\', "/");
    let pattern = format!("{dir_str}/{prefix}%0{width}d{suffix} [{start}-{end}]");
    debug!(
        pattern = %pattern,
        frames = frames.len(),
        "Sequence detected"
    );
    Some(SequenceInfo {
        pattern,
        frame_range: FrameRange::new(start, end),
        frame_count: frames.len(),
    })
}

#[cfg(test)]
#[path = "sequence_test.rs"]
mod sequence_test;
