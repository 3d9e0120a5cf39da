//! Turn release-style filenames into something a catalog search can match.

use regex::Regex;
use std::sync::LazyLock;

// Word boundaries are ASCII-only: a non-ASCII letter next to a token does
// not shield it, so "Café2019" still loses its year.

/// First standalone year token, 1900–2099.
static YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)(?:19|20)[0-9]{2}(?-u:\b)").expect("year pattern is valid")
});

/// Resolution, codec and rip-source markers, whole words only.
static RELEASE_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?-u:\b)(?:720p|1080p|2160p|4k|BluRay|WEBRip|x264|x265|HDR|DVDRip|BRRip|AAC|MP3|H264|HEVC)(?-u:\b)",
    )
    .expect("release tag pattern is valid")
});

/// Derive a candidate title from a raw filename.
///
/// Steps, in order: drop the last extension, drop the first year token,
/// drop every release tag, turn `.` and `_` into spaces, collapse
/// whitespace and trim. The result is empty when the name held nothing
/// but removable tokens; see [`candidate_title`] for the fallback.
pub fn extract_title(filename: &str) -> String {
    let stem = strip_extension(filename);
    let without_year = YEAR.replace(stem, "");
    let without_tags = RELEASE_TAGS.replace_all(&without_year, "");
    let spaced = without_tags.replace(['.', '_'], " ");

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`extract_title`], or the raw filename when extraction leaves nothing.
pub fn candidate_title(filename: &str) -> String {
    let title = extract_title(filename);
    if title.is_empty() {
        filename.to_string()
    } else {
        title
    }
}

fn strip_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains('/') => stem,
        _ => filename,
    }
}
