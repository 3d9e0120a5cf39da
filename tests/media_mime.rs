use std::path::Path;
use reelshelf::media::mime::{classify, content_type_for, DEFAULT_VIDEO_MIME};

#[test]
fn test_listable_extensions() {
    assert_eq!(classify(Path::new("movie.mp4")), Some("video/mp4"));
    assert_eq!(classify(Path::new("movie.mkv")), Some("video/x-matroska"));
    assert_eq!(classify(Path::new("movie.avi")), Some("video/x-msvideo"));
    assert_eq!(classify(Path::new("movie.mov")), Some("video/quicktime"));
}

#[test]
fn test_case_insensitive() {
    assert_eq!(classify(Path::new("MOVIE.MKV")), Some("video/x-matroska"));
}

#[test]
fn test_other_extensions_not_listed() {
    assert!(classify(Path::new("movie.srt")).is_none());
    assert!(classify(Path::new("movie.webm")).is_none());
    assert!(classify(Path::new("notes.txt")).is_none());
}

#[test]
fn test_no_extension_returns_none() {
    assert!(classify(Path::new("Makefile")).is_none());
}

#[test]
fn test_content_type_follows_extension() {
    assert_eq!(content_type_for("a.mkv"), "video/x-matroska");
    assert_eq!(content_type_for("a.webm"), "video/webm");
}

#[test]
fn test_content_type_falls_back_to_mp4() {
    assert_eq!(content_type_for("mystery.bin"), DEFAULT_VIDEO_MIME);
    assert_eq!(content_type_for("no_extension"), "video/mp4");
}
