use std::path::Path;

/// Content type used when the extension says nothing useful.
pub const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// Classify a path as a listable movie file, returning its MIME type.
///
/// Only `.mp4`, `.mkv`, `.avi` and `.mov` are listed. Extensions are
/// matched case-insensitively; everything else is a silent `None`.
pub fn classify(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    let mime = match ext.as_str() {
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        _ => return None,
    };

    Some(mime)
}

/// Content type for a streamed file, derived from its extension.
///
/// Covers the listable set plus a few containers a user may still request
/// by name; anything unknown falls back to [`DEFAULT_VIDEO_MIME`].
pub fn content_type_for(file_name: &str) -> &'static str {
    let path = Path::new(file_name);
    if let Some(mime) = classify(path) {
        return mime;
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ts") => "video/mp2t",
        _ => DEFAULT_VIDEO_MIME,
    }
}
