use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use http_range_header::parse_range_header;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::media::stream::ResolvedFile;

/// Headers shared by every successful stream response (GET + HEAD):
/// Content-Type, Content-Length of the whole file, Accept-Ranges.
fn stream_headers(file: &ResolvedFile) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(file.mime));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(file.file_size));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers
}

/// 416 with the `bytes */<size>` form of Content-Range.
fn range_not_satisfiable(file_size: u64) -> Response {
    (
        StatusCode::RANGE_NOT_SATISFIABLE,
        [
            (header::CONTENT_RANGE, format!("bytes */{}", file_size)),
            (header::ACCEPT_RANGES, "bytes".to_string()),
        ],
    )
        .into_response()
}

async fn open(file: &ResolvedFile) -> Result<tokio::fs::File, ApiError> {
    tokio::fs::File::open(&file.path).await.map_err(|e| {
        tracing::warn!("Failed to open {}: {}", file.path.display(), e);
        ApiError::NotFound
    })
}

/// HEAD /api/stream/{file}: headers of a full GET, no body. The file is not opened.
pub async fn serve_stream_head(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let resolved = state.media.resolve(&file).await?;
    Ok((StatusCode::OK, stream_headers(&resolved)).into_response())
}

/// GET /api/stream/{file}: the whole file, or one byte span per the Range header.
///
/// Range policy is strict: a header that is not ASCII, is not valid
/// `bytes=` syntax, or cannot be satisfied by the file size gets 416.
pub async fn serve_stream_get(
    State(state): State<AppState>,
    Path(file): Path<String>,
    req_headers: HeaderMap,
) -> Result<Response, ApiError> {
    let resolved = state.media.resolve(&file).await?;
    let headers = stream_headers(&resolved);

    if let Some(range_val) = req_headers.get(header::RANGE) {
        let Ok(range_str) = range_val.to_str() else {
            return Ok(range_not_satisfiable(resolved.file_size));
        };
        return range_response(&resolved, range_str, headers).await;
    }

    let file = open(&resolved).await?;
    // Dropping the body (client gone) drops the stream and closes the file.
    let body = Body::from_stream(ReaderStream::new(file));
    Ok((StatusCode::OK, headers, body).into_response())
}

/// `bytes=-N` with `N` at least the file size selects the whole file
/// (RFC 9110 §14.1.2). `bytes=-0` is not covered and stays unsatisfiable.
fn is_oversized_suffix(range_str: &str, file_size: u64) -> bool {
    range_str
        .trim()
        .strip_prefix("bytes=")
        .and_then(|spec| spec.trim().strip_prefix('-'))
        .and_then(|len| len.trim().parse::<u64>().ok())
        .is_some_and(|len| len > 0 && len >= file_size)
}

/// Serve the first range of a Range request as 206, or 416 if it cannot be satisfied.
async fn range_response(
    resolved: &ResolvedFile,
    range_str: &str,
    mut headers: HeaderMap,
) -> Result<Response, ApiError> {
    // Nothing in an empty file can be addressed.
    if resolved.file_size == 0 {
        return Ok(range_not_satisfiable(0));
    }

    let first = if is_oversized_suffix(range_str, resolved.file_size) {
        Some(0..=resolved.file_size - 1)
    } else {
        parse_range_header(range_str)
            .ok()
            .and_then(|parsed| parsed.validate(resolved.file_size).ok())
            .and_then(|ranges| ranges.into_iter().next())
    };
    let Some(first) = first else {
        tracing::debug!("Unsatisfiable range {:?} for {}", range_str, resolved.path.display());
        return Ok(range_not_satisfiable(resolved.file_size));
    };

    let start = *first.start();
    let end = (*first.end()).min(resolved.file_size - 1);
    if start > end {
        return Ok(range_not_satisfiable(resolved.file_size));
    }
    let length = end - start + 1;

    let mut file = open(resolved).await?;
    if let Err(e) = file.seek(std::io::SeekFrom::Start(start)).await {
        tracing::error!("Failed to seek in {}: {}", resolved.path.display(), e);
        return Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response());
    }

    let content_range = format!("bytes {}-{}/{}", start, end, resolved.file_size);
    headers.insert(
        header::CONTENT_RANGE,
        HeaderValue::from_str(&content_range).unwrap_or_else(|_| HeaderValue::from_static("bytes */0")),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));

    let body = Body::from_stream(ReaderStream::new(file.take(length)));
    Ok((StatusCode::PARTIAL_CONTENT, headers, body).into_response())
}
