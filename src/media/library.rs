use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use walkdir::WalkDir;

use crate::media::catalog::CatalogSource;
use crate::media::mime::classify;
use crate::media::probe::DurationProbe;
use crate::media::title::candidate_title;

/// One movie in a listing response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    /// Filename exactly as found on disk; the streaming identifier.
    pub file: String,
    pub title: String,
    pub overview: String,
    pub poster: String,
    pub year: String,
    /// Seconds, or null when the container could not be probed.
    pub duration: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("media directory {} is unreadable: {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// List the movie files directly inside `dir`, in filesystem order.
///
/// Symlinks are followed. Entries that cannot be read, are not regular
/// files, have an unsupported extension, or whose names are not UTF-8 are
/// left out. Only a failure to open `dir` itself, or `dir` not being a
/// directory, is an error.
pub fn scan_directory(dir: &Path) -> Result<Vec<String>, ListError> {
    let unreadable = |source| ListError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };
    let meta = std::fs::metadata(dir).map_err(unreadable)?;
    if !meta.is_dir() {
        return Err(unreadable(std::io::Error::other("not a directory")));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory loop"));
                return Err(ListError::DirectoryUnreadable {
                    path: dir.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                tracing::warn!("Cannot access entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || classify(entry.path()).is_none() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => files.push(name.to_string()),
            None => tracing::warn!(
                "Skipping {} -- filename is not valid UTF-8",
                entry.path().display()
            ),
        }
    }

    Ok(files)
}

/// Build the record for one file: catalog lookup and duration probe run
/// side by side, and neither can fail the record.
pub async fn enrich(
    file: String,
    dir: &Path,
    catalog: &dyn CatalogSource,
    prober: &dyn DurationProbe,
) -> MovieRecord {
    let candidate = candidate_title(&file);
    let path = dir.join(&file);

    let (meta, duration) = tokio::join!(catalog.lookup(&candidate), prober.probe_duration(&path));

    let title = if meta.title.trim().is_empty() {
        candidate
    } else {
        meta.title
    };

    MovieRecord {
        file,
        title,
        overview: meta.overview,
        poster: meta.poster,
        year: meta.year,
        duration,
    }
}

/// The movie listing: directory scan plus per-file enrichment.
///
/// Nothing is cached between calls here; every listing rescans the
/// directory. Catalog caching, if any, lives in the [`CatalogSource`].
pub struct MovieLibrary {
    media_dir: PathBuf,
    catalog: Arc<dyn CatalogSource>,
    prober: Arc<dyn DurationProbe>,
    concurrency: usize,
}

impl MovieLibrary {
    pub fn new(
        media_dir: impl Into<PathBuf>,
        catalog: Arc<dyn CatalogSource>,
        prober: Arc<dyn DurationProbe>,
        concurrency: usize,
    ) -> Self {
        Self {
            media_dir: media_dir.into(),
            catalog,
            prober,
            concurrency: concurrency.max(1),
        }
    }

    /// Scan and enrich. Output order is scan order, whatever order the
    /// enrichments finish in; at most `concurrency` files are in flight.
    pub async fn list_movies(&self) -> Result<Vec<MovieRecord>, ListError> {
        let start = Instant::now();

        let dir = self.media_dir.clone();
        let files = tokio::task::spawn_blocking(move || scan_directory(&dir))
            .await
            .unwrap_or_else(|e| {
                Err(ListError::DirectoryUnreadable {
                    path: self.media_dir.clone(),
                    source: std::io::Error::other(e),
                })
            })?;

        let catalog = self.catalog.as_ref();
        let prober = self.prober.as_ref();
        let dir = self.media_dir.as_path();

        // `buffered` keeps results in input order while running up to
        // `concurrency` futures at once.
        let movies: Vec<MovieRecord> = stream::iter(files)
            .map(|file| enrich(file, dir, catalog, prober))
            .buffered(self.concurrency)
            .collect()
            .await;

        let unmatched = movies
            .iter()
            .filter(|m| m.overview.is_empty() && m.year.is_empty())
            .count();
        tracing::info!(
            "Listed {} movies ({} without catalog data) in {:.1}s",
            movies.len(),
            unmatched,
            start.elapsed().as_secs_f64()
        );

        Ok(movies)
    }
}
