use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reelshelf::config::{CatalogConfig, ProbeConfig};
use reelshelf::media::catalog::{CatalogRecord, CatalogSource, OmdbClient};
use reelshelf::media::library::{scan_directory, ListError, MovieLibrary};
use reelshelf::media::probe::{DurationProbe, FfprobeProber};
use reelshelf::media::title::candidate_title;
use tempfile::TempDir;

/// Catalog that knows every title, except the ones marked as failing.
/// Per-title delays let tests finish lookups out of scan order.
#[derive(Default)]
struct FakeCatalog {
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn lookup(&self, title: &str) -> CatalogRecord {
        if let Some(delay) = self.delays.get(title) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(title) {
            return CatalogRecord::degraded(title);
        }
        CatalogRecord {
            title: format!("{title} (catalog)"),
            overview: format!("Plot of {title}"),
            poster: format!("https://img.example/{title}.jpg"),
            year: "2001".to_string(),
        }
    }
}

/// Reports a fixed duration and records the peak number of concurrent probes.
#[derive(Default)]
struct FakeProber {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl DurationProbe for FakeProber {
    async fn probe_duration(&self, _path: &Path) -> Option<f64> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Some(90.5)
    }
}

fn media_dir(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in files {
        std::fs::write(dir.path().join(name), b"not really a movie").unwrap();
    }
    dir
}

fn library(dir: &Path, catalog: FakeCatalog, prober: Arc<FakeProber>, concurrency: usize) -> MovieLibrary {
    MovieLibrary::new(dir, Arc::new(catalog), prober, concurrency)
}

// ── scan_directory ───────────────────────────────────────────────────────────

#[test]
fn scan_keeps_only_supported_extensions() {
    let dir = media_dir(&["a.mp4", "b.MKV", "c.avi", "d.mov", "e.srt", "f.txt", "g"]);
    let mut files = scan_directory(dir.path()).unwrap();
    files.sort();
    assert_eq!(files, vec!["a.mp4", "b.MKV", "c.avi", "d.mov"]);
}

#[test]
fn scan_is_not_recursive_and_skips_directories() {
    let dir = media_dir(&["top.mp4"]);
    let nested = dir.path().join("Extras.mkv");
    std::fs::create_dir(&nested).unwrap();
    std::fs::write(nested.join("inner.mp4"), b"x").unwrap();

    assert_eq!(scan_directory(dir.path()).unwrap(), vec!["top.mp4"]);
}

#[test]
fn scan_missing_directory_is_unreadable() {
    let err = scan_directory(Path::new("/nonexistent/path/does/not/exist")).unwrap_err();
    assert!(matches!(err, ListError::DirectoryUnreadable { .. }));
}

#[test]
fn scan_of_regular_file_is_unreadable() {
    let dir = media_dir(&["Movie.mp4"]);
    let err = scan_directory(&dir.path().join("Movie.mp4")).unwrap_err();
    assert!(matches!(err, ListError::DirectoryUnreadable { .. }));
}

// ── MovieLibrary::list_movies ────────────────────────────────────────────────

#[tokio::test]
async fn listing_has_one_record_per_supported_file() {
    let dir = media_dir(&["One.2001.mkv", "Two.avi", "readme.txt", "cover.jpg", "Three.mov"]);
    let movies = library(dir.path(), FakeCatalog::default(), Arc::default(), 4)
        .list_movies()
        .await
        .unwrap();

    assert_eq!(movies.len(), 3);
    let files: HashSet<_> = movies.iter().map(|m| m.file.as_str()).collect();
    assert_eq!(files, HashSet::from(["One.2001.mkv", "Two.avi", "Three.mov"]));
}

#[tokio::test]
async fn listing_preserves_scan_order_when_lookups_finish_out_of_order() {
    let names = ["Alpha.mp4", "Bravo.mp4", "Charlie.mp4", "Delta.mp4", "Echo.mp4"];
    let dir = media_dir(&names);
    let scan_order = scan_directory(dir.path()).unwrap();

    // Earlier files in scan order take longer, so completion order is reversed.
    let mut catalog = FakeCatalog::default();
    for (i, file) in scan_order.iter().enumerate() {
        let delay = Duration::from_millis(40 * (scan_order.len() - i) as u64);
        catalog.delays.insert(candidate_title(file), delay);
    }

    let movies = library(dir.path(), catalog, Arc::default(), 8)
        .list_movies()
        .await
        .unwrap();

    let listed: Vec<_> = movies.iter().map(|m| m.file.clone()).collect();
    assert_eq!(listed, scan_order);
}

#[tokio::test]
async fn enrichment_concurrency_is_bounded() {
    let names: Vec<String> = (0..6).map(|i| format!("Movie{i}.mkv")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let dir = media_dir(&refs);
    let prober = Arc::new(FakeProber::default());

    let movies = library(dir.path(), FakeCatalog::default(), Arc::clone(&prober), 2)
        .list_movies()
        .await
        .unwrap();

    assert_eq!(movies.len(), 6);
    assert!(prober.peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn one_failed_lookup_only_degrades_that_record() {
    let dir = media_dir(&["Heat.1995.mkv", "Ronin.1998.mp4", "Collateral.2004.avi"]);
    let catalog = FakeCatalog {
        failing: HashSet::from(["Ronin".to_string()]),
        ..Default::default()
    };

    let movies = library(dir.path(), catalog, Arc::default(), 4)
        .list_movies()
        .await
        .unwrap();
    assert_eq!(movies.len(), 3);

    for movie in &movies {
        if movie.file == "Ronin.1998.mp4" {
            assert_eq!(movie.title, "Ronin");
            assert_eq!(movie.overview, "");
            assert_eq!(movie.poster, "");
            assert_eq!(movie.year, "");
        } else {
            assert!(movie.title.ends_with("(catalog)"), "{:?} lost its catalog data", movie.file);
            assert_eq!(movie.year, "2001");
        }
        assert_eq!(movie.duration, Some(90.5));
    }
}

#[tokio::test]
async fn without_api_key_titles_come_from_filenames() {
    let dir = media_dir(&["The.Matrix.1999.1080p.BluRay.x264.mkv", "randomfile.mp4", "720p.mov"]);
    let catalog = OmdbClient::new(&CatalogConfig {
        api_key: None,
        base_url: "http://127.0.0.1:9/".to_string(),
        timeout: Duration::from_secs(1),
    });
    let prober = FfprobeProber::new(&ProbeConfig {
        ffprobe: PathBuf::from("/nonexistent/bin/ffprobe"),
        timeout: Duration::from_secs(1),
    });

    let movies = MovieLibrary::new(dir.path(), Arc::new(catalog), Arc::new(prober), 4)
        .list_movies()
        .await
        .unwrap();

    assert_eq!(movies.len(), 3);
    for movie in &movies {
        assert_eq!(movie.title, candidate_title(&movie.file));
        assert_eq!(movie.overview, "");
        assert_eq!(movie.poster, "");
        assert_eq!(movie.year, "");
        assert_eq!(movie.duration, None);
    }
    let matrix = movies.iter().find(|m| m.file.starts_with("The.Matrix")).unwrap();
    assert_eq!(matrix.title, "The Matrix");
    let tags_only = movies.iter().find(|m| m.file == "720p.mov").unwrap();
    assert_eq!(tags_only.title, "720p.mov");
}

#[tokio::test]
async fn listing_missing_directory_fails() {
    let result = library(Path::new("/nonexistent/movies"), FakeCatalog::default(), Arc::default(), 4)
        .list_movies()
        .await;
    assert!(matches!(result, Err(ListError::DirectoryUnreadable { .. })));
}

#[test]
fn record_serializes_with_null_duration() {
    let record = reelshelf::media::library::MovieRecord {
        file: "a.mkv".into(),
        title: "A".into(),
        overview: String::new(),
        poster: String::new(),
        year: String::new(),
        duration: None,
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "file": "a.mkv", "title": "A", "overview": "", "poster": "", "year": "", "duration": null
        })
    );
}
