use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;

use crate::config::ProbeConfig;

/// Reads playback duration from a media container.
///
/// Implementations are total: any failure yields `None`.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Duration in seconds, or `None` if the container does not report a usable one.
    async fn probe_duration(&self, path: &Path) -> Option<f64>;
}

#[derive(Error, Debug)]
enum ProbeError {
    #[error("{0} not found")]
    ToolNotFound(String),

    #[error("ffprobe exited with {0}")]
    ToolFailed(std::process::ExitStatus),

    #[error("ffprobe did not finish within {0:?}")]
    Timeout(Duration),

    #[error("no duration reported")]
    NoDuration,

    #[error("unparseable ffprobe output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Parse the JSON printed by `ffprobe -print_format json -show_format`.
pub fn parse_ffprobe_duration(json: &[u8]) -> Option<f64> {
    duration_from_json(json).ok()
}

fn duration_from_json(json: &[u8]) -> Result<f64, ProbeError> {
    let output: FfprobeOutput = serde_json::from_slice(json)?;
    output
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .and_then(usable)
        .ok_or(ProbeError::NoDuration)
}

fn usable(seconds: f64) -> Option<f64> {
    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

/// Duration probe backed by the `ffprobe` binary, with an in-process MP4/MOV
/// header reader for machines without ffmpeg installed.
pub struct FfprobeProber {
    ffprobe: PathBuf,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            ffprobe: config.ffprobe.clone(),
            timeout: config.timeout,
        }
    }

    async fn run_ffprobe(&self, path: &Path) -> Result<f64, ProbeError> {
        let child = Command::new(&self.ffprobe)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::ToolNotFound(self.ffprobe.display().to_string())
                } else {
                    ProbeError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(ProbeError::ToolFailed(output.status));
        }

        duration_from_json(&output.stdout)
    }
}

#[async_trait]
impl DurationProbe for FfprobeProber {
    async fn probe_duration(&self, path: &Path) -> Option<f64> {
        match self.run_ffprobe(path).await {
            Ok(seconds) => return Some(seconds),
            Err(e) => tracing::debug!("ffprobe on {}: {}", path.display(), e),
        }

        if !is_iso_bmff(path) {
            return None;
        }
        let owned = path.to_path_buf();
        let duration = tokio::task::spawn_blocking(move || mp4_duration(&owned))
            .await
            .ok()
            .flatten();
        if duration.is_none() {
            tracing::debug!("No duration for {}", path.display());
        }
        duration
    }
}

/// MP4 and QuickTime share the ISO base media container layout.
fn is_iso_bmff(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "mp4" | "m4v" | "mov"))
        .unwrap_or(false)
}

/// Read the movie header duration without decoding anything.
pub fn mp4_duration(path: &Path) -> Option<f64> {
    let file = std::fs::File::open(path).ok()?;
    let file_len = file.metadata().ok()?.len();
    let reader = BufReader::new(file);

    let mp4 = mp4::Mp4Reader::read_header(reader, file_len).ok()?;
    let seconds = mp4.duration().as_secs_f64();
    if seconds > 0.0 {
        usable(seconds)
    } else {
        None
    }
}
