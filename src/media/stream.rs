use std::path::{Component, Path, PathBuf};

use crate::media::mime::content_type_for;

/// A streamable file inside the media root.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    /// Canonical absolute path; always under the media root.
    pub path: PathBuf,
    pub file_size: u64,
    pub mime: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid file name")]
    InvalidName,
    #[error("path escapes the media directory")]
    OutsideRoot,
    #[error("not a regular file")]
    NotAFile,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The directory streamed files are served from.
#[derive(Debug, Clone)]
pub struct MediaRoot {
    root: PathBuf,
}

impl MediaRoot {
    /// Canonicalize `dir` once; fails if it does not exist.
    pub fn new(dir: &Path) -> std::io::Result<Self> {
        Ok(Self {
            root: std::fs::canonicalize(dir)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Map a listing filename to a file under the root.
    ///
    /// `file` must be a single plain path component. The joined path is
    /// canonicalized so a symlink pointing outside the root is refused
    /// the same way `../` would be.
    pub async fn resolve(&self, file: &str) -> Result<ResolvedFile, ResolveError> {
        if !is_plain_file_name(file) {
            return Err(ResolveError::InvalidName);
        }

        let canonical = tokio::fs::canonicalize(self.root.join(file)).await?;
        if !canonical.starts_with(&self.root) {
            return Err(ResolveError::OutsideRoot);
        }

        let meta = tokio::fs::metadata(&canonical).await?;
        if !meta.is_file() {
            return Err(ResolveError::NotAFile);
        }

        Ok(ResolvedFile {
            path: canonical,
            file_size: meta.len(),
            mime: content_type_for(file),
        })
    }
}

fn is_plain_file_name(file: &str) -> bool {
    if file.is_empty() || file.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(file).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
