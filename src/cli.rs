use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "reelshelf",
    about = "Browse and stream a folder of movies over HTTP",
    long_about = None,
    version = env!("GIT_VERSION"),
)]
pub struct Args {
    /// Directory containing the movie files to list and stream
    #[arg(env = "REELSHELF_MEDIA_DIR")]
    pub media_dir: Option<PathBuf>,

    /// HTTP port to listen on [default: 4000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to TOML config file (overrides default search: ./reelshelf.toml, ~/.config/reelshelf/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bind to localhost only (127.0.0.1) instead of all interfaces (0.0.0.0)
    #[arg(long)]
    pub localhost: bool,

    /// OMDb API key; without one, titles are derived from filenames only
    #[arg(long, env = "OMDB_API_KEY", hide_env_values = true)]
    pub omdb_api_key: Option<String>,

    /// Maximum number of files enriched concurrently per listing [default: 8]
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}

/// Load `KEY=value` lines from a `.env` file into the process environment so
/// the `env =` arguments above can see them. Variables already set win.
///
/// With no explicit path, `.env` is searched for from the current directory
/// upwards. Returns the file that was loaded, if any.
/// A missing file is not an error; a malformed one is logged and skipped.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => Some(path),
        Err(dotenvy::Error::Io(_)) => None,
        Err(e) => {
            tracing::warn!("Ignoring malformed .env file: {}", e);
            None
        }
    }
}
