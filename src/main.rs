use std::sync::Arc;

use clap::Parser;

use reelshelf::http::{self, state::AppState};
use reelshelf::media::catalog::{CachedCatalog, CatalogSource, OmdbClient};
use reelshelf::media::library::MovieLibrary;
use reelshelf::media::probe::FfprobeProber;
use reelshelf::media::stream::MediaRoot;
use reelshelf::{cli, config};

/// Resolve on the first Ctrl+C (graceful shutdown); a second Ctrl+C while
/// in-flight streams drain force-exits.
async fn wait_for_shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down -- waiting for open streams...");
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nreelshelf: forced exit");
            std::process::exit(1);
        }
    });
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Some(path) = cli::load_env_file(None) {
        tracing::debug!("Loaded environment from {}", path.display());
    }
    let args = cli::Args::parse();

    let file_config = config::find_config_file(args.config.as_deref()).and_then(|path| {
        match config::load_config(&path) {
            Ok(cfg) => {
                tracing::debug!("Loaded config from {}", path.display());
                Some(cfg)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file: {}", e);
                None
            }
        }
    });

    let config = config::Config::resolve(file_config, &args).unwrap_or_else(|e| fail(e));

    if !config.media_dir.is_dir() {
        fail(format_args!(
            "not an existing directory: {}",
            config.media_dir.display()
        ));
    }
    let media = MediaRoot::new(&config.media_dir).unwrap_or_else(|e| {
        fail(format_args!("cannot open {}: {}", config.media_dir.display(), e))
    });

    let omdb = OmdbClient::new(&config.catalog);
    if !omdb.is_enabled() {
        tracing::warn!("No OMDb API key configured -- titles will come from filenames only");
    }
    let catalog: Arc<dyn CatalogSource> = if config.cache_metadata {
        Arc::new(CachedCatalog::new(omdb))
    } else {
        Arc::new(omdb)
    };
    let prober = Arc::new(FfprobeProber::new(&config.probe));

    let library = MovieLibrary::new(
        media.path().to_path_buf(),
        catalog,
        prober,
        config.concurrency,
    );

    tracing::info!(
        "reelshelf {} serving {} (concurrency {})",
        env!("GIT_VERSION"),
        media.path().display(),
        config.concurrency
    );

    let state = AppState {
        library: Arc::new(library),
        media: Arc::new(media),
    };
    let app = http::build_router(state);

    let addr = if config.localhost {
        format!("127.0.0.1:{}", config.port)
    } else {
        format!("0.0.0.0:{}", config.port)
    };
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| fail(format_args!("failed to bind {}: {}", addr, e)));
    tracing::info!("Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
    {
        tracing::error!("HTTP server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Goodbye.");
}
