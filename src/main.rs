use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use error_stack::fmt::{Charset, ColorMode};
use error_stack::{Report, ResultExt};

use crate::config::SyncConfig;
use crate::sync::commands::SyncBatch;

mod config;
mod spotdl;
mod spotify;
mod stripper;
mod sync;

#[derive(Debug)]
pub struct SpotdlSyncError;
impl fmt::Display for SpotdlSyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Spotdl sync error")
    }
}
impl std::error::Error for SpotdlSyncError {}

pub type SpotdlSyncResult<T> = error_stack::Result<T, SpotdlSyncError>;

/// Sync Spotify playlists to per-playlist folders using spotdl.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Sync Spotify playlists to per-playlist folders using spotdl"
)]
struct Cli {
    /// File with playlist URLs/IDs (one per line)
    #[clap(long, short, default_value = "playlists.txt")]
    playlists: String,

    /// Base directory to save playlists
    #[clap(long, short, default_value = "~/Music/Spotify")]
    base_dir: String,

    /// Explicit spotdl config.json path (optional)
    #[clap(long, short)]
    config: Option<String>,

    /// Do NOT run ffmpeg metadata stripping after download
    #[clap(long, action)]
    no_strip: bool,

    /// Show what would be done, but don't call spotdl or ffmpeg
    #[clap(long, action)]
    dry_run: bool,

    /// Override ffmpeg executable (optional)
    #[clap(long)]
    ffmpeg_cmd: Option<String>,
}

impl Cli {
    fn into_sync_config(self) -> SyncConfig {
        SyncConfig {
            playlists_file: config::expand_home(&self.playlists),
            base_dir: config::expand_home(&self.base_dir),
            spotdl_config_path: self.config.as_deref().map(config::expand_home),
            strip_enabled: !self.no_strip,
            dry_run: self.dry_run,
            ffmpeg_override: self.ffmpeg_cmd,
        }
    }
}

async fn run() -> SpotdlSyncResult<()> {
    let cli = Cli::parse();

    Report::set_charset(Charset::Utf8);
    Report::set_color_mode(ColorMode::Color);
    dotenv().ok();

    // The flag is set by the watcher and only consulted between playlist
    // iterations; a signal that lands while spotdl runs also reaches the
    // child, whose failure is handled like any other item failure first.
    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = Arc::clone(&cancelled);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancelled.store(true, Ordering::SeqCst);
            }
        });
    }

    let batch = SyncBatch::new(cli.into_sync_config());
    batch
        .run(&cancelled)
        .await
        .change_context(SpotdlSyncError)?;

    Ok(())
}

#[tokio::main]
async fn main() -> SpotdlSyncResult<()> {
    run().await
}
