use std::fs;
use std::path::Path;

use async_trait::async_trait;
use colored::Colorize;
use error_stack::{IntoReport, Report, ResultExt};
use tokio::process::Command;
use url::Url;

use crate::config::AppConfig;
use crate::spotdl::{SpotdlError, SpotdlResult};

/// The external playlist sync tool.
#[async_trait]
pub trait SyncTool: Send + Sync {
    async fn run(&self, playlist_url: &str, save_file: &str, folder: &Path) -> SpotdlResult<()>;
}

/// Runs the real spotdl executable with the playlist folder as the child's
/// working directory, so spotdl's own output template lands inside it.
pub struct SpotdlTool;

#[async_trait]
impl SyncTool for SpotdlTool {
    async fn run(&self, playlist_url: &str, save_file: &str, folder: &Path) -> SpotdlResult<()> {
        let status = Command::new(AppConfig::SPOTDL_EXECUTABLE)
            .arg("sync")
            .arg(playlist_url)
            .arg("--save-file")
            .arg(save_file)
            .current_dir(folder)
            .status()
            .await
            .into_report()
            .attach_printable(format!(
                "Failed to launch {}. Is it installed and on PATH?",
                AppConfig::SPOTDL_EXECUTABLE
            ))
            .change_context(SpotdlError)?;
        if !status.success() {
            return Err(Report::new(SpotdlError).attach_printable(format!(
                "{} exited with {} for {}",
                AppConfig::SPOTDL_EXECUTABLE,
                status,
                playlist_url
            )));
        }
        Ok(())
    }
}

/// Drops any query suffix so the tool receives the canonical reference
/// without tracking parameters. Non-URL references pass through verbatim.
pub fn canonical_reference(reference: &str) -> String {
    match Url::parse(reference) {
        Ok(mut url) => {
            url.set_query(None);
            url.to_string()
        }
        Err(_) => reference.to_string(),
    }
}

/// Appends the save-file suffix when not already present.
pub fn save_file_name(playlist_name: &str) -> String {
    if playlist_name.ends_with(AppConfig::SAVE_FILE_SUFFIX) {
        playlist_name.to_string()
    } else {
        format!("{}{}", playlist_name, AppConfig::SAVE_FILE_SUFFIX)
    }
}

/// Creates the playlist folder (idempotent) and runs the sync tool inside
/// it. A dry run only reports the command and touches nothing.
pub async fn sync_playlist_into_folder(
    tool: &dyn SyncTool,
    reference: &str,
    folder: &Path,
    playlist_name: &str,
    dry_run: bool,
) -> SpotdlResult<()> {
    let clean_url = canonical_reference(reference);
    let save_file = save_file_name(playlist_name);

    println!(
        "  Running in {}: {} sync {} --save-file {}",
        folder.display(),
        AppConfig::SPOTDL_EXECUTABLE,
        clean_url,
        save_file
    );
    if dry_run {
        println!("  {} skipping actual spotdl call", "(dry-run)".yellow());
        return Ok(());
    }

    fs::create_dir_all(folder)
        .into_report()
        .attach_printable(format!("Failed to create folder {}", folder.display()))
        .change_context(SpotdlError)?;

    tool.run(&clean_url, &save_file, folder).await
}
