use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use error_stack::{IntoReport, Report, ResultExt};
use serde_json::Value;

use crate::config::SyncConfig;
use crate::spotdl::config::{load_config, resolve_post_strip, resolve_strip_executable};
use crate::spotdl::sync::{sync_playlist_into_folder, SpotdlTool, SyncTool};
use crate::spotify::playlist::PlaylistNameResolver;
use crate::stripper::{strip_folder, FfmpegTool, StripTool};
use crate::sync::{SyncError, SyncOutcome, SyncResult};

/// One full pass over the playlists file: resolve each reference to a
/// folder name, sync it into `base_dir/<name>`, then strip metadata when
/// enabled. One bad playlist never aborts the batch.
pub struct SyncBatch {
    config: SyncConfig,
    resolver: PlaylistNameResolver,
    sync_tool: Box<dyn SyncTool>,
    strip_tool: Option<Box<dyn StripTool>>,
}

impl SyncBatch {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            resolver: PlaylistNameResolver::new(),
            sync_tool: Box::new(SpotdlTool),
            strip_tool: None,
        }
    }

    /// Batch with injected collaborators.
    #[cfg(test)]
    fn with_tools(
        config: SyncConfig,
        resolver: PlaylistNameResolver,
        sync_tool: Box<dyn SyncTool>,
        strip_tool: Box<dyn StripTool>,
    ) -> Self {
        Self {
            config,
            resolver,
            sync_tool,
            strip_tool: Some(strip_tool),
        }
    }

    pub async fn run(&self, cancelled: &AtomicBool) -> SyncResult<Vec<SyncOutcome>> {
        let playlists_file = &self.config.playlists_file;
        if !playlists_file.exists() {
            return Err(Report::new(SyncError).attach_printable(format!(
                "Playlists file not found: {}",
                playlists_file.display()
            )));
        }

        let tool_config = load_config(self.config.spotdl_config_path.as_deref());
        let ffmpeg_cmd =
            resolve_strip_executable(&tool_config, self.config.ffmpeg_override.as_deref());
        let post_strip = resolve_post_strip(&tool_config, !self.config.strip_enabled);

        println!(
            "Loaded spotDL config: {}",
            if tool_config.is_empty() {
                "no (using defaults)"
            } else {
                "yes"
            }
        );
        if let Some(output_template) = tool_config.get("output").and_then(Value::as_str) {
            println!("spotdl output template: {}", output_template);
        }
        println!("ffmpeg cmd: {}", ffmpeg_cmd);
        println!(
            "post-processing (strip metadata): {}",
            if post_strip { "yes" } else { "no" }
        );
        println!("base dir: {}", self.config.base_dir.display());
        println!("playlists file: {}", playlists_file.display());
        println!("dry-run: {}", self.config.dry_run);
        println!();

        fs::create_dir_all(&self.config.base_dir)
            .into_report()
            .attach_printable(format!(
                "Failed to create base directory {}",
                self.config.base_dir.display()
            ))
            .change_context(SyncError)?;

        let references = read_references(playlists_file)?;

        let ffmpeg = FfmpegTool::new(ffmpeg_cmd);
        let strip_tool: &dyn StripTool = match &self.strip_tool {
            Some(tool) => tool.as_ref(),
            None => &ffmpeg,
        };

        let mut outcomes = Vec::with_capacity(references.len());
        for reference in &references {
            if cancelled.load(Ordering::SeqCst) {
                println!("\nInterrupted by user. Exiting.");
                return Err(Report::new(SyncError).attach_printable("Interrupted by user"));
            }

            println!("Processing: {}", reference.cyan());
            let playlist_name = self.resolver.resolve(reference).await;
            println!("  Resolved playlist name: {}", playlist_name.clone().green());
            let folder = self.config.base_dir.join(&playlist_name);

            let synced = sync_playlist_into_folder(
                self.sync_tool.as_ref(),
                reference,
                &folder,
                &playlist_name,
                self.config.dry_run,
            )
            .await;
            if let Err(report) = synced {
                println!("  {} spotdl failed for {}: {}", "✗".red(), reference, report);
                outcomes.push(SyncOutcome::SyncFailed);
                continue;
            }

            if post_strip && !self.config.dry_run {
                let summary = strip_folder(strip_tool, &folder).await;
                if summary.stripped > 0 {
                    println!("  Stripped metadata from {} file(s)", summary.stripped);
                }
                if summary.failed > 0 {
                    println!(
                        "  {} {} file(s) could not be stripped",
                        "Warning:".yellow(),
                        summary.failed
                    );
                }
            }

            println!("{} Done: {}\n", "✓".green(), playlist_name.clone().green());
            outcomes.push(SyncOutcome::Synced);
        }

        println!("All done.");
        Ok(outcomes)
    }
}

/// Reads playlist references, one per line, skipping blank lines and `#`
/// comments. Input order is the processing order.
fn read_references(path: &Path) -> SyncResult<Vec<String>> {
    let content = fs::read_to_string(path)
        .into_report()
        .attach_printable(format!("Failed to read playlists file {}", path.display()))
        .change_context(SyncError)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}
