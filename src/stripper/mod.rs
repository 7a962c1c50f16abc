use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use colored::Colorize;
use error_stack::{IntoReport, Report, ResultExt};
use tokio::process::Command;
use walkdir::WalkDir;

#[derive(Debug)]
pub struct StripperError;

impl fmt::Display for StripperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Stripper error")
    }
}

impl std::error::Error for StripperError {}

pub type StripperResult<T> = error_stack::Result<T, StripperError>;

/// Audio files with this extension get their metadata stripped.
const AUDIO_EXTENSION: &str = ".mp3";
/// Suffix of the temporary output written next to the original.
const TMP_SUFFIX: &str = ".tmp.mp3";

/// The external metadata strip tool.
#[async_trait]
pub trait StripTool: Send + Sync {
    async fn strip(&self, input: &Path, output: &Path) -> StripperResult<()>;
}

/// Strips metadata and embedded images with ffmpeg while copying the audio
/// stream verbatim (no re-encode). ffmpeg's console output is discarded;
/// failures are detected through the exit status.
pub struct FfmpegTool {
    executable: String,
}

impl FfmpegTool {
    pub fn new(executable: String) -> Self {
        Self { executable }
    }
}

#[async_trait]
impl StripTool for FfmpegTool {
    async fn strip(&self, input: &Path, output: &Path) -> StripperResult<()> {
        let status = Command::new(&self.executable)
            .arg("-i")
            .arg(input)
            .args(["-map_metadata", "-1", "-vn", "-c:a", "copy"])
            .arg(output)
            .arg("-y")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .into_report()
            .attach_printable(format!("Failed to launch {}", self.executable))
            .change_context(StripperError)?;
        if !status.success() {
            return Err(Report::new(StripperError)
                .attach_printable(format!("{} exited with {}", self.executable, status)));
        }
        Ok(())
    }
}

/// Per-folder strip counts.
#[derive(Debug, Default, Clone, Copy)]
pub struct StripSummary {
    pub stripped: usize,
    pub failed: usize,
}

/// Walks the folder and strips metadata from every mp3, replacing each
/// original atomically with its stripped copy. A file that fails is left
/// unchanged and the rest of the folder is still processed.
pub async fn strip_folder(tool: &dyn StripTool, folder: &Path) -> StripSummary {
    let mut summary = StripSummary::default();
    // Snapshot the file list up front so freshly written temporaries are
    // never picked up by the walk itself.
    for file in collect_audio_files(folder) {
        let tmp = tmp_path(&file);
        match tool.strip(&file, &tmp).await {
            Ok(()) => match fs::rename(&tmp, &file) {
                Ok(()) => {
                    let shown = file.strip_prefix(folder).unwrap_or(&file);
                    println!("    Stripped metadata: {}", shown.display());
                    summary.stripped += 1;
                }
                Err(err) => {
                    let _ = fs::remove_file(&tmp);
                    println!(
                        "    {} failed to replace {}: {} (left unchanged)",
                        "Warning:".yellow(),
                        file.display(),
                        err
                    );
                    summary.failed += 1;
                }
            },
            Err(report) => {
                if tmp.exists() {
                    let _ = fs::remove_file(&tmp);
                }
                println!(
                    "    {} failed to strip metadata for {} (left unchanged): {}",
                    "Warning:".yellow(),
                    file.display(),
                    report
                );
                summary.failed += 1;
            }
        }
    }
    summary
}

fn collect_audio_files(folder: &Path) -> Vec<PathBuf> {
    WalkDir::new(folder)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| name.to_lowercase().ends_with(AUDIO_EXTENSION))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect()
}

fn tmp_path(file: &Path) -> PathBuf {
    let mut os_string = file.as_os_str().to_os_string();
    os_string.push(TMP_SUFFIX);
    PathBuf::from(os_string)
}
