use std::path::PathBuf;

/// `AppConfig` holds static configuration values for the application,
/// such as the environment variables and external executables it consults.
pub struct AppConfig;

impl AppConfig {
    /// Environment variable pointing at an explicit spotdl config.json.
    pub const SPOTDL_CONFIG_ENV: &'static str = "SPOTDL_CONFIG";
    /// Client id for the Spotify Web API client-credentials flow.
    pub const SPOTIFY_CLIENT_ID_ENV: &'static str = "SPOTIPY_CLIENT_ID";
    /// Client secret for the Spotify Web API client-credentials flow.
    pub const SPOTIFY_CLIENT_SECRET_ENV: &'static str = "SPOTIPY_CLIENT_SECRET";
    /// Environment override for the ffmpeg executable.
    pub const FFMPEG_ENV: &'static str = "FFMPEG";
    /// Default ffmpeg executable name.
    pub const FFMPEG_DEFAULT: &'static str = "ffmpeg";
    /// The spotdl executable name.
    pub const SPOTDL_EXECUTABLE: &'static str = "spotdl";
    /// Suffix spotdl save files carry.
    pub const SAVE_FILE_SUFFIX: &'static str = ".spotdl";
}

/// Operating parameters for one sync run, resolved from the command line
/// once at startup.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub playlists_file: PathBuf,
    pub base_dir: PathBuf,
    pub spotdl_config_path: Option<PathBuf>,
    pub strip_enabled: bool,
    pub dry_run: bool,
    pub ffmpeg_override: Option<String>,
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
