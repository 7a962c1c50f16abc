use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use serde_json::{Map, Value};

use crate::config::AppConfig;

/// Locates the spotdl config file. Order:
///   1) explicit path (argument)
///   2) SPOTDL_CONFIG env var
///   3) $XDG_CONFIG_HOME/spotdl/config.json (platform config dir)
///   4) ~/.spotdl/config.json
///   5) %APPDATA%/spotdl/config.json (Windows)
/// No candidate existing is not an error, spotdl runs fine without one.
pub fn locate_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Ok(env_path) = env::var(AppConfig::SPOTDL_CONFIG_ENV) {
        let path = crate::config::expand_home(&env_path);
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("spotdl").join("config.json");
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let path = home.join(".spotdl").join("config.json");
        if path.exists() {
            return Some(path);
        }
    }

    if let Ok(appdata) = env::var("APPDATA") {
        let path = PathBuf::from(appdata).join("spotdl").join("config.json");
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Loads the spotdl config as a JSON map. A missing or unreadable config
/// yields an empty map so the run proceeds with defaults.
pub fn load_config(explicit: Option<&Path>) -> Map<String, Value> {
    let path = match locate_config(explicit) {
        Some(path) => path,
        None => return Map::new(),
    };

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            println!(
                "{} failed to read spotDL config at {}: {}",
                "Warning:".yellow(),
                path.display(),
                err
            );
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => {
            println!("Loaded spotDL config from: {}", path.display());
            map
        }
        Ok(_) | Err(_) => {
            println!(
                "{} failed to parse spotDL config at {}",
                "Warning:".yellow(),
                path.display()
            );
            Map::new()
        }
    }
}

/// ffmpeg executable precedence: spotdl config > --ffmpeg-cmd flag >
/// FFMPEG env var > plain `ffmpeg`.
pub fn resolve_strip_executable(cfg: &Map<String, Value>, override_flag: Option<&str>) -> String {
    if let Some(executable) = cfg.get("ffmpeg").and_then(Value::as_str) {
        if !executable.is_empty() {
            return executable.to_string();
        }
    }
    if let Some(flag) = override_flag {
        if !flag.is_empty() {
            return flag.to_string();
        }
    }
    if let Ok(env_cmd) = env::var(AppConfig::FFMPEG_ENV) {
        if !env_cmd.is_empty() {
            return env_cmd;
        }
    }
    AppConfig::FFMPEG_DEFAULT.to_string()
}

/// Metadata stripping runs by default and can be disabled with --no-strip;
/// a boolean `post_strip` key in the spotdl config has the final word.
pub fn resolve_post_strip(cfg: &Map<String, Value>, no_strip_flag: bool) -> bool {
    let mut post_strip = !no_strip_flag;
    if let Some(Value::Bool(value)) = cfg.get("post_strip") {
        post_strip = *value;
    }
    post_strip
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        fs::write(&path, content).expect("write config");
        path
    }

    #[test]
    fn test_locate_prefers_existing_explicit_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(&dir, "{}");
        assert_eq!(locate_config(Some(&path)), Some(path));
    }

    #[test]
    fn test_locate_skips_missing_explicit_path() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("nope.json");
        // Falls through to the conventional locations, never to the
        // missing path itself.
        assert_ne!(locate_config(Some(&missing)), Some(missing));
    }

    #[test]
    fn test_load_invalid_json_yields_empty_map() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(&dir, "not json at all");
        assert!(load_config(Some(&path)).is_empty());
    }

    #[test]
    fn test_load_non_object_json_yields_empty_map() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(&dir, "[1, 2, 3]");
        assert!(load_config(Some(&path)).is_empty());
    }

    #[test]
    fn test_load_reads_settings() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(&dir, r#"{"ffmpeg": "/opt/ffmpeg", "post_strip": false}"#);
        let cfg = load_config(Some(&path));
        assert_eq!(cfg.get("ffmpeg").and_then(Value::as_str), Some("/opt/ffmpeg"));
        assert_eq!(cfg.get("post_strip").and_then(Value::as_bool), Some(false));
    }

    #[test]
    fn test_strip_executable_config_key_wins() {
        let mut cfg = Map::new();
        cfg.insert("ffmpeg".to_string(), Value::from("/opt/ffmpeg"));
        assert_eq!(resolve_strip_executable(&cfg, Some("/usr/bin/ffmpeg5")), "/opt/ffmpeg");
    }

    #[test]
    fn test_strip_executable_flag_beats_default() {
        let cfg = Map::new();
        assert_eq!(
            resolve_strip_executable(&cfg, Some("/usr/bin/ffmpeg5")),
            "/usr/bin/ffmpeg5"
        );
    }

    #[test]
    fn test_strip_executable_empty_config_value_is_skipped() {
        let mut cfg = Map::new();
        cfg.insert("ffmpeg".to_string(), Value::from(""));
        assert_eq!(resolve_strip_executable(&cfg, Some("custom")), "custom");
    }

    #[test]
    fn test_strip_executable_falls_back_to_plain_ffmpeg() {
        env::remove_var(AppConfig::FFMPEG_ENV);
        assert_eq!(resolve_strip_executable(&Map::new(), None), "ffmpeg");
    }

    #[test]
    fn test_post_strip_defaults_to_enabled() {
        assert!(resolve_post_strip(&Map::new(), false));
    }

    #[test]
    fn test_post_strip_disabled_by_flag() {
        assert!(!resolve_post_strip(&Map::new(), true));
    }

    #[test]
    fn test_post_strip_config_key_disables_without_flag() {
        let mut cfg = Map::new();
        cfg.insert("post_strip".to_string(), Value::Bool(false));
        assert!(!resolve_post_strip(&cfg, false));
    }

    #[test]
    fn test_post_strip_config_key_overrides_flag() {
        let mut cfg = Map::new();
        cfg.insert("post_strip".to_string(), Value::Bool(true));
        assert!(resolve_post_strip(&cfg, true));
    }

    #[test]
    fn test_post_strip_non_bool_config_value_is_ignored() {
        let mut cfg = Map::new();
        cfg.insert("post_strip".to_string(), Value::from("false"));
        assert!(resolve_post_strip(&cfg, false));
    }
}
