use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const BACKEND_URL_ENV: &str = "VOXACCESS_BACKEND_URL";

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.into()
}

fn default_timeout() -> u64 {
    120
}

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Origin of the processing service; relative audio links resolve against it.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Where exports are saved. `None` means the user's download directory.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            export_dir: None,
            request_timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    /// Directory: ~/.config/voxaccess/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("voxaccess");
        p
    }

    /// ~/.config/voxaccess/config.json
    pub fn file_path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if the file doesn't exist or is invalid.
    /// `VOXACCESS_BACKEND_URL` overrides the stored backend.
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::file_path());
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                log::info!("Backend overridden by {BACKEND_URL_ENV}: {url}");
                config.backend_url = url;
            }
        }
        config
    }

    /// The stored file alone, without the environment override.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => Self::from_json(&data),
            Err(_) => Self::default(),
        }
    }

    fn from_json(data: &str) -> Self {
        serde_json::from_str(data).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid config: {e}");
            Self::default()
        })
    }

    /// Persist to the default location and return where it went.
    pub fn save(&self) -> io::Result<PathBuf> {
        let path = Self::file_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }

    /// Export directory, falling back to Downloads and then the working directory.
    pub fn resolved_export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_json(r#"{"backend_url":"http://ocr.local:9000"}"#);
        assert_eq!(config.backend_url, "http://ocr.local:9000");
        assert_eq!(config.request_timeout_secs, 120);
        assert!(config.export_dir.is_none());
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        assert_eq!(Config::from_json("not json"), Config::default());
        assert_eq!(Config::default().backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxaccess").join("config.json");
        let config = Config {
            backend_url: "http://ocr.local:9000".into(),
            export_dir: Some(PathBuf::from("/srv/exports")),
            request_timeout_secs: 30,
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_from(&dir.path().join("absent.json")), Config::default());
    }

    #[test]
    fn explicit_export_dir_wins() {
        let config = Config {
            export_dir: Some(PathBuf::from("/tmp/exports")),
            ..Config::default()
        };
        assert_eq!(config.resolved_export_dir(), PathBuf::from("/tmp/exports"));
    }
}
