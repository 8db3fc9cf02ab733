use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::cli::Cli;
use crate::extract::GeminiConfig;

/// Runtime configuration: environment first, CLI flags on top.
#[derive(Clone, Debug)]
pub struct Config {
    /// Extraction API key; extraction is disabled without one.
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
    pub request_timeout: Duration,
    /// Largest document accepted, in bytes.
    pub max_document_bytes: u64,
    pub use_cache: bool,
    pub cache_dir: PathBuf,
    pub log_file: PathBuf,
    /// Time limit override applied at setup, in seconds.
    pub time_limit_override: Option<u64>,
    pub export_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let (cache_dir, data_dir) = match ProjectDirs::from("", "", "examdesk") {
            Some(dirs) => (dirs.cache_dir().to_path_buf(), dirs.data_dir().to_path_buf()),
            None => {
                let fallback = std::env::temp_dir().join("examdesk");
                (fallback.join("cache"), fallback)
            }
        };
        Self {
            api_key: None,
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-pro-preview".to_string(),
            request_timeout: Duration::from_secs(300),
            max_document_bytes: 25 * 1024 * 1024,
            use_cache: true,
            cache_dir: cache_dir.join("extractions"),
            log_file: data_dir.join("examdesk.log"),
            time_limit_override: None,
            export_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let api_key = ["EXAMDESK_API_KEY", "GEMINI_API_KEY", "API_KEY"]
            .iter()
            .filter_map(|k| get(*k))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty());
        Self {
            api_key,
            api_base_url: get("EXAMDESK_BASE_URL").unwrap_or(default.api_base_url),
            model: get("EXAMDESK_MODEL").unwrap_or(default.model),
            request_timeout: get("EXAMDESK_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.request_timeout),
            max_document_bytes: get("EXAMDESK_MAX_PDF_MB")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|mb| *mb > 0)
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(default.max_document_bytes),
            ..default
        }
    }

    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if cli.no_cache {
            self.use_cache = false;
        }
        if let Some(minutes) = cli.minutes {
            self.time_limit_override = Some(minutes * 60);
        }
        if let Some(ref path) = cli.export {
            self.export_path = Some(PathBuf::from(path));
        }
        if let Some(ref path) = cli.log_file {
            self.log_file = PathBuf::from(path);
        }
        self
    }

    pub fn gemini(&self) -> Option<GeminiConfig> {
        self.api_key.as_ref().map(|key| GeminiConfig {
            api_key: key.clone(),
            base_url: self.api_base_url.clone(),
            model: self.model.clone(),
            timeout: self.request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_lookup(lookup(&[]));
        assert!(config.api_key.is_none());
        assert!(config.gemini().is_none());
        assert_eq!(config.max_document_bytes, 25 * 1024 * 1024);
        assert!(config.use_cache);
    }

    #[test]
    fn test_api_key_fallback_order() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "g"), ("API_KEY", "a")]));
        assert_eq!(config.api_key.as_deref(), Some("g"));

        let config = Config::from_lookup(lookup(&[("EXAMDESK_API_KEY", "  "), ("API_KEY", "a")]));
        assert_eq!(config.api_key.as_deref(), Some("a"));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("EXAMDESK_MODEL", "gemini-test"),
            ("EXAMDESK_MAX_PDF_MB", "5"),
            ("EXAMDESK_TIMEOUT_SECS", "30"),
            ("EXAMDESK_API_KEY", "k"),
        ]));
        assert_eq!(config.max_document_bytes, 5 * 1024 * 1024);
        let gemini = config.gemini().unwrap();
        assert_eq!(gemini.model, "gemini-test");
        assert_eq!(gemini.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli {
            minutes: Some(20),
            no_cache: true,
            export: Some("report.yaml".to_string()),
            ..Default::default()
        };
        let config = Config::from_lookup(lookup(&[])).apply_cli(&cli);
        assert_eq!(config.time_limit_override, Some(1200));
        assert!(!config.use_cache);
        assert_eq!(config.export_path, Some(PathBuf::from("report.yaml")));
    }
}
