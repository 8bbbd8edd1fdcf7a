//! Configuration loading for voxcalc.
//!
//! `~/.voxcalc/config.toml` is deserialized into raw structs whose fields are
//! all optional, then resolved into [`ResolvedConfig`] at the load boundary.
//! Nothing past this crate sees an `Option` that only means "not configured".

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;
use voxcalc_types::{ApiKey, Theme};

pub use voxcalc_providers::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

/// Consulted when the config file leaves `solver.api_key` empty.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const CONFIG_DIR: &str = ".voxcalc";

#[derive(Debug, Default, Deserialize)]
pub struct VoxcalcConfig {
    pub app: Option<AppConfig>,
    pub solver: Option<SolverConfig>,
    pub history: Option<HistoryConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    pub theme: Option<String>,
    pub narrate: Option<bool>,
    /// `false` reports speech recognition as unavailable.
    pub voice: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SolverConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryConfig {
    pub path: Option<String>,
    pub export_dir: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Replace `${VAR}` references with environment values. Missing variables
/// expand to the empty string; an unclosed `${` is kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(end_rel) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + end_rel];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + end_rel + 1..];
    }

    out.push_str(rest);
    out
}

/// Expand `${VAR}` and a leading `~/`.
fn expand_path(raw: &str, home: &Path) -> PathBuf {
    let expanded = expand_env_vars(raw);
    match expanded.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(expanded),
    }
}

impl VoxcalcConfig {
    /// Read `~/.voxcalc/config.toml`. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join("config.toml"))
}

/// Remote solver settings.
///
/// `api_key` stays optional: a missing key is a runtime condition the solver
/// reports as a missing credential, not a configuration error.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySettings {
    pub path: PathBuf,
    pub export_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub theme: Theme,
    pub narrate: bool,
    pub voice: bool,
    pub solver: SolverSettings,
    pub history: HistorySettings,
}

impl ResolvedConfig {
    /// Load and resolve the user's config. Read and parse failures are
    /// logged and defaults are used.
    #[must_use]
    pub fn load() -> Self {
        let raw = match VoxcalcConfig::load() {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(path = %err.path().display(), "{err}; using defaults");
                None
            }
        };
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::resolve(raw.unwrap_or_default(), env::var(API_KEY_ENV).ok(), &home)
    }

    /// Resolve raw config. `env_key` fills an empty or absent `api_key`.
    #[must_use]
    pub fn resolve(raw: VoxcalcConfig, env_key: Option<String>, home: &Path) -> Self {
        let app = raw.app.unwrap_or_default();
        let solver = raw.solver.unwrap_or_default();
        let history = raw.history.unwrap_or_default();

        let theme = match app.theme.as_deref() {
            None => Theme::default(),
            Some(name) => Theme::parse(name).unwrap_or_else(|| {
                tracing::warn!(theme = name, "unknown theme; using default");
                Theme::default()
            }),
        };

        let api_key = solver
            .api_key
            .as_deref()
            .map(expand_env_vars)
            .and_then(ApiKey::new)
            .or_else(|| env_key.and_then(ApiKey::new));

        let model = solver
            .model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = solver
            .base_url
            .map(|url| expand_env_vars(&url).trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = Duration::from_secs(
            solver
                .timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        let data_dir = home.join(CONFIG_DIR);
        let history = HistorySettings {
            path: history
                .path
                .map_or_else(|| data_dir.join("history.json"), |p| expand_path(&p, home)),
            export_dir: history
                .export_dir
                .map_or_else(|| data_dir.join("exports"), |p| expand_path(&p, home)),
        };

        Self {
            theme,
            narrate: app.narrate.unwrap_or(true),
            voice: app.voice.unwrap_or(true),
            solver: SolverSettings {
                api_key,
                model,
                base_url,
                timeout,
            },
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxcalc_providers::gemini;

    fn home() -> PathBuf {
        PathBuf::from("/home/tester")
    }

    #[test]
    fn expand_env_vars_no_vars() {
        assert_eq!(expand_env_vars("hello world"), "hello world");
    }

    #[test]
    fn expand_env_vars_single_var() {
        unsafe {
            std::env::set_var("VOXCALC_TEST_SINGLE", "replaced");
        }
        assert_eq!(
            expand_env_vars("prefix ${VOXCALC_TEST_SINGLE} suffix"),
            "prefix replaced suffix"
        );
        unsafe {
            std::env::remove_var("VOXCALC_TEST_SINGLE");
        }
    }

    #[test]
    fn expand_env_vars_missing_var_becomes_empty() {
        assert_eq!(
            expand_env_vars("before ${VOXCALC_TEST_MISSING_VAR} after"),
            "before  after"
        );
    }

    #[test]
    fn expand_env_vars_unclosed_brace_preserved() {
        assert_eq!(expand_env_vars("test ${UNCLOSED"), "test ${UNCLOSED");
    }

    #[test]
    fn expand_env_vars_empty_var_name_removed() {
        assert_eq!(expand_env_vars("test ${} more"), "test  more");
    }

    #[test]
    fn resolve_defaults() {
        let config = ResolvedConfig::resolve(VoxcalcConfig::default(), None, &home());
        assert_eq!(config.theme, Theme::Dark);
        assert!(config.narrate);
        assert!(config.voice);
        assert!(config.solver.api_key.is_none());
        assert_eq!(config.solver.model, DEFAULT_MODEL);
        assert_eq!(config.solver.base_url, gemini::DEFAULT_BASE_URL);
        assert_eq!(config.solver.timeout, Duration::from_secs(30));
        assert_eq!(
            config.history.path,
            PathBuf::from("/home/tester/.voxcalc/history.json")
        );
        assert_eq!(
            config.history.export_dir,
            PathBuf::from("/home/tester/.voxcalc/exports")
        );
    }

    #[test]
    fn env_key_fills_empty_config_key() {
        let raw: VoxcalcConfig = toml::from_str("[solver]\napi_key = \"  \"\n").expect("parse");
        let config = ResolvedConfig::resolve(raw, Some("env-key-value".to_string()), &home());
        assert_eq!(
            config.solver.api_key.as_ref().map(ApiKey::as_str),
            Some("env-key-value")
        );
    }

    #[test]
    fn config_key_wins_over_env() {
        let raw: VoxcalcConfig =
            toml::from_str("[solver]\napi_key = \"file-key\"\n").expect("parse");
        let config = ResolvedConfig::resolve(raw, Some("env-key".to_string()), &home());
        assert_eq!(
            config.solver.api_key.as_ref().map(ApiKey::as_str),
            Some("file-key")
        );
    }

    #[test]
    fn resolve_full_file() {
        let raw: VoxcalcConfig = toml::from_str(
            r#"
[app]
theme = "light"
narrate = false
voice = false

[solver]
model = "gemini-2.0-flash"
base_url = "http://127.0.0.1:9999/v1beta/"
timeout_secs = 5

[history]
path = "~/calc/history.json"
export_dir = "/tmp/exports"
"#,
        )
        .expect("parse");
        let config = ResolvedConfig::resolve(raw, None, &home());
        assert_eq!(config.theme, Theme::Light);
        assert!(!config.narrate);
        assert!(!config.voice);
        assert_eq!(config.solver.model, "gemini-2.0-flash");
        assert_eq!(config.solver.base_url, "http://127.0.0.1:9999/v1beta");
        assert_eq!(config.solver.timeout, Duration::from_secs(5));
        assert_eq!(
            config.history.path,
            PathBuf::from("/home/tester/calc/history.json")
        );
        assert_eq!(config.history.export_dir, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn unknown_theme_falls_back() {
        let raw: VoxcalcConfig = toml::from_str("[app]\ntheme = \"sepia\"\n").expect("parse");
        let config = ResolvedConfig::resolve(raw, None, &home());
        assert_eq!(config.theme, Theme::Dark);
    }

    #[test]
    fn load_from_missing_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = VoxcalcConfig::load_from(&dir.path().join("config.toml")).expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[solver]\nmodel = \"custom\"\n").expect("write");
        let loaded = VoxcalcConfig::load_from(&path)
            .expect("load")
            .expect("present");
        assert_eq!(
            loaded.solver.and_then(|s| s.model).as_deref(),
            Some("custom")
        );
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[solver\nmodel = ").expect("write");
        let err = VoxcalcConfig::load_from(&path).expect_err("bad toml");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), path.as_path());
    }
}
