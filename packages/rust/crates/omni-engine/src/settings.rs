//! Runtime settings loader for omni-engine.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/settings.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/omni-canvas/settings.yaml`
//!
//! Merge precedence is user over system. Both files keep the engine's keys
//! under `canvas:`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use omni_ast::QuoteStyle;
use omni_edit::{DEFAULT_THRESHOLD, EditConfig};
use omni_io::{DEFAULT_MAX_FILE_SIZE, PrjDirs, read_text_safe};
use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/settings.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "omni-canvas/settings.yaml";
const DEFAULT_HISTORY_LIMIT: usize = 100;
const SETTINGS_MAX_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub canvas: CanvasSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CanvasSettings {
    #[serde(default)]
    pub history: HistorySettings,
    #[serde(default)]
    pub fuzzy: FuzzySettings,
    #[serde(default)]
    pub writer: WriterSettings,
    #[serde(default)]
    pub format: FormatSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistorySettings {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FuzzySettings {
    pub threshold: Option<f64>,
    pub refuse_tied_matches: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WriterSettings {
    pub timeout_ms: Option<u64>,
    pub max_file_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatSettings {
    pub quote_style: Option<QuoteStyle>,
    pub indent_unit: Option<String>,
}

impl RuntimeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            canvas: self.canvas.merge(overlay.canvas),
        }
    }
}

impl CanvasSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            history: HistorySettings {
                limit: overlay.history.limit.or(self.history.limit),
            },
            fuzzy: FuzzySettings {
                threshold: overlay.fuzzy.threshold.or(self.fuzzy.threshold),
                refuse_tied_matches: overlay
                    .fuzzy
                    .refuse_tied_matches
                    .or(self.fuzzy.refuse_tied_matches),
            },
            writer: WriterSettings {
                timeout_ms: overlay.writer.timeout_ms.or(self.writer.timeout_ms),
                max_file_size: overlay.writer.max_file_size.or(self.writer.max_file_size),
            },
            format: FormatSettings {
                quote_style: overlay.format.quote_style.or(self.format.quote_style),
                indent_unit: overlay.format.indent_unit.or(self.format.indent_unit),
            },
        }
    }

    /// Resolve into an engine config, filling defaults.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        let threshold = match self.fuzzy.threshold {
            Some(t) if t > 0.0 && t <= 1.0 => t,
            Some(t) => {
                tracing::warn!(threshold = t, "fuzzy threshold outside (0, 1]; using default");
                DEFAULT_THRESHOLD
            }
            None => DEFAULT_THRESHOLD,
        };
        let indent_unit = self
            .format
            .indent_unit
            .clone()
            .filter(|unit| !unit.is_empty() && unit.chars().all(|c| c == ' ' || c == '\t'))
            .unwrap_or(defaults.edit.indent_unit);
        EngineConfig {
            history_limit: self.history.limit.unwrap_or(defaults.history_limit),
            writer_timeout: self
                .writer
                .timeout_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            max_file_size: self.writer.max_file_size.unwrap_or(defaults.max_file_size),
            edit: EditConfig {
                quote: self.format.quote_style.unwrap_or(defaults.edit.quote),
                indent_unit,
                fuzzy_threshold: threshold,
                refuse_tied_matches: self
                    .fuzzy
                    .refuse_tied_matches
                    .unwrap_or(defaults.edit.refuse_tied_matches),
            },
        }
    }
}

/// Resolved engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Undoable actions kept per surface.
    pub history_limit: usize,
    /// Deadline for one store write; `None` waits forever.
    pub writer_timeout: Option<Duration>,
    /// Largest source file the filesystem store reads.
    pub max_file_size: u64,
    /// Formatting and snippet matching.
    pub edit: EditConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            writer_timeout: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            edit: EditConfig::default(),
        }
    }
}

/// Load merged runtime settings (user overrides system).
pub fn load_runtime_settings() -> RuntimeSettings {
    let (system_path, user_path) = runtime_settings_paths();
    load_runtime_settings_from_paths(&system_path, &user_path)
}

/// Engine config from the merged settings files.
pub fn load_engine_config() -> EngineConfig {
    load_runtime_settings().canvas.engine_config()
}

#[doc(hidden)]
pub fn runtime_settings_paths() -> (PathBuf, PathBuf) {
    let system_path = PrjDirs::project_root().join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = PrjDirs::config_home().join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> RuntimeSettings {
    if !path.exists() {
        return RuntimeSettings::default();
    }
    let raw = match read_text_safe(path, SETTINGS_MAX_BYTES) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return RuntimeSettings::default();
        }
    };
    match serde_yaml::from_str::<RuntimeSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            RuntimeSettings::default()
        }
    }
}
