//! Project directory resolution (`PRJ_SPEC`).
//!
//! `PRJ_ROOT` anchors relative paths; `PRJ_CONFIG_HOME` holds user settings.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static CONFIG_HOME: OnceLock<PathBuf> = OnceLock::new();
static PROJECT_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// Project directory resolver.
#[derive(Debug, Clone)]
pub struct PrjDirs;

impl PrjDirs {
    /// `PRJ_CONFIG_HOME`, default `.config` under the project root.
    #[inline]
    pub fn config_home() -> PathBuf {
        CONFIG_HOME
            .get_or_init(|| {
                let value = env::var("PRJ_CONFIG_HOME").unwrap_or_else(|_| ".config".to_string());
                anchor(&root_from_env(), &value)
            })
            .clone()
    }

    /// `PRJ_ROOT`, falling back to the working directory.
    #[inline]
    pub fn project_root() -> PathBuf {
        PROJECT_ROOT.get_or_init(root_from_env).clone()
    }
}

fn root_from_env() -> PathBuf {
    env::var("PRJ_ROOT").map_or_else(
        |_| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        PathBuf::from,
    )
}

/// Absolute `value` as-is, relative `value` joined onto `root`.
#[must_use]
pub fn anchor(root: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() { path } else { root.join(path) }
}
