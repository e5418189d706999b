// SPDX-License-Identifier: MPL-2.0
//! Centralized path management for application directories.
//!
//! # Path Resolution Order
//!
//! Both the data directory (counter state) and the config directory
//! (`settings.toml`) are resolved in the same priority order:
//! 1. **Explicit override** - parameter to `_with_override()` functions (for tests)
//! 2. **CLI arguments** (`--data-dir`, `--config-dir`) - set via [`init_cli_overrides`]
//! 3. **Environment variables** (`ROADLENS_DATA_DIR`, `ROADLENS_CONFIG_DIR`)
//! 4. **Platform default** - via `dirs` crate, with the app name appended
//!
//! CLI overrides are set once at startup:
//! ```ignore
//! paths::init_cli_overrides(args.data_dir, args.config_dir);
//! ```

use std::path::PathBuf;
use std::sync::OnceLock;

/// Application name used for directory naming.
const APP_NAME: &str = "RoadLens";

/// Environment variable to override the data directory.
pub const ENV_DATA_DIR: &str = "ROADLENS_DATA_DIR";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "ROADLENS_CONFIG_DIR";

static CLI_DATA_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Kind of application directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppDir {
    /// Application-managed state such as the capture counter.
    Data,
    /// User preferences.
    Config,
}

impl AppDir {
    fn env_var(self) -> &'static str {
        match self {
            AppDir::Data => ENV_DATA_DIR,
            AppDir::Config => ENV_CONFIG_DIR,
        }
    }

    fn cli_override(self) -> Option<PathBuf> {
        let cell = match self {
            AppDir::Data => &CLI_DATA_DIR,
            AppDir::Config => &CLI_CONFIG_DIR,
        };
        cell.get().and_then(Clone::clone)
    }

    fn platform_dir(self) -> Option<PathBuf> {
        match self {
            AppDir::Data => dirs::data_dir(),
            AppDir::Config => dirs::config_dir(),
        }
    }

    /// Resolves the directory, see the module documentation for the order.
    #[must_use]
    pub fn resolve(self, override_path: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(path) = override_path {
            return Some(path);
        }

        if let Some(path) = self.cli_override() {
            return Some(path);
        }

        if let Ok(env_path) = std::env::var(self.env_var()) {
            if !env_path.is_empty() {
                return Some(PathBuf::from(env_path));
            }
        }

        self.platform_dir().map(|mut path| {
            path.push(APP_NAME);
            path
        })
    }
}

/// Records the `--data-dir` and `--config-dir` arguments.
///
/// Only the first call has an effect; returns `false` for later calls.
pub fn init_cli_overrides(data_dir: Option<PathBuf>, config_dir: Option<PathBuf>) -> bool {
    let data_set = CLI_DATA_DIR.set(data_dir).is_ok();
    let config_set = CLI_CONFIG_DIR.set(config_dir).is_ok();
    data_set && config_set
}

/// Returns the application data directory path.
///
/// Platform defaults:
/// - Linux: `~/.local/share/RoadLens/`
/// - macOS: `~/Library/Application Support/RoadLens/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\RoadLens\`
pub fn get_app_data_dir() -> Option<PathBuf> {
    AppDir::Data.resolve(None)
}

pub fn get_app_data_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    AppDir::Data.resolve(override_path)
}

/// Returns the application config directory path.
///
/// Platform defaults:
/// - Linux: `~/.config/RoadLens/`
/// - macOS: `~/Library/Application Support/RoadLens/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\RoadLens\`
pub fn get_app_config_dir() -> Option<PathBuf> {
    AppDir::Config.resolve(None)
}

pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    AppDir::Config.resolve(override_path)
}
