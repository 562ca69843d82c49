//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default HTTP bind address for the admin service
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5730";

/// File name of the catalog database inside the root folder
pub const DATABASE_FILE_NAME: &str = "quotes.db";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load the first platform config file that exists.
    ///
    /// A missing file yields the empty config; an unreadable or malformed
    /// one is logged and also yields the empty config.
    pub fn load() -> Self {
        let Some(path) = find_config_file() else {
            debug!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path)
            .map_err(Error::from)
            .and_then(|content| Self::parse(&content))
        {
            Ok(config) => {
                debug!("Loaded config file {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Resolved settings for the admin service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub root_folder: PathBuf,
    pub bind: String,
}

impl AdminConfig {
    /// Resolve settings in priority order:
    /// 1. Command-line argument or environment variable (already merged by the CLI parser)
    /// 2. TOML config file
    /// 3. OS-dependent compiled default
    pub fn resolve(
        cli_root_folder: Option<PathBuf>,
        cli_bind: Option<String>,
        file: &TomlConfig,
    ) -> Self {
        let root_folder = cli_root_folder
            .or_else(|| file.root_folder.clone())
            .unwrap_or_else(default_root_folder);

        let bind = cli_bind
            .or_else(|| file.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        Self { root_folder, bind }
    }

    /// Path of the catalog database file
    pub fn database_path(&self) -> PathBuf {
        database_path(&self.root_folder)
    }
}

/// Path of the catalog database inside `root_folder`
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}

/// Create the root folder if it does not exist yet
pub fn ensure_directory_exists(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
    }
    Ok(())
}

/// Locate the platform config file, if any.
///
/// Linux checks `~/.config/quotes/config.toml` and then
/// `/etc/quotes/config.toml`; other platforms use the user config dir only.
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("quotes").join("config.toml"));

    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/quotes/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/quotes (or /var/lib/quotes without a home)
        dirs::data_local_dir()
            .map(|d| d.join("quotes"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/quotes"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/quotes
        dirs::data_dir()
            .map(|d| d.join("quotes"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/quotes"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\quotes
        dirs::data_local_dir()
            .map(|d| d.join("quotes"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\quotes"))
    } else {
        PathBuf::from("./quotes_data")
    }
}
