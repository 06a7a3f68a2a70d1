//! Global xcal configuration at ~/.config/xcal/config.toml

use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::Deserialize;

use crate::error::{XcalError, XcalResult};

static DEFAULT_TOOL: &str = "caltool";
static DEFAULT_DATABASE: &str = "~/.local/share/xcal/xcal.json";

fn default_tool() -> String {
    DEFAULT_TOOL.to_string()
}

fn default_database() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE)
}

fn default_store_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct XcalConfig {
    /// Transformation tool: a bare name looked up on PATH, or a path.
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Parent directory for per-invocation scratch files. System temp dir if unset.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    #[serde(default = "default_database")]
    pub database: PathBuf,

    #[serde(default = "default_store_enabled")]
    pub store_enabled: bool,
}

impl Default for XcalConfig {
    fn default() -> Self {
        XcalConfig {
            tool: default_tool(),
            scratch_dir: None,
            database: default_database(),
            store_enabled: default_store_enabled(),
        }
    }
}

impl XcalConfig {
    pub fn config_path() -> XcalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| XcalError::Config("Could not determine config directory".into()))?
            .join("xcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented default file first
    /// if there is none.
    pub fn load() -> XcalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> XcalResult<Self> {
        let config: XcalConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| XcalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| XcalError::Config(e.to_string()))?;

        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        expand(&self.database)
    }

    pub fn scratch_path(&self) -> Option<PathBuf> {
        self.scratch_dir.as_deref().map(expand)
    }

    /// Create a default config file with every option commented out.
    pub fn create_default_config(path: &Path) -> XcalResult<()> {
        let contents = format!(
            "\
# xcal configuration

# Transformation tool (name on PATH, or a path):
# tool = \"{DEFAULT_TOOL}\"

# Where per-invocation scratch files are created:
# scratch_dir = \"/tmp\"

# Database file used by the store commands:
# database = \"{DEFAULT_DATABASE}\"
# store_enabled = true
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                XcalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| XcalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
