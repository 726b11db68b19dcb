use crate::error::{NemError, Result};
use crate::store::MatchPolicy;
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_FILE_NAME: &str = ".nem.toml";
const DEFAULT_SHELL: &str = "sh";

/// Environment variable overriding the root nem file.
pub const ROOT_DB_ENV: &str = "NEM_ROOT_DB";
/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "NEM_CONFIG_DIR";

/// Configuration for nem, stored in `<config dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NemConfig {
    /// Root nem file, always loaded as the farthest layer
    #[serde(default)]
    pub root_db: Option<PathBuf>,

    /// Name of the per-directory nem files
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Shell used to run resolved commands
    #[serde(default = "default_shell")]
    pub shell: String,

    /// What to do when a lookup expected one row and found several
    #[serde(default)]
    pub match_policy: MatchPolicy,
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}

impl Default for NemConfig {
    fn default() -> Self {
        Self {
            root_db: None,
            file_name: default_file_name(),
            shell: default_shell(),
            match_policy: MatchPolicy::default(),
        }
    }
}

impl NemConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            NemError::Config(format!("failed to read {}: {}", config_path.display(), e))
        })?;
        let config: NemConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir).map_err(|e| {
            NemError::Config(format!("failed to create {}: {}", config_dir.display(), e))
        })?;
        let content = serde_json::to_string_pretty(self)?;
        let path = config_dir.join(CONFIG_FILENAME);
        fs::write(&path, content)
            .map_err(|e| NemError::Config(format!("failed to write {}: {}", path.display(), e)))
    }

    /// Loads config from the usual place and applies environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match config_dir() {
            Some(dir) => Self::load(dir)?,
            None => Self::default(),
        };
        if let Some(root) = std::env::var_os(ROOT_DB_ENV).filter(|v| !v.is_empty()) {
            config.root_db = Some(PathBuf::from(root));
        }
        Ok(config)
    }

    /// The root nem file as an absolute path.
    ///
    /// Defaults to `~/.config/.nem.toml`.
    pub fn root_db_path(&self) -> Result<PathBuf> {
        let path = match &self.root_db {
            Some(p) => p.clone(),
            None => BaseDirs::new()
                .map(|d| d.home_dir().join(".config").join(DEFAULT_FILE_NAME))
                .ok_or_else(|| NemError::Config("could not determine home directory".into()))?,
        };
        if path.is_absolute() {
            return Ok(path);
        }
        let cwd = std::env::current_dir()
            .map_err(|e| NemError::Config(format!("could not read working directory: {}", e)))?;
        Ok(cwd.join(path))
    }
}

/// Directory holding `config.json`: `$NEM_CONFIG_DIR` or the platform config dir.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "nem", "nem").map(|d| d.config_dir().to_path_buf())
}
