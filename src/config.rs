// Store location configuration

use eyre::{Result, eyre};
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming a directory that holds the data file
pub const DEFAULT_ENV_VAR: &str = "CODEREVISE_HOME";

/// File name of the persisted snapshot inside the data directory
pub const DATA_FILE_NAME: &str = "questions.json";

/// Where the store keeps its snapshot file
///
/// Resolution order: `path_override`, then the directory named by the
/// `env_var_name` environment variable, then `default_dir_resolver`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Explicit data file path
    pub path_override: Option<PathBuf>,
    /// Environment variable consulted when there is no override
    pub env_var_name: String,
    /// Fallback data directory (platform data dir by default)
    pub default_dir_resolver: fn() -> Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path_override: None,
            env_var_name: DEFAULT_ENV_VAR.to_string(),
            default_dir_resolver: default_data_dir,
        }
    }
}

impl StoreConfig {
    /// Config that always uses the given file
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path_override: Some(path.into()),
            ..Self::default()
        }
    }

    /// Resolve the data file path against the process environment
    pub fn resolve_path(&self) -> Result<PathBuf> {
        self.resolve_path_with(|name| std::env::var_os(name))
    }

    /// Resolve the data file path using `lookup` for environment access
    pub fn resolve_path_with<F>(&self, lookup: F) -> Result<PathBuf>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(path) = &self.path_override {
            return Ok(path.clone());
        }

        if let Some(dir) = lookup(&self.env_var_name).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir).join(DATA_FILE_NAME));
        }

        (self.default_dir_resolver)()
            .map(|dir| dir.join(DATA_FILE_NAME))
            .ok_or_else(|| {
                eyre!(
                    "Could not determine a data directory; set {} or pass --store-path",
                    self.env_var_name
                )
            })
    }
}

/// Platform data directory for this application (e.g. ~/.local/share/coderevise)
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("coderevise"))
}
