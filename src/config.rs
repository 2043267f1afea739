use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};

pub const DEFAULT_DATA_PATH: &str = "data/tripadvisor_cleaned.csv";
pub const DEFAULT_LINK_BASE_URL: &str = "https://www.tripadvisor.com";

// ---------------------------------------------------------------------------
// Explorer configuration
// ---------------------------------------------------------------------------

/// Where the table lives and how best-pick links are built.
///
/// Missing keys fall back to their defaults; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub data_path: PathBuf,
    /// Prefix joined with a restaurant's `URL_TA` fragment.
    pub link_base_url: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            link_base_url: DEFAULT_LINK_BASE_URL.to_string(),
        }
    }
}

impl ExplorerConfig {
    /// Read and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ExplorerError::io(path, e))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_path.as_os_str().is_empty() {
            return Err(ExplorerError::Config("data_path must not be empty".into()));
        }
        if self.link_base_url.trim().is_empty() {
            return Err(ExplorerError::Config("link_base_url must not be empty".into()));
        }
        Ok(())
    }
}
