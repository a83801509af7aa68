//! Files reactforce owns or patches
//!
//! - `reactforce/config.json`, the per-project record written by `init`
//! - the generated React app's `package.json`

pub mod package_json;

use crate::error::{ReactforceError, Result};
use crate::templates::materialize::Outcome;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Working folder created at the project root
pub const REACTFORCE_DIR: &str = "reactforce";
pub const CONFIG_FILE: &str = "config.json";

/// Contents of `reactforce/config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactforceConfig {
    pub assets_repository: String,
}

impl ReactforceConfig {
    pub fn path(project_root: &Path) -> PathBuf {
        project_root.join(REACTFORCE_DIR).join(CONFIG_FILE)
    }

    pub async fn load(path: &Path) -> Result<Option<Self>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ReactforceError::io("read", path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ReactforceError::Json {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write the record unless a file is already there
    pub async fn write_if_absent(&self, path: &Path) -> Result<Outcome> {
        if path.exists() {
            return Ok(Outcome::Skipped);
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ReactforceError::io("create directory", parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ReactforceError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| ReactforceError::io("write", path, e))?;
        Ok(Outcome::Written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_uses_camel_case_record() {
        let dir = TempDir::new().unwrap();
        let path = ReactforceConfig::path(dir.path());
        let config = ReactforceConfig {
            assets_repository: "cloudpremise/reactforce-assets".to_string(),
        };

        assert_eq!(config.write_if_absent(&path).await.unwrap(), Outcome::Written);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"assetsRepository\": \"cloudpremise/reactforce-assets\"\n}"
        );
        assert_eq!(ReactforceConfig::load(&path).await.unwrap(), Some(config));
    }

    #[tokio::test]
    async fn test_existing_record_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = ReactforceConfig::path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"assetsRepository":"me/mine"}"#).unwrap();

        let config = ReactforceConfig {
            assets_repository: "other/repo".to_string(),
        };
        assert_eq!(config.write_if_absent(&path).await.unwrap(), Outcome::Skipped);
        let loaded = ReactforceConfig::load(&path).await.unwrap().unwrap();
        assert_eq!(loaded.assets_repository, "me/mine");
    }

    #[tokio::test]
    async fn test_load_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(ReactforceConfig::load(&path).await.unwrap(), None);

        std::fs::write(&path, "{not json").unwrap();
        let err = ReactforceConfig::load(&path).await.unwrap_err();
        assert!(matches!(err, ReactforceError::Json { .. }));
    }
}
