//! Optional `template.yaml` shipped next to a template's `sf/` and `react/` trees

use super::manifest::ManifestVersion;
use crate::error::{ReactforceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-template descriptor (templates/<name>/template.yaml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    /// Display name of the template
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Oldest CLI version the template is known to work with
    #[serde(default)]
    pub version: Option<String>,

    /// Manifest table the template's tree follows
    #[serde(default)]
    pub manifest: Option<ManifestVersion>,
}

impl TemplateDescriptor {
    /// Read the descriptor at `path`; a missing file yields `None`
    pub async fn load(path: &Path) -> Result<Option<Self>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ReactforceError::io("read", path, e)),
        };
        let descriptor = serde_yaml::from_str(&content).map_err(|e| {
            ReactforceError::Manifest(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Some(descriptor))
    }

    /// One line for the progress output, if the template names itself
    pub fn summary(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        Some(match self.description.as_deref() {
            Some(description) => format!("Template: {name} ({description})"),
            None => format!("Template: {name}"),
        })
    }
}
