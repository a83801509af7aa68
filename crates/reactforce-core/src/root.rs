//! Project root discovery

use crate::error::{ReactforceError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const SFDX_PROJECT_MARKER: &str = "sfdx-project.json";
pub const PACKAGE_MARKER: &str = "package.json";

/// Which marker file identified the project root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootMarker {
    SfdxProject,
    Package,
}

impl RootMarker {
    pub fn file_name(self) -> &'static str {
        match self {
            RootMarker::SfdxProject => SFDX_PROJECT_MARKER,
            RootMarker::Package => PACKAGE_MARKER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRoot {
    pub path: PathBuf,
    pub marker: RootMarker,
}

/// Walk upward from `start` until a directory holds a project marker.
///
/// `sfdx-project.json` wins over `package.json` when both sit in the same
/// directory. Fails with [`ReactforceError::RootNotFound`] once the filesystem
/// root has been checked without a match.
pub fn locate_project_root(start: &Path) -> Result<ProjectRoot> {
    let start = start
        .canonicalize()
        .map_err(|e| ReactforceError::io("resolve", start, e))?;

    for dir in start.ancestors() {
        tracing::debug!(dir = %dir.display(), "looking for project marker");
        for marker in [RootMarker::SfdxProject, RootMarker::Package] {
            if dir.join(marker.file_name()).is_file() {
                return Ok(ProjectRoot {
                    path: dir.to_path_buf(),
                    marker,
                });
            }
        }
    }

    Err(ReactforceError::RootNotFound { start })
}
