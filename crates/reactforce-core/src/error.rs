//! Error taxonomy shared by both flows

use std::path::PathBuf;
use thiserror::Error;

/// Coarse failure category, mapped to a process exit code by the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed template tree, bad flags, missing project root
    Configuration,
    /// A package-manager or build command failed
    ExternalTool,
    /// Cloning or downloading a repository failed
    Network,
    /// Reading or writing the destination tree failed
    Io,
}

impl ErrorCategory {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCategory::Configuration => 2,
            ErrorCategory::ExternalTool => 3,
            ErrorCategory::Network => 4,
            ErrorCategory::Io => 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReactforceError {
    #[error("No project root found: no sfdx-project.json or package.json in {} or any parent directory", .start.display())]
    RootNotFound { start: PathBuf },

    #[error("Template source not found: {}", .path.display())]
    MissingTemplateSource { path: PathBuf },

    #[error("Template file is not valid UTF-8: {}", .path.display())]
    TemplateEncoding { path: PathBuf },

    #[error("Invalid {kind} '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: &'static str,
    },

    #[error("React app not found: {} is missing", .path.display())]
    ReactAppMissing { path: PathBuf },

    #[error("Invalid repository '{0}': expected <owner>/<name>")]
    InvalidRepository(String),

    #[error("Invalid template manifest: {0}")]
    Manifest(String),

    #[error("Missing required tools:\n{0}")]
    MissingTools(String),

    #[error("`{command}` could not be started: {source}")]
    ToolSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with exit code {}", .code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ToolFailed { command: String, code: Option<i32> },

    #[error("`{command}` timed out after {secs} seconds")]
    ToolTimeout { command: String, secs: u64 },

    #[error("Failed to clone {url}: {details}")]
    CloneFailed { url: String, details: String },

    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ReactforceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReactforceError::RootNotFound { .. }
            | ReactforceError::MissingTemplateSource { .. }
            | ReactforceError::TemplateEncoding { .. }
            | ReactforceError::InvalidName { .. }
            | ReactforceError::ReactAppMissing { .. }
            | ReactforceError::InvalidRepository(_)
            | ReactforceError::Manifest(_)
            | ReactforceError::Json { .. } => ErrorCategory::Configuration,
            ReactforceError::MissingTools(_)
            | ReactforceError::ToolSpawn { .. }
            | ReactforceError::ToolFailed { .. }
            | ReactforceError::ToolTimeout { .. } => ErrorCategory::ExternalTool,
            ReactforceError::CloneFailed { .. } => ErrorCategory::Network,
            ReactforceError::Io { .. } => ErrorCategory::Io,
        }
    }

    /// Extra line shown under the error message, if any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ReactforceError::CloneFailed { .. } => Some(
                "The repository may be private or restricted. Check the name, branch and your access rights.",
            ),
            ReactforceError::MissingTemplateSource { .. } => {
                Some("The template tree looks incomplete. Check --template-name and --branch.")
            }
            ReactforceError::RootNotFound { .. } => {
                Some("Run this command inside a Salesforce project (sfdx-project.json).")
            }
            _ => None,
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReactforceError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ReactforceError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_and_non_zero() {
        let codes = [
            ErrorCategory::Configuration.exit_code(),
            ErrorCategory::ExternalTool.exit_code(),
            ErrorCategory::Network.exit_code(),
            ErrorCategory::Io.exit_code(),
        ];
        for (i, code) in codes.iter().enumerate() {
            assert_ne!(*code, 0);
            assert!(!codes[i + 1..].contains(code));
        }
    }

    #[test]
    fn test_clone_failure_is_network_with_hint() {
        let err = ReactforceError::CloneFailed {
            url: "https://github.com/acme/private".to_string(),
            details: "authentication required".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.hint().unwrap().contains("private"));
    }

    #[test]
    fn test_missing_source_is_configuration() {
        let err = ReactforceError::MissingTemplateSource {
            path: PathBuf::from("/tmp/templates/x.cls"),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("x.cls"));
    }
}
