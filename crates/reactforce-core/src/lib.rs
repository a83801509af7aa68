//! Reactforce Core - scaffolding React apps into Salesforce projects
//!
//! This library implements the two `reactforce` flows:
//!
//! - **init**: creates the `reactforce/` working folder at the project root,
//!   records the assets repository in `config.json`, clones it and installs
//!   the shared static-resource bundle into the Salesforce package.
//! - **create**: bootstraps a create-react-app project, clones a templates
//!   repository and materializes Apex, Visualforce, Aura, static resource and
//!   flexipage metadata wired to the app, then builds it.
//!
//! # Architecture
//!
//! - **Layer 1: Core Operations** - root discovery, token substitution,
//!   idempotent materialization, repository fetching, tool invocation
//! - **Layer 2: Flows** - [`flows::run_init`] and [`flows::run_create`], driven
//!   through the [`CommandRunner`] and [`Reporter`] seams
//! - **Layer 3: CLI/TUI Interface** - optional cliclack progress (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based reporter and prompts
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use reactforce_core::{flows, AppName, ProcessRunner, RepositorySpec, SilentReporter};
//!
//! let opts = flows::CreateOptions::new(
//!     ".",
//!     AppName::parse("CustomerPortal")?,
//!     RepositorySpec::parse("cloudpremise/reactforce-templates")?,
//! );
//! let report = flows::run_create(&opts, &ProcessRunner::new(false), &SilentReporter).await?;
//! ```

pub mod config;
pub mod error;
pub mod flows;
pub mod names;
pub mod report;
pub mod root;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use error::{ErrorCategory, ReactforceError, Result};
pub use names::AppName;
pub use report::{Reporter, SilentReporter};
pub use root::{locate_project_root, ProjectRoot};
pub use runtime::{CommandRunner, Invocation, ProcessRunner};
pub use templates::{FetchMethod, ManifestVersion, MatchMode, RepositorySpec};

/// CLI version - used for template compatibility checking
/// The binary passes its own version, but this provides a fallback
pub const DEFAULT_CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
