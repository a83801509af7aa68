//! Template fetching, topology and materialization
//!
//! This module provides:
//! - Token substitution over template content (identifier-bounded or literal)
//! - The versioned manifest mapping template files to project destinations
//! - Idempotent materialization of files and directory trees
//! - Repository fetching by `git clone` or archive download
//! - The optional per-template descriptor and version compatibility check

pub mod descriptor;
pub mod fetcher;
pub mod manifest;
pub mod materialize;
pub mod substitution;
pub mod version;

pub use descriptor::TemplateDescriptor;
pub use fetcher::{FetchMethod, FetchOutcome, RepositoryFetcher, RepositorySpec};
pub use manifest::{
    build_assets_plan, build_react_manifest, build_salesforce_manifest, ArtifactFamily,
    ManifestEntry, ManifestVersion, SalesforceManifest, TemplateLayout,
};
pub use materialize::{materialize_file, MaterializeReport, Materializer, Outcome};
pub use substitution::{MatchMode, TokenMap};
pub use version::check_compatibility;
