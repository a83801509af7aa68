//! The two orchestrated flows
//!
//! - `init` prepares the `reactforce/` working folder and installs the shared
//!   static-resource bundle into the Salesforce package.
//! - `create` bootstraps a React app and wires it into the package through
//!   generated Apex, Visualforce, Aura and flexipage metadata.
//!
//! Both take their external process runner and progress reporter as
//! parameters and return a serializable report.

pub mod create;
pub mod init;

pub use create::{run_create, CreateOptions, CreateReport};
pub use init::{run_init, InitOptions, InitReport};

/// User agent sent with archive downloads
pub(crate) fn user_agent(cli_version: &str) -> String {
    format!("reactforce/{cli_version}")
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::names::AppName;
    use crate::root::SFDX_PROJECT_MARKER;
    use crate::templates::manifest::{
        build_assets_plan, build_react_manifest, build_salesforce_manifest, ManifestEntry,
        ManifestVersion, TemplateLayout,
    };
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A directory holding `sfdx-project.json`
    pub fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SFDX_PROJECT_MARKER), "{}").unwrap();
        dir
    }

    pub fn canonical(path: &Path) -> PathBuf {
        path.canonicalize().unwrap()
    }

    fn write_source(entry: &ManifestEntry) {
        let content = if entry.substitute {
            entry
                .tokens
                .pairs()
                .iter()
                .map(|pair| format!("ref {};", pair.token))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            "<meta/>".to_string()
        };
        fs::create_dir_all(entry.source.parent().unwrap()).unwrap();
        fs::write(&entry.source, content).unwrap();
    }

    /// Write every file the `template` of a templates repository provides
    pub fn templates_repo(root: &Path, template: &str) {
        let layout = TemplateLayout::new(root, template);
        // Source paths only depend on the prototype names, not the app.
        let app = AppName::parse("Fixture").unwrap();
        let scratch = root.join("scratch");

        let manifest = build_salesforce_manifest(
            ManifestVersion::V2,
            &app,
            &layout.salesforce_root(),
            &scratch,
        );
        manifest.entries().for_each(write_source);
        build_react_manifest(&app, &layout.react_root(), &scratch)
            .iter()
            .for_each(write_source);
    }

    /// Write the assets repository consumed by `init`
    pub fn assets_repo(root: &Path) {
        let plan = build_assets_plan(root, &root.join("scratch"), "Fixture");
        fs::create_dir_all(plan.tree_source.join("css")).unwrap();
        fs::write(plan.tree_source.join("css/reactforce.css"), "body {}").unwrap();
        write_source(&plan.descriptor);
    }
}
