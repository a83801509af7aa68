//! `reactforce create`: React app bootstrap plus Salesforce metadata wiring
//!
//! Steps, each skipped when its output already exists:
//!
//! 1. `npx create-react-app` into `reactforce/<app>` when it has no `package.json`
//! 2. vanilla mode: patch `package.json`, then `npm install` if it changed
//! 3. clone the templates repository into `reactforce/` (or use `--template-dir`)
//! 4. materialize the Salesforce manifest, then the React manifest in vanilla mode
//! 5. build the app, then remove the clone if this run created it

use crate::config::package_json::{patch_package_json, PUSH_SCRIPT};
use crate::config::REACTFORCE_DIR;
use crate::error::{ReactforceError, Result};
use crate::names::AppName;
use crate::report::{track, Reporter};
use crate::root::{locate_project_root, ProjectRoot};
use crate::runtime::{CommandRunner, Invocation, Tool};
use crate::templates::descriptor::TemplateDescriptor;
use crate::templates::fetcher::{FetchMethod, RepositoryFetcher, RepositorySpec};
use crate::templates::manifest::{
    build_react_manifest, build_salesforce_manifest, ManifestVersion, TemplateLayout,
};
use crate::templates::materialize::{ensure_dir, MaterializeReport, Materializer, Outcome};
use crate::templates::substitution::MatchMode;
use crate::templates::version::check_compatibility;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TEMPLATES_REPOSITORY: &str = "cloudpremise/reactforce-templates";
pub const DEFAULT_TEMPLATE: &str = "default";
pub const DEFAULT_CRA_TEMPLATE: &str = "cra-template";

/// Resolved `create` flags
#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub start_dir: PathBuf,
    pub app_name: AppName,
    pub template_name: String,
    pub repository: RepositorySpec,
    pub branch: String,
    pub cra_template: String,
    /// Patch the generated app for react-app-rewired and managed-package builds
    pub vanilla: bool,
    /// Overrides the template descriptor's manifest version
    pub manifest: Option<ManifestVersion>,
    pub match_mode: MatchMode,
    /// Local templates repository; never fetched nor removed
    pub template_dir: Option<PathBuf>,
    pub keep_templates: bool,
    pub skip_build: bool,
    pub method: FetchMethod,
    pub step_timeout: Option<Duration>,
    pub cli_version: String,
}

impl CreateOptions {
    pub fn new(start_dir: impl Into<PathBuf>, app_name: AppName, repository: RepositorySpec) -> Self {
        Self {
            start_dir: start_dir.into(),
            app_name,
            template_name: DEFAULT_TEMPLATE.to_string(),
            repository,
            branch: "main".to_string(),
            cra_template: DEFAULT_CRA_TEMPLATE.to_string(),
            vanilla: true,
            manifest: None,
            match_mode: MatchMode::default(),
            template_dir: None,
            keep_templates: false,
            skip_build: false,
            method: FetchMethod::Git,
            step_timeout: None,
            cli_version: crate::DEFAULT_CLI_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReport {
    pub project_root: ProjectRoot,
    pub app_name: AppName,
    pub app_dir: PathBuf,
    pub react_app_created: bool,
    pub package_json: Option<Outcome>,
    pub dependencies_installed: bool,
    pub templates_path: PathBuf,
    pub templates_fetched: bool,
    pub templates_removed: bool,
    /// Display name from the template descriptor
    pub template: Option<String>,
    pub manifest: ManifestVersion,
    pub files: MaterializeReport,
    pub build_script: Option<String>,
}

pub async fn run_create<R, P>(opts: &CreateOptions, runner: &R, reporter: &P) -> Result<CreateReport>
where
    R: CommandRunner,
    P: Reporter + ?Sized,
{
    let root = locate_project_root(&opts.start_dir)?;
    reporter.intro("reactforce create");
    reporter.info(&format!("Project root: {}", root.path.display()));

    let reactforce_dir = root.path.join(REACTFORCE_DIR);
    ensure_dir(&reactforce_dir).await?;

    let app = &opts.app_name;
    let app_dir = reactforce_dir.join(app.react_dir_name());
    let package_json = app_dir.join("package.json");

    let react_app_created = bootstrap_react_app(opts, runner, reporter, &reactforce_dir, &package_json).await?;

    let mut package_outcome = None;
    let mut dependencies_installed = false;
    if opts.vanilla {
        let outcome = patch_package_json(&package_json).await?;
        if outcome == Outcome::Written {
            runner.ensure_available(&[Tool::Npm])?;
            let install = Invocation::new("npm", ["install"], &app_dir).with_timeout(opts.step_timeout);
            track(
                reporter,
                "Installing dependencies",
                "Dependencies installed",
                runner.run(&install),
            )
            .await?;
            dependencies_installed = true;
        }
        package_outcome = Some(outcome);
    }

    let (templates_path, templates_fetched) = resolve_templates(opts, runner, reporter, &reactforce_dir).await?;
    let layout = TemplateLayout::new(&templates_path, &opts.template_name);
    if !layout.template_dir().is_dir() {
        return Err(ReactforceError::MissingTemplateSource {
            path: layout.template_dir(),
        });
    }

    let descriptor = TemplateDescriptor::load(&layout.descriptor_path())
        .await?
        .unwrap_or_default();
    if let Some(summary) = descriptor.summary() {
        reporter.info(&summary);
    }
    if let Some(required) = &descriptor.version {
        if let Some(warning) = check_compatibility(&opts.cli_version, required) {
            reporter.warning(&warning);
        }
    }
    let manifest_version = opts.manifest.or(descriptor.manifest).unwrap_or_default();
    tracing::debug!(manifest = %manifest_version, template = %opts.template_name, "resolved manifest");

    let mut materializer = Materializer::new(&root.path, opts.match_mode);
    let salesforce = build_salesforce_manifest(manifest_version, app, &layout.salesforce_root(), &root.path);
    track(
        reporter,
        "Writing Salesforce metadata",
        "Salesforce metadata written",
        async {
            for family in &salesforce.families {
                tracing::debug!(family = family.family.display_name(), "materializing family");
                for dir in &family.dirs {
                    ensure_dir(dir).await?;
                }
                materializer.apply_all(&family.entries).await?;
            }
            Ok::<(), ReactforceError>(())
        },
    )
    .await?;

    if opts.vanilla {
        let react = build_react_manifest(app, &layout.react_root(), &app_dir);
        track(
            reporter,
            "Writing React configuration",
            "React configuration written",
            materializer.apply_all(&react),
        )
        .await?;
    }

    let build_script = if opts.skip_build {
        reporter.info("Skipping build");
        None
    } else {
        let script = if opts.vanilla { PUSH_SCRIPT } else { "build" };
        runner.ensure_available(&[Tool::Npm])?;
        let build = Invocation::new("npm", ["run", script], &app_dir).with_timeout(opts.step_timeout);
        track(reporter, "Building React app", "React app built", runner.run(&build)).await?;
        Some(script.to_string())
    };

    let templates_removed = if templates_fetched && !opts.keep_templates {
        remove_templates(&templates_path, reporter).await
    } else {
        false
    };

    reporter.success(&format!("{app} created"));
    Ok(CreateReport {
        project_root: root,
        app_name: app.clone(),
        app_dir,
        react_app_created,
        package_json: package_outcome,
        dependencies_installed,
        templates_path,
        templates_fetched,
        templates_removed,
        template: descriptor.name,
        manifest: manifest_version,
        files: materializer.into_report(),
        build_script,
    })
}

async fn bootstrap_react_app<R, P>(
    opts: &CreateOptions,
    runner: &R,
    reporter: &P,
    reactforce_dir: &Path,
    package_json: &Path,
) -> Result<bool>
where
    R: CommandRunner,
    P: Reporter + ?Sized,
{
    if package_json.exists() {
        reporter.info("React app already installed");
        return Ok(false);
    }

    runner.ensure_available(&[Tool::Node, Tool::Npx])?;
    let dir_name = opts.app_name.react_dir_name();
    let invocation = Invocation::new(
        "npx",
        [
            "--yes",
            "create-react-app",
            dir_name.as_str(),
            "--template",
            opts.cra_template.as_str(),
        ],
        reactforce_dir,
    )
    .with_timeout(opts.step_timeout);
    track(
        reporter,
        &format!("Creating React app {dir_name}"),
        "React app created",
        runner.run(&invocation),
    )
    .await?;

    if !package_json.exists() {
        return Err(ReactforceError::ReactAppMissing {
            path: package_json.to_path_buf(),
        });
    }
    Ok(true)
}

/// Templates repository root, and whether this run fetched it
async fn resolve_templates<R, P>(
    opts: &CreateOptions,
    runner: &R,
    reporter: &P,
    reactforce_dir: &Path,
) -> Result<(PathBuf, bool)>
where
    R: CommandRunner,
    P: Reporter + ?Sized,
{
    if let Some(dir) = &opts.template_dir {
        reporter.info(&format!("Using local templates from {}", dir.display()));
        return Ok((dir.clone(), false));
    }

    let destination = reactforce_dir.join(opts.repository.dir_name());
    if destination.exists() {
        reporter.info("Templates repository already cloned");
        return Ok((destination, false));
    }

    if opts.method == FetchMethod::Git {
        runner.ensure_available(&[Tool::Git])?;
    }
    let fetcher = RepositoryFetcher::new(runner, &super::user_agent(&opts.cli_version))
        .with_timeout(opts.step_timeout);
    let outcome = track(
        reporter,
        &format!("Cloning {}", opts.repository),
        "Templates repository cloned",
        fetcher.fetch(&opts.repository, &opts.branch, reactforce_dir, opts.method),
    )
    .await?;
    let fetched = outcome.was_fetched();
    Ok((outcome.path().to_path_buf(), fetched))
}

/// A leftover clone is only a warning; the generated app is already in place
async fn remove_templates<P>(path: &Path, reporter: &P) -> bool
where
    P: Reporter + ?Sized,
{
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed templates clone");
            true
        }
        Err(e) => {
            reporter.warning(&format!("Could not remove {}: {}", path.display(), e));
            false
        }
    }
}
