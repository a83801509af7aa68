//! `reactforce init`: working folder, config record and the assets bundle

use crate::config::{ReactforceConfig, REACTFORCE_DIR};
use crate::error::{ReactforceError, Result};
use crate::names::validate_identifier;
use crate::report::{track, Reporter};
use crate::root::{locate_project_root, ProjectRoot};
use crate::runtime::{CommandRunner, Tool};
use crate::templates::fetcher::{FetchMethod, RepositoryFetcher, RepositorySpec};
use crate::templates::manifest::{build_assets_plan, PROTOTYPE_ASSETS_RESOURCE, SALESFORCE_PACKAGE_DIR};
use crate::templates::materialize::{ensure_dir, MaterializeReport, Materializer, Outcome};
use crate::templates::substitution::MatchMode;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ASSETS_REPOSITORY: &str = "cloudpremise/reactforce-assets";

/// Resolved `init` flags
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Where the project root search starts
    pub start_dir: PathBuf,
    /// Static resources directory, relative to the project root
    pub static_resources: String,
    pub repository: RepositorySpec,
    pub branch: String,
    /// Name the `ReactforceAssets` bundle is installed under
    pub resource_name: String,
    pub method: FetchMethod,
    pub step_timeout: Option<Duration>,
    pub cli_version: String,
}

impl InitOptions {
    pub fn new(start_dir: impl Into<PathBuf>, repository: RepositorySpec) -> Self {
        Self {
            start_dir: start_dir.into(),
            static_resources: format!("/{SALESFORCE_PACKAGE_DIR}/staticresources"),
            repository,
            branch: "main".to_string(),
            resource_name: PROTOTYPE_ASSETS_RESOURCE.to_string(),
            method: FetchMethod::Git,
            step_timeout: None,
            cli_version: crate::DEFAULT_CLI_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitReport {
    pub project_root: ProjectRoot,
    pub reactforce_dir: PathBuf,
    pub config: Outcome,
    pub assets_repository: String,
    pub assets_path: PathBuf,
    pub assets_fetched: bool,
    pub files: MaterializeReport,
}

pub async fn run_init<R, P>(opts: &InitOptions, runner: &R, reporter: &P) -> Result<InitReport>
where
    R: CommandRunner,
    P: Reporter + ?Sized,
{
    validate_identifier("static resource name", &opts.resource_name)?;
    let root = locate_project_root(&opts.start_dir)?;
    reporter.intro("reactforce init");
    reporter.info(&format!("Project root: {}", root.path.display()));

    let reactforce_dir = root.path.join(REACTFORCE_DIR);
    ensure_dir(&reactforce_dir).await?;

    let config = write_config(&root, &opts.repository, reporter).await?;

    let assets_path = reactforce_dir.join(opts.repository.dir_name());
    let assets_fetched = if assets_path.exists() {
        reporter.info("Assets repository already cloned");
        false
    } else {
        if opts.method == FetchMethod::Git {
            runner.ensure_available(&[Tool::Git])?;
        }
        let fetcher = RepositoryFetcher::new(runner, &super::user_agent(&opts.cli_version))
            .with_timeout(opts.step_timeout);
        let outcome = track(
            reporter,
            &format!("Cloning {}", opts.repository),
            "Assets repository cloned",
            fetcher.fetch(&opts.repository, &opts.branch, &reactforce_dir, opts.method),
        )
        .await?;
        outcome.was_fetched()
    };

    let static_dir = root
        .path
        .join(opts.static_resources.trim_start_matches(['/', '\\']));
    let plan = build_assets_plan(&assets_path, &static_dir, &opts.resource_name);

    reporter.step_started("Copying static resources");
    let mut materializer = Materializer::new(&root.path, MatchMode::Identifier);
    let copied = async {
        materializer.copy_tree(&plan.tree_source, &plan.tree_dest).await?;
        materializer.apply(&plan.descriptor).await
    }
    .await;
    match copied {
        Ok(_) => reporter.step_finished("Static resources copied"),
        Err(e) => {
            reporter.step_failed("Copying static resources");
            return Err(e);
        }
    }

    reporter.success("Reactforce initialized");
    Ok(InitReport {
        project_root: root,
        reactforce_dir,
        config,
        assets_repository: opts.repository.to_string(),
        assets_path,
        assets_fetched,
        files: materializer.into_report(),
    })
}

/// Write `config.json` unless present; an existing file is never replaced, even when unreadable
async fn write_config<P>(root: &ProjectRoot, repository: &RepositorySpec, reporter: &P) -> Result<Outcome>
where
    P: Reporter + ?Sized,
{
    let path = ReactforceConfig::path(&root.path);
    let wanted = repository.to_string();

    match ReactforceConfig::load(&path).await {
        Ok(Some(existing)) => {
            if existing.assets_repository != wanted {
                reporter.warning(&format!(
                    "{} records assets repository '{}', keeping it (requested '{}')",
                    path.display(),
                    existing.assets_repository,
                    wanted
                ));
            }
            return Ok(Outcome::Skipped);
        }
        Ok(None) => {}
        Err(ReactforceError::Json { source, .. }) => {
            reporter.warning(&format!(
                "{} could not be read ({source}), keeping it",
                path.display()
            ));
            return Ok(Outcome::Skipped);
        }
        Err(e) => return Err(e),
    }

    ReactforceConfig {
        assets_repository: wanted,
    }
    .write_if_absent(&path)
    .await
}
