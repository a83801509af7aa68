//! reactforce CLI - React apps inside Salesforce projects

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use reactforce_core::flows::create::{DEFAULT_CRA_TEMPLATE, DEFAULT_TEMPLATE, DEFAULT_TEMPLATES_REPOSITORY};
use reactforce_core::flows::init::DEFAULT_ASSETS_REPOSITORY;
use reactforce_core::flows::{run_create, run_init, CreateOptions, InitOptions};
use reactforce_core::templates::MaterializeReport;
use reactforce_core::tui::{prompt_app_name, CliclackReporter};
use reactforce_core::{
    AppName, FetchMethod, ManifestVersion, MatchMode, ProcessRunner, ReactforceError, Reporter,
    RepositorySpec, SilentReporter,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "reactforce")]
#[command(about = "Scaffold React apps inside Salesforce projects")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print the result as JSON instead of progress output
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory to start looking for the project root from
    #[arg(long = "project-dir", global = true)]
    pub project_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prepare the reactforce folder and install the shared static resources
    Init(InitArgs),
    /// Create a React app and the Salesforce metadata that hosts it
    Create(CreateArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Static resources directory, relative to the project root
    #[arg(short, long = "static-resources", default_value = "/force-app/main/default/staticresources")]
    pub static_resources: String,

    /// Assets repository (<owner>/<name>)
    #[arg(short, long, default_value = DEFAULT_ASSETS_REPOSITORY, env = "REACTFORCE_ASSETS_REPOSITORY")]
    pub repository: String,

    /// Branch to clone
    #[arg(short, long, default_value = "main")]
    pub branch: String,

    /// Name the assets static resource is installed under
    #[arg(short = 'n', long = "resource-name", default_value = "ReactforceAssets")]
    pub resource_name: String,

    /// Fetch with `git clone` or by downloading a branch archive
    #[arg(long, default_value = "git")]
    pub via: FetchMethod,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Application name, used as the prefix of every generated artifact
    #[arg(short, long = "app-name")]
    pub app_name: Option<String>,

    /// Template to use from the templates repository
    #[arg(short, long = "template-name", default_value = DEFAULT_TEMPLATE)]
    pub template_name: String,

    /// Templates repository (<owner>/<name>)
    #[arg(short, long, default_value = DEFAULT_TEMPLATES_REPOSITORY, env = "REACTFORCE_TEMPLATES_REPOSITORY")]
    pub repository: String,

    /// Branch to clone
    #[arg(short, long, default_value = "main")]
    pub branch: String,

    /// create-react-app template
    #[arg(short, long = "cra-template", default_value = DEFAULT_CRA_TEMPLATE)]
    pub cra_template: String,

    /// Patch the React app for managed-package builds
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub vanilla: bool,

    /// Manifest table version (defaults to the template's, else v2)
    #[arg(short, long)]
    pub manifest: Option<ManifestVersion>,

    /// How prototype identifiers are matched in template files
    #[arg(long = "match-mode", default_value = "identifier")]
    pub match_mode: MatchMode,

    /// Local templates repository to use instead of cloning (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Keep the cloned templates repository after the build
    #[arg(long = "keep-templates")]
    pub keep_templates: bool,

    /// Skip the final build step
    #[arg(long = "skip-build")]
    pub skip_build: bool,

    /// Fetch with `git clone` or by downloading a branch archive
    #[arg(long, default_value = "git")]
    pub via: FetchMethod,

    /// Timeout in seconds for each external tool step
    #[arg(long = "step-timeout", value_name = "SECS")]
    pub step_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let start_dir = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Some(Command::Init(args)) => init(args, start_dir, cli.json).await,
        Some(Command::Create(args)) => create(args, start_dir, cli.json).await,
        None => {
            println!(
                "{} {}",
                "Welcome to reactforce!".cyan().bold(),
                "Run `reactforce init` then `reactforce create --app-name <Name>`.".dimmed()
            );
            Ok(())
        }
    }
}

async fn init(args: InitArgs, start_dir: PathBuf, json: bool) -> Result<()> {
    let mut opts = InitOptions::new(start_dir, RepositorySpec::parse(&args.repository)?);
    opts.static_resources = args.static_resources;
    opts.branch = args.branch;
    opts.resource_name = args.resource_name;
    opts.method = args.via;
    opts.cli_version = CLI_VERSION.to_string();

    let runner = ProcessRunner::new(!json);
    if json {
        let report = run_init(&opts, &runner, &SilentReporter).await?;
        return print_json(&report);
    }

    let reporter = CliclackReporter::new();
    let report = run_init(&opts, &runner, &reporter).await?;
    reporter.outro(&summary(&report.files));
    Ok(())
}

async fn create(args: CreateArgs, start_dir: PathBuf, json: bool) -> Result<()> {
    let app_name = match (args.app_name, json) {
        (Some(raw), _) => AppName::parse(&raw)?,
        (None, false) => prompt_app_name()?,
        (None, true) => anyhow::bail!("--app-name is required with --json"),
    };

    let mut opts = CreateOptions::new(start_dir, app_name, RepositorySpec::parse(&args.repository)?);
    opts.template_name = args.template_name;
    opts.branch = args.branch;
    opts.cra_template = args.cra_template;
    opts.vanilla = args.vanilla;
    opts.manifest = args.manifest;
    opts.match_mode = args.match_mode;
    opts.template_dir = args.template_dir;
    opts.keep_templates = args.keep_templates;
    opts.skip_build = args.skip_build;
    opts.method = args.via;
    opts.step_timeout = args.step_timeout.map(Duration::from_secs);
    opts.cli_version = CLI_VERSION.to_string();

    let runner = ProcessRunner::new(!json);
    if json {
        let report = run_create(&opts, &runner, &SilentReporter).await?;
        return print_json(&report);
    }

    let reporter = CliclackReporter::new();
    let report = run_create(&opts, &runner, &reporter).await?;
    reporter.outro(&summary(&report.files));
    Ok(())
}

fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn summary(files: &MaterializeReport) -> String {
    format!(
        "{} file(s) written, {} already present",
        files.written.len(),
        files.skipped.len()
    )
}

fn report_error(error: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);
    if let Some(hint) = error.downcast_ref::<ReactforceError>().and_then(ReactforceError::hint) {
        eprintln!("  {}", hint.dimmed());
    }
    tracing::debug!(error = ?error, "command failed");
}

fn exit_code(error: &anyhow::Error) -> u8 {
    error
        .downcast_ref::<ReactforceError>()
        .map(|e| e.category().exit_code())
        .unwrap_or(1)
}
