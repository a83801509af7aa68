//! Repository fetching from GitHub
//!
//! Repositories are addressed as `owner/name` and land in `<parent>/<name>`.
//! Two transports are supported:
//! - Git: `git clone` (shallow for `main`/`master`), then `.git` is removed
//! - Archive: the branch zip from codeload.github.com, extracted in place
//!
//! An existing destination is reused as-is.

use crate::error::{ReactforceError, Result};
use crate::runtime::tool::{CommandRunner, Invocation};
use serde::Serialize;
use std::fmt;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use zip::ZipArchive;

const GITHUB_URL: &str = "https://github.com";
const CODELOAD_URL: &str = "https://codeload.github.com";

/// A GitHub repository reference (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySpec {
    pub owner: String,
    pub name: String,
}

impl RepositorySpec {
    /// Accepts `owner/name`, optionally as a full `https://github.com/...` URL
    /// and with a trailing `.git`.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || ReactforceError::InvalidRepository(raw.to_string());

        let trimmed = raw.trim();
        let path = match Url::parse(trimmed) {
            Ok(url) if url.host_str() == Some("github.com") => url.path().to_string(),
            Ok(_) => return Err(invalid()),
            Err(_) => trimmed.to_string(),
        };
        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let segments: Vec<&str> = path.split('/').collect();
        let [owner, name] = segments.as_slice() else {
            return Err(invalid());
        };
        let valid = |s: &str| {
            !s.is_empty()
                && s != "."
                && s != ".."
                && s.chars().all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c))
        };
        if !valid(*owner) || !valid(*name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Directory the repository is cloned into
    pub fn dir_name(&self) -> &str {
        &self.name
    }

    pub fn git_url(&self) -> Result<Url> {
        let raw = format!("{}/{}/{}", GITHUB_URL, self.owner, self.name);
        Url::parse(&raw).map_err(|_| ReactforceError::InvalidRepository(self.to_string()))
    }

    pub fn archive_url(&self, branch: &str) -> Result<Url> {
        let mut url = Url::parse(CODELOAD_URL)
            .map_err(|_| ReactforceError::InvalidRepository(self.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ReactforceError::InvalidRepository(self.to_string()))?
            .pop_if_empty()
            .extend([self.owner.as_str(), self.name.as_str(), "zip", "refs", "heads"])
            .extend(branch.split('/'));
        Ok(url)
    }
}

impl fmt::Display for RepositorySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// How a repository is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMethod {
    #[default]
    Git,
    Archive,
}

impl FromStr for FetchMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "git" => Ok(FetchMethod::Git),
            "archive" | "zip" => Ok(FetchMethod::Archive),
            other => Err(format!("unknown fetch method '{other}' (expected git or archive)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "kebab-case")]
pub enum FetchOutcome {
    Fetched(PathBuf),
    AlreadyPresent(PathBuf),
}

impl FetchOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FetchOutcome::Fetched(p) | FetchOutcome::AlreadyPresent(p) => p,
        }
    }

    pub fn was_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched(_))
    }
}

/// Repository fetcher - clones or downloads repositories into a parent folder
pub struct RepositoryFetcher<'r, R: CommandRunner> {
    runner: &'r R,
    client: reqwest::Client,
    step_timeout: Option<Duration>,
}

impl<'r, R: CommandRunner> RepositoryFetcher<'r, R> {
    pub fn new(runner: &'r R, user_agent: &str) -> Self {
        Self {
            runner,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            step_timeout: None,
        }
    }

    pub fn with_timeout(mut self, step_timeout: Option<Duration>) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    /// Fetch `repo` at `branch` into `<parent>/<repo name>`
    pub async fn fetch(
        &self,
        repo: &RepositorySpec,
        branch: &str,
        parent: &Path,
        method: FetchMethod,
    ) -> Result<FetchOutcome> {
        let destination = parent.join(repo.dir_name());
        if destination.exists() {
            tracing::debug!(dest = %destination.display(), "repository already present");
            return Ok(FetchOutcome::AlreadyPresent(destination));
        }

        match method {
            FetchMethod::Git => self.clone_git(repo, branch, parent, &destination).await?,
            FetchMethod::Archive => self.download_archive(repo, branch, &destination).await?,
        }

        Ok(FetchOutcome::Fetched(destination))
    }

    async fn clone_git(
        &self,
        repo: &RepositorySpec,
        branch: &str,
        parent: &Path,
        destination: &Path,
    ) -> Result<()> {
        let url = repo.git_url()?;
        let invocation = Invocation::new(
            "git",
            clone_args(&url, branch, destination),
            parent,
        )
        .with_timeout(self.step_timeout);

        self.runner.run(&invocation).await.map_err(|e| match e {
            ReactforceError::ToolFailed { command, code } => ReactforceError::CloneFailed {
                url: url.to_string(),
                details: format!(
                    "`{}` exited with code {}",
                    command,
                    code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string())
                ),
            },
            other => other,
        })?;

        remove_git_metadata(destination)
    }

    async fn download_archive(
        &self,
        repo: &RepositorySpec,
        branch: &str,
        destination: &Path,
    ) -> Result<()> {
        let bytes = self.download(&repo.archive_url(branch)?).await?;

        if let Err(e) = extract_archive(&bytes, destination) {
            // A half-extracted tree would be reused by the next run.
            let _ = std::fs::remove_dir_all(destination);
            return Err(e);
        }
        Ok(())
    }

    /// GET `url` into memory; the step timeout covers headers and body together
    async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        let failed = |details: String| ReactforceError::CloneFailed {
            url: url.to_string(),
            details,
        };

        let transfer = async {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| failed(e.to_string()))?;
            if !response.status().is_success() {
                return Err(failed(format!("HTTP {}", response.status())));
            }
            let body = response.bytes().await.map_err(|e| failed(e.to_string()))?;
            Ok::<_, ReactforceError>(body.to_vec())
        };

        match self.step_timeout {
            Some(limit) => tokio::time::timeout(limit, transfer)
                .await
                .map_err(|_| failed(format!("timed out after {limit:?}")))?,
            None => transfer.await,
        }
    }
}

fn clone_args(url: &Url, branch: &str, destination: &Path) -> Vec<String> {
    let mut args = vec!["clone".to_string(), "--branch".to_string(), branch.to_string()];
    if branch == "main" || branch == "master" {
        args.push("--depth".to_string());
        args.push("1".to_string());
    }
    args.push(url.to_string());
    args.push(destination.to_string_lossy().into_owned());
    args
}

fn remove_git_metadata(destination: &Path) -> Result<()> {
    let git_dir = destination.join(".git");
    match std::fs::remove_dir_all(&git_dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ReactforceError::io("remove", git_dir, e)),
    }
}

/// Extract a GitHub branch archive, dropping its `<repo>-<branch>/` top directory
pub fn extract_archive(zip_bytes: &[u8], destination: &Path) -> Result<()> {
    let corrupt = |details: String| ReactforceError::CloneFailed {
        url: destination.display().to_string(),
        details,
    };
    let mut archive =
        ZipArchive::new(Cursor::new(zip_bytes)).map_err(|e| corrupt(e.to_string()))?;

    std::fs::create_dir_all(destination)
        .map_err(|e| ReactforceError::io("create directory", destination, e))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| corrupt(e.to_string()))?;
        let Some(enclosed) = file.enclosed_name() else {
            return Err(corrupt(format!("unsafe path in archive: {}", file.name())));
        };
        let relative: PathBuf = enclosed
            .components()
            .skip(1)
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = destination.join(&relative);
        if file.is_dir() {
            std::fs::create_dir_all(&target)
                .map_err(|e| ReactforceError::io("create directory", &target, e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ReactforceError::io("create directory", parent, e))?;
        }
        let mut out = std::fs::File::create(&target)
            .map_err(|e| ReactforceError::io("create", &target, e))?;
        std::io::copy(&mut file, &mut out).map_err(|e| ReactforceError::io("write", &target, e))?;
    }

    Ok(())
}
