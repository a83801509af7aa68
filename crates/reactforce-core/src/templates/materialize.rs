//! Idempotent file materialization
//!
//! A destination that already exists is never touched: the first run wins and
//! hand edits survive re-runs. A missing template source is always an error.

use super::manifest::ManifestEntry;
use super::substitution::{MatchMode, TokenMap};
use crate::error::{ReactforceError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// What happened to one destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Written,
    Skipped,
}

/// Produce `dest` from `source`, unless `dest` already exists.
///
/// With `substitute` the source is read as UTF-8 and every token is replaced;
/// otherwise the bytes are copied as they are.
pub async fn materialize_file(
    source: &Path,
    dest: &Path,
    tokens: &TokenMap,
    substitute: bool,
    mode: MatchMode,
) -> Result<Outcome> {
    if exists(dest).await? {
        tracing::debug!(dest = %dest.display(), "destination exists, skipping");
        return Ok(Outcome::Skipped);
    }
    if !exists(source).await? {
        return Err(ReactforceError::MissingTemplateSource {
            path: source.to_path_buf(),
        });
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ReactforceError::io("create directory", parent, e))?;
    }

    if substitute && !tokens.is_empty() {
        let bytes = fs::read(source)
            .await
            .map_err(|e| ReactforceError::io("read", source, e))?;
        let content = String::from_utf8(bytes).map_err(|_| ReactforceError::TemplateEncoding {
            path: source.to_path_buf(),
        })?;
        let rendered = tokens.compile(mode)?.apply(&content).into_owned();
        fs::write(dest, rendered)
            .await
            .map_err(|e| ReactforceError::io("write", dest, e))?;
    } else {
        fs::copy(source, dest)
            .await
            .map_err(|e| ReactforceError::io("copy to", dest, e))?;
    }

    tracing::debug!(
        source = %source.display(),
        dest = %dest.display(),
        tokens = tokens.pairs().len(),
        "materialized"
    );
    Ok(Outcome::Written)
}

pub async fn materialize(entry: &ManifestEntry, mode: MatchMode) -> Result<Outcome> {
    materialize_file(
        &entry.source,
        &entry.dest,
        &entry.tokens,
        entry.substitute,
        mode,
    )
    .await
}

/// Copy every file under `source` to the same relative path under `dest`.
///
/// Each file is skipped on its own when present, so a partially installed
/// tree is filled in without touching what is already there. Symlinks inside
/// the source are followed and copied as regular files.
pub async fn copy_tree(source: &Path, dest: &Path) -> Result<Vec<(PathBuf, Outcome)>> {
    let walk_root = source.to_path_buf();
    let entries = tokio::task::spawn_blocking(move || walk_tree(&walk_root))
        .await
        .map_err(|e| ReactforceError::io("walk", source, std::io::Error::other(e)))??;

    ensure_dir(dest).await?;
    let mut outcomes = Vec::new();
    for (relative, is_dir) in entries {
        let target = dest.join(&relative);
        if is_dir {
            ensure_dir(&target).await?;
            continue;
        }
        let outcome = materialize_file(
            &source.join(&relative),
            &target,
            &TokenMap::new(),
            false,
            MatchMode::Literal,
        )
        .await?;
        outcomes.push((target, outcome));
    }

    tracing::debug!(source = %source.display(), dest = %dest.display(), files = outcomes.len(), "copied tree");
    Ok(outcomes)
}

/// Relative paths below `source`, parents before children
fn walk_tree(source: &Path) -> Result<Vec<(PathBuf, bool)>> {
    if !source.is_dir() {
        return Err(ReactforceError::MissingTemplateSource {
            path: source.to_path_buf(),
        });
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(source).follow_links(true).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            ReactforceError::io("walk", path, source)
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| ReactforceError::Manifest(format!("{} escaped its root", entry.path().display())))?;
        entries.push((relative.to_path_buf(), entry.file_type().is_dir()));
    }
    Ok(entries)
}

/// Create `dir` (and parents) if absent
pub async fn ensure_dir(dir: &Path) -> Result<Outcome> {
    if exists(dir).await? {
        return Ok(Outcome::Skipped);
    }
    fs::create_dir_all(dir)
        .await
        .map_err(|e| ReactforceError::io("create directory", dir, e))?;
    Ok(Outcome::Written)
}

async fn exists(path: &Path) -> Result<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| ReactforceError::io("inspect", path, e))
}

/// Destinations written and skipped during a run, relative to the project root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl MaterializeReport {
    pub fn record(&mut self, base: &Path, path: &Path, outcome: Outcome) {
        let relative = path.strip_prefix(base).unwrap_or(path).to_path_buf();
        match outcome {
            Outcome::Written => self.written.push(relative),
            Outcome::Skipped => self.skipped.push(relative),
        }
    }
}

/// Applies manifest entries under one project root and keeps score
pub struct Materializer {
    base: PathBuf,
    mode: MatchMode,
    report: MaterializeReport,
}

impl Materializer {
    pub fn new(base: impl Into<PathBuf>, mode: MatchMode) -> Self {
        Self {
            base: base.into(),
            mode,
            report: MaterializeReport::default(),
        }
    }

    pub async fn apply(&mut self, entry: &ManifestEntry) -> Result<Outcome> {
        let outcome = materialize(entry, self.mode).await?;
        self.report.record(&self.base, &entry.dest, outcome);
        Ok(outcome)
    }

    pub async fn apply_all(&mut self, entries: &[ManifestEntry]) -> Result<()> {
        for entry in entries {
            self.apply(entry).await?;
        }
        Ok(())
    }

    /// Copy a directory tree file by file, recording every file
    pub async fn copy_tree(&mut self, source: &Path, dest: &Path) -> Result<()> {
        for (path, outcome) in copy_tree(source, dest).await? {
            self.report.record(&self.base, &path, outcome);
        }
        Ok(())
    }

    pub fn into_report(self) -> MaterializeReport {
        self.report
    }
}
