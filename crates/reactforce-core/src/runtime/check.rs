//! Detection of the external tools the flows shell out to

use crate::error::{ReactforceError, Result};
use serde::Serialize;
use std::fmt;
use std::process::Command;

/// External tools used by `init` and `create`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Git,
    Node,
    Npm,
    Npx,
}

impl Tool {
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::Git => "git",
            Tool::Node => "node",
            Tool::Npm => "npm",
            Tool::Npx => "npx",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Git => "Git",
            Tool::Node => "Node.js",
            Tool::Npm => "npm",
            Tool::Npx => "npx",
        }
    }

    fn install_hint(&self) -> &'static str {
        match self {
            Tool::Git => "install from https://git-scm.com",
            Tool::Node | Tool::Npm | Tool::Npx => "install Node.js from https://nodejs.org",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tool detection result
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub tool: Tool,
    pub version: Option<String>,
    pub available: bool,
}

/// Check if a tool answers `--version`
pub fn check_tool(tool: Tool) -> ToolInfo {
    let output = Command::new(tool.binary()).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            ToolInfo {
                tool,
                version: Some(version),
                available: true,
            }
        }
        _ => ToolInfo {
            tool,
            version: None,
            available: false,
        },
    }
}

/// Check every tool in `tools`, failing with the full list of missing ones
pub fn check_tools(tools: &[Tool]) -> Result<Vec<ToolInfo>> {
    check_tools_with(tools, check_tool)
}

fn check_tools_with(tools: &[Tool], probe: impl Fn(Tool) -> ToolInfo) -> Result<Vec<ToolInfo>> {
    let mut results = Vec::new();
    let mut missing = Vec::new();

    for tool in tools {
        let info = probe(*tool);
        tracing::debug!(tool = tool.binary(), version = ?info.version, "tool check");
        if info.available {
            results.push(info);
        } else {
            missing.push(format!("  - {} ({})", tool.display_name(), tool.install_hint()));
        }
    }

    if !missing.is_empty() {
        return Err(ReactforceError::MissingTools(missing.join("\n")));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake(available: &'static [Tool]) -> impl Fn(Tool) -> ToolInfo {
        move |tool| ToolInfo {
            tool,
            version: available.contains(&tool).then(|| "1.0.0".to_string()),
            available: available.contains(&tool),
        }
    }

    #[test]
    fn test_all_tools_present() {
        let infos = check_tools_with(&[Tool::Git, Tool::Npm], fake(&[Tool::Git, Tool::Npm])).unwrap();
        assert_eq!(infos.len(), 2);
    }

    #[test]
    fn test_missing_tools_are_listed_together() {
        let err = check_tools_with(&[Tool::Git, Tool::Npx, Tool::Npm], fake(&[Tool::Npm])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Git"));
        assert!(message.contains("npx"));
        assert!(!message.contains("- npm"));
    }

    #[test]
    fn test_version_reported_only_when_available() {
        let info = check_tool(Tool::Git);
        assert_eq!(info.available, info.version.is_some());
    }
}
