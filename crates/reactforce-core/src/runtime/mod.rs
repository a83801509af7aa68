//! External tool detection and invocation
//!
//! This module provides:
//! - Detection of git and the Node.js toolchain
//! - A process runner that takes its working directory as a parameter

pub mod check;
pub mod tool;

pub use check::{check_tool, check_tools, Tool, ToolInfo};
pub use tool::{CommandRunner, Invocation, ProcessRunner};
