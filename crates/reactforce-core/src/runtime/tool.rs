//! External tool invocation
//!
//! Every invocation names its working directory explicitly; the process-wide
//! current directory is never changed.

use super::check::{check_tools, Tool, ToolInfo};
use crate::error::{ReactforceError, Result};
use colored::Colorize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// A single external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I, cwd: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.as_ref().to_path_buf(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command line as shown to the user
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs external commands to completion
pub trait CommandRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<()>> + Send;

    /// Fail early when a tool a step needs is not installed
    fn ensure_available(&self, tools: &[Tool]) -> Result<Vec<ToolInfo>> {
        check_tools(tools)
    }
}

/// Runs commands as child processes, optionally echoing their output
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    stream_output: bool,
}

impl ProcessRunner {
    /// `stream_output` prints the child's stdout/stderr lines as they arrive;
    /// otherwise output is discarded and only the exit status matters.
    pub fn new(stream_output: bool) -> Self {
        Self { stream_output }
    }

    async fn run_child(&self, invocation: &Invocation) -> Result<()> {
        let command = invocation.display();
        tracing::debug!(%command, cwd = %invocation.cwd.display(), "spawning");

        let output = if self.stream_output {
            Stdio::piped()
        } else {
            Stdio::null()
        };
        let errors = if self.stream_output {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        let mut child = TokioCommand::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(output)
            .stderr(errors)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ReactforceError::ToolSpawn {
                command: command.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let work = async {
            let echo_out = async {
                if let Some(stdout) = stdout {
                    let mut lines = BufReader::new(stdout).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        println!("  {}", line.dimmed());
                    }
                }
            };
            let echo_err = async {
                if let Some(stderr) = stderr {
                    let mut lines = BufReader::new(stderr).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        eprintln!("  {}", line.yellow());
                    }
                }
            };
            tokio::join!(echo_out, echo_err);
            child.wait().await
        };

        let status = match invocation.timeout {
            Some(limit) => match timeout(limit, work).await {
                Ok(status) => status,
                Err(_) => {
                    // kill_on_drop reaps the child once `work` is dropped
                    return Err(ReactforceError::ToolTimeout {
                        command,
                        secs: limit.as_secs(),
                    });
                }
            },
            None => work.await,
        }
        .map_err(|source| ReactforceError::ToolSpawn {
            command: command.clone(),
            source,
        })?;

        tracing::debug!(%command, code = ?status.code(), "finished");
        if status.success() {
            Ok(())
        } else {
            Err(ReactforceError::ToolFailed {
                command,
                code: status.code(),
            })
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<()>> + Send {
        self.run_child(invocation)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records invocations instead of running them
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        calls: Mutex<Vec<Invocation>>,
        fail_program: Option<String>,
    }

    impl RecordingRunner {
        pub fn failing(program: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_program: Some(program.to_string()),
            }
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        pub fn commands(&self) -> Vec<String> {
            self.calls().iter().map(Invocation::display).collect()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<()>> + Send {
            self.calls.lock().unwrap().push(invocation.clone());
            let result = match &self.fail_program {
                Some(p) if *p == invocation.program => Err(ReactforceError::ToolFailed {
                    command: invocation.display(),
                    code: Some(1),
                }),
                _ => Ok(()),
            };
            async move { result }
        }

        fn ensure_available(&self, _tools: &[Tool]) -> Result<Vec<ToolInfo>> {
            Ok(Vec::new())
        }
    }
}
