//! Charm-style progress output using cliclack

use crate::names::AppName;
use crate::report::Reporter;
use anyhow::Result;
use cliclack::ProgressBar;
use std::sync::Mutex;

/// Renders flow progress as cliclack spinners and log lines
#[derive(Default)]
pub struct CliclackReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliclackReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|mut guard| guard.take())
    }
}

// Terminal write failures are not worth aborting a run over, so the
// io::Result values returned by cliclack are dropped.
impl Reporter for CliclackReporter {
    fn intro(&self, title: &str) {
        let _ = cliclack::intro(title);
    }

    fn step_started(&self, message: &str) {
        let spinner = cliclack::spinner();
        spinner.start(message);
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(previous) = guard.replace(spinner) {
                previous.stop("");
            }
        }
    }

    fn step_finished(&self, message: &str) {
        match self.take_spinner() {
            Some(spinner) => spinner.stop(message),
            None => {
                let _ = cliclack::log::success(message);
            }
        }
    }

    fn step_failed(&self, message: &str) {
        match self.take_spinner() {
            Some(spinner) => spinner.error(message),
            None => {
                let _ = cliclack::log::error(message);
            }
        }
        let _ = console::Term::stderr().show_cursor();
    }

    fn info(&self, message: &str) {
        let _ = cliclack::log::info(message);
    }

    fn warning(&self, message: &str) {
        let _ = cliclack::log::warning(message);
    }

    fn success(&self, message: &str) {
        let _ = cliclack::log::success(message);
    }

    fn outro(&self, message: &str) {
        let _ = cliclack::outro(message);
        let _ = console::Term::stderr().show_cursor();
    }
}

/// Ask for the app name until a valid one is entered
pub fn prompt_app_name() -> Result<AppName> {
    loop {
        let raw: String = cliclack::input("App name")
            .placeholder("CustomerPortal")
            .interact()?;
        match AppName::parse(raw.trim()) {
            Ok(name) => return Ok(name),
            Err(e) => cliclack::log::error(e.to_string())?,
        }
    }
}
