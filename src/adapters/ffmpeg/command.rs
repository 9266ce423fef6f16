//! Blocking external tool invocation

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, error};

use crate::domain::errors::BackendError;

/// Lines of stderr kept in a failure report
const STDERR_TAIL_LINES: usize = 20;

/// Builder for one external tool invocation
#[derive(Debug, Clone)]
pub(crate) struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Shell-like rendering for logs
    pub fn display(&self) -> String {
        let mut rendered = self.program.to_string_lossy().to_string();
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            rendered.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                rendered.push('"');
                rendered.push_str(&arg);
                rendered.push('"');
            } else {
                rendered.push_str(&arg);
            }
        }
        rendered
    }

    /// Run to completion and return stdout, failing on a non-zero exit status.
    ///
    /// Stderr of a successful run is only logged.
    pub fn run(&self) -> Result<String, BackendError> {
        let tool = self.tool_name();
        debug!(command = %self.display(), "Running {}", tool);

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| {
                error!("Failed to launch {}: {}", tool, source);
                BackendError::Spawn {
                    tool: tool.clone(),
                    source,
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            error!("{} failed with {}", tool, output.status);
            return Err(BackendError::ToolFailed {
                tool,
                status: output.status.to_string(),
                stderr: tail(&stderr, STDERR_TAIL_LINES),
            });
        }

        if !stderr.is_empty() {
            debug!(stderr = %tail(&stderr, STDERR_TAIL_LINES), "{} reported warnings", tool);
        }
        Ok(stdout)
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let skip = all.len().saturating_sub(lines);
    all[skip..].join("\n")
}
