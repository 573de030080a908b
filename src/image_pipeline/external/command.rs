use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Program plus argument vector. Arguments are passed to the OS verbatim, so
/// file names need no quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Runs to completion. Child output is discarded unless `verbose`.
    pub fn run(&self, verbose: bool) -> Result<()> {
        debug!("Running {}", self);
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if !verbose {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let status = command.status().map_err(|e| {
            ConversionError::ExternalToolFailure(format!("{}: {}", self.program.display(), e))
        })?;

        if !status.success() {
            return Err(ConversionError::ExternalToolFailure(format!(
                "{} exited with {}",
                self, status
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
