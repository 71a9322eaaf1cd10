use std::collections::HashMap;
use std::process::{Command, Output};

use crate::errors::PipetteError;

/// Builder for running an external program and capturing its output.
///
/// Used to query the Python interpreter about its environment.
pub struct CommandBuilder {
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl CommandBuilder {
    /// Create a new builder for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Execute the command and return its raw output.
    pub fn exec(&self) -> Result<Output, PipetteError> {
        tracing::debug!("running {} {:?}", self.program, self.args);
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        cmd.output().map_err(PipetteError::from)
    }

    /// Execute the command and return its stdout, failing on a non-zero exit.
    pub fn stdout(&self) -> Result<String, PipetteError> {
        let output = self.exec()?;
        if !output.status.success() {
            return Err(PipetteError::Generic {
                message: format!(
                    "`{}` exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
