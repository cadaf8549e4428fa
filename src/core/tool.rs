// This module is the single place where the driver starts external programs. ToolInvocation
// describes one command (program, ordered arguments, optional working directory) and renders
// the exact command line for verbose echo. The ToolRunner trait is the seam the pipeline calls
// through; ProcessRunner implements it with std::process::Command, blocking until the child
// exits. Only stdout is captured: it is returned on success and carried by the
// ToolInvocation error on a non-zero exit. Stderr is inherited so tool warnings and
// diagnostics reach the terminal as the tool runs. The working directory is set
// on the child process only, so the driver's own current directory never changes.

//! External tool invocation.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::error::{BuildError, BuildResult};

/// One command line to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Directory the child runs in; inherited when `None`.
    pub working_dir: Option<PathBuf>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Short tool name for messages (`clang++`, `opt`, ...).
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Arguments as UTF-8 strings (lossy), mostly for tests and logs.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Value following the first `-o` argument.
    pub fn output_arg(&self) -> Option<&Path> {
        let pos = self.args.iter().position(|a| a == "-o")?;
        self.args.get(pos + 1).map(Path::new)
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Executes tool invocations on behalf of the pipeline.
pub trait ToolRunner {
    /// Run `invocation` to completion and return its standard output.
    ///
    /// A non-zero exit must be reported as [`BuildError::ToolInvocation`].
    fn run(&mut self, invocation: &ToolInvocation) -> BuildResult<String>;

    /// Report an action the driver performs itself (`cp`, `cat`, `cd`).
    fn echo(&mut self, _line: &str) {}
}

/// Runs tools as child processes.
#[derive(Debug, Default)]
pub struct ProcessRunner {
    verbose: bool,
}

impl ProcessRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&mut self, invocation: &ToolInvocation) -> BuildResult<String> {
        if self.verbose {
            println!("{invocation}");
        }
        log::debug!("exec: {invocation}");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).stderr(Stdio::inherit());
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| BuildError::ToolSpawn {
            tool: invocation.program.display().to_string(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(BuildError::ToolInvocation {
                tool: invocation.tool_name(),
                status: output.status,
                output: stdout,
            });
        }
        Ok(stdout)
    }

    fn echo(&mut self, line: &str) {
        if self.verbose {
            println!("{line}");
        }
        log::debug!("{line}");
    }
}
