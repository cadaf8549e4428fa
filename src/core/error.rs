// This module defines the error type shared by every stage of the build driver, using the
// thiserror crate. BuildError covers the full failure taxonomy: unresolvable tool paths,
// input files with an unsupported extension, missing input files, tools that cannot be
// started, tools that exit with a non-zero status (carrying their captured output so the
// binary can echo it), decoder reports without an embedded code line, and plain
// filesystem failures annotated with what the driver was doing at the time. No stage
// recovers from another stage's error; the first one ends the run.

//! Error types for the build driver.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Extensions accepted on the command line, in the order they are reported.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".c", ".cc", ".cpp", ".cxx", ".ll", ".bc", ".s", ".S"];

/// Main error type for a build run.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Use {option} option or set {variable} environment variable")]
    ConfigResolution {
        option: &'static str,
        variable: &'static str,
    },

    #[error(
        "Unsupported input file extension: {}\nSupported extensions: {}",
        path.display(),
        SUPPORTED_EXTENSIONS.join(", ")
    )]
    UnsupportedInputKind { path: PathBuf },

    #[error("No such file: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Failed to execute {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed ({status})")]
    ToolInvocation {
        tool: String,
        status: ExitStatus,
        output: String,
    },

    #[error("No code line found in decoded output of {}", artifact.display())]
    ExtractionParse { artifact: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Wrap an I/O error with a description of the failed operation.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        BuildError::Io {
            context: context.into(),
            source,
        }
    }

    /// Captured tool output worth echoing to the user, if any.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            BuildError::ToolInvocation { output, .. } if !output.is_empty() => Some(output),
            _ => None,
        }
    }
}

/// Result type alias for build operations.
pub type BuildResult<T> = Result<T, BuildError>;
