// This module groups the infrastructure every pipeline stage builds on: the error taxonomy,
// input classification by extension, the artifact store that owns intermediate files, the
// tool invocation seam used to start external programs, and the resolved build options.
// None of these know about stage ordering; that lives in the pipeline module.

//! Core build driver infrastructure.
//!
//! # Key Components
//!
//! - [`error`] - `BuildError` and the `BuildResult` alias
//! - [`input`] - classifying command-line inputs by extension
//! - [`artifact`] - temporary or numbered intermediate files and their cleanup
//! - [`tool`] - `ToolInvocation`, the `ToolRunner` trait and `ProcessRunner`
//! - [`options`] - `BuildOptions`, tool path resolution and the entry point list

pub mod artifact;
pub mod error;
pub mod input;
pub mod options;
pub mod tool;

pub use artifact::{Artifact, ArtifactKind, ArtifactStore, LinkDir};
pub use error::{BuildError, BuildResult, SUPPORTED_EXTENSIONS};
pub use input::{classify, ClassifiedInputs, InputFile, InputKind};
pub use options::{BuildOptions, PathOverrides, ToolPaths, ENTRY_POINTS, STDLIB_ARTIFACT, TARGET};
pub use tool::{ProcessRunner, ToolInvocation, ToolRunner};
