//! tvm-build - build driver for TON virtual machine contracts.
//!
//! Takes C, C++, LLVM IR text, LLVM bitcode and raw TVM assembly inputs plus
//! an ABI descriptor, and drives the external toolchain (clang, llvm-as,
//! llvm-link, opt, llc, tvm_linker) to a linked contract and its extracted
//! code.
//!
//! # Primary Usage
//!
//! ```ignore
//! use tvm_build::core::{BuildOptions, ProcessRunner, ToolPaths, PathOverrides};
//! use tvm_build::pipeline::BuildPipeline;
//!
//! let tools = ToolPaths::from_env(&PathOverrides::default())?;
//! let options = BuildOptions::new(tools, "wallet.abi", std::env::current_dir()?);
//! let mut pipeline = BuildPipeline::new(&options, ProcessRunner::new(false))?;
//! let outcome = pipeline.run(&["wallet.cpp"])?;
//! ```
//!
//! # Architecture
//!
//! - [`core`] - errors, input classification, artifacts, tool invocation, options
//! - [`pipeline`] - the build stages, from frontend to code extraction
//! - [`cli`] - command-line parsing and the process entry point

pub mod cli;
pub mod core;
pub mod pipeline;

pub use crate::core::{
    BuildError, BuildOptions, BuildResult, ProcessRunner, ToolInvocation, ToolRunner,
};
pub use crate::pipeline::{BuildOutcome, BuildPipeline};
