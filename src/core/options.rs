// This module holds the resolved configuration of a build run. ToolPaths locates the LLVM
// binaries, the TVM linker, the standard library and the standard include directory with a
// layered lookup: explicit command-line option first, then an environment variable, then a
// default computed from the install tree the driver runs from (used only if it exists), and
// otherwise a configuration error naming both the option and the variable. BuildOptions bundles
// those paths with the per-stage flag lists and mode switches; it is built once and handed to
// every stage by shared reference.

//! Build configuration and tool path resolution.

use std::path::{Path, PathBuf};

use super::error::{BuildError, BuildResult};

/// Target name passed to clang, llc and friends.
pub const TARGET: &str = "tvm";

/// Symbols that stay externally visible through internalization.
pub const ENTRY_POINTS: [&str; 6] = [
    "main_external",
    "main_internal",
    "main_ticktock",
    "main_split",
    "main_merge",
    "get_method",
];

/// Standard library file name inside the library directory.
pub const STDLIB_ARTIFACT: &str = "stdlib_cpp.tvm";

/// Split a user supplied flag string on whitespace.
pub fn split_flags(flags: Option<&str>) -> Vec<String> {
    flags
        .map(|f| f.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

/// Explicit path overrides from the command line.
#[derive(Debug, Default, Clone)]
pub struct PathOverrides {
    pub llvm_bin: Option<PathBuf>,
    pub linker: Option<PathBuf>,
    pub stdlib: Option<PathBuf>,
    pub include: Option<PathBuf>,
}

/// Locations of the external toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    /// Directory with clang, clang++, llvm-as, llvm-link, opt and llc.
    pub llvm_bin: PathBuf,
    /// The `tvm_linker` executable.
    pub linker: PathBuf,
    /// Directory containing the standard library artifact.
    pub stdlib: PathBuf,
    /// Standard include directory for C sources.
    pub include: PathBuf,
    /// Install root passed to clang++ as `--sysroot`.
    pub sysroot: PathBuf,
}

impl ToolPaths {
    /// Resolve every path with option > environment > default > error precedence.
    ///
    /// `install_bin` is the install tree's binary directory, if the driver
    /// runs from one. `env` looks up environment variables.
    pub fn resolve<E>(
        overrides: &PathOverrides,
        install_bin: Option<&Path>,
        env: E,
    ) -> BuildResult<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let default = |rel: &str| install_bin.map(|bin| bin.join(rel));

        let llvm_bin = resolve_path(
            overrides.llvm_bin.as_deref(),
            "--llvm-bin",
            "TVM_LLVM_BINARY_DIR",
            install_bin.map(Path::to_path_buf),
            &env,
        )?;
        let linker = resolve_path(
            overrides.linker.as_deref(),
            "--linker",
            "TVM_LINKER",
            default("tvm_linker"),
            &env,
        )?;
        let stdlib = resolve_path(
            overrides.stdlib.as_deref(),
            "--stdlib",
            "TVM_LIBRARY_PATH",
            default("../lib"),
            &env,
        )?;
        let include = resolve_path(
            overrides.include.as_deref(),
            "--include",
            "TVM_INCLUDE_PATH",
            default("../include"),
            &env,
        )?;
        let sysroot = install_bin.unwrap_or(llvm_bin.as_path()).join("..");

        Ok(Self {
            llvm_bin,
            linker,
            stdlib,
            include,
            sysroot,
        })
    }

    /// Resolve against the real process environment.
    pub fn from_env(overrides: &PathOverrides) -> BuildResult<Self> {
        let install_bin = detect_install_bin();
        Self::resolve(overrides, install_bin.as_deref(), |name| std::env::var(name).ok())
    }

    /// Path of an LLVM tool.
    pub fn llvm_tool(&self, name: &str) -> PathBuf {
        self.llvm_bin.join(name)
    }

    /// Standard library artifact handed to the final linker.
    pub fn stdlib_artifact(&self) -> PathBuf {
        self.stdlib.join(STDLIB_ARTIFACT)
    }
}

fn resolve_path<E>(
    option: Option<&Path>,
    option_name: &'static str,
    variable: &'static str,
    default: Option<PathBuf>,
    env: &E,
) -> BuildResult<PathBuf>
where
    E: Fn(&str) -> Option<String>,
{
    if let Some(path) = option {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = env(variable).filter(|v| !v.is_empty()) {
        log::debug!("{} from {}", option_name, variable);
        return Ok(PathBuf::from(value));
    }
    match default {
        Some(path) if path.exists() => Ok(path),
        _ => Err(BuildError::ConfigResolution {
            option: option_name,
            variable,
        }),
    }
}

/// Directory of the running executable, if it looks like an install tree.
fn detect_install_bin() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?.canonicalize().ok()?;
    let bin = exe.parent()?;
    bin.join("llvm-link").exists().then(|| bin.to_path_buf())
}

/// Fully resolved, read-only configuration of one build run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub tools: ToolPaths,
    /// ABI descriptor as given on the command line.
    pub abi: PathBuf,
    /// Explicit output path as given on the command line.
    pub output: Option<PathBuf>,
    /// Directory the driver was invoked from.
    pub working_dir: PathBuf,
    pub cflags: Vec<String>,
    pub cxxflags: Vec<String>,
    pub linker_flags: Vec<String>,
    pub opt_flags: Vec<String>,
    pub asm_only: bool,
    pub save_temps: bool,
    pub verbose: bool,
    pub inline_loads_stores: bool,
}

impl BuildOptions {
    /// Options with default flags and every switch off.
    pub fn new(tools: ToolPaths, abi: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools,
            abi: abi.into(),
            output: None,
            working_dir: working_dir.into(),
            cflags: default_cflags(None),
            cxxflags: default_cxxflags(None),
            linker_flags: Vec::new(),
            opt_flags: default_opt_flags(None),
            asm_only: false,
            save_temps: false,
            verbose: false,
            inline_loads_stores: false,
        }
    }
}

/// `-O1` followed by the user's C flags.
pub fn default_cflags(user: Option<&str>) -> Vec<String> {
    let mut flags = vec!["-O1".to_string()];
    flags.extend(split_flags(user));
    flags
}

/// `-O3` followed by the user's C++ flags.
pub fn default_cxxflags(user: Option<&str>) -> Vec<String> {
    let mut flags = vec!["-O3".to_string()];
    flags.extend(split_flags(user));
    flags
}

/// The user's optimizer flags, or `-O3` when none are given.
pub fn default_opt_flags(user: Option<&str>) -> Vec<String> {
    let flags = split_flags(user);
    if flags.is_empty() {
        vec!["-O3".to_string()]
    } else {
        flags
    }
}
