// Command-line surface of the driver, parsed with clap's derive API. Args mirrors the options
// of the build tool: the required ABI descriptor, one or more inputs, per-stage flag strings,
// mode switches and explicit toolchain paths. into_options() turns the parsed arguments plus
// the resolved tool paths into the immutable BuildOptions shared by every stage.

//! Command-line arguments.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::core::options::{default_cflags, default_cxxflags, default_opt_flags, split_flags};
use crate::core::{BuildError, BuildOptions, BuildResult, PathOverrides, ProcessRunner, ToolPaths};
use crate::pipeline::{BuildOutcome, BuildPipeline};

/// Tool for building a C++ contract for the TON virtual machine.
#[derive(Parser, Debug, Clone)]
#[command(name = "tvm-build", version, about)]
pub struct Args {
    /// ABI description file
    #[arg(short = 'A', long, value_name = "FILE")]
    pub abi: PathBuf,

    /// .c, .cc, .cpp, .cxx, .ll, .bc, .s, .S files
    #[arg(value_name = "file", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Print command lines of child processes
    #[arg(short, long)]
    pub verbose: bool,

    /// Store intermediate files in the working directory and don't delete them
    #[arg(long)]
    pub save_temps: bool,

    /// Bag-of-cells output file name
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Flags and options for C frontend
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub cflags: Option<String>,

    /// Flags and options for C++ frontend
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub cxxflags: Option<String>,

    /// Flags for tvm_linker
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub linkerflags: Option<String>,

    /// Flags and options for LLVM optimizer
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub opt_flags: Option<String>,

    /// Produce assembler output
    #[arg(short = 'S', long)]
    pub asm_only: bool,

    /// Experimental inlining of loads/stores
    #[arg(long)]
    pub inline_loads_stores: bool,

    /// Path to LLVM binaries directory
    #[arg(long, value_name = "DIR")]
    pub llvm_bin: Option<PathBuf>,

    /// Path to TVM linker executable
    #[arg(long, value_name = "FILE")]
    pub linker: Option<PathBuf>,

    /// Path to standard library directory
    #[arg(long, value_name = "DIR")]
    pub stdlib: Option<PathBuf>,

    /// Path to standard include directory
    #[arg(long, value_name = "DIR")]
    pub include: Option<PathBuf>,
}

impl Args {
    pub fn path_overrides(&self) -> PathOverrides {
        PathOverrides {
            llvm_bin: self.llvm_bin.clone(),
            linker: self.linker.clone(),
            stdlib: self.stdlib.clone(),
            include: self.include.clone(),
        }
    }

    /// Build the run configuration from these arguments.
    pub fn into_options(self, tools: ToolPaths, working_dir: &Path) -> BuildOptions {
        BuildOptions {
            tools,
            cflags: default_cflags(self.cflags.as_deref()),
            cxxflags: default_cxxflags(self.cxxflags.as_deref()),
            linker_flags: split_flags(self.linkerflags.as_deref()),
            opt_flags: default_opt_flags(self.opt_flags.as_deref()),
            abi: self.abi,
            output: self.output,
            working_dir: working_dir.to_path_buf(),
            asm_only: self.asm_only,
            save_temps: self.save_temps,
            verbose: self.verbose,
            inline_loads_stores: self.inline_loads_stores,
        }
    }
}

/// Resolve configuration from the process environment and run the build.
pub fn run(args: Args) -> BuildResult<BuildOutcome> {
    let tools = ToolPaths::from_env(&args.path_overrides())?;
    let working_dir = std::env::current_dir()
        .map_err(|e| BuildError::io("reading current directory", e))?;
    let inputs = args.inputs.clone();
    let options = args.into_options(tools, &working_dir);

    let mut pipeline = BuildPipeline::new(&options, ProcessRunner::new(options.verbose))?;
    pipeline.run(&inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools() -> ToolPaths {
        ToolPaths {
            llvm_bin: PathBuf::from("/b"),
            linker: PathBuf::from("/b/tvm_linker"),
            stdlib: PathBuf::from("/l"),
            include: PathBuf::from("/i"),
            sysroot: PathBuf::from("/b/.."),
        }
    }

    #[test]
    fn minimal_command_line_gets_defaults() {
        let args = Args::try_parse_from(["tvm-build", "-A", "wallet.abi", "wallet.cpp"]).unwrap();
        let options = args.into_options(tools(), Path::new("/w"));
        assert_eq!(options.cxxflags, ["-O3"]);
        assert_eq!(options.cflags, ["-O1"]);
        assert_eq!(options.opt_flags, ["-O3"]);
        assert!(options.linker_flags.is_empty());
        assert!(!options.asm_only && !options.save_temps && !options.verbose);
        assert_eq!(options.output, None);
    }

    #[test]
    fn flag_strings_are_split() {
        let args = Args::try_parse_from([
            "tvm-build",
            "--abi",
            "a.abi",
            "--cxxflags",
            "-g -DFOO",
            "--opt-flags=-O1 -inline",
            "--linkerflags",
            "--debug-map map.json",
            "-S",
            "-o",
            "out.s",
            "a.cpp",
            "b.s",
        ])
        .unwrap();
        assert_eq!(args.inputs, [PathBuf::from("a.cpp"), PathBuf::from("b.s")]);
        let options = args.into_options(tools(), Path::new("/w"));
        assert_eq!(options.cxxflags, ["-O3", "-g", "-DFOO"]);
        assert_eq!(options.opt_flags, ["-O1", "-inline"]);
        assert_eq!(options.linker_flags, ["--debug-map", "map.json"]);
        assert!(options.asm_only);
        assert_eq!(options.output, Some(PathBuf::from("out.s")));
    }

    #[test]
    fn abi_and_inputs_are_required() {
        assert!(Args::try_parse_from(["tvm-build", "a.cpp"]).is_err());
        assert!(Args::try_parse_from(["tvm-build", "-A", "a.abi"]).is_err());
    }

    #[test]
    fn path_overrides_are_forwarded() {
        let args = Args::try_parse_from([
            "tvm-build",
            "-A",
            "a.abi",
            "--llvm-bin",
            "/llvm",
            "--linker",
            "/tl",
            "a.c",
        ])
        .unwrap();
        let overrides = args.path_overrides();
        assert_eq!(overrides.llvm_bin, Some(PathBuf::from("/llvm")));
        assert_eq!(overrides.linker, Some(PathBuf::from("/tl")));
        assert_eq!(overrides.stdlib, None);
    }
}
