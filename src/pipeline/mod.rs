// This module drives a build run from classified inputs to a linked contract. BuildPipeline
// owns the artifact store and the tool runner and borrows the resolved options; each stage
// group lives in its own submodule and extends `impl BuildPipeline` with its stage methods.
// Control flow is strictly linear: classify, compile C/C++ and assemble IR text, link all
// modules, internalize, optimize, generate assembly, append raw assembly inputs, then either
// stop with an assembly file or run the final link and extract the embedded code. The first
// failing stage ends the run; the artifact store is cleaned up on every exit path.

//! Build pipeline orchestration.
//!
//! ```text
//! classify -> frontend / llvm-as -> llvm-link -> opt -internalize -> opt -O3
//!          -> llc -> append .s inputs -> [asm-only: copy and stop]
//!          -> tvm_linker compile -> tvm_linker decode -> <output>.code
//! ```

pub mod codegen;
pub mod final_link;
pub mod frontend;
pub mod link;
pub mod optimize;

use std::path::{Path, PathBuf};

use crate::core::{
    classify, ArtifactStore, BuildError, BuildOptions, BuildResult, ClassifiedInputs, ToolRunner,
};

pub use final_link::{parse_embedded_code, sidecar_path, OutputTarget};

/// An intermediate module headed for `llvm-link`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrModule {
    /// Command-line position of the input it came from.
    pub position: usize,
    pub path: PathBuf,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Assembly-only mode: the merged assembly file.
    Assembly { path: PathBuf },
    /// Linked contract and, with an explicit output, its code sidecar.
    Linked {
        output: OutputTarget,
        code_file: Option<PathBuf>,
    },
}

/// One build run.
pub struct BuildPipeline<'o, R: ToolRunner> {
    options: &'o BuildOptions,
    runner: R,
    store: ArtifactStore,
}

impl<'o, R: ToolRunner> BuildPipeline<'o, R> {
    /// Create a pipeline; the artifact backend follows `options.save_temps`.
    pub fn new(options: &'o BuildOptions, runner: R) -> BuildResult<Self> {
        let store = ArtifactStore::for_run(options.save_temps, &options.working_dir)?;
        Ok(Self {
            options,
            runner,
            store,
        })
    }

    pub fn options(&self) -> &BuildOptions {
        self.options
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Run every stage, then clean up regardless of the result.
    pub fn run<P: AsRef<Path>>(&mut self, inputs: &[P]) -> BuildResult<BuildOutcome> {
        let result = self.run_stages(inputs);
        self.store.cleanup();
        match &result {
            Ok(outcome) => log::info!("build finished: {outcome:?}"),
            Err(err) => log::debug!("build failed: {err}"),
        }
        result
    }

    fn run_stages<P: AsRef<Path>>(&mut self, inputs: &[P]) -> BuildResult<BuildOutcome> {
        let inputs = classify(inputs)?;
        self.check_inputs_exist(&inputs)?;

        let mut modules = self.compile_sources(&inputs)?;
        modules.extend(self.assemble_ir(&inputs)?);
        modules.extend(inputs.ir_binary.iter().map(|f| IrModule {
            position: f.position,
            path: f.path.clone(),
        }));

        let linked = self.link_modules(modules)?;
        let internalized = self.internalize(&linked)?;
        let optimized = self.optimize(&internalized)?;
        let asm = self.codegen(&optimized)?;
        self.merge_assembly(&asm, &inputs)?;

        if self.options.asm_only {
            let path = self.emit_assembly(&asm)?;
            return Ok(BuildOutcome::Assembly { path });
        }

        let output = self.final_link(&asm)?;
        let code_file = match &output {
            OutputTarget::File(path) => Some(self.extract_code(path)?),
            OutputTarget::Dir(_) => None,
        };
        Ok(BuildOutcome::Linked { output, code_file })
    }

    /// Resolve `path` against the invocation working directory.
    pub(crate) fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.options.working_dir.join(path)
        }
    }

    fn check_inputs_exist(&self, inputs: &ClassifiedInputs) -> BuildResult<()> {
        let files = [
            &inputs.cxx,
            &inputs.c,
            &inputs.ir_text,
            &inputs.ir_binary,
            &inputs.assembly,
        ];
        for file in files.into_iter().flatten() {
            if !self.absolute(&file.path).exists() {
                return Err(BuildError::MissingInput {
                    path: file.path.clone(),
                });
            }
        }
        if !self.options.asm_only && !self.absolute(&self.options.abi).exists() {
            return Err(BuildError::MissingInput {
                path: self.options.abi.clone(),
            });
        }
        Ok(())
    }
}
