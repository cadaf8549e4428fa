// Code generation stage: llc lowers the optimized module to TVM assembly, then any raw assembly
// inputs are appended to it verbatim, in input order, with no validation of the result. In
// assembly-only mode the merged file is copied to the requested output, or next to the ABI
// descriptor with an `.s` extension, and the run stops there.

//! Assembly generation, merging and assembly-only output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::BuildPipeline;
use crate::core::{
    ArtifactKind, BuildError, BuildOptions, BuildResult, ClassifiedInputs, ToolInvocation,
    ToolRunner, TARGET,
};

/// `llc -march tvm <in> -o <out>`
pub fn llc_invocation(options: &BuildOptions, input: &Path, out: &Path) -> ToolInvocation {
    ToolInvocation::new(options.tools.llvm_tool("llc"))
        .args(["-march", TARGET])
        .arg(input)
        .arg("-o")
        .arg(out)
}

/// Where assembly-only output goes: `--output`, else the ABI path with `.s`.
pub fn assembly_output_path(options: &BuildOptions) -> PathBuf {
    match &options.output {
        Some(output) => output.clone(),
        None => options.abi.with_extension("s"),
    }
}

impl<R: ToolRunner> BuildPipeline<'_, R> {
    /// Lower the optimized module to assembly.
    pub fn codegen(&mut self, optimized: &Path) -> BuildResult<PathBuf> {
        let out = self.store.new_artifact(ArtifactKind::Codegen)?;
        let invocation =
            llc_invocation(self.options, optimized, &out).current_dir(&self.options.working_dir);
        self.runner.run(&invocation)?;
        Ok(out)
    }

    /// Append raw assembly inputs to the generated assembly.
    pub fn merge_assembly(&mut self, asm: &Path, inputs: &ClassifiedInputs) -> BuildResult<()> {
        if inputs.assembly.is_empty() {
            return Ok(());
        }

        let names: Vec<String> = inputs
            .assembly
            .iter()
            .map(|f| f.path.display().to_string())
            .collect();
        self.runner
            .echo(&format!("cat {} >>{}", names.join(" "), asm.display()));

        let mut target = fs::OpenOptions::new()
            .append(true)
            .open(asm)
            .map_err(|e| BuildError::io(format!("opening {}", asm.display()), e))?;
        for input in &inputs.assembly {
            let path = self.absolute(&input.path);
            let contents = fs::read(&path)
                .map_err(|e| BuildError::io(format!("reading {}", path.display()), e))?;
            target
                .write_all(&contents)
                .map_err(|e| BuildError::io(format!("appending to {}", asm.display()), e))?;
        }
        Ok(())
    }

    /// Copy the merged assembly to its final location (assembly-only mode).
    pub fn emit_assembly(&mut self, asm: &Path) -> BuildResult<PathBuf> {
        let dest = self.absolute(&assembly_output_path(self.options));
        // Under save-temps the output may name the llc artifact itself.
        if is_same_file(asm, &dest) {
            log::info!("assembly already at {}", dest.display());
            return Ok(dest);
        }
        self.runner
            .echo(&format!("cp {} {}", asm.display(), dest.display()));
        fs::copy(asm, &dest)
            .map_err(|e| BuildError::io(format!("copying to {}", dest.display()), e))?;
        log::info!("assembly written to {}", dest.display());
        Ok(dest)
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
