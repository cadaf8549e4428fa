// Frontend stage: every C++ input goes through clang++ with the install sysroot and every C
// input through clang with the standard include directory, each producing one textual LLVM
// module. Textual IR inputs are assembled by llvm-as into bitcode instead. Each call creates
// exactly one new artifact; the resulting modules keep the command-line position of their
// input so the link stage can order them.

//! C/C++ frontends and IR assembly.

use std::path::Path;

use super::{BuildPipeline, IrModule};
use crate::core::{
    ArtifactKind, BuildOptions, BuildResult, ClassifiedInputs, InputFile, ToolInvocation,
    ToolRunner, TARGET,
};

/// `clang++ -target tvm <cxxflags> -S -emit-llvm <file> -o <out> --sysroot=<root>`
pub fn cxx_invocation(options: &BuildOptions, input: &Path, out: &Path) -> ToolInvocation {
    let mut sysroot = std::ffi::OsString::from("--sysroot=");
    sysroot.push(&options.tools.sysroot);
    ToolInvocation::new(options.tools.llvm_tool("clang++"))
        .args(["-target", TARGET])
        .args(&options.cxxflags)
        .args(["-S", "-emit-llvm"])
        .arg(input)
        .arg("-o")
        .arg(out)
        .arg(sysroot)
}

/// `clang -target tvm -isystem <inc> <cflags> -S -emit-llvm <file> -o <out>`
pub fn c_invocation(options: &BuildOptions, input: &Path, out: &Path) -> ToolInvocation {
    ToolInvocation::new(options.tools.llvm_tool("clang"))
        .args(["-target", TARGET])
        .arg("-isystem")
        .arg(&options.tools.include)
        .args(&options.cflags)
        .args(["-S", "-emit-llvm"])
        .arg(input)
        .arg("-o")
        .arg(out)
}

/// `llvm-as <file> -o <out>`
pub fn llvm_as_invocation(options: &BuildOptions, input: &Path, out: &Path) -> ToolInvocation {
    ToolInvocation::new(options.tools.llvm_tool("llvm-as"))
        .arg(input)
        .arg("-o")
        .arg(out)
}

impl<R: ToolRunner> BuildPipeline<'_, R> {
    /// Compile C++ inputs, then C inputs, into intermediate modules.
    pub fn compile_sources(&mut self, inputs: &ClassifiedInputs) -> BuildResult<Vec<IrModule>> {
        let mut modules = Vec::with_capacity(inputs.cxx.len() + inputs.c.len());
        for input in &inputs.cxx {
            modules.push(self.run_per_input(input, ArtifactKind::Frontend, cxx_invocation)?);
        }
        for input in &inputs.c {
            modules.push(self.run_per_input(input, ArtifactKind::Frontend, c_invocation)?);
        }
        Ok(modules)
    }

    /// Assemble textual IR inputs with `llvm-as`.
    pub fn assemble_ir(&mut self, inputs: &ClassifiedInputs) -> BuildResult<Vec<IrModule>> {
        inputs
            .ir_text
            .iter()
            .map(|input| self.run_per_input(input, ArtifactKind::Assembler, llvm_as_invocation))
            .collect()
    }

    fn run_per_input(
        &mut self,
        input: &InputFile,
        kind: ArtifactKind,
        build: fn(&BuildOptions, &Path, &Path) -> ToolInvocation,
    ) -> BuildResult<IrModule> {
        let out = self.store.new_artifact(kind)?;
        log::debug!("{}: {}", kind.label(), input.path.display());
        let invocation =
            build(self.options, &input.path, &out).current_dir(&self.options.working_dir);
        self.runner.run(&invocation)?;
        Ok(IrModule {
            position: input.position,
            path: out,
        })
    }
}
