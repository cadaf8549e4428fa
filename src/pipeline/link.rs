// Link stage: merges every intermediate module (frontend outputs, llvm-as outputs and bitcode
// inputs passed through untouched) into one textual module with llvm-link. Modules are ordered
// by the command-line position of the input they came from, so identical command lines always
// produce identical llvm-link command lines and symbol resolution stays reproducible.

//! IR linking.

use std::path::{Path, PathBuf};

use super::{BuildPipeline, IrModule};
use crate::core::{ArtifactKind, BuildOptions, BuildResult, ToolInvocation, ToolRunner};

/// `llvm-link <files...> -S -o <out>`
pub fn llvm_link_invocation(
    options: &BuildOptions,
    modules: &[IrModule],
    out: &Path,
) -> ToolInvocation {
    ToolInvocation::new(options.tools.llvm_tool("llvm-link"))
        .args(modules.iter().map(|m| m.path.as_os_str()))
        .args(["-S", "-o"])
        .arg(out)
}

impl<R: ToolRunner> BuildPipeline<'_, R> {
    /// Link all modules into one, in input order.
    pub fn link_modules(&mut self, mut modules: Vec<IrModule>) -> BuildResult<PathBuf> {
        modules.sort_by_key(|m| m.position);
        let out = self.store.new_artifact(ArtifactKind::Link)?;
        log::debug!("llvm-link: {} modules", modules.len());
        let invocation = llvm_link_invocation(self.options, &modules, &out)
            .current_dir(&self.options.working_dir);
        self.runner.run(&invocation)?;
        Ok(out)
    }
}
