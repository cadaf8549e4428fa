// Optimization stage, two opt runs in sequence. The first internalizes every symbol except the
// fixed contract entry points so later passes can drop dead code, optionally preceded by the
// experimental TVM load/store replacement pass. The second applies the general optimization
// level (user flags, or -O3) to the internalized module. Both read and write textual IR.

//! `opt` invocations.

use std::path::{Path, PathBuf};

use super::BuildPipeline;
use crate::core::{
    ArtifactKind, BuildOptions, BuildResult, ToolInvocation, ToolRunner, ENTRY_POINTS,
};

/// `opt <in> -S -o <out> [-tvm-load-store-replace] -internalize`
/// `-internalize-public-api-list=<entry points>`
pub fn internalize_invocation(options: &BuildOptions, input: &Path, out: &Path) -> ToolInvocation {
    let mut invocation = ToolInvocation::new(options.tools.llvm_tool("opt"))
        .arg(input)
        .args(["-S", "-o"])
        .arg(out);
    if options.inline_loads_stores {
        invocation = invocation.arg("-tvm-load-store-replace");
    }
    invocation
        .arg("-internalize")
        .arg(format!("-internalize-public-api-list={}", ENTRY_POINTS.join(",")))
}

/// `opt <flags> -S <in> -o <out>`
pub fn optimize_invocation(options: &BuildOptions, input: &Path, out: &Path) -> ToolInvocation {
    ToolInvocation::new(options.tools.llvm_tool("opt"))
        .args(&options.opt_flags)
        .arg("-S")
        .arg(input)
        .arg("-o")
        .arg(out)
}

impl<R: ToolRunner> BuildPipeline<'_, R> {
    /// Hide everything but the entry points.
    pub fn internalize(&mut self, linked: &Path) -> BuildResult<PathBuf> {
        let out = self.store.new_artifact(ArtifactKind::Internalize)?;
        let invocation = internalize_invocation(self.options, linked, &out)
            .current_dir(&self.options.working_dir);
        self.runner.run(&invocation)?;
        Ok(out)
    }

    /// General optimization of the internalized module.
    pub fn optimize(&mut self, internalized: &Path) -> BuildResult<PathBuf> {
        let out = self.store.new_artifact(ArtifactKind::Optimize)?;
        let invocation = optimize_invocation(self.options, internalized, &out)
            .current_dir(&self.options.working_dir);
        self.runner.run(&invocation)?;
        Ok(out)
    }
}
