// Final link and code extraction. The TVM linker runs inside a dedicated working directory
// (a scoped temporary directory, or the invocation directory under save-temps) with the merged
// assembly, the standard library artifact, the absolute ABI path and the user's linker flags.
// When the link directory is temporary, every file the linker produced is copied out to the
// resolved output location before the directory is dropped. With an explicit output the
// linked contract is then decoded and the first `code:` line of the report is written to the
// `<output>.code` sidecar; a report without such a line is an error.

//! TVM linking and embedded code extraction.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::BuildPipeline;
use crate::core::{BuildError, BuildOptions, BuildResult, ToolInvocation, ToolRunner};

/// Resolved destination of the final link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Explicit output file (absolute).
    File(PathBuf),
    /// No output given: everything lands in this directory.
    Dir(PathBuf),
}

impl OutputTarget {
    /// Resolve `--output` against the invocation working directory.
    pub fn resolve(output: Option<&Path>, working_dir: &Path) -> Self {
        match output {
            None => OutputTarget::Dir(working_dir.to_path_buf()),
            Some(path) if path.is_absolute() => OutputTarget::File(path.to_path_buf()),
            Some(path) => OutputTarget::File(working_dir.join(path)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            OutputTarget::File(path) | OutputTarget::Dir(path) => path,
        }
    }

    /// Destination for a file named `name` that the linker produced.
    ///
    /// `linked_name` is the name the linker was told to write, if any.
    fn destination(&self, name: &Path, linked_name: Option<&Path>) -> PathBuf {
        match self {
            OutputTarget::Dir(dir) => dir.join(name),
            OutputTarget::File(file) if linked_name == Some(name) => file.clone(),
            OutputTarget::File(file) => file.parent().unwrap_or(Path::new(".")).join(name),
        }
    }
}

/// `<output>.code`
pub fn sidecar_path(output: &Path) -> PathBuf {
    let mut path = OsString::from(output.as_os_str());
    path.push(".code");
    PathBuf::from(path)
}

/// First `code: <value>` line of a decoder report.
pub fn parse_embedded_code(report: &str) -> Option<&str> {
    report
        .lines()
        .find_map(|line| line.trim_start().strip_prefix("code: "))
        .map(str::trim_end)
}

/// `tvm_linker compile <asm> --lib <stdlib> --abi-json <abi> [<flags>] [-o <output>]`
pub fn compile_invocation(
    options: &BuildOptions,
    asm: &Path,
    abi: &Path,
    output: Option<&Path>,
) -> ToolInvocation {
    let mut invocation = ToolInvocation::new(&options.tools.linker)
        .arg("compile")
        .arg(asm)
        .arg("--lib")
        .arg(options.tools.stdlib_artifact())
        .arg("--abi-json")
        .arg(abi)
        .args(&options.linker_flags);
    if let Some(output) = output {
        invocation = invocation.arg("-o").arg(output);
    }
    invocation
}

/// `tvm_linker decode <output> --tvc`
pub fn decode_invocation(options: &BuildOptions, output: &Path) -> ToolInvocation {
    ToolInvocation::new(&options.tools.linker)
        .arg("decode")
        .arg(output)
        .arg("--tvc")
}

impl<R: ToolRunner> BuildPipeline<'_, R> {
    /// Link the merged assembly into a contract.
    pub fn final_link(&mut self, asm: &Path) -> BuildResult<OutputTarget> {
        let target =
            OutputTarget::resolve(self.options.output.as_deref(), &self.options.working_dir);
        let abi = self.absolute(&self.options.abi);
        let link_dir = self.store.link_dir()?;
        if link_dir.is_scoped() {
            self.runner.echo(&format!("cd {}", link_dir.path().display()));
        }

        // A scoped directory only receives the bare file name; it is copied out below.
        let linked_name = match &self.options.output {
            Some(output) if link_dir.is_scoped() => output.file_name().map(PathBuf::from),
            Some(output) => Some(output.clone()),
            None => None,
        };

        let invocation = compile_invocation(self.options, asm, &abi, linked_name.as_deref())
            .current_dir(link_dir.path());
        self.runner.run(&invocation)?;

        if link_dir.is_scoped() {
            self.copy_out(link_dir.path(), &target, linked_name.as_deref())?;
        }
        log::info!("contract written to {}", target.path().display());
        Ok(target)
    }

    fn copy_out(
        &mut self,
        link_dir: &Path,
        target: &OutputTarget,
        linked_name: Option<&Path>,
    ) -> BuildResult<()> {
        let entries = fs::read_dir(link_dir)
            .map_err(|e| BuildError::io(format!("reading {}", link_dir.display()), e))?;
        let mut produced = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| BuildError::io(format!("reading {}", link_dir.display()), e))?;
            if entry.path().is_file() {
                produced.push(entry.path());
            }
        }
        produced.sort();

        for source in produced {
            let Some(name) = source.file_name().map(Path::new) else {
                continue;
            };
            let dest = target.destination(name, linked_name);
            self.runner
                .echo(&format!("cp {} {}", name.display(), dest.display()));
            fs::copy(&source, &dest)
                .map_err(|e| BuildError::io(format!("copying to {}", dest.display()), e))?;
        }
        Ok(())
    }

    /// Decode the linked contract and write its code to `<output>.code`.
    pub fn extract_code(&mut self, output: &Path) -> BuildResult<PathBuf> {
        let invocation =
            decode_invocation(self.options, output).current_dir(&self.options.working_dir);
        let report = self.runner.run(&invocation)?;
        let code = parse_embedded_code(&report).ok_or_else(|| BuildError::ExtractionParse {
            artifact: output.to_path_buf(),
        })?;

        let sidecar = sidecar_path(output);
        fs::write(&sidecar, code)
            .map_err(|e| BuildError::io(format!("writing {}", sidecar.display()), e))?;
        log::info!("code written to {}", sidecar.display());
        Ok(sidecar)
    }
}
