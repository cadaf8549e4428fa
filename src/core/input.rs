// This module classifies the files given on the command line by extension. Each input is
// placed in exactly one bucket (C, C++, LLVM IR text, LLVM bitcode or TVM assembly) and keeps
// its original command-line position, which later stages use to order the modules handed to
// llvm-link. An unknown extension aborts classification before any tool is invoked.

//! Input file classification.

use std::path::{Path, PathBuf};

use super::error::{BuildError, BuildResult};

/// Kind of an input file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// C++ source, compiled by `clang++` with the install sysroot.
    Cxx,
    /// C source, compiled by `clang` with an explicit system include path.
    C,
    /// Textual LLVM IR, assembled by `llvm-as`.
    IrText,
    /// LLVM bitcode, passed straight to `llvm-link`.
    IrBinary,
    /// TVM assembly, appended to the generated assembly.
    Assembly,
}

impl InputKind {
    /// Map a file path to its kind, or `None` for unsupported extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "c" => Some(InputKind::C),
            "cc" | "cpp" | "cxx" => Some(InputKind::Cxx),
            "ll" => Some(InputKind::IrText),
            "bc" => Some(InputKind::IrBinary),
            "s" | "S" => Some(InputKind::Assembly),
            _ => None,
        }
    }
}

/// A classified input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub kind: InputKind,
    /// Position on the command line.
    pub position: usize,
}

/// Inputs partitioned by kind, each bucket in command-line order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassifiedInputs {
    pub cxx: Vec<InputFile>,
    pub c: Vec<InputFile>,
    pub ir_text: Vec<InputFile>,
    pub ir_binary: Vec<InputFile>,
    pub assembly: Vec<InputFile>,
}

impl ClassifiedInputs {
    /// Bucket for `kind`.
    pub fn of_kind(&self, kind: InputKind) -> &[InputFile] {
        match kind {
            InputKind::Cxx => &self.cxx,
            InputKind::C => &self.c,
            InputKind::IrText => &self.ir_text,
            InputKind::IrBinary => &self.ir_binary,
            InputKind::Assembly => &self.assembly,
        }
    }

    fn bucket_mut(&mut self, kind: InputKind) -> &mut Vec<InputFile> {
        match kind {
            InputKind::Cxx => &mut self.cxx,
            InputKind::C => &mut self.c,
            InputKind::IrText => &mut self.ir_text,
            InputKind::IrBinary => &mut self.ir_binary,
            InputKind::Assembly => &mut self.assembly,
        }
    }

    pub fn len(&self) -> usize {
        self.cxx.len()
            + self.c.len()
            + self.ir_text.len()
            + self.ir_binary.len()
            + self.assembly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `paths` by extension.
///
/// Fails on the first path with an unsupported extension.
pub fn classify<P: AsRef<Path>>(paths: &[P]) -> BuildResult<ClassifiedInputs> {
    let mut inputs = ClassifiedInputs::default();
    for (position, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        let kind = InputKind::from_path(path).ok_or_else(|| BuildError::UnsupportedInputKind {
            path: path.to_path_buf(),
        })?;
        log::debug!("classified {} as {:?}", path.display(), kind);
        inputs.bucket_mut(kind).push(InputFile {
            path: path.to_path_buf(),
            kind,
            position,
        });
    }
    Ok(inputs)
}
