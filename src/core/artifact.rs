// This module owns every intermediate file the pipeline produces. ArtifactStore has two
// backends selected by the save-temps flag: an ephemeral one that places artifacts inside a
// private temporary directory (removed by cleanup() or, at the latest, when the store is
// dropped), and a persistent one that writes deterministically numbered files into the
// invocation working directory so reruns overwrite them predictably. The store also hands
// out the working directory used by the final link: a scoped temporary directory normally,
// the invocation directory itself under save-temps.

//! Intermediate artifact management.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::error::{BuildError, BuildResult};

/// The intermediate files a run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Output of `clang`/`clang++`.
    Frontend,
    /// Output of `llvm-as`.
    Assembler,
    /// Output of `llvm-link`.
    Link,
    /// Output of the internalizing `opt` run.
    Internalize,
    /// Output of the general `opt` run.
    Optimize,
    /// Output of `llc`.
    Codegen,
}

impl ArtifactKind {
    /// Stage number used as the file name prefix.
    pub fn number(self) -> u32 {
        match self {
            ArtifactKind::Frontend | ArtifactKind::Assembler => 1,
            ArtifactKind::Link => 2,
            ArtifactKind::Internalize => 3,
            ArtifactKind::Optimize => 4,
            ArtifactKind::Codegen => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Frontend => "clang",
            ArtifactKind::Assembler => "llvm-as",
            ArtifactKind::Link => "llvm-link",
            ArtifactKind::Internalize => "opt",
            ArtifactKind::Optimize => "opt_O3",
            ArtifactKind::Codegen => "llc",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Assembler => "bc",
            ArtifactKind::Codegen => "asm",
            _ => "ll",
        }
    }

    /// File name of the `nth` (zero based) artifact of this kind in a run.
    pub fn file_name(self, nth: usize) -> String {
        if nth == 0 {
            format!("{}-{}.{}", self.number(), self.label(), self.extension())
        } else {
            format!(
                "{}-{}-{}.{}",
                self.number(),
                self.label(),
                nth + 1,
                self.extension()
            )
        }
    }
}

/// A file produced by one stage and consumed by the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    /// Kept after the run (save-temps).
    pub persistent: bool,
}

enum Backend {
    Ephemeral(Option<TempDir>),
    SaveTemps(PathBuf),
}

/// Creates, names and removes intermediate files for one pipeline run.
pub struct ArtifactStore {
    backend: Backend,
    created: Vec<Artifact>,
    counts: HashMap<ArtifactKind, usize>,
}

impl ArtifactStore {
    /// Store backed by a private temporary directory.
    pub fn ephemeral() -> BuildResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("tvm-build-")
            .tempdir()
            .map_err(|e| BuildError::io("creating temporary directory", e))?;
        log::debug!("artifact directory: {}", dir.path().display());
        Ok(Self {
            backend: Backend::Ephemeral(Some(dir)),
            created: Vec::new(),
            counts: HashMap::new(),
        })
    }

    /// Store writing numbered, persistent files into `working_dir`.
    pub fn save_temps(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::SaveTemps(working_dir.into()),
            created: Vec::new(),
            counts: HashMap::new(),
        }
    }

    /// Pick the backend from the save-temps flag.
    pub fn for_run(save_temps: bool, working_dir: &Path) -> BuildResult<Self> {
        if save_temps {
            Ok(Self::save_temps(working_dir))
        } else {
            Self::ephemeral()
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, Backend::SaveTemps(_))
    }

    /// Reserve a new writable path for an artifact of `kind`.
    pub fn new_artifact(&mut self, kind: ArtifactKind) -> BuildResult<PathBuf> {
        let nth = self.counts.entry(kind).or_insert(0);
        let name = kind.file_name(*nth);
        *nth += 1;

        let path = match &self.backend {
            Backend::Ephemeral(Some(dir)) => dir.path().join(name),
            Backend::Ephemeral(None) => {
                return Err(BuildError::io(
                    "creating artifact",
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "artifact store already cleaned up",
                    ),
                ))
            }
            Backend::SaveTemps(dir) => dir.join(name),
        };
        fs::File::create(&path)
            .map_err(|e| BuildError::io(format!("creating {}", path.display()), e))?;

        log::debug!("new artifact {}", path.display());
        let persistent = self.is_persistent();
        self.created.push(Artifact {
            path: path.clone(),
            kind,
            persistent,
        });
        Ok(path)
    }

    /// Artifacts created so far, in creation order.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.created
    }

    /// Working directory for the final link.
    pub fn link_dir(&self) -> BuildResult<LinkDir> {
        match &self.backend {
            Backend::SaveTemps(dir) => Ok(LinkDir::Working(dir.clone())),
            Backend::Ephemeral(_) => tempfile::Builder::new()
                .prefix("tvm-link-")
                .tempdir()
                .map(LinkDir::Scoped)
                .map_err(|e| BuildError::io("creating link directory", e)),
        }
    }

    /// Remove every non-persistent artifact. A no-op under save-temps.
    pub fn cleanup(&mut self) {
        let Backend::Ephemeral(dir) = &mut self.backend else {
            return;
        };
        for artifact in self.created.iter().filter(|a| !a.persistent) {
            if let Err(err) = fs::remove_file(&artifact.path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("failed to remove {}: {}", artifact.path.display(), err);
                }
            }
        }
        if let Some(dir) = dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(err) = dir.close() {
                log::warn!("failed to remove {}: {}", path.display(), err);
            }
        }
    }
}

impl Drop for ArtifactStore {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Directory the final linker runs in.
pub enum LinkDir {
    /// Removed when dropped.
    Scoped(TempDir),
    /// The invocation working directory (save-temps).
    Working(PathBuf),
}

impl LinkDir {
    pub fn path(&self) -> &Path {
        match self {
            LinkDir::Scoped(dir) => dir.path(),
            LinkDir::Working(dir) => dir,
        }
    }

    pub fn is_scoped(&self) -> bool {
        matches!(self, LinkDir::Scoped(_))
    }
}
