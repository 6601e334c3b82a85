//! Core library for turning shader sources into importable JavaScript modules.
//! Defines the transform pipeline and the platform-agnostic pieces it is built from:
//! file selection, the preprocessor and compiler seams, compiled-bundle parsing,
//! stage classification, pairing and module rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Parsed compiler output: named shader snippets.
pub mod bundle;
/// Seam for the external shader compiler and its option set.
pub mod compiler;
/// Module intermediate representation and rendering.
pub mod module;
/// Seam for the dependency-inlining preprocessor.
pub mod resolver;
/// Include/exclude glob filtering of candidate files.
pub mod selector;
/// Stage suffix conventions.
pub mod stage;
/// Classification and vertex/fragment pairing.
pub mod synthesizer;
/// The per-file transform driver.
pub mod transform;

pub use crate::bundle::{CompiledBundle, CompiledShaderEntry};
pub use crate::compiler::{CompileOptions, CompilerResult, ShaderCompiler};
pub use crate::module::{ExportDecl, GeneratedModule, ModuleIr, SourceMap};
pub use crate::resolver::{DependencyResolver, ResolveOptions, ResolverConfig};
pub use crate::selector::{FileSelector, Patterns, SelectorError};
pub use crate::stage::{ShaderStage, StageSuffixes};
pub use crate::synthesizer::{ClassifiedShaders, SynthesisOptions, Synthesizer};
pub use crate::transform::{ShaderTransform, SourceUnit};

/// Problems with the shape of the compiler's structured output or with the
/// module it would produce.
#[derive(Error, Debug)]
pub enum StructureError {
    /// The compiler output could not be parsed as JSON.
    #[error("compiler output is not valid JSON")]
    Malformed(#[from] serde_json::Error),
    /// The parsed output lacks the `shaders` sequence.
    #[error("compiler output has no `shaders` field")]
    MissingShaders,
    /// The compiler returned neither a diagnostic log nor any output.
    #[error("compiler produced neither a log nor an output")]
    EmptyResult,
    /// Two entries in one bundle share a name.
    #[error("duplicate shader entry `{0}`")]
    DuplicateEntry(String),
    /// Two entries strip to the same key within one stage.
    #[error("shader entries collide on {stage} key `{key}`")]
    StageCollision { stage: ShaderStage, key: String },
    /// Two generated exports would share a name.
    #[error("export `{0}` is declared more than once")]
    DuplicateExport(String),
    /// The export name is not a usable JavaScript identifier.
    #[error("`{0}` is not a valid export name")]
    InvalidExportName(String),
}

/// Errors that abort the transform of a single file.
#[derive(Error, Debug)]
pub enum TransformError {
    /// The include/exclude patterns could not be compiled.
    #[error(transparent)]
    Selector(#[from] SelectorError),
    /// The preprocessor failed. Its error is carried as-is.
    #[error("Failed to resolve dependencies of {}", path.display())]
    Resolution {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    /// The compiler could not be invoked at all.
    #[error("Failed to run shader compiler for {}", path.display())]
    Compiler {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    /// The compiler reported diagnostics. The placeholder input name in `log`
    /// has already been replaced with `path`.
    #[error("Failed to compile {}:\n{log}", path.display())]
    Compilation { path: PathBuf, log: String },
    /// The compiler output or the generated module is structurally invalid.
    #[error("Invalid compiler output for {}", path.display())]
    Structure {
        path: PathBuf,
        #[source]
        source: StructureError,
    },
}

impl TransformError {
    /// Attaches a file path to a structural error.
    pub fn structure(path: impl Into<PathBuf>, source: StructureError) -> Self {
        Self::Structure {
            path: path.into(),
            source,
        }
    }
}
