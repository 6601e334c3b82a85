//! Concrete collaborators for the shader transform.
//!
//! `shader-core` only defines the preprocessor and compiler seams. This crate
//! provides implementations that run external tools as child processes, plus
//! a built-in `#include` inliner for builds without an external preprocessor.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

pub mod command;
pub mod compiler;
pub mod inliner;
pub mod resolver;

pub use command::ExternalCommand;
pub use compiler::CommandCompiler;
pub use inliner::IncludeInliner;
pub use resolver::CommandResolver;

/// Errors raised while running external tools or reading include files.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to start '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error talking to '{program}'")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("Failed to read include '{}'", path.display())]
    Include {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed include directive at {}:{line}: {directive}", file.display())]
    Directive {
        file: PathBuf,
        line: usize,
        directive: String,
    },
}
