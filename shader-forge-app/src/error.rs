use shader_core::SelectorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("IO Error")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("{failed} of {total} shader file(s) failed to transform")]
    Failed { failed: usize, total: usize },

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
