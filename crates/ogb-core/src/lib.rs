pub mod bundle;
pub mod collate;
pub mod config;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod render;

pub use error::{ErrorKind, PipelineError};

/// A rendered documentation page with its path inside the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitBookFile {
    pub path: String,
    pub contents: String,
}
