//! Error types used by the crate.

use std::sync::Arc;

use thiserror::Error;

/// Meridian error type.
///
/// Style and resource errors are carried as opaque values through the
/// observer stream; they never crash the map, they only keep it in the
/// not-fully-loaded state. Misuse errors are reported back through the
/// callback of the call that caused them.
#[derive(Debug, Clone, Error)]
pub enum MapError {
    /// The API was called in a way it does not support, e.g. requesting a
    /// still image while another request is in flight.
    #[error("map misuse: {0}")]
    Misuse(String),
    /// The style failed to load or parse.
    #[error("style error: {0}")]
    Style(String),
    /// A resource (tile, sprite, glyph range) failed to load.
    #[error("resource error: {0}")]
    Resource(String),
    /// Error reading/writing data to the FS.
    #[error("failed to access file: {0}")]
    FsIo(Arc<std::io::Error>),
}

impl From<std::io::Error> for MapError {
    fn from(value: std::io::Error) -> Self {
        Self::FsIo(Arc::new(value))
    }
}
