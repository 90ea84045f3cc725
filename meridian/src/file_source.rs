//! Resource-fetch collaborator interface.

use std::sync::Arc;

use crate::options::ClientOptions;

/// Narrow interface to the resource loading subsystem.
///
/// A file source may be shared by several maps; the map holds a shared
/// handle and only reads the client identity from it for journal metadata.
pub trait FileSource {
    /// Identity of the embedding application.
    fn client_options(&self) -> ClientOptions;
}

/// Shared handle to a file source.
pub type SharedFileSource = Arc<dyn FileSource>;

/// File source with fixed client options and no fetching ability.
#[derive(Debug, Default, Clone)]
pub struct StaticFileSource {
    client_options: ClientOptions,
}

impl StaticFileSource {
    /// Creates a file source reporting the given client identity.
    pub fn new(client_options: ClientOptions) -> Self {
        Self { client_options }
    }
}

impl FileSource for StaticFileSource {
    fn client_options(&self) -> ClientOptions {
        self.client_options.clone()
    }
}
