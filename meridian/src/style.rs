//! Style collaborator interface.
//!
//! Styling itself (layers, sources, expressions) is out of scope for this
//! crate; the map only needs a narrow view of the style to sequence loading
//! and pick the initial camera.

use crate::camera::CameraOptions;
use crate::error::MapError;

/// Narrow interface to the style subsystem.
pub trait Style {
    /// Whether the style document and its initial resources are loaded.
    fn is_loaded(&self) -> bool;
    /// The camera declared by the style document, if any.
    fn default_camera(&self) -> Option<CameraOptions>;
    /// Human-readable style name.
    fn name(&self) -> Option<String>;
    /// URL the style was loaded from.
    fn url(&self) -> Option<String>;
    /// The last load error, if the style failed.
    fn last_error(&self) -> Option<MapError>;
}

/// A style whose state is set by the embedder.
///
/// Stands in for the real style subsystem in tests and simple hosts: the
/// embedder flips `loaded` and feeds the corresponding
/// [`StyleEvent`](crate::StyleEvent) values to the map.
#[derive(Debug, Default, Clone)]
pub struct FixedStyle {
    /// Loaded flag.
    pub loaded: bool,
    /// Declared default camera.
    pub camera: Option<CameraOptions>,
    /// Style name.
    pub name: Option<String>,
    /// Style URL.
    pub url: Option<String>,
    /// Load error.
    pub error: Option<MapError>,
}

impl FixedStyle {
    /// Creates an unloaded style with no metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the style name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the style URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the declared default camera.
    pub fn with_default_camera(mut self, camera: CameraOptions) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Marks the style as loaded.
    pub fn with_loaded(mut self, loaded: bool) -> Self {
        self.loaded = loaded;
        self
    }
}

impl Style for FixedStyle {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn default_camera(&self) -> Option<CameraOptions> {
        self.camera.clone()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn url(&self) -> Option<String> {
        self.url.clone()
    }

    fn last_error(&self) -> Option<MapError> {
        self.error.clone()
    }
}
