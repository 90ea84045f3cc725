//! Renderer frontend interface.

/// Handle through which the map asks for a repaint.
///
/// The map never draws; whenever its state becomes dirty it calls
/// [`invalidate`](RendererFrontend::invalidate), and the frontend schedules
/// the next paint. Render results come back through
/// [`RendererEvent`](crate::RendererEvent) values fed by the embedder.
pub trait RendererFrontend {
    /// Requests that a frame be drawn with the current map state.
    fn invalidate(&self);
}

/// Frontend that ignores repaint requests. Useful for tests and headless
/// camera computations.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRendererFrontend;

impl RendererFrontend for NullRendererFrontend {
    fn invalidate(&self) {}
}
