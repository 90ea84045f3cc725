//! Tagged event channels feeding the map hub.
//!
//! The style subsystem and the renderer do not hold references back into the
//! map. Instead the embedder forwards their notifications as plain enum
//! values through [`Map::handle_style_event`] and
//! [`Map::handle_renderer_event`], and the hub fans them out to the
//! [`MapObserver`] and the action journal from a single dispatch point.
//!
//! [`Map::handle_style_event`]: crate::Map::handle_style_event
//! [`Map::handle_renderer_event`]: crate::Map::handle_renderer_event
//! [`MapObserver`]: crate::MapObserver

use crate::error::MapError;
use crate::observer::{
    CameraChangeMode, GlyphRange, OverscaledTileId, RenderFrameStatus, RenderMode, ShaderInfo,
    SpriteInfo, TileOperation,
};

/// Camera notifications produced by [`Transform`] mutators.
///
/// `Transform` does not call observers itself; its operations return the
/// events they caused in order, and the hub forwards them. This keeps the
/// transform free of back-references while preserving the exact event
/// sequence of each operation.
///
/// [`Transform`]: crate::transform::Transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformEvent {
    /// The camera is about to change.
    CameraWillChange(CameraChangeMode),
    /// An animated transition produced an intermediate camera value.
    CameraIsChanging,
    /// The camera finished changing.
    CameraDidChange(CameraChangeMode),
}

/// Notifications from the style subsystem.
#[derive(Debug, Clone)]
pub enum StyleEvent {
    /// The style document and all its initial resources finished loading.
    Loaded,
    /// The style failed to load or parse.
    Error(MapError),
    /// The style mutated in a way that requires a repaint.
    Update,
    /// A source changed its content.
    SourceChanged {
        /// Id of the changed source.
        source_id: String,
    },
    /// A sprite sheet finished loading.
    SpriteLoaded {
        /// The sprite that loaded, if identified.
        sprite: Option<SpriteInfo>,
    },
    /// A sprite sheet failed to load.
    SpriteError {
        /// The sprite that failed, if identified.
        sprite: Option<SpriteInfo>,
        /// The load error.
        error: MapError,
    },
    /// A sprite sheet was requested.
    SpriteRequested {
        /// The requested sprite, if identified.
        sprite: Option<SpriteInfo>,
    },
}

/// Notifications from the renderer.
#[derive(Debug, Clone)]
pub enum RendererEvent {
    /// The renderer wants the map repainted.
    Invalidate,
    /// A resource failed to load during rendering.
    ResourceError(MapError),
    /// A frame is about to be drawn.
    WillStartRenderingFrame,
    /// A frame was drawn.
    DidFinishRenderingFrame(RenderFrameStatus),
    /// The first frame after a style change is about to be drawn.
    WillStartRenderingMap,
    /// The map was drawn completely.
    DidFinishRenderingMap(RenderMode),
    /// The style references a missing image.
    StyleImageMissing {
        /// Id of the missing image.
        image_id: String,
    },
    /// The listed style images are unused.
    RemoveUnusedStyleImages {
        /// Ids of the unused images.
        image_ids: Vec<String>,
    },
    /// A glyph range finished loading.
    GlyphsLoaded {
        /// Requested font stack.
        font_stack: Vec<String>,
        /// Loaded glyph range.
        range: GlyphRange,
    },
    /// A glyph range failed to load.
    GlyphsError {
        /// Requested font stack.
        font_stack: Vec<String>,
        /// Failed glyph range.
        range: GlyphRange,
        /// The load error.
        error: MapError,
    },
    /// A glyph range was requested.
    GlyphsRequested {
        /// Requested font stack.
        font_stack: Vec<String>,
        /// Requested glyph range.
        range: GlyphRange,
    },
    /// A shader program is about to be compiled.
    PreCompileShader(ShaderInfo),
    /// A shader program was compiled.
    PostCompileShader(ShaderInfo),
    /// A shader program failed to compile.
    ShaderCompileFailed(ShaderInfo),
    /// A tile moved through a step of the loading pipeline.
    TileAction {
        /// The pipeline step.
        op: TileOperation,
        /// The affected tile.
        tile: OverscaledTileId,
        /// Source the tile belongs to.
        source_id: String,
    },
}
