//! The public event sink of the map.

use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Whether a camera change is part of an animated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraChangeMode {
    /// The camera changed in a single synchronous step.
    Immediate,
    /// The camera is moving along an animated transition.
    Animated,
}

/// How complete the rendered frame was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Some tiles or resources were still missing.
    Partial,
    /// Everything visible was rendered from fully loaded data.
    Full,
}

/// Summary of a finished frame, reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderFrameStatus {
    /// Completeness of the frame.
    pub mode: RenderMode,
    /// Whether another frame must be scheduled right away (animations still
    /// running, tiles still fading in).
    pub needs_repaint: bool,
    /// Whether symbol placement changed in this frame.
    pub placement_changed: bool,
    /// Time spent encoding the frame, seconds.
    pub frame_encoding_time: f64,
    /// Time spent rendering the frame, seconds.
    pub frame_rendering_time: f64,
}

/// Lifecycle step of a tile moving through the loading pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileOperation {
    /// Tile requested from the local cache.
    RequestedFromCache,
    /// Tile requested from the network.
    RequestedFromNetwork,
    /// Tile data arrived from the cache.
    LoadFromCache,
    /// Tile data arrived from the network.
    LoadFromNetwork,
    /// Tile parsing started.
    StartParse,
    /// Tile parsing finished.
    EndParse,
    /// Tile loading or parsing failed.
    Error,
    /// Tile request was cancelled.
    Cancelled,
    /// No-op marker used by instrumented pipelines.
    NullOp,
}

/// Identifier of a tile, including the overscale factor applied when a tile
/// is reused at a deeper zoom than its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverscaledTileId {
    /// Zoom level of the tile data.
    pub z: u8,
    /// Zoom level the tile is displayed at.
    pub overscaled_z: u8,
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

/// Identity of a sprite sheet referenced by the style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteInfo {
    /// Style-local sprite id.
    pub id: String,
    /// URL the sprite is loaded from.
    pub url: String,
}

/// Identity of a shader program being compiled by the render backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderInfo {
    /// Shader program name.
    pub shader: String,
    /// Graphics backend the shader is compiled for.
    pub backend: String,
    /// Preprocessor defines the program was specialized with.
    pub defines: String,
}

/// A contiguous range of glyph code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphRange {
    /// First code point of the range.
    pub start: u32,
    /// Last code point of the range.
    pub end: u32,
}

/// Receiver of map lifecycle events.
///
/// All methods have empty default implementations, so an observer only needs
/// to override the events it cares about. Every callback is invoked on the
/// render thread, synchronously with the event that caused it.
#[allow(unused_variables)]
pub trait MapObserver {
    /// The camera is about to change.
    fn on_camera_will_change(&mut self, mode: CameraChangeMode) {}
    /// The camera moved to an intermediate position of a transition.
    fn on_camera_is_changing(&mut self) {}
    /// The camera finished changing.
    fn on_camera_did_change(&mut self, mode: CameraChangeMode) {}

    /// A new style started loading.
    fn on_will_start_loading_map(&mut self) {}
    /// The style and its resources finished loading.
    fn on_did_finish_loading_map(&mut self) {}
    /// The style failed to load.
    fn on_did_fail_loading_map(&mut self, error: &MapError) {}

    /// The renderer is about to draw a frame.
    fn on_will_start_rendering_frame(&mut self) {}
    /// The renderer finished drawing a frame.
    fn on_did_finish_rendering_frame(&mut self, status: &RenderFrameStatus) {}
    /// The renderer started drawing the map for the first time after a style
    /// change.
    fn on_will_start_rendering_map(&mut self) {}
    /// The renderer finished drawing the complete map.
    fn on_did_finish_rendering_map(&mut self, mode: RenderMode) {}
    /// No transitions, tile loads or repaints remain.
    fn on_did_become_idle(&mut self) {}

    /// The style document finished loading.
    fn on_did_finish_loading_style(&mut self) {}
    /// A style source changed its content.
    fn on_source_changed(&mut self, source_id: &str) {}
    /// The style references an image that has not been provided.
    fn on_style_image_missing(&mut self, image_id: &str) {}
    /// The listed style images are no longer used and may be released.
    fn on_remove_unused_style_images(&mut self, image_ids: &[String]) {}

    /// A sprite sheet finished loading.
    fn on_sprite_loaded(&mut self, sprite: Option<&SpriteInfo>) {}
    /// A sprite sheet failed to load.
    fn on_sprite_error(&mut self, sprite: Option<&SpriteInfo>, error: &MapError) {}
    /// A sprite sheet was requested.
    fn on_sprite_requested(&mut self, sprite: Option<&SpriteInfo>) {}

    /// A glyph range finished loading.
    fn on_glyphs_loaded(&mut self, font_stack: &[String], range: GlyphRange) {}
    /// A glyph range failed to load.
    fn on_glyphs_error(&mut self, font_stack: &[String], range: GlyphRange, error: &MapError) {}
    /// A glyph range was requested.
    fn on_glyphs_requested(&mut self, font_stack: &[String], range: GlyphRange) {}

    /// A shader program is about to be compiled.
    fn on_pre_compile_shader(&mut self, shader: &ShaderInfo) {}
    /// A shader program was compiled.
    fn on_post_compile_shader(&mut self, shader: &ShaderInfo) {}
    /// A shader program failed to compile.
    fn on_shader_compile_failed(&mut self, shader: &ShaderInfo) {}

    /// A tile moved through a step of the loading pipeline.
    fn on_tile_action(&mut self, op: TileOperation, tile: &OverscaledTileId, source_id: &str) {}
}

/// Observer that ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMapObserver;

impl MapObserver for NullMapObserver {}
