//! Meridian is the camera and render-scheduling core of a vector map engine. It owns the
//! authoritative view state (center, zoom, bearing, pitch), runs camera animations, converts
//! between screen and geographic coordinates, and correlates style and renderer notifications
//! into a single observer stream with optional on-disk journaling.
//!
//! # Quick start
//!
//! ```
//! use meridian::{
//!     ActionJournalOptions, CameraOptions, Map, MapOptions, NullMapObserver,
//!     NullRendererFrontend,
//! };
//! use meridian::{LatLng, Size};
//!
//! let mut map = Map::new(
//!     MapOptions::new().with_size(Size::new(800.0, 600.0)),
//!     &ActionJournalOptions::new(),
//!     Box::new(NullMapObserver),
//!     Box::new(NullRendererFrontend),
//!     None,
//! );
//!
//! map.jump_to(
//!     &CameraOptions::new()
//!         .with_center(LatLng::new(48.8566, 2.3522))
//!         .with_zoom(11.0),
//! );
//! let pixel = map.pixel_for_latlng(&LatLng::new(48.86, 2.35));
//! assert!(pixel.is_finite());
//! ```
//!
//! # Main components
//!
//! * [`Map`] is the facade the embedder talks to: camera operations, bounds, still images,
//!   debug switches. It owns the event hub that fans every notification out to the
//!   [`MapObserver`] and, when enabled, the [`ActionJournal`].
//! * [`transform::Transform`] is the single authority for the camera. Its mutators validate
//!   and clamp input and return the camera notifications they caused; animations are plain
//!   data advanced by [`Map::tick`] once per frame.
//! * The style, the renderer and the resource loader stay outside this crate, reached through
//!   the narrow [`Style`], [`RendererFrontend`] and [`FileSource`] traits. Their
//!   notifications come back in as [`StyleEvent`] and [`RendererEvent`] values.
//!
//! Everything here is single-threaded by design: one logical render thread owns the map, and
//! gesture or loading callbacks from other threads must be marshalled onto it before calling
//! in.

pub mod camera;
pub mod error;
pub mod events;
pub mod file_source;
pub mod journal;
mod map;
pub mod observer;
pub mod options;
pub mod renderer;
pub mod style;
pub mod transform;

pub use camera::{AnimationOptions, CameraOptions, Easing};
pub use error::MapError;
pub use events::{RendererEvent, StyleEvent, TransformEvent};
pub use file_source::{FileSource, SharedFileSource, StaticFileSource};
pub use journal::{ActionJournal, ActionJournalOptions};
pub use map::{Map, StillImageCallback, DEFAULT_PREFETCH_ZOOM_DELTA};
pub use meridian_types::{EdgeInsets, LatLng, LatLngBounds, ScreenCoordinate, Size};
pub use observer::{
    CameraChangeMode, GlyphRange, MapObserver, NullMapObserver, OverscaledTileId,
    RenderFrameStatus, RenderMode, ShaderInfo, SpriteInfo, TileOperation,
};
pub use options::{
    BoundOptions, ClientOptions, ConstrainMode, MapDebugOptions, MapMode, MapOptions,
    NorthOrientation, ViewportMode,
};
pub use renderer::{NullRendererFrontend, RendererFrontend};
pub use style::{FixedStyle, Style};
pub use transform::{Transform, TransformState};
