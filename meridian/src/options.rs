//! Map configuration options and mode enums.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use meridian_types::{LatLngBounds, Size};

/// How the map is driven by its embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapMode {
    /// The map renders continuously in response to camera and data changes.
    Continuous,
    /// The map renders a single still image once everything is loaded.
    Static,
    /// Like [`MapMode::Static`], but renders exactly one tile.
    Tile,
}

/// Constraints applied to the camera center so the world plane keeps
/// covering the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstrainMode {
    /// No constraint; the camera may show the void beyond the poles.
    None,
    /// The center is clamped vertically.
    HeightOnly,
    /// The center is clamped both vertically and horizontally.
    WidthAndHeight,
}

/// Orientation of the rendered viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewportMode {
    /// Regular screen orientation, `y` grows downwards.
    Default,
    /// Vertically flipped rendering, used by frameworks with a bottom-left
    /// origin.
    FlippedY,
}

/// Which compass direction points up when bearing is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NorthOrientation {
    /// North is up.
    Upwards,
    /// North is to the right.
    Rightwards,
    /// North is down.
    Downwards,
    /// North is to the left.
    Leftwards,
}

impl NorthOrientation {
    /// Fixed bearing offset of the orientation, radians.
    pub fn angle(&self) -> f64 {
        match self {
            NorthOrientation::Upwards => 0.0,
            NorthOrientation::Rightwards => FRAC_PI_2,
            NorthOrientation::Downwards => PI,
            NorthOrientation::Leftwards => -FRAC_PI_2,
        }
    }
}

/// Debug overlays drawn on top of the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDebugOptions {
    /// Edges of tiles.
    pub tile_borders: bool,
    /// Per-tile parsing and loading status.
    pub parse_status: bool,
    /// Tile data timestamps.
    pub timestamps: bool,
    /// Symbol collision boxes.
    pub collision: bool,
    /// Wireframe overdraw visualization.
    pub overdraw: bool,
}

impl MapDebugOptions {
    /// Whether any overlay is enabled.
    pub fn any(&self) -> bool {
        self.tile_borders || self.parse_status || self.timestamps || self.collision || self.overdraw
    }
}

/// Immutable configuration the map is created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    /// Rendering mode.
    pub map_mode: MapMode,
    /// Camera center constraint.
    pub constrain_mode: ConstrainMode,
    /// Viewport orientation.
    pub viewport_mode: ViewportMode,
    /// Whether symbols of different sources participate in one collision
    /// pass.
    pub cross_source_collisions: bool,
    /// Compass orientation of the viewport.
    pub north_orientation: NorthOrientation,
    /// Initial viewport size in pixels.
    pub size: Size,
    /// Ratio of physical to logical pixels.
    pub pixel_ratio: f64,
    /// Whether annotation layers may be attached to styles of this map.
    ///
    /// This is a per-map capability rather than a process-wide switch, so
    /// maps with and without annotations can coexist in one process.
    pub annotations_enabled: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            map_mode: MapMode::Continuous,
            constrain_mode: ConstrainMode::HeightOnly,
            viewport_mode: ViewportMode::Default,
            cross_source_collisions: true,
            north_orientation: NorthOrientation::Upwards,
            size: Size::default(),
            pixel_ratio: 1.0,
            annotations_enabled: true,
        }
    }
}

impl MapOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rendering mode.
    pub fn with_map_mode(mut self, mode: MapMode) -> Self {
        self.map_mode = mode;
        self
    }

    /// Sets the camera constraint mode.
    pub fn with_constrain_mode(mut self, mode: ConstrainMode) -> Self {
        self.constrain_mode = mode;
        self
    }

    /// Sets the viewport orientation.
    pub fn with_viewport_mode(mut self, mode: ViewportMode) -> Self {
        self.viewport_mode = mode;
        self
    }

    /// Sets whether cross-source symbol collisions are enabled.
    pub fn with_cross_source_collisions(mut self, enabled: bool) -> Self {
        self.cross_source_collisions = enabled;
        self
    }

    /// Sets the compass orientation.
    pub fn with_north_orientation(mut self, orientation: NorthOrientation) -> Self {
        self.north_orientation = orientation;
        self
    }

    /// Sets the initial viewport size.
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Sets the pixel ratio.
    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    /// Sets whether annotations may be used with this map.
    pub fn with_annotations_enabled(mut self, enabled: bool) -> Self {
        self.annotations_enabled = enabled;
        self
    }
}

/// Camera bounds update. Only the set fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundOptions {
    /// Area the camera center is restricted to.
    pub bounds: Option<LatLngBounds>,
    /// Minimum zoom level.
    pub min_zoom: Option<f64>,
    /// Maximum zoom level.
    pub max_zoom: Option<f64>,
    /// Minimum pitch in degrees.
    pub min_pitch: Option<f64>,
    /// Maximum pitch in degrees.
    pub max_pitch: Option<f64>,
}

impl BoundOptions {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pan bounds.
    pub fn with_latlng_bounds(mut self, bounds: LatLngBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Sets the minimum zoom.
    pub fn with_min_zoom(mut self, zoom: f64) -> Self {
        self.min_zoom = Some(zoom);
        self
    }

    /// Sets the maximum zoom.
    pub fn with_max_zoom(mut self, zoom: f64) -> Self {
        self.max_zoom = Some(zoom);
        self
    }

    /// Sets the minimum pitch in degrees.
    pub fn with_min_pitch(mut self, pitch: f64) -> Self {
        self.min_pitch = Some(pitch);
        self
    }

    /// Sets the maximum pitch in degrees.
    pub fn with_max_pitch(mut self, pitch: f64) -> Self {
        self.max_pitch = Some(pitch);
        self
    }
}

/// Identity of the embedding application, recorded in the action journal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Application name.
    pub name: Option<String>,
    /// Application version.
    pub version: Option<String>,
}

impl ClientOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the application version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}
