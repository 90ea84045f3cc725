//! Camera geometry snapshot.

use std::f64::consts::PI;

use nalgebra::{Matrix4, Perspective3, Point2, Rotation3, Scale3, Translation3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use meridian_types::mercator;
use meridian_types::{EdgeInsets, LatLng, LatLngBounds, ScreenCoordinate, Size};

use crate::camera::CameraOptions;
use crate::options::{ConstrainMode, MapOptions, NorthOrientation, ViewportMode};

/// Lowest allowed zoom level.
pub const MIN_ZOOM: f64 = 0.0;
/// Highest allowed zoom level.
pub const MAX_ZOOM: f64 = 25.5;
/// Default maximum pitch, radians.
pub const DEFAULT_MAX_PITCH: f64 = 60.0 * PI / 180.0;

/// Snapshot of the camera geometry: where the camera is, how the viewport is
/// shaped, and what limits apply.
///
/// The state is pure geometry. It clamps every input into the configured
/// range instead of rejecting it, and it converts between screen and
/// geographic coordinates through the same matrix pipeline the renderer
/// uses. Camera animation and event sequencing live in
/// [`Transform`](super::Transform).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    center: LatLng,
    zoom: f64,
    /// Radians, normalized to `(-PI, PI]`.
    bearing: f64,
    /// Radians, within `[min_pitch, max_pitch]`.
    pitch: f64,
    size: Size,
    padding: EdgeInsets,
    bounds: Option<LatLngBounds>,
    min_zoom: f64,
    max_zoom: f64,
    min_pitch: f64,
    max_pitch: f64,
    north_orientation: NorthOrientation,
    constrain_mode: ConstrainMode,
    viewport_mode: ViewportMode,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            center: LatLng::default(),
            zoom: 0.0,
            bearing: 0.0,
            pitch: 0.0,
            size: Size::default(),
            padding: EdgeInsets::default(),
            bounds: None,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            min_pitch: 0.0,
            max_pitch: DEFAULT_MAX_PITCH,
            north_orientation: NorthOrientation::Upwards,
            constrain_mode: ConstrainMode::HeightOnly,
            viewport_mode: ViewportMode::Default,
        }
    }
}

impl TransformState {
    /// Creates a state configured from the map options.
    pub fn new(options: &MapOptions) -> Self {
        Self {
            size: options.size,
            north_orientation: options.north_orientation,
            constrain_mode: options.constrain_mode,
            viewport_mode: options.viewport_mode,
            ..Default::default()
        }
    }

    /// Geographic center of the viewport.
    pub fn latlng(&self) -> LatLng {
        self.center
    }

    /// Zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Bearing in radians, normalized to `(-PI, PI]`.
    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    /// Pitch in radians.
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Viewport size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Edge insets.
    pub fn padding(&self) -> EdgeInsets {
        self.padding
    }

    /// Pan bounds, if restricted.
    pub fn latlng_bounds(&self) -> Option<LatLngBounds> {
        self.bounds
    }

    /// Minimum zoom level.
    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    /// Maximum zoom level.
    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    /// Minimum pitch, radians.
    pub fn min_pitch(&self) -> f64 {
        self.min_pitch
    }

    /// Maximum pitch, radians.
    pub fn max_pitch(&self) -> f64 {
        self.max_pitch
    }

    /// Compass orientation of the viewport.
    pub fn north_orientation(&self) -> NorthOrientation {
        self.north_orientation
    }

    /// Camera center constraint mode.
    pub fn constrain_mode(&self) -> ConstrainMode {
        self.constrain_mode
    }

    /// Viewport orientation mode.
    pub fn viewport_mode(&self) -> ViewportMode {
        self.viewport_mode
    }

    /// The camera as a fully populated [`CameraOptions`].
    pub fn camera_options(&self, padding: Option<EdgeInsets>) -> CameraOptions {
        CameraOptions::new()
            .with_center(self.center.wrapped())
            .with_padding(padding.unwrap_or(self.padding))
            .with_zoom(self.zoom)
            .with_bearing(self.bearing.to_degrees())
            .with_pitch(self.pitch.to_degrees())
    }

    /// Converts a zoom scale factor to a zoom level delta: `log2(scale)`.
    pub fn scale_zoom(&self, scale: f64) -> f64 {
        scale.log2()
    }

    /// Converts a zoom level to a scale factor: `2^zoom`.
    pub fn zoom_scale(&self, zoom: f64) -> f64 {
        2f64.powf(zoom)
    }

    /// Size of the world plane in pixels at the current zoom.
    pub fn world_size(&self) -> f64 {
        mercator::world_size(self.zoom_scale(self.zoom))
    }

    pub(crate) fn set_latlng(&mut self, center: LatLng) {
        if !center.lat().is_finite() || !center.lng().is_finite() {
            return;
        }
        self.center = center;
        self.constrain_center();
    }

    pub(crate) fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.constrain_center();
    }

    pub(crate) fn set_bearing(&mut self, bearing: f64) {
        if !bearing.is_finite() {
            return;
        }
        self.bearing = normalize_angle(bearing);
    }

    pub(crate) fn set_pitch(&mut self, pitch: f64) {
        if !pitch.is_finite() {
            return;
        }
        self.pitch = pitch.clamp(self.min_pitch, self.max_pitch);
    }

    pub(crate) fn set_padding(&mut self, padding: EdgeInsets) {
        self.padding = padding;
    }

    pub(crate) fn resize(&mut self, size: Size) {
        self.size = size;
        self.constrain_center();
    }

    pub(crate) fn set_latlng_bounds(&mut self, bounds: Option<LatLngBounds>) {
        self.bounds = bounds;
        self.constrain_center();
    }

    pub(crate) fn set_min_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        self.min_zoom = zoom.clamp(MIN_ZOOM, self.max_zoom);
        self.set_zoom(self.zoom);
    }

    pub(crate) fn set_max_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        self.max_zoom = zoom.clamp(self.min_zoom, MAX_ZOOM);
        self.set_zoom(self.zoom);
    }

    pub(crate) fn set_min_pitch(&mut self, pitch: f64) {
        if !pitch.is_finite() {
            return;
        }
        self.min_pitch = pitch.clamp(0.0, self.max_pitch);
        self.set_pitch(self.pitch);
    }

    pub(crate) fn set_max_pitch(&mut self, pitch: f64) {
        if !pitch.is_finite() {
            return;
        }
        self.max_pitch = pitch.clamp(self.min_pitch, PI / 2.0);
        self.set_pitch(self.pitch);
    }

    pub(crate) fn set_north_orientation(&mut self, orientation: NorthOrientation) {
        self.north_orientation = orientation;
    }

    pub(crate) fn set_constrain_mode(&mut self, mode: ConstrainMode) {
        self.constrain_mode = mode;
        self.constrain_center();
    }

    pub(crate) fn set_viewport_mode(&mut self, mode: ViewportMode) {
        self.viewport_mode = mode;
    }

    /// Projects a geographic position to viewport pixels.
    ///
    /// With an empty viewport the projection is undefined; the viewport
    /// midpoint is returned instead of NaN.
    pub fn latlng_to_screen_coordinate(&self, latlng: &LatLng) -> ScreenCoordinate {
        let midpoint = ScreenCoordinate::new(self.size.half_width(), self.size.half_height());
        let Some(matrix) = self.world_to_clip() else {
            return midpoint;
        };

        let world = mercator::project(latlng, self.world_size());
        let clip = matrix * Vector4::new(world.x, world.y, 0.0, 1.0);
        if clip.w.abs() < 1e-12 {
            return midpoint;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let x = (ndc_x + 1.0) / 2.0 * self.size.width();
        let y = match self.viewport_mode {
            ViewportMode::Default => (1.0 - ndc_y) / 2.0 * self.size.height(),
            ViewportMode::FlippedY => (ndc_y + 1.0) / 2.0 * self.size.height(),
        };

        ScreenCoordinate::new(x, y) + self.padding_offset()
    }

    /// Converts a viewport pixel position to a geographic position.
    ///
    /// The returned longitude is unwrapped: points past the antimeridian
    /// come back with longitudes beyond `[-180, 180)` so that they stay on
    /// the same world copy as the center. Use [`LatLng::wrapped`] to
    /// normalize. With an empty viewport the current center is returned.
    pub fn screen_coordinate_to_latlng(&self, point: &ScreenCoordinate) -> LatLng {
        let Some(matrix) = self.world_to_clip() else {
            return self.center;
        };
        let Some(inverse) = matrix.try_inverse() else {
            return self.center;
        };

        let point = *point - self.padding_offset();
        let ndc_x = 2.0 * point.x / self.size.width() - 1.0;
        let ndc_y = match self.viewport_mode {
            ViewportMode::Default => 1.0 - 2.0 * point.y / self.size.height(),
            ViewportMode::FlippedY => 2.0 * point.y / self.size.height() - 1.0,
        };

        // Cast a ray through the near and far clip planes and intersect it
        // with the world plane z = 0.
        let near = inverse * Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far = inverse * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);
        if near.w.abs() < 1e-12 || far.w.abs() < 1e-12 {
            return self.center;
        }
        let near = near / near.w;
        let far = far / far.w;

        let dz = far.z - near.z;
        if dz.abs() < 1e-12 {
            return self.center;
        }
        let t = -near.z / dz;
        let x = near.x + t * (far.x - near.x);
        let y = near.y + t * (far.y - near.y);
        if !x.is_finite() || !y.is_finite() {
            return self.center;
        }

        mercator::unproject(&Point2::new(x, y), self.world_size())
    }

    /// Moves the center so that `latlng` projects to the given screen point.
    pub(crate) fn move_latlng(&mut self, latlng: LatLng, screen_point: ScreenCoordinate) {
        if self.size.is_empty() {
            return;
        }
        let world_size = self.world_size();
        let target = mercator::project(&latlng, world_size);
        let current = mercator::project(&self.screen_coordinate_to_latlng(&screen_point), world_size);
        let center = mercator::project(&self.center, world_size);
        let shifted = Point2::new(
            center.x + (target.x - current.x),
            center.y + (target.y - current.y),
        );
        self.set_latlng(mercator::unproject(&shifted, world_size));
    }

    /// Bearing with the north-orientation offset applied, as used for
    /// rendering.
    pub fn render_bearing(&self) -> f64 {
        self.bearing + self.north_orientation.angle()
    }

    fn padding_offset(&self) -> ScreenCoordinate {
        let padded = self.padding.center(self.size);
        ScreenCoordinate::new(
            padded.x - self.size.half_width(),
            padded.y - self.size.half_height(),
        )
    }

    fn world_to_clip(&self) -> Option<Matrix4<f64>> {
        if self.size.is_empty() {
            return None;
        }

        let width = self.size.width();
        let height = self.size.height();

        // Camera hovers 1.5 viewport heights above the plane; the field of
        // view is chosen so an unpitched view covers exactly one viewport.
        let altitude = 1.5 * height;
        let fov = 2.0 * (height / (2.0 * altitude)).atan();

        let perspective =
            Perspective3::new(width / height, fov, height / 100.0, altitude * 10.0).to_homogeneous();

        let center = mercator::project(&self.center, self.world_size());
        let translate = Translation3::new(-center.x, -center.y, 0.0).to_homogeneous();
        let flip_y = Scale3::new(1.0, -1.0, 1.0).to_homogeneous();
        let rotate = Rotation3::new(Vector3::new(0.0, 0.0, self.render_bearing())).to_homogeneous();
        let tilt = Rotation3::new(Vector3::new(-self.pitch, 0.0, 0.0)).to_homogeneous();
        let view = Translation3::new(0.0, 0.0, -altitude).to_homogeneous();

        Some(perspective * view * tilt * rotate * flip_y * translate)
    }

    fn constrain_center(&mut self) {
        if let Some(bounds) = &self.bounds {
            self.center = bounds.constrain(&self.center);
        }

        if self.constrain_mode == ConstrainMode::None || self.size.is_empty() {
            return;
        }

        let world_size = self.world_size();
        let mut center = mercator::project(&self.center, world_size);

        let half_height = self.size.half_height();
        if world_size <= 2.0 * half_height {
            center.y = world_size / 2.0;
        } else {
            center.y = center.y.clamp(half_height, world_size - half_height);
        }

        if self.constrain_mode == ConstrainMode::WidthAndHeight {
            let half_width = self.size.half_width();
            if world_size <= 2.0 * half_width {
                center.x = world_size / 2.0;
            } else {
                center.x = center.x.clamp(half_width, world_size - half_width);
            }
        }

        self.center = mercator::unproject(&center, world_size);
    }
}

/// Normalizes an angle in radians to `(-PI, PI]`.
fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}
