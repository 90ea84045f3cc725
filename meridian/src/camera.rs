//! Camera description and animation parameters.

use serde::{Deserialize, Serialize};
use web_time::Duration;

use meridian_types::{EdgeInsets, LatLng, ScreenCoordinate};

/// A partial camera update.
///
/// Only the fields that are set are applied by [`Map::jump_to`] and the
/// animated camera operations; everything else keeps its current value.
///
/// Angles are in degrees: bearing is the clockwise rotation of the map from
/// north, pitch is the tilt away from the vertical view.
///
/// [`Map::jump_to`]: crate::Map::jump_to
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraOptions {
    /// Geographic center of the viewport.
    pub center: Option<LatLng>,
    /// Padding around the viewport edges.
    pub padding: Option<EdgeInsets>,
    /// Screen point that should keep its geographic position during the
    /// update. Mutually exclusive with `center`; when both are set the anchor
    /// is ignored.
    pub anchor: Option<ScreenCoordinate>,
    /// Zoom level.
    pub zoom: Option<f64>,
    /// Bearing in degrees, measured clockwise from north.
    pub bearing: Option<f64>,
    /// Pitch in degrees, 0 looking straight down.
    pub pitch: Option<f64>,
}

impl CameraOptions {
    /// Creates an empty update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the center.
    pub fn with_center(mut self, center: LatLng) -> Self {
        self.center = Some(center);
        self
    }

    /// Sets the padding.
    pub fn with_padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Sets the anchor.
    pub fn with_anchor(mut self, anchor: ScreenCoordinate) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Sets the zoom level.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Sets the bearing in degrees.
    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = Some(bearing);
        self
    }

    /// Sets the pitch in degrees.
    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = Some(pitch);
        self
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parameters of an animated camera transition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationOptions {
    /// How long the transition takes. `None` or zero means the change is
    /// applied immediately.
    pub duration: Option<Duration>,
    /// Easing curve applied to transition progress. Defaults to
    /// [`Easing::ease`].
    pub easing: Option<Easing>,
    /// Average velocity of a fly-to transition, measured in screenfuls per
    /// second. Used to derive the duration when none is given.
    pub velocity: Option<f64>,
    /// Zero-padding minimum zoom of a fly-to path, overriding the computed
    /// peak of the zoom-out arc.
    pub min_zoom: Option<f64>,
}

impl AnimationOptions {
    /// Creates options with the given duration.
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..Default::default()
        }
    }

    /// Sets the easing curve.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Duration to use for the transition, treating absent as zero.
    pub fn duration_or_zero(&self) -> Duration {
        self.duration.unwrap_or(Duration::ZERO)
    }
}

/// Cubic bezier easing curve with fixed endpoints (0, 0) and (1, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Easing {
    p1: (f64, f64),
    p2: (f64, f64),
}

impl Easing {
    /// Creates a curve from its two control points.
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            p1: (x1.clamp(0.0, 1.0), y1),
            p2: (x2.clamp(0.0, 1.0), y2),
        }
    }

    /// The default camera easing curve: fast start, smooth stop.
    pub fn ease() -> Self {
        Self::cubic_bezier(0.0, 0.0, 0.25, 1.0)
    }

    /// Linear progression.
    pub fn linear() -> Self {
        Self::cubic_bezier(0.0, 0.0, 1.0, 1.0)
    }

    fn sample_x(&self, t: f64) -> f64 {
        let (x1, _) = self.p1;
        let (x2, _) = self.p2;
        let cx = 3.0 * x1;
        let bx = 3.0 * (x2 - x1) - cx;
        let ax = 1.0 - cx - bx;
        ((ax * t + bx) * t + cx) * t
    }

    fn sample_y(&self, t: f64) -> f64 {
        let (_, y1) = self.p1;
        let (_, y2) = self.p2;
        let cy = 3.0 * y1;
        let by = 3.0 * (y2 - y1) - cy;
        let ay = 1.0 - cy - by;
        ((ay * t + by) * t + cy) * t
    }

    fn sample_x_derivative(&self, t: f64) -> f64 {
        let (x1, _) = self.p1;
        let (x2, _) = self.p2;
        let cx = 3.0 * x1;
        let bx = 3.0 * (x2 - x1) - cx;
        let ax = 1.0 - cx - bx;
        (3.0 * ax * t + 2.0 * bx) * t + cx
    }

    /// Maps linear progress `x` in `[0, 1]` to eased progress.
    pub fn solve(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);

        // Newton iterations with a bisection fallback when the derivative
        // vanishes.
        let mut t = x;
        for _ in 0..8 {
            let err = self.sample_x(t) - x;
            if err.abs() < 1e-7 {
                return self.sample_y(t);
            }
            let d = self.sample_x_derivative(t);
            if d.abs() < 1e-6 {
                break;
            }
            t -= err / d;
        }

        let mut lo = 0.0;
        let mut hi = 1.0;
        t = x;
        while hi - lo > 1e-7 {
            if self.sample_x(t) < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) / 2.0;
        }
        self.sample_y(t)
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::ease()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn easing_endpoints() {
        for curve in [Easing::ease(), Easing::linear()] {
            assert_abs_diff_eq!(curve.solve(0.0), 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(curve.solve(1.0), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn linear_curve_is_identity() {
        for x in [0.1, 0.25, 0.5, 0.75, 0.9] {
            assert_abs_diff_eq!(Easing::linear().solve(x), x, epsilon = 1e-5);
        }
    }

    #[test]
    fn ease_is_monotonic_and_front_loaded() {
        let curve = Easing::ease();
        let mut prev = 0.0;
        for i in 1..=100 {
            let y = curve.solve(i as f64 / 100.0);
            assert!(y >= prev);
            prev = y;
        }
        assert!(curve.solve(0.5) > 0.5);
    }

    #[test]
    fn camera_options_merge_fields() {
        let camera = CameraOptions::new()
            .with_zoom(5.0)
            .with_center(LatLng::new(10.0, 20.0));
        assert_eq!(camera.zoom, Some(5.0));
        assert!(camera.bearing.is_none());
        assert!(!camera.is_empty());
        assert!(CameraOptions::new().is_empty());
    }
}
