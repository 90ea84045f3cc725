//! Data describing an in-flight camera transition.
//!
//! A transition is a plain value: start time, duration, easing and a
//! precomputed path. It holds no callbacks and spawns nothing; the render
//! loop advances it by calling [`Transform::update_transitions`] once per
//! frame with the current time.
//!
//! [`Transform::update_transitions`]: super::Transform::update_transitions

use nalgebra::Point2;
use web_time::{Duration, Instant};

use meridian_types::mercator;
use meridian_types::{EdgeInsets, LatLng, ScreenCoordinate};

use crate::camera::Easing;
use crate::transform::state::TransformState;

/// Fly-path curvature constant from van Wijk & Nuij, "Smooth and efficient
/// zooming and panning".
pub(super) const FLY_RHO: f64 = 1.42;
/// Default fly-to velocity, screenfuls per second.
pub(super) const FLY_VELOCITY: f64 = 1.2;

pub(super) struct Transition {
    pub start: Instant,
    pub duration: Duration,
    pub easing: Easing,
    pub path: Path,
    pub panning: bool,
    pub scaling: bool,
    pub rotating: bool,
}

impl Transition {
    /// Linear progress in `[0, 1]` at the given time.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Applies the camera values for linear progress `t` to `state`.
    pub fn frame(&self, t: f64, state: &mut TransformState) {
        let k = self.easing.solve(t);
        match &self.path {
            Path::Ease(path) => path.frame(k, state),
            Path::Fly(path) => path.frame(k, t >= 1.0, state),
        }
    }
}

pub(super) enum Path {
    Ease(EasePath),
    Fly(FlyPath),
}

/// Straight interpolation of each camera parameter that the update touches.
pub(super) struct EasePath {
    /// Center path in world pixels at the reference world size.
    pub center: Option<(Point2<f64>, Point2<f64>)>,
    pub world_size: f64,
    pub zoom: Option<(f64, f64)>,
    /// Raw radians; the end value is unwound along the shortest arc.
    pub bearing: Option<(f64, f64)>,
    pub pitch: Option<(f64, f64)>,
    pub padding: Option<(EdgeInsets, EdgeInsets)>,
    /// Screen point and the geographic position pinned under it.
    pub anchor: Option<(ScreenCoordinate, LatLng)>,
}

impl EasePath {
    fn frame(&self, k: f64, state: &mut TransformState) {
        if let Some((start, end)) = &self.center {
            let point = Point2::new(lerp(start.x, end.x, k), lerp(start.y, end.y, k));
            state.set_latlng(mercator::unproject(&point, self.world_size));
        }
        if let Some((start, end)) = self.zoom {
            state.set_zoom(lerp(start, end, k));
        }
        if let Some((start, end)) = self.bearing {
            state.set_bearing(lerp(start, end, k));
        }
        if let Some((start, end)) = self.pitch {
            state.set_pitch(lerp(start, end, k));
        }
        if let Some((start, end)) = &self.padding {
            state.set_padding(EdgeInsets::new(
                lerp(start.top, end.top, k),
                lerp(start.left, end.left, k),
                lerp(start.bottom, end.bottom, k),
                lerp(start.right, end.right, k),
            ));
        }
        if let Some((point, latlng)) = &self.anchor {
            state.move_latlng(*latlng, *point);
        }
    }
}

/// Van Wijk flight path: the camera zooms out along a hyperbolic arc far
/// enough to keep both endpoints conceptually in view, then zooms back in.
pub(super) struct FlyPath {
    pub start_point: Point2<f64>,
    pub end_point: Point2<f64>,
    /// World size the endpoint projection was computed at.
    pub world_size: f64,
    pub start_zoom: f64,
    pub bearing: Option<(f64, f64)>,
    pub pitch: Option<(f64, f64)>,
    pub padding: Option<(EdgeInsets, EdgeInsets)>,
    /// Ground distance between the endpoints, world pixels.
    pub u1: f64,
    /// Start and end visible spans, world pixels.
    pub w0: f64,
    pub w1: f64,
    pub rho: f64,
    pub r0: f64,
    /// Total path length in rho-screenfuls.
    pub s: f64,
    /// Degenerate path: endpoints effectively coincide, only zoom moves.
    pub is_close: bool,
}

impl FlyPath {
    /// Builds the path parameters. Returns `None` when the path is empty
    /// (no movement at all).
    #[allow(clippy::too_many_arguments)]
    pub fn solve(
        start_point: Point2<f64>,
        end_point: Point2<f64>,
        world_size: f64,
        start_zoom: f64,
        end_zoom: f64,
        w0: f64,
        min_zoom: Option<f64>,
        state: &TransformState,
    ) -> Option<FlyPath> {
        let u1 = nalgebra::distance(&start_point, &end_point);
        let w1 = w0 / state.zoom_scale(end_zoom - start_zoom);

        let mut rho = FLY_RHO;
        if let Some(min_zoom) = min_zoom {
            let min_zoom = min_zoom
                .min(start_zoom)
                .min(end_zoom)
                .clamp(state.min_zoom(), state.max_zoom());
            let w_max = w0 / state.zoom_scale(min_zoom - start_zoom);
            if u1 != 0.0 {
                rho = (2.0 * w_max / u1).sqrt().max(0.01);
            }
        }
        let rho2 = rho * rho;

        let r = |i: usize| -> f64 {
            let sign = if i == 0 { 1.0 } else { -1.0 };
            let w = if i == 0 { w0 } else { w1 };
            let b = (w1 * w1 - w0 * w0 + sign * rho2 * rho2 * u1 * u1) / (2.0 * w * rho2 * u1);
            ((b * b + 1.0).sqrt() - b).ln()
        };

        let (r0, r1) = if u1 != 0.0 { (r(0), r(1)) } else { (0.0, 0.0) };
        let is_close = u1.abs() < 1e-6 || !r0.is_finite() || !r1.is_finite();

        let s = if is_close {
            if (w1 - w0).abs() < 1e-12 {
                return None;
            }
            (w1 / w0).ln().abs() / rho
        } else {
            (r1 - r0) / rho
        };

        Some(FlyPath {
            start_point,
            end_point,
            world_size,
            start_zoom,
            bearing: None,
            pitch: None,
            padding: None,
            u1,
            w0,
            w1,
            rho,
            r0,
            s,
            is_close,
        })
    }

    fn frame(&self, k: f64, last: bool, state: &mut TransformState) {
        let s = k * self.s;
        let rho2 = self.rho * self.rho;

        let (w, mut us) = if self.is_close {
            let sign = if self.w1 < self.w0 { -1.0 } else { 1.0 };
            ((sign * self.rho * s).exp(), k)
        } else {
            let w = self.r0.cosh() / (self.r0 + self.rho * s).cosh();
            let us = self.w0
                * ((self.r0.cosh() * (self.r0 + self.rho * s).tanh() - self.r0.sinh()) / rho2)
                / self.u1;
            (w, us)
        };
        if last {
            us = 1.0;
        }

        let point = Point2::new(
            lerp(self.start_point.x, self.end_point.x, us),
            lerp(self.start_point.y, self.end_point.y, us),
        );
        state.set_latlng(mercator::unproject(&point, self.world_size));
        let zoom = self.start_zoom + state.scale_zoom(1.0 / w);
        state.set_zoom(zoom);

        if let Some((start, end)) = self.bearing {
            state.set_bearing(lerp(start, end, k));
        }
        if let Some((start, end)) = self.pitch {
            state.set_pitch(lerp(start, end, k));
        }
        if let Some((start, end)) = &self.padding {
            state.set_padding(EdgeInsets::new(
                lerp(start.top, end.top, k),
                lerp(start.left, end.left, k),
                lerp(start.bottom, end.bottom, k),
                lerp(start.right, end.right, k),
            ));
        }
    }
}

pub(super) fn lerp(start: f64, end: f64, k: f64) -> f64 {
    start + (end - start) * k
}
