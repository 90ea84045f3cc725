//! Camera controller: validated mutation and animation lifecycle.

mod state;
mod transition;

pub use state::{TransformState, DEFAULT_MAX_PITCH, MAX_ZOOM, MIN_ZOOM};

use web_time::{Duration, Instant};

use meridian_types::mercator;
use meridian_types::{EdgeInsets, LatLng, LatLngBounds, ScreenCoordinate, Size};

use crate::camera::{AnimationOptions, CameraOptions, Easing};
use crate::events::TransformEvent;
use crate::observer::CameraChangeMode;
use crate::options::{ConstrainMode, MapOptions, NorthOrientation, ViewportMode};
use transition::{EasePath, FlyPath, Path, Transition, FLY_VELOCITY};

/// The single authority for "what is the camera right now".
///
/// All camera mutation goes through this type. Mutators validate and clamp
/// their input through [`TransformState`] and return the camera notifications
/// they caused, in order; the caller forwards them to its observers. At most
/// one transition is active at a time: starting a new one or jumping
/// abandons the previous transition without firing its completion.
pub struct Transform {
    state: TransformState,
    transition: Option<Transition>,
    gesture_in_progress: bool,
}

impl Transform {
    /// Creates a transform configured from the map options.
    pub fn new(options: &MapOptions) -> Self {
        Self {
            state: TransformState::new(options),
            transition: None,
            gesture_in_progress: false,
        }
    }

    /// Creates a transform around an existing state snapshot. Used for
    /// camera computations on a copy of the live state.
    pub fn from_state(state: TransformState) -> Self {
        Self {
            state,
            transition: None,
            gesture_in_progress: false,
        }
    }

    /// The current geometry snapshot.
    pub fn state(&self) -> &TransformState {
        &self.state
    }

    /// Geographic center.
    pub fn latlng(&self) -> LatLng {
        self.state.latlng()
    }

    /// Zoom level.
    pub fn zoom(&self) -> f64 {
        self.state.zoom()
    }

    /// Bearing in radians.
    pub fn bearing(&self) -> f64 {
        self.state.bearing()
    }

    /// Pitch in radians.
    pub fn pitch(&self) -> f64 {
        self.state.pitch()
    }

    /// The camera as fully populated options.
    pub fn camera_options(&self, padding: Option<EdgeInsets>) -> CameraOptions {
        self.state.camera_options(padding)
    }

    /// Whether a transition is currently active.
    pub fn in_transition(&self) -> bool {
        self.transition.is_some()
    }

    /// Whether the active transition moves the center.
    pub fn is_panning(&self) -> bool {
        self.transition.as_ref().is_some_and(|t| t.panning)
    }

    /// Whether the active transition changes the zoom.
    pub fn is_scaling(&self) -> bool {
        self.transition.as_ref().is_some_and(|t| t.scaling)
    }

    /// Whether the active transition changes the bearing.
    pub fn is_rotating(&self) -> bool {
        self.transition.as_ref().is_some_and(|t| t.rotating)
    }

    /// Marks a user gesture as started or finished.
    pub fn set_gesture_in_progress(&mut self, in_progress: bool) {
        self.gesture_in_progress = in_progress;
    }

    /// Whether a user gesture is in progress.
    pub fn is_gesture_in_progress(&self) -> bool {
        self.gesture_in_progress
    }

    /// Applies a partial camera update immediately.
    ///
    /// Any in-flight transition is abandoned without firing its completion.
    pub fn jump_to(&mut self, camera: &CameraOptions) -> Vec<TransformEvent> {
        self.transition = None;
        let mut events = vec![TransformEvent::CameraWillChange(CameraChangeMode::Immediate)];
        self.apply_camera(camera);
        events.push(TransformEvent::CameraDidChange(CameraChangeMode::Immediate));
        events
    }

    /// Starts a straight interpolation towards the target camera.
    pub fn ease_to(
        &mut self,
        camera: &CameraOptions,
        animation: &AnimationOptions,
    ) -> Vec<TransformEvent> {
        let duration = animation.duration_or_zero();
        if duration.is_zero() {
            return self.jump_to(camera);
        }

        self.transition = None;

        let state = self.state;
        let world_size = state.world_size();

        let center = camera.center.map(|target| {
            let mut target = target;
            target.unwrap_for_shortest_path(&state.latlng());
            (
                mercator::project(&state.latlng(), world_size),
                mercator::project(&target, world_size),
            )
        });
        let zoom = camera.zoom.map(|z| {
            (
                state.zoom(),
                z.clamp(state.min_zoom(), state.max_zoom()),
            )
        });
        let bearing = camera.bearing.map(|deg| {
            let start = state.bearing();
            (start, start + shortest_arc(start, deg.to_radians()))
        });
        let pitch = camera.pitch.map(|deg| {
            (
                state.pitch(),
                deg.to_radians().clamp(state.min_pitch(), state.max_pitch()),
            )
        });
        let padding = camera.padding.map(|p| (state.padding(), p));
        let anchor = match (camera.anchor, camera.center) {
            (Some(point), None) => Some((point, state.screen_coordinate_to_latlng(&point))),
            _ => None,
        };

        self.transition = Some(Transition {
            start: Instant::now(),
            duration,
            easing: animation.easing.unwrap_or_default(),
            panning: center.is_some() || anchor.is_some(),
            scaling: zoom.is_some(),
            rotating: bearing.is_some(),
            path: Path::Ease(EasePath {
                center,
                world_size,
                zoom,
                bearing,
                pitch,
                padding,
                anchor,
            }),
        });

        vec![TransformEvent::CameraWillChange(CameraChangeMode::Animated)]
    }

    /// Starts a curved van Wijk flight towards the target camera: the zoom
    /// backs off far enough to keep both endpoints visible, then dives back
    /// in.
    pub fn fly_to(
        &mut self,
        camera: &CameraOptions,
        animation: &AnimationOptions,
    ) -> Vec<TransformEvent> {
        self.transition = None;

        let state = self.state;
        let size = state.size();
        if size.is_empty() {
            return self.jump_to(camera);
        }

        let start_zoom = state.zoom();
        let end_zoom = camera
            .zoom
            .unwrap_or(start_zoom)
            .clamp(state.min_zoom(), state.max_zoom());

        let mut target = camera.center.unwrap_or(state.latlng());
        target.unwrap_for_shortest_path(&state.latlng());

        let padding = camera.padding.unwrap_or(state.padding());
        let w0 = (size.width() - padding.left - padding.right)
            .max(size.height() - padding.top - padding.bottom);
        if w0 <= 0.0 {
            return self.jump_to(camera);
        }

        let world_size = state.world_size();
        let start_point = mercator::project(&state.latlng(), world_size);
        let end_point = mercator::project(&target, world_size);

        let Some(mut path) = FlyPath::solve(
            start_point,
            end_point,
            world_size,
            start_zoom,
            end_zoom,
            w0,
            animation.min_zoom,
            &state,
        ) else {
            // Nothing to fly over; fall back to an immediate update.
            return self.jump_to(camera);
        };

        path.bearing = camera.bearing.map(|deg| {
            let start = state.bearing();
            (start, start + shortest_arc(start, deg.to_radians()))
        });
        path.pitch = camera.pitch.map(|deg| {
            (
                state.pitch(),
                deg.to_radians().clamp(state.min_pitch(), state.max_pitch()),
            )
        });
        path.padding = camera.padding.map(|p| (state.padding(), p));

        let duration = match animation.duration {
            Some(duration) => duration,
            None => {
                let velocity = animation
                    .velocity
                    .filter(|velocity| velocity.is_finite() && *velocity > 0.0)
                    .unwrap_or(FLY_VELOCITY);
                Duration::from_secs_f64((path.s / velocity).max(0.0))
            }
        };
        if duration.is_zero() {
            return self.jump_to(camera);
        }

        self.transition = Some(Transition {
            start: Instant::now(),
            duration,
            easing: animation.easing.unwrap_or(Easing::linear()),
            panning: true,
            scaling: true,
            rotating: camera.bearing.is_some(),
            path: Path::Fly(path),
        });

        vec![TransformEvent::CameraWillChange(CameraChangeMode::Animated)]
    }

    /// Translates the map content by a screen-space vector.
    pub fn move_by(
        &mut self,
        delta: ScreenCoordinate,
        animation: &AnimationOptions,
    ) -> Vec<TransformEvent> {
        if !delta.is_finite() {
            return Vec::new();
        }
        let center_point = self.state.padding().center(self.state.size());
        let target = self
            .state
            .screen_coordinate_to_latlng(&(center_point - delta));
        self.ease_to(&CameraOptions::new().with_center(target), animation)
    }

    /// Rotates the camera by the angle between two screen vectors around the
    /// viewport center. Degenerate vectors are a no-op.
    pub fn rotate_by(
        &mut self,
        first: ScreenCoordinate,
        second: ScreenCoordinate,
        animation: &AnimationOptions,
    ) -> Vec<TransformEvent> {
        let center = self.state.padding().center(self.state.size());
        let first = first - center;
        let second = second - center;
        if first.magnitude() < 1e-9 || second.magnitude() < 1e-9 {
            return Vec::new();
        }

        let delta = (second.y).atan2(second.x) - (first.y).atan2(first.x);
        if !delta.is_finite() {
            return Vec::new();
        }

        let target = (self.state.bearing() + delta).to_degrees();
        self.ease_to(&CameraOptions::new().with_bearing(target), animation)
    }

    /// Advances the active transition to the given time.
    ///
    /// Returns the camera notifications produced by this frame: an
    /// intermediate change for every tick and the animated completion when
    /// the transition's duration has elapsed.
    pub fn update_transitions(&mut self, now: Instant) -> Vec<TransformEvent> {
        let Some(transition) = &self.transition else {
            return Vec::new();
        };

        let t = transition.progress(now);
        transition.frame(t, &mut self.state);

        if t >= 1.0 {
            self.transition = None;
            vec![
                TransformEvent::CameraIsChanging,
                TransformEvent::CameraDidChange(CameraChangeMode::Animated),
            ]
        } else {
            vec![TransformEvent::CameraIsChanging]
        }
    }

    /// Abandons the active transition, leaving the camera at its current
    /// interpolated value.
    ///
    /// The interrupted transition reports completion as an immediate change,
    /// so observers can tell a forced cancel from a finished animation.
    pub fn cancel_transitions(&mut self) -> Vec<TransformEvent> {
        if self.transition.take().is_some() {
            vec![TransformEvent::CameraDidChange(CameraChangeMode::Immediate)]
        } else {
            Vec::new()
        }
    }

    /// Resizes the viewport.
    pub fn resize(&mut self, size: Size) {
        self.state.resize(size);
    }

    /// Restricts panning to the given bounds.
    pub fn set_latlng_bounds(&mut self, bounds: Option<LatLngBounds>) {
        self.state.set_latlng_bounds(bounds);
    }

    /// Sets the minimum zoom level.
    pub fn set_min_zoom(&mut self, zoom: f64) {
        self.state.set_min_zoom(zoom);
    }

    /// Sets the maximum zoom level.
    pub fn set_max_zoom(&mut self, zoom: f64) {
        self.state.set_max_zoom(zoom);
    }

    /// Sets the minimum pitch, radians.
    pub fn set_min_pitch(&mut self, pitch: f64) {
        self.state.set_min_pitch(pitch);
    }

    /// Sets the maximum pitch, radians.
    pub fn set_max_pitch(&mut self, pitch: f64) {
        self.state.set_max_pitch(pitch);
    }

    /// Sets the compass orientation of the viewport.
    pub fn set_north_orientation(&mut self, orientation: NorthOrientation) {
        self.state.set_north_orientation(orientation);
    }

    /// Sets the camera center constraint mode.
    pub fn set_constrain_mode(&mut self, mode: ConstrainMode) {
        self.state.set_constrain_mode(mode);
    }

    /// Sets the viewport orientation mode.
    pub fn set_viewport_mode(&mut self, mode: ViewportMode) {
        self.state.set_viewport_mode(mode);
    }

    /// Forward projection, see [`TransformState::latlng_to_screen_coordinate`].
    pub fn latlng_to_screen_coordinate(&self, latlng: &LatLng) -> ScreenCoordinate {
        self.state.latlng_to_screen_coordinate(latlng)
    }

    /// Inverse projection, see [`TransformState::screen_coordinate_to_latlng`].
    pub fn screen_coordinate_to_latlng(&self, point: &ScreenCoordinate) -> LatLng {
        self.state.screen_coordinate_to_latlng(point)
    }

    fn apply_camera(&mut self, camera: &CameraOptions) {
        // Capture the anchor's geographic position before any of the other
        // fields move it.
        let anchor = match (camera.anchor, camera.center) {
            (Some(point), None) => Some((point, self.state.screen_coordinate_to_latlng(&point))),
            _ => None,
        };

        if let Some(padding) = camera.padding {
            self.state.set_padding(padding);
        }
        if let Some(center) = camera.center {
            self.state.set_latlng(center);
        }
        if let Some(zoom) = camera.zoom {
            self.state.set_zoom(zoom);
        }
        if let Some(bearing) = camera.bearing {
            self.state.set_bearing(bearing.to_radians());
        }
        if let Some(pitch) = camera.pitch {
            self.state.set_pitch(pitch.to_radians());
        }

        if let Some((point, latlng)) = anchor {
            self.state.move_latlng(latlng, point);
        }
    }
}

/// Shortest signed angular distance from `from` to `to`, radians.
fn shortest_arc(from: f64, to: f64) -> f64 {
    use std::f64::consts::PI;
    let diff = (to - from).rem_euclid(2.0 * PI);
    if diff > PI {
        diff - 2.0 * PI
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn transform() -> Transform {
        let options = MapOptions::new()
            .with_size(Size::new(512.0, 512.0))
            .with_constrain_mode(ConstrainMode::None);
        let mut transform = Transform::new(&options);
        let _ = transform.jump_to(
            &CameraOptions::new()
                .with_center(LatLng::new(0.0, 0.0))
                .with_zoom(5.0),
        );
        transform
    }

    // The margin covers the wall-clock gap between capturing `started` and
    // the transition actually beginning.
    fn finish(transform: &mut Transform, started: Instant, duration: Duration) -> Vec<TransformEvent> {
        transform.update_transitions(started + duration + Duration::from_millis(100))
    }

    #[test]
    fn jump_to_merges_partial_updates() {
        let mut transform = transform();
        let events = transform.jump_to(&CameraOptions::new().with_zoom(8.0));

        assert_eq!(
            events,
            vec![
                TransformEvent::CameraWillChange(CameraChangeMode::Immediate),
                TransformEvent::CameraDidChange(CameraChangeMode::Immediate),
            ]
        );
        assert_abs_diff_eq!(transform.zoom(), 8.0);
        // Untouched fields keep their values.
        assert_abs_diff_eq!(transform.latlng().lat(), 0.0);
        assert_abs_diff_eq!(transform.bearing(), 0.0);
    }

    #[test]
    fn jump_to_clamps_out_of_range_zoom() {
        let mut transform = transform();
        let _ = transform.jump_to(&CameraOptions::new().with_zoom(99.0));
        assert_abs_diff_eq!(transform.zoom(), MAX_ZOOM);
        let _ = transform.jump_to(&CameraOptions::new().with_zoom(-7.0));
        assert_abs_diff_eq!(transform.zoom(), MIN_ZOOM);
    }

    #[test]
    fn ease_to_interpolates_and_completes() {
        let mut transform = transform();
        let start = Instant::now();
        let duration = Duration::from_millis(1000);

        let events = transform.ease_to(
            &CameraOptions::new().with_zoom(10.0),
            &AnimationOptions::with_duration(duration).with_easing(Easing::linear()),
        );
        assert_eq!(
            events,
            vec![TransformEvent::CameraWillChange(CameraChangeMode::Animated)]
        );
        assert!(transform.in_transition());
        assert!(transform.is_scaling());

        let mid = transform.update_transitions(start + Duration::from_millis(500));
        assert_eq!(mid, vec![TransformEvent::CameraIsChanging]);
        assert!(transform.zoom() > 5.0 && transform.zoom() < 10.0);

        let done = finish(&mut transform, start, duration);
        assert_eq!(
            done,
            vec![
                TransformEvent::CameraIsChanging,
                TransformEvent::CameraDidChange(CameraChangeMode::Animated),
            ]
        );
        assert!(!transform.in_transition());
        assert_abs_diff_eq!(transform.zoom(), 10.0);
    }

    #[test]
    fn superseding_transition_drops_the_first_silently() {
        let mut transform = transform();
        let start = Instant::now();

        let _ = transform.ease_to(
            &CameraOptions::new().with_zoom(10.0),
            &AnimationOptions::with_duration(Duration::from_millis(1000)),
        );
        let _ = transform.update_transitions(start + Duration::from_millis(100));

        // Start B; A must never complete.
        let events = transform.ease_to(
            &CameraOptions::new().with_zoom(5.0),
            &AnimationOptions::with_duration(Duration::from_millis(200)),
        );
        assert_eq!(
            events,
            vec![TransformEvent::CameraWillChange(CameraChangeMode::Animated)]
        );

        let done = finish(&mut transform, start + Duration::from_millis(100), Duration::from_millis(200));
        assert_eq!(
            done.last(),
            Some(&TransformEvent::CameraDidChange(CameraChangeMode::Animated))
        );
        assert_abs_diff_eq!(transform.zoom(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn jump_during_transition_collapses_it() {
        let mut transform = transform();
        let _ = transform.ease_to(
            &CameraOptions::new().with_zoom(12.0),
            &AnimationOptions::with_duration(Duration::from_millis(1000)),
        );
        assert!(transform.in_transition());

        let events = transform.jump_to(&CameraOptions::new().with_zoom(3.0));
        assert!(!transform.in_transition());
        assert_abs_diff_eq!(transform.zoom(), 3.0);
        // Only the jump's own immediate events fire.
        assert_eq!(
            events,
            vec![
                TransformEvent::CameraWillChange(CameraChangeMode::Immediate),
                TransformEvent::CameraDidChange(CameraChangeMode::Immediate),
            ]
        );
    }

    #[test]
    fn cancel_reports_immediate_completion() {
        let mut transform = transform();
        let start = Instant::now();
        let _ = transform.ease_to(
            &CameraOptions::new().with_zoom(10.0),
            &AnimationOptions::with_duration(Duration::from_millis(1000))
                .with_easing(Easing::linear()),
        );
        let _ = transform.update_transitions(start + Duration::from_millis(400));
        let zoom_at_cancel = transform.zoom();

        let events = transform.cancel_transitions();
        assert_eq!(
            events,
            vec![TransformEvent::CameraDidChange(CameraChangeMode::Immediate)]
        );
        assert!(!transform.in_transition());
        // The camera keeps the value it had reached.
        assert_abs_diff_eq!(transform.zoom(), zoom_at_cancel);

        assert!(transform.cancel_transitions().is_empty());
    }

    #[test]
    fn zero_duration_ease_is_a_jump() {
        let mut transform = transform();
        let events = transform.ease_to(
            &CameraOptions::new().with_zoom(7.0),
            &AnimationOptions::default(),
        );
        assert!(!transform.in_transition());
        assert_abs_diff_eq!(transform.zoom(), 7.0);
        assert_eq!(
            events,
            vec![
                TransformEvent::CameraWillChange(CameraChangeMode::Immediate),
                TransformEvent::CameraDidChange(CameraChangeMode::Immediate),
            ]
        );
    }

    #[test]
    fn ease_rotates_along_the_shortest_arc() {
        let mut transform = transform();
        let _ = transform.jump_to(&CameraOptions::new().with_bearing(170.0));
        let start = Instant::now();
        let duration = Duration::from_millis(100);

        let _ = transform.ease_to(
            &CameraOptions::new().with_bearing(-170.0),
            &AnimationOptions::with_duration(duration).with_easing(Easing::linear()),
        );
        let _ = transform.update_transitions(start + Duration::from_millis(50));
        // Midway the bearing passes through 180, not 0.
        assert!(transform.bearing().abs() > 170f64.to_radians());

        let _ = finish(&mut transform, start, duration);
        assert_abs_diff_eq!(transform.bearing(), -170f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn fly_to_reaches_target_and_dips_zoom() {
        let mut transform = transform();
        let _ = transform.jump_to(
            &CameraOptions::new()
                .with_center(LatLng::new(0.0, 0.0))
                .with_zoom(12.0),
        );
        let start = Instant::now();
        let duration = Duration::from_millis(1000);

        let target = LatLng::new(40.0, 60.0);
        let events = transform.fly_to(
            &CameraOptions::new().with_center(target).with_zoom(12.0),
            &AnimationOptions::with_duration(duration),
        );
        assert_eq!(
            events,
            vec![TransformEvent::CameraWillChange(CameraChangeMode::Animated)]
        );

        let _ = transform.update_transitions(start + Duration::from_millis(500));
        let mid_zoom = transform.zoom();
        assert!(
            mid_zoom < 12.0,
            "fly path should zoom out midway, got {mid_zoom}"
        );

        let _ = finish(&mut transform, start, duration);
        assert_abs_diff_eq!(transform.zoom(), 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(transform.latlng().lat(), target.lat(), epsilon = 1e-6);
        assert_abs_diff_eq!(transform.latlng().lng(), target.lng(), epsilon = 1e-6);
    }

    #[test]
    fn fly_to_zoom_only_changes_zoom() {
        let mut transform = transform();
        let start = Instant::now();
        let duration = Duration::from_millis(500);

        let _ = transform.fly_to(
            &CameraOptions::new().with_zoom(9.0),
            &AnimationOptions::with_duration(duration),
        );
        let _ = finish(&mut transform, start, duration);

        assert_abs_diff_eq!(transform.zoom(), 9.0, epsilon = 1e-9);
        assert_abs_diff_eq!(transform.latlng().lat(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(transform.latlng().lng(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn move_by_shifts_center_in_screen_space() {
        let mut transform = transform();
        let before = transform.latlng();

        let _ = transform.move_by(ScreenCoordinate::new(0.0, 100.0), &AnimationOptions::default());
        // Dragging the content down reveals ground further north.
        assert!(transform.latlng().lat() > before.lat());
        assert_abs_diff_eq!(transform.latlng().lng(), before.lng(), epsilon = 1e-9);
    }

    #[test]
    fn rotate_by_uses_angle_between_screen_vectors() {
        let mut transform = transform();
        let center = ScreenCoordinate::new(256.0, 256.0);

        let _ = transform.rotate_by(
            center + ScreenCoordinate::new(100.0, 0.0),
            center + ScreenCoordinate::new(0.0, 100.0),
            &AnimationOptions::default(),
        );
        assert_abs_diff_eq!(transform.bearing().abs(), PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn rotate_by_degenerate_vectors_is_a_noop() {
        let mut transform = transform();
        let center = ScreenCoordinate::new(256.0, 256.0);

        let events = transform.rotate_by(center, center, &AnimationOptions::default());
        assert!(events.is_empty());
        assert_abs_diff_eq!(transform.bearing(), 0.0);
        assert!(transform.bearing().is_finite());
    }

    #[test]
    fn anchor_stays_fixed_during_zoom_jump() {
        let mut transform = transform();
        let anchor = ScreenCoordinate::new(100.0, 100.0);
        let pinned = transform.screen_coordinate_to_latlng(&anchor);

        let _ = transform.jump_to(&CameraOptions::new().with_zoom(7.0).with_anchor(anchor));

        let after = transform.latlng_to_screen_coordinate(&pinned);
        assert_abs_diff_eq!(after.x, anchor.x, epsilon = 1e-6);
        assert_abs_diff_eq!(after.y, anchor.y, epsilon = 1e-6);
    }

    #[test]
    fn gesture_flag_is_plain_state() {
        let mut transform = transform();
        assert!(!transform.is_gesture_in_progress());
        transform.set_gesture_in_progress(true);
        assert!(transform.is_gesture_in_progress());
        transform.set_gesture_in_progress(false);
        assert!(!transform.is_gesture_in_progress());
    }
}
