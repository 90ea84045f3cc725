//! The map facade.

mod hub;

pub use hub::StillImageCallback;

use std::path::PathBuf;

use web_time::Instant;

use meridian_types::{EdgeInsets, LatLng, LatLngBounds, ScreenCoordinate, Size};

use crate::camera::{AnimationOptions, CameraOptions};
use crate::error::MapError;
use crate::events::{RendererEvent, StyleEvent};
use crate::file_source::SharedFileSource;
use crate::journal::{ActionJournal, ActionJournalOptions};
use crate::observer::MapObserver;
use crate::options::{
    BoundOptions, ClientOptions, ConstrainMode, MapDebugOptions, MapMode, MapOptions,
    NorthOrientation, ViewportMode,
};
use crate::renderer::RendererFrontend;
use crate::style::Style;
use crate::transform::Transform;
use hub::MapHub;

/// Default number of zoom levels below the target at which tiles are
/// requested first, for a fast low-resolution preview.
pub const DEFAULT_PREFETCH_ZOOM_DELTA: u8 = 4;

/// An interactive vector map.
///
/// The map owns the camera and the event hub; the style, the renderer and
/// the resource loader are external collaborators reached through narrow
/// interfaces. All methods must be called from the render thread, including
/// [`handle_style_event`](Map::handle_style_event) and
/// [`handle_renderer_event`](Map::handle_renderer_event) that marshal
/// notifications produced elsewhere.
pub struct Map {
    hub: MapHub,
    options: MapOptions,
    client_options: ClientOptions,
    debug: MapDebugOptions,
    prefetch_zoom_delta: u8,
}

impl Map {
    /// Creates a map.
    ///
    /// When the journal options enable it, an [`ActionJournal`] is attached
    /// and mirrors the observer events; its directory must be distinct per
    /// map instance.
    pub fn new(
        options: MapOptions,
        journal_options: &ActionJournalOptions,
        observer: Box<dyn MapObserver>,
        frontend: Box<dyn RendererFrontend>,
        file_source: Option<SharedFileSource>,
    ) -> Self {
        let client_options = file_source
            .as_ref()
            .map(|source| source.client_options())
            .unwrap_or_default();
        let journal = journal_options
            .enabled
            .then(|| ActionJournal::new(journal_options, client_options.clone()));
        let transform = Transform::new(&options);
        Self {
            hub: MapHub::new(observer, frontend, transform, journal),
            options,
            client_options,
            debug: MapDebugOptions::default(),
            prefetch_zoom_delta: DEFAULT_PREFETCH_ZOOM_DELTA,
        }
    }

    // ---- camera ----

    /// Applies a partial camera update immediately.
    pub fn jump_to(&mut self, camera: &CameraOptions) {
        self.hub.camera_mutated = true;
        let events = self.hub.transform.jump_to(camera);
        self.hub.dispatch_transform_events(events);
    }

    /// Animates the camera towards the target along straight interpolation.
    pub fn ease_to(&mut self, camera: &CameraOptions, animation: &AnimationOptions) {
        self.hub.camera_mutated = true;
        let events = self.hub.transform.ease_to(camera, animation);
        self.hub.dispatch_transform_events(events);
    }

    /// Animates the camera along a curved flight path that zooms out and
    /// back in, keeping both endpoints in view.
    pub fn fly_to(&mut self, camera: &CameraOptions, animation: &AnimationOptions) {
        self.hub.camera_mutated = true;
        let events = self.hub.transform.fly_to(camera, animation);
        self.hub.dispatch_transform_events(events);
    }

    /// Translates the map content by a screen-space vector.
    pub fn move_by(&mut self, delta: ScreenCoordinate, animation: &AnimationOptions) {
        self.hub.camera_mutated = true;
        let events = self.hub.transform.move_by(delta, animation);
        self.hub.dispatch_transform_events(events);
    }

    /// Multiplies the zoom scale by `scale`, optionally keeping the given
    /// screen point fixed. A non-positive or non-finite scale is a no-op.
    pub fn scale_by(
        &mut self,
        scale: f64,
        anchor: Option<ScreenCoordinate>,
        animation: &AnimationOptions,
    ) {
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }
        let zoom = self.hub.transform.zoom() + self.hub.transform.state().scale_zoom(scale);
        let mut camera = CameraOptions::new().with_zoom(zoom);
        camera.anchor = anchor;
        self.ease_to(&camera, animation);
    }

    /// Tilts the camera by `delta` degrees towards the vertical view.
    pub fn pitch_by(&mut self, delta: f64, animation: &AnimationOptions) {
        let pitch = self.hub.transform.pitch().to_degrees() - delta;
        self.ease_to(&CameraOptions::new().with_pitch(pitch), animation);
    }

    /// Rotates the camera by the angle between two screen vectors around the
    /// viewport center.
    pub fn rotate_by(
        &mut self,
        first: ScreenCoordinate,
        second: ScreenCoordinate,
        animation: &AnimationOptions,
    ) {
        self.hub.camera_mutated = true;
        let events = self.hub.transform.rotate_by(first, second, animation);
        self.hub.dispatch_transform_events(events);
    }

    /// Abandons the active transition, leaving the camera where it is.
    pub fn cancel_transitions(&mut self) {
        self.hub.cancel_transitions();
    }

    /// Advances the active transition; called once per frame by the render
    /// loop.
    pub fn tick(&mut self, now: Instant) {
        let events = self.hub.transform.update_transitions(now);
        self.hub.dispatch_transform_events(events);
    }

    /// The current camera as fully populated options.
    pub fn camera_options(&self, padding: Option<EdgeInsets>) -> CameraOptions {
        self.hub.transform.camera_options(padding)
    }

    /// Whether a camera transition is active.
    pub fn in_transition(&self) -> bool {
        self.hub.transform.in_transition()
    }

    /// Whether the active transition moves the center.
    pub fn is_panning(&self) -> bool {
        self.hub.transform.is_panning()
    }

    /// Whether the active transition changes the zoom.
    pub fn is_scaling(&self) -> bool {
        self.hub.transform.is_scaling()
    }

    /// Whether the active transition changes the bearing.
    pub fn is_rotating(&self) -> bool {
        self.hub.transform.is_rotating()
    }

    /// Marks a user gesture as started or finished.
    pub fn set_gesture_in_progress(&mut self, in_progress: bool) {
        self.hub.transform.set_gesture_in_progress(in_progress);
    }

    /// Whether a user gesture is in progress.
    pub fn is_gesture_in_progress(&self) -> bool {
        self.hub.transform.is_gesture_in_progress()
    }

    // ---- camera computation ----

    /// Camera that fits all the given points into the padded viewport.
    ///
    /// The camera is computed for the given bearing and pitch when present,
    /// otherwise for the current ones. The live camera is not touched.
    pub fn camera_for_latlngs(
        &self,
        latlngs: &[LatLng],
        padding: EdgeInsets,
        bearing: Option<f64>,
        pitch: Option<f64>,
    ) -> CameraOptions {
        if bearing.is_some() || pitch.is_some() {
            let mut probe = Transform::from_state(*self.hub.transform.state());
            let mut orientation = CameraOptions::new();
            orientation.bearing = bearing;
            orientation.pitch = pitch;
            let _ = probe.jump_to(&orientation);
            let mut camera = camera_for_latlngs_on(&probe, latlngs, &padding);
            camera.bearing = bearing;
            camera.pitch = pitch;
            camera
        } else {
            camera_for_latlngs_on(&self.hub.transform, latlngs, &padding)
        }
    }

    /// Camera that fits the bounding box into the padded viewport.
    pub fn camera_for_latlng_bounds(
        &self,
        bounds: &LatLngBounds,
        padding: EdgeInsets,
        bearing: Option<f64>,
        pitch: Option<f64>,
    ) -> CameraOptions {
        let corners = [
            bounds.southwest(),
            bounds.northwest(),
            bounds.northeast(),
            bounds.southeast(),
        ];
        self.camera_for_latlngs(&corners, padding, bearing, pitch)
    }

    /// Geographic area visible under the given camera, corners wrapped into
    /// `[-180, 180)`.
    pub fn latlng_bounds_for_camera(&self, camera: &CameraOptions) -> LatLngBounds {
        self.bounds_for_camera(camera, true)
    }

    /// Like [`latlng_bounds_for_camera`](Map::latlng_bounds_for_camera) but
    /// with raw longitudes, so boxes across the antimeridian stay
    /// contiguous.
    pub fn latlng_bounds_for_camera_unwrapped(&self, camera: &CameraOptions) -> LatLngBounds {
        self.bounds_for_camera(camera, false)
    }

    fn bounds_for_camera(&self, camera: &CameraOptions, wrap: bool) -> LatLngBounds {
        let mut probe = Transform::from_state(*self.hub.transform.state());
        let _ = probe.jump_to(camera);
        let size = probe.state().size();
        let corners = [
            ScreenCoordinate::new(0.0, 0.0),
            ScreenCoordinate::new(size.width(), 0.0),
            ScreenCoordinate::new(size.width(), size.height()),
            ScreenCoordinate::new(0.0, size.height()),
        ];
        let mut points = corners
            .iter()
            .map(|corner| probe.screen_coordinate_to_latlng(corner));
        let first = points.next().map(|point| if wrap { point.wrapped() } else { point });
        let mut bounds = match first {
            Some(point) => LatLngBounds::hull(point, point),
            None => LatLngBounds::world(),
        };
        for point in points {
            bounds.extend(if wrap { point.wrapped() } else { point });
        }
        bounds
    }

    /// Projects a geographic position to viewport pixels, picking the world
    /// copy closest to the current center.
    pub fn pixel_for_latlng(&self, latlng: &LatLng) -> ScreenCoordinate {
        let mut unwrapped = latlng.wrapped();
        unwrapped.unwrap_for_shortest_path(&self.hub.transform.latlng());
        self.hub.transform.latlng_to_screen_coordinate(&unwrapped)
    }

    /// Converts a viewport pixel position to a geographic position.
    pub fn latlng_for_pixel(&self, pixel: &ScreenCoordinate) -> LatLng {
        self.hub.transform.screen_coordinate_to_latlng(pixel).wrapped()
    }

    /// Vector form of [`pixel_for_latlng`](Map::pixel_for_latlng).
    pub fn pixels_for_latlngs(&self, latlngs: &[LatLng]) -> Vec<ScreenCoordinate> {
        latlngs.iter().map(|latlng| self.pixel_for_latlng(latlng)).collect()
    }

    /// Vector form of [`latlng_for_pixel`](Map::latlng_for_pixel).
    pub fn latlngs_for_pixels(&self, pixels: &[ScreenCoordinate]) -> Vec<LatLng> {
        pixels.iter().map(|pixel| self.latlng_for_pixel(pixel)).collect()
    }

    // ---- bounds ----

    /// Updates the camera limits. When the current camera falls outside the
    /// new limits it is re-jumped to the closest allowed value, with the
    /// usual camera change notifications.
    pub fn set_bounds(&mut self, options: &BoundOptions) {
        let before = *self.hub.transform.state();
        let mut jump = CameraOptions::new();

        if let Some(min_zoom) = options.min_zoom {
            self.hub.transform.set_min_zoom(min_zoom);
        }
        if let Some(max_zoom) = options.max_zoom {
            self.hub.transform.set_max_zoom(max_zoom);
        }
        if let Some(min_pitch) = options.min_pitch {
            self.hub.transform.set_min_pitch(min_pitch.to_radians());
        }
        if let Some(max_pitch) = options.max_pitch {
            self.hub.transform.set_max_pitch(max_pitch.to_radians());
        }
        if let Some(bounds) = options.bounds {
            self.hub.transform.set_latlng_bounds(Some(bounds));
            if !bounds.contains(&before.latlng()) {
                jump.center = Some(bounds.constrain(&before.latlng()));
            }
        }

        let after = self.hub.transform.state();
        if before.zoom() < after.min_zoom() || before.zoom() > after.max_zoom() {
            jump.zoom = Some(before.zoom().clamp(after.min_zoom(), after.max_zoom()));
        }
        if before.pitch() < after.min_pitch() || before.pitch() > after.max_pitch() {
            let pitch = before.pitch().clamp(after.min_pitch(), after.max_pitch());
            jump.pitch = Some(pitch.to_degrees());
        }

        if !jump.is_empty() {
            self.jump_to(&jump);
        }
    }

    /// The current camera limits.
    pub fn bounds(&self) -> BoundOptions {
        let state = self.hub.transform.state();
        BoundOptions {
            bounds: state.latlng_bounds(),
            min_zoom: Some(state.min_zoom()),
            max_zoom: Some(state.max_zoom()),
            min_pitch: Some(state.min_pitch().to_degrees()),
            max_pitch: Some(state.max_pitch().to_degrees()),
        }
    }

    // ---- style and events ----

    /// Replaces the style and begins loading it. Any active camera
    /// transition is cancelled first.
    pub fn set_style(&mut self, style: Box<dyn Style>) {
        self.hub.set_style(style);
    }

    /// The current style, if one was set.
    pub fn style(&self) -> Option<&dyn Style> {
        self.hub.style.as_deref()
    }

    /// Feeds a style notification into the hub.
    pub fn handle_style_event(&mut self, event: StyleEvent) {
        self.hub.dispatch_style_event(event);
    }

    /// Feeds a renderer notification into the hub.
    pub fn handle_renderer_event(&mut self, event: RendererEvent) {
        self.hub.dispatch_renderer_event(event);
    }

    /// Whether the style and every rendered resource finished loading.
    pub fn is_fully_loaded(&self) -> bool {
        self.hub.is_fully_loaded()
    }

    // ---- still images ----

    /// Requests a still image of the current map state.
    ///
    /// Only valid in [`MapMode::Static`] and [`MapMode::Tile`]; misuse is
    /// reported through the callback, never panics, and leaves the map
    /// usable. The callback resolves once the renderer reports a fully
    /// loaded frame.
    pub fn render_still(&mut self, callback: StillImageCallback) {
        if self.options.map_mode == MapMode::Continuous {
            callback(Err(MapError::Misuse(
                "render_still is only supported in static and tile modes".into(),
            )));
            return;
        }
        self.start_still_image_request(callback);
    }

    /// Jumps to the given camera and debug options, then requests a still
    /// image. Only valid in [`MapMode::Static`].
    pub fn render_still_with(
        &mut self,
        camera: &CameraOptions,
        debug: MapDebugOptions,
        callback: StillImageCallback,
    ) {
        if self.options.map_mode != MapMode::Static {
            callback(Err(MapError::Misuse(
                "render_still with a camera is only supported in static mode".into(),
            )));
            return;
        }
        self.jump_to(camera);
        self.debug = debug;
        self.start_still_image_request(callback);
    }

    fn start_still_image_request(&mut self, callback: StillImageCallback) {
        if self.hub.still_image_request.is_some() {
            callback(Err(MapError::Misuse(
                "a still image request is already in flight".into(),
            )));
            return;
        }
        if let Some(error) = self.hub.style.as_ref().and_then(|style| style.last_error()) {
            callback(Err(error));
            return;
        }
        self.hub.still_image_request = Some(callback);
        self.hub.on_update();
    }

    // ---- configuration and diagnostics ----

    /// Schedules a repaint.
    pub fn trigger_repaint(&mut self) {
        self.hub.on_update();
    }

    /// Sets the debug overlays.
    pub fn set_debug(&mut self, debug: MapDebugOptions) {
        self.debug = debug;
        self.hub.on_update();
    }

    /// The active debug overlays.
    pub fn debug(&self) -> MapDebugOptions {
        self.debug
    }

    /// Sets how many zoom levels below the target tiles are prefetched at.
    pub fn set_prefetch_zoom_delta(&mut self, delta: u8) {
        self.prefetch_zoom_delta = delta;
        self.hub.on_update();
    }

    /// The prefetch zoom delta.
    pub fn prefetch_zoom_delta(&self) -> u8 {
        self.prefetch_zoom_delta
    }

    /// The map configuration with its current mutable values.
    pub fn map_options(&self) -> MapOptions {
        let state = self.hub.transform.state();
        MapOptions {
            map_mode: self.options.map_mode,
            constrain_mode: state.constrain_mode(),
            viewport_mode: state.viewport_mode(),
            cross_source_collisions: self.options.cross_source_collisions,
            north_orientation: state.north_orientation(),
            size: state.size(),
            pixel_ratio: self.options.pixel_ratio,
            annotations_enabled: self.options.annotations_enabled,
        }
    }

    /// Identity of the embedding application.
    pub fn client_options(&self) -> ClientOptions {
        self.client_options.clone()
    }

    /// Logs a snapshot of the map state at info level.
    pub fn dump_debug_logs(&self) {
        log::info!("--------------------------------------------------------------------------------");
        let state = self.hub.transform.state();
        log::info!(
            "camera: center {:?}, zoom {}, bearing {} deg, pitch {} deg",
            state.latlng(),
            state.zoom(),
            state.bearing().to_degrees(),
            state.pitch().to_degrees(),
        );
        match &self.hub.style {
            Some(style) => log::info!(
                "style: name {:?}, url {:?}, loaded {}",
                style.name(),
                style.url(),
                style.is_loaded(),
            ),
            None => log::info!("style: none"),
        }
        log::info!(
            "flags: fully loaded {}, in transition {}, gesture {}",
            self.is_fully_loaded(),
            self.in_transition(),
            self.is_gesture_in_progress(),
        );
        log::info!("--------------------------------------------------------------------------------");
    }

    /// Resizes the viewport.
    pub fn set_size(&mut self, size: Size) {
        self.hub.transform.resize(size);
        self.hub.on_update();
    }

    /// Sets the compass orientation of the viewport.
    pub fn set_north_orientation(&mut self, orientation: NorthOrientation) {
        self.hub.transform.set_north_orientation(orientation);
        self.hub.on_update();
    }

    /// Sets the camera center constraint mode.
    pub fn set_constrain_mode(&mut self, mode: ConstrainMode) {
        self.hub.transform.set_constrain_mode(mode);
        self.hub.on_update();
    }

    /// Sets the viewport orientation mode.
    pub fn set_viewport_mode(&mut self, mode: ViewportMode) {
        self.hub.transform.set_viewport_mode(mode);
        self.hub.on_update();
    }

    /// Paths of the action journal files on disk, newest first. Empty when
    /// the journal is disabled.
    pub fn action_journal_log_files(&self) -> Vec<PathBuf> {
        self.hub
            .journal
            .as_ref()
            .map(ActionJournal::log_files)
            .unwrap_or_default()
    }
}

/// Fits the points into the padded viewport of the given transform.
///
/// With degenerate geometry or padding larger than the viewport the zoom
/// cannot be computed; it is left unchanged and a warning is logged.
fn camera_for_latlngs_on(
    transform: &Transform,
    latlngs: &[LatLng],
    padding: &EdgeInsets,
) -> CameraOptions {
    if latlngs.is_empty() {
        return CameraOptions::new();
    }

    let state = transform.state();
    let size = state.size();

    let mut min = ScreenCoordinate::new(f64::INFINITY, f64::INFINITY);
    let mut max = ScreenCoordinate::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    let center = transform.latlng();
    for latlng in latlngs {
        let mut unwrapped = latlng.wrapped();
        unwrapped.unwrap_for_shortest_path(&center);
        let pixel = transform.latlng_to_screen_coordinate(&unwrapped);
        min.x = min.x.min(pixel.x);
        min.y = min.y.min(pixel.y);
        max.x = max.x.max(pixel.x);
        max.y = max.y.max(pixel.y);
    }

    let width = max.x - min.x;
    let height = max.y - min.y;
    let scale_x = (size.width() - padding.left - padding.right) / width;
    let scale_y = (size.height() - padding.top - padding.bottom) / height;
    let min_scale = scale_x.min(scale_y);

    let mut zoom = transform.zoom() + state.scale_zoom(min_scale);
    if !zoom.is_finite() || min_scale <= 0.0 {
        log::warn!(
            "cannot fit {} points into a {}x{} viewport with the given padding, keeping zoom",
            latlngs.len(),
            size.width(),
            size.height(),
        );
        zoom = transform.zoom();
    }
    zoom = zoom.clamp(state.min_zoom(), state.max_zoom());

    // The box midpoint is shifted so the fitted content centers within the
    // padded area; the padding is given at the target zoom, so it scales
    // back to current-view pixels.
    let mut center_pixel =
        ScreenCoordinate::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
    if min_scale.is_finite() && min_scale > 0.0 {
        center_pixel.x += (padding.left - padding.right) / (2.0 * min_scale);
        center_pixel.y += (padding.top - padding.bottom) / (2.0 * min_scale);
    }
    let center = transform.screen_coordinate_to_latlng(&center_pixel).wrapped();

    CameraOptions::new().with_center(center).with_zoom(zoom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{CameraChangeMode, RenderFrameStatus, RenderMode};
    use crate::renderer::NullRendererFrontend;
    use crate::style::FixedStyle;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorded {
        events: Vec<String>,
    }

    impl Recorded {
        fn count(&self, name: &str) -> usize {
            self.events.iter().filter(|event| *event == name).count()
        }
    }

    struct RecordingObserver(Rc<RefCell<Recorded>>);

    impl MapObserver for RecordingObserver {
        fn on_camera_will_change(&mut self, mode: CameraChangeMode) {
            self.0
                .borrow_mut()
                .events
                .push(format!("camera_will_change:{mode:?}"));
        }
        fn on_camera_did_change(&mut self, mode: CameraChangeMode) {
            self.0
                .borrow_mut()
                .events
                .push(format!("camera_did_change:{mode:?}"));
        }
        fn on_will_start_loading_map(&mut self) {
            self.0.borrow_mut().events.push("will_start_loading".into());
        }
        fn on_did_finish_loading_style(&mut self) {
            self.0.borrow_mut().events.push("style_loaded".into());
        }
        fn on_did_finish_loading_map(&mut self) {
            self.0.borrow_mut().events.push("map_loaded".into());
        }
        fn on_did_fail_loading_map(&mut self, _error: &MapError) {
            self.0.borrow_mut().events.push("load_failed".into());
        }
        fn on_did_become_idle(&mut self) {
            self.0.borrow_mut().events.push("idle".into());
        }
    }

    fn map_with_observer(mode: MapMode) -> (Map, Rc<RefCell<Recorded>>) {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let map = Map::new(
            MapOptions::new()
                .with_map_mode(mode)
                .with_size(Size::new(512.0, 512.0))
                .with_constrain_mode(ConstrainMode::None),
            &ActionJournalOptions::new(),
            Box::new(RecordingObserver(recorded.clone())),
            Box::new(NullRendererFrontend),
            None,
        );
        (map, recorded)
    }

    fn loaded_frame() -> RenderFrameStatus {
        RenderFrameStatus {
            mode: RenderMode::Full,
            needs_repaint: false,
            placement_changed: false,
            frame_encoding_time: 0.0,
            frame_rendering_time: 0.0,
        }
    }

    fn load_style(map: &mut Map) {
        map.set_style(Box::new(FixedStyle::new().with_loaded(true)));
        map.handle_style_event(StyleEvent::Loaded);
    }

    #[test]
    fn idle_fires_exactly_once_per_idle_transition() {
        let (mut map, recorded) = map_with_observer(MapMode::Continuous);
        load_style(&mut map);

        for _ in 0..5 {
            map.handle_renderer_event(RendererEvent::DidFinishRenderingFrame(loaded_frame()));
        }
        assert_eq!(recorded.borrow().count("idle"), 1);

        // A new repaint ends the idle period; the next settled frame
        // notifies again.
        map.trigger_repaint();
        map.handle_renderer_event(RendererEvent::DidFinishRenderingFrame(loaded_frame()));
        assert_eq!(recorded.borrow().count("idle"), 2);
    }

    #[test]
    fn camera_is_preserved_across_style_reload() {
        let (mut map, _) = map_with_observer(MapMode::Continuous);
        map.jump_to(
            &CameraOptions::new()
                .with_center(LatLng::new(10.0, 20.0))
                .with_zoom(5.0),
        );

        // The new style declares no camera of its own.
        load_style(&mut map);

        let camera = map.camera_options(None);
        assert_abs_diff_eq!(camera.center.unwrap().lat(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(camera.center.unwrap().lng(), 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(camera.zoom.unwrap(), 5.0);
    }

    #[test]
    fn style_default_camera_applies_only_when_camera_untouched() {
        let (mut map, _) = map_with_observer(MapMode::Continuous);
        let styled_camera = CameraOptions::new()
            .with_center(LatLng::new(48.0, 2.0))
            .with_zoom(9.0);

        map.set_style(Box::new(
            FixedStyle::new()
                .with_loaded(true)
                .with_default_camera(styled_camera),
        ));
        map.handle_style_event(StyleEvent::Loaded);
        assert_abs_diff_eq!(map.camera_options(None).zoom.unwrap(), 9.0);

        // A camera call between load start and load end wins over the
        // style's declared camera.
        map.set_style(Box::new(
            FixedStyle::new()
                .with_loaded(true)
                .with_default_camera(styled_camera),
        ));
        map.jump_to(&CameraOptions::new().with_zoom(3.0));
        map.handle_style_event(StyleEvent::Loaded);
        assert_abs_diff_eq!(map.camera_options(None).zoom.unwrap(), 3.0);
    }

    #[test]
    fn camera_for_latlngs_round_trips_through_visible_bounds() {
        let (mut map, _) = map_with_observer(MapMode::Continuous);
        map.jump_to(&CameraOptions::new().with_zoom(3.0));

        let corners = [
            LatLng::new(10.0, 10.0),
            LatLng::new(10.0, 20.0),
            LatLng::new(20.0, 20.0),
            LatLng::new(20.0, 10.0),
        ];
        let camera = map.camera_for_latlngs(&corners, EdgeInsets::default(), None, None);
        assert!(camera.center.is_some());
        assert!(camera.zoom.is_some());

        let bounds = map.latlng_bounds_for_camera(&camera);
        for corner in corners {
            assert!(
                bounds.southwest().lat() <= corner.lat() + 1e-6
                    && bounds.northeast().lat() >= corner.lat() - 1e-6
                    && bounds.southwest().lng() <= corner.lng() + 1e-6
                    && bounds.northeast().lng() >= corner.lng() - 1e-6,
                "{corner:?} not inside {bounds:?}"
            );
        }
    }

    #[test]
    fn camera_for_latlngs_degenerate_geometry_keeps_zoom() {
        let (mut map, _) = map_with_observer(MapMode::Continuous);
        map.jump_to(&CameraOptions::new().with_zoom(6.0));

        // A single point has a zero-size pixel box.
        let camera = map.camera_for_latlngs(
            &[LatLng::new(10.0, 10.0)],
            EdgeInsets::default(),
            None,
            None,
        );
        assert_abs_diff_eq!(camera.zoom.unwrap(), 6.0);
        assert_abs_diff_eq!(camera.center.unwrap().lat(), 10.0, epsilon = 1e-6);

        // Padding wider than the viewport makes the scale negative.
        let camera = map.camera_for_latlngs(
            &[LatLng::new(10.0, 10.0), LatLng::new(20.0, 20.0)],
            EdgeInsets::new(0.0, 600.0, 0.0, 600.0),
            None,
            None,
        );
        assert_abs_diff_eq!(camera.zoom.unwrap(), 6.0);
    }

    #[test]
    fn camera_for_latlng_bounds_carries_orientation() {
        let (map, _) = map_with_observer(MapMode::Continuous);
        let bounds = LatLngBounds::hull(LatLng::new(10.0, 10.0), LatLng::new(20.0, 20.0));
        let camera =
            map.camera_for_latlng_bounds(&bounds, EdgeInsets::default(), Some(30.0), Some(20.0));
        assert_abs_diff_eq!(camera.bearing.unwrap(), 30.0);
        assert_abs_diff_eq!(camera.pitch.unwrap(), 20.0);
    }

    #[test]
    fn render_still_misuse_is_reported_through_the_callback() {
        let (mut map, _) = map_with_observer(MapMode::Continuous);
        let result = Rc::new(RefCell::new(None));

        let sink = result.clone();
        map.render_still(Box::new(move |outcome| {
            *sink.borrow_mut() = Some(outcome);
        }));
        assert_matches!(result.borrow().as_ref(), Some(Err(MapError::Misuse(_))));

        // The map stays usable.
        map.jump_to(&CameraOptions::new().with_zoom(4.0));
        assert_abs_diff_eq!(map.camera_options(None).zoom.unwrap(), 4.0);
    }

    #[test]
    fn concurrent_still_requests_are_a_misuse() {
        let (mut map, _) = map_with_observer(MapMode::Static);
        load_style(&mut map);

        let first = Rc::new(RefCell::new(None));
        let sink = first.clone();
        map.render_still(Box::new(move |outcome| {
            *sink.borrow_mut() = Some(outcome);
        }));
        assert!(first.borrow().is_none());

        let second = Rc::new(RefCell::new(None));
        let sink = second.clone();
        map.render_still(Box::new(move |outcome| {
            *sink.borrow_mut() = Some(outcome);
        }));
        assert_matches!(second.borrow().as_ref(), Some(Err(MapError::Misuse(_))));

        // The pending request resolves once a fully loaded frame lands.
        map.handle_renderer_event(RendererEvent::DidFinishRenderingFrame(loaded_frame()));
        assert_matches!(first.borrow().as_ref(), Some(Ok(())));
    }

    #[test]
    fn style_error_short_circuits_still_requests() {
        let (mut map, recorded) = map_with_observer(MapMode::Static);
        let mut style = FixedStyle::new();
        style.error = Some(MapError::Style("parse failed".into()));
        map.set_style(Box::new(style));
        map.handle_style_event(StyleEvent::Error(MapError::Style("parse failed".into())));
        assert_eq!(recorded.borrow().count("load_failed"), 1);
        assert!(!map.is_fully_loaded());

        let result = Rc::new(RefCell::new(None));
        let sink = result.clone();
        map.render_still(Box::new(move |outcome| {
            *sink.borrow_mut() = Some(outcome);
        }));
        assert_matches!(result.borrow().as_ref(), Some(Err(MapError::Style(_))));
    }

    #[test]
    fn set_bounds_rejumps_an_out_of_range_camera() {
        let (mut map, recorded) = map_with_observer(MapMode::Continuous);
        map.jump_to(&CameraOptions::new().with_zoom(5.0));
        let changes_before = recorded.borrow().count("camera_did_change:Immediate");

        map.set_bounds(&BoundOptions::new().with_min_zoom(10.0));

        assert_abs_diff_eq!(map.camera_options(None).zoom.unwrap(), 10.0);
        assert!(recorded.borrow().count("camera_did_change:Immediate") > changes_before);
        assert_abs_diff_eq!(map.bounds().min_zoom.unwrap(), 10.0);
    }

    #[test]
    fn set_bounds_constrains_the_center() {
        let (mut map, _) = map_with_observer(MapMode::Continuous);
        map.jump_to(&CameraOptions::new().with_center(LatLng::new(40.0, 40.0)));

        let bounds = LatLngBounds::hull(LatLng::new(-10.0, -10.0), LatLng::new(10.0, 10.0));
        map.set_bounds(&BoundOptions::new().with_latlng_bounds(bounds));

        let center = map.camera_options(None).center.unwrap();
        assert_abs_diff_eq!(center.lat(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(center.lng(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn scale_by_adds_log2_of_the_factor() {
        let (mut map, _) = map_with_observer(MapMode::Continuous);
        map.jump_to(&CameraOptions::new().with_zoom(5.0));

        map.scale_by(2.0, None, &AnimationOptions::default());
        assert_abs_diff_eq!(map.camera_options(None).zoom.unwrap(), 6.0, epsilon = 1e-9);

        map.scale_by(0.25, None, &AnimationOptions::default());
        assert_abs_diff_eq!(map.camera_options(None).zoom.unwrap(), 4.0, epsilon = 1e-9);

        // Degenerate factors are ignored.
        map.scale_by(0.0, None, &AnimationOptions::default());
        map.scale_by(f64::NAN, None, &AnimationOptions::default());
        assert_abs_diff_eq!(map.camera_options(None).zoom.unwrap(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn pitch_by_tilts_towards_vertical() {
        let (mut map, _) = map_with_observer(MapMode::Continuous);
        map.jump_to(&CameraOptions::new().with_pitch(30.0));

        map.pitch_by(10.0, &AnimationOptions::default());
        assert_abs_diff_eq!(map.camera_options(None).pitch.unwrap(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn pixel_round_trip_through_the_facade() {
        let (mut map, _) = map_with_observer(MapMode::Continuous);
        map.jump_to(
            &CameraOptions::new()
                .with_center(LatLng::new(40.0, -74.0))
                .with_zoom(10.0),
        );

        let latlng = LatLng::new(40.1, -74.1);
        let pixel = map.pixel_for_latlng(&latlng);
        let back = map.latlng_for_pixel(&pixel);
        assert_abs_diff_eq!(back.lat(), latlng.lat(), epsilon = 1e-6);
        assert_abs_diff_eq!(back.lng(), latlng.lng(), epsilon = 1e-6);

        assert_eq!(map.pixels_for_latlngs(&[latlng]).len(), 1);
        assert_eq!(map.latlngs_for_pixels(&[pixel]).len(), 1);
    }

    #[test]
    fn fully_loaded_requires_style_and_renderer() {
        let (mut map, _) = map_with_observer(MapMode::Continuous);
        assert!(!map.is_fully_loaded());

        load_style(&mut map);
        assert!(!map.is_fully_loaded());

        map.handle_renderer_event(RendererEvent::DidFinishRenderingFrame(loaded_frame()));
        assert!(map.is_fully_loaded());

        let mut repaint = loaded_frame();
        repaint.needs_repaint = true;
        repaint.mode = RenderMode::Partial;
        map.handle_renderer_event(RendererEvent::DidFinishRenderingFrame(repaint));
        assert!(!map.is_fully_loaded());
    }

    #[test]
    fn journal_records_camera_and_style_events() {
        let dir = tempfile::tempdir().unwrap();
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let mut map = Map::new(
            MapOptions::new().with_size(Size::new(256.0, 256.0)),
            &ActionJournalOptions::new()
                .with_enabled(true)
                .with_path(dir.path()),
            Box::new(RecordingObserver(recorded.clone())),
            Box::new(NullRendererFrontend),
            None,
        );

        map.set_style(Box::new(
            FixedStyle::new().with_loaded(true).with_name("Streets"),
        ));
        map.handle_style_event(StyleEvent::Loaded);
        map.jump_to(&CameraOptions::new().with_zoom(2.0));

        let files = map.action_journal_log_files();
        assert_eq!(files.len(), 1);
        let contents = std::fs::read_to_string(&files[0]).unwrap();
        assert!(contents.contains("\"name\":\"onWillStartLoadingMap\""));
        assert!(contents.contains("\"name\":\"onCameraDidChange\""));
        assert!(contents.contains("\"styleName\":\"Streets\""));

        // The observer saw the same events the journal recorded.
        assert_eq!(recorded.borrow().count("will_start_loading"), 1);
        assert!(recorded.borrow().count("camera_did_change:Immediate") >= 1);
    }

    #[test]
    fn prefetch_and_debug_options_are_plain_state() {
        let (mut map, _) = map_with_observer(MapMode::Continuous);
        assert_eq!(map.prefetch_zoom_delta(), DEFAULT_PREFETCH_ZOOM_DELTA);
        map.set_prefetch_zoom_delta(2);
        assert_eq!(map.prefetch_zoom_delta(), 2);

        assert!(!map.debug().any());
        map.set_debug(MapDebugOptions {
            tile_borders: true,
            ..Default::default()
        });
        assert!(map.debug().any());

        let options = map.map_options();
        assert_eq!(options.map_mode, MapMode::Continuous);
        assert!(options.annotations_enabled);
    }
}
