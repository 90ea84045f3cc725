//! Web-mercator projection math.
//!
//! World coordinates are pixels in a square world plane of side
//! `TILE_SIZE * 2^zoom`, with the origin at the northwest corner and `y`
//! growing southwards, matching the usual web tile addressing.

use std::f64::consts::PI;

use nalgebra::Point2;

use crate::latlng::LatLng;

/// Size of a map tile in pixels at any zoom level.
pub const TILE_SIZE: f64 = 512.0;

/// Maximum latitude representable in the web-mercator projection, degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Projects a geographic position to world-plane pixels for the given world
/// size. Latitude is clamped to the mercator range.
pub fn project(latlng: &LatLng, world_size: f64) -> Point2<f64> {
    let lat = latlng.lat().clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = (180.0 + latlng.lng()) / 360.0 * world_size;
    let y = (180.0 - (180.0 / PI) * ((PI / 4.0 + lat.to_radians() / 2.0).tan()).ln()) / 360.0
        * world_size;
    Point2::new(x, y)
}

/// Inverse of [`project`]. The returned longitude is unwrapped, so points
/// outside the world plane come back with longitudes beyond `[-180, 180)`.
pub fn unproject(point: &Point2<f64>, world_size: f64) -> LatLng {
    let lng = point.x / world_size * 360.0 - 180.0;
    let y2 = 180.0 - point.y / world_size * 360.0;
    let lat = 360.0 / PI * ((y2 * PI / 180.0).exp()).atan() - 90.0;
    LatLng::new(lat, lng)
}

/// World-plane size in pixels for the given zoom scale (`2^zoom`).
pub fn world_size(scale: f64) -> f64 {
    TILE_SIZE * scale
}
