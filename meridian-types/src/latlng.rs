//! Geographic point type.

use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Wraps `value` into the `[min, max)` range.
pub fn wrap<T: Float>(value: T, min: T, max: T) -> T {
    if value >= min && value < max {
        return value;
    }
    let range = max - min;
    let mut wrapped = (value - min) % range;
    if wrapped < T::zero() {
        wrapped = wrapped + range;
    }
    let wrapped = min + wrapped;
    if wrapped == max {
        min
    } else {
        wrapped
    }
}

/// Geographic position in degrees.
///
/// Latitude is always kept within `[-90, 90]`. Longitude is stored as given
/// and may lie outside `[-180, 180)` to represent positions across the
/// antimeridian; use [`LatLng::wrapped`] to normalize it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    lat: f64,
    lng: f64,
}

impl LatLng {
    /// Creates a new position. Latitude is clamped to `[-90, 90]`, longitude
    /// is kept unwrapped.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: lat.clamp(-90.0, 90.0),
            lng,
        }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees, possibly unwrapped.
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Returns the same position with longitude wrapped to `[-180, 180)`.
    pub fn wrapped(&self) -> Self {
        Self {
            lat: self.lat,
            lng: wrap(self.lng, -180.0, 180.0),
        }
    }

    /// Shifts longitude by a whole number of world copies so that the path
    /// from `anchor` to this position is the shortest possible.
    ///
    /// Used when projecting points that may be visible on the far side of the
    /// antimeridian.
    pub fn unwrap_for_shortest_path(&mut self, anchor: &LatLng) {
        let delta = self.lng - anchor.lng;
        if delta.abs() <= 180.0 || !delta.is_finite() {
            return;
        }
        self.lng -= (delta / 360.0).round() * 360.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn latitude_is_clamped() {
        assert_eq!(LatLng::new(95.0, 0.0).lat(), 90.0);
        assert_eq!(LatLng::new(-120.0, 0.0).lat(), -90.0);
        assert_eq!(LatLng::new(45.0, 0.0).lat(), 45.0);
    }

    #[test]
    fn longitude_wrapping() {
        assert_abs_diff_eq!(LatLng::new(0.0, 190.0).wrapped().lng(), -170.0);
        assert_abs_diff_eq!(LatLng::new(0.0, -190.0).wrapped().lng(), 170.0);
        assert_abs_diff_eq!(LatLng::new(0.0, 180.0).wrapped().lng(), -180.0);
        assert_abs_diff_eq!(LatLng::new(0.0, 540.0).wrapped().lng(), -180.0);
        assert_abs_diff_eq!(LatLng::new(0.0, 45.0).wrapped().lng(), 45.0);
    }

    #[test]
    fn unwrap_for_shortest_path() {
        let anchor = LatLng::new(0.0, 175.0);
        let mut point = LatLng::new(0.0, -175.0);
        point.unwrap_for_shortest_path(&anchor);
        assert_abs_diff_eq!(point.lng(), 185.0);

        let mut near = LatLng::new(0.0, 170.0);
        near.unwrap_for_shortest_path(&anchor);
        assert_abs_diff_eq!(near.lng(), 170.0);
    }

    #[test]
    fn wrap_range() {
        assert_abs_diff_eq!(wrap(0.5, 0.0, 1.0), 0.5);
        assert_abs_diff_eq!(wrap(1.5, 0.0, 1.0), 0.5);
        assert_abs_diff_eq!(wrap(-0.25, 0.0, 1.0), 0.75);
    }
}
