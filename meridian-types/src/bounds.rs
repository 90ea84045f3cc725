//! Geographic bounding box.

use serde::{Deserialize, Serialize};

use crate::latlng::LatLng;

/// Axis-aligned geographic rectangle defined by its southwest and northeast
/// corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    sw: LatLng,
    ne: LatLng,
}

impl LatLngBounds {
    /// Bounds covering the whole world.
    pub fn world() -> Self {
        Self {
            sw: LatLng::new(-90.0, -180.0),
            ne: LatLng::new(90.0, 180.0),
        }
    }

    /// Creates bounds from two arbitrary corner points.
    pub fn hull(a: LatLng, b: LatLng) -> Self {
        Self {
            sw: LatLng::new(a.lat().min(b.lat()), a.lng().min(b.lng())),
            ne: LatLng::new(a.lat().max(b.lat()), a.lng().max(b.lng())),
        }
    }

    /// Southwest corner.
    pub fn southwest(&self) -> LatLng {
        self.sw
    }

    /// Northeast corner.
    pub fn northeast(&self) -> LatLng {
        self.ne
    }

    /// Northwest corner.
    pub fn northwest(&self) -> LatLng {
        LatLng::new(self.ne.lat(), self.sw.lng())
    }

    /// Southeast corner.
    pub fn southeast(&self) -> LatLng {
        LatLng::new(self.sw.lat(), self.ne.lng())
    }

    /// Center of the box.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.sw.lat() + self.ne.lat()) / 2.0,
            (self.sw.lng() + self.ne.lng()) / 2.0,
        )
    }

    /// Grows the box to include `point`.
    pub fn extend(&mut self, point: LatLng) {
        self.sw = LatLng::new(
            self.sw.lat().min(point.lat()),
            self.sw.lng().min(point.lng()),
        );
        self.ne = LatLng::new(
            self.ne.lat().max(point.lat()),
            self.ne.lng().max(point.lng()),
        );
    }

    /// Whether `point` lies inside the box (borders included).
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat() >= self.sw.lat()
            && point.lat() <= self.ne.lat()
            && point.lng() >= self.sw.lng()
            && point.lng() <= self.ne.lng()
    }

    /// Returns the point of the box closest to `point`. For points already
    /// inside the box this is the point itself.
    pub fn constrain(&self, point: &LatLng) -> LatLng {
        if self.contains(point) {
            return *point;
        }
        LatLng::new(
            point.lat().clamp(self.sw.lat(), self.ne.lat()),
            point.lng().clamp(self.sw.lng(), self.ne.lng()),
        )
    }
}

impl Default for LatLngBounds {
    fn default() -> Self {
        Self::world()
    }
}
