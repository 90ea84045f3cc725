//! Screen-space point type.

use std::ops::{Add, Div, Mul, Sub};

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Position in viewport pixels. The origin is the top-left corner of the
/// viewport, `y` grows downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenCoordinate {
    /// Horizontal offset from the left viewport edge.
    pub x: f64,
    /// Vertical offset from the top viewport edge.
    pub y: f64,
}

impl ScreenCoordinate {
    /// Creates a new screen point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to the origin.
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for ScreenCoordinate {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for ScreenCoordinate {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for ScreenCoordinate {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for ScreenCoordinate {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl From<Point2<f64>> for ScreenCoordinate {
    fn from(point: Point2<f64>) -> Self {
        Self::new(point.x, point.y)
    }
}

impl From<ScreenCoordinate> for Point2<f64> {
    fn from(point: ScreenCoordinate) -> Self {
        Point2::new(point.x, point.y)
    }
}
