//! Viewport edge insets.

use serde::{Deserialize, Serialize};

use crate::screen::ScreenCoordinate;
use crate::size::Size;

/// Padding applied to the edges of the viewport.
///
/// Insets shift the point of the screen that the camera center maps to: with
/// a large bottom inset the center of attention moves to the upper part of
/// the viewport, e.g. to keep a route visible above a panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeInsets {
    /// Inset from the top edge, in pixels.
    pub top: f64,
    /// Inset from the left edge, in pixels.
    pub left: f64,
    /// Inset from the bottom edge, in pixels.
    pub bottom: f64,
    /// Inset from the right edge, in pixels.
    pub right: f64,
}

impl EdgeInsets {
    /// Creates new insets.
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Whether all insets are zero.
    pub fn is_flush(&self) -> bool {
        self.top == 0.0 && self.left == 0.0 && self.bottom == 0.0 && self.right == 0.0
    }

    /// The screen point the camera center maps to inside a viewport of the
    /// given size.
    pub fn center(&self, size: Size) -> ScreenCoordinate {
        ScreenCoordinate::new(
            self.left + (size.width() - self.left - self.right) / 2.0,
            self.top + (size.height() - self.top - self.bottom) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn flush_insets_center_in_the_middle() {
        let center = EdgeInsets::default().center(Size::new(100.0, 60.0));
        assert_abs_diff_eq!(center.x, 50.0);
        assert_abs_diff_eq!(center.y, 30.0);
    }

    #[test]
    fn insets_shift_the_center() {
        let insets = EdgeInsets::new(0.0, 0.0, 40.0, 20.0);
        let center = insets.center(Size::new(100.0, 100.0));
        assert_abs_diff_eq!(center.x, 40.0);
        assert_abs_diff_eq!(center.y, 30.0);
    }
}
