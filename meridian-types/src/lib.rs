//! Geographic and screen-space primitive types used by the Meridian map
//! engine.
//!
//! The types in this crate are plain value types without any rendering or
//! projection-pipeline logic. They know how to wrap longitudes around the
//! antimeridian, clamp latitudes to the web-mercator range and do other
//! small geometric chores that every other part of the engine relies on.

pub mod bounds;
pub mod insets;
pub mod latlng;
pub mod mercator;
pub mod screen;
pub mod size;

pub use bounds::LatLngBounds;
pub use insets::EdgeInsets;
pub use latlng::LatLng;
pub use screen::ScreenCoordinate;
pub use size::Size;
