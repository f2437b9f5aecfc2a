//! Coordinate and geometry types shared by the UI core and drawing surfaces.
//!
//! Canonical space:
//! - Integer pixels
//! - Origin top-left
//! - +X right, +Y down
//! - Rectangle bounds inclusive on every side

mod line;
mod point;
mod rect;

pub use line::{LineSeg, Orientation};
pub use point::Point;
pub use rect::Rect;
