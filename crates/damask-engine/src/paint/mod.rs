//! Paint model shared between the UI core and drawing surfaces.
//!
//! Scope:
//! - 8-bit straight-alpha RGBA colour
//! - blend policy for box fills
//!
//! Geometry types remain in `coords`.

pub mod color;

pub use color::{BlendMode, Color};
