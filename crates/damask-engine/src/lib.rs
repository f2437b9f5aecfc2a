//! Damask engine crate.
//!
//! Platform-facing building blocks shared by the UI core: integer geometry,
//! colour, the input event vocabulary, drawing surfaces and logging setup.

pub mod coords;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
