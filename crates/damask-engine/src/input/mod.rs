//! Input vocabulary.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Platform code translates native events into [`Event`]s; with the `winit`
//! feature, [`platform::winit`] does this for winit windows.

#[cfg(feature = "winit")]
pub mod platform;
mod state;
mod types;

pub use state::InputState;
pub use types::{Event, Key, Modifiers, MouseButton, WheelDelta};
