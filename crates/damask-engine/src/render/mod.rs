//! Drawing surfaces.
//!
//! The UI core never touches pixels itself: it clips and translates every
//! primitive, then hands absolute, already-clipped geometry to a [`Surface`].
//! Backends (a GPU texture, a window framebuffer, a test buffer) implement the
//! trait; [`PixelBuffer`] is the in-memory software implementation.
//!
//! Convention:
//! - Geometry is in integer pixels (top-left origin, +Y down), inclusive bounds.
//! - Rectangles passed to a surface are non-empty and lie inside `size()`.

mod pixel_buffer;
mod surface;

pub use pixel_buffer::PixelBuffer;
pub use surface::{Image, Mask, Surface};
