//! Damask UI: a retained widget tree with incremental repaint.
//!
//! Widgets are created in a [`Ui`] context, linked into a forest of
//! top-level widgets and their children, and then left alone: structural
//! changes, input and explicit requests record damage, and
//! [`Ui::redraw`] repaints only the damaged parts through a clipped
//! [`Canvas`].
//!
//! # Quick start
//!
//! ```rust,ignore
//! use damask_ui::prelude::*;
//!
//! struct Swatch(Color);
//!
//! impl Widget for Swatch {
//!     fn draw(&mut self, canvas: &mut Canvas<'_>, area: Rect) {
//!         canvas.draw_box(area, self.0, BlendMode::Replace);
//!     }
//!
//!     fn on_event(&mut self, cx: &mut EventCx<'_>, event: &Event) {
//!         if let Event::MousePress { .. } = event {
//!             self.0 = Color::WHITE;
//!             cx.request_redraw();
//!         }
//!     }
//! }
//!
//! let ui = Ui::new(UiConfig::default(), 640, 480);
//! let swatch = ui.create(Swatch(Color::BLACK), Rect::with_size(20, 20, 100, 60))?;
//! ui.add_root(swatch)?;
//!
//! let mut frame = PixelBuffer::new(640, 480);
//! ui.redraw(&mut ui.canvas(&mut frame));
//! ```
//!
//! # Threads
//!
//! [`Ui`] is `Clone + Send + Sync`. Any thread may mutate the tree or draw
//! into its own surface; widget hooks are always called with the internal
//! lock released.

pub mod canvas;
pub mod config;
pub mod damage;
pub mod error;
mod forest;
mod redraw;
mod router;
pub mod ui;
pub mod widget;

pub use canvas::{Canvas, ClipStack};
pub use config::UiConfig;
pub use damage::DirtyRects;
pub use error::UiError;
pub use ui::Ui;
pub use widget::{EventCx, StateChange, Widget, WidgetId};

/// Everything needed to write and host widgets.
pub mod prelude {
    pub use crate::canvas::Canvas;
    pub use crate::config::UiConfig;
    pub use crate::error::UiError;
    pub use crate::ui::Ui;
    pub use crate::widget::{EventCx, StateChange, Widget, WidgetId};

    pub use damask_engine::coords::{LineSeg, Orientation, Point, Rect};
    pub use damask_engine::input::{Event, Key, Modifiers, MouseButton, WheelDelta};
    pub use damask_engine::paint::{BlendMode, Color};
    pub use damask_engine::render::{Image, Mask, PixelBuffer, Surface};
}
