use std::fmt;

use damask_engine::coords::Rect;
use damask_engine::input::Event;

use crate::canvas::Canvas;
use crate::ui::Ui;

// ── WidgetId ──────────────────────────────────────────────────────────────

/// Handle to a widget living in a [`Ui`].
///
/// Handles are cheap to copy and never dangle: destroying a widget bumps the
/// generation of its slot, so every operation given an old handle detects it
/// and refuses (see [`crate::UiError::StaleWidget`]).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct WidgetId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl WidgetId {
    #[inline]
    pub(crate) const fn new(index: usize, generation: u32) -> Self {
        Self { index: index as u32, generation }
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

// ── StateChange ───────────────────────────────────────────────────────────

/// Structural notifications delivered through [`Widget::on_state_change`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StateChange {
    /// A child was added to this widget.
    ChildAdded(WidgetId),
    /// A child was removed from this widget.
    ChildRemoved(WidgetId),
    /// This widget was given a new parent, or lost its parent.
    ParentChanged,
    /// This widget became reachable from (or unreachable from) the window.
    CanvasChanged { attached: bool },
    /// The widget's own flag or an ancestor's flag changed.
    VisibilityChanged(bool),
    /// The widget's area was moved or resized.
    AreaChanged,
}

// ── Widget trait ──────────────────────────────────────────────────────────

/// The trait every UI component implements.
///
/// A widget is created with [`Ui::create`], which takes ownership of it, and
/// lives until [`Ui::destroy`] is called on it or an ancestor. Structure
/// (parent, children, area, visibility) is kept by the [`Ui`]; the widget only
/// supplies behaviour.
///
/// Hooks are called with the [`Ui`] unlocked, so they may freely call back
/// into it through the [`EventCx`].
///
/// ```rust,ignore
/// use damask_ui::prelude::*;
///
/// struct Swatch(Color);
///
/// impl Widget for Swatch {
///     fn draw(&mut self, canvas: &mut Canvas<'_>, area: Rect) {
///         canvas.draw_box(area, self.0, BlendMode::Replace);
///     }
/// }
/// ```
pub trait Widget: Send + 'static {
    /// Paints the widget.
    ///
    /// `area` is the widget's own frame in local coordinates, `(0, 0)` at its
    /// top-left corner. The canvas is already translated to the widget's
    /// absolute origin and clipped to the part being repainted.
    fn draw(&mut self, canvas: &mut Canvas<'_>, area: Rect);

    /// Receives a routed input event. Pointer positions are widget-local.
    fn on_event(&mut self, _cx: &mut EventCx<'_>, _event: &Event) {}

    /// Receives a structural notification.
    fn on_state_change(&mut self, _cx: &mut EventCx<'_>, _change: StateChange) {}
}

// ── EventCx ───────────────────────────────────────────────────────────────

/// Context handed to a widget hook: the owning [`Ui`] plus the receiver's id.
pub struct EventCx<'a> {
    ui: &'a Ui,
    id: WidgetId,
}

impl<'a> EventCx<'a> {
    pub(crate) fn new(ui: &'a Ui, id: WidgetId) -> Self {
        Self { ui, id }
    }

    /// The widget receiving this call.
    #[inline]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    #[inline]
    pub fn ui(&self) -> &'a Ui {
        self.ui
    }

    /// Marks a rectangle, given in this widget's local coordinates, dirty.
    ///
    /// The rectangle is clipped to the widget's visible absolute area.
    pub fn add_dirty(&self, local: Rect) {
        let Some(abs) = self.ui.absolute_rect(self.id) else { return };
        let origin = self.ui.absolute_origin(self.id).unwrap_or_default();
        if let Some(r) = local.translate(origin.x, origin.y).intersect(abs) {
            self.ui.add_dirty(r);
        }
    }

    /// Marks the whole widget dirty.
    pub fn request_redraw(&self) {
        if let Some(abs) = self.ui.absolute_rect(self.id) {
            self.ui.add_dirty(abs);
        }
    }

    pub fn absolute_rect(&self) -> Option<Rect> {
        self.ui.absolute_rect(self.id)
    }

    pub fn is_hovered(&self) -> bool {
        self.ui.hovered() == Some(self.id)
    }

    pub fn is_focused(&self) -> bool {
        self.ui.focused() == Some(self.id)
    }

    /// Moves keyboard focus to this widget.
    pub fn request_focus(&self) {
        self.ui.set_focus(Some(self.id));
    }
}
