use thiserror::Error;

use crate::widget::WidgetId;

/// Why a tree operation was refused.
///
/// Every operation returning this error has left the tree untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UiError {
    /// The arena is full; no widget was created.
    #[error("widget limit of {limit} reached")]
    WidgetLimit { limit: usize },

    /// The handle refers to a destroyed widget.
    #[error("widget {0} no longer exists")]
    StaleWidget(WidgetId),

    /// The widget already has a parent or is a window root.
    #[error("widget {0} is already attached")]
    AlreadyAttached(WidgetId),

    /// The widget has no parent and is not a window root.
    #[error("widget {0} is not attached")]
    Detached(WidgetId),

    /// Attaching would make a widget its own ancestor.
    #[error("cannot add {child} under its own descendant {parent}")]
    WouldCycle { parent: WidgetId, child: WidgetId },
}
