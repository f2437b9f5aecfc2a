//! Hit testing and event routing.
//!
//! The router owns the two pieces of input state shared by the whole window:
//! the widget under the pointer (`hovered`) and the widget receiving keyboard
//! input (`focused`). Given a platform [`Event`] it decides who receives what:
//!
//! | Event                       | Receivers                                   |
//! |-----------------------------|---------------------------------------------|
//! | `MouseMove`                 | Leave/Enter on hover change, then hovered   |
//! | `MousePress`/`MouseRelease` | hovered, then Lost/Gained on focus change   |
//! | `MouseWheel`                | hovered, window coordinates                 |
//! | `KeyPress`/`KeyRelease`/`Char` | focused, or nobody                       |
//! | anything else               | every widget, depth-first pre-order         |
//!
//! Pointer events are translated into the receiver's local frame.

use damask_engine::coords::Point;
use damask_engine::input::Event;

use crate::forest::Forest;
use crate::widget::WidgetId;

/// Deepest visible widget whose absolute rectangle contains `p`.
///
/// Siblings are searched in list order, so when two overlap the most
/// recently attached one wins.
pub(crate) fn hit_test(forest: &Forest, p: Point) -> Option<WidgetId> {
    let hits = |id: &&WidgetId| {
        forest.node(**id).is_some_and(|n| n.visible)
            && forest.absolute_rect(**id).is_some_and(|r| r.contains(p))
    };

    let mut found = *forest.roots().iter().find(hits)?;
    while let Some(&child) = forest.children(found).iter().find(hits) {
        found = child;
    }
    Some(found)
}

/// Hover and focus state.
#[derive(Debug, Default, Clone)]
pub(crate) struct Router {
    hovered: Option<WidgetId>,
    focused: Option<WidgetId>,
}

impl Router {
    /// Hovered widget, if it still exists.
    pub fn hovered(&self, forest: &Forest) -> Option<WidgetId> {
        self.hovered.filter(|&id| forest.contains(id))
    }

    /// Focused widget, if it still exists.
    pub fn focused(&self, forest: &Forest) -> Option<WidgetId> {
        self.focused.filter(|&id| forest.contains(id))
    }

    /// Computes the deliveries for one platform event, updating hover and focus.
    pub fn route(&mut self, forest: &Forest, event: &Event) -> Vec<(WidgetId, Event)> {
        self.validate(forest);
        let mut out = Vec::new();

        match event {
            Event::MouseMove { pos, .. } => {
                let target = hit_test(forest, *pos);
                self.hover(target, &mut out);
                if let Some(h) = self.hovered {
                    out.push((h, local(forest, h, event)));
                }
            }
            Event::MousePress { .. } | Event::MouseRelease { .. } => {
                if let Some(h) = self.hovered {
                    out.push((h, local(forest, h, event)));
                }
                if self.hovered != self.focused {
                    self.focus(self.hovered, &mut out);
                }
            }
            Event::MouseWheel { .. } => {
                if let Some(h) = self.hovered {
                    out.push((h, event.clone()));
                }
            }
            ev if ev.is_keyboard() => match self.focused {
                Some(f) => out.push((f, event.clone())),
                None => log::trace!("{} dropped: nothing focused", ev.name()),
            },
            _ => {
                out.extend(forest.walk().into_iter().map(|id| (id, event.clone())));
            }
        }

        log::trace!("routed {} to {} receiver(s)", event.name(), out.len());
        out
    }

    /// Moves focus programmatically, producing the Lost/Gained pair.
    pub fn set_focus(&mut self, forest: &Forest, target: Option<WidgetId>) -> Vec<(WidgetId, Event)> {
        self.validate(forest);
        let target = target.filter(|&id| forest.contains(id));
        let mut out = Vec::new();
        if target != self.focused {
            self.focus(target, &mut out);
        }
        out
    }

    /// Clears hover and focus if they point into the subtree rooted at `id`.
    pub fn forget(&mut self, forest: &Forest, id: WidgetId) {
        let inside = |slot: Option<WidgetId>| slot.is_some_and(|w| forest.is_ancestor_or_self(id, w));
        if inside(self.hovered) {
            self.hovered = None;
        }
        if inside(self.focused) {
            self.focused = None;
        }
    }

    fn hover(&mut self, target: Option<WidgetId>, out: &mut Vec<(WidgetId, Event)>) {
        if target == self.hovered {
            return;
        }
        if let Some(old) = self.hovered {
            out.push((old, Event::MouseLeave));
        }
        if let Some(new) = target {
            out.push((new, Event::MouseEnter));
        }
        self.hovered = target;
    }

    fn focus(&mut self, target: Option<WidgetId>, out: &mut Vec<(WidgetId, Event)>) {
        if let Some(old) = self.focused {
            out.push((old, Event::FocusLost));
        }
        if let Some(new) = target {
            out.push((new, Event::FocusGained));
        }
        self.focused = target;
    }

    /// Drops handles whose widgets have been destroyed.
    fn validate(&mut self, forest: &Forest) {
        self.hovered = self.hovered(forest);
        self.focused = self.focused(forest);
    }
}

fn local(forest: &Forest, id: WidgetId, event: &Event) -> Event {
    event.relative_to(forest.absolute_origin(id).unwrap_or_default())
}
