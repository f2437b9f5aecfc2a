//! Widget arena and tree links.
//!
//! Every widget lives in a [`slab`] slot together with its structure: local
//! area, visibility, parent handle and the ordered list of its children. The
//! window's top-level widgets form the root list. Both lists are kept
//! newest-first.
//!
//! Mutations never call widget code. They record the damage and the
//! notifications they cause in an [`Effects`] value which the caller applies
//! once the shared state is unlocked.

use slab::Slab;

use damask_engine::coords::{Point, Rect};

use crate::error::UiError;
use crate::widget::{StateChange, Widget, WidgetId};

// ── Node ──────────────────────────────────────────────────────────────────

pub(crate) struct Node {
    generation: u32,
    pub(crate) area: Rect,
    pub(crate) visible: bool,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
    /// Reachable from the root list.
    pub(crate) attached: bool,
    pub(crate) is_root: bool,
    /// `None` while the widget is out being called.
    widget: Option<Box<dyn Widget>>,
}

/// Side effects of a tree mutation, applied by the caller after unlocking.
#[derive(Default)]
pub(crate) struct Effects {
    pub dirty: Vec<Rect>,
    pub notices: Vec<(WidgetId, StateChange)>,
}

impl Effects {
    fn notify(&mut self, id: WidgetId, change: StateChange) {
        self.notices.push((id, change));
    }
}

// ── Forest ────────────────────────────────────────────────────────────────

pub(crate) struct Forest {
    nodes: Slab<Node>,
    /// Current generation per slot index; survives slot reuse.
    generations: Vec<u32>,
    roots: Vec<WidgetId>,
    limit: usize,
}

impl Forest {
    pub fn new(limit: usize) -> Self {
        Self {
            nodes: Slab::new(),
            generations: Vec::new(),
            roots: Vec::new(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn insert(&mut self, widget: Box<dyn Widget>, area: Rect) -> Result<WidgetId, UiError> {
        if self.nodes.len() >= self.limit {
            return Err(UiError::WidgetLimit { limit: self.limit });
        }

        let entry = self.nodes.vacant_entry();
        let slot = entry.key();
        if slot >= self.generations.len() {
            self.generations.resize(slot + 1, 0);
        }
        let generation = self.generations[slot];

        entry.insert(Node {
            generation,
            area,
            visible: true,
            parent: None,
            children: Vec::new(),
            attached: false,
            is_root: false,
            widget: Some(widget),
        });
        Ok(WidgetId::new(slot, generation))
    }

    #[inline]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: WidgetId) -> Option<&Node> {
        self.nodes.get(id.slot()).filter(|n| n.generation == id.generation)
    }

    fn node_mut(&mut self, id: WidgetId) -> Option<&mut Node> {
        self.nodes.get_mut(id.slot()).filter(|n| n.generation == id.generation)
    }

    fn live(&self, id: WidgetId) -> Result<&Node, UiError> {
        self.node(id).ok_or(UiError::StaleWidget(id))
    }

    pub fn roots(&self) -> &[WidgetId] {
        &self.roots
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.node(id)?.parent
    }

    // ── structure ─────────────────────────────────────────────────────────

    /// Makes a detached widget a window root.
    pub fn attach_root(&mut self, id: WidgetId, fx: &mut Effects) -> Result<(), UiError> {
        let node = self.live(id)?;
        if node.parent.is_some() || node.is_root {
            return Err(UiError::AlreadyAttached(id));
        }

        self.roots.insert(0, id);
        if let Some(node) = self.node_mut(id) {
            node.is_root = true;
        }
        self.set_attached(id, true, fx);
        self.damage_if_shown(id, fx);
        Ok(())
    }

    /// Gives a detached widget a parent.
    pub fn attach_child(
        &mut self,
        parent: WidgetId,
        child: WidgetId,
        fx: &mut Effects,
    ) -> Result<(), UiError> {
        let attached = self.live(parent)?.attached;
        let node = self.live(child)?;
        if node.parent.is_some() || node.is_root {
            return Err(UiError::AlreadyAttached(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(UiError::WouldCycle { parent, child });
        }

        if let Some(p) = self.node_mut(parent) {
            p.children.insert(0, child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }

        fx.notify(parent, StateChange::ChildAdded(child));
        fx.notify(child, StateChange::ParentChanged);
        if attached {
            self.set_attached(child, true, fx);
            self.damage_if_shown(child, fx);
        }
        Ok(())
    }

    /// Unlinks a widget from its parent or from the root list.
    ///
    /// The damage recorded is the area the widget covered before removal.
    pub fn detach(&mut self, id: WidgetId, fx: &mut Effects) -> Result<(), UiError> {
        let node = self.live(id)?;
        let (parent, is_root) = (node.parent, node.is_root);
        if parent.is_none() && !is_root {
            return Err(UiError::Detached(id));
        }

        self.damage_if_shown(id, fx);

        if let Some(p) = parent {
            if let Some(pn) = self.node_mut(p) {
                pn.children.retain(|&c| c != id);
            }
            if let Some(node) = self.node_mut(id) {
                node.parent = None;
            }
            fx.notify(p, StateChange::ChildRemoved(id));
            fx.notify(id, StateChange::ParentChanged);
        } else {
            self.roots.retain(|&r| r != id);
            if let Some(node) = self.node_mut(id) {
                node.is_root = false;
            }
        }

        self.set_attached(id, false, fx);
        Ok(())
    }

    /// Frees a detached subtree, returning the widget boxes still in their slots.
    pub fn remove_subtree(&mut self, id: WidgetId) -> Vec<Box<dyn Widget>> {
        let mut boxes = Vec::new();
        for member in self.subtree(id) {
            let slot = member.slot();
            let node = self.nodes.remove(slot);
            self.generations[slot] = self.generations[slot].wrapping_add(1);
            boxes.extend(node.widget);
        }
        boxes
    }

    fn set_attached(&mut self, id: WidgetId, attached: bool, fx: &mut Effects) {
        for member in self.subtree(id) {
            if let Some(node) = self.node_mut(member) {
                if node.attached != attached {
                    node.attached = attached;
                    fx.notify(member, StateChange::CanvasChanged { attached });
                }
            }
        }
    }

    fn damage_if_shown(&self, id: WidgetId, fx: &mut Effects) {
        let attached = self.node(id).is_some_and(|n| n.attached);
        if attached && self.is_absolute_visible(id) {
            fx.dirty.extend(self.absolute_rect(id));
        }
    }

    // ── properties ────────────────────────────────────────────────────────

    /// Returns `Ok(false)` when the flag already had that value.
    pub fn set_visible(
        &mut self,
        id: WidgetId,
        visible: bool,
        fx: &mut Effects,
    ) -> Result<bool, UiError> {
        let node = self.live(id)?;
        if node.visible == visible {
            return Ok(false);
        }

        // Covers both directions: before hiding, or after showing.
        if !visible {
            self.damage_if_shown(id, fx);
        }
        if let Some(node) = self.node_mut(id) {
            node.visible = visible;
        }
        if visible {
            self.damage_if_shown(id, fx);
        }

        for member in self.subtree(id) {
            fx.notify(member, StateChange::VisibilityChanged(visible));
        }
        Ok(true)
    }

    pub fn set_area(&mut self, id: WidgetId, area: Rect, fx: &mut Effects) -> Result<(), UiError> {
        if self.live(id)?.area == area {
            return Ok(());
        }

        self.damage_if_shown(id, fx);
        if let Some(node) = self.node_mut(id) {
            node.area = area;
        }
        self.damage_if_shown(id, fx);
        fx.notify(id, StateChange::AreaChanged);
        Ok(())
    }

    // ── geometry ──────────────────────────────────────────────────────────

    /// The widget's area in window coordinates, clipped by every ancestor.
    ///
    /// `None` when the widget is gone or clipped away entirely.
    pub fn absolute_rect(&self, id: WidgetId) -> Option<Rect> {
        let node = self.node(id)?;
        let mut rect = node.area;
        if rect.is_empty() {
            return None;
        }

        let mut cursor = node.parent;
        while let Some(p) = cursor {
            let pn = self.node(p)?;
            rect = rect.translate(pn.area.left, pn.area.top).intersect(pn.area)?;
            cursor = pn.parent;
        }
        Some(rect)
    }

    /// Window position of the widget's local `(0, 0)`, ignoring clipping.
    pub fn absolute_origin(&self, id: WidgetId) -> Option<Point> {
        let mut node = self.node(id)?;
        let mut origin = node.area.origin();
        while let Some(p) = node.parent {
            node = self.node(p)?;
            origin = origin + node.area.origin();
        }
        Some(origin)
    }

    /// `true` when the widget and all of its ancestors are visible.
    pub fn is_absolute_visible(&self, id: WidgetId) -> bool {
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            match self.node(cur) {
                Some(node) if node.visible => cursor = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// `true` if `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            if cur == ancestor {
                return true;
            }
            cursor = self.parent(cur);
        }
        false
    }

    // ── traversal ─────────────────────────────────────────────────────────

    /// `id` and its descendants, depth-first pre-order.
    pub fn subtree(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        if self.contains(id) {
            self.collect(id, &mut out);
        }
        out
    }

    /// Every widget reachable from the root list, depth-first pre-order.
    pub fn walk(&self) -> Vec<WidgetId> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect(root, &mut out);
        }
        out
    }

    fn collect(&self, id: WidgetId, out: &mut Vec<WidgetId>) {
        out.push(id);
        for &child in self.children(id) {
            self.collect(child, out);
        }
    }

    // ── widget boxes ──────────────────────────────────────────────────────

    /// Takes the widget out of its slot so it can be called unlocked.
    ///
    /// `None` if the handle is stale or the widget is already out.
    /// Live, but its widget is currently taken out.
    pub fn is_busy(&self, id: WidgetId) -> bool {
        self.node(id).is_some_and(|n| n.widget.is_none())
    }

    pub fn take_widget(&mut self, id: WidgetId) -> Option<Box<dyn Widget>> {
        self.node_mut(id)?.widget.take()
    }

    /// Puts a taken widget back; hands it back if its slot was freed meanwhile.
    pub fn restore_widget(
        &mut self,
        id: WidgetId,
        widget: Box<dyn Widget>,
    ) -> Option<Box<dyn Widget>> {
        match self.node_mut(id) {
            Some(node) if node.widget.is_none() => {
                node.widget = Some(widget);
                None
            }
            _ => Some(widget),
        }
    }
}
