//! The shared UI context.
//!
//! [`Ui`] is a cheap, cloneable handle to one window's widget forest, damage
//! set and router. All state sits behind a single [`parking_lot::Mutex`];
//! every operation holds it only while mutating that state. Widget hooks run
//! with the lock released: the widget is taken out of its slot, called, then
//! put back. Hooks may therefore call any `Ui` method, from any thread.
//!
//! Notifications (routed events and [`StateChange`]s) are queued and
//! delivered in order by whichever call started the current delivery loop;
//! calls made while a loop is running only enqueue.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use damask_engine::coords::{Point, Rect};
use damask_engine::input::Event;
use damask_engine::render::Surface;

use crate::canvas::{Canvas, ClipStack};
use crate::config::UiConfig;
use crate::damage::DirtyRects;
use crate::error::UiError;
use crate::forest::{Effects, Forest};
use crate::redraw::{self, DrawStep};
use crate::router::{self, Router};
use crate::widget::{EventCx, StateChange, Widget, WidgetId};

enum Delivery {
    Event(Event),
    State(StateChange),
}

struct UiState {
    config: UiConfig,
    forest: Forest,
    damage: DirtyRects,
    router: Router,
    size: (i32, i32),
    queue: VecDeque<(WidgetId, Delivery)>,
    delivering: bool,
}

impl UiState {
    fn bounds(&self) -> Rect {
        Rect::with_size(0, 0, self.size.0, self.size.1)
    }

    fn apply(&mut self, fx: Effects) {
        for rect in fx.dirty {
            self.damage.add(rect);
        }
        self.queue
            .extend(fx.notices.into_iter().map(|(id, change)| (id, Delivery::State(change))));
    }

    fn enqueue_events(&mut self, routed: Vec<(WidgetId, Event)>) {
        self.queue.extend(routed.into_iter().map(|(id, ev)| (id, Delivery::Event(ev))));
    }
}

/// Handle to a window's retained UI state.
///
/// ```rust,ignore
/// let ui = Ui::new(UiConfig::default(), 800, 600);
/// let panel = ui.create(Panel::new(grey), Rect::with_size(0, 0, 800, 600))?;
/// ui.add_root(panel)?;
///
/// // per platform event
/// ui.dispatch(&event);
///
/// // per frame
/// let mut canvas = ui.canvas(&mut framebuffer);
/// let repainted = ui.redraw(&mut canvas);
/// ```
#[derive(Clone)]
pub struct Ui {
    shared: Arc<Mutex<UiState>>,
}

impl Ui {
    /// Creates an empty UI for a window of `width` × `height` pixels.
    pub fn new(config: UiConfig, width: i32, height: i32) -> Self {
        let state = UiState {
            forest: Forest::new(config.max_widgets),
            damage: DirtyRects::new(config.dirty_capacity),
            router: Router::default(),
            size: (width.max(0), height.max(0)),
            queue: VecDeque::new(),
            delivering: false,
            config,
        };
        Self { shared: Arc::new(Mutex::new(state)) }
    }

    pub fn config(&self) -> UiConfig {
        self.shared.lock().config.clone()
    }

    /// Current window size as `(width, height)`.
    pub fn size(&self) -> (i32, i32) {
        self.shared.lock().size
    }

    // ── tree ──────────────────────────────────────────────────────────────

    /// Takes ownership of `widget` and gives it `area` (relative to its
    /// future parent). The widget starts visible and detached.
    pub fn create<W: Widget>(&self, widget: W, area: Rect) -> Result<WidgetId, UiError> {
        let result = self.shared.lock().forest.insert(Box::new(widget), area);
        match &result {
            Ok(id) => log::debug!("created {id} at {area:?}"),
            Err(e) => log::warn!("create failed: {e}"),
        }
        result
    }

    /// Makes a detached widget a top-level widget of the window.
    pub fn add_root(&self, id: WidgetId) -> Result<(), UiError> {
        self.mutate("add_root", |st, fx| st.forest.attach_root(id, fx))
    }

    /// Adds a detached widget as the first child of `parent`.
    pub fn add_child(&self, parent: WidgetId, child: WidgetId) -> Result<(), UiError> {
        self.mutate("add_child", |st, fx| st.forest.attach_child(parent, child, fx))
    }

    /// Detaches a widget (and its subtree) from its parent or the root list.
    ///
    /// Hover and focus held inside the subtree are dropped.
    pub fn remove_from_parent(&self, id: WidgetId) -> Result<(), UiError> {
        self.mutate("remove_from_parent", |st, fx| {
            st.forest.detach(id, fx)?;
            st.router.forget(&st.forest, id);
            Ok(())
        })
    }

    /// Detaches and frees a widget and its whole subtree.
    ///
    /// Every handle into the subtree becomes stale.
    pub fn destroy(&self, id: WidgetId) -> Result<(), UiError> {
        let freed = self.mutate("destroy", |st, fx| {
            if !st.forest.contains(id) {
                return Err(UiError::StaleWidget(id));
            }
            match st.forest.detach(id, fx) {
                Ok(()) | Err(UiError::Detached(_)) => {}
                Err(e) => return Err(e),
            }
            st.router.forget(&st.forest, id);
            Ok(st.forest.remove_subtree(id))
        })?;
        log::debug!("destroyed {id} ({} widget(s) freed)", freed.len());
        drop(freed);
        Ok(())
    }

    /// Shows or hides a widget and, with it, its subtree.
    pub fn set_visible(&self, id: WidgetId, visible: bool) -> Result<(), UiError> {
        self.mutate("set_visible", |st, fx| st.forest.set_visible(id, visible, fx).map(|_| ()))
    }

    /// Moves or resizes a widget within its parent.
    pub fn set_area(&self, id: WidgetId, area: Rect) -> Result<(), UiError> {
        self.mutate("set_area", |st, fx| st.forest.set_area(id, area, fx))
    }

    // ── queries ───────────────────────────────────────────────────────────

    /// The widget's window rectangle, clipped by every ancestor.
    pub fn absolute_rect(&self, id: WidgetId) -> Option<Rect> {
        self.shared.lock().forest.absolute_rect(id)
    }

    /// Window position of the widget's local origin.
    pub fn absolute_origin(&self, id: WidgetId) -> Option<Point> {
        self.shared.lock().forest.absolute_origin(id)
    }

    pub fn is_absolute_visible(&self, id: WidgetId) -> bool {
        self.shared.lock().forest.is_absolute_visible(id)
    }

    pub fn is_visible(&self, id: WidgetId) -> Option<bool> {
        self.shared.lock().forest.node(id).map(|n| n.visible)
    }

    /// Whether the widget is reachable from the root list.
    pub fn is_attached(&self, id: WidgetId) -> bool {
        self.shared.lock().forest.node(id).is_some_and(|n| n.attached)
    }

    pub fn is_alive(&self, id: WidgetId) -> bool {
        self.shared.lock().forest.contains(id)
    }

    pub fn area(&self, id: WidgetId) -> Option<Rect> {
        self.shared.lock().forest.node(id).map(|n| n.area)
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.shared.lock().forest.parent(id)
    }

    /// Children of `id`, most recently added first.
    pub fn children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.shared.lock().forest.children(id).to_vec()
    }

    /// Top-level widgets, most recently added first.
    pub fn roots(&self) -> Vec<WidgetId> {
        self.shared.lock().forest.roots().to_vec()
    }

    pub fn widget_count(&self) -> usize {
        self.shared.lock().forest.len()
    }

    /// Deepest visible widget under a window point.
    pub fn hit_test(&self, p: Point) -> Option<WidgetId> {
        router::hit_test(&self.shared.lock().forest, p)
    }

    // ── input ─────────────────────────────────────────────────────────────

    pub fn hovered(&self) -> Option<WidgetId> {
        let st = self.shared.lock();
        st.router.hovered(&st.forest)
    }

    pub fn focused(&self) -> Option<WidgetId> {
        let st = self.shared.lock();
        st.router.focused(&st.forest)
    }

    /// Moves keyboard focus, notifying the old and new holders.
    pub fn set_focus(&self, target: Option<WidgetId>) {
        {
            let mut st = self.shared.lock();
            let UiState { router, forest, .. } = &mut *st;
            let routed = router.set_focus(forest, target);
            st.enqueue_events(routed);
        }
        self.deliver();
    }

    /// Feeds one platform event through the router and delivers the result.
    ///
    /// `Expose` and `Resize` also damage the window.
    pub fn dispatch(&self, event: &Event) {
        {
            let mut st = self.shared.lock();
            match *event {
                Event::Expose { rect } => {
                    let rect = rect.unwrap_or(st.bounds());
                    st.damage.add(rect);
                }
                Event::Resize { width, height } => {
                    st.size = (width.max(0), height.max(0));
                    let bounds = st.bounds();
                    st.damage.add(bounds);
                }
                _ => {}
            }
            let UiState { router, forest, .. } = &mut *st;
            let routed = router.route(forest, event);
            st.enqueue_events(routed);
        }
        self.deliver();
    }

    // ── damage & drawing ──────────────────────────────────────────────────

    /// Marks a window rectangle for repaint.
    pub fn add_dirty(&self, rect: Rect) {
        self.shared.lock().damage.add(rect);
    }

    /// Snapshot of the pending damage.
    pub fn dirty_rects(&self) -> Vec<Rect> {
        self.shared.lock().damage.as_slice().to_vec()
    }

    pub fn has_damage(&self) -> bool {
        !self.shared.lock().damage.is_empty()
    }

    /// Wraps `surface` in a canvas using the configured stack depth.
    pub fn canvas<'s>(&self, surface: &'s mut dyn Surface) -> Canvas<'s> {
        let depth = self.shared.lock().config.stack_depth;
        Canvas::with_depth(surface, depth)
    }

    /// Repaints the pending damage and returns the repainted window rectangles.
    ///
    /// Widgets are drawn in window coordinates from an empty stack: offsets
    /// and clips the caller pushed on `canvas` do not apply while drawing and
    /// are back in place when this returns.
    pub fn redraw(&self, canvas: &mut Canvas<'_>) -> Vec<Rect> {
        let plan = {
            let mut st = self.shared.lock();
            if st.damage.is_empty() {
                return Vec::new();
            }
            let damage = st.damage.drain();
            redraw::plan(&st.forest, Some(damage.as_slice()), canvas.bounds())
        };
        self.paint(canvas, &plan.steps);
        log::debug!("redraw: {} rect(s), {} step(s)", plan.repainted.len(), plan.steps.len());
        plan.repainted
    }

    /// Repaints the whole canvas regardless of damage. The caller's stack is
    /// handled as in [`Ui::redraw`].
    pub fn redraw_all(&self, canvas: &mut Canvas<'_>) -> Vec<Rect> {
        let plan = {
            let mut st = self.shared.lock();
            st.damage.clear();
            redraw::plan(&st.forest, None, canvas.bounds())
        };
        self.paint(canvas, &plan.steps);
        plan.repainted
    }

    // ── internals ─────────────────────────────────────────────────────────

    /// Runs a tree mutation under the lock, applies its effects and delivers.
    fn mutate<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut UiState, &mut Effects) -> Result<T, UiError>,
    ) -> Result<T, UiError> {
        let result = {
            let mut st = self.shared.lock();
            let mut fx = Effects::default();
            let result = f(&mut *st, &mut fx);
            st.apply(fx);
            result
        };
        if let Err(e) = &result {
            log::debug!("{op} refused: {e}");
        }
        self.deliver();
        result
    }

    /// Runs `steps` on a fresh stack; the caller's offset and clip are set
    /// aside meanwhile and restored afterwards.
    fn paint(&self, canvas: &mut Canvas<'_>, steps: &[DrawStep]) {
        let fresh = ClipStack::new(canvas.bounds(), canvas.stack().depth());
        let saved = canvas.replace_stack(fresh);

        for step in steps {
            let entered = canvas.push_offset(step.offset.x, step.offset.y);
            let clipped = canvas.push_clip(step.clip);
            if entered && clipped {
                let taken = self.shared.lock().forest.take_widget(step.id);
                match taken {
                    Some(mut widget) => {
                        widget.draw(canvas, step.area);
                        self.put_back(step.id, widget);
                    }
                    None => self.repaint_later(step.id),
                }
            } else {
                log::warn!("{} skipped: no room on the clip stack", step.id);
            }
            canvas.pop_clip();
            canvas.pop_offset();
        }

        canvas.replace_stack(saved);
        // Pick up deliveries deferred while widgets were out being drawn.
        self.deliver();
    }

    /// A widget busy elsewhere could not be drawn; keep its area dirty.
    fn repaint_later(&self, id: WidgetId) {
        let mut st = self.shared.lock();
        if let Some(abs) = st.forest.absolute_rect(id) {
            log::debug!("{id} busy during redraw; deferring");
            st.damage.add(abs);
        }
    }

    /// Returns a widget to its slot. Notices left queued by a loop that
    /// finished while the widget was out are delivered here.
    fn put_back(&self, id: WidgetId, widget: Box<dyn Widget>) {
        let (orphan, pending) = {
            let mut st = self.shared.lock();
            let orphan = st.forest.restore_widget(id, widget);
            (orphan, !st.delivering && !st.queue.is_empty())
        };
        if orphan.is_some() {
            log::trace!("{id} was destroyed while in use");
        }
        if pending {
            self.deliver();
        }
    }

    /// Drains the notification queue unless another call is already doing so.
    fn deliver(&self) {
        {
            let mut st = self.shared.lock();
            if st.delivering || st.queue.is_empty() {
                return;
            }
            st.delivering = true;
        }
        let mut guard = DeliveryGuard { ui: self, armed: true };

        // Widgets out being drawn keep their notices, in order. Whoever holds
        // such a widget when this loop ends delivers them from `put_back`.
        let mut deferred: Vec<(WidgetId, Delivery)> = Vec::new();
        loop {
            let next = {
                let mut st = self.shared.lock();
                let mut next = st.queue.pop_front();
                if next.is_none() && deferred.iter().any(|(d, _)| !st.forest.is_busy(*d)) {
                    // Some widget came back while hooks ran; retry in order.
                    st.queue.extend(deferred.drain(..));
                    next = st.queue.pop_front();
                }
                if next.is_none() {
                    for item in deferred.drain(..).rev() {
                        st.queue.push_front(item);
                    }
                    st.delivering = false;
                    guard.armed = false;
                }
                next
            };
            let Some((id, delivery)) = next else { break };

            if deferred.iter().any(|(d, _)| *d == id) {
                deferred.push((id, delivery));
                continue;
            }

            let taken = {
                let mut st = self.shared.lock();
                if st.forest.contains(id) {
                    match st.forest.take_widget(id) {
                        Some(w) => Ok(w),
                        None => Err(true),
                    }
                } else {
                    Err(false)
                }
            };
            let mut widget = match taken {
                Ok(w) => w,
                Err(true) => {
                    deferred.push((id, delivery));
                    continue;
                }
                Err(false) => {
                    log::trace!("dropping delivery to destroyed {id}");
                    continue;
                }
            };

            let mut cx = EventCx::new(self, id);
            match &delivery {
                Delivery::Event(ev) => widget.on_event(&mut cx, ev),
                Delivery::State(change) => widget.on_state_change(&mut cx, *change),
            }
            self.put_back(id, widget);
        }
    }
}

/// Clears the delivering flag if a hook panics mid-loop.
struct DeliveryGuard<'a> {
    ui: &'a Ui,
    armed: bool,
}

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.ui.shared.lock().delivering = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use damask_engine::input::{Key, Modifiers, MouseButton};
    use damask_engine::paint::{BlendMode, Color};
    use damask_engine::render::PixelBuffer;
    use std::sync::mpsc;

    fn r(l: i32, t: i32, rt: i32, b: i32) -> Rect { Rect::new(l, t, rt, b) }

    const RED: Color = Color::rgb(255, 0, 0);
    const GREEN: Color = Color::rgb(0, 255, 0);

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Draw { offset: Point, clip: Rect, area: Rect },
        Event(Event),
        State(StateChange),
    }

    type Log = Arc<Mutex<Vec<(&'static str, Call)>>>;

    /// Records every hook call and fills its area when drawn.
    struct Recorder {
        name: &'static str,
        fill: Color,
        log: Log,
    }

    impl Widget for Recorder {
        fn draw(&mut self, canvas: &mut Canvas<'_>, area: Rect) {
            let call = Call::Draw { offset: canvas.offset(), clip: canvas.clip(), area };
            self.log.lock().push((self.name, call));
            canvas.draw_box(area, self.fill, BlendMode::Replace);
        }

        fn on_event(&mut self, _cx: &mut EventCx<'_>, event: &Event) {
            self.log.lock().push((self.name, Call::Event(event.clone())));
        }

        fn on_state_change(&mut self, _cx: &mut EventCx<'_>, change: StateChange) {
            self.log.lock().push((self.name, Call::State(change)));
        }
    }

    fn recorder(name: &'static str, fill: Color, log: &Log) -> Recorder {
        Recorder { name, fill, log: log.clone() }
    }

    fn calls(log: &Log, name: &str) -> Vec<Call> {
        log.lock().iter().filter(|(n, _)| *n == name).map(|(_, c)| c.clone()).collect()
    }

    fn draws(log: &Log, name: &str) -> Vec<Call> {
        calls(log, name).into_iter().filter(|c| matches!(c, Call::Draw { .. })).collect()
    }

    fn mv(x: i32, y: i32) -> Event {
        Event::MouseMove { pos: Point::new(x, y), modifiers: Modifiers::default() }
    }

    fn press(x: i32, y: i32) -> Event {
        Event::MousePress { pos: Point::new(x, y), button: MouseButton::Left, modifiers: Modifiers::default() }
    }

    /// 400×300 window, A at (10,10,50,30) as root, B at (5,5,20,10) inside A.
    fn scene(log: &Log) -> (Ui, WidgetId, WidgetId) {
        let ui = Ui::new(UiConfig::default(), 400, 300);
        let a = ui.create(recorder("A", RED, log), Rect::with_size(10, 10, 50, 30)).unwrap();
        ui.add_root(a).unwrap();
        let b = ui.create(recorder("B", GREEN, log), Rect::with_size(5, 5, 20, 10)).unwrap();
        ui.add_child(a, b).unwrap();
        (ui, a, b)
    }

    // ── redraw ────────────────────────────────────────────────────────────

    #[test]
    fn nested_widgets_draw_once_with_expected_clip() {
        let log = Log::default();
        let (ui, _a, _b) = scene(&log);
        let mut buf = PixelBuffer::new(400, 300);

        ui.add_dirty(r(0, 0, 399, 299));
        let repainted = {
            let mut canvas = ui.canvas(&mut buf);
            ui.redraw(&mut canvas)
        };

        assert_eq!(repainted, vec![r(0, 0, 399, 299)]);
        assert_eq!(
            draws(&log, "A"),
            vec![Call::Draw { offset: Point::new(10, 10), clip: r(10, 10, 59, 39), area: r(0, 0, 49, 29) }]
        );
        assert_eq!(
            draws(&log, "B"),
            vec![Call::Draw { offset: Point::new(15, 15), clip: r(15, 15, 34, 24), area: r(0, 0, 19, 9) }]
        );

        assert_eq!(buf.pixel(10, 10), Some(RED));
        assert_eq!(buf.pixel(15, 15), Some(GREEN));
        assert_eq!(buf.pixel(34, 24), Some(GREEN));
        assert_eq!(buf.pixel(35, 24), Some(RED));
        assert_eq!(buf.pixel(9, 9), Some(Color::TRANSPARENT));
    }

    #[test]
    fn tree_deeper_than_the_stack_draws_in_its_own_frame() {
        const NAMES: [&str; 12] = ["d0", "d1", "d2", "d3", "d4", "d5", "d6", "d7", "d8", "d9", "d10", "d11"];
        let log = Log::default();
        let ui = Ui::new(UiConfig::default(), 300, 300);
        let mut parent = None;
        for (i, name) in NAMES.iter().enumerate() {
            let fill = if i == NAMES.len() - 1 { GREEN } else { RED };
            let id = ui.create(recorder(name, fill, &log), Rect::with_size(1, 1, 50, 50)).unwrap();
            match parent {
                None => ui.add_root(id).unwrap(),
                Some(p) => ui.add_child(p, id).unwrap(),
            }
            parent = Some(id);
        }
        assert!(NAMES.len() > ui.config().stack_depth);

        let mut buf = PixelBuffer::new(300, 300);
        ui.redraw_all(&mut ui.canvas(&mut buf));

        for (i, name) in NAMES.iter().enumerate() {
            let at = i as i32 + 1;
            assert_eq!(
                draws(&log, name),
                vec![Call::Draw { offset: Point::new(at, at), clip: r(at, at, 50, 50), area: r(0, 0, 49, 49) }],
                "widget at depth {i}"
            );
        }
        assert_eq!(buf.pixel(11, 11), Some(RED));
        assert_eq!(buf.pixel(12, 12), Some(GREEN));
        assert_eq!(buf.pixel(50, 50), Some(GREEN));
        assert_eq!(buf.pixel(51, 51), Some(Color::TRANSPARENT));
    }

    #[test]
    fn caller_stack_is_set_aside_and_restored() {
        let log = Log::default();
        let (ui, _a, _b) = scene(&log);
        let mut buf = PixelBuffer::new(400, 300);
        let mut canvas = ui.canvas(&mut buf);
        canvas.push_offset(7, 7);
        canvas.push_clip(r(0, 0, 9, 9));

        ui.redraw_all(&mut canvas);

        assert_eq!(
            draws(&log, "B"),
            vec![Call::Draw { offset: Point::new(15, 15), clip: r(15, 15, 34, 24), area: r(0, 0, 19, 9) }]
        );
        assert_eq!(canvas.offset(), Point::new(7, 7));
        assert_eq!(canvas.clip(), r(7, 7, 16, 16));
        assert_eq!(canvas.stack().offset_depth(), 1);
        assert_eq!(canvas.stack().clip_depth(), 1);
    }

    #[test]
    fn redraw_without_damage_does_nothing() {
        let log = Log::default();
        let (ui, _, _) = scene(&log);
        let mut buf = PixelBuffer::new(400, 300);
        let mut canvas = ui.canvas(&mut buf);

        assert!(!ui.redraw(&mut canvas).is_empty());
        assert!(ui.redraw(&mut canvas).is_empty());
        assert_eq!(draws(&log, "A").len(), 1);
    }

    #[test]
    fn attach_damages_new_area() {
        let log = Log::default();
        let (ui, _, _) = scene(&log);
        // B's rectangle lies inside A's, so the two merge.
        assert_eq!(ui.dirty_rects(), vec![r(10, 10, 59, 39)]);
    }

    #[test]
    fn redraw_all_ignores_damage() {
        let log = Log::default();
        let (ui, _, _) = scene(&log);
        let mut buf = PixelBuffer::new(100, 100);
        let mut canvas = ui.canvas(&mut buf);
        assert_eq!(ui.redraw_all(&mut canvas), vec![r(0, 0, 99, 99)]);
        assert!(!ui.has_damage());
        assert_eq!(draws(&log, "B").len(), 1);
    }

    // ── structure notifications ───────────────────────────────────────────

    #[test]
    fn add_child_notifies_parent_and_child() {
        let log = Log::default();
        let (_ui, _a, b) = scene(&log);
        assert_eq!(
            calls(&log, "A"),
            vec![
                Call::State(StateChange::CanvasChanged { attached: true }),
                Call::State(StateChange::ChildAdded(b)),
            ]
        );
        assert_eq!(
            calls(&log, "B"),
            vec![
                Call::State(StateChange::ParentChanged),
                Call::State(StateChange::CanvasChanged { attached: true }),
            ]
        );
    }

    #[test]
    fn remove_from_parent_damages_old_area() {
        let log = Log::default();
        let (ui, a, b) = scene(&log);
        let mut buf = PixelBuffer::new(400, 300);
        ui.redraw(&mut ui.canvas(&mut buf));

        ui.remove_from_parent(b).unwrap();
        assert_eq!(ui.dirty_rects(), vec![r(15, 15, 34, 24)]);
        assert_eq!(ui.parent(b), None);
        assert!(ui.children(a).is_empty());
        assert!(!ui.is_attached(b));
        assert!(calls(&log, "A").contains(&Call::State(StateChange::ChildRemoved(b))));
        assert_eq!(ui.remove_from_parent(b), Err(UiError::Detached(b)));
    }

    #[test]
    fn hiding_notifies_subtree_and_damages() {
        let log = Log::default();
        let (ui, a, _) = scene(&log);
        let mut buf = PixelBuffer::new(400, 300);
        ui.redraw(&mut ui.canvas(&mut buf));
        log.lock().clear();

        ui.set_visible(a, false).unwrap();
        assert_eq!(ui.dirty_rects(), vec![r(10, 10, 59, 39)]);
        assert_eq!(calls(&log, "A"), vec![Call::State(StateChange::VisibilityChanged(false))]);
        assert_eq!(calls(&log, "B"), vec![Call::State(StateChange::VisibilityChanged(false))]);

        ui.set_visible(a, false).unwrap();
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn set_area_moves_and_damages() {
        let log = Log::default();
        let (ui, a, b) = scene(&log);
        let mut buf = PixelBuffer::new(400, 300);
        ui.redraw(&mut ui.canvas(&mut buf));

        ui.set_area(a, Rect::with_size(200, 200, 50, 30)).unwrap();
        assert_eq!(ui.dirty_rects(), vec![r(10, 10, 59, 39), r(200, 200, 249, 229)]);
        assert_eq!(ui.absolute_rect(b), Some(r(205, 205, 224, 214)));
        assert!(calls(&log, "A").contains(&Call::State(StateChange::AreaChanged)));
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn destroy_frees_subtree_and_clears_focus() {
        let log = Log::default();
        let (ui, a, b) = scene(&log);
        ui.dispatch(&mv(20, 20));
        ui.dispatch(&press(20, 20));
        assert_eq!(ui.focused(), Some(b));

        ui.destroy(a).unwrap();
        assert!(!ui.is_alive(a));
        assert!(!ui.is_alive(b));
        assert_eq!(ui.focused(), None);
        assert_eq!(ui.hovered(), None);
        assert_eq!(ui.widget_count(), 0);
        assert_eq!(ui.add_root(a), Err(UiError::StaleWidget(a)));
        assert_eq!(ui.destroy(a), Err(UiError::StaleWidget(a)));
    }

    #[test]
    fn widget_limit_is_reported() {
        let log = Log::default();
        let ui = Ui::new(UiConfig::default().max_widgets(1), 10, 10);
        ui.create(recorder("A", RED, &log), r(0, 0, 1, 1)).unwrap();
        let err = ui.create(recorder("B", RED, &log), r(0, 0, 1, 1)).unwrap_err();
        assert_eq!(err, UiError::WidgetLimit { limit: 1 });
    }

    // ── dispatch ──────────────────────────────────────────────────────────

    #[test]
    fn pointer_events_arrive_local_after_enter() {
        let log = Log::default();
        let (ui, _, b) = scene(&log);
        log.lock().clear();

        ui.dispatch(&mv(20, 18));
        assert_eq!(ui.hovered(), Some(b));
        assert_eq!(calls(&log, "B"), vec![Call::Event(Event::MouseEnter), Call::Event(mv(5, 3))]);
        assert!(calls(&log, "A").is_empty());
    }

    #[test]
    fn keys_follow_focus_only() {
        let log = Log::default();
        let (ui, a, _) = scene(&log);
        let key = Event::KeyPress { key: Key::Enter, code: 28, modifiers: Modifiers::default(), repeat: false };

        ui.dispatch(&key);
        ui.set_focus(Some(a));
        ui.dispatch(&key);
        log.lock().retain(|(_, c)| matches!(c, Call::Event(_)));

        assert_eq!(calls(&log, "A"), vec![Call::Event(Event::FocusGained), Call::Event(key)]);
        assert!(calls(&log, "B").is_empty());
    }

    #[test]
    fn resize_damages_window_and_broadcasts() {
        let log = Log::default();
        let (ui, _, _) = scene(&log);
        let mut buf = PixelBuffer::new(400, 300);
        ui.redraw(&mut ui.canvas(&mut buf));

        let ev = Event::Resize { width: 200, height: 100 };
        ui.dispatch(&ev);
        assert_eq!(ui.size(), (200, 100));
        assert_eq!(ui.dirty_rects(), vec![r(0, 0, 199, 99)]);
        assert!(calls(&log, "A").contains(&Call::Event(ev.clone())));
        assert!(calls(&log, "B").contains(&Call::Event(ev)));
    }

    #[test]
    fn expose_adds_given_rect() {
        let log = Log::default();
        let (ui, _, _) = scene(&log);
        let mut buf = PixelBuffer::new(400, 300);
        ui.redraw(&mut ui.canvas(&mut buf));

        ui.dispatch(&Event::Expose { rect: Some(r(100, 100, 120, 120)) });
        assert_eq!(ui.dirty_rects(), vec![r(100, 100, 120, 120)]);
    }

    // ── re-entrancy ───────────────────────────────────────────────────────

    /// Hides itself on press and records what it sees afterwards.
    struct HideOnPress {
        log: Log,
    }

    impl Widget for HideOnPress {
        fn draw(&mut self, _canvas: &mut Canvas<'_>, _area: Rect) {}

        fn on_event(&mut self, cx: &mut EventCx<'_>, event: &Event) {
            self.log.lock().push(("H", Call::Event(event.clone())));
            if matches!(event, Event::MousePress { .. }) {
                cx.request_redraw();
                cx.ui().set_visible(cx.id(), false).unwrap();
            }
        }

        fn on_state_change(&mut self, _cx: &mut EventCx<'_>, change: StateChange) {
            self.log.lock().push(("H", Call::State(change)));
        }
    }

    #[test]
    fn hooks_can_reenter_ui() {
        let log = Log::default();
        let ui = Ui::new(UiConfig::default(), 100, 100);
        let h = ui.create(HideOnPress { log: log.clone() }, Rect::with_size(0, 0, 10, 10)).unwrap();
        ui.add_root(h).unwrap();

        ui.dispatch(&mv(5, 5));
        ui.dispatch(&press(5, 5));

        assert_eq!(ui.is_visible(h), Some(false));
        let tail: Vec<Call> = calls(&log, "H").into_iter().rev().take(3).collect();
        assert_eq!(
            tail,
            vec![
                Call::State(StateChange::VisibilityChanged(false)),
                Call::Event(Event::FocusGained),
                Call::Event(press(5, 5)),
            ]
        );
    }

    /// Destroys itself when it receives text.
    struct SelfDestruct;

    impl Widget for SelfDestruct {
        fn draw(&mut self, _canvas: &mut Canvas<'_>, _area: Rect) {}

        fn on_event(&mut self, cx: &mut EventCx<'_>, event: &Event) {
            if matches!(event, Event::Char { .. }) {
                cx.ui().destroy(cx.id()).unwrap();
            }
        }
    }

    #[test]
    fn widget_may_destroy_itself() {
        let ui = Ui::new(UiConfig::default(), 100, 100);
        let w = ui.create(SelfDestruct, Rect::with_size(0, 0, 10, 10)).unwrap();
        ui.add_root(w).unwrap();
        ui.set_focus(Some(w));

        ui.dispatch(&Event::Char { text: "q".into() });
        assert!(!ui.is_alive(w));
        assert_eq!(ui.focused(), None);
        assert!(ui.roots().is_empty());
    }

    // ── threads ───────────────────────────────────────────────────────────

    #[test]
    fn ui_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Ui>();

        let log = Log::default();
        let (ui, a, _) = scene(&log);
        let worker = {
            let ui = ui.clone();
            let log = log.clone();
            std::thread::spawn(move || {
                let c = ui.create(recorder("C", RED, &log), Rect::with_size(0, 0, 5, 5)).unwrap();
                ui.add_child(a, c).unwrap();
                let mut buf = PixelBuffer::new(400, 300);
                let mut canvas = ui.canvas(&mut buf);
                ui.redraw_all(&mut canvas);
                buf.pixel(10, 10)
            })
        };

        assert_eq!(worker.join().unwrap(), Some(RED));
        assert_eq!(ui.children(a).len(), 2);
        assert_eq!(draws(&log, "C").len(), 1);
    }

    /// Parks inside its first `draw` until released.
    struct Stall {
        started: mpsc::Sender<()>,
        release: Option<mpsc::Receiver<()>>,
        log: Log,
    }

    impl Widget for Stall {
        fn draw(&mut self, _canvas: &mut Canvas<'_>, _area: Rect) {
            if let Some(release) = self.release.take() {
                self.started.send(()).unwrap();
                release.recv().unwrap();
            }
        }

        fn on_state_change(&mut self, _cx: &mut EventCx<'_>, change: StateChange) {
            self.log.lock().push(("stall", Call::State(change)));
        }
    }

    /// When hidden, lets the stalled draw go and waits for that redraw to return.
    struct Handoff {
        release: mpsc::Sender<()>,
        done: Option<mpsc::Receiver<()>>,
    }

    impl Widget for Handoff {
        fn draw(&mut self, _canvas: &mut Canvas<'_>, _area: Rect) {}

        fn on_state_change(&mut self, _cx: &mut EventCx<'_>, change: StateChange) {
            if change != StateChange::VisibilityChanged(false) {
                return;
            }
            if let Some(done) = self.done.take() {
                self.release.send(()).unwrap();
                done.recv().unwrap();
            }
        }
    }

    #[test]
    fn notices_for_a_widget_drawing_elsewhere_are_not_stranded() {
        let log = Log::default();
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        let ui = Ui::new(UiConfig::default(), 100, 100);
        let w = ui
            .create(Stall { started: started_tx, release: Some(release_rx), log: log.clone() }, Rect::with_size(0, 0, 50, 50))
            .unwrap();
        let x = ui
            .create(Handoff { release: release_tx, done: Some(done_rx) }, Rect::with_size(5, 5, 10, 10))
            .unwrap();
        ui.add_root(w).unwrap();
        ui.add_child(w, x).unwrap();

        let painter = {
            let ui = ui.clone();
            std::thread::spawn(move || {
                let mut buf = PixelBuffer::new(100, 100);
                ui.redraw_all(&mut ui.canvas(&mut buf));
                done_tx.send(()).unwrap();
            })
        };

        // W is out being drawn; its notice must still arrive before this returns.
        started_rx.recv().unwrap();
        ui.set_visible(w, false).unwrap();

        assert!(calls(&log, "stall").contains(&Call::State(StateChange::VisibilityChanged(false))));
        painter.join().unwrap();
    }
}
