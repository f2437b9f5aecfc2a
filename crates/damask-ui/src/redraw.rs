//! Repaint planning.
//!
//! [`plan`] walks the forest once per damage rectangle and produces a flat
//! list of [`DrawStep`]s, parents before children. The steps are computed
//! under the lock; executing them (calling widget `draw`) happens afterwards
//! with the lock released.
//!
//! Each step carries its widget's absolute origin and clip, so executing one
//! needs a single offset and clip level however deep the tree is.

use damask_engine::coords::{Point, Rect};

use crate::forest::Forest;
use crate::widget::WidgetId;

/// One `draw` call: push `offset` and `clip`, draw `area`, pop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DrawStep {
    pub id: WidgetId,
    /// Absolute origin of the widget.
    pub offset: Point,
    /// Absolute area ∩ damage, relative to `offset`.
    pub clip: Rect,
    /// The widget's local frame, `(0, 0, w - 1, h - 1)`.
    pub area: Rect,
}

#[derive(Debug, Default)]
pub(crate) struct Plan {
    pub steps: Vec<DrawStep>,
    /// Absolute rectangles that will be repainted.
    pub repainted: Vec<Rect>,
}

/// Plans a repaint of `damage` (or the whole of `bounds` when `None`).
///
/// Damage rectangles are clipped to `bounds`; a rectangle lying entirely
/// inside an earlier one is skipped.
pub(crate) fn plan(forest: &Forest, damage: Option<&[Rect]>, bounds: Rect) -> Plan {
    let whole = [bounds];
    let damage = damage.unwrap_or(&whole);

    let mut out = Plan::default();
    for d in damage.iter().filter_map(|d| d.intersect(bounds)) {
        if out.repainted.iter().any(|done| done.contains_rect(d)) {
            continue;
        }
        out.repainted.push(d);
        for &root in forest.roots() {
            visit(forest, root, Point::ZERO, d, &mut out.steps);
        }
    }
    out
}

/// `limit` is the absolute region still drawable at this depth; `origin` is
/// the parent's absolute origin.
fn visit(forest: &Forest, id: WidgetId, origin: Point, limit: Rect, steps: &mut Vec<DrawStep>) {
    let Some(node) = forest.node(id) else { return };
    if !node.visible {
        return;
    }

    let area = node.area;
    let Some(isect) = area.translate(origin.x, origin.y).intersect(limit) else { return };
    let abs = origin + area.origin();

    steps.push(DrawStep {
        id,
        offset: abs,
        clip: isect.translate(-abs.x, -abs.y),
        area: Rect::with_size(0, 0, area.width(), area.height()),
    });
    for &child in &node.children {
        visit(forest, child, abs, isect, steps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::forest::Effects;
    use crate::widget::Widget;

    struct Nop;

    impl Widget for Nop {
        fn draw(&mut self, _canvas: &mut Canvas<'_>, _area: Rect) {}
    }

    fn r(l: i32, t: i32, rt: i32, b: i32) -> Rect { Rect::new(l, t, rt, b) }

    fn drawn(p: &Plan) -> Vec<WidgetId> {
        p.steps.iter().map(|s| s.id).collect()
    }

    /// A at (10,10,50,30) as root, B at (5,5,20,10) inside A.
    fn nested() -> (Forest, WidgetId, WidgetId) {
        let mut f = Forest::new(8);
        let mut fx = Effects::default();
        let a = f.insert(Box::new(Nop), Rect::with_size(10, 10, 50, 30)).unwrap();
        let b = f.insert(Box::new(Nop), Rect::with_size(5, 5, 20, 10)).unwrap();
        f.attach_root(a, &mut fx).unwrap();
        f.attach_child(a, b, &mut fx).unwrap();
        (f, a, b)
    }

    // ── steps ─────────────────────────────────────────────────────────────

    #[test]
    fn full_damage_visits_parent_then_child() {
        let (f, a, b) = nested();
        let p = plan(&f, None, r(0, 0, 399, 299));
        assert_eq!(
            p.steps,
            vec![
                DrawStep { id: a, offset: Point::new(10, 10), clip: r(0, 0, 49, 29), area: r(0, 0, 49, 29) },
                DrawStep { id: b, offset: Point::new(15, 15), clip: r(0, 0, 19, 9), area: r(0, 0, 19, 9) },
            ]
        );
        assert_eq!(p.repainted, vec![r(0, 0, 399, 299)]);
    }

    #[test]
    fn partial_damage_clips_and_skips() {
        let (f, a, _b) = nested();
        // Only A's bottom-right corner, away from B.
        let p = plan(&f, Some(&[r(50, 30, 70, 50)][..]), r(0, 0, 399, 299));
        assert_eq!(drawn(&p), vec![a]);
        assert_eq!(p.steps[0].offset, Point::new(10, 10));
        assert_eq!(p.steps[0].clip, r(40, 20, 49, 29));
    }

    #[test]
    fn damage_outside_every_widget_draws_nothing() {
        let (f, _, _) = nested();
        let p = plan(&f, Some(&[r(200, 200, 210, 210)][..]), r(0, 0, 399, 299));
        assert!(p.steps.is_empty());
        assert_eq!(p.repainted, vec![r(200, 200, 210, 210)]);
    }

    #[test]
    fn invisible_subtree_is_skipped() {
        let (mut f, a, b) = nested();
        f.set_visible(b, false, &mut Effects::default()).unwrap();
        assert_eq!(drawn(&plan(&f, None, r(0, 0, 399, 299))), vec![a]);
        f.set_visible(a, false, &mut Effects::default()).unwrap();
        assert!(plan(&f, None, r(0, 0, 399, 299)).steps.is_empty());
    }

    #[test]
    fn deep_chain_steps_carry_absolute_frames() {
        // Twelve 50×50 widgets, each at (1, 1) inside the previous one.
        let mut f = Forest::new(16);
        let mut fx = Effects::default();
        let mut parent = None;
        for _ in 0..12 {
            let id = f.insert(Box::new(Nop), Rect::with_size(1, 1, 50, 50)).unwrap();
            match parent {
                None => f.attach_root(id, &mut fx).unwrap(),
                Some(p) => f.attach_child(p, id, &mut fx).unwrap(),
            }
            parent = Some(id);
        }

        let p = plan(&f, None, r(0, 0, 299, 299));
        assert_eq!(p.steps.len(), 12);
        for (depth, step) in p.steps.iter().enumerate() {
            let at = depth as i32 + 1;
            assert_eq!(step.offset, Point::new(at, at));
            assert_eq!(step.clip, r(0, 0, 50 - at, 50 - at));
            assert_eq!(step.area, r(0, 0, 49, 49));
        }
    }

    // ── damage handling ───────────────────────────────────────────────────

    #[test]
    fn damage_is_clipped_to_bounds() {
        let (f, _, _) = nested();
        let p = plan(&f, Some(&[r(-50, -50, 20, 20), r(500, 500, 600, 600)][..]), r(0, 0, 399, 299));
        assert_eq!(p.repainted, vec![r(0, 0, 20, 20)]);
    }

    #[test]
    fn contained_damage_is_skipped() {
        let (f, a, b) = nested();
        let p = plan(&f, Some(&[r(0, 0, 100, 100), r(10, 10, 20, 20)][..]), r(0, 0, 399, 299));
        assert_eq!(p.repainted, vec![r(0, 0, 100, 100)]);
        assert_eq!(drawn(&p), vec![a, b]);
    }

    #[test]
    fn overlapping_damage_redraws_each_region() {
        let (f, a, _) = nested();
        let p = plan(&f, Some(&[r(10, 10, 12, 12), r(55, 35, 58, 38)][..]), r(0, 0, 399, 299));
        assert_eq!(drawn(&p), vec![a, a]);
    }
}
