//! Integration tests for gilt-gui.
//!
//! These tests exercise the public API from outside the crate: layout
//! through the context, pointer and keyboard routing through the pilot, and
//! the paint pass through the recording renderer.

use std::cell::RefCell;
use std::rc::Rc;

use gilt_gui::event::{EventKind, Key, Modifiers};
use gilt_gui::style::{DragClamp, Positioning, Sides, StyleFlags, StyleValue};
use gilt_gui::testing::Pilot;
use gilt_gui::{Context, ContextConfig, ControlFlow, ElementId, LayoutError, Offset, Region};
use pretty_assertions::assert_eq;

fn sized(pilot: &mut Pilot, parent: Option<ElementId>, w: i32, h: i32) -> ElementId {
    let edit = |st: &mut gilt_gui::Style| {
        st.width = StyleValue::absolute(w);
        st.height = StyleValue::absolute(h);
    };
    match parent {
        Some(parent) => pilot.spawn_child(parent, edit),
        None => pilot.spawn(edit),
    }
}

type EventLog = Rc<RefCell<Vec<(EventKind, ElementId)>>>;

/// Record `(kind, target)` of every event of `kinds`.
fn record(pilot: &mut Pilot, kinds: &[EventKind]) -> EventLog {
    let log: EventLog = Rc::default();
    for &kind in kinds {
        let sink = Rc::clone(&log);
        pilot.ctx_mut().add_listener(kind, move |_, event| {
            if let Some(target) = event.target {
                sink.borrow_mut().push((event.kind, target));
            }
            ControlFlow::Continue
        });
    }
    log
}

fn widths(pilot: &Pilot, ids: &[ElementId]) -> Vec<i32> {
    ids.iter().map(|&id| pilot.ctx().region(id).map_or(-1, |r| r.width)).collect()
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[test]
fn test_validate_is_idempotent() {
    let mut pilot = Pilot::new(300, 200);
    let root = sized(&mut pilot, None, 100, 100);
    sized(&mut pilot, Some(root), 40, 10);
    pilot.ctx_mut().validate().unwrap();
    let first = pilot.ctx().validation_stats();
    assert!(first.processed > 0);

    pilot.ctx_mut().validate().unwrap();
    let second = pilot.ctx().validation_stats();
    assert_eq!((second.passes, second.processed, second.reported), (0, 0, 0));
    assert_eq!(pilot.ctx().pending_layout_len(), 0);
}

#[test]
fn test_auto_sizes_follow_the_deepest_child() {
    let mut pilot = Pilot::new(300, 200);
    let outer = pilot.spawn(|_| {});
    let middle = pilot.spawn_child(outer, |_| {});
    let inner = sized(&mut pilot, Some(middle), 40, 30);
    pilot.ctx_mut().validate().unwrap();
    for id in [outer, middle, inner] {
        assert_eq!(pilot.ctx().region(id), Some(Region::new(0, 0, 40, 30)));
    }

    pilot.ctx_mut().set_width(inner, StyleValue::absolute(60));
    pilot.ctx_mut().validate().unwrap();
    assert_eq!(pilot.ctx().region(outer).map(|r| r.width), Some(60));
    assert_eq!(pilot.ctx().region(middle).map(|r| r.width), Some(60));
}

#[test]
fn test_percent_values_keep_hundredths() {
    let value = StyleValue::percent(33.33);
    assert!(value.is_percent());
    assert_eq!(value.magnitude(), 3333);
    assert_eq!(StyleValue::percent_hundredths(3333), value);

    let mut pilot = Pilot::new(400, 200);
    let root = pilot.spawn(|st| {
        st.width = StyleValue::percent(25.0);
        st.height = StyleValue::percent(50.0);
    });
    pilot.ctx_mut().validate().unwrap();
    assert_eq!(pilot.ctx().region(root), Some(Region::new(0, 0, 100, 100)));

    let surface = pilot.surface();
    pilot.ctx_mut().set_surface_size(surface, 800, 200);
    pilot.ctx_mut().validate().unwrap();
    assert_eq!(pilot.ctx().region(root).map(|r| r.width), Some(200));
}

#[test]
fn test_min_and_max_clamp_but_remember_the_request() {
    let mut pilot = Pilot::new(300, 200);
    let el = pilot.spawn(|st| {
        st.width = StyleValue::pixels(5);
        st.min_width = StyleValue::absolute(10);
        st.max_width = StyleValue::absolute(100);
        st.height = StyleValue::absolute(10);
    });
    pilot.ctx_mut().validate().unwrap();
    let layout = pilot.ctx().layout(el).unwrap();
    assert_eq!((layout.width, layout.unclamped_width), (10, 5));

    pilot.ctx_mut().set_width(el, StyleValue::absolute(500));
    pilot.ctx_mut().validate().unwrap();
    let layout = pilot.ctx().layout(el).unwrap();
    assert_eq!((layout.width, layout.unclamped_width), (100, 500));
}

#[test]
fn test_absolute_positions_chain_through_three_levels() {
    let mut pilot = Pilot::new(300, 200);
    let root = pilot.spawn(|st| st.padding = Sides::all(StyleValue::absolute(10)));
    let middle = pilot.spawn_child(root, |st| st.padding = Sides::all(StyleValue::absolute(5)));
    let leaf = sized(&mut pilot, Some(middle), 20, 20);
    pilot.ctx_mut().validate().unwrap();
    assert_eq!(pilot.ctx().layout(middle).map(|l| l.absolute), Some(Offset::new(10, 10)));
    assert_eq!(pilot.ctx().layout(leaf).map(|l| l.absolute), Some(Offset::new(15, 15)));

    pilot.ctx_mut().update_style(root, |st| st.padding = Sides::all(StyleValue::absolute(20)));
    pilot.ctx_mut().validate().unwrap();
    assert_eq!(pilot.ctx().layout(leaf).map(|l| l.absolute), Some(Offset::new(25, 25)));
}

#[test]
fn test_unit_change_matches_a_fresh_layout() {
    fn build(first: StyleValue) -> (Pilot, Vec<ElementId>) {
        let mut pilot = Pilot::new(300, 200);
        let parent = pilot.spawn(|_| {});
        let a = pilot.spawn_child(parent, |st| {
            st.width = first;
            st.height = StyleValue::absolute(10);
        });
        let b = sized(&mut pilot, Some(parent), 30, 10);
        pilot.ctx_mut().validate().unwrap();
        (pilot, vec![parent, a, b])
    }

    let (mut incremental, ids) = build(StyleValue::absolute(50));
    assert_eq!(widths(&incremental, &ids), vec![50, 50, 30]);

    incremental.ctx_mut().set_width(ids[1], StyleValue::percent(100.0));
    incremental.ctx_mut().validate().unwrap();
    let (fresh, fresh_ids) = build(StyleValue::percent(100.0));
    assert_eq!(widths(&incremental, &ids), widths(&fresh, &fresh_ids));
    assert_eq!(widths(&incremental, &ids), vec![30, 30, 30]);

    incremental.ctx_mut().set_width(ids[1], StyleValue::absolute(50));
    incremental.ctx_mut().validate().unwrap();
    assert_eq!(widths(&incremental, &ids), vec![50, 50, 30]);
}

#[test]
fn test_resizing_the_first_sibling_moves_only_later_siblings() {
    let mut pilot = Pilot::new(300, 200);
    let column = pilot.spawn(|_| {});
    let siblings: Vec<ElementId> = [10, 11, 12, 13].iter().map(|&h| sized(&mut pilot, Some(column), 40, h)).collect();
    let other = pilot.spawn(|st| {
        st.positioning = Positioning::Absolute;
        st.left = StyleValue::absolute(200);
        st.top = StyleValue::absolute(0);
    });
    let other_child = sized(&mut pilot, Some(other), 20, 20);
    pilot.ctx_mut().validate().unwrap();
    let ys = |pilot: &Pilot| -> Vec<i32> {
        siblings.iter().map(|&id| pilot.ctx().region(id).map_or(-1, |r| r.y)).collect()
    };
    assert_eq!(ys(&pilot), vec![0, 10, 21, 33]);

    let log = record(&mut pilot, &[EventKind::Move, EventKind::Resize]);
    pilot.ctx_mut().set_height(siblings[0], StyleValue::absolute(50));
    pilot.ctx_mut().validate().unwrap();
    assert_eq!(ys(&pilot), vec![0, 50, 61, 73]);
    assert_eq!(pilot.ctx().validation_stats().passes, 1);

    let touched: Vec<ElementId> = log.borrow().iter().map(|&(_, id)| id).collect();
    for id in &siblings[1..] {
        assert!(log.borrow().contains(&(EventKind::Move, *id)));
    }
    assert!(log.borrow().contains(&(EventKind::Resize, siblings[0])));
    assert!(log.borrow().contains(&(EventKind::Resize, column)));
    assert!(!touched.contains(&other));
    assert!(!touched.contains(&other_child));
}

#[test]
fn test_flexed_children_fill_the_parent_exactly() {
    let mut pilot = Pilot::new(400, 100);
    let row = pilot.spawn(|st| {
        st.child_axis = gilt_gui::style::Axis::Horizontal;
        st.flags |= StyleFlags::FLEX_CHILDREN_WIDTH;
        st.width = StyleValue::absolute(100);
        st.height = StyleValue::absolute(10);
    });
    let cells: Vec<ElementId> = (0..3)
        .map(|_| {
            pilot.spawn_child(row, |st| {
                st.width = StyleValue::percent(33.33);
                st.height = StyleValue::absolute(10);
            })
        })
        .collect();
    pilot.ctx_mut().validate().unwrap();
    assert_eq!(widths(&pilot, &cells), vec![33, 34, 33]);

    pilot.ctx_mut().set_width(row, StyleValue::absolute(301));
    pilot.ctx_mut().validate().unwrap();
    assert_eq!(widths(&pilot, &cells), vec![100, 101, 100]);
    let xs: Vec<i32> = cells.iter().map(|&id| pilot.ctx().region(id).map_or(-1, |r| r.x)).collect();
    assert_eq!(xs, vec![0, 100, 201]);

    pilot.ctx_mut().set_visible(cells[1], false);
    pilot.ctx_mut().validate().unwrap();
    assert_eq!(widths(&pilot, &[cells[0], cells[2]]), vec![151, 150]);
    assert_eq!(pilot.ctx().region(cells[2]).map(|r| r.x), Some(151));
}

#[test]
fn test_snapshot_of_a_row() {
    let mut pilot = Pilot::new(200, 100);
    let row = pilot.spawn(|st| st.child_axis = gilt_gui::style::Axis::Horizontal);
    pilot.ctx_mut().set_id(row, Some("row"));
    for name in ["one", "two"] {
        let cell = pilot.spawn_child(row, |_| {});
        pilot.ctx_mut().set_id(cell, Some(name));
        pilot.ctx_mut().set_text(cell, name);
    }
    insta::assert_snapshot!(pilot.snapshot(), @r#"
    row 0,0 36x12 @0,0
      one 0,0 18x12 @0,0 text="one"
      two 18,0 18x12 @18,0 text="two"
    "#);
}

#[test]
fn test_deleting_a_surface_removes_its_tree() {
    let mut pilot = Pilot::new(100, 100);
    let first = pilot.spawn(|_| {});
    let second = pilot.spawn(|_| {});
    let a = pilot.spawn_child(first, |_| {});
    let b = pilot.spawn_child(first, |_| {});
    let c = pilot.spawn_child(second, |_| {});
    pilot.ctx_mut().set_id(b, Some("b"));
    pilot.ctx_mut().set_width(c, StyleValue::absolute(30));
    assert!(pilot.ctx().pending_layout_len() > 0);
    let surface = pilot.surface();

    assert!(pilot.ctx_mut().delete_surface(surface));
    for id in [first, second, a, b, c] {
        assert!(pilot.ctx().element(id).is_none());
        assert!(pilot.ctx().layout(id).is_none());
        assert!(!pilot.ctx().contains(id));
    }
    assert!(pilot.ctx().surface(surface).is_none());
    assert!(pilot.ctx().find_by_id("b").is_none());
    assert_eq!(pilot.ctx().pending_layout_len(), 0);
    pilot.ctx_mut().validate().unwrap();
}

#[test]
fn test_runaway_handlers_do_not_hang() {
    let config = ContextConfig::default().with_max_validation_passes(8);
    let mut pilot = Pilot::with_context(Context::new(config), 100, 100);
    let el = sized(&mut pilot, None, 10, 10);
    pilot.ctx_mut().add_element_listener(el, EventKind::Resize, |ctx: &mut Context, event| {
        if let Some(id) = event.target {
            let width = ctx.style(id).map_or(10, |s| s.width.magnitude());
            ctx.set_width(id, StyleValue::absolute(width + 1));
        }
        ControlFlow::Continue
    });
    let result = pilot.ctx_mut().validate();
    assert_eq!(result, Err(LayoutError::NotConverged { passes: 8 }));
}

// ---------------------------------------------------------------------------
// Pointer
// ---------------------------------------------------------------------------

#[test]
fn test_topmost_layer_wins_hit_tests() {
    let mut pilot = Pilot::new(200, 200);
    let overlay = |st: &mut gilt_gui::Style| {
        st.positioning = Positioning::Absolute;
        st.left = StyleValue::absolute(10);
        st.top = StyleValue::absolute(10);
        st.width = StyleValue::absolute(50);
        st.height = StyleValue::absolute(50);
    };
    let low = pilot.spawn(overlay);
    let high = pilot.spawn(overlay);
    let surface = pilot.surface();
    assert_eq!(pilot.ctx_mut().element_at(surface, 20, 20), Some(high));

    pilot.ctx_mut().bring_to_front(low);
    assert_eq!(pilot.ctx_mut().element_at(surface, 20, 20), Some(low));

    pilot.ctx_mut().update_style(high, |st| st.z_index = 5);
    assert_eq!(pilot.ctx_mut().element_at(surface, 20, 20), Some(high));
    assert_eq!(pilot.ctx_mut().element_at(surface, 100, 100), None);
}

#[test]
fn test_hover_enters_outermost_first_and_leaves_deepest_first() {
    let mut pilot = Pilot::new(200, 200);
    let outer = sized(&mut pilot, None, 100, 100);
    let inner = sized(&mut pilot, Some(outer), 50, 50);
    let log = record(&mut pilot, &[EventKind::MouseEnter, EventKind::MouseLeave]);
    let take = || std::mem::take(&mut *log.borrow_mut());

    pilot.move_to(150, 150);
    assert!(take().is_empty());
    pilot.move_to(80, 80);
    assert_eq!(take(), vec![(EventKind::MouseEnter, outer)]);
    pilot.move_to(10, 10);
    assert_eq!(take(), vec![(EventKind::MouseEnter, inner)]);
    assert_eq!(pilot.ctx().hovered(), &[inner, outer]);

    pilot.move_to(150, 150);
    assert_eq!(take(), vec![(EventKind::MouseLeave, inner), (EventKind::MouseLeave, outer)]);
    assert!(pilot.ctx().hovered().is_empty());
}

#[test]
fn test_drag_stays_inside_the_parent() {
    let mut pilot = Pilot::new(300, 300);
    let frame = sized(&mut pilot, None, 200, 100);
    let knob = pilot.spawn_child(frame, |st| {
        st.positioning = Positioning::Relative;
        st.left = StyleValue::absolute(0);
        st.top = StyleValue::absolute(0);
        st.width = StyleValue::absolute(20);
        st.height = StyleValue::absolute(20);
        st.flags |= StyleFlags::DRAGGABLE;
        st.drag_clamp = DragClamp::Border;
    });
    pilot.drag((5, 5), (295, 295));
    pilot.ctx_mut().validate().unwrap();
    assert_eq!(pilot.ctx().region(knob), Some(Region::new(180, 80, 20, 20)));
}

// ---------------------------------------------------------------------------
// Keyboard and paint
// ---------------------------------------------------------------------------

#[test]
fn test_tab_moves_focus_and_typing_paints() {
    let mut pilot = Pilot::new(200, 100);
    let field = |st: &mut gilt_gui::Style| {
        st.width = StyleValue::absolute(100);
        st.height = StyleValue::absolute(20);
        st.flags |= StyleFlags::EDITABLE;
    };
    let first = pilot.spawn(field);
    let second = pilot.spawn(field);

    pilot.press_key(Key::Tab);
    assert_eq!(pilot.ctx().focused(), Some(first));
    pilot.press_key(Key::Tab);
    assert_eq!(pilot.ctx().focused(), Some(second));
    pilot.press_key_with(Key::Tab, Modifiers::SHIFT);
    assert_eq!(pilot.ctx().focused(), Some(first));

    pilot.type_text("gui");
    assert_eq!(pilot.ctx().text(first), Some("gui"));
    let painted = pilot.paint();
    assert_eq!(painted.texts(), vec!["gui"]);
}
