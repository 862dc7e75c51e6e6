mod common;

use bubble_picker::core::adapter::merge_item_sets;
use bubble_picker::{BubbleId, Mode, PickerConfig, PickerEngine, PickerItem, SelectionEvent};
use common::RecordingBackend;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn engine(n: usize) -> PickerEngine<RecordingBackend> {
    let items = (0..n)
        .map(|i| PickerItem::new(format!("item{i}"), (i % 4 + 1) as f32))
        .collect();
    let mut engine = PickerEngine::new(RecordingBackend::default(), PickerConfig::default());
    engine.build(items, 1.0, 1.0);
    engine
}

fn settle(engine: &mut PickerEngine<RecordingBackend>) -> Vec<SelectionEvent> {
    let mut events = Vec::new();
    for _ in 0..100 {
        events.extend(engine.step().events);
        if engine.resizing().next().is_none() {
            break;
        }
    }
    events
}

#[test]
fn at_most_one_bubble_stays_enlarged() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut engine = engine(8);
    for _ in 0..300 {
        let id = BubbleId(rng.gen_range(0..8));
        engine.select(id);
        for _ in 0..rng.gen_range(0..4) {
            engine.step();
        }
        if rng.gen_bool(0.2) {
            settle(&mut engine);
            let enlarged: Vec<_> = engine.bubbles().iter().filter(|b| b.body.increased).map(|b| b.id).collect();
            assert!(enlarged.len() <= 1, "enlarged: {enlarged:?}");
            assert_eq!(enlarged.first().copied(), engine.selected());
        }
    }
}

#[test]
fn events_pair_up_per_transition() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut engine = engine(5);
    let mut events = Vec::new();
    for _ in 0..200 {
        engine.select(BubbleId(rng.gen_range(0..5)));
        events.extend(engine.step().events);
    }
    events.extend(settle(&mut engine));
    for id in 0..5 {
        let per_bubble: Vec<bool> = events
            .iter()
            .filter_map(|e| match e {
                SelectionEvent::Selected { bubble, .. } if bubble.0 == id => Some(true),
                SelectionEvent::Deselected { bubble, .. } if bubble.0 == id => Some(false),
                _ => None,
            })
            .collect();
        // Strictly alternating, starting with a selection.
        for (i, selected) in per_bubble.iter().enumerate() {
            assert_eq!(*selected, i % 2 == 0, "bubble {id}: {per_bubble:?}");
        }
    }
}

#[test]
fn double_select_in_one_window_changes_state_once() {
    let mut engine = engine(3);
    assert!(engine.select(BubbleId(1)));
    assert!(!engine.select(BubbleId(1)));
    engine.step();
    assert!(!engine.select(BubbleId(1)));
    let events = settle(&mut engine);
    assert_eq!(events.len(), 1);
    assert!(engine.bubbles()[1].body.increased);
}

#[test]
fn resize_converges_monotonically_within_bound() {
    let step = PickerConfig::default().simulation.resize_step;
    let mut engine = engine(4);
    for id in 0..4 {
        let (r0, r1) = {
            let body = &engine.bubbles()[id].body;
            (body.actual_radius, body.increased_radius)
        };
        let bound = ((r1 - r0).abs() / step).ceil() as usize;
        assert!(engine.select(BubbleId(id)));
        let mut previous = r0;
        let mut ticks = 0;
        while !engine.bubbles()[id].body.finished() {
            engine.step();
            ticks += 1;
            let r = engine.bubbles()[id].body.actual_radius;
            assert!(r >= previous && r <= r1, "tick {ticks}: {previous} -> {r}");
            previous = r;
            assert!(ticks <= bound, "bubble {id} took more than {bound} ticks");
        }
        assert_eq!(previous, r1);
        settle(&mut engine);
    }
}

#[test]
fn mode_round_trip_restores_bodies() {
    let items = merge_item_sets(
        vec![
            PickerItem::new("a", 7.0),
            PickerItem::new("b", 3.0),
            PickerItem::new("c", 1.0),
        ],
        vec![
            PickerItem::new("a", 2.0),
            PickerItem::new("d", 9.0),
            PickerItem::new("e", 4.0),
        ],
    );
    let mut engine = PickerEngine::new(RecordingBackend::default(), PickerConfig::default());
    engine.build(items, 1.0, 1.0);
    let snapshot: Vec<(bool, f32, f32, f32)> = engine
        .bubbles()
        .iter()
        .map(|b| (b.body.should_show, b.body.default_radius, b.body.increased_radius, b.body.density))
        .collect();

    let to_secondary = engine.set_mode(Mode::Secondary);
    assert_eq!(to_secondary.shown.len(), 2);
    assert_eq!(to_secondary.hidden.len(), 2);
    assert_eq!(to_secondary.resized.len(), 1);
    let a_secondary = engine.bubbles()[0].body.default_radius;
    assert_ne!(a_secondary, snapshot[0].1);

    let back = engine.set_mode(Mode::Main);
    assert_eq!(back.shown, to_secondary.hidden);
    assert_eq!(back.hidden, to_secondary.shown);
    let restored: Vec<(bool, f32, f32, f32)> = engine
        .bubbles()
        .iter()
        .map(|b| (b.body.should_show, b.body.default_radius, b.body.increased_radius, b.body.density))
        .collect();
    assert_eq!(restored, snapshot);
    assert!(engine.set_mode(Mode::Main).is_noop());
}

#[test]
fn mode_change_clears_selection() {
    let mut engine = engine(3);
    engine.select(BubbleId(0));
    settle(&mut engine);
    let change = engine.set_mode(Mode::Secondary);
    assert_eq!(change.deselected, Some(BubbleId(0)));
    assert_eq!(engine.selected(), None);
    let events = engine.step().events;
    assert!(matches!(events.as_slice(), [SelectionEvent::Deselected { bubble: BubbleId(0), .. }]));
    settle(&mut engine);
    assert!(engine.bubbles().iter().all(|b| !b.body.increased));
}
