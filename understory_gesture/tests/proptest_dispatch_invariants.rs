// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based invariants of event dispatch.
//!
//! Verifies, for arbitrary raw event streams:
//! 1. Every reported transition is an edge of the state machine, starting from
//!    the state the recognizer was in, with terminal states reset before the next event.
//! 2. The state visible after dispatch matches the reported trace.
//! 3. Disabled recognizers never transition.
//! 4. Touch indices and locations are stable across consecutive queries.

use kurbo::{Point, Vec2};
use proptest::prelude::*;
use understory_gesture::{
    AlgorithmCx, ContactId, EventCategories, GestureAlgorithm, GestureError, GestureState,
    Gestures, InputEvent, PanRecognizer, PinchRecognizer, RecognizerId, Step,
};

#[derive(Clone, Debug)]
enum Op {
    Down(u64, i32, i32),
    Move(u64, i32, i32),
    Up(u64),
    Cancel(u64),
    Magnify(i32),
    GestureEnd,
    Scroll(i32),
    Interrupt,
    Toggle(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0_u64..4, -200_i32..200, -200_i32..200).prop_map(|(c, x, y)| Op::Down(c, x, y)),
        (0_u64..4, -200_i32..200, -200_i32..200).prop_map(|(c, x, y)| Op::Move(c, x, y)),
        (0_u64..4).prop_map(Op::Up),
        (0_u64..4).prop_map(Op::Cancel),
        (-50_i32..50).prop_map(Op::Magnify),
        Just(Op::GestureEnd),
        (-20_i32..20).prop_map(Op::Scroll),
        Just(Op::Interrupt),
        (0_usize..3).prop_map(Op::Toggle),
    ]
}

/// Discrete recognizer that also answers scroll with arbitrary, sometimes invalid steps.
#[derive(Debug, Default)]
struct Erratic;

impl GestureAlgorithm<u32> for Erratic {
    fn interests(&self) -> EventCategories {
        EventCategories::PRIMARY | EventCategories::SCROLL
    }

    fn primary_up(&mut self, cx: &AlgorithmCx<'_, u32>) -> Result<Step, GestureError> {
        Ok(if cx.number_of_touches() == 0 {
            Step::End
        } else {
            Step::Stay
        })
    }

    fn scroll(&mut self, _cx: &AlgorithmCx<'_, u32>, delta: Vec2) -> Result<Step, GestureError> {
        match delta.x as i32 {
            d if d < -10 => Ok(Step::Change),
            d if d > 10 => Err(GestureError::UnknownContact(ContactId(99))),
            0 => Ok(Step::Begin),
            _ => Ok(Step::Stay),
        }
    }
}

fn event(op: &Op, ts: u64) -> Option<InputEvent> {
    let p = |x: i32, y: i32| Point::new(f64::from(x), f64::from(y));
    Some(match *op {
        Op::Down(c, x, y) => InputEvent::primary_down(ts, ContactId(c), p(x, y)),
        Op::Move(c, x, y) => InputEvent::primary_dragged(ts, ContactId(c), p(x, y)),
        Op::Up(c) => InputEvent::primary_up(ts, ContactId(c), Point::ZERO),
        Op::Cancel(c) => InputEvent::touches_cancelled(ts, &[(ContactId(c), Point::ZERO)]),
        Op::Magnify(m) => InputEvent::magnify(ts, f64::from(m) / 100.0),
        Op::GestureEnd => InputEvent::gesture_end(ts),
        Op::Scroll(d) => InputEvent::scroll(ts, Vec2::new(f64::from(d), 0.0)),
        Op::Interrupt => InputEvent::interrupt(ts),
        Op::Toggle(_) => return None,
    })
}

fn setup() -> (Gestures<u32>, [RecognizerId; 3]) {
    let mut g = Gestures::new();
    let ids = [
        g.create(PinchRecognizer::new()),
        g.create(PanRecognizer::new()),
        g.create(Erratic),
    ];
    for id in ids {
        g.attach(id, 1).unwrap();
    }
    (g, ids)
}

proptest! {
    #[test]
    fn state_traces_are_valid_paths(ops in prop::collection::vec(arb_op(), 0..80)) {
        let (mut g, ids) = setup();
        let mut current = [GestureState::Possible; 3];
        let mut enabled = [true; 3];

        for (ts, op) in ops.iter().enumerate() {
            if let Op::Toggle(i) = *op {
                enabled[i] = !enabled[i];
                g.set_enabled(ids[i], enabled[i]).unwrap();
                continue;
            }
            let ev = event(op, ts as u64 * 8).unwrap();
            let report = g.dispatch(1, &ev);
            prop_assert!(!report.queued);

            for t in &report.transitions {
                let i = ids.iter().position(|id| *id == t.recognizer).unwrap();
                prop_assert!(enabled[i], "disabled recognizer transitioned: {t:?}");
                prop_assert_eq!(t.from, current[i]);
                prop_assert!(t.from.can_transition_to(t.to), "invalid edge {:?}", t);
                prop_assert!(!t.from.is_terminal());
                current[i] = if t.to.is_terminal() { GestureState::Possible } else { t.to };
            }
            for (i, id) in ids.iter().enumerate() {
                prop_assert_eq!(g.state(*id), Some(current[i]));
            }
            for f in &report.faults {
                prop_assert_eq!(f.recognizer, ids[2]);
            }
        }
    }

    #[test]
    fn at_most_one_transition_per_recognizer_per_event(ops in prop::collection::vec(arb_op(), 0..80)) {
        let (mut g, ids) = setup();
        for (ts, op) in ops.iter().enumerate() {
            let Some(ev) = event(op, ts as u64) else { continue };
            let report = g.dispatch(1, &ev);
            for id in ids {
                prop_assert!(report.states_of(id).count() <= 1);
            }
        }
    }

    #[test]
    fn touch_order_is_stable(ops in prop::collection::vec(arb_op(), 0..60)) {
        let (mut g, ids) = setup();
        for (ts, op) in ops.iter().enumerate() {
            let Some(ev) = event(op, ts as u64) else { continue };
            g.dispatch(1, &ev);
            for id in ids {
                let n = g.number_of_touches(id);
                prop_assert_eq!(g.touches(id).len(), n);
                let first: Vec<Point> = (0..n).map(|i| g.location_of_touch(id, i, None)).collect();
                let second: Vec<Point> = (0..n).map(|i| g.location_of_touch(id, i, Some(1))).collect();
                prop_assert_eq!(first, second);
                prop_assert!(g.try_location_of_touch(id, n, None).is_err());
            }
        }
    }
}
