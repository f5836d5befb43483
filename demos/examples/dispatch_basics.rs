// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch basics.
//!
//! A pan and a pinch share one view inside a translated child. The pan is only
//! allowed to begin while the pinch is idle, and a focus loss interrupts
//! whatever is in progress.
//!
//! Run:
//! - `cargo run -p understory_demos --example dispatch_basics`
//! - `RUST_LOG=understory_gesture=trace cargo run -p understory_demos --example dispatch_basics`

use std::rc::Rc;

use kurbo::{Affine, Point};
use tracing_subscriber::EnvFilter;
use understory_gesture::{
    AffineSpace, ContactId, GestureDelegate, GestureState, Gestures, InputEvent, ObserverId,
    PanRecognizer, PinchRecognizer, Snapshot, Target,
};

const ROOT: u32 = 0;
const CARD: u32 = 1;

/// Lets the pan begin only with a single finger down.
struct SingleFingerPan;

impl GestureDelegate<u32> for SingleFingerPan {
    fn should_begin(&self, recognizer: &Snapshot<'_, u32>) -> bool {
        recognizer.number_of_touches() == 1
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // The card sits at (100, 50) in the window.
    let space = AffineSpace::new(|view: u32| match view {
        CARD => Affine::translate((100.0, 50.0)),
        _ => Affine::IDENTITY,
    });
    let mut gestures = Gestures::with_space(space);

    let pinch = gestures.create(PinchRecognizer::new());
    let pan = gestures.create(PanRecognizer::new());
    gestures.attach(pinch, CARD).unwrap();
    gestures.attach(pan, CARD).unwrap();

    let delegate: Rc<dyn GestureDelegate<u32>> = Rc::new(SingleFingerPan);
    gestures.set_delegate(pan, Some(&delegate)).unwrap();

    for (id, name) in [(pinch, "pinch"), (pan, "pan")] {
        gestures
            .add_target(id, Target::new(ObserverId(7), name), move |g, id| {
                let in_window = g.location_in_view(id, Some(ROOT));
                let in_card = g.location_in_view(id, Some(CARD));
                println!("{name}: {:?} at {in_card:?} (window {in_window:?})", g.state(id));
            })
            .unwrap();
    }

    // One finger drags: the pan recognizes, the pinch fails on lift.
    let f = ContactId(1);
    gestures.dispatch(CARD, &InputEvent::primary_down(0, f, Point::new(10.0, 10.0)));
    gestures.dispatch(CARD, &InputEvent::primary_dragged(16, f, Point::new(30.0, 12.0)));
    gestures.dispatch(CARD, &InputEvent::primary_dragged(32, f, Point::new(60.0, 20.0)));
    if let Some(p) = gestures.algorithm::<PanRecognizer>(pan) {
        println!("pan translation {:?}", p.translation());
    }
    gestures.dispatch(CARD, &InputEvent::primary_up(48, f, Point::new(60.0, 20.0)));

    // Two fingers spread: the pinch begins, the delegate keeps the pan out.
    let (a, b) = (ContactId(2), ContactId(3));
    gestures.dispatch(
        CARD,
        &InputEvent::touches_down(100, &[(a, Point::new(0.0, 0.0)), (b, Point::new(40.0, 0.0))]),
    );
    gestures.dispatch(
        CARD,
        &InputEvent::touches_moved(116, &[(a, Point::new(-20.0, 0.0)), (b, Point::new(60.0, 0.0))]),
    );
    assert_eq!(gestures.state(pinch), Some(GestureState::Began));

    // Focus loss: the pinch is cancelled without any "up" events.
    let report = gestures.interrupt(CARD, 130);
    println!("interrupt: {:?}", report.transitions);
    println!("remaining contacts: {}", gestures.contacts().len());
}
