// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pinch basics.
//!
//! Attach a pinch to a view, feed it a two-finger spread, and print every
//! transition together with the current scale.
//!
//! Run:
//! - `cargo run -p understory_demos --example pinch_basics`
//! - `RUST_LOG=understory_gesture=debug cargo run -p understory_demos --example pinch_basics`

use kurbo::Point;
use tracing_subscriber::EnvFilter;
use understory_gesture::{
    ContactId, Gestures, InputEvent, ObserverId, PinchRecognizer, PinchSettings, Target,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
struct View(u32);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut gestures: Gestures<View> = Gestures::new();
    let canvas = View(1);

    let settings = PinchSettings::default().with_begin_threshold(12.0);
    let pinch = gestures.create_with_target(
        PinchRecognizer::with_settings(settings),
        Target::new(ObserverId(1), "zoom"),
        |g, id| {
            let pinch = g.algorithm::<PinchRecognizer>(id);
            println!(
                "{:?}: state={:?} scale={:.3} velocity={:.3}/s touches={}",
                id,
                g.state(id),
                pinch.map_or(1.0, |p| p.scale()),
                pinch.map_or(0.0, |p| p.velocity()),
                g.number_of_touches(id),
            );
        },
    );
    gestures.attach(pinch, canvas).unwrap();

    let (a, b) = (ContactId(1), ContactId(2));
    let center = Point::new(200.0, 200.0);
    let pair = |d: f64| {
        [
            (a, Point::new(center.x - d / 2.0, center.y)),
            (b, Point::new(center.x + d / 2.0, center.y)),
        ]
    };

    gestures.dispatch(canvas, &InputEvent::touches_down(0, &pair(50.0)));
    for (i, d) in [55.0, 60.0, 80.0, 100.0, 140.0].into_iter().enumerate() {
        let ts = (i as u64 + 1) * 16;
        gestures.dispatch(canvas, &InputEvent::touches_moved(ts, &pair(d)));
    }
    let report = gestures.dispatch(canvas, &InputEvent::touches_up(112, &pair(140.0)));
    println!("last event transitions: {:?}", report.transitions);

    // Trackpad magnification drives the same recognizer without contacts.
    gestures.dispatch(canvas, &InputEvent::gesture_begin(200));
    for (i, m) in [0.1, 0.05, -0.02].into_iter().enumerate() {
        gestures.dispatch(canvas, &InputEvent::magnify(216 + i as u64 * 16, m));
    }
    gestures.dispatch(canvas, &InputEvent::gesture_end(264));
}
