// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Affine, Point};
use understory_gesture::{
    AffineSpace, ContactId, CoordinateSpace, Gestures, InputEvent, ObserverId, PanRecognizer,
    PinchRecognizer, RecognizerId, Target,
};

const A: ContactId = ContactId(1);
const B: ContactId = ContactId(2);

/// Two contacts spreading apart over `steps` move events, then lifting.
fn gen_pinch_stream(steps: usize) -> Vec<InputEvent> {
    let mut out = Vec::with_capacity(steps + 2);
    out.push(InputEvent::touches_down(
        0,
        &[(A, Point::new(100.0, 100.0)), (B, Point::new(150.0, 100.0))],
    ));
    for i in 1..=steps {
        let d = 50.0 + i as f64;
        out.push(InputEvent::touches_moved(
            i as u64 * 8,
            &[(A, Point::new(100.0 - d / 2.0, 100.0)), (B, Point::new(100.0 + d / 2.0, 100.0))],
        ));
    }
    out.push(InputEvent::touches_up(
        (steps as u64 + 1) * 8,
        &[(A, Point::ZERO), (B, Point::ZERO)],
    ));
    out
}

fn populate<C: CoordinateSpace<u32> + 'static>(
    g: &mut Gestures<u32, C>,
    per_view: usize,
) -> Vec<RecognizerId> {
    let mut ids = Vec::with_capacity(per_view);
    for i in 0..per_view {
        let id = if i % 2 == 0 {
            g.create(PinchRecognizer::new())
        } else {
            g.create(PanRecognizer::new())
        };
        g.attach(id, 1).unwrap();
        g.add_target(id, Target::new(ObserverId(0), "count"), |g, id| {
            black_box(g.state(id));
        })
        .unwrap();
        ids.push(id);
    }
    ids
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let stream = gen_pinch_stream(256);
    for &n in &[1_usize, 4, 16] {
        group.throughput(Throughput::Elements(stream.len() as u64));
        group.bench_function(format!("pinch_stream_recognizers_{}", n), |b| {
            b.iter_batched(
                || {
                    let mut g: Gestures<u32> = Gestures::new();
                    let _ = populate(&mut g, n);
                    g
                },
                |mut g| {
                    let mut transitions = 0_usize;
                    for ev in &stream {
                        transitions += g.dispatch(1, ev).transitions.len();
                    }
                    black_box(transitions);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_dispatch_transformed(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_transformed");
    let stream = gen_pinch_stream(256);
    group.throughput(Throughput::Elements(stream.len() as u64));
    group.bench_function("pinch_stream_affine_space", |b| {
        b.iter_batched(
            || {
                let space = AffineSpace::new(|v: u32| {
                    Affine::translate((f64::from(v) * 10.0, 0.0)) * Affine::scale(2.0)
                });
                let mut g = Gestures::with_space(space);
                let ids = populate(&mut g, 4);
                (g, ids)
            },
            |(mut g, ids)| {
                for ev in &stream {
                    black_box(g.dispatch(1, ev));
                    black_box(g.location_in_view(ids[0], None));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_dispatch_transformed);
criterion_main!(benches);
