// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-contact pinch, plus trackpad magnification.
//!
//! ## Recognition
//!
//! - Begins once exactly two contacts are down and their separation has moved
//!   more than [`PinchSettings::begin_threshold`] away from the separation at
//!   first contact. Two parallel drags keep their separation and never begin.
//! - While active, [`PinchRecognizer::scale`] is the current separation divided by
//!   the separation at `Began`, so the first reported scale is `1.0`.
//! - Ends when the last contact lifts, or on the first lift with
//!   [`PinchSettings::end_on_first_lift`].
//! - More than [`PinchSettings::max_contacts`] contacts before recognition fails.
//!
//! `Magnify` events drive the same recognizer without contacts: the first one
//! begins at `1.0 + magnification`, later ones add to the scale, and
//! `GestureEnd` ends the gesture. A platform gesture gets one such attempt: once
//! it fails or is vetoed, further magnify events are ignored until the next
//! `GestureBegin` or `GestureEnd`.
//!
//! ```
//! use kurbo::Point;
//! use understory_gesture::{ContactId, GestureState, Gestures, InputEvent, PinchRecognizer};
//!
//! let mut gestures: Gestures<u32> = Gestures::new();
//! let pinch = gestures.create(PinchRecognizer::new());
//! gestures.attach(pinch, 1).unwrap();
//!
//! let (a, b) = (ContactId(1), ContactId(2));
//! let at = |x: f64| Point::new(x, 0.0);
//! gestures.dispatch(1, &InputEvent::touches_down(0, &[(a, at(0.0)), (b, at(50.0))]));
//! gestures.dispatch(1, &InputEvent::touches_moved(16, &[(b, at(80.0))]));
//! assert_eq!(gestures.state(pinch), Some(GestureState::Began));
//!
//! gestures.dispatch(1, &InputEvent::touches_moved(32, &[(b, at(100.0))]));
//! let scale = gestures.algorithm::<PinchRecognizer>(pinch).unwrap().scale();
//! assert_eq!(scale, 1.25);
//! ```

use crate::error::GestureError;
use crate::event::EventCategories;
use crate::recognizer::{AlgorithmCx, GestureAlgorithm};
use crate::space::ViewKey;
use crate::state::{GestureState, Step};

/// Tuning for [`PinchRecognizer`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PinchSettings {
    /// Minimum change in separation, in view units, before the pinch begins.
    pub begin_threshold: f64,
    /// End as soon as one of the two contacts lifts.
    pub end_on_first_lift: bool,
    /// Contacts allowed before recognition; more than this fails the attempt.
    pub max_contacts: usize,
}

impl Default for PinchSettings {
    fn default() -> Self {
        Self {
            begin_threshold: 10.0,
            end_on_first_lift: false,
            max_contacts: 2,
        }
    }
}

impl PinchSettings {
    /// Set [`PinchSettings::begin_threshold`].
    pub fn with_begin_threshold(mut self, threshold: f64) -> Self {
        self.begin_threshold = threshold;
        self
    }

    /// Set [`PinchSettings::end_on_first_lift`].
    pub fn with_end_on_first_lift(mut self, end: bool) -> Self {
        self.end_on_first_lift = end;
        self
    }

    /// Set [`PinchSettings::max_contacts`].
    pub fn with_max_contacts(mut self, max: usize) -> Self {
        self.max_contacts = max;
        self
    }
}

/// Pinch gesture algorithm.
#[derive(Clone, Debug)]
pub struct PinchRecognizer {
    settings: PinchSettings,
    scale: f64,
    velocity: f64,
    /// Separation when two contacts first became active.
    initial_separation: Option<f64>,
    /// Separation that corresponds to `scale == 1.0`.
    began_separation: Option<f64>,
    /// Timestamp and scale of the last reported update.
    last_update: Option<(u64, f64)>,
    magnifying: bool,
    /// The current platform gesture already tried to begin by magnification.
    ///
    /// Survives `reset` so a failed or vetoed attempt is not retried by the
    /// remaining magnify events; cleared by `GestureBegin` and `GestureEnd`.
    magnify_attempted: bool,
}

impl Default for PinchRecognizer {
    fn default() -> Self {
        Self::with_settings(PinchSettings::default())
    }
}

impl PinchRecognizer {
    /// A pinch with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A pinch with the given settings.
    pub fn with_settings(settings: PinchSettings) -> Self {
        Self {
            settings,
            scale: 1.0,
            velocity: 0.0,
            initial_separation: None,
            began_separation: None,
            last_update: None,
            magnifying: false,
            magnify_attempted: false,
        }
    }

    /// Settings in use.
    pub fn settings(&self) -> &PinchSettings {
        &self.settings
    }

    /// Current scale relative to the separation at `Began`.
    ///
    /// Outside `Began`/`Changed` this is the last computed value, not a live one.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scale change per second over the last two updates.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    fn record(&mut self, timestamp: u64, scale: f64) {
        if let Some((then, previous)) = self.last_update {
            let dt = timestamp.saturating_sub(then);
            if dt > 0 {
                self.velocity = (scale - previous) * 1000.0 / dt as f64;
            }
        } else {
            self.velocity = 0.0;
        }
        self.scale = scale;
        self.last_update = Some((timestamp, scale));
    }
}

fn separation<V: ViewKey>(cx: &AlgorithmCx<'_, V>) -> Result<f64, GestureError> {
    Ok((cx.touch(1)? - cx.touch(0)?).hypot())
}

impl<V: ViewKey> GestureAlgorithm<V> for PinchRecognizer {
    fn interests(&self) -> EventCategories {
        EventCategories::PRIMARY | EventCategories::MAGNIFY | EventCategories::GESTURE
    }

    fn primary_down(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        let n = cx.number_of_touches();
        match cx.state() {
            GestureState::Possible if self.magnifying => Ok(Step::Stay),
            GestureState::Possible if n > self.settings.max_contacts => Ok(Step::Fail),
            GestureState::Possible => {
                if n == 2 {
                    self.initial_separation = Some(separation(cx)?);
                }
                Ok(Step::Stay)
            }
            _ if n == 2 && !self.magnifying => {
                // A lifted contact came back: keep the scale continuous.
                let d = separation(cx)?;
                if self.scale > 0.0 {
                    self.began_separation = Some(d / self.scale);
                }
                Ok(Step::Stay)
            }
            _ => Ok(Step::Stay),
        }
    }

    fn primary_dragged(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        if cx.number_of_touches() < 2 || self.magnifying {
            return Ok(Step::Stay);
        }
        let d = separation(cx)?;
        match cx.state() {
            GestureState::Possible => {
                let Some(initial) = self.initial_separation else {
                    return Ok(Step::Stay);
                };
                let moved = d - initial;
                let t = self.settings.begin_threshold;
                if cx.number_of_touches() == 2 && (moved > t || moved < -t) {
                    self.began_separation = Some(d);
                    self.last_update = None;
                    self.record(cx.timestamp(), 1.0);
                    Ok(Step::Begin)
                } else {
                    Ok(Step::Stay)
                }
            }
            GestureState::Began | GestureState::Changed => match self.began_separation {
                Some(base) if base > 0.0 => {
                    self.record(cx.timestamp(), d / base);
                    Ok(Step::Change)
                }
                _ => Ok(Step::Stay),
            },
            _ => Ok(Step::Stay),
        }
    }

    fn primary_up(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        if self.magnifying {
            return Ok(Step::Stay);
        }
        let n = cx.number_of_touches();
        Ok(match cx.state() {
            GestureState::Began | GestureState::Changed => {
                if n == 0 || (self.settings.end_on_first_lift && n < 2) {
                    Step::End
                } else {
                    Step::Stay
                }
            }
            GestureState::Possible if n == 0 => Step::Fail,
            GestureState::Possible => {
                if n < 2 {
                    self.initial_separation = None;
                }
                Step::Stay
            }
            _ => Step::Stay,
        })
    }

    fn magnify(
        &mut self,
        cx: &AlgorithmCx<'_, V>,
        magnification: f64,
    ) -> Result<Step, GestureError> {
        match cx.state() {
            GestureState::Possible if self.magnify_attempted => Ok(Step::Stay),
            GestureState::Possible if cx.number_of_touches() == 0 => {
                self.magnify_attempted = true;
                self.magnifying = true;
                self.last_update = None;
                self.record(cx.timestamp(), 1.0 + magnification);
                Ok(Step::Begin)
            }
            GestureState::Began | GestureState::Changed if self.magnifying => {
                self.record(cx.timestamp(), self.scale + magnification);
                Ok(Step::Change)
            }
            _ => Ok(Step::Stay),
        }
    }

    fn begin_gesture(&mut self, _cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        self.magnify_attempted = false;
        Ok(Step::Stay)
    }

    fn end_gesture(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        self.magnify_attempted = false;
        Ok(if self.magnifying && cx.state().is_active() {
            Step::End
        } else {
            Step::Stay
        })
    }

    fn reset(&mut self) {
        self.initial_separation = None;
        self.began_separation = None;
        self.last_update = None;
        self.magnifying = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactId;
    use crate::event::InputEvent;
    use crate::gestures::Gestures;
    use crate::recognizer::RecognizerId;
    use alloc::vec;
    use alloc::vec::Vec;
    use kurbo::Point;

    const A: ContactId = ContactId(1);
    const B: ContactId = ContactId(2);
    const C: ContactId = ContactId(3);

    fn at(x: f64) -> Point {
        Point::new(x, 0.0)
    }

    fn setup(settings: PinchSettings) -> (Gestures<u32>, RecognizerId) {
        let mut g = Gestures::new();
        let id = g.create(PinchRecognizer::with_settings(settings));
        g.attach(id, 1).unwrap();
        (g, id)
    }

    fn pinch(g: &Gestures<u32>, id: RecognizerId) -> &PinchRecognizer {
        g.algorithm::<PinchRecognizer>(id).unwrap()
    }

    #[test]
    fn spread_begins_changes_and_ends() {
        let (mut g, id) = setup(PinchSettings::default());
        let r = g.dispatch(1, &InputEvent::touches_down(0, &[(A, at(0.0)), (B, at(50.0))]));
        assert!(r.transitions.is_empty());

        let r = g.dispatch(1, &InputEvent::touches_moved(10, &[(B, at(80.0))]));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Began]);
        assert_eq!(pinch(&g, id).scale(), 1.0);

        let r = g.dispatch(1, &InputEvent::touches_moved(20, &[(B, at(100.0))]));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Changed]);
        assert_eq!(pinch(&g, id).scale(), 1.25);
        // 0.25 over 10 ms.
        assert_eq!(pinch(&g, id).velocity(), 25.0);

        let r = g.dispatch(1, &InputEvent::touches_up(30, &[(A, at(0.0)), (B, at(100.0))]));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Ended]);
        assert_eq!(g.number_of_touches(id), 0);
        // Last value survives the reset.
        assert_eq!(pinch(&g, id).scale(), 1.25);
    }

    #[test]
    fn parallel_drag_does_not_begin() {
        let (mut g, id) = setup(PinchSettings::default());
        g.dispatch(1, &InputEvent::touches_down(0, &[(A, at(0.0)), (B, at(50.0))]));
        let r = g.dispatch(
            1,
            &InputEvent::touches_moved(10, &[(A, at(40.0)), (B, at(90.0))]),
        );
        assert!(r.transitions.is_empty());
        assert_eq!(g.state(id), Some(GestureState::Possible));
    }

    #[test]
    fn third_contact_fails_before_recognition() {
        let (mut g, id) = setup(PinchSettings::default());
        g.dispatch(1, &InputEvent::touches_down(0, &[(A, at(0.0)), (B, at(50.0))]));
        let r = g.dispatch(1, &InputEvent::touches_down(5, &[(C, at(25.0))]));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Failed]);
    }

    #[test]
    fn end_on_first_lift() {
        let (mut g, id) = setup(PinchSettings::default().with_end_on_first_lift(true));
        g.dispatch(1, &InputEvent::touches_down(0, &[(A, at(0.0)), (B, at(50.0))]));
        g.dispatch(1, &InputEvent::touches_moved(10, &[(B, at(80.0))]));
        let r = g.dispatch(1, &InputEvent::touches_up(20, &[(B, at(80.0))]));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Ended]);
    }

    #[test]
    fn lifting_one_contact_keeps_the_gesture() {
        let (mut g, id) = setup(PinchSettings::default());
        g.dispatch(1, &InputEvent::touches_down(0, &[(A, at(0.0)), (B, at(50.0))]));
        g.dispatch(1, &InputEvent::touches_moved(10, &[(B, at(100.0))]));
        let r = g.dispatch(1, &InputEvent::touches_up(20, &[(B, at(100.0))]));
        assert!(r.transitions.is_empty());
        assert_eq!(g.state(id), Some(GestureState::Began));
        let r = g.dispatch(1, &InputEvent::touches_up(30, &[(A, at(0.0))]));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Ended]);
    }

    #[test]
    fn magnification_drives_scale() {
        let (mut g, id) = setup(PinchSettings::default());
        let r = g.dispatch(1, &InputEvent::gesture_begin(0));
        assert!(r.transitions.is_empty());
        let r = g.dispatch(1, &InputEvent::magnify(10, 0.5));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Began]);
        assert_eq!(pinch(&g, id).scale(), 1.5);
        g.dispatch(1, &InputEvent::magnify(20, 0.25));
        assert_eq!(g.state(id), Some(GestureState::Changed));
        assert_eq!(pinch(&g, id).scale(), 1.75);
        let r = g.dispatch(1, &InputEvent::gesture_end(30));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Ended]);
    }

    #[test]
    fn failed_magnification_waits_for_the_next_platform_gesture() {
        let (mut g, id) = setup(PinchSettings::default());
        g.dispatch(1, &InputEvent::gesture_begin(0));
        g.dispatch(1, &InputEvent::magnify(10, 0.5));
        // Focus loss cancels the attempt mid-gesture.
        let r = g.interrupt(1, 15);
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Cancelled]);

        for ts in [20, 30] {
            let r = g.dispatch(1, &InputEvent::magnify(ts, 0.1));
            assert!(r.transitions.is_empty());
        }
        let r = g.dispatch(1, &InputEvent::gesture_end(40));
        assert!(r.transitions.is_empty());

        // A new platform gesture may begin again.
        let r = g.dispatch(1, &InputEvent::magnify(50, 0.25));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Began]);
        assert_eq!(pinch(&g, id).scale(), 1.25);
    }

    #[test]
    fn re_began_contact_cancels_an_active_pinch() {
        let (mut g, id) = setup(PinchSettings::default());
        g.dispatch(1, &InputEvent::touches_down(0, &[(A, at(0.0)), (B, at(50.0))]));
        g.dispatch(1, &InputEvent::touches_moved(10, &[(B, at(80.0))]));
        assert_eq!(g.state(id), Some(GestureState::Began));

        // A arrives as a new touch without having ended.
        let r = g.dispatch(1, &InputEvent::touches_down(20, &[(A, at(30.0))]));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Cancelled]);
        assert_eq!(g.number_of_touches(id), 0);
    }

    #[test]
    fn settings_builders() {
        let s = PinchSettings::default()
            .with_begin_threshold(2.0)
            .with_max_contacts(3);
        assert_eq!(s.begin_threshold, 2.0);
        assert_eq!(s.max_contacts, 3);
        assert!(!s.end_on_first_lift);
        assert_eq!(PinchRecognizer::with_settings(s).settings(), &s);
    }
}
