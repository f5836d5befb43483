// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag of one or more contacts.
//!
//! The pan follows the centroid of its contacts. It begins once the centroid has
//! travelled [`PanSettings::begin_threshold`] with a contact count inside
//! `min_contacts..=max_contacts`, and ends when the last contact lifts.
//! [`PanRecognizer::translation`] is measured from the centroid at `Began`.
//! Contacts joining or leaving rebase the centroid so the translation does not
//! jump.

use kurbo::{Point, Vec2};

use crate::error::GestureError;
use crate::event::EventCategories;
use crate::recognizer::{AlgorithmCx, GestureAlgorithm};
use crate::space::ViewKey;
use crate::state::{GestureState, Step};

/// Tuning for [`PanRecognizer`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PanSettings {
    /// Fewest contacts that can pan.
    pub min_contacts: usize,
    /// Most contacts that can pan; more fails the attempt before recognition.
    pub max_contacts: usize,
    /// Centroid travel, in view units, required to begin.
    pub begin_threshold: f64,
}

impl Default for PanSettings {
    fn default() -> Self {
        Self {
            min_contacts: 1,
            max_contacts: usize::MAX,
            begin_threshold: 4.0,
        }
    }
}

impl PanSettings {
    /// Set [`PanSettings::min_contacts`].
    pub fn with_min_contacts(mut self, min: usize) -> Self {
        self.min_contacts = min;
        self
    }

    /// Set [`PanSettings::max_contacts`].
    pub fn with_max_contacts(mut self, max: usize) -> Self {
        self.max_contacts = max;
        self
    }

    /// Set [`PanSettings::begin_threshold`].
    pub fn with_begin_threshold(mut self, threshold: f64) -> Self {
        self.begin_threshold = threshold;
        self
    }

    fn accepts(&self, n: usize) -> bool {
        (self.min_contacts..=self.max_contacts).contains(&n)
    }
}

/// Pan gesture algorithm.
#[derive(Clone, Debug, Default)]
pub struct PanRecognizer {
    settings: PanSettings,
    translation: Vec2,
    velocity: Vec2,
    /// Centroid the current measurement is relative to.
    origin: Option<Point>,
    /// Travel accumulated before the last rebase.
    offset: Vec2,
    /// Travel of the attempt in progress.
    travel: Vec2,
    /// Contact count at the last rebase.
    tracked: usize,
    last_update: Option<(u64, Vec2)>,
}

impl PanRecognizer {
    /// A pan with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A pan with the given settings.
    pub fn with_settings(settings: PanSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Settings in use.
    pub fn settings(&self) -> &PanSettings {
        &self.settings
    }

    /// Translation of the centroid since `Began`, in the recognizer's view space.
    ///
    /// Outside `Began`/`Changed` this is the last computed value.
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Centroid velocity in view units per second over the last two updates.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Update `travel` from the current centroid, rebasing on a count change.
    fn track<V: ViewKey>(&mut self, cx: &AlgorithmCx<'_, V>) {
        let n = cx.number_of_touches();
        let Some(c) = cx.centroid() else {
            return;
        };
        match self.origin {
            Some(o) if self.tracked == n => self.travel = self.offset + (c - o),
            _ => {
                self.offset = self.travel;
                self.origin = Some(c);
                self.tracked = n;
            }
        }
    }

    fn record(&mut self, timestamp: u64) {
        if let Some((then, previous)) = self.last_update {
            let dt = timestamp.saturating_sub(then);
            if dt > 0 {
                self.velocity = (self.travel - previous) * (1000.0 / dt as f64);
            }
        } else {
            self.velocity = Vec2::ZERO;
        }
        self.translation = self.travel;
        self.last_update = Some((timestamp, self.travel));
    }
}

impl<V: ViewKey> GestureAlgorithm<V> for PanRecognizer {
    fn interests(&self) -> EventCategories {
        EventCategories::PRIMARY
    }

    fn primary_down(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        if cx.state() == GestureState::Possible && cx.number_of_touches() > self.settings.max_contacts
        {
            return Ok(Step::Fail);
        }
        self.track(cx);
        Ok(Step::Stay)
    }

    fn primary_dragged(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        self.track(cx);
        match cx.state() {
            GestureState::Possible => {
                let n = cx.number_of_touches();
                if self.settings.accepts(n) && self.travel.hypot() >= self.settings.begin_threshold
                {
                    // Measure from here on.
                    self.origin = cx.centroid();
                    self.offset = Vec2::ZERO;
                    self.travel = Vec2::ZERO;
                    self.last_update = None;
                    self.record(cx.timestamp());
                    Ok(Step::Begin)
                } else {
                    Ok(Step::Stay)
                }
            }
            GestureState::Began | GestureState::Changed => {
                self.record(cx.timestamp());
                Ok(Step::Change)
            }
            _ => Ok(Step::Stay),
        }
    }

    fn primary_up(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        let n = cx.number_of_touches();
        let active = cx.state().is_active();
        if n == 0 {
            return Ok(if active { Step::End } else { Step::Fail });
        }
        if active && n < self.settings.min_contacts {
            return Ok(Step::End);
        }
        self.track(cx);
        Ok(Step::Stay)
    }

    fn reset(&mut self) {
        self.origin = None;
        self.offset = Vec2::ZERO;
        self.travel = Vec2::ZERO;
        self.tracked = 0;
        self.last_update = None;
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

    const A: ContactId = ContactId(1);
    const B: ContactId = ContactId(2);

    fn setup(settings: PanSettings) -> (Gestures<u32>, RecognizerId) {
        let mut g = Gestures::new();
        let id = g.create(PanRecognizer::with_settings(settings));
        g.attach(id, 1).unwrap();
        (g, id)
    }

    fn pan(g: &Gestures<u32>, id: RecognizerId) -> &PanRecognizer {
        g.algorithm::<PanRecognizer>(id).unwrap()
    }

    #[test]
    fn drag_begins_after_threshold() {
        let (mut g, id) = setup(PanSettings::default());
        g.dispatch(1, &InputEvent::primary_down(0, A, Point::new(10.0, 10.0)));
        let r = g.dispatch(1, &InputEvent::primary_dragged(10, A, Point::new(12.0, 10.0)));
        assert!(r.transitions.is_empty());

        let r = g.dispatch(1, &InputEvent::primary_dragged(20, A, Point::new(15.0, 10.0)));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Began]);
        assert_eq!(pan(&g, id).translation(), Vec2::ZERO);

        let r = g.dispatch(1, &InputEvent::primary_dragged(30, A, Point::new(25.0, 15.0)));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Changed]);
        assert_eq!(pan(&g, id).translation(), Vec2::new(10.0, 5.0));
        assert_eq!(pan(&g, id).velocity(), Vec2::new(1000.0, 500.0));

        let r = g.dispatch(1, &InputEvent::primary_up(40, A, Point::new(25.0, 15.0)));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Ended]);
        assert_eq!(pan(&g, id).translation(), Vec2::new(10.0, 5.0));
    }

    #[test]
    fn tap_fails() {
        let (mut g, id) = setup(PanSettings::default());
        g.dispatch(1, &InputEvent::primary_down(0, A, Point::ZERO));
        let r = g.dispatch(1, &InputEvent::primary_up(5, A, Point::ZERO));
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Failed]);
    }

    #[test]
    fn second_contact_rebases_the_centroid() {
        let (mut g, id) = setup(PanSettings::default().with_begin_threshold(1.0));
        g.dispatch(1, &InputEvent::primary_down(0, A, Point::ZERO));
        g.dispatch(1, &InputEvent::primary_dragged(10, A, Point::new(5.0, 0.0)));
        assert_eq!(g.state(id), Some(GestureState::Began));

        // Centroid jumps to (25, 0), which must not count as travel.
        g.dispatch(1, &InputEvent::primary_down(20, B, Point::new(45.0, 0.0)));
        g.dispatch(1, &InputEvent::touches_moved(30, &[(A, Point::new(7.0, 0.0)), (B, Point::new(47.0, 0.0))]));
        assert_eq!(pan(&g, id).translation(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn too_many_contacts_fail() {
        let (mut g, id) = setup(PanSettings::default().with_max_contacts(1));
        let r = g.dispatch(
            1,
            &InputEvent::touches_down(0, &[(A, Point::ZERO), (B, Point::new(1.0, 0.0))]),
        );
        assert_eq!(r.states_of(id).collect::<Vec<_>>(), vec![GestureState::Failed]);
    }

    #[test]
    fn min_contacts_gate_recognition() {
        let (mut g, id) = setup(PanSettings::default().with_min_contacts(2));
        g.dispatch(1, &InputEvent::primary_down(0, A, Point::ZERO));
        let r = g.dispatch(1, &InputEvent::primary_dragged(10, A, Point::new(50.0, 0.0)));
        assert!(r.transitions.is_empty());
        assert_eq!(g.state(id), Some(GestureState::Possible));
        assert_eq!(pan(&g, id).settings().min_contacts, 2);
    }
}
