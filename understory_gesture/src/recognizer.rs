// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recognizer shell and the gesture algorithm interface.
//!
//! ## Overview
//!
//! A recognizer is a generic shell that owns the state machine mechanics:
//! state, enabled flag, view back-reference, the recognizer's contact set,
//! targets, and delegate. What makes a pinch a pinch lives in a
//! [`GestureAlgorithm`], which receives per-category event hooks and answers
//! with a [`Step`].
//!
//! Algorithms observe the recognizer through an [`AlgorithmCx`]: a read-only
//! [`Snapshot`] of the recognizer plus the contacts the current event added,
//! moved, ended, or cancelled. They never mutate the contact set.
//!
//! ## Writing an algorithm
//!
//! ```
//! use understory_gesture::{AlgorithmCx, EventCategories, GestureAlgorithm, GestureError, Step, ViewKey};
//!
//! /// Recognizes a secondary click: down then up without leaving the view.
//! #[derive(Debug, Default)]
//! struct SecondaryClick;
//!
//! impl<V: ViewKey> GestureAlgorithm<V> for SecondaryClick {
//!     fn interests(&self) -> EventCategories {
//!         EventCategories::SECONDARY
//!     }
//!
//!     fn secondary_up(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
//!         Ok(if cx.ended().is_empty() { Step::Stay } else { Step::End })
//!     }
//! }
//! ```

use alloc::vec::Vec;
use core::any::Any;

use kurbo::{Point, Vec2};

use crate::contact::{ContactId, ContactTracker};
use crate::error::GestureError;
use crate::event::{EventCategories, EventKind};
use crate::space::{CoordinateSpace, ViewKey};
use crate::state::{GestureState, Step};

/// Handle of a recognizer inside a [`Gestures`](crate::Gestures) arena.
///
/// A slot index plus a generation counter, so a handle to a removed recognizer
/// never aliases a recognizer created later in the same slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RecognizerId(pub(crate) u32, pub(crate) u32);

impl RecognizerId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

/// State machine mechanics shared by every recognizer.
#[derive(Clone, Debug)]
pub(crate) struct RecognizerCore<V> {
    pub(crate) state: GestureState,
    pub(crate) enabled: bool,
    pub(crate) view: Option<V>,
    /// Contacts owned by this recognizer, in order of first contact.
    pub(crate) contacts: Vec<ContactId>,
    /// Last observed location, in root space.
    pub(crate) last_location: Option<Point>,
}

impl<V> Default for RecognizerCore<V> {
    fn default() -> Self {
        Self {
            state: GestureState::Possible,
            enabled: true,
            view: None,
            contacts: Vec::new(),
            last_location: None,
        }
    }
}

impl<V: ViewKey> RecognizerCore<V> {
    /// Return to `Possible` and forget all contacts.
    pub(crate) fn reset(&mut self) {
        self.state = GestureState::Possible;
        self.contacts.clear();
    }
}

/// Read-only view of one recognizer, valid for a single query or callback.
///
/// Locations are re-read from the contact tracker on every call.
pub struct Snapshot<'a, V: ViewKey> {
    id: RecognizerId,
    core: &'a RecognizerCore<V>,
    tracker: &'a ContactTracker<V>,
    space: &'a dyn CoordinateSpace<V>,
}

impl<V: ViewKey> core::fmt::Debug for Snapshot<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Snapshot")
            .field("id", &self.id)
            .field("state", &self.core.state)
            .field("view", &self.core.view)
            .field("touches", &self.core.contacts)
            .finish_non_exhaustive()
    }
}

impl<'a, V: ViewKey> Snapshot<'a, V> {
    pub(crate) fn new(
        id: RecognizerId,
        core: &'a RecognizerCore<V>,
        tracker: &'a ContactTracker<V>,
        space: &'a dyn CoordinateSpace<V>,
    ) -> Self {
        Self {
            id,
            core,
            tracker,
            space,
        }
    }

    /// Handle of the recognizer.
    pub fn id(&self) -> RecognizerId {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> GestureState {
        self.core.state
    }

    /// Whether the recognizer receives events.
    pub fn is_enabled(&self) -> bool {
        self.core.enabled
    }

    /// The view the recognizer is attached to.
    pub fn view(&self) -> Option<V> {
        self.core.view
    }

    /// Identities of the recognizer's active contacts, in order of first contact.
    pub fn touches(&self) -> &'a [ContactId] {
        &self.core.contacts
    }

    /// Number of active contacts; `0` when there are none.
    pub fn number_of_touches(&self) -> usize {
        self.core.contacts.len()
    }

    /// Centroid of the active contacts in `view`'s space (`None` means root space).
    ///
    /// With no active contacts, falls back to the last location the recognizer
    /// observed, provided it is attached to a view. Returns `None` otherwise.
    pub fn location_in_view(&self, view: Option<V>) -> Option<Point> {
        let mut sum = Vec2::ZERO;
        let mut n = 0_usize;
        for id in &self.core.contacts {
            if let Some(c) = self.tracker.get(*id) {
                sum += self
                    .space
                    .convert(c.position(), Some(c.view()), view)
                    .to_vec2();
                n += 1;
            }
        }
        if n > 0 {
            return Some((sum / n as f64).to_point());
        }
        if self.core.view.is_none() {
            return None;
        }
        self.core
            .last_location
            .map(|root| self.space.convert(root, None, view))
    }

    /// Location of the contact at `index` (order of first contact) in `view`'s space.
    pub fn try_location_of_touch(
        &self,
        index: usize,
        view: Option<V>,
    ) -> Result<Point, GestureError> {
        let count = self.core.contacts.len();
        let id = *self
            .core
            .contacts
            .get(index)
            .ok_or(GestureError::TouchIndexOutOfRange { index, count })?;
        let c = self
            .tracker
            .get(id)
            .ok_or(GestureError::UnknownContact(id))?;
        Ok(self.space.convert(c.position(), Some(c.view()), view))
    }

    /// Location of the contact at `index` (order of first contact) in `view`'s space.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.number_of_touches()` or the contact is no longer
    /// tracked. Use [`Snapshot::try_location_of_touch`] to handle that case.
    #[track_caller]
    pub fn location_of_touch(&self, index: usize, view: Option<V>) -> Point {
        match self.try_location_of_touch(index, view) {
            Ok(p) => p,
            Err(e) => panic!("{e}"),
        }
    }
}

/// Context handed to [`GestureAlgorithm`] hooks for one event.
#[derive(Debug)]
pub struct AlgorithmCx<'a, V: ViewKey> {
    recognizer: Snapshot<'a, V>,
    timestamp: u64,
    added: &'a [ContactId],
    moved: &'a [ContactId],
    ended: &'a [ContactId],
    cancelled: &'a [ContactId],
}

impl<'a, V: ViewKey> AlgorithmCx<'a, V> {
    pub(crate) fn new(
        recognizer: Snapshot<'a, V>,
        timestamp: u64,
        delta: &'a ContactDelta,
    ) -> Self {
        Self {
            recognizer,
            timestamp,
            added: &delta.added,
            moved: &delta.moved,
            ended: &delta.ended,
            cancelled: &delta.cancelled,
        }
    }

    /// The recognizer being driven.
    pub fn recognizer(&self) -> &Snapshot<'a, V> {
        &self.recognizer
    }

    /// Current state (before this event's step is applied).
    pub fn state(&self) -> GestureState {
        self.recognizer.state()
    }

    /// Timestamp of the event, in milliseconds.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Number of active contacts after this event's bookkeeping.
    pub fn number_of_touches(&self) -> usize {
        self.recognizer.number_of_touches()
    }

    /// Contacts this event added to the recognizer.
    pub fn added(&self) -> &'a [ContactId] {
        self.added
    }

    /// Recognizer contacts this event moved.
    pub fn moved(&self) -> &'a [ContactId] {
        self.moved
    }

    /// Recognizer contacts this event lifted.
    pub fn ended(&self) -> &'a [ContactId] {
        self.ended
    }

    /// Recognizer contacts cancelled by this event or lost while disabled.
    pub fn cancelled(&self) -> &'a [ContactId] {
        self.cancelled
    }

    /// Location of the touch at `index`, in the recognizer's own view space.
    pub fn touch(&self, index: usize) -> Result<Point, GestureError> {
        self.recognizer
            .try_location_of_touch(index, self.recognizer.view())
    }

    /// Centroid of the active contacts in the recognizer's own view space.
    pub fn centroid(&self) -> Option<Point> {
        if self.recognizer.number_of_touches() == 0 {
            return None;
        }
        self.recognizer.location_in_view(self.recognizer.view())
    }
}

/// The recognizer's share of one event's contact changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ContactDelta {
    pub(crate) added: Vec<ContactId>,
    pub(crate) moved: Vec<ContactId>,
    pub(crate) ended: Vec<ContactId>,
    pub(crate) cancelled: Vec<ContactId>,
}

impl ContactDelta {
    pub(crate) fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.moved.is_empty()
            && self.ended.is_empty()
            && self.cancelled.is_empty()
    }
}

/// Geometry-specific recognition logic composed into a recognizer.
///
/// Every hook defaults to [`Step::Stay`], so an algorithm only overrides the
/// categories it cares about. Hooks run after the recognizer's contact set has
/// been updated for the event, and are only called for categories listed in
/// [`GestureAlgorithm::interests`].
///
/// Returning `Err` is a contract violation. The recognizer is driven to its
/// terminal failure state and the error is reported in
/// [`DispatchReport::faults`](crate::DispatchReport::faults); other recognizers
/// on the view are unaffected.
#[allow(unused_variables, reason = "default hooks ignore their inputs")]
pub trait GestureAlgorithm<V: ViewKey>: Any {
    /// Categories this algorithm handles.
    fn interests(&self) -> EventCategories {
        EventCategories::all()
    }

    /// Primary button or touch down.
    fn primary_down(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Primary button or touch up.
    fn primary_up(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Primary button or touch dragged.
    fn primary_dragged(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Secondary button down.
    fn secondary_down(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Secondary button up.
    fn secondary_up(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Secondary button dragged.
    fn secondary_dragged(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Scroll.
    fn scroll(&mut self, cx: &AlgorithmCx<'_, V>, delta: Vec2) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Trackpad magnification.
    fn magnify(
        &mut self,
        cx: &AlgorithmCx<'_, V>,
        magnification: f64,
    ) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Trackpad rotation.
    fn rotate(&mut self, cx: &AlgorithmCx<'_, V>, degrees: f64) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Trackpad swipe.
    fn swipe(&mut self, cx: &AlgorithmCx<'_, V>, delta: Vec2) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Platform gesture sequence began.
    fn begin_gesture(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Platform gesture sequence ended.
    fn end_gesture(&mut self, cx: &AlgorithmCx<'_, V>) -> Result<Step, GestureError> {
        Ok(Step::Stay)
    }

    /// Clear per-attempt tracking. Called after every terminal state and on detach.
    ///
    /// Values exposed to observers (such as a pinch scale) should keep their last
    /// computed value.
    fn reset(&mut self) {}
}

/// Invoke the hook for `kind`.
pub(crate) fn route<V: ViewKey>(
    algorithm: &mut dyn GestureAlgorithm<V>,
    cx: &AlgorithmCx<'_, V>,
    kind: &EventKind,
) -> Result<Step, GestureError> {
    match *kind {
        EventKind::PrimaryDown => algorithm.primary_down(cx),
        EventKind::PrimaryUp => algorithm.primary_up(cx),
        EventKind::PrimaryDragged => algorithm.primary_dragged(cx),
        EventKind::SecondaryDown => algorithm.secondary_down(cx),
        EventKind::SecondaryUp => algorithm.secondary_up(cx),
        EventKind::SecondaryDragged => algorithm.secondary_dragged(cx),
        EventKind::Scroll { delta } => algorithm.scroll(cx, delta),
        EventKind::Magnify { magnification } => algorithm.magnify(cx, magnification),
        EventKind::Rotate { degrees } => algorithm.rotate(cx, degrees),
        EventKind::Swipe { delta } => algorithm.swipe(cx, delta),
        EventKind::GestureBegin => algorithm.begin_gesture(cx),
        EventKind::GestureEnd => algorithm.end_gesture(cx),
        EventKind::Interrupt => Ok(Step::Stay),
    }
}
