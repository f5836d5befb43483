// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recognizer arena: attachment, configuration, and event dispatch.
//!
//! ## Overview
//!
//! [`Gestures`] owns every recognizer, the shared [`ContactTracker`], and the
//! [`CoordinateSpace`] used for location queries. Recognizers are addressed by
//! generational [`RecognizerId`]s; views only store ids, so there is no
//! ownership cycle between a view and its recognizers.
//!
//! ## Dispatch
//!
//! [`Gestures::dispatch`] delivers one raw event to one view:
//!
//! 1. The tracker applies the event's contact samples.
//! 2. Every enabled recognizer attached to the view, in attachment order,
//!    updates its contact set, asks its algorithm for a [`Step`], and applies at
//!    most one transition. The edges leaving `Possible` toward recognition are
//!    arbitrated by the delegate.
//! 3. Targets of a recognizer fire synchronously, in registration order, right
//!    after its transition and before the next recognizer is evaluated.
//! 4. A terminal state resets to `Possible` once its targets have run.
//!
//! Callbacks receive `&mut Gestures`, so they can read post-transition state,
//! edit targets, or detach and disable recognizers. A `dispatch` made from a
//! callback is queued and runs after the current event.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;

use kurbo::{Point, Vec2};

use crate::contact::{Contact, ContactChanges, ContactId, ContactTracker};
use crate::delegate::{DelegateSlot, GestureDelegate};
use crate::error::GestureError;
use crate::event::{EventKind, InputEvent};
use crate::log::{log_debug, log_trace, log_warn};
use crate::recognizer::{
    AlgorithmCx, ContactDelta, GestureAlgorithm, RecognizerCore, RecognizerId, Snapshot, route,
};
use crate::space::{CoordinateSpace, SharedSpace, ViewKey};
use crate::state::{GestureState, Step};
use crate::target::{ObserverId, SharedAction, Target, TargetList};

/// Callback invoked on every reported transition of a recognizer.
pub type Action<V, C = SharedSpace> = dyn FnMut(&mut Gestures<V, C>, RecognizerId);

/// One reported state transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Transition {
    /// The recognizer that moved.
    pub recognizer: RecognizerId,
    /// State before the event.
    pub from: GestureState,
    /// State after the event.
    pub to: GestureState,
}

/// A contained recognizer fault.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Fault {
    /// The recognizer whose algorithm misbehaved.
    pub recognizer: RecognizerId,
    /// What went wrong.
    pub error: GestureError,
}

/// What a call to [`Gestures::dispatch`] did.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DispatchReport {
    /// Transitions in the order they were performed, including those of events
    /// queued by callbacks during this dispatch.
    pub transitions: Vec<Transition>,
    /// Recognizer faults that were contained during this dispatch.
    pub faults: Vec<Fault>,
    /// `true` if the event was queued behind an in-progress dispatch; the
    /// outer dispatch reports its effects.
    pub queued: bool,
}

impl DispatchReport {
    /// States `id` moved into, in order.
    pub fn states_of(&self, id: RecognizerId) -> impl Iterator<Item = GestureState> + '_ {
        self.transitions
            .iter()
            .filter(move |t| t.recognizer == id)
            .map(|t| t.to)
    }

    /// Returns `true` when nothing transitioned and nothing faulted.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty() && self.faults.is_empty()
    }
}

struct Recognizer<V: ViewKey, C: CoordinateSpace<V>> {
    generation: u32,
    core: RecognizerCore<V>,
    algorithm: Box<dyn GestureAlgorithm<V>>,
    targets: TargetList<Action<V, C>>,
    delegate: DelegateSlot<V>,
}

/// Arena of gesture recognizers attached to caller-defined views.
pub struct Gestures<V: ViewKey, C: CoordinateSpace<V> = SharedSpace> {
    slots: Vec<Option<Recognizer<V, C>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// Attachment lists, in order of first attachment of each view.
    views: Vec<(V, Vec<RecognizerId>)>,
    tracker: ContactTracker<V>,
    space: C,
    dispatching: bool,
    pending: VecDeque<(V, InputEvent)>,
}

impl<V: ViewKey, C: CoordinateSpace<V> + core::fmt::Debug> core::fmt::Debug for Gestures<V, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.slots.iter().filter(|s| s.is_some()).count();
        f.debug_struct("Gestures")
            .field("recognizers_total", &self.slots.len())
            .field("recognizers_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("views", &self.views.len())
            .field("contacts", &self.tracker.len())
            .field("space", &self.space)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl<V: ViewKey, C: CoordinateSpace<V> + Default> Default for Gestures<V, C> {
    fn default() -> Self {
        Self::with_space(C::default())
    }
}

impl<V: ViewKey, C: CoordinateSpace<V> + Default> Gestures<V, C> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V: ViewKey, C: CoordinateSpace<V>> Gestures<V, C> {
    /// Create an empty arena converting locations through `space`.
    pub fn with_space(space: C) -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            views: Vec::new(),
            tracker: ContactTracker::new(),
            space,
            dispatching: false,
            pending: VecDeque::new(),
        }
    }

    /// The coordinate space.
    pub fn space(&self) -> &C {
        &self.space
    }

    /// Mutable access to the coordinate space, e.g. after the view tree changed.
    pub fn space_mut(&mut self) -> &mut C {
        &mut self.space
    }

    /// Active contacts across all views.
    pub fn contacts(&self) -> &ContactTracker<V> {
        &self.tracker
    }

    // --- lifecycle ---

    /// Create a detached, enabled recognizer in `Possible`.
    pub fn create<A: GestureAlgorithm<V>>(&mut self, algorithm: A) -> RecognizerId {
        let algorithm: Box<dyn GestureAlgorithm<V>> = Box::new(algorithm);
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.slots.push(None);
            self.generations.push(1);
            (self.slots.len() - 1, 1)
        };
        self.slots[idx] = Some(Recognizer {
            generation,
            core: RecognizerCore::default(),
            algorithm,
            targets: TargetList::new(),
            delegate: DelegateSlot::default(),
        });
        #[allow(
            clippy::cast_possible_truncation,
            reason = "recognizer counts never approach u32::MAX"
        )]
        let id = RecognizerId::new(idx as u32, generation);
        log_debug!(recognizer = ?id, "recognizer created");
        id
    }

    /// Create a recognizer with one target already registered.
    pub fn create_with_target<A, F>(&mut self, algorithm: A, target: Target, action: F) -> RecognizerId
    where
        A: GestureAlgorithm<V>,
        F: FnMut(&mut Self, RecognizerId) + 'static,
    {
        let id = self.create(algorithm);
        if let Some(rec) = self.get_mut(id) {
            rec.targets.add(target, Rc::new(RefCell::new(action)));
        }
        id
    }

    /// Destroy a recognizer, detaching it first. Returns `false` if `id` is stale.
    pub fn remove(&mut self, id: RecognizerId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.unlink(id);
        self.slots[id.idx()] = None;
        self.free_list.push(id.idx());
        log_debug!(recognizer = ?id, "recognizer removed");
        true
    }

    /// Returns `true` if `id` refers to a live recognizer.
    pub fn is_alive(&self, id: RecognizerId) -> bool {
        self.get(id).is_some()
    }

    /// Live recognizers, in slot order.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "slot indices were created from u32"
    )]
    pub fn ids(&self) -> impl Iterator<Item = RecognizerId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|r| RecognizerId::new(i as u32, r.generation)))
    }

    // --- attachment ---

    /// Attach `id` to `view`, after the recognizers already there.
    ///
    /// A recognizer attached elsewhere is detached first, which silently resets
    /// it. Attaching to the current view does nothing.
    pub fn attach(&mut self, id: RecognizerId, view: V) -> Result<(), GestureError> {
        let current = self.get(id).ok_or(GestureError::StaleRecognizer(id))?.core.view;
        if current == Some(view) {
            return Ok(());
        }
        if current.is_some() {
            self.detach(id)?;
        }
        match self.views.iter_mut().find(|(v, _)| *v == view) {
            Some((_, ids)) => ids.push(id),
            None => self.views.push((view, alloc::vec![id])),
        }
        if let Some(rec) = self.get_mut(id) {
            rec.core.view = Some(view);
        }
        log_debug!(recognizer = ?id, ?view, "recognizer attached");
        Ok(())
    }

    /// Detach `id` from its view, silently resetting it to `Possible`.
    ///
    /// Detaching a detached recognizer is a no-op.
    pub fn detach(&mut self, id: RecognizerId) -> Result<(), GestureError> {
        if !self.is_alive(id) {
            return Err(GestureError::StaleRecognizer(id));
        }
        self.unlink(id);
        Ok(())
    }

    /// Recognizers attached to `view`, in attachment order.
    pub fn recognizers_of(&self, view: V) -> &[RecognizerId] {
        self.views
            .iter()
            .find(|(v, _)| *v == view)
            .map(|(_, ids)| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Detach every recognizer from `view` and forget the view.
    ///
    /// Returns the recognizers that were attached, in attachment order.
    pub fn remove_view(&mut self, view: V) -> Vec<RecognizerId> {
        let Some(pos) = self.views.iter().position(|(v, _)| *v == view) else {
            return Vec::new();
        };
        let (_, ids) = self.views.remove(pos);
        for &id in &ids {
            if let Some(rec) = self.get_mut(id) {
                Self::silent_reset(rec);
                rec.core.view = None;
            }
        }
        log_debug!(?view, count = ids.len(), "view removed");
        ids
    }

    // --- configuration ---

    /// Enable or disable `id`.
    ///
    /// A disabled recognizer ignores events and keeps its state and contacts.
    /// Contacts that end meanwhile are reconciled as cancelled on the first event
    /// after it is re-enabled.
    pub fn set_enabled(&mut self, id: RecognizerId, enabled: bool) -> Result<(), GestureError> {
        let rec = self.get_mut(id).ok_or(GestureError::StaleRecognizer(id))?;
        rec.core.enabled = enabled;
        log_debug!(recognizer = ?id, enabled, "recognizer enabled flag set");
        Ok(())
    }

    /// Whether `id` receives events. `false` for stale ids.
    pub fn is_enabled(&self, id: RecognizerId) -> bool {
        self.get(id).is_some_and(|r| r.core.enabled)
    }

    /// Register a target. Returns `Ok(false)` if the pair was already registered.
    pub fn add_target<F>(
        &mut self,
        id: RecognizerId,
        target: Target,
        action: F,
    ) -> Result<bool, GestureError>
    where
        F: FnMut(&mut Self, RecognizerId) + 'static,
    {
        self.add_shared_target(id, target, Rc::new(RefCell::new(action)))
    }

    /// Register a target whose callback is shared with other recognizers.
    pub fn add_shared_target(
        &mut self,
        id: RecognizerId,
        target: Target,
        action: SharedAction<Action<V, C>>,
    ) -> Result<bool, GestureError> {
        let rec = self.get_mut(id).ok_or(GestureError::StaleRecognizer(id))?;
        Ok(rec.targets.add(target, action))
    }

    /// Remove the pair `(observer, action)`, or every pair of `observer` when
    /// `action` is `None`. Returns the number removed.
    ///
    /// Safe to call from inside a callback; the transition in progress still
    /// invokes the targets that were registered when it happened.
    pub fn remove_target(
        &mut self,
        id: RecognizerId,
        observer: ObserverId,
        action: Option<&str>,
    ) -> Result<usize, GestureError> {
        let rec = self.get_mut(id).ok_or(GestureError::StaleRecognizer(id))?;
        Ok(rec.targets.remove(observer, action))
    }

    /// Registered targets of `id`, in invocation order. Empty for stale ids.
    pub fn targets(&self, id: RecognizerId) -> Vec<Target> {
        self.get(id)
            .map(|r| r.targets.targets().collect())
            .unwrap_or_default()
    }

    /// Install or clear the delegate. Only a weak reference is kept.
    pub fn set_delegate(
        &mut self,
        id: RecognizerId,
        delegate: Option<&Rc<dyn GestureDelegate<V>>>,
    ) -> Result<(), GestureError> {
        let rec = self.get_mut(id).ok_or(GestureError::StaleRecognizer(id))?;
        rec.delegate.set(delegate);
        Ok(())
    }

    /// Whether `id` has a delegate that is still alive.
    pub fn has_delegate(&self, id: RecognizerId) -> bool {
        self.get(id).is_some_and(|r| r.delegate.is_alive())
    }

    /// Borrow the algorithm of `id` as its concrete type.
    pub fn algorithm<A: GestureAlgorithm<V>>(&self, id: RecognizerId) -> Option<&A> {
        let any: &dyn Any = &*self.get(id)?.algorithm;
        any.downcast_ref()
    }

    /// Mutably borrow the algorithm of `id` as its concrete type.
    pub fn algorithm_mut<A: GestureAlgorithm<V>>(&mut self, id: RecognizerId) -> Option<&mut A> {
        let any: &mut dyn Any = &mut *self.get_mut(id)?.algorithm;
        any.downcast_mut()
    }

    // --- queries ---

    /// Read-only view of `id`, or `None` if stale.
    pub fn snapshot(&self, id: RecognizerId) -> Option<Snapshot<'_, V>> {
        let rec = self.get(id)?;
        Some(Snapshot::new(id, &rec.core, &self.tracker, &self.space))
    }

    /// Current state, or `None` if stale.
    pub fn state(&self, id: RecognizerId) -> Option<GestureState> {
        self.get(id).map(|r| r.core.state)
    }

    /// The view `id` is attached to.
    pub fn view(&self, id: RecognizerId) -> Option<V> {
        self.get(id)?.core.view
    }

    /// Active contacts of `id` in order of first contact. Empty for stale ids.
    pub fn touches(&self, id: RecognizerId) -> &[ContactId] {
        self.get(id).map(|r| r.core.contacts.as_slice()).unwrap_or(&[])
    }

    /// Number of active contacts of `id`; `0` when stale or idle.
    pub fn number_of_touches(&self, id: RecognizerId) -> usize {
        self.touches(id).len()
    }

    /// See [`Snapshot::location_in_view`].
    pub fn location_in_view(&self, id: RecognizerId, view: Option<V>) -> Option<Point> {
        self.snapshot(id)?.location_in_view(view)
    }

    /// See [`Snapshot::try_location_of_touch`].
    pub fn try_location_of_touch(
        &self,
        id: RecognizerId,
        index: usize,
        view: Option<V>,
    ) -> Result<Point, GestureError> {
        self.snapshot(id)
            .ok_or(GestureError::StaleRecognizer(id))?
            .try_location_of_touch(index, view)
    }

    /// Location of touch `index` of `id` in `view`'s space.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale or `index` is out of range.
    #[track_caller]
    pub fn location_of_touch(&self, id: RecognizerId, index: usize, view: Option<V>) -> Point {
        match self.try_location_of_touch(id, index, view) {
            Ok(p) => p,
            Err(e) => panic!("{e}"),
        }
    }

    // --- dispatch ---

    /// Deliver `event` to `view`.
    ///
    /// Called from inside a target callback, the event is queued and processed
    /// after the current one; the returned report is then empty with
    /// [`queued`](DispatchReport::queued) set.
    pub fn dispatch(&mut self, view: V, event: &InputEvent) -> DispatchReport {
        if self.dispatching {
            log_trace!(?view, kind = ?event.kind, "dispatch re-entered, event queued");
            self.pending.push_back((view, event.clone()));
            return DispatchReport {
                queued: true,
                ..DispatchReport::default()
            };
        }
        self.dispatching = true;
        let mut report = DispatchReport::default();
        self.deliver(view, event, &mut report);
        while let Some((view, event)) = self.pending.pop_front() {
            self.deliver(view, &event, &mut report);
        }
        self.dispatching = false;
        report
    }

    /// Cancel every contact delivered to `view` without waiting for "up" events.
    pub fn interrupt(&mut self, view: V, timestamp: u64) -> DispatchReport {
        self.dispatch(view, &InputEvent::interrupt(timestamp))
    }

    fn deliver(&mut self, view: V, event: &InputEvent, report: &mut DispatchReport) {
        log_trace!(?view, kind = ?event.kind, samples = event.contacts.len(), ts = event.timestamp, "event");
        let changes = if matches!(event.kind, EventKind::Interrupt) {
            self.tracker.interrupt(view, event.timestamp)
        } else {
            self.tracker
                .apply(view, &event.contacts, event.timestamp, &self.space)
        };
        let ids = self.recognizers_of(view).to_vec();
        for id in ids {
            self.deliver_to(id, view, event, &changes, report);
        }
    }

    fn deliver_to(
        &mut self,
        id: RecognizerId,
        view: V,
        event: &InputEvent,
        changes: &ContactChanges<V>,
        report: &mut DispatchReport,
    ) {
        let Some(rec) = self
            .slots
            .get_mut(id.idx())
            .and_then(Option::as_mut)
            .filter(|r| r.generation == id.generation())
        else {
            return;
        };
        // Detached or disabled by an earlier callback of this event.
        if rec.core.view != Some(view) || !rec.core.enabled {
            return;
        }

        let delta = absorb(&mut rec.core, changes, &self.tracker);
        let interrupted = matches!(event.kind, EventKind::Interrupt);
        if !interrupted && !event.contacts.is_empty() && delta.is_empty() {
            return;
        }
        update_last_location(&mut rec.core, &delta, changes, &self.tracker, &self.space);

        let from = rec.core.state;
        let step = if interrupted {
            Ok(if from.is_active() || !delta.cancelled.is_empty() {
                Step::Cancel
            } else {
                Step::Stay
            })
        } else if !delta.cancelled.is_empty() && (from.is_active() || rec.core.contacts.is_empty()) {
            // Cancelled input interrupts an active gesture outright.
            Ok(Step::Cancel)
        } else if rec.algorithm.interests().contains(event.kind.category()) {
            let cx = AlgorithmCx::new(
                Snapshot::new(id, &rec.core, &self.tracker, &self.space),
                event.timestamp,
                &delta,
            );
            route(&mut *rec.algorithm, &cx, &event.kind)
        } else {
            Ok(Step::Stay)
        };

        let to = match step.and_then(|s| from.next(s)) {
            Ok(to) => to,
            Err(error) => {
                log_warn!(recognizer = ?id, %error, "recognizer fault contained");
                report.faults.push(Fault {
                    recognizer: id,
                    error,
                });
                from.failure_outcome()
            }
        };
        let Some(mut to) = to else {
            return;
        };
        if from.needs_arbitration(to)
            && !rec
                .delegate
                .should_begin(&Snapshot::new(id, &rec.core, &self.tracker, &self.space))
        {
            log_debug!(recognizer = ?id, "delegate vetoed recognition");
            to = GestureState::Failed;
        }

        rec.core.state = to;
        report.transitions.push(Transition {
            recognizer: id,
            from,
            to,
        });
        log_debug!(recognizer = ?id, ?from, ?to, "transition");
        let targets = rec.targets.snapshot();

        for (_, action) in targets {
            match action.try_borrow_mut() {
                Ok(mut action) => (&mut *action)(self, id),
                Err(_) => log_warn!(recognizer = ?id, "action already running, skipped"),
            }
        }

        if to.is_terminal() {
            if let Some(rec) = self.get_mut(id) {
                // A callback may have detached (and reset) the recognizer already.
                if rec.core.state == to {
                    rec.core.reset();
                    rec.algorithm.reset();
                }
            }
        }
    }

    // --- internals ---

    fn get(&self, id: RecognizerId) -> Option<&Recognizer<V, C>> {
        self.slots
            .get(id.idx())?
            .as_ref()
            .filter(|r| r.generation == id.generation())
    }

    fn get_mut(&mut self, id: RecognizerId) -> Option<&mut Recognizer<V, C>> {
        self.slots
            .get_mut(id.idx())?
            .as_mut()
            .filter(|r| r.generation == id.generation())
    }

    /// Remove `id` from its view's list and silently reset it.
    fn unlink(&mut self, id: RecognizerId) {
        let Some(view) = self.get(id).and_then(|r| r.core.view) else {
            return;
        };
        if let Some(pos) = self.views.iter().position(|(v, _)| *v == view) {
            let ids = &mut self.views[pos].1;
            ids.retain(|r| *r != id);
            if ids.is_empty() {
                self.views.remove(pos);
            }
        }
        if let Some(rec) = self.get_mut(id) {
            Self::silent_reset(rec);
            rec.core.view = None;
        }
        log_debug!(recognizer = ?id, ?view, "recognizer detached");
    }

    fn silent_reset(rec: &mut Recognizer<V, C>) {
        rec.core.reset();
        rec.algorithm.reset();
    }
}

/// Fold one event's contact changes into a recognizer's contact set.
fn absorb<V: ViewKey>(
    core: &mut RecognizerCore<V>,
    changes: &ContactChanges<V>,
    tracker: &ContactTracker<V>,
) -> ContactDelta {
    let mut delta = ContactDelta::default();
    // Finals first: a contact that re-began is both cancelled and added.
    for (finals, out) in [
        (&changes.ended, &mut delta.ended),
        (&changes.cancelled, &mut delta.cancelled),
    ] {
        for c in finals {
            if let Some(i) = core.contacts.iter().position(|id| *id == c.id()) {
                core.contacts.remove(i);
                out.push(c.id());
            }
        }
    }
    for &c in &changes.began {
        if !core.contacts.contains(&c) {
            core.contacts.push(c);
        }
        delta.added.push(c);
    }
    for &c in &changes.moved {
        if core.contacts.contains(&c) {
            delta.moved.push(c);
        }
    }
    // Contacts that vanished without this recognizer seeing them go.
    core.contacts.retain(|c| {
        let live = tracker.contains(*c);
        if !live {
            delta.cancelled.push(*c);
        }
        live
    });
    delta
}

/// Record the recognizer's current location (root space) for later queries.
fn update_last_location<V: ViewKey>(
    core: &mut RecognizerCore<V>,
    delta: &ContactDelta,
    changes: &ContactChanges<V>,
    tracker: &ContactTracker<V>,
    space: &dyn CoordinateSpace<V>,
) {
    let root = |c: &Contact<V>| space.to_root(c.view(), c.position()).to_vec2();
    let mut sum = Vec2::ZERO;
    let mut n = 0_usize;
    if core.contacts.is_empty() {
        // Everything lifted: remember where it lifted.
        for c in changes.ended.iter().chain(&changes.cancelled) {
            if delta.ended.contains(&c.id()) || delta.cancelled.contains(&c.id()) {
                sum += root(c);
                n += 1;
            }
        }
    } else {
        for c in core.contacts.iter().filter_map(|id| tracker.get(*id)) {
            sum += root(c);
            n += 1;
        }
    }
    if n > 0 {
        core.last_location = Some((sum / n as f64).to_point());
    }
}
