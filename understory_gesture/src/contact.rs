// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contact tracking: the set of active pointers and touches.
//!
//! ## Overview
//!
//! A [`Contact`] is created by a [`ContactPhase::Began`] sample, moved by
//! [`ContactPhase::Moved`] samples, and destroyed by an [`Ended`](ContactPhase::Ended)
//! or [`Cancelled`](ContactPhase::Cancelled) sample or a view interrupt.
//!
//! The [`ContactTracker`] is the only owner of contact records. Recognizers refer
//! to contacts by [`ContactId`] and re-query positions on every use, so they never
//! hold coordinates from an earlier event.
//!
//! Contacts are kept in order of first contact, which is the ordering used for
//! touch indices.

use alloc::vec::Vec;

use kurbo::Point;

use crate::log::log_trace;
use crate::space::{CoordinateSpace, ViewKey};

/// Opaque identity of a contact, stable for the contact's lifetime.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ContactId(pub u64);

/// Lifecycle phase carried by a [`ContactSample`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ContactPhase {
    /// The contact went down.
    Began,
    /// The contact moved.
    Moved,
    /// The contact is down but did not move; ignored by the tracker.
    Stationary,
    /// The contact lifted.
    Ended,
    /// The platform cancelled the contact.
    Cancelled,
}

/// One contact's state as reported by a raw input event.
///
/// `position` is local to the view the event is delivered to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactSample {
    /// Contact identity.
    pub id: ContactId,
    /// Phase of the contact in this event.
    pub phase: ContactPhase,
    /// View-local position.
    pub position: Point,
}

impl ContactSample {
    /// A sample with an explicit phase.
    pub const fn new(id: ContactId, phase: ContactPhase, position: Point) -> Self {
        Self {
            id,
            phase,
            position,
        }
    }

    /// A contact going down.
    pub const fn began(id: ContactId, position: Point) -> Self {
        Self::new(id, ContactPhase::Began, position)
    }

    /// A contact moving.
    pub const fn moved(id: ContactId, position: Point) -> Self {
        Self::new(id, ContactPhase::Moved, position)
    }

    /// A contact lifting.
    pub const fn ended(id: ContactId, position: Point) -> Self {
        Self::new(id, ContactPhase::Ended, position)
    }

    /// A contact cancelled by the platform.
    pub const fn cancelled(id: ContactId, position: Point) -> Self {
        Self::new(id, ContactPhase::Cancelled, position)
    }
}

/// A tracked contact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact<V> {
    id: ContactId,
    view: V,
    position: Point,
    began_at: u64,
    updated_at: u64,
}

impl<V: Copy> Contact<V> {
    /// Contact identity.
    pub fn id(&self) -> ContactId {
        self.id
    }

    /// View the contact was delivered to when it went down.
    pub fn view(&self) -> V {
        self.view
    }

    /// Current position, local to [`Contact::view`].
    pub fn position(&self) -> Point {
        self.position
    }

    /// Timestamp of the event that created the contact.
    pub fn began_at(&self) -> u64 {
        self.began_at
    }

    /// Timestamp of the last event that touched the contact.
    pub fn updated_at(&self) -> u64 {
        self.updated_at
    }
}

/// Contacts affected by one raw event, in sample order.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ContactChanges<V> {
    pub(crate) began: Vec<ContactId>,
    pub(crate) moved: Vec<ContactId>,
    /// Final records of contacts that lifted.
    pub(crate) ended: Vec<Contact<V>>,
    /// Final records of contacts the platform cancelled.
    pub(crate) cancelled: Vec<Contact<V>>,
}

impl<V> Default for ContactChanges<V> {
    fn default() -> Self {
        Self {
            began: Vec::new(),
            moved: Vec::new(),
            ended: Vec::new(),
            cancelled: Vec::new(),
        }
    }
}

/// Owner of all active contacts.
#[derive(Clone, Debug)]
pub struct ContactTracker<V> {
    contacts: Vec<Contact<V>>,
}

impl<V> Default for ContactTracker<V> {
    fn default() -> Self {
        Self {
            contacts: Vec::new(),
        }
    }
}

impl<V: ViewKey> ContactTracker<V> {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active contacts across all views.
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Returns `true` when no contact is active.
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Look up an active contact.
    pub fn get(&self, id: ContactId) -> Option<&Contact<V>> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Returns `true` if the contact is active.
    pub fn contains(&self, id: ContactId) -> bool {
        self.get(id).is_some()
    }

    /// Active contacts in order of first contact.
    pub fn iter(&self) -> impl Iterator<Item = &Contact<V>> {
        self.contacts.iter()
    }

    /// Apply the samples of one event delivered to `view`.
    ///
    /// Moves delivered to a view other than the contact's own are converted
    /// into the contact's view. Samples for unknown contacts are ignored, except
    /// `Began`, which always (re)creates the record; a record it replaces is
    /// reported as cancelled.
    pub(crate) fn apply(
        &mut self,
        view: V,
        samples: &[ContactSample],
        timestamp: u64,
        space: &dyn CoordinateSpace<V>,
    ) -> ContactChanges<V> {
        let mut changes = ContactChanges::default();
        for sample in samples {
            let idx = self.contacts.iter().position(|c| c.id == sample.id);
            match (sample.phase, idx) {
                (ContactPhase::Began, Some(i)) => {
                    // Re-began without an end in between: the old lifecycle is cancelled.
                    let mut c = self.contacts.remove(i);
                    c.updated_at = timestamp;
                    log_trace!(contact = ?sample.id, "contact re-began, previous cancelled");
                    changes.cancelled.push(c);
                    self.insert(view, sample, timestamp, &mut changes);
                }
                (ContactPhase::Began, None) => self.insert(view, sample, timestamp, &mut changes),
                (ContactPhase::Moved, Some(i)) => {
                    let c = &mut self.contacts[i];
                    c.position = space.convert(sample.position, Some(view), Some(c.view));
                    c.updated_at = timestamp;
                    log_trace!(contact = ?sample.id, position = ?c.position, "contact moved");
                    changes.moved.push(sample.id);
                }
                (ContactPhase::Ended | ContactPhase::Cancelled, Some(i)) => {
                    let mut c = self.contacts.remove(i);
                    c.position = space.convert(sample.position, Some(view), Some(c.view));
                    c.updated_at = timestamp;
                    if sample.phase == ContactPhase::Ended {
                        log_trace!(contact = ?sample.id, "contact ended");
                        changes.ended.push(c);
                    } else {
                        log_trace!(contact = ?sample.id, "contact cancelled");
                        changes.cancelled.push(c);
                    }
                }
                (ContactPhase::Stationary, _) => {}
                (_, None) => {
                    log_trace!(contact = ?sample.id, phase = ?sample.phase, "sample for unknown contact");
                }
            }
        }
        changes
    }

    /// Remove every contact delivered to `view`, reporting them as cancelled.
    pub(crate) fn interrupt(&mut self, view: V, timestamp: u64) -> ContactChanges<V> {
        let mut changes = ContactChanges::default();
        self.contacts.retain(|c| {
            if c.view == view {
                let mut c = *c;
                c.updated_at = timestamp;
                changes.cancelled.push(c);
                false
            } else {
                true
            }
        });
        log_trace!(?view, count = changes.cancelled.len(), "contacts interrupted");
        changes
    }

    fn insert(
        &mut self,
        view: V,
        sample: &ContactSample,
        timestamp: u64,
        changes: &mut ContactChanges<V>,
    ) {
        log_trace!(contact = ?sample.id, ?view, position = ?sample.position, "contact began");
        self.contacts.push(Contact {
            id: sample.id,
            view,
            position: sample.position,
            began_at: timestamp,
            updated_at: timestamp,
        });
        changes.began.push(sample.id);
    }
}
