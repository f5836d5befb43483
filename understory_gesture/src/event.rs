// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input events delivered to a view.
//!
//! An [`InputEvent`] carries one [`EventKind`] (which selects the algorithm hook),
//! zero or more [`ContactSample`]s in view-local coordinates, and a monotonic
//! timestamp in milliseconds.
//!
//! Multi-touch input rides on the primary-button categories: a touch going down
//! is a `PrimaryDown` with a `Began` sample, and one event may carry samples for
//! several contacts.
//!
//! ```
//! use kurbo::Point;
//! use understory_gesture::{ContactId, EventCategories, EventKind, InputEvent};
//!
//! let ev = InputEvent::touches_down(
//!     16,
//!     &[(ContactId(1), Point::new(0.0, 0.0)), (ContactId(2), Point::new(50.0, 0.0))],
//! );
//! assert_eq!(ev.kind, EventKind::PrimaryDown);
//! assert_eq!(ev.contacts.len(), 2);
//! assert_eq!(ev.kind.category(), EventCategories::PRIMARY);
//! ```

use alloc::vec::Vec;

use kurbo::{Point, Vec2};

use crate::contact::{ContactId, ContactPhase, ContactSample};

bitflags::bitflags! {
    /// Families of raw events; gesture algorithms declare the ones they handle.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EventCategories: u16 {
        /// Primary button or touch down/up/dragged.
        const PRIMARY   = 0b0000_0001;
        /// Secondary button down/up/dragged.
        const SECONDARY = 0b0000_0010;
        /// Scroll wheel or two-finger scroll.
        const SCROLL    = 0b0000_0100;
        /// Trackpad magnification.
        const MAGNIFY   = 0b0000_1000;
        /// Trackpad rotation.
        const ROTATE    = 0b0001_0000;
        /// Trackpad swipe.
        const SWIPE     = 0b0010_0000;
        /// Platform gesture begin/end brackets.
        const GESTURE   = 0b0100_0000;
        /// Event stream interruption.
        const INTERRUPT = 0b1000_0000;
    }
}

/// The category of a raw event, with its category-specific payload.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EventKind {
    /// Primary button or touch went down.
    PrimaryDown,
    /// Primary button or touch went up.
    PrimaryUp,
    /// Primary button or touch moved while down.
    PrimaryDragged,
    /// Secondary button went down.
    SecondaryDown,
    /// Secondary button went up.
    SecondaryUp,
    /// Secondary button moved while down.
    SecondaryDragged,
    /// Scroll by `delta`.
    Scroll {
        /// Scroll distance.
        delta: Vec2,
    },
    /// Magnify by `magnification` (added to the current scale).
    Magnify {
        /// Scale delta.
        magnification: f64,
    },
    /// Rotate by `degrees`.
    Rotate {
        /// Rotation delta in degrees.
        degrees: f64,
    },
    /// Swipe in the direction of `delta`.
    Swipe {
        /// Swipe direction, with components in `-1.0..=1.0`.
        delta: Vec2,
    },
    /// A platform gesture sequence started.
    GestureBegin,
    /// A platform gesture sequence finished.
    GestureEnd,
    /// The event stream was interrupted (focus loss, system gesture). Cancels
    /// every contact delivered to the view; not routed to algorithm hooks.
    Interrupt,
}

impl EventKind {
    /// The category this kind belongs to.
    pub fn category(&self) -> EventCategories {
        match self {
            Self::PrimaryDown | Self::PrimaryUp | Self::PrimaryDragged => EventCategories::PRIMARY,
            Self::SecondaryDown | Self::SecondaryUp | Self::SecondaryDragged => {
                EventCategories::SECONDARY
            }
            Self::Scroll { .. } => EventCategories::SCROLL,
            Self::Magnify { .. } => EventCategories::MAGNIFY,
            Self::Rotate { .. } => EventCategories::ROTATE,
            Self::Swipe { .. } => EventCategories::SWIPE,
            Self::GestureBegin | Self::GestureEnd => EventCategories::GESTURE,
            Self::Interrupt => EventCategories::INTERRUPT,
        }
    }
}

/// A raw input event delivered to one view.
#[derive(Clone, Debug, PartialEq)]
pub struct InputEvent {
    /// Category and payload.
    pub kind: EventKind,
    /// Contact samples, in view-local coordinates of the receiving view.
    pub contacts: Vec<ContactSample>,
    /// Monotonic timestamp in milliseconds.
    pub timestamp: u64,
}

impl InputEvent {
    /// An event with no contact samples.
    pub fn new(kind: EventKind, timestamp: u64) -> Self {
        Self {
            kind,
            contacts: Vec::new(),
            timestamp,
        }
    }

    /// Append a contact sample.
    pub fn with_contact(mut self, sample: ContactSample) -> Self {
        self.contacts.push(sample);
        self
    }

    fn with_phase(
        kind: EventKind,
        timestamp: u64,
        phase: ContactPhase,
        contacts: &[(ContactId, Point)],
    ) -> Self {
        Self {
            kind,
            contacts: contacts
                .iter()
                .map(|&(id, position)| ContactSample::new(id, phase, position))
                .collect(),
            timestamp,
        }
    }

    /// Primary button (or single touch) down.
    pub fn primary_down(timestamp: u64, id: ContactId, position: Point) -> Self {
        Self::touches_down(timestamp, &[(id, position)])
    }

    /// Primary button (or single touch) dragged.
    pub fn primary_dragged(timestamp: u64, id: ContactId, position: Point) -> Self {
        Self::touches_moved(timestamp, &[(id, position)])
    }

    /// Primary button (or single touch) up.
    pub fn primary_up(timestamp: u64, id: ContactId, position: Point) -> Self {
        Self::touches_up(timestamp, &[(id, position)])
    }

    /// Secondary button down.
    pub fn secondary_down(timestamp: u64, id: ContactId, position: Point) -> Self {
        Self::with_phase(
            EventKind::SecondaryDown,
            timestamp,
            ContactPhase::Began,
            &[(id, position)],
        )
    }

    /// Secondary button dragged.
    pub fn secondary_dragged(timestamp: u64, id: ContactId, position: Point) -> Self {
        Self::with_phase(
            EventKind::SecondaryDragged,
            timestamp,
            ContactPhase::Moved,
            &[(id, position)],
        )
    }

    /// Secondary button up.
    pub fn secondary_up(timestamp: u64, id: ContactId, position: Point) -> Self {
        Self::with_phase(
            EventKind::SecondaryUp,
            timestamp,
            ContactPhase::Ended,
            &[(id, position)],
        )
    }

    /// Several touches going down at once.
    pub fn touches_down(timestamp: u64, contacts: &[(ContactId, Point)]) -> Self {
        Self::with_phase(EventKind::PrimaryDown, timestamp, ContactPhase::Began, contacts)
    }

    /// Several touches moving at once.
    pub fn touches_moved(timestamp: u64, contacts: &[(ContactId, Point)]) -> Self {
        Self::with_phase(
            EventKind::PrimaryDragged,
            timestamp,
            ContactPhase::Moved,
            contacts,
        )
    }

    /// Several touches lifting at once.
    pub fn touches_up(timestamp: u64, contacts: &[(ContactId, Point)]) -> Self {
        Self::with_phase(EventKind::PrimaryUp, timestamp, ContactPhase::Ended, contacts)
    }

    /// Touches cancelled by the platform.
    pub fn touches_cancelled(timestamp: u64, contacts: &[(ContactId, Point)]) -> Self {
        Self::with_phase(
            EventKind::PrimaryUp,
            timestamp,
            ContactPhase::Cancelled,
            contacts,
        )
    }

    /// Scroll by `delta`.
    pub fn scroll(timestamp: u64, delta: Vec2) -> Self {
        Self::new(EventKind::Scroll { delta }, timestamp)
    }

    /// Magnify by `magnification`.
    pub fn magnify(timestamp: u64, magnification: f64) -> Self {
        Self::new(EventKind::Magnify { magnification }, timestamp)
    }

    /// Rotate by `degrees`.
    pub fn rotate(timestamp: u64, degrees: f64) -> Self {
        Self::new(EventKind::Rotate { degrees }, timestamp)
    }

    /// Swipe toward `delta`.
    pub fn swipe(timestamp: u64, delta: Vec2) -> Self {
        Self::new(EventKind::Swipe { delta }, timestamp)
    }

    /// Platform gesture sequence begins.
    pub fn gesture_begin(timestamp: u64) -> Self {
        Self::new(EventKind::GestureBegin, timestamp)
    }

    /// Platform gesture sequence ends.
    pub fn gesture_end(timestamp: u64) -> Self {
        Self::new(EventKind::GestureEnd, timestamp)
    }

    /// The event stream to the view was interrupted.
    pub fn interrupt(timestamp: u64) -> Self {
        Self::new(EventKind::Interrupt, timestamp)
    }
}
