// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recognizer states and the transition table.
//!
//! ## Overview
//!
//! Every recognizer starts in [`GestureState::Possible`]. Gesture algorithms never
//! write the state directly; they return a [`Step`] from their event hooks and the
//! recognizer shell maps it through [`GestureState::next`].
//!
//! ```text
//! Possible ──Begin──▶ Began ──Change──▶ Changed ─┐
//!    │                  │                  ▲     │ Change
//!    │                  │                  └─────┘
//!    │                  ├──End────▶ Ended
//!    │                  └──Cancel─▶ Cancelled      (also from Changed)
//!    ├──End───▶ Ended   (discrete recognition)
//!    └──Fail──▶ Failed
//! ```
//!
//! Terminal states ([`Ended`](GestureState::Ended), [`Cancelled`](GestureState::Cancelled),
//! [`Failed`](GestureState::Failed)) are reported once and then reset to `Possible`
//! before the next raw event. The reset is not a transition and is never reported.
//!
//! ## Example
//!
//! ```
//! use understory_gesture::{GestureState, Step};
//!
//! let s = GestureState::Possible;
//! assert_eq!(s.next(Step::Begin), Ok(Some(GestureState::Began)));
//! assert_eq!(s.next(Step::Stay), Ok(None));
//! assert!(s.next(Step::Change).is_err());
//! ```

use crate::error::GestureError;

/// Lifecycle state of a recognizer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum GestureState {
    /// Initial state: input is being evaluated but nothing has been recognized.
    #[default]
    Possible,
    /// A continuous gesture was recognized.
    Began,
    /// A continuous gesture received a qualifying update.
    Changed,
    /// The gesture completed. Terminal. Discrete gestures enter this directly
    /// from `Possible` (see [`GestureState::RECOGNIZED`]).
    Ended,
    /// The input stream was interrupted. Terminal.
    Cancelled,
    /// The input can never satisfy the gesture, or the delegate vetoed it. Terminal.
    Failed,
}

impl GestureState {
    /// Alias of [`GestureState::Ended`] used by discrete gestures.
    pub const RECOGNIZED: Self = Self::Ended;

    /// Returns `true` for `Ended`, `Cancelled`, and `Failed`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled | Self::Failed)
    }

    /// Returns `true` while a continuous gesture is in progress (`Began` or `Changed`).
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Began | Self::Changed)
    }

    /// Whether `self → to` is an edge of the state machine.
    ///
    /// Includes the implicit reset edge from every terminal state back to `Possible`.
    pub const fn can_transition_to(self, to: Self) -> bool {
        use GestureState::*;
        match (self, to) {
            (Possible, Began | Ended | Failed) => true,
            (Began | Changed, Changed | Ended | Cancelled) => true,
            (Ended | Cancelled | Failed, Possible) => true,
            _ => false,
        }
    }

    /// Map an algorithm [`Step`] to the next state.
    ///
    /// Returns `Ok(None)` when the state does not change. A step without an edge
    /// from `self` yields [`GestureError::InvalidTransition`].
    ///
    /// `Cancel` from `Possible` maps to `Failed`: a gesture that never began has
    /// nothing to cancel, so the interruption is reported as a failure.
    pub fn next(self, step: Step) -> Result<Option<Self>, GestureError> {
        use GestureState::*;
        let to = match (self, step) {
            (_, Step::Stay) => return Ok(None),
            (Possible, Step::Begin) => Began,
            (Possible, Step::End) => Ended,
            (Possible, Step::Fail | Step::Cancel) => Failed,
            (Began | Changed, Step::Change) => Changed,
            (Began | Changed, Step::End) => Ended,
            (Began | Changed, Step::Cancel) => Cancelled,
            (state, step) => return Err(GestureError::InvalidTransition { state, step }),
        };
        Ok(Some(to))
    }

    /// The terminal state a faulting recognizer is driven to, if any.
    ///
    /// `Possible` fails and `Began`/`Changed` cancel; terminal states have no outcome.
    pub const fn failure_outcome(self) -> Option<Self> {
        match self {
            Self::Possible => Some(Self::Failed),
            Self::Began | Self::Changed => Some(Self::Cancelled),
            Self::Ended | Self::Cancelled | Self::Failed => None,
        }
    }

    /// Whether moving to `to` from `self` requires consulting the delegate.
    ///
    /// Only the edges leaving `Possible` toward recognition are arbitrated.
    pub const fn needs_arbitration(self, to: Self) -> bool {
        matches!((self, to), (Self::Possible, Self::Began | Self::Ended))
    }
}

/// Requested state change returned by a gesture algorithm's event hook.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Step {
    /// No state change.
    #[default]
    Stay,
    /// Start a continuous gesture.
    Begin,
    /// Report a qualifying update of a continuous gesture.
    Change,
    /// Complete the gesture. From `Possible` this is discrete recognition.
    End,
    /// The gesture was interrupted.
    Cancel,
    /// The input can never satisfy the gesture.
    Fail,
}
