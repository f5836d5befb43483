// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by recognizer queries and gesture algorithms.
//!
//! Recognition failure is not an error: it is the [`Failed`](crate::GestureState::Failed)
//! state, delivered through target-action like any other transition. The values
//! here cover contract violations. Inside dispatch they are contained per
//! recognizer and surface in [`DispatchReport::faults`](crate::DispatchReport::faults).

use crate::contact::ContactId;
use crate::recognizer::RecognizerId;
use crate::state::{GestureState, Step};

/// A contract violation detected by the gesture core.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum GestureError {
    /// A touch index was not within `0..count`.
    #[error("touch index {index} is out of range for {count} active contacts")]
    TouchIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of active contacts at the time of the query.
        count: usize,
    },
    /// The tracker has no record of the contact.
    #[error("contact {0:?} is not tracked")]
    UnknownContact(ContactId),
    /// An algorithm requested a step that has no edge from the current state.
    #[error("step {step:?} is not valid from state {state:?}")]
    InvalidTransition {
        /// State the recognizer was in.
        state: GestureState,
        /// The rejected step.
        step: Step,
    },
    /// The recognizer handle refers to a freed or reused slot.
    #[error("recognizer {0:?} is no longer alive")]
    StaleRecognizer(RecognizerId),
}
