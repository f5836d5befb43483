// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delegate arbitration: an optional veto consulted when a recognizer is about
//! to leave [`Possible`](crate::GestureState::Possible) toward recognition.
//!
//! The recognizer holds the delegate weakly. A missing delegate, or one that has
//! been dropped, answers "yes".

use alloc::rc::{Rc, Weak};

use crate::recognizer::Snapshot;
use crate::space::ViewKey;

/// Capability consulted once per gesture attempt, at the edge leaving `Possible`.
pub trait GestureDelegate<V: ViewKey> {
    /// Whether the recognizer may begin (or, for discrete gestures, recognize).
    ///
    /// `recognizer` still reports [`Possible`](crate::GestureState::Possible) and
    /// the contacts of the event that triggered recognition. Returning `false`
    /// moves it to [`Failed`](crate::GestureState::Failed) instead.
    fn should_begin(&self, recognizer: &Snapshot<'_, V>) -> bool {
        let _ = recognizer;
        true
    }
}

impl<V: ViewKey, F: Fn(&Snapshot<'_, V>) -> bool> GestureDelegate<V> for F {
    fn should_begin(&self, recognizer: &Snapshot<'_, V>) -> bool {
        self(recognizer)
    }
}

/// Weak delegate slot of one recognizer.
pub(crate) struct DelegateSlot<V: ViewKey> {
    inner: Option<Weak<dyn GestureDelegate<V>>>,
}

impl<V: ViewKey> Default for DelegateSlot<V> {
    fn default() -> Self {
        Self { inner: None }
    }
}

impl<V: ViewKey> core::fmt::Debug for DelegateSlot<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DelegateSlot")
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl<V: ViewKey> DelegateSlot<V> {
    pub(crate) fn set(&mut self, delegate: Option<&Rc<dyn GestureDelegate<V>>>) {
        self.inner = delegate.map(Rc::downgrade);
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.inner.as_ref().is_some_and(|w| w.strong_count() > 0)
    }

    /// Ask the delegate, defaulting to `true` when it is absent or gone.
    pub(crate) fn should_begin(&self, recognizer: &Snapshot<'_, V>) -> bool {
        match self.inner.as_ref().and_then(Weak::upgrade) {
            Some(delegate) => delegate.should_begin(recognizer),
            None => true,
        }
    }
}
