// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Target-action registry: an ordered multicast of callbacks fired on every
//! reported state transition.
//!
//! ## Semantics
//!
//! - A [`Target`] is an `(observer, action)` pair; registering the same pair twice
//!   is rejected so a transition never invokes it twice.
//! - Removal with an action name removes that exact pair; removal without one
//!   removes every pair registered by the observer.
//! - Invocation order is registration order. The dispatcher invokes a
//!   [snapshot](TargetList::snapshot) taken when the transition happens, so
//!   callbacks that add or remove targets do not cause later targets to be
//!   skipped or invoked twice for that transition.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_gesture::{ObserverId, SharedAction, Target, TargetList};
//!
//! type Log = Vec<&'static str>;
//! type Callback = dyn FnMut(&mut Log);
//!
//! fn push(tag: &'static str) -> SharedAction<Callback> {
//!     Rc::new(RefCell::new(move |log: &mut Log| log.push(tag)))
//! }
//!
//! let mut list: TargetList<Callback> = TargetList::new();
//! let me = ObserverId(1);
//! assert!(list.add(Target::new(me, "a"), push("a")));
//! assert!(list.add(Target::new(me, "b"), push("b")));
//! assert!(!list.add(Target::new(me, "a"), push("again")));
//!
//! let mut log = Log::new();
//! for (_, action) in list.snapshot() {
//!     (&mut *action.borrow_mut())(&mut log);
//! }
//! assert_eq!(log, ["a", "b"]);
//!
//! assert_eq!(list.remove(me, None), 2);
//! assert!(list.is_empty());
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

/// Opaque identity of an observer registering targets.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ObserverId(pub u64);

/// An `(observer, action)` pair.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Target {
    /// Who registered the callback.
    pub observer: ObserverId,
    /// Name of the action, unique per observer.
    pub action: &'static str,
}

impl Target {
    /// Create a target.
    pub const fn new(observer: ObserverId, action: &'static str) -> Self {
        Self { observer, action }
    }
}

/// Shared handle to a registered callback.
pub type SharedAction<F> = Rc<RefCell<F>>;

/// Ordered, duplicate-free list of targets and their callbacks.
pub struct TargetList<F: ?Sized> {
    entries: Vec<(Target, SharedAction<F>)>,
}

impl<F: ?Sized> Default for TargetList<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: ?Sized> core::fmt::Debug for TargetList<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(t, _)| t))
            .finish()
    }
}

impl<F: ?Sized> TargetList<F> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered targets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the exact pair is registered.
    pub fn contains(&self, target: Target) -> bool {
        self.entries.iter().any(|(t, _)| *t == target)
    }

    /// Registered targets in invocation order.
    pub fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    /// Append a target. Returns `false` (and drops `action`) if the pair exists.
    pub fn add(&mut self, target: Target, action: SharedAction<F>) -> bool {
        if self.contains(target) {
            return false;
        }
        self.entries.push((target, action));
        true
    }

    /// Remove the exact pair, or every pair of `observer` when `action` is `None`.
    ///
    /// Returns the number of targets removed.
    pub fn remove(&mut self, observer: ObserverId, action: Option<&str>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(t, _)| {
            t.observer != observer || action.is_some_and(|a| a != t.action)
        });
        before - self.entries.len()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Clone the current entries for invocation.
    pub fn snapshot(&self) -> Vec<(Target, SharedAction<F>)> {
        self.entries
            .iter()
            .map(|(t, a)| (*t, Rc::clone(a)))
            .collect()
    }
}
