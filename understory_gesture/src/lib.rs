// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_gesture --heading-base-level=0

//! Understory Gesture: deterministic, `no_std` gesture recognizers for UI.
//!
//! ## Overview
//!
//! This crate turns raw pointer, touch, and trackpad events delivered to a view into
//! high-level gestures such as pinch and pan, and notifies observers of every state
//! transition. It does not hit test and does not own a view tree. Views are keys
//! supplied by the caller, and coordinate conversion between views is delegated to a
//! [`CoordinateSpace`].
//!
//! ## Model
//!
//! - [`Gestures`] is an arena of recognizers. Each recognizer is attached to at most
//!   one view; a view runs its recognizers in attachment order.
//! - A recognizer pairs the shared state machine ([`GestureState`]) with a
//!   [`GestureAlgorithm`] that decides, per event, which [`Step`] to take.
//! - The [`ContactTracker`] owns every active contact. Recognizers refer to contacts
//!   by [`ContactId`] and re-read positions on every query.
//! - Targets ([`Target`]) are `(observer, action)` pairs whose callbacks run
//!   synchronously on each transition. A [`GestureDelegate`] can veto recognition.
//!
//! ## State machine
//!
//! `Possible → Began → Changed* → Ended | Cancelled` for continuous gestures,
//! `Possible → Ended` for discrete ones, and `Possible → Failed` when the input can
//! never match. Terminal states are reported once and then reset to `Possible`.
//!
//! ## Errors
//!
//! Failing to recognize is not an error; it is the `Failed` state. [`GestureError`]
//! covers contract violations: out-of-range touch indices, stale recognizer handles,
//! and algorithms requesting impossible transitions. The latter are contained per
//! recognizer during dispatch and listed in [`DispatchReport::faults`].
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::Point;
//! use understory_gesture::{
//!     ContactId, GestureState, Gestures, InputEvent, ObserverId, PinchRecognizer, Target,
//! };
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let sink = log.clone();
//!
//! let mut gestures: Gestures<u32> = Gestures::new();
//! let pinch = gestures.create_with_target(
//!     PinchRecognizer::new(),
//!     Target::new(ObserverId(1), "zoom"),
//!     move |g, id| {
//!         let scale = g.algorithm::<PinchRecognizer>(id).map(|p| p.scale());
//!         sink.borrow_mut().push((g.state(id), scale));
//!     },
//! );
//! gestures.attach(pinch, 7).unwrap();
//!
//! let (a, b) = (ContactId(1), ContactId(2));
//! let at = |x: f64| Point::new(x, 0.0);
//! gestures.dispatch(7, &InputEvent::touches_down(0, &[(a, at(0.0)), (b, at(50.0))]));
//! gestures.dispatch(7, &InputEvent::touches_moved(16, &[(b, at(80.0))]));
//! gestures.dispatch(7, &InputEvent::touches_moved(32, &[(b, at(100.0))]));
//! gestures.dispatch(7, &InputEvent::touches_up(48, &[(a, at(0.0)), (b, at(100.0))]));
//!
//! assert_eq!(
//!     *log.borrow(),
//!     [
//!         (Some(GestureState::Began), Some(1.0)),
//!         (Some(GestureState::Changed), Some(1.25)),
//!         (Some(GestureState::Ended), Some(1.25)),
//!     ]
//! );
//! assert_eq!(gestures.number_of_touches(pinch), 0);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std`.
//! - `libm`: forwards to `kurbo/libm` for `no_std` builds.
//! - `tracing`: emits `tracing` events for raw events and contacts (`trace`),
//!   transitions and attachment (`debug`), and contained faults (`warn`).
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod log;

pub mod contact;
pub mod delegate;
pub mod error;
pub mod event;
pub mod gestures;
pub mod pan;
pub mod pinch;
pub mod recognizer;
pub mod space;
pub mod state;
pub mod target;

pub use contact::{Contact, ContactId, ContactPhase, ContactSample, ContactTracker};
pub use delegate::GestureDelegate;
pub use error::GestureError;
pub use event::{EventCategories, EventKind, InputEvent};
pub use gestures::{Action, DispatchReport, Fault, Gestures, Transition};
pub use pan::{PanRecognizer, PanSettings};
pub use pinch::{PinchRecognizer, PinchSettings};
pub use recognizer::{AlgorithmCx, GestureAlgorithm, RecognizerId, Snapshot};
pub use space::{AffineSpace, CoordinateSpace, SharedSpace, ViewKey};
pub use state::{GestureState, Step};
pub use target::{ObserverId, SharedAction, Target, TargetList};
