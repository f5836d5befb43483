// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View keys and coordinate conversion between views.
//!
//! The gesture core does not own a view tree. Views are opaque keys supplied by
//! the toolkit, and point conversion is delegated to a [`CoordinateSpace`]
//! implementation, for example one backed by a box tree's world transforms.
//!
//! `None` in place of a view means the shared root (window) space.

use core::fmt::Debug;

use kurbo::{Affine, Point};

/// Key identifying a view that recognizers can attach to.
///
/// Blanket-implemented for any small copyable key, such as a box-tree node id
/// or a plain integer.
pub trait ViewKey: Copy + Eq + Debug + 'static {}

impl<T: Copy + Eq + Debug + 'static> ViewKey for T {}

/// Converts points between view-local spaces.
pub trait CoordinateSpace<V: Copy> {
    /// Convert a point in `view`'s local space into root space.
    fn to_root(&self, view: V, point: Point) -> Point;

    /// Convert a root-space point into `view`'s local space.
    fn from_root(&self, view: V, point: Point) -> Point;

    /// Convert `point` from one space to another, going through root space.
    fn convert(&self, point: Point, from: Option<V>, to: Option<V>) -> Point {
        let root = match from {
            Some(v) => self.to_root(v, point),
            None => point,
        };
        match to {
            Some(v) => self.from_root(v, root),
            None => root,
        }
    }
}

/// A space where every view shares the root coordinate system.
///
/// Used by [`Gestures::new`](crate::Gestures::new) when views are not transformed
/// relative to one another.
#[derive(Copy, Clone, Debug, Default)]
pub struct SharedSpace;

impl<V: Copy> CoordinateSpace<V> for SharedSpace {
    #[inline]
    fn to_root(&self, _view: V, point: Point) -> Point {
        point
    }

    #[inline]
    fn from_root(&self, _view: V, point: Point) -> Point {
        point
    }

    #[inline]
    fn convert(&self, point: Point, _from: Option<V>, _to: Option<V>) -> Point {
        point
    }
}

/// A space described by each view's view-to-root transform.
///
/// The lookup is consulted on every conversion, so it can read live transforms
/// from the toolkit's own tree.
///
/// ```
/// use kurbo::{Affine, Point};
/// use understory_gesture::{AffineSpace, CoordinateSpace};
///
/// let space = AffineSpace::new(|view: u32| Affine::translate((100.0 * f64::from(view), 0.0)));
/// let p = space.convert(Point::new(5.0, 5.0), Some(1), Some(2));
/// assert_eq!(p, Point::new(-95.0, 5.0));
/// ```
#[derive(Clone)]
pub struct AffineSpace<F> {
    transform_of: F,
}

impl<F> AffineSpace<F> {
    /// Create a space from a lookup returning each view's view-to-root transform.
    pub fn new(transform_of: F) -> Self {
        Self { transform_of }
    }
}

impl<F> Debug for AffineSpace<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AffineSpace").finish_non_exhaustive()
    }
}

impl<V: Copy, F: Fn(V) -> Affine> CoordinateSpace<V> for AffineSpace<F> {
    fn to_root(&self, view: V, point: Point) -> Point {
        (self.transform_of)(view) * point
    }

    fn from_root(&self, view: V, point: Point) -> Point {
        (self.transform_of)(view).inverse() * point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_space_is_identity() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(
            CoordinateSpace::<u32>::convert(&SharedSpace, p, Some(1), Some(2)),
            p
        );
        assert_eq!(CoordinateSpace::<u32>::to_root(&SharedSpace, 7, p), p);
    }

    #[test]
    fn affine_space_round_trips_through_root() {
        let space = AffineSpace::new(|v: u32| match v {
            1 => Affine::translate((10.0, 20.0)),
            2 => Affine::scale(2.0),
            _ => Affine::IDENTITY,
        });
        // (1, 1) in view 1 is (11, 21) in root and (5.5, 10.5) in view 2.
        let p = space.convert(Point::new(1.0, 1.0), Some(1), Some(2));
        assert_eq!(p, Point::new(5.5, 10.5));
        let root = space.convert(Point::new(1.0, 1.0), Some(1), None);
        assert_eq!(root, Point::new(11.0, 21.0));
        let back = space.convert(root, None, Some(1));
        assert_eq!(back, Point::new(1.0, 1.0));
    }
}
