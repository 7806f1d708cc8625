// Copyright 2006 The Android Open Source Project
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::convert::TryFrom;

use crate::LengthU32;

/// An integer size.
///
/// # Guarantees
///
/// - Width and height are positive and non-zero.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct IntSize {
    width: LengthU32,
    height: LengthU32,
}

impl IntSize {
    /// Creates a new `IntSize` from width and height.
    #[inline]
    pub fn from_wh(width: u32, height: u32) -> Option<Self> {
        Some(IntSize {
            width: LengthU32::new(width)?,
            height: LengthU32::new(height)?,
        })
    }

    /// Returns width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    /// Returns height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height.get()
    }

    /// Converts into an `IntRect` at the provided position.
    #[inline]
    pub fn to_int_rect(&self, x: u32, y: u32) -> Option<IntRect> {
        IntRect::from_xywh(x, y, self.width(), self.height())
    }
}

/// A screen rectangle.
///
/// # Guarantees
///
/// - X and Y are in 0..=i32::MAX range.
/// - Width and height are in 1..=i32::MAX range.
/// - x+width and y+height does not overflow.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct IntRect {
    x: u32,
    y: u32,
    width: LengthU32,
    height: LengthU32,
}

impl IntRect {
    /// Creates a new `IntRect`.
    #[inline]
    pub fn from_xywh(x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        i32::try_from(x).ok()?;
        i32::try_from(y).ok()?;
        i32::try_from(width).ok()?;
        i32::try_from(height).ok()?;

        x.checked_add(width)?;
        y.checked_add(height)?;

        let width = LengthU32::new(width)?;
        let height = LengthU32::new(height)?;

        Some(IntRect { x, y, width, height })
    }

    /// Creates a new `IntRect` from edges.
    #[inline]
    pub fn from_ltrb(left: u32, top: u32, right: u32, bottom: u32) -> Option<Self> {
        let width = right.checked_sub(left)?;
        let height = bottom.checked_sub(top)?;
        IntRect::from_xywh(left, top, width, height)
    }

    /// Returns rect's X position.
    #[inline]
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Returns rect's Y position.
    #[inline]
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Returns rect's width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    /// Returns rect's height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height.get()
    }

    /// Returns rect's top edge.
    #[inline]
    pub fn top(&self) -> u32 {
        self.y
    }

    /// Returns rect's right edge.
    ///
    /// The right edge is at least 1.
    #[inline]
    pub fn right(&self) -> u32 {
        // No overflow is guaranteed by constructors.
        self.x + self.width.get()
    }

    /// Returns rect's bottom edge.
    ///
    /// The bottom edge is at least 1.
    #[inline]
    pub fn bottom(&self) -> u32 {
        // No overflow is guaranteed by constructors.
        self.y + self.height.get()
    }

    /// Returns rect's size.
    #[inline]
    pub fn size(&self) -> IntSize {
        IntSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Returns an intersection of two rectangles.
    ///
    /// Returns `None` otherwise.
    #[inline]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        IntRect::from_ltrb(left, top, right, bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tests() {
        assert_eq!(IntRect::from_xywh(0, 0, 0, 0), None);
        assert_eq!(IntRect::from_xywh(0, 0, 1, 0), None);
        assert_eq!(IntRect::from_xywh(0, 0, 0, 1), None);

        assert_eq!(IntRect::from_xywh(0, 0, u32::MAX, u32::MAX), None);
        assert_eq!(IntRect::from_xywh(0, 0, 1, u32::MAX), None);
        assert_eq!(IntRect::from_xywh(0, 0, u32::MAX, 1), None);

        assert_eq!(IntRect::from_xywh(u32::MAX, 0, 1, 1), None);
        assert_eq!(IntRect::from_xywh(0, u32::MAX, 1, 1), None);

        let r = IntRect::from_xywh(1, 2, 3, 4).unwrap();
        assert_eq!(r.right(), 4);
        assert_eq!(r.bottom(), 6);
        assert_eq!(r.size(), IntSize::from_wh(3, 4).unwrap());
    }

    #[test]
    fn intersect() {
        let r1 = IntRect::from_xywh(1, 2, 3, 4).unwrap();
        let r2 = IntRect::from_xywh(2, 1, 3, 6).unwrap();
        assert_eq!(r1.intersect(&r2), IntRect::from_xywh(2, 2, 2, 4));

        let r3 = IntRect::from_xywh(10, 10, 3, 3).unwrap();
        assert_eq!(r1.intersect(&r3), None);
    }
}
