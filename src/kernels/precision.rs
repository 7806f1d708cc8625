// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/*!
Working precision.

A kernel works either in an 8-bit (lowp) or a 16-bit (highp) channel range.
Lowp is used only when both the source and the destination work at 8 bits.
Otherwise highp is used, so 16-bit data is never truncated before blending.
Straight-alpha formats always work at 16 bits.

The choice is made at compile time via `Join`.
*/

use crate::color::{narrow_u16, split_u32, split_u64, widen_u8};
use crate::Solid;

/// A premultiplied pixel in a working precision.
///
/// Stored in `u32`, so products of two channels never overflow.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct Pixel {
    pub r: u32,
    pub g: u32,
    pub b: u32,
    pub a: u32,
}

impl Pixel {
    #[inline(always)]
    pub fn new(r: u32, g: u32, b: u32, a: u32) -> Self {
        Pixel { r, g, b, a }
    }
}

pub trait Precision: 'static {
    /// Channel's maximum value.
    const MAX: u32;

    fn from_u8(v: u8) -> u32;
    fn from_u16(v: u16) -> u32;
    fn to_u8(v: u32) -> u8;
    fn to_u16(v: u32) -> u16;

    /// Converts a mask value into a coverage in the `0..=MAX` range.
    #[inline(always)]
    fn coverage(v: u8) -> u32 {
        Self::from_u8(v)
    }

    fn solid(solid: &Solid) -> Pixel;
}

pub enum Lowp {}

impl Precision for Lowp {
    const MAX: u32 = 255;

    #[inline(always)]
    fn from_u8(v: u8) -> u32 {
        u32::from(v)
    }

    #[inline(always)]
    fn from_u16(v: u16) -> u32 {
        u32::from(narrow_u16(v))
    }

    #[inline(always)]
    fn to_u8(v: u32) -> u8 {
        v as u8
    }

    #[inline(always)]
    fn to_u16(v: u32) -> u16 {
        widen_u8(v as u8)
    }

    #[inline(always)]
    fn solid(solid: &Solid) -> Pixel {
        let [a, r, g, b] = split_u32(solid.prgb32());
        Pixel::new(u32::from(r), u32::from(g), u32::from(b), u32::from(a))
    }
}

pub enum Highp {}

impl Precision for Highp {
    const MAX: u32 = 65535;

    #[inline(always)]
    fn from_u8(v: u8) -> u32 {
        u32::from(widen_u8(v))
    }

    #[inline(always)]
    fn from_u16(v: u16) -> u32 {
        u32::from(v)
    }

    #[inline(always)]
    fn to_u8(v: u32) -> u8 {
        narrow_u16(v as u16)
    }

    #[inline(always)]
    fn to_u16(v: u32) -> u16 {
        v as u16
    }

    #[inline(always)]
    fn solid(solid: &Solid) -> Pixel {
        let [a, r, g, b] = split_u64(solid.prgb64());
        Pixel::new(u32::from(r), u32::from(g), u32::from(b), u32::from(a))
    }
}

/// Channel math for a precision.
///
/// All divisions are exact, rounding to nearest.
#[derive(Copy, Clone, Debug)]
pub struct Math {
    pub max: u64,
}

impl Math {
    #[inline(always)]
    pub fn of<P: Precision>() -> Self {
        Math { max: u64::from(P::MAX) }
    }

    /// `round(v / max)`
    #[inline(always)]
    pub fn div(self, v: u64) -> u64 {
        (v + self.max / 2) / self.max
    }

    #[inline(always)]
    pub fn inv(self, v: u64) -> u64 {
        self.max.saturating_sub(v)
    }

    #[inline(always)]
    pub fn lerp(self, from: u64, to: u64, t: u64) -> u64 {
        self.div(from * self.inv(t) + to * t)
    }

    #[inline(always)]
    pub fn lerp_pixel(self, from: Pixel, to: Pixel, t: u32) -> Pixel {
        let t = u64::from(t);
        Pixel::new(
            self.lerp(u64::from(from.r), u64::from(to.r), t) as u32,
            self.lerp(u64::from(from.g), u64::from(to.g), t) as u32,
            self.lerp(u64::from(from.b), u64::from(to.b), t) as u32,
            self.lerp(u64::from(from.a), u64::from(to.a), t) as u32,
        )
    }
}

/// An 8-bit format marker.
pub enum Depth8 {}

/// A 16-bit format marker.
pub enum Depth16 {}

/// Picks a working precision for a pair of formats.
pub trait Join<Rhs> {
    type Output: Precision;
}

impl Join<Depth8> for Depth8 {
    type Output = Lowp;
}

impl Join<Depth16> for Depth8 {
    type Output = Highp;
}

impl Join<Depth8> for Depth16 {
    type Output = Highp;
}

impl Join<Depth16> for Depth16 {
    type Output = Highp;
}

pub trait DepthTag: Join<Depth8> + Join<Depth16> + Join<Self> + Sized + 'static {}

impl DepthTag for Depth8 {}

impl DepthTag for Depth16 {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_rounds_to_nearest() {
        let m = Math::of::<Lowp>();
        for v in 0..=255 * 255u64 {
            let expected = (v as f64 / 255.0).round() as u64;
            assert_eq!(m.div(v), expected, "{}", v);
        }

        let m = Math::of::<Highp>();
        assert_eq!(m.div(32767), 0);
        assert_eq!(m.div(32768), 1);
        assert_eq!(m.div(65535 * 65535), 65535);
    }

    #[test]
    fn lerp_bounds() {
        let m = Math::of::<Lowp>();
        assert_eq!(m.lerp(10, 200, 0), 10);
        assert_eq!(m.lerp(10, 200, 255), 200);

        let m = Math::of::<Highp>();
        assert_eq!(m.lerp(10, 60000, 0), 10);
        assert_eq!(m.lerp(10, 60000, 65535), 60000);
    }

    #[test]
    fn conversions() {
        assert_eq!(Highp::from_u8(0xFF), 0xFFFF);
        assert_eq!(Highp::to_u8(0x8080), 0x80);
        assert_eq!(Lowp::from_u16(0xFFFF), 0xFF);
        assert_eq!(Lowp::to_u16(0x80), 0x8080);
        assert_eq!(Highp::coverage(0xFF), 0xFFFF);
    }

    #[test]
    fn solids() {
        let c = Solid::from_argb32(0xFF102030);
        assert_eq!(Lowp::solid(&c), Pixel::new(0x10, 0x20, 0x30, 0xFF));
        assert_eq!(Highp::solid(&c), Pixel::new(0x1010, 0x2020, 0x3030, 0xFFFF));
    }
}
