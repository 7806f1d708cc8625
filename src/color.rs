// Copyright 2006 The Android Open Source Project
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/// Represents fully opaque 16-bit alpha value.
pub const ALPHA_U16_OPAQUE: u16 = 0xFFFF;

/// Number of solid color kinds.
pub const SOLID_KIND_COUNT: usize = 2;

/// A solid color kind.
///
/// Kernels for opaque colors can skip destination reads for most operators,
/// therefore they have their own table slot.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum SolidKind {
    /// An arbitrary premultiplied color.
    Prgb = 0,
    /// A fully opaque color.
    Xrgb,
}

impl SolidKind {
    /// All kinds, in index order.
    pub const ALL: [SolidKind; SOLID_KIND_COUNT] = [SolidKind::Prgb, SolidKind::Xrgb];

    /// Returns kind's index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A solid color in both supported precisions.
///
/// Both values are premultiplied. `prgb32` is a `0xAARRGGBB` word and
/// `prgb64` is a `0xAAAA_RRRR_GGGG_BBBB` word.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Solid {
    prgb32: u32,
    prgb64: u64,
}

impl Solid {
    /// Creates a color from a straight `0xAARRGGBB` value.
    pub fn from_argb32(argb: u32) -> Self {
        let [a, r, g, b] = split_u32(argb);
        let prgb32 = join_u32([
            a,
            premultiply_u8(r, a),
            premultiply_u8(g, a),
            premultiply_u8(b, a),
        ]);

        let a16 = widen_u8(a);
        let prgb64 = join_u64([
            a16,
            premultiply_u16(widen_u8(r), a16),
            premultiply_u16(widen_u8(g), a16),
            premultiply_u16(widen_u8(b), a16),
        ]);

        Solid { prgb32, prgb64 }
    }

    /// Creates a color from a premultiplied `0xAARRGGBB` value.
    ///
    /// Returns `None` when any color channel is greater than alpha.
    pub fn from_prgb32(prgb: u32) -> Option<Self> {
        let [a, r, g, b] = split_u32(prgb);
        if r > a || g > a || b > a {
            return None;
        }

        let prgb64 = join_u64([widen_u8(a), widen_u8(r), widen_u8(g), widen_u8(b)]);
        Some(Solid { prgb32: prgb, prgb64 })
    }

    /// Creates a color from a straight `0xAAAA_RRRR_GGGG_BBBB` value.
    pub fn from_argb64(argb: u64) -> Self {
        let [a, r, g, b] = split_u64(argb);
        let r = premultiply_u16(r, a);
        let g = premultiply_u16(g, a);
        let b = premultiply_u16(b, a);

        Solid {
            prgb32: join_u32([narrow_u16(a), narrow_u16(r), narrow_u16(g), narrow_u16(b)]),
            prgb64: join_u64([a, r, g, b]),
        }
    }

    /// Creates a color from a premultiplied `0xAAAA_RRRR_GGGG_BBBB` value.
    ///
    /// Returns `None` when any color channel is greater than alpha.
    pub fn from_prgb64(prgb: u64) -> Option<Self> {
        let [a, r, g, b] = split_u64(prgb);
        if r > a || g > a || b > a {
            return None;
        }

        Some(Solid {
            prgb32: join_u32([narrow_u16(a), narrow_u16(r), narrow_u16(g), narrow_u16(b)]),
            prgb64: prgb,
        })
    }

    /// Returns the premultiplied 8-bit value.
    #[inline]
    pub fn prgb32(&self) -> u32 {
        self.prgb32
    }

    /// Returns the premultiplied 16-bit value.
    #[inline]
    pub fn prgb64(&self) -> u64 {
        self.prgb64
    }

    /// Checks that the color is fully opaque.
    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.prgb64 >> 48 == u64::from(ALPHA_U16_OPAQUE)
    }

    /// Returns the table slot kind for this color.
    #[inline]
    pub fn kind(&self) -> SolidKind {
        if self.is_opaque() {
            SolidKind::Xrgb
        } else {
            SolidKind::Prgb
        }
    }
}

/// A 256-entry color palette for `I8` images.
///
/// Entries are premultiplied `0xAARRGGBB` values.
#[derive(Clone, PartialEq)]
pub struct Palette {
    entries: [u32; 256],
}

impl Palette {
    /// Creates a palette from straight `0xAARRGGBB` colors.
    ///
    /// Missing entries are transparent black.
    /// Returns `None` when there are more than 256 colors.
    pub fn from_argb32(colors: &[u32]) -> Option<Self> {
        if colors.len() > 256 {
            return None;
        }

        let mut entries = [0; 256];
        for (entry, color) in entries.iter_mut().zip(colors) {
            *entry = Solid::from_argb32(*color).prgb32();
        }

        Some(Palette { entries })
    }

    /// Returns a premultiplied entry.
    #[inline]
    pub fn get(&self, index: u8) -> u32 {
        self.entries[usize::from(index)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette { entries: [0; 256] }
    }
}

impl core::fmt::Debug for Palette {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Palette")
            .field("entries", &"...")
            .finish()
    }
}

/// Return a*b/255, rounding any fractional bits.
#[inline]
pub fn premultiply_u8(c: u8, a: u8) -> u8 {
    let prod = u32::from(c) * u32::from(a) + 128;
    ((prod + (prod >> 8)) >> 8) as u8
}

/// Return a*b/65535, rounding any fractional bits.
#[inline]
pub fn premultiply_u16(c: u16, a: u16) -> u16 {
    ((u32::from(c) * u32::from(a) + 32767) / 65535) as u16
}

/// Return c*255/a, rounding any fractional bits.
///
/// Returns zero when alpha is zero.
#[inline]
pub fn demultiply_u8(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }

    let a = u32::from(a);
    ((u32::from(c) * 255 + a / 2) / a).min(255) as u8
}

/// Converts an 8-bit channel into a 16-bit one.
///
/// Exact: 0xFF becomes 0xFFFF.
#[inline]
pub fn widen_u8(c: u8) -> u16 {
    u16::from(c) * 257
}

/// Converts a 16-bit channel into an 8-bit one, rounding to nearest.
#[inline]
pub fn narrow_u16(c: u16) -> u8 {
    ((u32::from(c) + 128) / 257) as u8
}

/// Splits a `0xAARRGGBB` word into `[a, r, g, b]`.
#[inline]
pub(crate) fn split_u32(v: u32) -> [u8; 4] {
    let [b, g, r, a] = v.to_le_bytes();
    [a, r, g, b]
}

#[inline]
pub(crate) fn join_u32([a, r, g, b]: [u8; 4]) -> u32 {
    u32::from_le_bytes([b, g, r, a])
}

/// Splits a `0xAAAA_RRRR_GGGG_BBBB` word into `[a, r, g, b]`.
#[inline]
pub(crate) fn split_u64(v: u64) -> [u16; 4] {
    [(v >> 48) as u16, (v >> 32) as u16, (v >> 16) as u16, v as u16]
}

#[inline]
pub(crate) fn join_u64([a, r, g, b]: [u16; 4]) -> u64 {
    (u64::from(a) << 48) | (u64::from(r) << 32) | (u64::from(g) << 16) | u64::from(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_u8_values() {
        assert_eq!(premultiply_u8(10, 40), 2);
        assert_eq!(premultiply_u8(20, 40), 3);
        assert_eq!(premultiply_u8(30, 40), 5);
        assert_eq!(premultiply_u8(30, 255), 30);
    }

    #[test]
    fn demultiply_u8_values() {
        assert_eq!(demultiply_u8(2, 40), 13);
        assert_eq!(demultiply_u8(3, 40), 19);
        assert_eq!(demultiply_u8(5, 40), 32);
        assert_eq!(demultiply_u8(30, 255), 30);
        assert_eq!(demultiply_u8(30, 0), 0);
    }

    #[test]
    fn widen_narrow() {
        for c in 0..=255u8 {
            assert_eq!(narrow_u16(widen_u8(c)), c);
        }

        assert_eq!(widen_u8(0xFF), 0xFFFF);
        assert_eq!(narrow_u16(0x8080), 0x80);
        assert_eq!(narrow_u16(128), 0);
        assert_eq!(narrow_u16(129), 1);
        assert_eq!(narrow_u16(0xFFFF), 0xFF);
    }

    #[test]
    fn solid_from_argb32() {
        let c = Solid::from_argb32(0x280A141E);
        assert_eq!(c.prgb32(), 0x28020305);
        assert_eq!(c.kind(), SolidKind::Prgb);
        assert_eq!(split_u64(c.prgb64())[0], 0x2828);

        let c = Solid::from_argb32(0xFF102030);
        assert_eq!(c.prgb32(), 0xFF102030);
        assert_eq!(c.prgb64(), 0xFFFF_1010_2020_3030);
        assert_eq!(c.kind(), SolidKind::Xrgb);
    }

    #[test]
    fn solid_from_prgb32() {
        assert!(Solid::from_prgb32(0x10200000).is_none());
        let c = Solid::from_prgb32(0x80400000).unwrap();
        assert_eq!(c.prgb64(), 0x8080_4040_0000_0000);
    }

    #[test]
    fn solid_from_argb64() {
        let c = Solid::from_argb64(0xFFFF_8080_0000_FFFF);
        assert_eq!(c.prgb32(), 0xFF8000FF);
        assert!(c.is_opaque());
        assert!(Solid::from_prgb64(0x0001_0002_0000_0000).is_none());
    }

    #[test]
    fn palette() {
        let p = Palette::from_argb32(&[0xFF0000FF, 0x80FFFFFF]).unwrap();
        assert_eq!(p.get(0), 0xFF0000FF);
        assert_eq!(p.get(1), 0x80808080);
        assert_eq!(p.get(2), 0);
        assert!(Palette::from_argb32(&[0; 257]).is_none());
    }

    #[test]
    fn word_layout() {
        assert_eq!(split_u32(0xAABBCCDD), [0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(join_u32([0xAA, 0xBB, 0xCC, 0xDD]), 0xAABBCCDD);
        assert_eq!(join_u64(split_u64(0x0123_4567_89AB_CDEF)), 0x0123_4567_89AB_CDEF);
    }
}
