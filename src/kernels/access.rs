// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Per-format pixel loading and storing.

use arrayref::{array_mut_ref, array_ref};

use super::precision::{Depth16, Depth8, DepthTag, Math, Pixel, Precision};
use super::BlitClosure;
use crate::color::split_u32;
use crate::PixelFormat;

/// Loads a single pixel as premultiplied.
pub trait Fetch: 'static {
    const FORMAT: PixelFormat;

    /// Working depth.
    ///
    /// Straight-alpha formats are 16-bit here, so that premultiplying
    /// on load and demultiplying on store gives back the original bytes.
    type Depth: DepthTag;

    fn fetch<P: Precision>(src: &[u8], closure: &BlitClosure) -> Pixel;
}

/// Stores a single premultiplied pixel.
///
/// Values must be already clamped to the precision range.
pub trait Store: Fetch {
    fn store<P: Precision>(dst: &mut [u8], px: Pixel);
}

pub enum Prgb32 {}
pub enum Argb32 {}
pub enum Xrgb32 {}
pub enum Rgb24 {}
pub enum A8 {}
pub enum I8 {}
pub enum Prgb64 {}
pub enum Rgb48 {}
pub enum A16 {}

#[inline(always)]
fn read_u16(data: &[u8], i: usize) -> u16 {
    u16::from_le_bytes(*array_ref!(data, i * 2, 2))
}

#[inline(always)]
fn write_u16(data: &mut [u8], i: usize, v: u16) {
    *array_mut_ref!(data, i * 2, 2) = v.to_le_bytes();
}

impl Fetch for Prgb32 {
    const FORMAT: PixelFormat = PixelFormat::Prgb32;
    type Depth = Depth8;

    #[inline(always)]
    fn fetch<P: Precision>(src: &[u8], _: &BlitClosure) -> Pixel {
        let [b, g, r, a] = *array_ref!(src, 0, 4);
        Pixel::new(P::from_u8(r), P::from_u8(g), P::from_u8(b), P::from_u8(a))
    }
}

impl Store for Prgb32 {
    #[inline(always)]
    fn store<P: Precision>(dst: &mut [u8], px: Pixel) {
        *array_mut_ref!(dst, 0, 4) = [P::to_u8(px.b), P::to_u8(px.g), P::to_u8(px.r), P::to_u8(px.a)];
    }
}

impl Fetch for Argb32 {
    const FORMAT: PixelFormat = PixelFormat::Argb32;
    type Depth = Depth16;

    #[inline(always)]
    fn fetch<P: Precision>(src: &[u8], _: &BlitClosure) -> Pixel {
        let m = Math::of::<P>();
        let [b, g, r, a] = *array_ref!(src, 0, 4);
        let a = u64::from(P::from_u8(a));
        let premultiply = |c: u8| m.div(u64::from(P::from_u8(c)) * a) as u32;
        Pixel::new(premultiply(r), premultiply(g), premultiply(b), a as u32)
    }
}

impl Store for Argb32 {
    #[inline(always)]
    fn store<P: Precision>(dst: &mut [u8], px: Pixel) {
        let max = u64::from(P::MAX);
        let a = u64::from(px.a);
        let demultiply = |c: u32| {
            if a == 0 {
                return 0;
            }

            P::to_u8(((u64::from(c) * max + a / 2) / a).min(max) as u32)
        };
        *array_mut_ref!(dst, 0, 4) = [demultiply(px.b), demultiply(px.g), demultiply(px.r), P::to_u8(px.a)];
    }
}

impl Fetch for Xrgb32 {
    const FORMAT: PixelFormat = PixelFormat::Xrgb32;
    type Depth = Depth8;

    #[inline(always)]
    fn fetch<P: Precision>(src: &[u8], _: &BlitClosure) -> Pixel {
        let [b, g, r, _] = *array_ref!(src, 0, 4);
        Pixel::new(P::from_u8(r), P::from_u8(g), P::from_u8(b), P::MAX)
    }
}

impl Store for Xrgb32 {
    #[inline(always)]
    fn store<P: Precision>(dst: &mut [u8], px: Pixel) {
        *array_mut_ref!(dst, 0, 4) = [P::to_u8(px.b), P::to_u8(px.g), P::to_u8(px.r), 0xFF];
    }
}

impl Fetch for Rgb24 {
    const FORMAT: PixelFormat = PixelFormat::Rgb24;
    type Depth = Depth8;

    #[inline(always)]
    fn fetch<P: Precision>(src: &[u8], _: &BlitClosure) -> Pixel {
        let [b, g, r] = *array_ref!(src, 0, 3);
        Pixel::new(P::from_u8(r), P::from_u8(g), P::from_u8(b), P::MAX)
    }
}

impl Store for Rgb24 {
    #[inline(always)]
    fn store<P: Precision>(dst: &mut [u8], px: Pixel) {
        *array_mut_ref!(dst, 0, 3) = [P::to_u8(px.b), P::to_u8(px.g), P::to_u8(px.r)];
    }
}

impl Fetch for A8 {
    const FORMAT: PixelFormat = PixelFormat::A8;
    type Depth = Depth8;

    #[inline(always)]
    fn fetch<P: Precision>(src: &[u8], _: &BlitClosure) -> Pixel {
        Pixel::new(0, 0, 0, P::from_u8(src[0]))
    }
}

impl Store for A8 {
    #[inline(always)]
    fn store<P: Precision>(dst: &mut [u8], px: Pixel) {
        dst[0] = P::to_u8(px.a);
    }
}

impl Fetch for I8 {
    const FORMAT: PixelFormat = PixelFormat::I8;
    type Depth = Depth8;

    #[inline(always)]
    fn fetch<P: Precision>(src: &[u8], closure: &BlitClosure) -> Pixel {
        debug_assert!(closure.palette.is_some(), "an I8 source requires a palette");

        let color = closure.palette.map_or(0, |palette| palette.get(src[0]));
        let [a, r, g, b] = split_u32(color);
        Pixel::new(P::from_u8(r), P::from_u8(g), P::from_u8(b), P::from_u8(a))
    }
}

impl Fetch for Prgb64 {
    const FORMAT: PixelFormat = PixelFormat::Prgb64;
    type Depth = Depth16;

    #[inline(always)]
    fn fetch<P: Precision>(src: &[u8], _: &BlitClosure) -> Pixel {
        Pixel::new(
            P::from_u16(read_u16(src, 2)),
            P::from_u16(read_u16(src, 1)),
            P::from_u16(read_u16(src, 0)),
            P::from_u16(read_u16(src, 3)),
        )
    }
}

impl Store for Prgb64 {
    #[inline(always)]
    fn store<P: Precision>(dst: &mut [u8], px: Pixel) {
        write_u16(dst, 0, P::to_u16(px.b));
        write_u16(dst, 1, P::to_u16(px.g));
        write_u16(dst, 2, P::to_u16(px.r));
        write_u16(dst, 3, P::to_u16(px.a));
    }
}

impl Fetch for Rgb48 {
    const FORMAT: PixelFormat = PixelFormat::Rgb48;
    type Depth = Depth16;

    #[inline(always)]
    fn fetch<P: Precision>(src: &[u8], _: &BlitClosure) -> Pixel {
        Pixel::new(
            P::from_u16(read_u16(src, 2)),
            P::from_u16(read_u16(src, 1)),
            P::from_u16(read_u16(src, 0)),
            P::MAX,
        )
    }
}

impl Store for Rgb48 {
    #[inline(always)]
    fn store<P: Precision>(dst: &mut [u8], px: Pixel) {
        write_u16(dst, 0, P::to_u16(px.b));
        write_u16(dst, 1, P::to_u16(px.g));
        write_u16(dst, 2, P::to_u16(px.r));
    }
}

impl Fetch for A16 {
    const FORMAT: PixelFormat = PixelFormat::A16;
    type Depth = Depth16;

    #[inline(always)]
    fn fetch<P: Precision>(src: &[u8], _: &BlitClosure) -> Pixel {
        Pixel::new(0, 0, 0, P::from_u16(read_u16(src, 0)))
    }
}

impl Store for A16 {
    #[inline(always)]
    fn store<P: Precision>(dst: &mut [u8], px: Pixel) {
        write_u16(dst, 0, P::to_u16(px.a));
    }
}
