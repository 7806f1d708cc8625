// Copyright 2018 Google Inc.
// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/*!
An accelerated kernel set for 8-bit RGB destinations.

Kernels operate on 16 pixels at once, stored as four `u16x16` planes.
Unlike the generic set, there is no per-pixel conversion into a working buffer:
pixels are loaded directly into planes, blended and stored back.

The results are bit-identical to the generic set, since both use
the exact `round(x / 255)` division and the same clamping.

Covers `Prgb32` and `Xrgb32` destinations, `Src` and `SrcOver` operators,
`Prgb32`, `Xrgb32` and `Rgb24` sources and solid colors.
*/

use arrayref::array_ref;

use super::access::{self, Fetch, Store};
use super::{BlitClosure, KernelSet, STAGE_WIDTH};
use crate::color::split_u32;
use crate::table::derive::is_derived;
use crate::wide::{div255, inv, lerp, u16x16};
use crate::{CompositeOp, CpuFeatures, Solid, SolidKind};
use crate::{Kernel, Slot, TableBuilder};

/// The accelerated 8-bit kernel set.
#[derive(Clone, Copy, Debug)]
pub struct Wide;

impl KernelSet for Wide {
    fn name(&self) -> &'static str {
        "wide"
    }

    fn is_supported(&self, features: CpuFeatures) -> bool {
        cfg!(feature = "simd")
            && features.intersects(CpuFeatures::SSE2 | CpuFeatures::NEON | CpuFeatures::SIMD128)
    }

    fn install(&self, b: &mut TableBuilder) {
        install_destination::<access::Prgb32>(b);
        install_destination::<access::Xrgb32>(b);
    }
}

fn install_destination<D: WideStore>(b: &mut TableBuilder) {
    install_operator::<D, Source>(b);
    install_operator::<D, SourceOver>(b);
}

fn install_operator<D: WideStore, O: WideBlend>(b: &mut TableBuilder) {
    install_source::<D, access::Prgb32, O>(b);
    install_source::<D, access::Xrgb32, O>(b);
    install_source::<D, access::Rgb24, O>(b);

    b.install(D::FORMAT, O::OP, Kernel::SolidLine(SolidKind::Prgb, cblit_line::<D, O>));
    b.install(D::FORMAT, O::OP, Kernel::SolidSpan(SolidKind::Prgb, cblit_span::<D, O>));
}

fn install_source<D: WideStore, S: WideFetch, O: WideBlend>(b: &mut TableBuilder) {
    if !is_derived(D::FORMAT, O::OP, Slot::Line(S::FORMAT)) {
        b.install(D::FORMAT, O::OP, Kernel::Line(S::FORMAT, vblit_line::<D, S, O>));
    }

    if !is_derived(D::FORMAT, O::OP, Slot::Span(S::FORMAT)) {
        b.install(D::FORMAT, O::OP, Kernel::Span(S::FORMAT, vblit_span::<D, S, O>));
    }
}

#[derive(Copy, Clone, Default, Debug)]
struct Planes {
    r: u16x16,
    g: u16x16,
    b: u16x16,
    a: u16x16,
}

impl Planes {
    #[inline(always)]
    fn splat(color: u32) -> Self {
        let [a, r, g, b] = split_u32(color);
        Planes {
            r: u16x16::splat(u16::from(r)),
            g: u16x16::splat(u16::from(g)),
            b: u16x16::splat(u16::from(b)),
            a: u16x16::splat(u16::from(a)),
        }
    }
}

trait WideFetch: Fetch {
    /// Loads exactly `STAGE_WIDTH` pixels.
    fn load(data: &[u8]) -> Planes;
}

trait WideStore: WideFetch + Store {
    /// Stores `data.len() / bpp` pixels, skipping pixels with zero coverage.
    fn store_planes(p: &Planes, data: &mut [u8], mask: Option<&[u8]>);
}

impl WideFetch for access::Prgb32 {
    #[inline(always)]
    fn load(data: &[u8]) -> Planes {
        let pixels: &[[u8; 4]; STAGE_WIDTH] = bytemuck::cast_ref(array_ref!(data, 0, STAGE_WIDTH * 4));
        let mut p = Planes::default();
        for i in 0..STAGE_WIDTH {
            p.b.0[i] = u16::from(pixels[i][0]);
            p.g.0[i] = u16::from(pixels[i][1]);
            p.r.0[i] = u16::from(pixels[i][2]);
            p.a.0[i] = u16::from(pixels[i][3]);
        }

        p
    }
}

impl WideStore for access::Prgb32 {
    #[inline(always)]
    fn store_planes(p: &Planes, data: &mut [u8], mask: Option<&[u8]>) {
        let (r, g, b, a) = (p.r.as_slice(), p.g.as_slice(), p.b.as_slice(), p.a.as_slice());
        for (i, pixel) in data.chunks_exact_mut(4).enumerate() {
            if mask.map_or(false, |mask| mask[i] == 0) {
                continue;
            }

            pixel.copy_from_slice(&[b[i] as u8, g[i] as u8, r[i] as u8, a[i] as u8]);
        }
    }
}

impl WideFetch for access::Xrgb32 {
    #[inline(always)]
    fn load(data: &[u8]) -> Planes {
        let pixels: &[[u8; 4]; STAGE_WIDTH] = bytemuck::cast_ref(array_ref!(data, 0, STAGE_WIDTH * 4));
        let mut p = Planes { a: u16x16::splat(255), ..Planes::default() };
        for i in 0..STAGE_WIDTH {
            p.b.0[i] = u16::from(pixels[i][0]);
            p.g.0[i] = u16::from(pixels[i][1]);
            p.r.0[i] = u16::from(pixels[i][2]);
        }

        p
    }
}

impl WideStore for access::Xrgb32 {
    #[inline(always)]
    fn store_planes(p: &Planes, data: &mut [u8], mask: Option<&[u8]>) {
        let (r, g, b) = (p.r.as_slice(), p.g.as_slice(), p.b.as_slice());
        for (i, pixel) in data.chunks_exact_mut(4).enumerate() {
            if mask.map_or(false, |mask| mask[i] == 0) {
                continue;
            }

            pixel.copy_from_slice(&[b[i] as u8, g[i] as u8, r[i] as u8, 0xFF]);
        }
    }
}

impl WideFetch for access::Rgb24 {
    #[inline(always)]
    fn load(data: &[u8]) -> Planes {
        let pixels: &[[u8; 3]; STAGE_WIDTH] = bytemuck::cast_ref(array_ref!(data, 0, STAGE_WIDTH * 3));
        let mut p = Planes { a: u16x16::splat(255), ..Planes::default() };
        for i in 0..STAGE_WIDTH {
            p.b.0[i] = u16::from(pixels[i][0]);
            p.g.0[i] = u16::from(pixels[i][1]);
            p.r.0[i] = u16::from(pixels[i][2]);
        }

        p
    }
}

/// Loads `n` pixels. Missing pixels are zeros.
#[inline(always)]
fn load_tail<S: WideFetch>(data: &[u8], n: usize) -> Planes {
    let bpp = S::FORMAT.bytes_per_pixel();
    if n == STAGE_WIDTH {
        return S::load(data);
    }

    // Fill a dummy array with `n` pixels, so we can reuse `load`.
    let mut tmp = [0; STAGE_WIDTH * 4];
    tmp[..n * bpp].copy_from_slice(&data[..n * bpp]);
    S::load(&tmp)
}

#[inline(always)]
fn load_mask(mask: &[u8]) -> u16x16 {
    let mut c = u16x16::default();
    for (lane, v) in c.0.iter_mut().zip(mask) {
        *lane = u16::from(*v);
    }

    c
}

trait WideBlend: 'static {
    const OP: CompositeOp;
    const READS_DST: bool;

    fn blend(s: &Planes, d: &Planes) -> Planes;
}

enum Source {}

impl WideBlend for Source {
    const OP: CompositeOp = CompositeOp::Src;
    const READS_DST: bool = false;

    #[inline(always)]
    fn blend(s: &Planes, _: &Planes) -> Planes {
        *s
    }
}

enum SourceOver {}

impl WideBlend for SourceOver {
    const OP: CompositeOp = CompositeOp::SrcOver;
    const READS_DST: bool = true;

    #[inline(always)]
    fn blend(s: &Planes, d: &Planes) -> Planes {
        let max = u16x16::splat(255);
        let isa = inv(s.a);
        Planes {
            r: (s.r + div255(d.r * isa)).min(&max),
            g: (s.g + div255(d.g * isa)).min(&max),
            b: (s.b + div255(d.b * isa)).min(&max),
            a: (s.a + div255(d.a * isa)).min(&max),
        }
    }
}

#[inline(always)]
fn run<D: WideStore, O: WideBlend>(
    dst: &mut [u8],
    len: usize,
    mask: Option<&[u8]>,
    fetch: impl Fn(usize, usize) -> Planes,
) {
    let bpp = D::FORMAT.bytes_per_pixel();
    let mut x = 0;
    while x < len {
        let n = STAGE_WIDTH.min(len - x);
        let pixels = &mut dst[x * bpp..(x + n) * bpp];
        let mask = mask.map(|mask| &mask[x..x + n]);

        let s = fetch(x, n);
        let d = if O::READS_DST || mask.is_some() {
            load_tail::<D>(pixels, n)
        } else {
            Planes::default()
        };

        let mut r = O::blend(&s, &d);
        if let Some(mask) = mask {
            let c = load_mask(mask);
            r = Planes {
                r: lerp(d.r, r.r, c),
                g: lerp(d.g, r.g, c),
                b: lerp(d.b, r.b, c),
                a: lerp(d.a, r.a, c),
            };
        }

        D::store_planes(&r, pixels, mask);
        x += n;
    }
}

fn vblit_line<D: WideStore, S: WideFetch, O: WideBlend>(
    dst: &mut [u8],
    src: &[u8],
    len: usize,
    _: &BlitClosure,
) {
    let bpp = S::FORMAT.bytes_per_pixel();
    run::<D, O>(dst, len, None, |x, n| load_tail::<S>(&src[x * bpp..], n));
}

fn vblit_span<D: WideStore, S: WideFetch, O: WideBlend>(
    dst: &mut [u8],
    src: &[u8],
    mask: &[u8],
    len: usize,
    _: &BlitClosure,
) {
    let bpp = S::FORMAT.bytes_per_pixel();
    run::<D, O>(dst, len, Some(mask), |x, n| load_tail::<S>(&src[x * bpp..], n));
}

fn cblit_line<D: WideStore, O: WideBlend>(dst: &mut [u8], solid: &Solid, len: usize) {
    let s = Planes::splat(solid.prgb32());
    run::<D, O>(dst, len, None, |_, _| s);
}

fn cblit_span<D: WideStore, O: WideBlend>(dst: &mut [u8], solid: &Solid, mask: &[u8], len: usize) {
    let s = Planes::splat(solid.prgb32());
    run::<D, O>(dst, len, Some(mask), |_, _| s);
}
