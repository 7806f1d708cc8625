// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/*!
Portable kernels.

Every kernel is an instance of a few generic functions parametrized by
a working precision, a destination format, a source format and an operator.
Pixels are processed in chunks of `STAGE_WIDTH`: the source is converted into
a stack buffer first and then composited onto the destination.

This set covers every paintable destination, every operator and every source,
except the slots that the table builder derives by aliasing.
*/

use super::access::{self, Fetch, Store};
use super::blend::{self, Blend};
use super::copy;
use super::precision::{Join, Math, Pixel, Precision};
use super::{null_cblit_line, null_cblit_span, BlitClosure, CopyWidth, KernelSet, STAGE_WIDTH};
use crate::table::derive::is_derived;
use crate::{CompositeOp, CpuFeatures, PixelFormat, Solid, SolidKind};
use crate::{Kernel, Slot, TableBuilder};

/// Working precision for a destination and source pair.
type WorkOf<D, S> = <<D as Fetch>::Depth as Join<<S as Fetch>::Depth>>::Output;

/// The baseline kernel set.
#[derive(Clone, Copy, Debug)]
pub struct Generic;

impl KernelSet for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn is_supported(&self, _: CpuFeatures) -> bool {
        true
    }

    fn install(&self, b: &mut TableBuilder) {
        b.install_copy(CopyWidth::Bits8, copy::copy_8);
        b.install_copy(CopyWidth::Bits16, copy::copy_16);
        b.install_copy(CopyWidth::Bits24, copy::copy_24);
        b.install_copy(CopyWidth::Bits32, copy::copy_32);
        b.install_copy(CopyWidth::Bits48, copy::copy_48);
        b.install_copy(CopyWidth::Bits64, copy::copy_64);

        install_destination::<access::Prgb32>(b);
        install_destination::<access::Argb32>(b);
        install_destination::<access::Xrgb32>(b);
        install_destination::<access::Rgb24>(b);
        install_destination::<access::A8>(b);
        install_destination::<access::Prgb64>(b);
        install_destination::<access::Rgb48>(b);
        install_destination::<access::A16>(b);

        install_clear_indexed(b);
    }
}

fn install_destination<D: Store>(b: &mut TableBuilder) {
    install_operator::<D, blend::Source>(b);
    install_operator::<D, blend::SourceOver>(b);
    install_operator::<D, blend::SourceIn>(b);
    install_operator::<D, blend::SourceOut>(b);
    install_operator::<D, blend::SourceAtop>(b);
    install_operator::<D, blend::DestinationOver>(b);
    install_operator::<D, blend::DestinationIn>(b);
    install_operator::<D, blend::DestinationOut>(b);
    install_operator::<D, blend::DestinationAtop>(b);
    install_operator::<D, blend::Xor>(b);
    install_operator::<D, blend::Plus>(b);
    install_operator::<D, blend::Multiply>(b);
    install_operator::<D, blend::Screen>(b);
    install_operator::<D, blend::Darken>(b);
    install_operator::<D, blend::Lighten>(b);
    install_operator::<D, blend::Difference>(b);
    install_operator::<D, blend::Exclusion>(b);
    install_clear::<D>(b);
}

fn install_operator<D: Store, O: Blend>(b: &mut TableBuilder) {
    install_source::<D, access::Prgb32, O>(b);
    install_source::<D, access::Argb32, O>(b);
    install_source::<D, access::Xrgb32, O>(b);
    install_source::<D, access::Rgb24, O>(b);
    install_source::<D, access::A8, O>(b);
    install_source::<D, access::I8, O>(b);
    install_source::<D, access::Prgb64, O>(b);
    install_source::<D, access::Rgb48, O>(b);
    install_source::<D, access::A16, O>(b);
    install_solid::<D, O>(b);
}

fn install_source<D: Store, S: Fetch, O: Blend>(b: &mut TableBuilder)
where
    D::Depth: Join<S::Depth>,
{
    if !is_derived(D::FORMAT, O::OP, Slot::Line(S::FORMAT)) {
        b.install(D::FORMAT, O::OP, Kernel::Line(S::FORMAT, vblit_line::<WorkOf<D, S>, D, S, O>));
    }

    if !is_derived(D::FORMAT, O::OP, Slot::Span(S::FORMAT)) {
        b.install(D::FORMAT, O::OP, Kernel::Span(S::FORMAT, vblit_span::<WorkOf<D, S>, D, S, O>));
    }
}

fn install_solid<D: Store, O: Blend>(b: &mut TableBuilder) {
    b.install(D::FORMAT, O::OP, Kernel::SolidLine(SolidKind::Prgb, cblit_line::<WorkOf<D, D>, D, O>));
    b.install(D::FORMAT, O::OP, Kernel::SolidSpan(SolidKind::Prgb, cblit_span::<WorkOf<D, D>, D, O>));

    // An opaque source keeps the destination as is for DstIn and clears it for DstOut.
    match O::OP {
        CompositeOp::DstIn => {
            b.install(D::FORMAT, O::OP, Kernel::SolidLine(SolidKind::Xrgb, null_cblit_line));
            b.install(D::FORMAT, O::OP, Kernel::SolidSpan(SolidKind::Xrgb, null_cblit_span));
        }
        CompositeOp::DstOut => {
            b.install(D::FORMAT, O::OP, Kernel::SolidLine(SolidKind::Xrgb, clear_cblit_line::<D>));
            b.install(D::FORMAT, O::OP, Kernel::SolidSpan(SolidKind::Xrgb, clear_cblit_span::<WorkOf<D, D>, D>));
        }
        _ => {}
    }
}

/// `Clear` ignores the source, so only the first source slot is bound.
fn install_clear<D: Store>(b: &mut TableBuilder) {
    let op = CompositeOp::Clear;
    b.install(D::FORMAT, op, Kernel::Line(PixelFormat::Prgb32, clear_vblit_line::<D>));
    b.install(D::FORMAT, op, Kernel::Span(PixelFormat::Prgb32, clear_vblit_span::<WorkOf<D, D>, D>));
    b.install(D::FORMAT, op, Kernel::SolidLine(SolidKind::Prgb, clear_cblit_line::<D>));
    b.install(D::FORMAT, op, Kernel::SolidSpan(SolidKind::Prgb, clear_cblit_span::<WorkOf<D, D>, D>));
}

fn install_clear_indexed(b: &mut TableBuilder) {
    let format = PixelFormat::I8;
    let op = CompositeOp::Clear;
    b.install(format, op, Kernel::Line(PixelFormat::Prgb32, clear_vblit_line::<access::I8>));
    b.install(format, op, Kernel::Span(PixelFormat::Prgb32, clear_vblit_span_indexed));
    b.install(format, op, Kernel::SolidLine(SolidKind::Prgb, clear_cblit_line::<access::I8>));
    b.install(format, op, Kernel::SolidSpan(SolidKind::Prgb, clear_cblit_span_indexed));
}

fn vblit_line<P: Precision, D: Store, S: Fetch, O: Blend>(
    dst: &mut [u8],
    src: &[u8],
    len: usize,
    closure: &BlitClosure,
) {
    let dst_bpp = D::FORMAT.bytes_per_pixel();
    let src_bpp = S::FORMAT.bytes_per_pixel();
    let mut buf = [Pixel::default(); STAGE_WIDTH];

    let mut x = 0;
    while x < len {
        let n = STAGE_WIDTH.min(len - x);
        fetch_run::<P, S>(&src[x * src_bpp..(x + n) * src_bpp], &mut buf[..n], closure);
        composite_run::<P, D, O>(&mut dst[x * dst_bpp..(x + n) * dst_bpp], &buf[..n], None);
        x += n;
    }
}

fn vblit_span<P: Precision, D: Store, S: Fetch, O: Blend>(
    dst: &mut [u8],
    src: &[u8],
    mask: &[u8],
    len: usize,
    closure: &BlitClosure,
) {
    let dst_bpp = D::FORMAT.bytes_per_pixel();
    let src_bpp = S::FORMAT.bytes_per_pixel();
    let mut buf = [Pixel::default(); STAGE_WIDTH];

    let mut x = 0;
    while x < len {
        let n = STAGE_WIDTH.min(len - x);
        fetch_run::<P, S>(&src[x * src_bpp..(x + n) * src_bpp], &mut buf[..n], closure);
        composite_run::<P, D, O>(
            &mut dst[x * dst_bpp..(x + n) * dst_bpp],
            &buf[..n],
            Some(&mask[x..x + n]),
        );
        x += n;
    }
}

fn cblit_line<P: Precision, D: Store, O: Blend>(dst: &mut [u8], solid: &Solid, len: usize) {
    let bpp = D::FORMAT.bytes_per_pixel();
    let buf = [P::solid(solid); STAGE_WIDTH];

    let mut x = 0;
    while x < len {
        let n = STAGE_WIDTH.min(len - x);
        composite_run::<P, D, O>(&mut dst[x * bpp..(x + n) * bpp], &buf[..n], None);
        x += n;
    }
}

fn cblit_span<P: Precision, D: Store, O: Blend>(dst: &mut [u8], solid: &Solid, mask: &[u8], len: usize) {
    let bpp = D::FORMAT.bytes_per_pixel();
    let buf = [P::solid(solid); STAGE_WIDTH];

    let mut x = 0;
    while x < len {
        let n = STAGE_WIDTH.min(len - x);
        composite_run::<P, D, O>(&mut dst[x * bpp..(x + n) * bpp], &buf[..n], Some(&mask[x..x + n]));
        x += n;
    }
}

#[inline(always)]
fn fetch_run<P: Precision, S: Fetch>(src: &[u8], buf: &mut [Pixel], closure: &BlitClosure) {
    let bpp = S::FORMAT.bytes_per_pixel();
    for (px, data) in buf.iter_mut().zip(src.chunks_exact(bpp)) {
        *px = S::fetch::<P>(data, closure);
    }
}

/// Composites a chunk of source pixels onto `dst`.
///
/// Pixels with zero coverage are not touched at all,
/// so lossy formats are not changed by a load/store round trip.
#[inline(never)]
fn composite_run<P: Precision, D: Store, O: Blend>(dst: &mut [u8], src: &[Pixel], mask: Option<&[u8]>) {
    let m = Math::of::<P>();
    let bpp = D::FORMAT.bytes_per_pixel();
    for (i, (pixel, s)) in dst.chunks_exact_mut(bpp).zip(src).enumerate() {
        let coverage = mask.map_or(P::MAX, |mask| P::coverage(mask[i]));
        if coverage == 0 {
            continue;
        }

        let d = if O::READS_DST || coverage != P::MAX {
            D::fetch::<P>(pixel, &BlitClosure::EMPTY)
        } else {
            Pixel::default()
        };

        let mut r = O::blend(m, *s, d);
        if coverage != P::MAX {
            r = m.lerp_pixel(d, r, coverage);
        }

        D::store::<P>(pixel, r);
    }
}

fn clear_vblit_line<F: Fetch>(dst: &mut [u8], _: &[u8], len: usize, _: &BlitClosure) {
    clear_line::<F>(dst, len);
}

fn clear_vblit_span<P: Precision, D: Store>(dst: &mut [u8], _: &[u8], mask: &[u8], len: usize, _: &BlitClosure) {
    clear_span::<P, D>(dst, mask, len);
}

fn clear_cblit_line<F: Fetch>(dst: &mut [u8], _: &Solid, len: usize) {
    clear_line::<F>(dst, len);
}

fn clear_cblit_span<P: Precision, D: Store>(dst: &mut [u8], _: &Solid, mask: &[u8], len: usize) {
    clear_span::<P, D>(dst, mask, len);
}

fn clear_vblit_span_indexed(dst: &mut [u8], _: &[u8], mask: &[u8], len: usize, _: &BlitClosure) {
    clear_span_indexed(dst, mask, len);
}

fn clear_cblit_span_indexed(dst: &mut [u8], _: &Solid, mask: &[u8], len: usize) {
    clear_span_indexed(dst, mask, len);
}

fn clear_line<F: Fetch>(dst: &mut [u8], len: usize) {
    let pattern = F::FORMAT.clear_pixel();
    for pixel in dst[..len * pattern.len()].chunks_exact_mut(pattern.len()) {
        pixel.copy_from_slice(pattern);
    }
}

fn clear_span<P: Precision, D: Store>(dst: &mut [u8], mask: &[u8], len: usize) {
    let m = Math::of::<P>();
    let pattern = D::FORMAT.clear_pixel();
    let pixels = dst[..len * pattern.len()].chunks_exact_mut(pattern.len());
    for (pixel, coverage) in pixels.zip(&mask[..len]) {
        match *coverage {
            0 => {}
            255 => pixel.copy_from_slice(pattern),
            c => {
                let d = D::fetch::<P>(pixel, &BlitClosure::EMPTY);
                D::store::<P>(pixel, m.lerp_pixel(d, Pixel::default(), P::coverage(c)));
            }
        }
    }
}

/// Indices cannot be interpolated, so any coverage clears the pixel.
fn clear_span_indexed(dst: &mut [u8], mask: &[u8], len: usize) {
    for (pixel, coverage) in dst[..len].iter_mut().zip(&mask[..len]) {
        if *coverage != 0 {
            *pixel = 0;
        }
    }
}
