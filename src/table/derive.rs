// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/*!
Slot derivation.

Some slots are never installed by kernel sets. They alias other kernels instead:

1. `Src` of a source with the same format as the destination is a raw copy.
1. `Src` and `SrcOver` of an opaque solid color alias `Src` of a premultiplied one.
1. `SrcOver` of an opaque source format aliases `Src` of the same source.
1. `Clear` ignores the source, so every source slot aliases the first one.
1. Other operators use the premultiplied solid kernels for opaque solids,
   unless a kernel set has installed a specialization.

Derivation runs after all kernel sets, therefore accelerated kernels
are propagated to the aliased slots as well.
*/

use super::{BuildError, Kernel, Slot, TableBuilder};
use crate::{CompositeOp, CopyWidth, PixelFormat, SolidKind};

/// Checks that a slot is filled by derivation and must not be installed by kernel sets.
pub(crate) fn is_derived(dst: PixelFormat, op: CompositeOp, slot: Slot) -> bool {
    match (op, slot) {
        (CompositeOp::Src, Slot::Line(src)) => src == dst,
        (CompositeOp::Src, Slot::SolidLine(SolidKind::Xrgb))
        | (CompositeOp::Src, Slot::SolidSpan(SolidKind::Xrgb)) => true,
        (CompositeOp::SrcOver, Slot::Line(src))
        | (CompositeOp::SrcOver, Slot::Span(src)) => src.is_opaque(),
        (CompositeOp::SrcOver, Slot::SolidLine(SolidKind::Xrgb))
        | (CompositeOp::SrcOver, Slot::SolidSpan(SolidKind::Xrgb)) => true,
        (CompositeOp::Clear, Slot::Line(src))
        | (CompositeOp::Clear, Slot::Span(src)) => src != PixelFormat::Prgb32,
        _ => false,
    }
}

/// Number of slots filled by each rule.
#[derive(Clone, Copy, Default, Debug)]
pub(crate) struct Stats {
    pub copies: usize,
    pub opaque: usize,
    pub clear: usize,
    pub solids: usize,
}

/// Runs all derivation rules and checks the result.
pub(crate) fn run(b: &mut TableBuilder) -> Result<Stats, BuildError> {
    let mut stats = Stats::default();
    stats.copies = derive_copies(b);
    stats.opaque = derive_opaque(b);
    stats.clear = derive_clear(b);
    stats.solids = derive_solids(b);
    check(b)?;
    Ok(stats)
}

fn derive_copies(b: &mut TableBuilder) -> usize {
    let mut count = 0;
    for format in PixelFormat::ALL.iter() {
        if let Some(f) = b.copy(CopyWidth::for_format(*format)) {
            b.install(*format, CompositeOp::Src, Kernel::Line(*format, f));
            count += 1;
        }
    }

    count
}

fn derive_opaque(b: &mut TableBuilder) -> usize {
    let mut count = 0;
    let xrgb = SolidKind::Xrgb.index();
    let prgb = SolidKind::Prgb.index();
    for dst in PixelFormat::ALL.iter() {
        let src_funcs = *b.funcs_mut(*dst, CompositeOp::Src);
        if src_funcs.cblit_line[prgb].is_none() {
            continue;
        }

        for op in [CompositeOp::Src, CompositeOp::SrcOver] {
            let funcs = b.funcs_mut(*dst, op);
            funcs.cblit_line[xrgb] = src_funcs.cblit_line[prgb];
            funcs.cblit_span[xrgb] = src_funcs.cblit_span[prgb];
            count += 2;
        }

        let over = b.funcs_mut(*dst, CompositeOp::SrcOver);
        for src in PixelFormat::ALL.iter().filter(|f| f.is_opaque()) {
            let i = src.index();
            if src_funcs.vblit_line[i].is_some() {
                over.vblit_line[i] = src_funcs.vblit_line[i];
                count += 1;
            }

            if src_funcs.vblit_span[i].is_some() {
                over.vblit_span[i] = src_funcs.vblit_span[i];
                count += 1;
            }
        }
    }

    count
}

fn derive_clear(b: &mut TableBuilder) -> usize {
    let mut count = 0;
    for dst in PixelFormat::ALL.iter() {
        let funcs = b.funcs_mut(*dst, CompositeOp::Clear);
        let first = PixelFormat::Prgb32.index();
        let line = funcs.vblit_line[first];
        let span = funcs.vblit_span[first];
        if line.is_none() && span.is_none() {
            continue;
        }

        for src in PixelFormat::ALL.iter().filter(|f| **f != PixelFormat::Prgb32) {
            funcs.vblit_line[src.index()] = line;
            funcs.vblit_span[src.index()] = span;
            count += 2;
        }
    }

    count
}

fn derive_solids(b: &mut TableBuilder) -> usize {
    let mut count = 0;
    let xrgb = SolidKind::Xrgb.index();
    let prgb = SolidKind::Prgb.index();
    for dst in PixelFormat::ALL.iter() {
        for op in CompositeOp::ALL.iter().filter(|op| !op.is_core()) {
            let funcs = b.funcs_mut(*dst, *op);
            if funcs.cblit_line[xrgb].is_none() && funcs.cblit_line[prgb].is_some() {
                funcs.cblit_line[xrgb] = funcs.cblit_line[prgb];
                count += 1;
            }

            if funcs.cblit_span[xrgb].is_none() && funcs.cblit_span[prgb].is_some() {
                funcs.cblit_span[xrgb] = funcs.cblit_span[prgb];
                count += 1;
            }
        }
    }

    count
}

/// Checks that every format can be copied onto itself and that
/// paintable formats have every core slot bound.
fn check(b: &TableBuilder) -> Result<(), BuildError> {
    for format in PixelFormat::ALL.iter() {
        if b.get(*format, CompositeOp::Src, Slot::Line(*format)).is_none() {
            return Err(BuildError::MissingSelfCopy(*format));
        }
    }

    for format in PixelFormat::ALL.iter().filter(|f| f.is_paintable()) {
        for op in CompositeOp::CORE.iter() {
            let slots = PixelFormat::ALL.iter()
                .flat_map(|src| [Slot::Line(*src), Slot::Span(*src)])
                .chain(SolidKind::ALL.iter().flat_map(|k| [Slot::SolidLine(*k), Slot::SolidSpan(*k)]));

            for slot in slots {
                if b.get(*format, *op, slot).is_none() {
                    return Err(BuildError::MissingCoreKernel { format: *format, op: *op, slot });
                }
            }
        }
    }

    Ok(())
}
