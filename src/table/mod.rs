// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/*!
The kernel table.

A table stores a kernel for every destination format, compositing operator
and source slot:

```text
table[destination][operator].vblit_line[source]
table[destination][operator].vblit_span[source]
table[destination][operator].cblit_line[solid kind]
table[destination][operator].cblit_span[solid kind]
```

The table is built by `TableBuilder` in four ordered phases:

1. The generic kernel set is installed.
1. Accelerated kernel sets supported by the current CPU override parts of it.
1. The remaining slots are derived from existing ones by aliasing.
   See `derive.rs` for the rules.
1. The convert table is aliased from the finished table.

Once built, the table is immutable and can be shared between threads.
*/

use arrayvec::ArrayVec;
use once_cell::sync::OnceCell;

use crate::kernels::{CBlitLineFn, CBlitSpanFn, VBlitLineFn, VBlitSpanFn};
use crate::{CompositeOp, CopyWidth, CpuFeatures, PixelFormat, SolidKind};
use crate::{COPY_WIDTH_COUNT, FORMAT_COUNT, OPERATOR_COUNT, SOLID_KIND_COUNT};

mod builder;
mod convert;
pub(crate) mod derive;

pub use builder::{BuildError, TableBuilder};
pub use convert::{Canonical, ConvertTable};

/// Maximum number of kernel sets a table can be built from.
pub(crate) const MAX_KERNEL_SETS: usize = 4;

/// A kernel variant.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BlitVariant {
    /// A source row.
    Line,
    /// A source row with a coverage mask.
    Span,
    /// A solid color.
    SolidLine,
    /// A solid color with a coverage mask.
    SolidSpan,
}

/// A kernel slot inside `CompositeFuncs`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Slot {
    /// A source row of the specified format.
    Line(PixelFormat),
    /// A masked source row of the specified format.
    Span(PixelFormat),
    /// A solid color of the specified kind.
    SolidLine(SolidKind),
    /// A masked solid color of the specified kind.
    SolidSpan(SolidKind),
}

impl Slot {
    /// Returns slot's variant.
    pub fn variant(self) -> BlitVariant {
        match self {
            Slot::Line(_) => BlitVariant::Line,
            Slot::Span(_) => BlitVariant::Span,
            Slot::SolidLine(_) => BlitVariant::SolidLine,
            Slot::SolidSpan(_) => BlitVariant::SolidSpan,
        }
    }
}

/// A kernel bound to a slot.
#[derive(Copy, Clone)]
pub enum Kernel {
    /// A line kernel for a source format.
    Line(PixelFormat, VBlitLineFn),
    /// A span kernel for a source format.
    Span(PixelFormat, VBlitSpanFn),
    /// A solid line kernel for a color kind.
    SolidLine(SolidKind, CBlitLineFn),
    /// A solid span kernel for a color kind.
    SolidSpan(SolidKind, CBlitSpanFn),
}

impl Kernel {
    /// Returns kernel's slot.
    pub fn slot(&self) -> Slot {
        match *self {
            Kernel::Line(format, _) => Slot::Line(format),
            Kernel::Span(format, _) => Slot::Span(format),
            Kernel::SolidLine(kind, _) => Slot::SolidLine(kind),
            Kernel::SolidSpan(kind, _) => Slot::SolidSpan(kind),
        }
    }

    /// Returns kernel's address.
    ///
    /// Two slots alias the same kernel when addresses are equal.
    pub fn addr(&self) -> *const () {
        match *self {
            Kernel::Line(_, f) => f as *const (),
            Kernel::Span(_, f) => f as *const (),
            Kernel::SolidLine(_, f) => f as *const (),
            Kernel::SolidSpan(_, f) => f as *const (),
        }
    }
}

impl core::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Kernel")
            .field("slot", &self.slot())
            .field("addr", &self.addr())
            .finish()
    }
}

/// Kernels of a single destination format and operator.
#[derive(Copy, Clone, Default)]
pub struct CompositeFuncs {
    /// Line kernels, indexed by source format.
    pub vblit_line: [Option<VBlitLineFn>; FORMAT_COUNT],
    /// Span kernels, indexed by source format.
    pub vblit_span: [Option<VBlitSpanFn>; FORMAT_COUNT],
    /// Solid line kernels, indexed by solid kind.
    pub cblit_line: [Option<CBlitLineFn>; SOLID_KIND_COUNT],
    /// Solid span kernels, indexed by solid kind.
    pub cblit_span: [Option<CBlitSpanFn>; SOLID_KIND_COUNT],
}

impl CompositeFuncs {
    /// Returns a kernel bound to a slot.
    pub fn get(&self, slot: Slot) -> Option<Kernel> {
        match slot {
            Slot::Line(format) => self.vblit_line[format.index()].map(|f| Kernel::Line(format, f)),
            Slot::Span(format) => self.vblit_span[format.index()].map(|f| Kernel::Span(format, f)),
            Slot::SolidLine(kind) => self.cblit_line[kind.index()].map(|f| Kernel::SolidLine(kind, f)),
            Slot::SolidSpan(kind) => self.cblit_span[kind.index()].map(|f| Kernel::SolidSpan(kind, f)),
        }
    }

    /// Binds a kernel to its slot.
    pub fn set(&mut self, kernel: Kernel) {
        match kernel {
            Kernel::Line(format, f) => self.vblit_line[format.index()] = Some(f),
            Kernel::Span(format, f) => self.vblit_span[format.index()] = Some(f),
            Kernel::SolidLine(kind, f) => self.cblit_line[kind.index()] = Some(f),
            Kernel::SolidSpan(kind, f) => self.cblit_span[kind.index()] = Some(f),
        }
    }

    /// Returns the number of bound slots.
    pub fn len(&self) -> usize {
        self.vblit_line.iter().filter(|f| f.is_some()).count()
            + self.vblit_span.iter().filter(|f| f.is_some()).count()
            + self.cblit_line.iter().filter(|f| f.is_some()).count()
            + self.cblit_span.iter().filter(|f| f.is_some()).count()
    }

    /// Checks that no slot is bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl core::fmt::Debug for CompositeFuncs {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompositeFuncs")
            .field("bound", &self.len())
            .finish()
    }
}

pub(crate) type FuncsTable = [[CompositeFuncs; OPERATOR_COUNT]; FORMAT_COUNT];

/// An immutable kernel table.
pub struct KernelTable {
    funcs: Box<FuncsTable>,
    copy: [VBlitLineFn; COPY_WIDTH_COUNT],
    convert: ConvertTable,
    kernel_sets: ArrayVec<&'static str, MAX_KERNEL_SETS>,
    features: CpuFeatures,
}

static GLOBAL: OnceCell<KernelTable> = OnceCell::new();

fn get_or_build(
    cell: &OnceCell<KernelTable>,
    build: impl FnOnce() -> Result<KernelTable, BuildError>,
) -> &KernelTable {
    cell.get_or_init(|| match build() {
        Ok(table) => table,
        Err(e) => {
            log::error!("Failed to initialize the kernel table: {}.", e);
            eprintln!("tiny-blit: failed to initialize the kernel table: {}", e);
            std::process::abort()
        }
    })
}

impl KernelTable {
    /// Returns the process-wide table.
    ///
    /// The table is built on first use for the current CPU.
    /// All following calls return the same table.
    ///
    /// # Aborts
    ///
    /// When the table cannot be built. This can happen only when
    /// the shipped kernel sets do not cover the core operators, which is a bug.
    /// The process is aborted instead of panicking, so a caught panic
    /// can never lead to a second build attempt.
    pub fn global() -> &'static KernelTable {
        get_or_build(&GLOBAL, || TableBuilder::new(CpuFeatures::detect()).build())
    }

    /// Returns kernels of a destination format and operator.
    #[inline]
    pub fn funcs(&self, dst: PixelFormat, op: CompositeOp) -> &CompositeFuncs {
        &self.funcs[dst.index()][op.index()]
    }

    /// Returns a kernel bound to a slot.
    ///
    /// Returns `None` for combinations outside the supported matrix.
    #[inline]
    pub fn lookup(&self, dst: PixelFormat, op: CompositeOp, slot: Slot) -> Option<Kernel> {
        self.funcs(dst, op).get(slot)
    }

    /// Returns a line kernel.
    #[inline]
    pub fn vblit_line(&self, dst: PixelFormat, op: CompositeOp, src: PixelFormat) -> Option<VBlitLineFn> {
        self.funcs(dst, op).vblit_line[src.index()]
    }

    /// Returns a span kernel.
    #[inline]
    pub fn vblit_span(&self, dst: PixelFormat, op: CompositeOp, src: PixelFormat) -> Option<VBlitSpanFn> {
        self.funcs(dst, op).vblit_span[src.index()]
    }

    /// Returns a solid line kernel.
    #[inline]
    pub fn cblit_line(&self, dst: PixelFormat, op: CompositeOp, kind: SolidKind) -> Option<CBlitLineFn> {
        self.funcs(dst, op).cblit_line[kind.index()]
    }

    /// Returns a solid span kernel.
    #[inline]
    pub fn cblit_span(&self, dst: PixelFormat, op: CompositeOp, kind: SolidKind) -> Option<CBlitSpanFn> {
        self.funcs(dst, op).cblit_span[kind.index()]
    }

    /// Returns a raw copy routine.
    #[inline]
    pub fn copy(&self, width: CopyWidth) -> VBlitLineFn {
        self.copy[width.index()]
    }

    /// Returns the convert table.
    #[inline]
    pub fn convert(&self) -> &ConvertTable {
        &self.convert
    }

    /// Returns names of kernel sets the table was built from, in install order.
    pub fn kernel_sets(&self) -> &[&'static str] {
        &self.kernel_sets
    }

    /// Returns CPU features the table was built for.
    pub fn features(&self) -> CpuFeatures {
        self.features
    }
}

impl core::fmt::Debug for KernelTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KernelTable")
            .field("kernel_sets", &self.kernel_sets)
            .field("features", &self.features)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::BlitClosure;

    #[test]
    fn slot_variants() {
        assert_eq!(Slot::Line(PixelFormat::A8).variant(), BlitVariant::Line);
        assert_eq!(Slot::SolidSpan(SolidKind::Xrgb).variant(), BlitVariant::SolidSpan);
    }

    #[test]
    fn funcs_set_get() {
        fn noop(_: &mut [u8], _: &[u8], _: usize, _: &BlitClosure) {}

        let mut funcs = CompositeFuncs::default();
        assert!(funcs.is_empty());

        funcs.set(Kernel::Line(PixelFormat::Rgb24, noop));
        let kernel = funcs.get(Slot::Line(PixelFormat::Rgb24)).unwrap();
        assert_eq!(kernel.slot(), Slot::Line(PixelFormat::Rgb24));
        assert_eq!(kernel.addr(), noop as VBlitLineFn as *const ());
        assert!(funcs.get(Slot::Span(PixelFormat::Rgb24)).is_none());
        assert_eq!(funcs.len(), 1);
    }

    #[test]
    fn global_is_published_once() {
        let t1 = KernelTable::global();
        let t2 = KernelTable::global();
        assert!(core::ptr::eq(t1, t2));
        assert_eq!(t1.kernel_sets().first(), Some(&"generic"));
    }

    #[test]
    fn published_table_is_reused() {
        let cell = OnceCell::new();
        let t1 = get_or_build(&cell, || TableBuilder::new(CpuFeatures::empty()).build());
        let t2 = get_or_build(&cell, || Err(BuildError::TooManyKernelSets));
        assert!(core::ptr::eq(t1, t2));
    }

    const ABORT_CHILD_ENV: &str = "TINY_BLIT_BUILD_FAILURE_CHILD";

    // Runs itself in a child process, which must die instead of unwinding.
    #[test]
    fn failed_build_aborts() {
        if std::env::var_os(ABORT_CHILD_ENV).is_some() {
            let cell = OnceCell::new();
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                get_or_build(&cell, || Err(BuildError::TooManyKernelSets));
            }));
            // Reached only when the failure unwinds.
            std::process::exit(0);
        }

        let exe = std::env::current_exe().unwrap();
        let output = std::process::Command::new(exe)
            .args(["--exact", "table::tests::failed_build_aborts", "--test-threads=1", "--nocapture"])
            .env(ABORT_CHILD_ENV, "1")
            .output()
            .unwrap();

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("failed to initialize the kernel table"));

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            assert_eq!(output.status.signal(), Some(6));
        }
    }
}
