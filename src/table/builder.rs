// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use arrayvec::ArrayVec;

use super::{derive, CompositeFuncs, ConvertTable, FuncsTable, Kernel, KernelTable, Slot, MAX_KERNEL_SETS};
use crate::kernels::generic::Generic;
use crate::kernels::wide::Wide;
use crate::kernels::{KernelSet, VBlitLineFn};
use crate::{CompositeOp, CopyWidth, CpuFeatures, PixelFormat, SolidKind};
use crate::{COPY_WIDTH_COUNT, FORMAT_COUNT, OPERATOR_COUNT};

/// A table build error.
///
/// Every error means that the installed kernel sets are incomplete.
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum BuildError {
    /// A core operator kernel is missing.
    #[error("no {slot:?} kernel for {op:?} onto {format}")]
    MissingCoreKernel {
        /// Destination format.
        format: PixelFormat,
        /// Operator.
        op: CompositeOp,
        /// The empty slot.
        slot: Slot,
    },

    /// A raw copy routine is missing.
    #[error("no {0:?} copy routine")]
    MissingCopy(CopyWidth),

    /// A same-format copy is missing after derivation.
    #[error("no same-format copy for {0}")]
    MissingSelfCopy(PixelFormat),

    /// A conversion source slot is empty.
    #[error("no conversion kernel for {0}")]
    MissingConversion(PixelFormat),

    /// Too many kernel sets were provided.
    #[error("too many kernel sets")]
    TooManyKernelSets,
}

/// A kernel table builder.
///
/// # Example
///
/// ```
/// use tiny_blit::{CpuFeatures, TableBuilder};
///
/// // A portable table that doesn't use any accelerated kernels.
/// let table = TableBuilder::new(CpuFeatures::empty()).build().unwrap();
/// assert_eq!(table.kernel_sets(), &["generic"]);
/// ```
pub struct TableBuilder {
    funcs: Box<FuncsTable>,
    copy: [Option<VBlitLineFn>; COPY_WIDTH_COUNT],
    features: CpuFeatures,
    kernel_sets: ArrayVec<&'static str, MAX_KERNEL_SETS>,
}

impl TableBuilder {
    /// Creates an empty builder for a CPU with the provided features.
    pub fn new(features: CpuFeatures) -> Self {
        TableBuilder {
            funcs: Box::new([[CompositeFuncs::default(); OPERATOR_COUNT]; FORMAT_COUNT]),
            copy: [None; COPY_WIDTH_COUNT],
            features,
            kernel_sets: ArrayVec::new(),
        }
    }

    /// Returns CPU features the table is built for.
    pub fn features(&self) -> CpuFeatures {
        self.features
    }

    /// Binds a kernel to a slot, replacing the previous one.
    #[inline]
    pub fn install(&mut self, dst: PixelFormat, op: CompositeOp, kernel: Kernel) {
        self.funcs[dst.index()][op.index()].set(kernel);
    }

    /// Binds a raw copy routine.
    #[inline]
    pub fn install_copy(&mut self, width: CopyWidth, f: VBlitLineFn) {
        self.copy[width.index()] = Some(f);
    }

    /// Returns a kernel bound to a slot.
    #[inline]
    pub fn get(&self, dst: PixelFormat, op: CompositeOp, slot: Slot) -> Option<Kernel> {
        self.funcs[dst.index()][op.index()].get(slot)
    }

    /// Returns a raw copy routine.
    #[inline]
    pub fn copy(&self, width: CopyWidth) -> Option<VBlitLineFn> {
        self.copy[width.index()]
    }

    pub(crate) fn funcs_mut(&mut self, dst: PixelFormat, op: CompositeOp) -> &mut CompositeFuncs {
        &mut self.funcs[dst.index()][op.index()]
    }

    /// Builds a table using the shipped kernel sets.
    pub fn build(self) -> Result<KernelTable, BuildError> {
        self.build_with(&Generic, &[&Wide])
    }

    /// Builds a table from custom kernel sets.
    ///
    /// `baseline` is always installed and must cover every core operator.
    /// `accelerated` sets are installed in order when supported by the CPU.
    pub fn build_with(
        mut self,
        baseline: &dyn KernelSet,
        accelerated: &[&dyn KernelSet],
    ) -> Result<KernelTable, BuildError> {
        self.apply(baseline)?;
        self.check_core()?;

        let mut any_accelerated = false;
        for set in accelerated {
            if set.is_supported(self.features) {
                self.apply(*set)?;
                any_accelerated = true;
            } else {
                log::debug!("Kernel set '{}' is not supported by {:?}.", set.name(), self.features);
            }
        }

        if cfg!(feature = "simd") && !accelerated.is_empty() && !any_accelerated {
            log::warn!("No accelerated kernel set matches {:?}. Using generic kernels only.", self.features);
        }

        let stats = derive::run(&mut self)?;
        log::debug!(
            "Derived {} copy, {} opaque, {} clear and {} solid slots.",
            stats.copies,
            stats.opaque,
            stats.clear,
            stats.solids
        );

        let convert = ConvertTable::new(&self.funcs)?;
        log::debug!("Kernel table is ready. Kernel sets: {:?}.", self.kernel_sets);

        let mut copy: ArrayVec<VBlitLineFn, COPY_WIDTH_COUNT> = ArrayVec::new();
        for width in CopyWidth::ALL.iter() {
            copy.push(self.copy(*width).ok_or(BuildError::MissingCopy(*width))?);
        }
        let copy = copy.into_inner().map_err(|_| BuildError::MissingCopy(CopyWidth::Bits64))?;

        Ok(KernelTable {
            funcs: self.funcs,
            copy,
            convert,
            kernel_sets: self.kernel_sets,
            features: self.features,
        })
    }

    fn apply(&mut self, set: &dyn KernelSet) -> Result<(), BuildError> {
        log::debug!("Installing '{}' kernel set.", set.name());
        self.kernel_sets.try_push(set.name()).map_err(|_| BuildError::TooManyKernelSets)?;
        set.install(self);
        Ok(())
    }

    /// Checks that every paintable format has all core kernels,
    /// except the ones the derivation pass will fill.
    fn check_core(&self) -> Result<(), BuildError> {
        for width in CopyWidth::ALL.iter() {
            if self.copy(*width).is_none() {
                return Err(BuildError::MissingCopy(*width));
            }
        }

        for format in PixelFormat::ALL.iter().filter(|f| f.is_paintable()) {
            for op in CompositeOp::CORE.iter() {
                let slots = PixelFormat::ALL.iter()
                    .flat_map(|src| [Slot::Line(*src), Slot::Span(*src)])
                    .chain([Slot::SolidLine(SolidKind::Prgb), Slot::SolidSpan(SolidKind::Prgb)]);

                for slot in slots {
                    if derive::is_derived(*format, *op, slot) {
                        continue;
                    }

                    if self.get(*format, *op, slot).is_none() {
                        return Err(BuildError::MissingCoreKernel { format: *format, op: *op, slot });
                    }
                }
            }
        }

        Ok(())
    }
}

impl core::fmt::Debug for TableBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TableBuilder")
            .field("kernel_sets", &self.kernel_sets)
            .field("features", &self.features)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;

    impl KernelSet for Empty {
        fn name(&self) -> &'static str {
            "empty"
        }

        fn is_supported(&self, _: CpuFeatures) -> bool {
            true
        }

        fn install(&self, _: &mut TableBuilder) {}
    }

    struct Unsupported;

    impl KernelSet for Unsupported {
        fn name(&self) -> &'static str {
            "unsupported"
        }

        fn is_supported(&self, _: CpuFeatures) -> bool {
            false
        }

        fn install(&self, _: &mut TableBuilder) {
            panic!("must not be installed");
        }
    }

    #[test]
    fn empty_baseline_is_an_error() {
        let res = TableBuilder::new(CpuFeatures::empty()).build_with(&Empty, &[]);
        assert_eq!(res.err(), Some(BuildError::MissingCopy(CopyWidth::Bits8)));
    }

    #[test]
    fn missing_core_kernel() {
        struct Partial;

        impl KernelSet for Partial {
            fn name(&self) -> &'static str {
                "partial"
            }

            fn is_supported(&self, _: CpuFeatures) -> bool {
                true
            }

            fn install(&self, b: &mut TableBuilder) {
                Generic.install(b);
                b.funcs_mut(PixelFormat::Rgb48, CompositeOp::SrcOver).vblit_span[PixelFormat::A8.index()] = None;
            }
        }

        let res = TableBuilder::new(CpuFeatures::empty()).build_with(&Partial, &[]);
        assert_eq!(res.err(), Some(BuildError::MissingCoreKernel {
            format: PixelFormat::Rgb48,
            op: CompositeOp::SrcOver,
            slot: Slot::Span(PixelFormat::A8),
        }));
    }

    #[test]
    fn unsupported_sets_are_skipped() {
        let table = TableBuilder::new(CpuFeatures::all())
            .build_with(&Generic, &[&Unsupported])
            .unwrap();
        assert_eq!(table.kernel_sets(), &["generic"]);
    }

    #[test]
    fn portable_table() {
        let table = TableBuilder::new(CpuFeatures::empty()).build().unwrap();
        assert_eq!(table.kernel_sets(), &["generic"]);
        assert_eq!(table.features(), CpuFeatures::empty());
    }

    #[cfg(feature = "simd")]
    #[test]
    fn accelerated_table() {
        let table = TableBuilder::new(CpuFeatures::SSE2).build().unwrap();
        assert_eq!(table.kernel_sets(), &["generic", "wide"]);
    }

    #[test]
    fn install_overrides() {
        fn noop(_: &mut [u8], _: &crate::Solid, _: usize) {}

        let mut b = TableBuilder::new(CpuFeatures::empty());
        Generic.install(&mut b);
        let slot = Slot::SolidLine(SolidKind::Prgb);
        let before = b.get(PixelFormat::A8, CompositeOp::Xor, slot).unwrap();
        b.install(PixelFormat::A8, CompositeOp::Xor, Kernel::SolidLine(SolidKind::Prgb, noop));
        let after = b.get(PixelFormat::A8, CompositeOp::Xor, slot).unwrap();
        assert_ne!(before.addr(), after.addr());
        assert_eq!(after.addr(), noop as crate::CBlitLineFn as *const ());
    }
}
