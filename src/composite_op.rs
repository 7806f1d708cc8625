// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/// Number of compositing operators.
pub const OPERATOR_COUNT: usize = 18;

/// A compositing operator.
///
/// All formulas operate on premultiplied colors.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum CompositeOp {
    /// Replaces destination.
    Src = 0,
    /// Source over destination.
    SrcOver,
    /// Source trimmed inside destination.
    SrcIn,
    /// Source trimmed outside destination.
    SrcOut,
    /// Source inside destination blended with destination.
    SrcAtop,
    /// Destination over source.
    DstOver,
    /// Destination trimmed by source.
    DstIn,
    /// Destination trimmed outside source.
    DstOut,
    /// Destination inside source blended with source.
    DstAtop,
    /// Each of source and destination trimmed outside the other.
    Xor,
    /// Replaces destination with the format's clear pixel.
    Clear,
    /// Sum of colors.
    Add,
    /// Multiply source with destination, darkening image.
    Multiply,
    /// Multiply inverse of pixels, inverting result; brightens destination.
    Screen,
    /// Darker of source and destination.
    Darken,
    /// Lighter of source and destination.
    Lighten,
    /// Subtract darker from lighter with higher contrast.
    Difference,
    /// Subtract darker from lighter with lower contrast.
    Exclusion,
}

impl CompositeOp {
    /// All operators, in index order.
    pub const ALL: [CompositeOp; OPERATOR_COUNT] = [
        CompositeOp::Src,
        CompositeOp::SrcOver,
        CompositeOp::SrcIn,
        CompositeOp::SrcOut,
        CompositeOp::SrcAtop,
        CompositeOp::DstOver,
        CompositeOp::DstIn,
        CompositeOp::DstOut,
        CompositeOp::DstAtop,
        CompositeOp::Xor,
        CompositeOp::Clear,
        CompositeOp::Add,
        CompositeOp::Multiply,
        CompositeOp::Screen,
        CompositeOp::Darken,
        CompositeOp::Lighten,
        CompositeOp::Difference,
        CompositeOp::Exclusion,
    ];

    /// Operators every paintable format must support.
    pub const CORE: [CompositeOp; 2] = [CompositeOp::Src, CompositeOp::SrcOver];

    /// Returns operator's index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns an operator by its index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Checks that operator belongs to the core subset.
    #[inline]
    pub const fn is_core(self) -> bool {
        matches!(self, CompositeOp::Src | CompositeOp::SrcOver)
    }
}

impl Default for CompositeOp {
    fn default() -> Self {
        CompositeOp::SrcOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_stable() {
        for (i, op) in CompositeOp::ALL.iter().enumerate() {
            assert_eq!(op.index(), i);
            assert_eq!(CompositeOp::from_index(i), Some(*op));
        }

        assert_eq!(CompositeOp::from_index(OPERATOR_COUNT), None);
    }

    #[test]
    fn core_subset() {
        let core: Vec<_> = CompositeOp::ALL.iter().filter(|op| op.is_core()).collect();
        assert_eq!(core, [&CompositeOp::Src, &CompositeOp::SrcOver]);
    }
}
