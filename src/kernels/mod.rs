// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/*!
Blit kernels.

A kernel composites `len` pixels of a single row. There are four kernel kinds:

1. A line kernel: `dst = op(src, dst)` for every pixel.
1. A span kernel: the same, but the result is interpolated with the destination
   using a per-pixel coverage mask. 0 leaves the pixel untouched, 255 stores the full result.
1. A solid line kernel: like a line kernel, but the source is a single color.
1. A solid span kernel: a solid line kernel with a coverage mask.

Kernels are plain function pointers. They do not allocate and do not fail.
Slices must be large enough for `len` pixels, otherwise a kernel will panic.

The portable kernels live in `generic`. They are generated from a small set of
building blocks: pixel access (`access`), working precision (`precision`)
and operator math (`blend`). `wide` is an accelerated set for the most common
8-bit combinations. `copy` contains raw same-format copies.
*/

use crate::{CpuFeatures, Palette, Solid, TableBuilder};

mod access;
mod blend;
mod copy;
pub mod generic;
mod precision;
pub mod wide;

pub use copy::{CopyWidth, COPY_WIDTH_COUNT};

/// Number of pixels processed by a kernel at once.
pub const STAGE_WIDTH: usize = 16;

/// Composites a source row onto a destination row.
pub type VBlitLineFn = fn(dst: &mut [u8], src: &[u8], len: usize, closure: &BlitClosure);

/// Composites a source row onto a destination row using a coverage mask.
pub type VBlitSpanFn = fn(dst: &mut [u8], src: &[u8], mask: &[u8], len: usize, closure: &BlitClosure);

/// Composites a solid color onto a destination row.
pub type CBlitLineFn = fn(dst: &mut [u8], solid: &Solid, len: usize);

/// Composites a solid color onto a destination row using a coverage mask.
pub type CBlitSpanFn = fn(dst: &mut [u8], solid: &Solid, mask: &[u8], len: usize);

/// Per-call data for source kernels.
#[derive(Clone, Copy, Default, Debug)]
pub struct BlitClosure<'a> {
    /// A palette of an `I8` source.
    pub palette: Option<&'a Palette>,
}

impl<'a> BlitClosure<'a> {
    /// A closure without a palette.
    pub const EMPTY: BlitClosure<'static> = BlitClosure { palette: None };

    /// Creates a closure for an `I8` source.
    pub fn with_palette(palette: &'a Palette) -> Self {
        BlitClosure { palette: Some(palette) }
    }
}

/// A group of kernels installed into a table in one go.
///
/// The baseline set must cover every core combination.
/// Accelerated sets override a subset of it and must produce identical results.
pub trait KernelSet: Sync {
    /// Returns set's name. Used only for logging.
    fn name(&self) -> &'static str;

    /// Checks that the set can run on a CPU with the provided features.
    fn is_supported(&self, features: CpuFeatures) -> bool;

    /// Installs set's kernels.
    fn install(&self, builder: &mut TableBuilder);
}

/// A kernel that does nothing.
///
/// Used for operators that leave the destination as is.
pub fn null_cblit_line(_: &mut [u8], _: &Solid, _: usize) {}

/// A masked kernel that does nothing.
pub fn null_cblit_span(_: &mut [u8], _: &Solid, _: &[u8], _: usize) {}
