// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Raw same-format copies.

use super::BlitClosure;
use crate::PixelFormat;

/// Number of copy routines.
pub const COPY_WIDTH_COUNT: usize = 6;

/// A pixel width handled by a raw copy routine.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CopyWidth {
    /// 8-bit pixels.
    Bits8 = 0,
    /// 16-bit pixels.
    Bits16,
    /// 24-bit pixels.
    Bits24,
    /// 32-bit pixels.
    Bits32,
    /// 48-bit pixels.
    Bits48,
    /// 64-bit pixels.
    Bits64,
}

impl CopyWidth {
    /// All widths, in index order.
    pub const ALL: [CopyWidth; COPY_WIDTH_COUNT] = [
        CopyWidth::Bits8,
        CopyWidth::Bits16,
        CopyWidth::Bits24,
        CopyWidth::Bits32,
        CopyWidth::Bits48,
        CopyWidth::Bits64,
    ];

    /// Returns a copy width matching the format's pixel size.
    pub const fn for_format(format: PixelFormat) -> Self {
        match format.bits_per_pixel() {
            8 => CopyWidth::Bits8,
            16 => CopyWidth::Bits16,
            24 => CopyWidth::Bits24,
            32 => CopyWidth::Bits32,
            48 => CopyWidth::Bits48,
            _ => CopyWidth::Bits64,
        }
    }

    /// Returns width's index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the number of bytes per pixel.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            CopyWidth::Bits8 => 1,
            CopyWidth::Bits16 => 2,
            CopyWidth::Bits24 => 3,
            CopyWidth::Bits32 => 4,
            CopyWidth::Bits48 => 6,
            CopyWidth::Bits64 => 8,
        }
    }
}

macro_rules! copy_fn {
    ($name:ident, $bytes:expr) => {
        pub fn $name(dst: &mut [u8], src: &[u8], len: usize, _: &BlitClosure) {
            let n = len * $bytes;
            dst[..n].copy_from_slice(&src[..n]);
        }
    };
}

copy_fn!(copy_8, 1);
copy_fn!(copy_16, 2);
copy_fn!(copy_24, 3);
copy_fn!(copy_32, 4);
copy_fn!(copy_48, 6);
copy_fn!(copy_64, 8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        for format in PixelFormat::ALL.iter() {
            assert_eq!(CopyWidth::for_format(*format).bytes(), format.bytes_per_pixel());
        }

        for (i, width) in CopyWidth::ALL.iter().enumerate() {
            assert_eq!(width.index(), i);
        }
    }

    #[test]
    fn copy_leaves_the_rest() {
        let src = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut dst = [0; 9];
        copy_24(&mut dst, &src, 2, &BlitClosure::EMPTY);
        assert_eq!(dst, [1, 2, 3, 4, 5, 6, 0, 0, 0]);
    }
}
