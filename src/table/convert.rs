// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use super::{BuildError, FuncsTable};
use crate::kernels::VBlitLineFn;
use crate::{CompositeOp, PixelFormat, FORMAT_COUNT};

/// A canonical format used as a conversion hub.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Canonical {
    /// 32-bit premultiplied ARGB.
    Argb32,
    /// 64-bit premultiplied ARGB.
    Argb64,
}

impl Canonical {
    /// Returns a pixel format of the canonical representation.
    pub fn format(self) -> PixelFormat {
        match self {
            Canonical::Argb32 => PixelFormat::Prgb32,
            Canonical::Argb64 => PixelFormat::Prgb64,
        }
    }

    /// Returns a canonical format matching the format's depth.
    pub fn for_format(format: PixelFormat) -> Self {
        match format.depth() {
            crate::Depth::Bits8 => Canonical::Argb32,
            crate::Depth::Bits16 => Canonical::Argb64,
        }
    }
}

/// Row converters to and from canonical formats.
///
/// Has no kernels of its own. Every entry is a `Src` kernel of the main table:
///
/// - `to_argb32[F]` is `table[PRGB32][Src].vblit_line[F]`
/// - `from_argb32[F]` is `table[F][Src].vblit_line[PRGB32]`
///
/// The same goes for `Argb64`.
#[derive(Clone, Copy)]
pub struct ConvertTable {
    to_argb32: [VBlitLineFn; FORMAT_COUNT],
    to_argb64: [VBlitLineFn; FORMAT_COUNT],
    from_argb32: [Option<VBlitLineFn>; FORMAT_COUNT],
    from_argb64: [Option<VBlitLineFn>; FORMAT_COUNT],
}

impl ConvertTable {
    pub(crate) fn new(funcs: &FuncsTable) -> Result<Self, BuildError> {
        let src = CompositeOp::Src.index();
        let to = |canonical: Canonical| -> Result<[VBlitLineFn; FORMAT_COUNT], BuildError> {
            let row = &funcs[canonical.format().index()][src];
            let base = row.vblit_line[canonical.format().index()]
                .ok_or(BuildError::MissingSelfCopy(canonical.format()))?;

            let mut list = [base; FORMAT_COUNT];
            for format in PixelFormat::ALL.iter() {
                list[format.index()] = row.vblit_line[format.index()]
                    .ok_or(BuildError::MissingConversion(*format))?;
            }

            Ok(list)
        };

        let from = |canonical: Canonical| {
            let mut list = [None; FORMAT_COUNT];
            for format in PixelFormat::ALL.iter() {
                list[format.index()] = funcs[format.index()][src].vblit_line[canonical.format().index()];
            }

            list
        };

        let table = ConvertTable {
            to_argb32: to(Canonical::Argb32)?,
            to_argb64: to(Canonical::Argb64)?,
            from_argb32: from(Canonical::Argb32),
            from_argb64: from(Canonical::Argb64),
        };

        // Every paintable format must be reachable from a canonical one.
        for format in PixelFormat::ALL.iter().filter(|f| f.is_paintable()) {
            if table.from_argb32[format.index()].is_none() || table.from_argb64[format.index()].is_none() {
                return Err(BuildError::MissingConversion(*format));
            }
        }

        Ok(table)
    }

    /// Returns a converter from a format to `Argb32`.
    #[inline]
    pub fn to_argb32(&self, format: PixelFormat) -> VBlitLineFn {
        self.to_argb32[format.index()]
    }

    /// Returns a converter from a format to `Argb64`.
    #[inline]
    pub fn to_argb64(&self, format: PixelFormat) -> VBlitLineFn {
        self.to_argb64[format.index()]
    }

    /// Returns a converter from `Argb32` to a format.
    ///
    /// Returns `None` for `I8`.
    #[inline]
    pub fn from_argb32(&self, format: PixelFormat) -> Option<VBlitLineFn> {
        self.from_argb32[format.index()]
    }

    /// Returns a converter from `Argb64` to a format.
    ///
    /// Returns `None` for `I8`.
    #[inline]
    pub fn from_argb64(&self, format: PixelFormat) -> Option<VBlitLineFn> {
        self.from_argb64[format.index()]
    }

    /// Returns a converter from a format to a canonical one.
    #[inline]
    pub fn to_canonical(&self, canonical: Canonical, format: PixelFormat) -> VBlitLineFn {
        match canonical {
            Canonical::Argb32 => self.to_argb32(format),
            Canonical::Argb64 => self.to_argb64(format),
        }
    }

    /// Returns a converter from a canonical format to a format.
    #[inline]
    pub fn from_canonical(&self, canonical: Canonical, format: PixelFormat) -> Option<VBlitLineFn> {
        match canonical {
            Canonical::Argb32 => self.from_argb32(format),
            Canonical::Argb64 => self.from_argb64(format),
        }
    }
}

impl core::fmt::Debug for ConvertTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConvertTable").finish()
    }
}
