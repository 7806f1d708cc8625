// Copyright 2006 The Android Open Source Project
// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use crate::{BlitClosure, CompositeOp, IntRect, KernelTable, PixelFormat, Solid};
use crate::{SurfaceMut, SurfaceRef};

/// Paints solid colors and surfaces onto a surface.
///
/// Every call performs a single table lookup and a single kernel call per row.
/// All methods return `None` only when the table has no kernel for the requested
/// combination. Regions outside of the destination are silently clipped.
#[derive(Clone, Copy, Debug)]
pub struct Painter<'t> {
    table: &'t KernelTable,
}

impl Painter<'static> {
    /// Creates a painter that uses the global table.
    pub fn new() -> Self {
        Painter { table: KernelTable::global() }
    }
}

impl Default for Painter<'static> {
    fn default() -> Self {
        Painter::new()
    }
}

impl<'t> Painter<'t> {
    /// Creates a painter that uses a custom table.
    pub fn with_table(table: &'t KernelTable) -> Self {
        Painter { table }
    }

    /// Returns painter's table.
    pub fn table(&self) -> &'t KernelTable {
        self.table
    }

    /// Fills a rectangle with a solid color.
    pub fn fill_rect(
        &self,
        dst: &mut SurfaceMut,
        rect: IntRect,
        solid: &Solid,
        op: CompositeOp,
    ) -> Option<()> {
        let f = self.table.cblit_line(dst.format(), op, solid.kind())?;

        let clip = match clip_rect(dst, rect) {
            Some(clip) => clip,
            None => return Some(()),
        };

        let bpp = dst.format().bytes_per_pixel();
        let x = clip.x() as usize * bpp;
        for y in clip.top()..clip.bottom() {
            f(&mut dst.row_mut(y)?[x..], solid, clip.width() as usize);
        }

        Some(())
    }

    /// Fills a rectangle with a solid color using a coverage mask.
    ///
    /// The mask covers the whole `rect`, one byte per pixel,
    /// with `rect.width()` bytes per row.
    pub fn fill_rect_masked(
        &self,
        dst: &mut SurfaceMut,
        rect: IntRect,
        solid: &Solid,
        op: CompositeOp,
        mask: &[u8],
    ) -> Option<()> {
        let f = self.table.cblit_span(dst.format(), op, solid.kind())?;

        let mask_stride = rect.width() as usize;
        if mask.len() < mask_stride * rect.height() as usize {
            return None;
        }

        let clip = match clip_rect(dst, rect) {
            Some(clip) => clip,
            None => return Some(()),
        };

        let bpp = dst.format().bytes_per_pixel();
        let x = clip.x() as usize * bpp;
        let mask_x = (clip.x() - rect.x()) as usize;
        for y in clip.top()..clip.bottom() {
            let mask_start = (y - rect.y()) as usize * mask_stride + mask_x;
            let row_mask = &mask[mask_start..];
            f(&mut dst.row_mut(y)?[x..], solid, row_mask, clip.width() as usize);
        }

        Some(())
    }

    /// Composites a surface onto a surface at the provided position.
    ///
    /// `I8` sources must have a palette.
    pub fn blit(
        &self,
        dst: &mut SurfaceMut,
        x: i32,
        y: i32,
        src: &SurfaceRef,
        op: CompositeOp,
    ) -> Option<()> {
        let f = self.table.vblit_line(dst.format(), op, src.format())?;
        let closure = closure_for(src)?;

        let area = match clip_blit(dst, x, y, src) {
            Some(area) => area,
            None => return Some(()),
        };

        for row in 0..area.height {
            let dst_row = &mut dst.row_mut(area.dst_y + row)?[area.dst_x..];
            let src_row = &src.row(area.src_y + row)?[area.src_x..];
            f(dst_row, src_row, area.width, &closure);
        }

        Some(())
    }

    /// Composites a surface onto a surface at the provided position using a coverage mask.
    ///
    /// The mask covers the whole `src`, one byte per pixel,
    /// with `src.width()` bytes per row.
    pub fn blit_masked(
        &self,
        dst: &mut SurfaceMut,
        x: i32,
        y: i32,
        src: &SurfaceRef,
        op: CompositeOp,
        mask: &[u8],
    ) -> Option<()> {
        let f = self.table.vblit_span(dst.format(), op, src.format())?;
        let closure = closure_for(src)?;

        let mask_stride = src.width() as usize;
        if mask.len() < mask_stride * src.height() as usize {
            return None;
        }

        let area = match clip_blit(dst, x, y, src) {
            Some(area) => area,
            None => return Some(()),
        };

        let src_bpp = src.format().bytes_per_pixel();
        let mask_x = area.src_x / src_bpp;
        for row in 0..area.height {
            let dst_row = &mut dst.row_mut(area.dst_y + row)?[area.dst_x..];
            let src_row = &src.row(area.src_y + row)?[area.src_x..];
            let mask_row = &mask[(area.src_y + row) as usize * mask_stride + mask_x..];
            f(dst_row, src_row, mask_row, area.width, &closure);
        }

        Some(())
    }
}

/// Fills a rectangle with a solid color using the global table.
///
/// See [`Painter::fill_rect`] for details.
pub fn fill_rect(dst: &mut SurfaceMut, rect: IntRect, solid: &Solid, op: CompositeOp) -> Option<()> {
    Painter::new().fill_rect(dst, rect, solid, op)
}

/// Fills a rectangle with a solid color using a coverage mask and the global table.
///
/// See [`Painter::fill_rect_masked`] for details.
pub fn fill_rect_masked(
    dst: &mut SurfaceMut,
    rect: IntRect,
    solid: &Solid,
    op: CompositeOp,
    mask: &[u8],
) -> Option<()> {
    Painter::new().fill_rect_masked(dst, rect, solid, op, mask)
}

/// Composites a surface onto a surface using the global table.
///
/// See [`Painter::blit`] for details.
pub fn blit(dst: &mut SurfaceMut, x: i32, y: i32, src: &SurfaceRef, op: CompositeOp) -> Option<()> {
    Painter::new().blit(dst, x, y, src, op)
}

/// Composites a surface onto a surface using a coverage mask and the global table.
///
/// See [`Painter::blit_masked`] for details.
pub fn blit_masked(
    dst: &mut SurfaceMut,
    x: i32,
    y: i32,
    src: &SurfaceRef,
    op: CompositeOp,
    mask: &[u8],
) -> Option<()> {
    Painter::new().blit_masked(dst, x, y, src, op, mask)
}

fn closure_for<'a>(src: &SurfaceRef<'a>) -> Option<BlitClosure<'a>> {
    if src.format() == PixelFormat::I8 && src.palette().is_none() {
        return None;
    }

    Some(BlitClosure { palette: src.palette() })
}

fn clip_rect(dst: &SurfaceMut, rect: IntRect) -> Option<IntRect> {
    dst.size().to_int_rect(0, 0)?.intersect(&rect)
}

/// A clipped blit area.
///
/// `dst_x` and `src_x` are in bytes.
struct BlitArea {
    dst_x: usize,
    dst_y: u32,
    src_x: usize,
    src_y: u32,
    width: usize,
    height: u32,
}

fn clip_blit(dst: &SurfaceMut, x: i32, y: i32, src: &SurfaceRef) -> Option<BlitArea> {
    let (x, y) = (i64::from(x), i64::from(y));
    let left = x.max(0);
    let top = y.max(0);
    let right = (x + i64::from(src.width())).min(i64::from(dst.width()));
    let bottom = (y + i64::from(src.height())).min(i64::from(dst.height()));
    if left >= right || top >= bottom {
        return None;
    }

    Some(BlitArea {
        dst_x: left as usize * dst.format().bytes_per_pixel(),
        dst_y: top as u32,
        src_x: (left - x) as usize * src.format().bytes_per_pixel(),
        src_y: (top - y) as u32,
        width: (right - left) as usize,
        height: (bottom - top) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Palette, Surface};

    #[test]
    fn fill_rect_clips() {
        let mut surface = Surface::new(3, 2, PixelFormat::A8).unwrap();
        let rect = IntRect::from_xywh(1, 1, 10, 10).unwrap();
        let solid = Solid::from_argb32(0x80000000);
        fill_rect(&mut surface.as_mut(), rect, &solid, CompositeOp::Src).unwrap();
        assert_eq!(surface.row(0), Some(&[0, 0, 0][..]));
        assert_eq!(surface.row(1), Some(&[0, 0x80, 0x80][..]));
    }

    #[test]
    fn fill_rect_outside() {
        let mut surface = Surface::new(3, 2, PixelFormat::A8).unwrap();
        let rect = IntRect::from_xywh(5, 5, 1, 1).unwrap();
        let solid = Solid::from_argb32(0xFF000000);
        assert_eq!(fill_rect(&mut surface.as_mut(), rect, &solid, CompositeOp::Src), Some(()));
        assert!(surface.data().iter().all(|c| *c == 0));
    }

    #[test]
    fn fill_rect_masked_offsets() {
        let mut surface = Surface::new(2, 2, PixelFormat::A8).unwrap();
        let rect = IntRect::from_xywh(1, 0, 2, 2).unwrap();
        let solid = Solid::from_argb32(0xFF000000);
        let mask = [1, 2, 3, 4];
        fill_rect_masked(&mut surface.as_mut(), rect, &solid, CompositeOp::Src, &mask).unwrap();
        assert_eq!(surface.row(0), Some(&[0, 1][..]));
        assert_eq!(surface.row(1), Some(&[0, 3][..]));

        assert!(fill_rect_masked(&mut surface.as_mut(), rect, &solid, CompositeOp::Src, &mask[..3]).is_none());
    }

    #[test]
    fn blit_negative_offset() {
        let mut dst = Surface::new(2, 2, PixelFormat::A8).unwrap();
        let mut src = Surface::new(2, 2, PixelFormat::A8).unwrap();
        src.row_mut(0).unwrap().copy_from_slice(&[1, 2]);
        src.row_mut(1).unwrap().copy_from_slice(&[3, 4]);

        blit(&mut dst.as_mut(), -1, 1, &src.as_ref(), CompositeOp::Src).unwrap();
        assert_eq!(dst.row(0), Some(&[0, 0][..]));
        assert_eq!(dst.row(1), Some(&[2, 0][..]));
    }

    #[test]
    fn blit_masked_offsets() {
        let mut dst = Surface::new(2, 1, PixelFormat::A8).unwrap();
        let mut src = Surface::new(2, 1, PixelFormat::A8).unwrap();
        src.row_mut(0).unwrap().copy_from_slice(&[255, 255]);

        let mask = [0, 255];
        blit_masked(&mut dst.as_mut(), -1, 0, &src.as_ref(), CompositeOp::SrcOver, &mask).unwrap();
        assert_eq!(dst.row(0), Some(&[255, 0][..]));
    }

    #[test]
    fn unsupported_combination() {
        let mut dst = Surface::new(1, 1, PixelFormat::I8).unwrap();
        let src = Surface::new(1, 1, PixelFormat::Prgb32).unwrap();
        assert!(blit(&mut dst.as_mut(), 0, 0, &src.as_ref(), CompositeOp::SrcOver).is_none());
    }

    #[test]
    fn indexed_source() {
        let mut dst = Surface::new(1, 1, PixelFormat::Prgb32).unwrap();
        let mut src = Surface::new(1, 1, PixelFormat::I8).unwrap();
        assert!(blit(&mut dst.as_mut(), 0, 0, &src.as_ref(), CompositeOp::Src).is_none());

        src.set_palette(Palette::from_argb32(&[0xFF0000FF]).unwrap());
        blit(&mut dst.as_mut(), 0, 0, &src.as_ref(), CompositeOp::Src).unwrap();
        assert_eq!(dst.pixel(0, 0), Some(&[255, 0, 0, 255][..]));
    }

    #[test]
    fn custom_table() {
        let table = crate::TableBuilder::new(crate::CpuFeatures::empty()).build().unwrap();
        let painter = Painter::with_table(&table);
        let mut surface = Surface::new(1, 1, PixelFormat::Prgb64).unwrap();
        let rect = IntRect::from_xywh(0, 0, 1, 1).unwrap();
        painter.fill_rect(&mut surface.as_mut(), rect, &Solid::from_argb32(0xFFFFFFFF), CompositeOp::SrcOver).unwrap();
        assert_eq!(surface.pixel(0, 0), Some(&[0xFF; 8][..]));
    }
}
