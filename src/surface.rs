// Copyright 2006 The Android Open Source Project
// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::convert::TryFrom;

use crate::{BlitClosure, Canonical, CompositeOp, Depth, IntRect, IntSize};
use crate::{KernelTable, Palette, PixelFormat, Solid};

/// Row alignment of an owned surface, in bytes.
const ROW_ALIGNMENT: usize = 4;

/// A container that owns pixels of any format.
///
/// Rows are padded to a 4 bytes boundary.
#[derive(Clone, PartialEq)]
pub struct Surface {
    data: Vec<u8>,
    size: IntSize,
    stride: usize,
    format: PixelFormat,
    palette: Option<Box<Palette>>,
}

impl Surface {
    /// Allocates a new surface.
    ///
    /// A surface is filled with format's clear pixel.
    /// This is transparent black, or opaque black for formats without alpha.
    ///
    /// Zero size in an error.
    ///
    /// Surface's width and height are limited by i32::MAX.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Option<Self> {
        let size = IntSize::from_wh(width, height)?;
        let stride = aligned_stride(size, format)?;
        let data_len = stride.checked_mul(size.height() as usize)?;

        let mut data = vec![0; data_len];
        let row_bytes = format.row_bytes(width)?;
        let clear = format.clear_pixel();
        if clear.iter().any(|c| *c != 0) {
            for row in data.chunks_mut(stride) {
                for pixel in row[..row_bytes].chunks_mut(clear.len()) {
                    pixel.copy_from_slice(clear);
                }
            }
        }

        Some(Surface {
            data,
            size,
            stride,
            format,
            palette: None,
        })
    }

    /// Decodes a PNG data into a `Surface`.
    ///
    /// RGB and grayscale images become `Rgb24` surfaces,
    /// images with alpha become `Argb32` ones.
    /// 16-bit images are narrowed to 8 bits.
    #[cfg(feature = "png-format")]
    pub fn decode_png(data: &[u8]) -> Result<Self, png::DecodingError> {
        fn make_custom_png_error(msg: &str) -> png::DecodingError {
            std::io::Error::new(std::io::ErrorKind::Other, msg).into()
        }

        let mut decoder = png::Decoder::new(data);
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info()?;
        let mut img_data = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut img_data)?;

        if info.bit_depth != png::BitDepth::Eight {
            return Err(make_custom_png_error("unsupported bit depth"));
        }

        let size = IntSize::from_wh(info.width, info.height)
            .ok_or_else(|| make_custom_png_error("invalid image size"))?;

        let format = match info.color_type {
            png::ColorType::Rgb | png::ColorType::Grayscale => PixelFormat::Rgb24,
            png::ColorType::Rgba | png::ColorType::GrayscaleAlpha => PixelFormat::Argb32,
            png::ColorType::Indexed => {
                return Err(make_custom_png_error("indexed PNG is not supported"));
            }
        };

        let mut surface = Surface::new(size.width(), size.height(), format)
            .ok_or_else(|| make_custom_png_error("image is too big"))?;

        let width = size.width() as usize;
        for (y, line) in img_data.chunks(info.line_size).take(size.height() as usize).enumerate() {
            let row = match surface.row_mut(y as u32) {
                Some(row) => row,
                None => break,
            };

            match info.color_type {
                png::ColorType::Rgb => {
                    for (p, rgb) in row.chunks_exact_mut(3).zip(line.chunks_exact(3)).take(width) {
                        p.copy_from_slice(&[rgb[2], rgb[1], rgb[0]]);
                    }
                }
                png::ColorType::Rgba => {
                    for (p, rgba) in row.chunks_exact_mut(4).zip(line.chunks_exact(4)).take(width) {
                        p.copy_from_slice(&[rgba[2], rgba[1], rgba[0], rgba[3]]);
                    }
                }
                png::ColorType::Grayscale => {
                    for (p, gray) in row.chunks_exact_mut(3).zip(line.iter()).take(width) {
                        p.copy_from_slice(&[*gray, *gray, *gray]);
                    }
                }
                png::ColorType::GrayscaleAlpha => {
                    for (p, ga) in row.chunks_exact_mut(4).zip(line.chunks_exact(2)).take(width) {
                        p.copy_from_slice(&[ga[0], ga[0], ga[0], ga[1]]);
                    }
                }
                png::ColorType::Indexed => {}
            }
        }

        Ok(surface)
    }

    /// Loads a PNG file into a `Surface`.
    ///
    /// See [`decode_png`](Self::decode_png) for details.
    #[cfg(feature = "png-format")]
    pub fn load_png<P: AsRef<std::path::Path>>(path: P) -> Result<Self, png::DecodingError> {
        // `png::Decoder` is generic over input, which means that it will instance
        // two copies: one for `&[]` and one for `File`. Which will simply bloat the code.
        // Therefore we're using only one type for input.
        let data = std::fs::read(path)?;
        Self::decode_png(&data)
    }

    /// Encodes surface into a PNG data.
    #[cfg(feature = "png-format")]
    pub fn encode_png(&self) -> Result<Vec<u8>, png::EncodingError> {
        self.as_ref().encode_png()
    }

    /// Saves surface as a PNG file.
    #[cfg(feature = "png-format")]
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), png::EncodingError> {
        self.as_ref().save_png(path)
    }

    /// Returns a container that references surface's data.
    pub fn as_ref(&self) -> SurfaceRef {
        SurfaceRef {
            data: &self.data,
            size: self.size,
            stride: self.stride,
            format: self.format,
            palette: self.palette.as_deref(),
        }
    }

    /// Returns a container that references surface's data.
    pub fn as_mut(&mut self) -> SurfaceMut {
        SurfaceMut {
            data: &mut self.data,
            size: self.size,
            stride: self.stride,
            format: self.format,
        }
    }

    /// Returns surface's width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.size.width()
    }

    /// Returns surface's height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.size.height()
    }

    /// Returns surface's size.
    #[inline]
    pub fn size(&self) -> IntSize {
        self.size
    }

    /// Returns the number of bytes between rows.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns surface's pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns surface's palette.
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_deref()
    }

    /// Attaches a palette.
    ///
    /// Used only by `I8` surfaces.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = Some(Box::new(palette));
    }

    /// Fills the entire surface with a solid color.
    ///
    /// Does nothing for `I8` surfaces.
    pub fn fill(&mut self, solid: &Solid) {
        let f = match KernelTable::global().cblit_line(self.format, CompositeOp::Src, solid.kind()) {
            Some(f) => f,
            None => return,
        };

        let width = self.width() as usize;
        for row in self.data.chunks_mut(self.stride) {
            f(row, solid, width);
        }
    }

    /// Returns the internal data.
    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Returns the mutable internal data.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_mut_slice()
    }

    /// Returns a row without padding.
    ///
    /// Returns `None` when `y` is out of bounds.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        self.as_ref().row(y)
    }

    /// Returns a mutable row without padding.
    ///
    /// Returns `None` when `y` is out of bounds.
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        let range = row_range(self.size, self.stride, self.format, y)?;
        Some(&mut self.data[range])
    }

    /// Returns pixel's bytes.
    ///
    /// Returns `None` when position is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        self.as_ref().pixel(x, y)
    }

    /// Returns a copy of the surface that intersects the `rect`.
    ///
    /// Returns `None` when `Surface`'s rect doesn't contain `rect`.
    pub fn clone_rect(&self, rect: IntRect) -> Option<Surface> {
        self.as_ref().clone_rect(rect)
    }

    /// Converts the surface into another format.
    ///
    /// Goes through a canonical format when neither side is one.
    /// `Argb64` is used when either side is a 16-bit format.
    ///
    /// Returns `None` when converting into `I8` or when an `I8` surface has no palette.
    pub fn convert(&self, format: PixelFormat) -> Option<Surface> {
        self.as_ref().convert(format)
    }
}

impl core::fmt::Debug for Surface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Surface")
            .field("data", &"...")
            .field("width", &self.size.width())
            .field("height", &self.size.height())
            .field("format", &self.format)
            .finish()
    }
}


/// A container that references pixels of any format.
///
/// Can be created from `Surface` or from a user provided data.
#[derive(Clone, Copy, PartialEq)]
pub struct SurfaceRef<'a> {
    data: &'a [u8],
    size: IntSize,
    stride: usize,
    format: PixelFormat,
    palette: Option<&'a Palette>,
}

impl<'a> SurfaceRef<'a> {
    /// Creates a new `SurfaceRef` from bytes.
    ///
    /// `stride` must be at least `width * bytes_per_pixel`.
    /// The last row doesn't have to be padded.
    /// Zero size in an error. Width and height are limited by i32::MAX.
    pub fn from_bytes(
        data: &'a [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Option<Self> {
        let size = IntSize::from_wh(width, height)?;
        if data.len() < data_len_for_stride(size, stride, format)? {
            return None;
        }

        Some(SurfaceRef {
            data,
            size,
            stride,
            format,
            palette: None,
        })
    }

    /// Attaches a palette to an `I8` data.
    pub fn with_palette(mut self, palette: &'a Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Creates a new `Surface` from the current data.
    ///
    /// Clones the underlying data.
    pub fn to_owned(&self) -> Surface {
        let mut new = Surface::zeroed(self.size, self.format, self.stride);
        for y in 0..self.height() {
            if let (Some(src), Some(dst)) = (self.row(y), new.row_mut(y)) {
                dst.copy_from_slice(src);
            }
        }

        new.palette = self.palette.map(|p| Box::new(p.clone()));
        new
    }

    /// Returns surface's width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.size.width()
    }

    /// Returns surface's height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.size.height()
    }

    /// Returns surface's size.
    #[inline]
    pub fn size(&self) -> IntSize {
        self.size
    }

    /// Returns the number of bytes between rows.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns surface's pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns surface's palette.
    #[inline]
    pub fn palette(&self) -> Option<&'a Palette> {
        self.palette
    }

    /// Returns the internal data.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns a row without padding.
    ///
    /// Returns `None` when `y` is out of bounds.
    pub fn row(&self, y: u32) -> Option<&'a [u8]> {
        let data = self.data;
        row_range(self.size, self.stride, self.format, y).map(|r| &data[r])
    }

    /// Returns pixel's bytes.
    ///
    /// Returns `None` when position is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&'a [u8]> {
        if x >= self.width() {
            return None;
        }

        let bpp = self.format.bytes_per_pixel();
        let start = x as usize * bpp;
        self.row(y).map(|row| &row[start..start + bpp])
    }

    pub(crate) fn closure(&self) -> BlitClosure<'a> {
        BlitClosure { palette: self.palette }
    }

    /// Returns a copy of the surface that intersects the `rect`.
    ///
    /// Returns `None` when `Surface`'s rect doesn't contain `rect`.
    pub fn clone_rect(&self, rect: IntRect) -> Option<Surface> {
        let rect = self.size.to_int_rect(0, 0)?.intersect(&rect)?;
        let bpp = self.format.bytes_per_pixel();
        let start = rect.x() as usize * bpp;
        let end = rect.right() as usize * bpp;

        let mut new = Surface::zeroed(rect.size(), self.format, self.stride);
        for y in 0..rect.height() {
            let src = self.row(rect.y() + y)?;
            new.row_mut(y)?.copy_from_slice(&src[start..end]);
        }

        new.palette = self.palette.map(|p| Box::new(p.clone()));
        Some(new)
    }

    /// Converts the surface into another format.
    ///
    /// See [`Surface::convert`] for details.
    pub fn convert(&self, format: PixelFormat) -> Option<Surface> {
        if format == self.format {
            return Some(self.to_owned());
        }

        if self.format == PixelFormat::I8 && self.palette.is_none() {
            return None;
        }

        let canonical = if self.format.depth() == Depth::Bits16 || format.depth() == Depth::Bits16 {
            Canonical::Argb64
        } else {
            Canonical::Argb32
        };

        let convert = KernelTable::global().convert();
        let from = convert.from_canonical(canonical, format)?;
        let to = convert.to_canonical(canonical, self.format);

        let mut new = Surface::new(self.width(), self.height(), format)?;
        let width = self.width() as usize;
        let closure = self.closure();

        if self.format == canonical.format() {
            for y in 0..self.height() {
                from(new.row_mut(y)?, self.row(y)?, width, &closure);
            }
        } else if format == canonical.format() {
            for y in 0..self.height() {
                to(new.row_mut(y)?, self.row(y)?, width, &closure);
            }
        } else {
            let mut tmp = vec![0; canonical.format().row_bytes(self.width())?];
            for y in 0..self.height() {
                to(&mut tmp, self.row(y)?, width, &closure);
                from(new.row_mut(y)?, &tmp, width, &BlitClosure::EMPTY);
            }
        }

        Some(new)
    }

    /// Encodes surface into a PNG data.
    ///
    /// The data is written as 8-bit RGBA.
    #[cfg(feature = "png-format")]
    pub fn encode_png(&self) -> Result<Vec<u8>, png::EncodingError> {
        fn make_custom_png_error(msg: &str) -> png::EncodingError {
            std::io::Error::new(std::io::ErrorKind::Other, msg).into()
        }

        let argb = self.convert(PixelFormat::Argb32)
            .ok_or_else(|| make_custom_png_error("surface cannot be converted"))?;

        let width = self.width() as usize;
        let mut rgba = Vec::with_capacity(width * 4 * self.height() as usize);
        for y in 0..argb.height() {
            let row = argb.row(y).unwrap_or_default();
            for p in row.chunks_exact(4) {
                rgba.extend_from_slice(&[p[2], p[1], p[0], p[3]]);
            }
        }

        let mut data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut data, self.width(), self.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&rgba)?;
        }

        Ok(data)
    }

    /// Saves surface as a PNG file.
    #[cfg(feature = "png-format")]
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), png::EncodingError> {
        let data = self.encode_png()?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

impl core::fmt::Debug for SurfaceRef<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SurfaceRef")
            .field("data", &"...")
            .field("width", &self.size.width())
            .field("height", &self.size.height())
            .field("stride", &self.stride)
            .field("format", &self.format)
            .finish()
    }
}


/// A container that references mutable pixels of any format.
///
/// Can be created from `Surface` or from a user provided data.
#[derive(PartialEq)]
pub struct SurfaceMut<'a> {
    data: &'a mut [u8],
    size: IntSize,
    stride: usize,
    format: PixelFormat,
}

impl<'a> SurfaceMut<'a> {
    /// Creates a new `SurfaceMut` from bytes.
    ///
    /// `stride` must be at least `width * bytes_per_pixel`.
    /// The last row doesn't have to be padded.
    /// Zero size in an error. Width and height are limited by i32::MAX.
    pub fn from_bytes(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Option<Self> {
        let size = IntSize::from_wh(width, height)?;
        if data.len() < data_len_for_stride(size, stride, format)? {
            return None;
        }

        Some(SurfaceMut {
            data,
            size,
            stride,
            format,
        })
    }

    /// Returns a container that references surface's data.
    pub fn as_ref(&self) -> SurfaceRef {
        SurfaceRef {
            data: &self.data,
            size: self.size,
            stride: self.stride,
            format: self.format,
            palette: None,
        }
    }

    /// Creates a new `Surface` from the current data.
    ///
    /// Clones the underlying data.
    pub fn to_owned(&self) -> Surface {
        self.as_ref().to_owned()
    }

    /// Returns surface's width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.size.width()
    }

    /// Returns surface's height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.size.height()
    }

    /// Returns surface's size.
    #[inline]
    pub fn size(&self) -> IntSize {
        self.size
    }

    /// Returns the number of bytes between rows.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns surface's pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the mutable internal data.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data
    }

    /// Returns a mutable row without padding.
    ///
    /// Returns `None` when `y` is out of bounds.
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        let range = row_range(self.size, self.stride, self.format, y)?;
        Some(&mut self.data[range])
    }

    /// Splits the surface into horizontal strips of `rows` rows each.
    ///
    /// Strips do not overlap, so they can be painted from different threads.
    /// Yields strip's top row together with the strip.
    /// The last strip can be shorter.
    pub fn strips_mut(&mut self, rows: u32) -> impl Iterator<Item = (u32, SurfaceMut<'_>)> + '_ {
        let rows = rows.max(1);
        let height = self.size.height();
        let width = self.size.width();
        let stride = self.stride;
        let format = self.format;
        let count = ((height + rows - 1) / rows) as usize;
        let chunk_len = stride.saturating_mul(rows as usize);

        self.data.chunks_mut(chunk_len).take(count).enumerate().filter_map(move |(i, data)| {
            let y = i as u32 * rows;
            let size = IntSize::from_wh(width, rows.min(height - y))?;
            Some((y, SurfaceMut { data, size, stride, format }))
        })
    }
}

impl core::fmt::Debug for SurfaceMut<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SurfaceMut")
            .field("data", &"...")
            .field("width", &self.size.width())
            .field("height", &self.size.height())
            .field("stride", &self.stride)
            .field("format", &self.format)
            .finish()
    }
}


impl Surface {
    /// Allocates a zeroed surface for a size that was already validated.
    ///
    /// `fallback_stride` is used only when the aligned stride overflows.
    fn zeroed(size: IntSize, format: PixelFormat, fallback_stride: usize) -> Surface {
        let stride = aligned_stride(size, format).unwrap_or(fallback_stride);
        Surface {
            data: vec![0; stride * size.height() as usize],
            size,
            stride,
            format,
            palette: None,
        }
    }
}

/// Returns a byte range of a row without padding.
fn row_range(size: IntSize, stride: usize, format: PixelFormat, y: u32) -> Option<core::ops::Range<usize>> {
    if y >= size.height() {
        return None;
    }

    let start = y as usize * stride;
    Some(start..start + format.row_bytes(size.width())?)
}

/// Returns the minimal number of bytes between rows, rounded up to `ROW_ALIGNMENT`.
///
/// Surface's maximum width and height must fit in 31 bits.
fn aligned_stride(size: IntSize, format: PixelFormat) -> Option<usize> {
    i32::try_from(size.width()).ok()?;
    i32::try_from(size.height()).ok()?;
    let row_bytes = format.row_bytes(size.width())?;
    let stride = row_bytes.checked_add(ROW_ALIGNMENT - 1)? / ROW_ALIGNMENT * ROW_ALIGNMENT;
    Some(stride)
}

/// Returns storage size required by pixel array.
fn data_len_for_stride(size: IntSize, stride: usize, format: PixelFormat) -> Option<usize> {
    i32::try_from(size.width()).ok()?;
    i32::try_from(size.height()).ok()?;

    let row_bytes = format.row_bytes(size.width())?;
    if stride < row_bytes {
        return None;
    }

    let h = size.height().checked_sub(1)?;
    let h = (h as usize).checked_mul(stride)?;
    h.checked_add(row_bytes)
}
