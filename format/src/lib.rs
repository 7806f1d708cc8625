// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! A [tiny-blit](https://docs.rs/tiny-blit) pixel format registry.
//!
//! Describes every pixel format the compositor understands: its size in memory,
//! its channel layout and how the channels are encoded.
//!
//! The set of formats is closed. Each format has a stable index,
//! which is used to address per-format tables.

#![no_std]
#![warn(missing_docs)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![allow(clippy::upper_case_acronyms)]

/// Number of pixel formats.
pub const FORMAT_COUNT: usize = 9;

/// A pixel format.
///
/// All multi-byte words are stored in little-endian byte order.
/// 32-bit formats are `0xAARRGGBB` words, therefore in memory the bytes are `B, G, R, A`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PixelFormat {
    /// 32-bit premultiplied ARGB.
    Prgb32 = 0,
    /// 32-bit straight (non-premultiplied) ARGB.
    Argb32,
    /// 32-bit RGB. The alpha byte is ignored on read and written as 0xFF.
    Xrgb32,
    /// 24-bit RGB. Bytes are `B, G, R`.
    Rgb24,
    /// 8-bit alpha.
    A8,
    /// 8-bit palette index.
    I8,
    /// 64-bit premultiplied ARGB. Four little-endian `u16`: `B, G, R, A`.
    Prgb64,
    /// 48-bit RGB. Three little-endian `u16`: `B, G, R`.
    Rgb48,
    /// 16-bit alpha.
    A16,
}

/// Number of bits used by a single channel.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Depth {
    /// 8 bits per channel.
    Bits8,
    /// 16 bits per channel.
    Bits16,
}

/// Channels stored by a pixel format.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ChannelLayout {
    /// Alpha and three color channels.
    Argb,
    /// Three color channels and an unused byte.
    Xrgb,
    /// Three color channels.
    Rgb,
    /// Alpha only.
    Alpha,
    /// An index into a palette.
    Indexed,
}

/// Byte order of multi-byte words.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ByteOrder {
    /// Least significant byte first.
    LittleEndian,
}

impl PixelFormat {
    /// All formats, in index order.
    pub const ALL: [PixelFormat; FORMAT_COUNT] = [
        PixelFormat::Prgb32,
        PixelFormat::Argb32,
        PixelFormat::Xrgb32,
        PixelFormat::Rgb24,
        PixelFormat::A8,
        PixelFormat::I8,
        PixelFormat::Prgb64,
        PixelFormat::Rgb48,
        PixelFormat::A16,
    ];

    /// Returns a format by its index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns format's index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the number of bits used by a single pixel.
    #[inline]
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Prgb32 | PixelFormat::Argb32 | PixelFormat::Xrgb32 => 32,
            PixelFormat::Rgb24 => 24,
            PixelFormat::A8 | PixelFormat::I8 => 8,
            PixelFormat::Prgb64 => 64,
            PixelFormat::Rgb48 => 48,
            PixelFormat::A16 => 16,
        }
    }

    /// Returns the number of bytes used by a single pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        (self.bits_per_pixel() / 8) as usize
    }

    /// Returns channel's depth.
    ///
    /// `I8` is an 8-bit format, even though palette entries are 32-bit colors.
    #[inline]
    pub const fn depth(self) -> Depth {
        match self {
            PixelFormat::Prgb64 | PixelFormat::Rgb48 | PixelFormat::A16 => Depth::Bits16,
            _ => Depth::Bits8,
        }
    }

    /// Returns format's channel layout.
    #[inline]
    pub const fn layout(self) -> ChannelLayout {
        match self {
            PixelFormat::Prgb32 | PixelFormat::Argb32 | PixelFormat::Prgb64 => ChannelLayout::Argb,
            PixelFormat::Xrgb32 => ChannelLayout::Xrgb,
            PixelFormat::Rgb24 | PixelFormat::Rgb48 => ChannelLayout::Rgb,
            PixelFormat::A8 | PixelFormat::A16 => ChannelLayout::Alpha,
            PixelFormat::I8 => ChannelLayout::Indexed,
        }
    }

    /// Returns format's byte order.
    #[inline]
    pub const fn byte_order(self) -> ByteOrder {
        ByteOrder::LittleEndian
    }

    /// Checks that color channels are stored premultiplied by alpha.
    #[inline]
    pub const fn is_premultiplied(self) -> bool {
        matches!(self, PixelFormat::Prgb32 | PixelFormat::Prgb64)
    }

    /// Checks that format stores an alpha channel.
    ///
    /// Palette entries can have alpha too, therefore `I8` is treated as an alpha format.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        !self.is_opaque()
    }

    /// Checks that every pixel of this format is fully opaque.
    #[inline]
    pub const fn is_opaque(self) -> bool {
        matches!(self, PixelFormat::Xrgb32 | PixelFormat::Rgb24 | PixelFormat::Rgb48)
    }

    /// Checks that format stores color channels.
    #[inline]
    pub const fn has_color(self) -> bool {
        !matches!(self.layout(), ChannelLayout::Alpha)
    }

    /// Checks that format can be used as a compositing destination.
    ///
    /// Only `I8` cannot, since writing into it would require a palette search.
    #[inline]
    pub const fn is_paintable(self) -> bool {
        !matches!(self, PixelFormat::I8)
    }

    /// Returns format's "cleared" pixel.
    ///
    /// This is a fully transparent black for all formats, except `Xrgb32`,
    /// which cannot be transparent and uses an opaque black instead.
    pub const fn clear_pixel(self) -> &'static [u8] {
        match self {
            PixelFormat::Xrgb32 => &[0, 0, 0, 0xFF],
            PixelFormat::Prgb32 | PixelFormat::Argb32 => &[0; 4],
            PixelFormat::Rgb24 => &[0; 3],
            PixelFormat::A8 | PixelFormat::I8 => &[0; 1],
            PixelFormat::Prgb64 => &[0; 8],
            PixelFormat::Rgb48 => &[0; 6],
            PixelFormat::A16 => &[0; 2],
        }
    }

    /// Returns the minimal number of bytes needed to store `width` pixels.
    ///
    /// Returns `None` on overflow.
    pub fn row_bytes(self, width: u32) -> Option<usize> {
        (width as usize).checked_mul(self.bytes_per_pixel())
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        PixelFormat::Prgb32
    }
}

impl core::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            PixelFormat::Prgb32 => "PRGB32",
            PixelFormat::Argb32 => "ARGB32",
            PixelFormat::Xrgb32 => "XRGB32",
            PixelFormat::Rgb24 => "RGB24",
            PixelFormat::A8 => "A8",
            PixelFormat::I8 => "I8",
            PixelFormat::Prgb64 => "PRGB64",
            PixelFormat::Rgb48 => "RGB48",
            PixelFormat::A16 => "A16",
        };

        f.write_str(name)
    }
}
