/*!
`tiny-blit` is a raster composition engine.

It keeps a table of blit kernels indexed by destination format, compositing operator
and source format, and a conversion table derived from it.

```
use tiny_blit::{CompositeOp, KernelTable, PixelFormat};

let table = KernelTable::global();
let blit = table.vblit_line(PixelFormat::Prgb32, CompositeOp::SrcOver, PixelFormat::Rgb24).unwrap();

let src = [0, 0, 255, 0, 0, 255];
let mut dst = [0; 8];
blit(&mut dst, &src, 2, &Default::default());
assert_eq!(dst, [0, 0, 255, 255, 0, 0, 255, 255]);
```
*/

#![doc(html_root_url = "https://docs.rs/tiny-blit/0.1.0")]
#![warn(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]

#![allow(clippy::identity_op)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::upper_case_acronyms)]

mod color;
mod composite_op;
mod cpu;
mod geom;
mod kernels;
mod painter;
mod surface;
mod table;
mod wide;

pub use tiny_blit_format::{ByteOrder, ChannelLayout, Depth, PixelFormat, FORMAT_COUNT};

pub use color::ALPHA_U16_OPAQUE;
pub use color::{demultiply_u8, narrow_u16, premultiply_u16, premultiply_u8, widen_u8};
pub use color::{Palette, Solid, SolidKind, SOLID_KIND_COUNT};
pub use composite_op::{CompositeOp, OPERATOR_COUNT};
pub use cpu::CpuFeatures;
pub use geom::{IntRect, IntSize};
pub use kernels::{BlitClosure, CBlitLineFn, CBlitSpanFn, KernelSet, VBlitLineFn, VBlitSpanFn};
pub use kernels::{CopyWidth, COPY_WIDTH_COUNT};
pub use kernels::generic::Generic;
pub use kernels::wide::Wide;
pub use painter::{blit, blit_masked, fill_rect, fill_rect_masked, Painter};
pub use surface::{Surface, SurfaceMut, SurfaceRef};
pub use table::{BlitVariant, BuildError, Canonical, CompositeFuncs, ConvertTable};
pub use table::{Kernel, KernelTable, Slot, TableBuilder};

/// An integer length that is guarantee to be > 0
type LengthU32 = core::num::NonZeroU32;
