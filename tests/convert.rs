use tiny_blit::*;

fn roundtrip(canonical: Canonical, format: PixelFormat, src: &[u8]) -> Vec<u8> {
    let convert = KernelTable::global().convert();
    let len = src.len() / format.bytes_per_pixel();

    let mut tmp = vec![0; len * canonical.format().bytes_per_pixel()];
    convert.to_canonical(canonical, format)(&mut tmp, src, len, &BlitClosure::EMPTY);

    let mut dst = vec![0; src.len()];
    convert.from_canonical(canonical, format).unwrap()(&mut dst, &tmp, len, &BlitClosure::EMPTY);
    dst
}

#[test]
fn lossless_roundtrips() {
    // Opaque or alpha-only data survives a round trip through both canonical formats.
    let rgb24: Vec<u8> = (0..=255).collect::<Vec<u8>>().repeat(3);
    assert_eq!(roundtrip(Canonical::Argb32, PixelFormat::Rgb24, &rgb24), rgb24);
    assert_eq!(roundtrip(Canonical::Argb64, PixelFormat::Rgb24, &rgb24), rgb24);

    let a8: Vec<u8> = (0..=255).collect();
    assert_eq!(roundtrip(Canonical::Argb32, PixelFormat::A8, &a8), a8);
    assert_eq!(roundtrip(Canonical::Argb64, PixelFormat::A8, &a8), a8);

    let xrgb: Vec<u8> = (0..64u8).flat_map(|i| [i, i * 2, i * 3, 0xFF]).collect();
    assert_eq!(roundtrip(Canonical::Argb32, PixelFormat::Xrgb32, &xrgb), xrgb);

    let a16: Vec<u8> = (0..=255u16).flat_map(|i| (i * 255 + i % 7).to_le_bytes()).collect();
    assert_eq!(roundtrip(Canonical::Argb64, PixelFormat::A16, &a16), a16);

    let rgb48: Vec<u8> = (0..90u16).flat_map(|i| (i * 731).to_le_bytes()).collect();
    assert_eq!(roundtrip(Canonical::Argb64, PixelFormat::Rgb48, &rgb48), rgb48);
}

#[test]
fn premultiplied_roundtrips() {
    let prgb32: Vec<u8> = (0..=255u8).flat_map(|a| {
        [premultiply_u8(0x10, a), premultiply_u8(0x80, a), premultiply_u8(0xF0, a), a]
    }).collect();
    assert_eq!(roundtrip(Canonical::Argb32, PixelFormat::Prgb32, &prgb32), prgb32);
    assert_eq!(roundtrip(Canonical::Argb64, PixelFormat::Prgb32, &prgb32), prgb32);
}

#[test]
fn straight_alpha_roundtrips_when_opaque() {
    let argb32: Vec<u8> = (0..=255u8).flat_map(|i| [i, 255 - i, i / 2, 0xFF]).collect();
    assert_eq!(roundtrip(Canonical::Argb32, PixelFormat::Argb32, &argb32), argb32);
}

#[test]
fn narrowing_rounds_to_nearest() {
    let convert = KernelTable::global().convert();
    let f = convert.from_argb64(PixelFormat::Prgb32).unwrap();

    for v in [0u16, 0x0080, 0x0081, 0x7F7F, 0x8080, 0xFEFE, 0xFFFF].iter() {
        let c = v.to_le_bytes();
        let src = [c[0], c[1], c[0], c[1], c[0], c[1], 0xFF, 0xFF];
        let mut dst = [0; 4];
        f(&mut dst, &src, 1, &BlitClosure::EMPTY);
        let expected = narrow_u16(*v);
        assert_eq!(dst, [expected, expected, expected, 0xFF], "{:#06x}", v);
        assert_eq!(expected, ((u32::from(*v) * 255 + 32767) / 65535) as u8);
    }
}

#[test]
fn widening_is_exact() {
    let convert = KernelTable::global().convert();
    let f = convert.to_argb64(PixelFormat::Prgb32);

    let src = [0x00, 0x7F, 0xFF, 0xFF];
    let mut dst = [0; 8];
    f(&mut dst, &src, 1, &BlitClosure::EMPTY);
    assert_eq!(dst, [0x00, 0x00, 0x7F, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn entries_are_src_kernels() {
    let table = KernelTable::global();
    let convert = table.convert();

    for format in PixelFormat::ALL.iter() {
        let to = table.vblit_line(PixelFormat::Prgb32, CompositeOp::Src, *format).unwrap();
        assert_eq!(convert.to_argb32(*format) as usize, to as usize);

        let to = table.vblit_line(PixelFormat::Prgb64, CompositeOp::Src, *format).unwrap();
        assert_eq!(convert.to_argb64(*format) as usize, to as usize);

        let from = table.vblit_line(*format, CompositeOp::Src, PixelFormat::Prgb32);
        assert_eq!(convert.from_argb32(*format).map(|f| f as usize), from.map(|f| f as usize));
    }

    assert!(convert.from_argb32(PixelFormat::I8).is_none());
    assert!(convert.from_argb64(PixelFormat::I8).is_none());

    // Converting a canonical format into itself is a raw copy.
    let copy = table.copy(CopyWidth::Bits32);
    assert_eq!(convert.to_argb32(PixelFormat::Prgb32) as usize, copy as usize);
}

#[test]
fn indexed_to_canonical() {
    let palette = Palette::from_argb32(&[0xFFFF0000, 0x00000000, 0x80FFFFFF]).unwrap();
    let closure = BlitClosure::with_palette(&palette);
    let convert = KernelTable::global().convert();

    let mut dst = [0; 12];
    convert.to_argb32(PixelFormat::I8)(&mut dst, &[0, 1, 2], 3, &closure);
    assert_eq!(dst, [0, 0, 255, 255, 0, 0, 0, 0, 128, 128, 128, 128]);
}
