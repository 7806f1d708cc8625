use bencher::{benchmark_group, benchmark_main, Bencher};

use tiny_blit::*;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 1000;

fn fill_rect(table: &KernelTable, op: CompositeOp, argb: u32, bencher: &mut Bencher) {
    let mut surface = Surface::new(WIDTH, HEIGHT, PixelFormat::Prgb32).unwrap();
    let rect = IntRect::from_xywh(50, 20, 812, 777).unwrap();
    let solid = Solid::from_argb32(argb);
    let painter = Painter::with_table(table);

    bencher.iter(|| {
        painter.fill_rect(&mut surface.as_mut(), rect, &solid, op)
    });
}

fn blit(table: &KernelTable, op: CompositeOp, src_format: PixelFormat, bencher: &mut Bencher) {
    let mut dst = Surface::new(WIDTH, HEIGHT, PixelFormat::Prgb32).unwrap();
    let mut src = Surface::new(WIDTH, HEIGHT, src_format).unwrap();
    src.fill(&Solid::from_argb32(0xC8327F96));
    let painter = Painter::with_table(table);

    bencher.iter(|| {
        painter.blit(&mut dst.as_mut(), 0, 0, &src.as_ref(), op)
    });
}

fn blit_masked(table: &KernelTable, op: CompositeOp, bencher: &mut Bencher) {
    let mut dst = Surface::new(WIDTH, HEIGHT, PixelFormat::Prgb32).unwrap();
    let mut src = Surface::new(WIDTH, HEIGHT, PixelFormat::Prgb32).unwrap();
    src.fill(&Solid::from_argb32(0xC8327F96));
    let mask: Vec<u8> = (0..WIDTH * HEIGHT).map(|i| i as u8).collect();
    let painter = Painter::with_table(table);

    bencher.iter(|| {
        painter.blit_masked(&mut dst.as_mut(), 0, 0, &src.as_ref(), op, &mask)
    });
}

fn generic() -> KernelTable {
    TableBuilder::new(CpuFeatures::empty()).build().unwrap()
}

fn fill_src_over_generic(bencher: &mut Bencher) {
    fill_rect(&generic(), CompositeOp::SrcOver, 0xC8327F96, bencher)
}

fn fill_src_over_global(bencher: &mut Bencher) {
    fill_rect(KernelTable::global(), CompositeOp::SrcOver, 0xC8327F96, bencher)
}

fn fill_opaque_global(bencher: &mut Bencher) {
    fill_rect(KernelTable::global(), CompositeOp::SrcOver, 0xFF327F96, bencher)
}

fn fill_multiply_global(bencher: &mut Bencher) {
    fill_rect(KernelTable::global(), CompositeOp::Multiply, 0xC8327F96, bencher)
}

fn blit_prgb32_generic(bencher: &mut Bencher) {
    blit(&generic(), CompositeOp::SrcOver, PixelFormat::Prgb32, bencher)
}

fn blit_prgb32_global(bencher: &mut Bencher) {
    blit(KernelTable::global(), CompositeOp::SrcOver, PixelFormat::Prgb32, bencher)
}

fn blit_rgb24_global(bencher: &mut Bencher) {
    blit(KernelTable::global(), CompositeOp::SrcOver, PixelFormat::Rgb24, bencher)
}

fn blit_argb32_global(bencher: &mut Bencher) {
    blit(KernelTable::global(), CompositeOp::SrcOver, PixelFormat::Argb32, bencher)
}

fn blit_prgb64_global(bencher: &mut Bencher) {
    blit(KernelTable::global(), CompositeOp::SrcOver, PixelFormat::Prgb64, bencher)
}

fn blit_masked_generic(bencher: &mut Bencher) {
    blit_masked(&generic(), CompositeOp::SrcOver, bencher)
}

fn blit_masked_global(bencher: &mut Bencher) {
    blit_masked(KernelTable::global(), CompositeOp::SrcOver, bencher)
}

benchmark_group!(benches,
    fill_src_over_generic,
    fill_src_over_global,
    fill_opaque_global,
    fill_multiply_global,
    blit_prgb32_generic,
    blit_prgb32_global,
    blit_rgb24_global,
    blit_argb32_global,
    blit_prgb64_global,
    blit_masked_generic,
    blit_masked_global
);
benchmark_main!(benches);
