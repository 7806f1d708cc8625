use bencher::{benchmark_group, benchmark_main, Bencher};

use tiny_blit::*;

fn convert(from: PixelFormat, to: PixelFormat, bencher: &mut Bencher) {
    let mut surface = Surface::new(1000, 1000, from).unwrap();
    surface.fill(&Solid::from_argb32(0xC8327F96));

    bencher.iter(|| {
        surface.convert(to)
    });
}

fn argb32_to_prgb32(bencher: &mut Bencher) {
    convert(PixelFormat::Argb32, PixelFormat::Prgb32, bencher)
}

fn prgb32_to_argb32(bencher: &mut Bencher) {
    convert(PixelFormat::Prgb32, PixelFormat::Argb32, bencher)
}

fn rgb24_to_xrgb32(bencher: &mut Bencher) {
    convert(PixelFormat::Rgb24, PixelFormat::Xrgb32, bencher)
}

fn prgb32_to_rgb48(bencher: &mut Bencher) {
    convert(PixelFormat::Prgb32, PixelFormat::Rgb48, bencher)
}

benchmark_group!(benches,
    argb32_to_prgb32,
    prgb32_to_argb32,
    rgb24_to_xrgb32,
    prgb32_to_rgb48
);
benchmark_main!(benches);
