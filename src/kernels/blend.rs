// Copyright 2018 Google Inc.
// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Compositing operators math.

use super::precision::{Math, Pixel};
use crate::CompositeOp;

pub trait Blend: 'static {
    const OP: CompositeOp;

    /// Whether the result depends on the destination.
    const READS_DST: bool = true;

    fn blend(m: Math, s: Pixel, d: Pixel) -> Pixel;
}

macro_rules! blend_fn {
    ($name:ident, $op:ident, |$m:ident, $s:ident, $d:ident, $sa:ident, $da:ident| $f:expr) => {
        pub enum $name {}

        impl Blend for $name {
            const OP: CompositeOp = CompositeOp::$op;

            #[inline(always)]
            fn blend(m: Math, s: Pixel, d: Pixel) -> Pixel {
                #[inline(always)]
                #[allow(unused_variables)]
                fn f($m: Math, $s: u64, $d: u64, $sa: u64, $da: u64) -> u64 {
                    $f
                }

                let sa = u64::from(s.a);
                let da = u64::from(d.a);
                let c = |s: u32, d: u32| f(m, u64::from(s), u64::from(d), sa, da).min(m.max) as u32;
                Pixel::new(c(s.r, d.r), c(s.g, d.g), c(s.b, d.b), c(s.a, d.a))
            }
        }
    };
}

blend_fn!(SourceAtop,      SrcAtop,  |m, s, d, sa, da| m.div(s * da + d * m.inv(sa)));
blend_fn!(DestinationAtop, DstAtop,  |m, s, d, sa, da| m.div(d * sa + s * m.inv(da)));
blend_fn!(SourceIn,        SrcIn,    |m, s, d, sa, da| m.div(s * da));
blend_fn!(DestinationIn,   DstIn,    |m, s, d, sa, da| m.div(d * sa));
blend_fn!(SourceOut,       SrcOut,   |m, s, d, sa, da| m.div(s * m.inv(da)));
blend_fn!(DestinationOut,  DstOut,   |m, s, d, sa, da| m.div(d * m.inv(sa)));
blend_fn!(SourceOver,      SrcOver,  |m, s, d, sa, da| s + m.div(d * m.inv(sa)));
blend_fn!(DestinationOver, DstOver,  |m, s, d, sa, da| d + m.div(s * m.inv(da)));
blend_fn!(Multiply,        Multiply, |m, s, d, sa, da| m.div(s * m.inv(da) + d * m.inv(sa) + s * d));
blend_fn!(Screen,          Screen,   |m, s, d, sa, da| (s + d).saturating_sub(m.div(s * d)));
blend_fn!(Xor,             Xor,      |m, s, d, sa, da| m.div(s * m.inv(da) + d * m.inv(sa)));
blend_fn!(Plus,            Add,      |m, s, d, sa, da| s + d);

macro_rules! blend_fn2 {
    ($name:ident, $op:ident, |$m:ident, $s:ident, $d:ident, $sa:ident, $da:ident| $f:expr) => {
        pub enum $name {}

        impl Blend for $name {
            const OP: CompositeOp = CompositeOp::$op;

            #[inline(always)]
            fn blend(m: Math, s: Pixel, d: Pixel) -> Pixel {
                #[inline(always)]
                #[allow(unused_variables)]
                fn f($m: Math, $s: u64, $d: u64, $sa: u64, $da: u64) -> u64 {
                    $f
                }

                // The same logic applied to color, and source_over for alpha.
                let sa = u64::from(s.a);
                let da = u64::from(d.a);
                let c = |s: u32, d: u32| f(m, u64::from(s), u64::from(d), sa, da).min(m.max) as u32;
                let a = (sa + m.div(da * m.inv(sa))).min(m.max) as u32;
                Pixel::new(c(s.r, d.r), c(s.g, d.g), c(s.b, d.b), a)
            }
        }
    };
}

blend_fn2!(Darken,     Darken,     |m, s, d, sa, da| (s + d).saturating_sub(m.div((s * da).max(d * sa))));
blend_fn2!(Lighten,    Lighten,    |m, s, d, sa, da| (s + d).saturating_sub(m.div((s * da).min(d * sa))));
blend_fn2!(Exclusion,  Exclusion,  |m, s, d, sa, da| (s + d).saturating_sub(m.div(2 * s * d)));

blend_fn2!(Difference, Difference, |m, s, d, sa, da|
    (s + d).saturating_sub(m.div(2 * (s * da).min(d * sa))));

pub enum Source {}

impl Blend for Source {
    const OP: CompositeOp = CompositeOp::Src;
    const READS_DST: bool = false;

    #[inline(always)]
    fn blend(_: Math, s: Pixel, _: Pixel) -> Pixel {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lowp() -> Math {
        Math { max: 255 }
    }

    #[test]
    fn source_over() {
        let s = Pixel::new(0, 0, 128, 128);
        let d = Pixel::new(255, 0, 0, 255);
        assert_eq!(SourceOver::blend(lowp(), s, d), Pixel::new(127, 0, 128, 255));
    }

    #[test]
    fn opaque_source_over_is_source() {
        let s = Pixel::new(10, 20, 30, 255);
        let d = Pixel::new(200, 100, 50, 230);
        assert_eq!(SourceOver::blend(lowp(), s, d), Source::blend(lowp(), s, d));
    }

    #[test]
    fn plus_is_clamped() {
        let s = Pixel::new(200, 10, 0, 200);
        let d = Pixel::new(100, 10, 0, 100);
        assert_eq!(Plus::blend(lowp(), s, d), Pixel::new(255, 20, 0, 255));
    }

    #[test]
    fn destination_in_with_opaque_source() {
        let s = Pixel::new(1, 2, 3, 255);
        let d = Pixel::new(50, 60, 70, 80);
        assert_eq!(DestinationIn::blend(lowp(), s, d), d);
        assert_eq!(DestinationOut::blend(lowp(), s, d), Pixel::default());
    }

    #[test]
    fn separable_alpha_is_source_over() {
        let s = Pixel::new(100, 0, 0, 128);
        let d = Pixel::new(0, 100, 0, 128);
        let expected_alpha = SourceOver::blend(lowp(), s, d).a;
        assert_eq!(Darken::blend(lowp(), s, d).a, expected_alpha);
        assert_eq!(Lighten::blend(lowp(), s, d).a, expected_alpha);
        assert_eq!(Difference::blend(lowp(), s, d).a, expected_alpha);
        assert_eq!(Exclusion::blend(lowp(), s, d).a, expected_alpha);
    }

    fn highp() -> Math {
        Math { max: 65535 }
    }

    // Colors are (100, 40, 0, 160) over (60, 120, 30, 200) in both precisions.
    fn lowp_pair() -> (Pixel, Pixel) {
        (Pixel::new(100, 40, 0, 160), Pixel::new(60, 120, 30, 200))
    }

    fn highp_pair() -> (Pixel, Pixel) {
        (Pixel::new(25700, 10280, 0, 41120), Pixel::new(15420, 30840, 7710, 51400))
    }

    #[test]
    fn porter_duff_lowp() {
        let (s, d) = lowp_pair();
        let m = lowp();
        assert_eq!(SourceIn::blend(m, s, d), Pixel::new(78, 31, 0, 125));
        assert_eq!(SourceOut::blend(m, s, d), Pixel::new(22, 9, 0, 35));
        assert_eq!(SourceAtop::blend(m, s, d), Pixel::new(101, 76, 11, 200));
        assert_eq!(DestinationOver::blend(m, s, d), Pixel::new(82, 129, 30, 235));
        assert_eq!(DestinationIn::blend(m, s, d), Pixel::new(38, 75, 19, 125));
        assert_eq!(DestinationOut::blend(m, s, d), Pixel::new(22, 45, 11, 75));
        assert_eq!(DestinationAtop::blend(m, s, d), Pixel::new(59, 84, 19, 160));
        assert_eq!(Xor::blend(m, s, d), Pixel::new(44, 53, 11, 109));
        assert_eq!(Plus::blend(m, s, d), Pixel::new(160, 160, 30, 255));
    }

    #[test]
    fn porter_duff_highp() {
        let (s, d) = highp_pair();
        let m = highp();
        assert_eq!(SourceIn::blend(m, s, d), Pixel::new(20157, 8063, 0, 32251));
        assert_eq!(SourceOut::blend(m, s, d), Pixel::new(5543, 2217, 0, 8869));
        assert_eq!(SourceAtop::blend(m, s, d), Pixel::new(25902, 19552, 2872, 51400));
        assert_eq!(DestinationOver::blend(m, s, d), Pixel::new(20963, 33057, 7710, 60269));
        assert_eq!(DestinationIn::blend(m, s, d), Pixel::new(9675, 19351, 4838, 32251));
        assert_eq!(DestinationOut::blend(m, s, d), Pixel::new(5745, 11489, 2872, 19149));
        assert_eq!(DestinationAtop::blend(m, s, d), Pixel::new(15218, 21568, 4838, 41120));
        assert_eq!(Xor::blend(m, s, d), Pixel::new(11288, 13707, 2872, 28018));
        assert_eq!(Plus::blend(m, s, d), Pixel::new(41120, 41120, 7710, 65535));
    }

    #[test]
    fn separable_lowp() {
        let (s, d) = lowp_pair();
        let m = lowp();
        assert_eq!(Multiply::blend(m, s, d), Pixel::new(67, 72, 11, 235));
        assert_eq!(Screen::blend(m, s, d), Pixel::new(136, 141, 30, 235));
        assert_eq!(Darken::blend(m, s, d), Pixel::new(82, 85, 11, 235));
        assert_eq!(Lighten::blend(m, s, d), Pixel::new(122, 129, 30, 235));
        assert_eq!(Difference::blend(m, s, d), Pixel::new(85, 97, 30, 235));
        assert_eq!(Exclusion::blend(m, s, d), Pixel::new(113, 122, 30, 235));
    }

    #[test]
    fn separable_highp() {
        let (s, d) = highp_pair();
        let m = highp();
        assert_eq!(Multiply::blend(m, s, d), Pixel::new(17335, 18544, 2872, 60269));
        assert_eq!(Screen::blend(m, s, d), Pixel::new(35073, 36282, 7710, 60269));
        assert_eq!(Darken::blend(m, s, d), Pixel::new(20963, 21769, 2872, 60269));
        assert_eq!(Lighten::blend(m, s, d), Pixel::new(31445, 33057, 7710, 60269));
        assert_eq!(Difference::blend(m, s, d), Pixel::new(21769, 24995, 7710, 60269));
        assert_eq!(Exclusion::blend(m, s, d), Pixel::new(29026, 31445, 7710, 60269));
    }

    #[test]
    fn identities() {
        let transparent = Pixel::default();
        for (m, d) in [(lowp(), lowp_pair().1), (highp(), highp_pair().1)] {
            let opaque = Pixel::new(0, 0, 0, m.max as u32);
            assert_eq!(SourceOver::blend(m, transparent, d), d);
            assert_eq!(DestinationIn::blend(m, opaque, d), d);
            assert_eq!(DestinationOver::blend(m, transparent, d), d);
            assert_eq!(SourceAtop::blend(m, transparent, d), d);
        }
    }

    #[test]
    fn multiply_and_screen() {
        let s = Pixel::new(255, 0, 128, 255);
        let d = Pixel::new(128, 128, 128, 255);
        assert_eq!(Multiply::blend(lowp(), s, d), Pixel::new(128, 0, 64, 255));
        assert_eq!(Screen::blend(lowp(), s, d), Pixel::new(255, 128, 192, 255));
    }
}
