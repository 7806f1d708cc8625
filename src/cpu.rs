// Copyright 2020 Yevhenii Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

bitflags::bitflags! {
    /// CPU capabilities that kernel sets can depend on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CpuFeatures: u32 {
        /// x86 SSE2.
        const SSE2 = 1 << 0;
        /// x86 SSSE3.
        const SSSE3 = 1 << 1;
        /// x86 SSE4.1.
        const SSE4_1 = 1 << 2;
        /// x86 AVX2.
        const AVX2 = 1 << 3;
        /// AArch64 Neon.
        const NEON = 1 << 4;
        /// WebAssembly 128-bit SIMD.
        const SIMD128 = 1 << 5;
    }
}

impl CpuFeatures {
    /// Queries the current CPU.
    ///
    /// On targets without runtime detection only compile-time features are reported.
    pub fn detect() -> Self {
        #[allow(unused_mut)]
        let mut features = CpuFeatures::empty();

        cfg_if::cfg_if! {
            if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
                features.set(CpuFeatures::SSE2, std::is_x86_feature_detected!("sse2"));
                features.set(CpuFeatures::SSSE3, std::is_x86_feature_detected!("ssse3"));
                features.set(CpuFeatures::SSE4_1, std::is_x86_feature_detected!("sse4.1"));
                features.set(CpuFeatures::AVX2, std::is_x86_feature_detected!("avx2"));
            } else if #[cfg(target_arch = "aarch64")] {
                features.set(CpuFeatures::NEON, std::arch::is_aarch64_feature_detected!("neon"));
            } else if #[cfg(target_arch = "wasm32")] {
                features.set(CpuFeatures::SIMD128, cfg!(target_feature = "simd128"));
            }
        }

        log::debug!("Detected CPU features: {:?}.", features);
        features
    }
}
