// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

// u16x16 is implemented as [u16; 16] and not as [u16x8; 2].
// On most targets rustc/llvm will autovectorize it better than us.
// Only AArch64 Neon gets explicit instructions.

mod u16x16_t;

pub use u16x16_t::{div255, inv, lerp, u16x16};
