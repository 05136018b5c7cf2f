//! ARM NEON kernel implementations for aarch64.
//!
//! 4-wide `f32` and 2-wide `f64` kernels. `vabdq_*` computes the absolute
//! difference in one instruction for the Manhattan path.

use std::arch::aarch64::*;

use super::scalar;

/// NEON Manhattan distance for `f32`.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports NEON (runtime detection in the dispatch registry)
/// - `a.len() == b.len()`
#[target_feature(enable = "neon")]
pub(crate) unsafe fn manhattan_f32_neon(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: offset + 4 <= len for every load; vld1q_f32 accepts unaligned pointers.
    let len = a.len();
    let chunks = len / 4;
    let mut sum = vdupq_n_f32(0.0);

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 4;
        let va = vld1q_f32(a_ptr.add(offset));
        let vb = vld1q_f32(b_ptr.add(offset));
        sum = vaddq_f32(sum, vabdq_f32(va, vb));
    }

    scalar::manhattan_tail(a, b, chunks * 4, vaddvq_f32(sum))
}

/// NEON reduced Euclidean distance for `f32`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_neon`].
#[target_feature(enable = "neon")]
pub(crate) unsafe fn euclidean_rdist_f32_neon(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len();
    let chunks = len / 4;
    let mut sum = vdupq_n_f32(0.0);

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 4;
        let va = vld1q_f32(a_ptr.add(offset));
        let vb = vld1q_f32(b_ptr.add(offset));
        let diff = vsubq_f32(va, vb);
        sum = vfmaq_f32(sum, diff, diff);
    }

    scalar::euclidean_rdist_tail(a, b, chunks * 4, vaddvq_f32(sum))
}

/// NEON Manhattan distance for `f64`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_neon`].
#[target_feature(enable = "neon")]
pub(crate) unsafe fn manhattan_f64_neon(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len();
    let chunks = len / 2;
    let mut sum = vdupq_n_f64(0.0);

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 2;
        let va = vld1q_f64(a_ptr.add(offset));
        let vb = vld1q_f64(b_ptr.add(offset));
        sum = vaddq_f64(sum, vabdq_f64(va, vb));
    }

    scalar::manhattan_tail(a, b, chunks * 2, vaddvq_f64(sum))
}

/// NEON reduced Euclidean distance for `f64`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_neon`].
#[target_feature(enable = "neon")]
pub(crate) unsafe fn euclidean_rdist_f64_neon(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len();
    let chunks = len / 2;
    let mut sum = vdupq_n_f64(0.0);

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 2;
        let va = vld1q_f64(a_ptr.add(offset));
        let vb = vld1q_f64(b_ptr.add(offset));
        let diff = vsubq_f64(va, vb);
        sum = vfmaq_f64(sum, diff, diff);
    }

    scalar::euclidean_rdist_tail(a, b, chunks * 2, vaddvq_f64(sum))
}
