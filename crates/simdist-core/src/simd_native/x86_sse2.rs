//! SSE2 kernel implementations for x86_64.
//!
//! 4-wide `f32` and 2-wide `f64` kernels. SSE2 is part of the x86_64
//! baseline, but the tier is still probed like every other one.

#![allow(clippy::wildcard_imports)]

use std::arch::x86_64::*;

use super::scalar;

/// Horizontal sum of 4 f32 lanes without SSE3 shuffles.
#[target_feature(enable = "sse2")]
#[inline]
unsafe fn hsum_ps(v: __m128) -> f32 {
    // [a, b, c, d] -> [b, a, d, c]
    let shuf = _mm_shuffle_ps(v, v, 0b10_11_00_01);
    let sums = _mm_add_ps(v, shuf);
    let high = _mm_movehl_ps(shuf, sums);
    _mm_cvtss_f32(_mm_add_ss(sums, high))
}

/// Horizontal sum of 2 f64 lanes.
#[target_feature(enable = "sse2")]
#[inline]
unsafe fn hsum_pd(v: __m128d) -> f64 {
    _mm_cvtsd_f64(_mm_add_sd(v, _mm_unpackhi_pd(v, v)))
}

// =============================================================================
// f32
// =============================================================================

/// SSE2 Manhattan distance for `f32`.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports SSE2 (runtime detection in the dispatch registry)
/// - `a.len() == b.len()`
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn manhattan_f32_sse2(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: offset + 4 <= chunks * 4 <= len for every load.
    let len = a.len();
    let chunks = len / 4;
    let sign_mask = _mm_set1_ps(-0.0);
    let mut sum = _mm_setzero_ps();

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 4;
        let va = _mm_loadu_ps(a_ptr.add(offset));
        let vb = _mm_loadu_ps(b_ptr.add(offset));
        let diff = _mm_sub_ps(va, vb);
        sum = _mm_add_ps(sum, _mm_andnot_ps(sign_mask, diff));
    }

    scalar::manhattan_tail(a, b, chunks * 4, hsum_ps(sum))
}

/// SSE2 reduced Euclidean distance for `f32`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_sse2`].
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn euclidean_rdist_f32_sse2(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len();
    let chunks = len / 4;
    let mut sum = _mm_setzero_ps();

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 4;
        let va = _mm_loadu_ps(a_ptr.add(offset));
        let vb = _mm_loadu_ps(b_ptr.add(offset));
        let diff = _mm_sub_ps(va, vb);
        sum = _mm_add_ps(sum, _mm_mul_ps(diff, diff));
    }

    scalar::euclidean_rdist_tail(a, b, chunks * 4, hsum_ps(sum))
}

// =============================================================================
// f64
// =============================================================================

/// SSE2 Manhattan distance for `f64`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_sse2`].
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn manhattan_f64_sse2(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len();
    let chunks = len / 2;
    let sign_mask = _mm_set1_pd(-0.0);
    let mut sum = _mm_setzero_pd();

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 2;
        let va = _mm_loadu_pd(a_ptr.add(offset));
        let vb = _mm_loadu_pd(b_ptr.add(offset));
        let diff = _mm_sub_pd(va, vb);
        sum = _mm_add_pd(sum, _mm_andnot_pd(sign_mask, diff));
    }

    scalar::manhattan_tail(a, b, chunks * 2, hsum_pd(sum))
}

/// SSE2 reduced Euclidean distance for `f64`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_sse2`].
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn euclidean_rdist_f64_sse2(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len();
    let chunks = len / 2;
    let mut sum = _mm_setzero_pd();

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 2;
        let va = _mm_loadu_pd(a_ptr.add(offset));
        let vb = _mm_loadu_pd(b_ptr.add(offset));
        let diff = _mm_sub_pd(va, vb);
        sum = _mm_add_pd(sum, _mm_mul_pd(diff, diff));
    }

    scalar::euclidean_rdist_tail(a, b, chunks * 2, hsum_pd(sum))
}
