//! AVX-512F kernel implementations for x86_64.
//!
//! 16-wide `f32` and 8-wide `f64` kernels. The remainder goes through the
//! scalar tail instead of a masked load so every tier shares one tail rule.
//!
//! All functions require runtime AVX-512F detection before calling.

#![allow(clippy::wildcard_imports)]
#![allow(clippy::incompatible_msrv)]

use std::arch::x86_64::*;

use super::scalar;

// =============================================================================
// f32
// =============================================================================

/// AVX-512 Manhattan distance for `f32`.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX-512F (runtime detection in the dispatch registry)
/// - `a.len() == b.len()`
#[target_feature(enable = "avx512f")]
pub(crate) unsafe fn manhattan_f32_avx512(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: offset = i * 16 with i < len / 16, so each load stays in bounds.
    let len = a.len();
    let chunks = len / 16;
    let mut sum = _mm512_setzero_ps();

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 16;
        let va = _mm512_loadu_ps(a_ptr.add(offset));
        let vb = _mm512_loadu_ps(b_ptr.add(offset));
        sum = _mm512_add_ps(sum, _mm512_abs_ps(_mm512_sub_ps(va, vb)));
    }

    scalar::manhattan_tail(a, b, chunks * 16, _mm512_reduce_add_ps(sum))
}

/// AVX-512 reduced Euclidean distance for `f32`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_avx512`].
#[target_feature(enable = "avx512f")]
pub(crate) unsafe fn euclidean_rdist_f32_avx512(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len();
    let chunks = len / 16;
    let mut sum = _mm512_setzero_ps();

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 16;
        let va = _mm512_loadu_ps(a_ptr.add(offset));
        let vb = _mm512_loadu_ps(b_ptr.add(offset));
        let diff = _mm512_sub_ps(va, vb);
        sum = _mm512_fmadd_ps(diff, diff, sum);
    }

    scalar::euclidean_rdist_tail(a, b, chunks * 16, _mm512_reduce_add_ps(sum))
}

// =============================================================================
// f64
// =============================================================================

/// AVX-512 Manhattan distance for `f64`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_avx512`].
#[target_feature(enable = "avx512f")]
pub(crate) unsafe fn manhattan_f64_avx512(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len();
    let chunks = len / 8;
    let mut sum = _mm512_setzero_pd();

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 8;
        let va = _mm512_loadu_pd(a_ptr.add(offset));
        let vb = _mm512_loadu_pd(b_ptr.add(offset));
        sum = _mm512_add_pd(sum, _mm512_abs_pd(_mm512_sub_pd(va, vb)));
    }

    scalar::manhattan_tail(a, b, chunks * 8, _mm512_reduce_add_pd(sum))
}

/// AVX-512 reduced Euclidean distance for `f64`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_avx512`].
#[target_feature(enable = "avx512f")]
pub(crate) unsafe fn euclidean_rdist_f64_avx512(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len();
    let chunks = len / 8;
    let mut sum = _mm512_setzero_pd();

    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    for i in 0..chunks {
        let offset = i * 8;
        let va = _mm512_loadu_pd(a_ptr.add(offset));
        let vb = _mm512_loadu_pd(b_ptr.add(offset));
        let diff = _mm512_sub_pd(va, vb);
        sum = _mm512_fmadd_pd(diff, diff, sum);
    }

    scalar::euclidean_rdist_tail(a, b, chunks * 8, _mm512_reduce_add_pd(sum))
}
