//! AVX2+FMA kernel implementations for x86_64.
//!
//! 8-wide `f32` and 4-wide `f64` kernels for Manhattan and reduced Euclidean
//! distance. Large inputs run a 2-accumulator main loop to hide add latency.
//!
//! All functions require runtime AVX2+FMA detection before calling.

#![allow(clippy::wildcard_imports)]
#![allow(clippy::similar_names)]

use std::arch::x86_64::*;

use super::scalar;

/// Horizontal sum: [a0..a7] -> scalar.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn hsum_ps(v: __m256) -> f32 {
    let hi = _mm256_extractf128_ps(v, 1);
    let lo = _mm256_castps256_ps128(v);
    let sum128 = _mm_add_ps(lo, hi);
    let shuf = _mm_movehdup_ps(sum128);
    let sums = _mm_add_ps(sum128, shuf);
    let shuf2 = _mm_movehl_ps(sums, sums);
    _mm_cvtss_f32(_mm_add_ss(sums, shuf2))
}

/// Horizontal sum: [a0..a3] -> scalar.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn hsum_pd(v: __m256d) -> f64 {
    let hi = _mm256_extractf128_pd(v, 1);
    let lo = _mm256_castpd256_pd128(v);
    let sum128 = _mm_add_pd(lo, hi);
    _mm_cvtsd_f64(_mm_add_sd(sum128, _mm_unpackhi_pd(sum128, sum128)))
}

// =============================================================================
// f32
// =============================================================================

/// AVX2 Manhattan distance for `f32`.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX2+FMA (runtime detection in the dispatch registry)
/// - `a.len() == b.len()`
#[target_feature(enable = "avx2", enable = "fma")]
pub(crate) unsafe fn manhattan_f32_avx2(a: &[f32], b: &[f32]) -> f32 {
    // SAFETY: every load reads [offset, offset + 8) with offset + 8 <= len.
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();
    let sign_mask = _mm256_set1_ps(-0.0);

    let mut sum0 = _mm256_setzero_ps();
    let mut sum1 = _mm256_setzero_ps();

    let mut offset = 0;
    while offset + 16 <= len {
        let d0 = _mm256_sub_ps(
            _mm256_loadu_ps(a_ptr.add(offset)),
            _mm256_loadu_ps(b_ptr.add(offset)),
        );
        let d1 = _mm256_sub_ps(
            _mm256_loadu_ps(a_ptr.add(offset + 8)),
            _mm256_loadu_ps(b_ptr.add(offset + 8)),
        );
        sum0 = _mm256_add_ps(sum0, _mm256_andnot_ps(sign_mask, d0));
        sum1 = _mm256_add_ps(sum1, _mm256_andnot_ps(sign_mask, d1));
        offset += 16;
    }
    if offset + 8 <= len {
        let d = _mm256_sub_ps(
            _mm256_loadu_ps(a_ptr.add(offset)),
            _mm256_loadu_ps(b_ptr.add(offset)),
        );
        sum0 = _mm256_add_ps(sum0, _mm256_andnot_ps(sign_mask, d));
        offset += 8;
    }

    let result = hsum_ps(_mm256_add_ps(sum0, sum1));
    scalar::manhattan_tail(a, b, offset, result)
}

/// AVX2 reduced Euclidean distance for `f32`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_avx2`].
#[target_feature(enable = "avx2", enable = "fma")]
pub(crate) unsafe fn euclidean_rdist_f32_avx2(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut sum0 = _mm256_setzero_ps();
    let mut sum1 = _mm256_setzero_ps();

    let mut offset = 0;
    while offset + 16 <= len {
        let d0 = _mm256_sub_ps(
            _mm256_loadu_ps(a_ptr.add(offset)),
            _mm256_loadu_ps(b_ptr.add(offset)),
        );
        let d1 = _mm256_sub_ps(
            _mm256_loadu_ps(a_ptr.add(offset + 8)),
            _mm256_loadu_ps(b_ptr.add(offset + 8)),
        );
        sum0 = _mm256_fmadd_ps(d0, d0, sum0);
        sum1 = _mm256_fmadd_ps(d1, d1, sum1);
        offset += 16;
    }
    if offset + 8 <= len {
        let d = _mm256_sub_ps(
            _mm256_loadu_ps(a_ptr.add(offset)),
            _mm256_loadu_ps(b_ptr.add(offset)),
        );
        sum0 = _mm256_fmadd_ps(d, d, sum0);
        offset += 8;
    }

    let result = hsum_ps(_mm256_add_ps(sum0, sum1));
    scalar::euclidean_rdist_tail(a, b, offset, result)
}

// =============================================================================
// f64
// =============================================================================

/// AVX2 Manhattan distance for `f64`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_avx2`].
#[target_feature(enable = "avx2", enable = "fma")]
pub(crate) unsafe fn manhattan_f64_avx2(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();
    let sign_mask = _mm256_set1_pd(-0.0);

    let mut sum0 = _mm256_setzero_pd();
    let mut sum1 = _mm256_setzero_pd();

    let mut offset = 0;
    while offset + 8 <= len {
        let d0 = _mm256_sub_pd(
            _mm256_loadu_pd(a_ptr.add(offset)),
            _mm256_loadu_pd(b_ptr.add(offset)),
        );
        let d1 = _mm256_sub_pd(
            _mm256_loadu_pd(a_ptr.add(offset + 4)),
            _mm256_loadu_pd(b_ptr.add(offset + 4)),
        );
        sum0 = _mm256_add_pd(sum0, _mm256_andnot_pd(sign_mask, d0));
        sum1 = _mm256_add_pd(sum1, _mm256_andnot_pd(sign_mask, d1));
        offset += 8;
    }
    if offset + 4 <= len {
        let d = _mm256_sub_pd(
            _mm256_loadu_pd(a_ptr.add(offset)),
            _mm256_loadu_pd(b_ptr.add(offset)),
        );
        sum0 = _mm256_add_pd(sum0, _mm256_andnot_pd(sign_mask, d));
        offset += 4;
    }

    let result = hsum_pd(_mm256_add_pd(sum0, sum1));
    scalar::manhattan_tail(a, b, offset, result)
}

/// AVX2 reduced Euclidean distance for `f64`.
///
/// # Safety
///
/// Same contract as [`manhattan_f32_avx2`].
#[target_feature(enable = "avx2", enable = "fma")]
pub(crate) unsafe fn euclidean_rdist_f64_avx2(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len();
    let a_ptr = a.as_ptr();
    let b_ptr = b.as_ptr();

    let mut sum0 = _mm256_setzero_pd();
    let mut sum1 = _mm256_setzero_pd();

    let mut offset = 0;
    while offset + 8 <= len {
        let d0 = _mm256_sub_pd(
            _mm256_loadu_pd(a_ptr.add(offset)),
            _mm256_loadu_pd(b_ptr.add(offset)),
        );
        let d1 = _mm256_sub_pd(
            _mm256_loadu_pd(a_ptr.add(offset + 4)),
            _mm256_loadu_pd(b_ptr.add(offset + 4)),
        );
        sum0 = _mm256_fmadd_pd(d0, d0, sum0);
        sum1 = _mm256_fmadd_pd(d1, d1, sum1);
        offset += 8;
    }
    if offset + 4 <= len {
        let d = _mm256_sub_pd(
            _mm256_loadu_pd(a_ptr.add(offset)),
            _mm256_loadu_pd(b_ptr.add(offset)),
        );
        sum0 = _mm256_fmadd_pd(d, d, sum0);
        offset += 4;
    }

    let result = hsum_pd(_mm256_add_pd(sum0, sum1));
    scalar::euclidean_rdist_tail(a, b, offset, result)
}
