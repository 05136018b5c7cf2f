//! Scalar implementations of the distance kernels.
//!
//! These functions serve as:
//! - The `Tier::Scalar` variant on every platform
//! - Reference implementations for testing SIMD correctness
//! - Tail-loop handlers for SIMD remainder processing

use crate::element::Element;

/// Scalar Manhattan distance: `Σ |a[i] - b[i]|`.
#[inline]
pub(crate) fn manhattan_scalar<T: Element>(a: &[T], b: &[T]) -> T {
    manhattan_tail(a, b, 0, T::ZERO)
}

/// Scalar reduced Euclidean distance: `Σ (a[i] - b[i])²`.
#[inline]
pub(crate) fn euclidean_rdist_scalar<T: Element>(a: &[T], b: &[T]) -> T {
    euclidean_rdist_tail(a, b, 0, T::ZERO)
}

/// Adds `|a[i] - b[i]|` for every `i >= base` onto `acc`.
///
/// SIMD kernels call this with `base = chunks * lanes` and their horizontally
/// reduced accumulator, so the remainder uses the same combination rule as
/// the baseline.
#[inline]
pub(crate) fn manhattan_tail<T: Element>(a: &[T], b: &[T], base: usize, acc: T) -> T {
    a[base..]
        .iter()
        .zip(&b[base..])
        .fold(acc, |sum, (&x, &y)| sum + (x - y).abs())
}

/// Adds `(a[i] - b[i])²` for every `i >= base` onto `acc`.
#[inline]
pub(crate) fn euclidean_rdist_tail<T: Element>(a: &[T], b: &[T], base: usize, acc: T) -> T {
    a[base..].iter().zip(&b[base..]).fold(acc, |sum, (&x, &y)| {
        let d = x - y;
        sum + d * d
    })
}
