//! # `simdist` Core
//!
//! Runtime CPU-dispatched SIMD kernels for pairwise distance metrics over
//! dense `f32` / `f64` vectors.
//!
//! ## Features
//!
//! - **Two metrics**: Manhattan (L1) and reduced Euclidean (squared L2)
//! - **Five tiers**: AVX-512, AVX2+FMA, SSE2, ARM NEON and a portable scalar baseline
//! - **One probe per kernel**: the best variant is bound on first use and cached
//! - **Uniform contract**: callers never see which variant executed
//!
//! ## Quick Start
//!
//! ```rust
//! use simdist_core::{euclidean_rdist, manhattan, Metric};
//!
//! let a = [1.0_f32, 2.0, 3.0];
//! let b = [4.0_f32, 0.0, 3.0];
//!
//! assert_eq!(manhattan(&a, &b), 5.0);
//! assert_eq!(euclidean_rdist(&a, &b), 13.0);
//!
//! // Reduced distances convert back to true distances on demand.
//! let d = Metric::Euclidean.rdist_to_dist(euclidean_rdist(&a, &b));
//! assert!((d - 13.0_f32.sqrt()).abs() < 1e-6);
//! ```

#![warn(missing_docs)]
#![cfg_attr(
    test,
    allow(
        clippy::float_cmp,
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )
)]

pub mod config;
pub mod distance;
#[cfg(test)]
mod distance_tests;
pub mod element;
pub mod error;
pub mod metric;
pub mod simd_native;

pub use config::DispatchConfig;
pub use distance::{
    euclidean, euclidean_rdist, manhattan, reduced_distance, reduced_distance_dyn,
    reduced_distance_raw, registry, selected_tier, simd_tier, warmup, Operands,
};
pub use element::{Element, ElementType, Scalar};
pub use error::{Error, Result};
pub use metric::Metric;
pub use simd_native::{CpuFeatures, DispatchRegistry, KernelFn, Tier, Variant};
