//! Native SIMD distance kernels with runtime dispatch.
//!
//! This module provides hand-written SIMD realizations of the Manhattan and
//! reduced Euclidean kernels using `core::arch` intrinsics, and the registry
//! that binds the best one for the executing CPU.
//!
//! # Module Structure
//!
//! - `detect`: `Tier` and `CpuFeatures` runtime probing
//! - `scalar`: Portable baseline kernels and the shared scalar tail
//! - `x86_sse2`: SSE2 kernels (x86_64 only)
//! - `x86_avx2`: AVX2+FMA kernels (x86_64 only)
//! - `x86_avx512`: AVX-512F kernels (x86_64 only)
//! - `neon`: ARM NEON kernels (aarch64 only)
//! - `variants`: Per-type kernel tables, widest tier first
//! - `dispatch`: `Variant`, `DispatchRegistry` and the selection rule
//!
//! # Lane widths
//!
//! | Tier   | f32 | f64 |
//! |--------|-----|-----|
//! | AVX-512| 16  | 8   |
//! | AVX2   | 8   | 4   |
//! | SSE2   | 4   | 2   |
//! | NEON   | 4   | 2   |
//! | Scalar | 1   | 1   |
#![allow(clippy::doc_markdown)] // Contains ISA/architecture nomenclature in docs.

// =============================================================================
// Unsafe Invariants Reference
// =============================================================================
// SAFETY: Shared invariants for SIMD unsafe code in this module tree.
// - Condition 1: Pointer arithmetic is derived from slice pointers with loop
//   bounds proving in-range access for each lane width.
// - Condition 2: Target-featured kernels are reachable only through variants
//   that passed `CpuFeatures::supports` for the running host.
// - Condition 3: All loads use unaligned intrinsics (`*_loadu_*`, `vld1q_*`).
// - Condition 4: Both operands have equal length; the safe entry points
//   assert it, the raw-pointer entry point documents it as a caller duty.

mod detect;
pub(crate) mod scalar;

#[cfg(target_arch = "x86_64")]
mod x86_avx2;
#[cfg(target_arch = "x86_64")]
mod x86_avx512;
#[cfg(target_arch = "x86_64")]
mod x86_sse2;

#[cfg(target_arch = "aarch64")]
mod neon;

mod dispatch;
mod variants;

pub(crate) use dispatch::{select_variant, KernelSlots, VariantTables};

pub use detect::{CpuFeatures, Tier};
pub use dispatch::{DispatchRegistry, KernelFn, Variant};

// =============================================================================
// Tests (separate files per project rules)
// =============================================================================

#[cfg(test)]
mod simd_native_dispatch_tests;
