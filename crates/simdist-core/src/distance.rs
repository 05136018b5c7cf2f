//! Public distance API backed by the process-wide dispatch registry.
//!
//! The registry is created on first use from [`DispatchConfig::from_env`].
//! Each (metric, element type) kernel is bound the first time it is called
//! and reused for the rest of the process.

use std::sync::OnceLock;

use crate::config::DispatchConfig;
use crate::element::{Element, ElementType, Scalar};
use crate::error::Result;
use crate::metric::Metric;
use crate::simd_native::{CpuFeatures, DispatchRegistry, Tier};

static REGISTRY: OnceLock<DispatchRegistry> = OnceLock::new();
static SIMD_TIER: OnceLock<Tier> = OnceLock::new();

/// Process-wide dispatch registry.
///
/// # Panics
///
/// Panics on first use if the `SIMDIST_*` configuration cannot be loaded.
/// Call [`warmup`] first to get the error as a `Result`.
pub fn registry() -> &'static DispatchRegistry {
    REGISTRY.get_or_init(|| match DispatchConfig::from_env() {
        Ok(config) => DispatchRegistry::with_config(config),
        Err(err) => panic!("Invalid simdist configuration: {err}"),
    })
}

/// Widest tier the host CPU supports, ignoring configuration.
///
/// Detected once and cached.
#[must_use]
pub fn simd_tier() -> Tier {
    *SIMD_TIER.get_or_init(|| CpuFeatures::detect().best_tier())
}

/// Tier the process-wide registry binds for `metric` over `element`.
pub fn selected_tier(metric: Metric, element: ElementType) -> Result<Tier> {
    registry().selected_tier(metric, element)
}

/// Binds every kernel of the process-wide registry and runs each once.
///
/// Call at startup to move first-call latency out of the hot path and to
/// surface configuration errors as a `Result` instead of a panic.
pub fn warmup() -> Result<()> {
    let registry = match REGISTRY.get() {
        Some(registry) => registry,
        None => {
            let config = DispatchConfig::from_env()?;
            REGISTRY.get_or_init(|| DispatchRegistry::with_config(config))
        }
    };
    registry.warmup()?;

    let warmup_size = 768;
    let a32 = vec![0.01_f32; warmup_size];
    let b32 = vec![0.02_f32; warmup_size];
    let a64 = vec![0.01_f64; warmup_size];
    let b64 = vec![0.02_f64; warmup_size];
    for _ in 0..3 {
        for metric in Metric::ALL {
            let _ = std::hint::black_box(reduced_distance(metric, &a32, &b32));
            let _ = std::hint::black_box(reduced_distance(metric, &a64, &b64));
        }
    }
    Ok(())
}

/// Manhattan (L1) distance with automatic dispatch to best available SIMD.
///
/// # Panics
///
/// Panics if `a.len() != b.len()`.
#[allow(clippy::inline_always)]
#[inline(always)]
#[must_use]
pub fn manhattan<T: Element>(a: &[T], b: &[T]) -> T {
    registry().kernel::<T>(Metric::Manhattan).compute(a, b)
}

/// Reduced Euclidean distance (squared L2) with automatic dispatch.
///
/// # Panics
///
/// Panics if `a.len() != b.len()`.
#[allow(clippy::inline_always)]
#[inline(always)]
#[must_use]
pub fn euclidean_rdist<T: Element>(a: &[T], b: &[T]) -> T {
    registry().kernel::<T>(Metric::Euclidean).compute(a, b)
}

/// Euclidean (L2) distance. Prefer [`euclidean_rdist`] for comparisons.
///
/// # Panics
///
/// Panics if `a.len() != b.len()`.
#[inline]
#[must_use]
pub fn euclidean<T: Element>(a: &[T], b: &[T]) -> T {
    Metric::Euclidean.rdist_to_dist(euclidean_rdist(a, b))
}

/// Reduced distance for `metric`.
///
/// # Panics
///
/// Panics if `a.len() != b.len()`.
#[allow(clippy::inline_always)]
#[inline(always)]
#[must_use]
pub fn reduced_distance<T: Element>(metric: Metric, a: &[T], b: &[T]) -> T {
    registry().kernel::<T>(metric).compute(a, b)
}

/// Operand pair tagged with its element type.
#[derive(Debug, Clone, Copy)]
pub enum Operands<'a> {
    /// Single-precision vectors.
    F32(&'a [f32], &'a [f32]),
    /// Double-precision vectors.
    F64(&'a [f64], &'a [f64]),
}

impl Operands<'_> {
    /// Element type of both operands.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Operands::F32(..) => ElementType::F32,
            Operands::F64(..) => ElementType::F64,
        }
    }

    /// Length of the first operand.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Operands::F32(a, _) => a.len(),
            Operands::F64(a, _) => a.len(),
        }
    }

    /// Whether the operands are empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reduced distance for operands whose element type is known only at run time.
///
/// # Panics
///
/// Panics if the two operands differ in length.
#[must_use]
pub fn reduced_distance_dyn(metric: Metric, operands: Operands<'_>) -> Scalar {
    match operands {
        Operands::F32(a, b) => reduced_distance(metric, a, b).into_scalar(),
        Operands::F64(a, b) => reduced_distance(metric, a, b).into_scalar(),
    }
}

/// Reduced distance over raw pointers, for foreign-function glue.
///
/// # Safety
///
/// When `len > 0`, `a` and `b` must each be valid for reads of `len`
/// consecutive, initialized `T` values for the duration of the call.
/// Null pointers are accepted only with `len == 0`.
#[must_use]
pub unsafe fn reduced_distance_raw<T: Element>(
    metric: Metric,
    a: *const T,
    b: *const T,
    len: usize,
) -> T {
    if len == 0 {
        return T::ZERO;
    }
    // SAFETY: the caller guarantees both pointers cover `len` elements.
    let (a, b) = unsafe {
        (
            std::slice::from_raw_parts(a, len),
            std::slice::from_raw_parts(b, len),
        )
    };
    reduced_distance(metric, a, b)
}
