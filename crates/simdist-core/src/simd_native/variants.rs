//! Per-type kernel tables, widest tier first.
//!
//! Each (metric, element type) pair lists the variants compiled for the
//! target architecture, always ending with the scalar baseline.

use std::sync::OnceLock;

use crate::element::sealed::Sealed;
use crate::metric::Metric;

use super::detect::Tier;
use super::dispatch::{KernelSlots, Variant, VariantTables};
use super::scalar::{euclidean_rdist_scalar, manhattan_scalar};

#[cfg(target_arch = "aarch64")]
use super::neon;
#[cfg(target_arch = "x86_64")]
use super::{x86_avx2, x86_avx512, x86_sse2};

fn manhattan_f32() -> &'static [Variant<f32>] {
    #[cfg(target_arch = "x86_64")]
    {
        const TABLE: &[Variant<f32>] = &[
            Variant::new(Tier::Avx512, x86_avx512::manhattan_f32_avx512),
            Variant::new(Tier::Avx2, x86_avx2::manhattan_f32_avx2),
            Variant::new(Tier::Sse2, x86_sse2::manhattan_f32_sse2),
            Variant::new(Tier::Scalar, manhattan_scalar::<f32>),
        ];
        return TABLE;
    }

    #[cfg(target_arch = "aarch64")]
    {
        const TABLE: &[Variant<f32>] = &[
            Variant::new(Tier::Neon, neon::manhattan_f32_neon),
            Variant::new(Tier::Scalar, manhattan_scalar::<f32>),
        ];
        return TABLE;
    }

    #[allow(unreachable_code)]
    {
        const TABLE: &[Variant<f32>] = &[Variant::new(Tier::Scalar, manhattan_scalar::<f32>)];
        TABLE
    }
}

fn euclidean_f32() -> &'static [Variant<f32>] {
    #[cfg(target_arch = "x86_64")]
    {
        const TABLE: &[Variant<f32>] = &[
            Variant::new(Tier::Avx512, x86_avx512::euclidean_rdist_f32_avx512),
            Variant::new(Tier::Avx2, x86_avx2::euclidean_rdist_f32_avx2),
            Variant::new(Tier::Sse2, x86_sse2::euclidean_rdist_f32_sse2),
            Variant::new(Tier::Scalar, euclidean_rdist_scalar::<f32>),
        ];
        return TABLE;
    }

    #[cfg(target_arch = "aarch64")]
    {
        const TABLE: &[Variant<f32>] = &[
            Variant::new(Tier::Neon, neon::euclidean_rdist_f32_neon),
            Variant::new(Tier::Scalar, euclidean_rdist_scalar::<f32>),
        ];
        return TABLE;
    }

    #[allow(unreachable_code)]
    {
        const TABLE: &[Variant<f32>] =
            &[Variant::new(Tier::Scalar, euclidean_rdist_scalar::<f32>)];
        TABLE
    }
}

fn manhattan_f64() -> &'static [Variant<f64>] {
    #[cfg(target_arch = "x86_64")]
    {
        const TABLE: &[Variant<f64>] = &[
            Variant::new(Tier::Avx512, x86_avx512::manhattan_f64_avx512),
            Variant::new(Tier::Avx2, x86_avx2::manhattan_f64_avx2),
            Variant::new(Tier::Sse2, x86_sse2::manhattan_f64_sse2),
            Variant::new(Tier::Scalar, manhattan_scalar::<f64>),
        ];
        return TABLE;
    }

    #[cfg(target_arch = "aarch64")]
    {
        const TABLE: &[Variant<f64>] = &[
            Variant::new(Tier::Neon, neon::manhattan_f64_neon),
            Variant::new(Tier::Scalar, manhattan_scalar::<f64>),
        ];
        return TABLE;
    }

    #[allow(unreachable_code)]
    {
        const TABLE: &[Variant<f64>] = &[Variant::new(Tier::Scalar, manhattan_scalar::<f64>)];
        TABLE
    }
}

fn euclidean_f64() -> &'static [Variant<f64>] {
    #[cfg(target_arch = "x86_64")]
    {
        const TABLE: &[Variant<f64>] = &[
            Variant::new(Tier::Avx512, x86_avx512::euclidean_rdist_f64_avx512),
            Variant::new(Tier::Avx2, x86_avx2::euclidean_rdist_f64_avx2),
            Variant::new(Tier::Sse2, x86_sse2::euclidean_rdist_f64_sse2),
            Variant::new(Tier::Scalar, euclidean_rdist_scalar::<f64>),
        ];
        return TABLE;
    }

    #[cfg(target_arch = "aarch64")]
    {
        const TABLE: &[Variant<f64>] = &[
            Variant::new(Tier::Neon, neon::euclidean_rdist_f64_neon),
            Variant::new(Tier::Scalar, euclidean_rdist_scalar::<f64>),
        ];
        return TABLE;
    }

    #[allow(unreachable_code)]
    {
        const TABLE: &[Variant<f64>] =
            &[Variant::new(Tier::Scalar, euclidean_rdist_scalar::<f64>)];
        TABLE
    }
}

impl Sealed for f32 {
    fn variants(metric: Metric) -> &'static [Variant<Self>] {
        match metric {
            Metric::Manhattan => manhattan_f32(),
            Metric::Euclidean => euclidean_f32(),
        }
    }

    fn table(tables: &VariantTables) -> fn(Metric) -> &'static [Variant<Self>] {
        tables.f32
    }

    fn slot(slots: &KernelSlots, metric: Metric) -> &OnceLock<Option<Variant<Self>>> {
        match metric {
            Metric::Manhattan => &slots.manhattan_f32,
            Metric::Euclidean => &slots.euclidean_f32,
        }
    }
}

impl Sealed for f64 {
    fn variants(metric: Metric) -> &'static [Variant<Self>] {
        match metric {
            Metric::Manhattan => manhattan_f64(),
            Metric::Euclidean => euclidean_f64(),
        }
    }

    fn table(tables: &VariantTables) -> fn(Metric) -> &'static [Variant<Self>] {
        tables.f64
    }

    fn slot(slots: &KernelSlots, metric: Metric) -> &OnceLock<Option<Variant<Self>>> {
        match metric {
            Metric::Manhattan => &slots.manhattan_f64,
            Metric::Euclidean => &slots.euclidean_f64,
        }
    }
}
