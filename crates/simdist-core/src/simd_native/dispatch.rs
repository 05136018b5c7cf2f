//! Runtime kernel selection and dispatch wiring.
//!
//! This module provides:
//! - `Variant`: a compiled kernel tagged with the tier it requires
//! - `DispatchRegistry`: one lazily-bound slot per (metric, element type)
//! - `select_variant()`: the widest-first selection rule shared by all slots

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use crate::config::DispatchConfig;
use crate::element::sealed::Sealed;
use crate::element::{Element, ElementType};
use crate::error::{Error, Result};
use crate::metric::Metric;

use super::detect::{CpuFeatures, Tier};

/// Kernel entry point: `(a, b) -> reduced distance`.
///
/// Unsafe because tiered kernels are compiled with `#[target_feature]` and
/// require `a.len() == b.len()`.
pub type KernelFn<T> = unsafe fn(&[T], &[T]) -> T;

/// A compiled kernel realization for one instruction-set tier.
///
/// Variants handed out by this crate ([`DispatchRegistry::kernel`],
/// [`DispatchRegistry::available_variants`]) have already been checked
/// against the host CPU, so [`Variant::compute`] is safe to call.
pub struct Variant<T: 'static> {
    tier: Tier,
    kernel: KernelFn<T>,
}

impl<T: 'static> Variant<T> {
    pub(crate) const fn new(tier: Tier, kernel: KernelFn<T>) -> Self {
        Self { tier, kernel }
    }

    /// Tier this variant was compiled for.
    #[inline]
    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Raw kernel pointer.
    ///
    /// Calling it is `unsafe`: the caller must pass equal-length slices.
    #[inline]
    #[must_use]
    pub fn kernel(&self) -> KernelFn<T> {
        self.kernel
    }

    /// Runs the kernel on `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if `a.len() != b.len()`.
    #[allow(clippy::inline_always)]
    #[inline(always)]
    #[must_use]
    pub fn compute(&self, a: &[T], b: &[T]) -> T {
        assert_eq!(a.len(), b.len(), "Vector dimensions must match");
        // SAFETY: lengths are equal, and every Variant reachable from outside
        // this module was filtered through `CpuFeatures::supports`.
        unsafe { (self.kernel)(a, b) }
    }
}

impl<T: 'static> Clone for Variant<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for Variant<T> {}

impl<T: 'static> fmt::Debug for Variant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant").field("tier", &self.tier).finish()
    }
}

/// Picks the first variant, widest first, that fits under `ceiling` and runs
/// on a host with `features`.
pub(crate) fn select_variant<T: 'static>(
    variants: &[Variant<T>],
    features: CpuFeatures,
    ceiling: Option<Tier>,
) -> Option<Variant<T>> {
    variants
        .iter()
        .filter(|v| ceiling.is_none_or(|c| v.tier.within(c)))
        .find(|v| features.supports(v.tier))
        .copied()
}

/// Dispatch table entries, one per (metric, element type).
///
/// `None` records a failed selection so it is not retried.
#[derive(Default)]
pub struct KernelSlots {
    pub(crate) manhattan_f32: OnceLock<Option<Variant<f32>>>,
    pub(crate) euclidean_f32: OnceLock<Option<Variant<f32>>>,
    pub(crate) manhattan_f64: OnceLock<Option<Variant<f64>>>,
    pub(crate) euclidean_f64: OnceLock<Option<Variant<f64>>>,
}

/// Variant tables the registry selects from, one lookup per element type.
#[derive(Clone, Copy)]
pub struct VariantTables {
    pub(crate) f32: fn(Metric) -> &'static [Variant<f32>],
    pub(crate) f64: fn(Metric) -> &'static [Variant<f64>],
}

impl Default for VariantTables {
    fn default() -> Self {
        Self {
            f32: <f32 as Sealed>::variants,
            f64: <f64 as Sealed>::variants,
        }
    }
}

/// Registry binding each (metric, element type) pair to a kernel variant.
///
/// Each pair is bound on first use: the registry probes the CPU once,
/// applies the configured tier ceiling, and caches the winner for its own
/// lifetime. Concurrent first calls are serialized by `OnceLock`, so every
/// reader sees either no selection or the complete one.
///
/// The process-wide instance lives behind [`crate::registry`]; tests and
/// embedders may own private registries.
pub struct DispatchRegistry {
    config: DispatchConfig,
    probe: fn() -> CpuFeatures,
    probes: AtomicUsize,
    tables: VariantTables,
    slots: KernelSlots,
}

impl DispatchRegistry {
    /// Creates a registry with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DispatchConfig::default())
    }

    /// Creates a registry with an explicit configuration.
    #[must_use]
    pub fn with_config(config: DispatchConfig) -> Self {
        if let Some(ceiling) = config.max_tier {
            tracing::info!(ceiling = %ceiling, "SIMD tier ceiling active");
        }
        Self {
            config,
            probe: CpuFeatures::detect,
            probes: AtomicUsize::new(0),
            tables: VariantTables::default(),
            slots: KernelSlots::default(),
        }
    }

    /// Creates a registry with a substitute capability probe.
    ///
    /// The probe must never report a feature the host lacks.
    #[cfg(test)]
    pub(crate) fn with_probe(config: DispatchConfig, probe: fn() -> CpuFeatures) -> Self {
        Self {
            probe,
            ..Self::with_config(config)
        }
    }

    /// Replaces the compiled variant tables.
    ///
    /// Every kernel listed must be sound to call for any tier the active
    /// capability probe reports.
    #[cfg(test)]
    pub(crate) fn with_tables(mut self, tables: VariantTables) -> Self {
        self.tables = tables;
        self
    }

    fn variants<T: Element>(&self, metric: Metric) -> &'static [Variant<T>] {
        (T::table(&self.tables))(metric)
    }

    /// Configuration this registry selects under.
    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Number of CPU capability probes performed so far.
    #[must_use]
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }

    fn probe_host(&self) -> CpuFeatures {
        self.probes.fetch_add(1, Ordering::Relaxed);
        let features = (self.probe)();
        tracing::trace!(?features, "Probed CPU capabilities");
        features
    }

    fn select<T: Element>(&self, metric: Metric) -> Option<Variant<T>> {
        let features = self.probe_host();
        let chosen = select_variant(self.variants::<T>(metric), features, self.config.max_tier);
        match chosen {
            Some(variant) if self.config.log_selection => {
                tracing::debug!(
                    metric = %metric,
                    element = %T::TYPE,
                    tier = %variant.tier,
                    "Selected distance kernel"
                );
            }
            Some(_) => {}
            None => {
                tracing::error!(
                    metric = %metric,
                    element = %T::TYPE,
                    ceiling = ?self.config.max_tier,
                    "No distance kernel variant satisfies host and configuration"
                );
            }
        }
        chosen
    }

    /// Returns the bound variant for `metric` over `T`, selecting it on first use.
    pub fn try_kernel<T: Element>(&self, metric: Metric) -> Result<Variant<T>> {
        T::slot(&self.slots, metric)
            .get_or_init(|| self.select::<T>(metric))
            .ok_or(Error::NoVariant {
                metric,
                element: T::TYPE,
            })
    }

    /// Returns the bound variant for `metric` over `T`.
    ///
    /// # Panics
    ///
    /// Panics with [`Error::NoVariant`] when selection fails. That signals a
    /// build or configuration defect with no meaningful runtime recovery.
    #[allow(clippy::inline_always)]
    #[inline(always)]
    #[must_use]
    pub fn kernel<T: Element>(&self, metric: Metric) -> Variant<T> {
        match self.try_kernel::<T>(metric) {
            Ok(variant) => variant,
            Err(err) => panic!("{err}"),
        }
    }

    /// Tier bound for `metric` over `element`, selecting it if needed.
    pub fn selected_tier(&self, metric: Metric, element: ElementType) -> Result<Tier> {
        match element {
            ElementType::F32 => self.try_kernel::<f32>(metric).map(|v| v.tier),
            ElementType::F64 => self.try_kernel::<f64>(metric).map(|v| v.tier),
        }
    }

    /// Binds every (metric, element type) pair now instead of on first use.
    pub fn warmup(&self) -> Result<()> {
        for metric in Metric::ALL {
            for element in ElementType::ALL {
                self.selected_tier(metric, element)?;
            }
        }
        Ok(())
    }

    /// Every compiled variant of `metric` over `T` the host can run,
    /// widest first. Ignores the configured ceiling.
    #[must_use]
    pub fn available_variants<T: Element>(&self, metric: Metric) -> Vec<Variant<T>> {
        let features = self.probe_host();
        self.variants::<T>(metric)
            .iter()
            .filter(|v| features.supports(v.tier))
            .copied()
            .collect()
    }

    fn bound_tier<T: Element>(&self, metric: Metric) -> Option<Tier> {
        T::slot(&self.slots, metric)
            .get()
            .and_then(|slot| slot.map(|v| v.tier))
    }
}

impl Default for DispatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DispatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRegistry")
            .field("config", &self.config)
            .field("probes", &self.probe_count())
            .field("manhattan_f32", &self.bound_tier::<f32>(Metric::Manhattan))
            .field("euclidean_f32", &self.bound_tier::<f32>(Metric::Euclidean))
            .field("manhattan_f64", &self.bound_tier::<f64>(Metric::Manhattan))
            .field("euclidean_f64", &self.bound_tier::<f64>(Metric::Euclidean))
            .finish()
    }
}
