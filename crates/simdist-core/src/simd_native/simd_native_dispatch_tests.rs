//! Tests for kernel selection and dispatch caching.
//!
//! Every test owns a private `DispatchRegistry` so probe counts are exact.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use super::{select_variant, CpuFeatures, DispatchRegistry, Tier, Variant, VariantTables};
use crate::config::DispatchConfig;
use crate::element::ElementType;
use crate::error::Error;
use crate::metric::Metric;
use crate::simd_native::scalar::manhattan_scalar;

fn host_without_wide_vectors() -> CpuFeatures {
    CpuFeatures {
        avx2: false,
        fma: false,
        avx512f: false,
        ..CpuFeatures::detect()
    }
}

fn wide_only_f32(_metric: Metric) -> &'static [Variant<f32>] {
    const TABLE: &[Variant<f32>] = &[Variant::new(Tier::Avx512, manhattan_scalar::<f32>)];
    TABLE
}

fn registry_without_eligible_f32() -> DispatchRegistry {
    DispatchRegistry::with_probe(DispatchConfig::default(), CpuFeatures::none).with_tables(
        VariantTables {
            f32: wide_only_f32,
            ..VariantTables::default()
        },
    )
}

/// Counts `debug` events that report a bound tier.
struct SelectionEvents(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for SelectionEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() == Level::DEBUG && meta.fields().field("tier").is_some() {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn selection_events_during_warmup(config: DispatchConfig) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(SelectionEvents(Arc::clone(&count)));
    tracing::subscriber::with_default(subscriber, || {
        DispatchRegistry::with_config(config).warmup().unwrap();
    });
    count.load(Ordering::SeqCst)
}

// ============================================================================
// Caching
// ============================================================================

#[test]
fn test_repeated_calls_never_reprobe() {
    let registry = DispatchRegistry::new();
    assert_eq!(registry.probe_count(), 0);

    let first = registry.kernel::<f32>(Metric::Manhattan);
    for _ in 0..100 {
        let again = registry.kernel::<f32>(Metric::Manhattan);
        assert_eq!(again.tier(), first.tier());
    }
    assert_eq!(registry.probe_count(), 1);
}

#[test]
fn test_each_slot_probes_once() {
    let registry = DispatchRegistry::new();
    let _ = registry.kernel::<f32>(Metric::Manhattan);
    let _ = registry.kernel::<f64>(Metric::Manhattan);
    assert_eq!(registry.probe_count(), 2);

    registry.warmup().unwrap();
    assert_eq!(registry.probe_count(), 4);

    registry.warmup().unwrap();
    assert_eq!(registry.probe_count(), 4);
}

#[test]
fn test_concurrent_first_use_selects_once() {
    const THREADS: usize = 16;
    let registry = Arc::new(DispatchRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                registry
                    .try_kernel::<f64>(Metric::Euclidean)
                    .map(|v| v.tier())
                    .unwrap()
            })
        })
        .collect();

    let tiers: Vec<Tier> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(tiers.iter().all(|t| *t == tiers[0]));
    assert_eq!(registry.probe_count(), 1);
}

// ============================================================================
// Selection rule
// ============================================================================

#[test]
fn test_default_selects_widest_supported() {
    let registry = DispatchRegistry::new();
    let host = CpuFeatures::detect();
    for metric in Metric::ALL {
        let tier = registry.try_kernel::<f32>(metric).unwrap().tier();
        assert!(host.supports(tier));
        assert_eq!(tier, registry.available_variants::<f32>(metric)[0].tier());
    }
}

#[test]
fn test_scalar_ceiling_forces_baseline() {
    let registry =
        DispatchRegistry::with_config(DispatchConfig::default().with_max_tier(Tier::Scalar));
    for metric in Metric::ALL {
        for element in ElementType::ALL {
            assert_eq!(
                registry.selected_tier(metric, element).unwrap(),
                Tier::Scalar
            );
        }
    }
}

#[test]
fn test_ceiling_caps_by_width() {
    let registry =
        DispatchRegistry::with_config(DispatchConfig::default().with_max_tier(Tier::Neon));
    let tier = registry.selected_tier(Metric::Manhattan, ElementType::F32).unwrap();
    assert!(tier.width_bits() <= 128, "bound {tier} above 128-bit ceiling");

    #[cfg(target_arch = "x86_64")]
    assert_eq!(tier, Tier::Sse2);
    #[cfg(target_arch = "aarch64")]
    assert_eq!(tier, Tier::Neon);
}

#[test]
fn test_probe_without_extensions_selects_scalar() {
    let registry = DispatchRegistry::with_probe(DispatchConfig::default(), CpuFeatures::none);
    registry.warmup().unwrap();
    for metric in Metric::ALL {
        assert_eq!(registry.kernel::<f64>(metric).tier(), Tier::Scalar);
    }
}

#[test]
fn test_probe_narrowing_skips_wide_tiers() {
    let registry =
        DispatchRegistry::with_probe(DispatchConfig::default(), host_without_wide_vectors);
    let tier = registry.kernel::<f32>(Metric::Euclidean).tier();
    assert!(tier.width_bits() <= 128);
    assert_eq!(registry.probe_count(), 1);
}

#[test]
fn test_selection_without_eligible_variant_fails() {
    let wide_only = [Variant::<f32>::new(Tier::Avx512, manhattan_scalar::<f32>)];
    assert!(select_variant(&wide_only, CpuFeatures::none(), None).is_none());
    assert!(select_variant(&wide_only, CpuFeatures::detect(), Some(Tier::Avx2)).is_none());
}

#[test]
fn test_failed_selection_is_cached() {
    let registry = registry_without_eligible_f32();
    let expected = Error::NoVariant {
        metric: Metric::Manhattan,
        element: ElementType::F32,
    };

    for _ in 0..3 {
        let err = registry.try_kernel::<f32>(Metric::Manhattan).unwrap_err();
        assert_eq!(err.to_string(), expected.to_string());
        assert!(matches!(
            err,
            Error::NoVariant {
                metric: Metric::Manhattan,
                element: ElementType::F32,
            }
        ));
    }
    assert_eq!(registry.probe_count(), 1);

    assert!(registry
        .selected_tier(Metric::Manhattan, ElementType::F32)
        .is_err());
    assert_eq!(registry.probe_count(), 1);

    // Other element types keep their compiled tables.
    assert_eq!(registry.kernel::<f64>(Metric::Manhattan).tier(), Tier::Scalar);
}

#[test]
fn test_warmup_reports_missing_variant() {
    let registry = registry_without_eligible_f32();
    let result = registry.warmup();
    assert!(matches!(
        result,
        Err(Error::NoVariant {
            element: ElementType::F32,
            ..
        })
    ));
}

#[test]
#[should_panic(expected = "No kernel variant available")]
fn test_kernel_panics_without_eligible_variant() {
    let registry = registry_without_eligible_f32();
    let _ = registry.kernel::<f32>(Metric::Euclidean);
}

#[test]
fn test_selection_prefers_earlier_entries() {
    let table = [
        Variant::<f32>::new(Tier::Sse2, manhattan_scalar::<f32>),
        Variant::<f32>::new(Tier::Scalar, manhattan_scalar::<f32>),
    ];
    let sse2_host = CpuFeatures {
        sse2: true,
        ..CpuFeatures::none()
    };
    assert_eq!(
        select_variant(&table, sse2_host, None).map(|v| v.tier()),
        Some(Tier::Sse2)
    );
    assert_eq!(
        select_variant(&table, sse2_host, Some(Tier::Scalar)).map(|v| v.tier()),
        Some(Tier::Scalar)
    );
}

// ============================================================================
// Logging
// ============================================================================

#[test]
fn test_selection_is_logged_by_default() {
    let events = selection_events_during_warmup(DispatchConfig::default());
    assert_eq!(events, Metric::ALL.len() * ElementType::ALL.len());
}

#[test]
fn test_selection_logging_can_be_disabled() {
    let config = DispatchConfig {
        log_selection: false,
        ..DispatchConfig::default()
    };
    assert_eq!(selection_events_during_warmup(config), 0);
}

// ============================================================================
// Introspection
// ============================================================================

#[test]
fn test_available_variants_end_with_scalar_and_ignore_ceiling() {
    let registry =
        DispatchRegistry::with_config(DispatchConfig::default().with_max_tier(Tier::Scalar));
    for metric in Metric::ALL {
        let variants = registry.available_variants::<f64>(metric);
        assert_eq!(variants.last().map(|v| v.tier()), Some(Tier::Scalar));
        assert_eq!(variants[0].tier(), CpuFeatures::detect().best_tier());
        for pair in variants.windows(2) {
            assert!(pair[0].tier().width_bits() >= pair[1].tier().width_bits());
        }
    }
}

#[test]
fn test_debug_reports_bound_slots() {
    let registry = DispatchRegistry::with_probe(DispatchConfig::default(), CpuFeatures::none);
    let _ = registry.kernel::<f32>(Metric::Manhattan);
    let debug = format!("{registry:?}");
    assert!(debug.contains("manhattan_f32: Some(Scalar)"), "{debug}");
    assert!(debug.contains("euclidean_f64: None"), "{debug}");
}

#[test]
#[should_panic(expected = "Vector dimensions must match")]
fn test_compute_rejects_mismatched_lengths() {
    let registry = DispatchRegistry::new();
    let _ = registry
        .kernel::<f32>(Metric::Euclidean)
        .compute(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
}
