//! Tests for the process-wide distance API.
//!
//! Serialized with the configuration tests: the first test to touch the
//! registry loads `SIMDIST_*` from the environment.

use serial_test::serial;

use super::distance::{
    euclidean, euclidean_rdist, manhattan, reduced_distance, reduced_distance_dyn,
    reduced_distance_raw, registry, selected_tier, simd_tier, warmup, Operands,
};
use super::element::{ElementType, Scalar};
use super::metric::Metric;
use super::simd_native::CpuFeatures;

#[test]
#[serial]
fn test_reference_scenario_f32() {
    let a = [1.0_f32, 2.0, 3.0];
    let b = [4.0_f32, 0.0, 3.0];
    assert_eq!(manhattan(&a, &b), 5.0);
    assert_eq!(euclidean_rdist(&a, &b), 13.0);
    assert!((euclidean(&a, &b) - 13.0_f32.sqrt()).abs() < 1e-6);
}

#[test]
#[serial]
fn test_reference_scenario_f64() {
    let a = [1.0_f64, 2.0, 3.0];
    let b = [4.0_f64, 0.0, 3.0];
    assert_eq!(reduced_distance(Metric::Manhattan, &a, &b), 5.0);
    assert_eq!(reduced_distance(Metric::Euclidean, &a, &b), 13.0);
}

#[test]
#[serial]
fn test_empty_vectors() {
    let empty: Vec<f64> = Vec::new();
    assert_eq!(manhattan(&empty, &empty), 0.0);
    assert_eq!(euclidean_rdist(&empty, &empty), 0.0);
}

#[test]
#[serial]
#[should_panic(expected = "Vector dimensions must match")]
fn test_length_mismatch_panics() {
    let _ = manhattan(&[1.0_f32, 2.0], &[1.0_f32]);
}

#[test]
#[serial]
fn test_dyn_entry_preserves_element_type() {
    let a32 = [0.5_f32, -1.5];
    let b32 = [1.5_f32, 0.5];
    let d = reduced_distance_dyn(Metric::Manhattan, Operands::F32(&a32, &b32));
    assert_eq!(d, Scalar::F32(3.0));

    let a64 = [3.0_f64, 0.0];
    let b64 = [0.0_f64, 4.0];
    let operands = Operands::F64(&a64, &b64);
    assert_eq!(operands.element_type(), ElementType::F64);
    assert_eq!(operands.len(), 2);
    assert!(!operands.is_empty());
    assert_eq!(
        reduced_distance_dyn(Metric::Euclidean, operands),
        Scalar::F64(25.0)
    );
}

#[test]
#[serial]
fn test_raw_entry_matches_slice_entry() {
    let a: Vec<f32> = (0..37).map(|i| i as f32 * 0.25).collect();
    let b: Vec<f32> = (0..37).map(|i| (37 - i) as f32 * 0.5).collect();
    for metric in Metric::ALL {
        // SAFETY: both vectors hold 37 elements.
        let raw = unsafe { reduced_distance_raw(metric, a.as_ptr(), b.as_ptr(), a.len()) };
        assert_eq!(raw, reduced_distance(metric, &a, &b));
    }
}

#[test]
#[serial]
fn test_raw_entry_accepts_null_when_empty() {
    // SAFETY: zero length never dereferences.
    let d = unsafe {
        reduced_distance_raw::<f64>(Metric::Euclidean, std::ptr::null(), std::ptr::null(), 0)
    };
    assert_eq!(d, 0.0);
}

#[test]
#[serial]
fn test_simd_tier_matches_detection() {
    assert_eq!(simd_tier(), CpuFeatures::detect().best_tier());
    assert_eq!(simd_tier(), simd_tier());
}

#[test]
#[serial]
fn test_selected_tier_never_exceeds_host() {
    for metric in Metric::ALL {
        for element in ElementType::ALL {
            let tier = selected_tier(metric, element).unwrap();
            assert!(tier.within(simd_tier()), "{metric}/{element} bound {tier}");
        }
    }
}

#[test]
#[serial]
fn test_warmup_binds_everything() {
    warmup().unwrap();
    let probes = registry().probe_count();
    warmup().unwrap();
    let _ = manhattan(&[1.0_f32; 64], &[2.0_f32; 64]);
    assert_eq!(registry().probe_count(), probes);
}
