//! CPU capability probing and instruction-set tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::ElementType;
use crate::error::Error;

/// Instruction-set tier a kernel variant is compiled for.
///
/// Tiers compare by register width, so `Sse2` and `Neon` are peers.
/// Deserialization accepts the same spellings as [`FromStr`], so
/// `SIMDIST_MAX_TIER=AVX512F` works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Tier {
    /// Portable scalar loop. Always available.
    Scalar,
    /// SSE2, 128-bit (x86_64 baseline).
    Sse2,
    /// ARM NEON, 128-bit (aarch64).
    Neon,
    /// AVX2 + FMA, 256-bit (x86_64).
    Avx2,
    /// AVX-512F, 512-bit (x86_64).
    Avx512,
}

impl Tier {
    /// All tiers, widest first.
    pub const ALL: [Tier; 5] = [Tier::Avx512, Tier::Avx2, Tier::Neon, Tier::Sse2, Tier::Scalar];

    /// Register width in bits. Zero for the scalar tier.
    #[must_use]
    pub const fn width_bits(self) -> usize {
        match self {
            Tier::Scalar => 0,
            Tier::Sse2 | Tier::Neon => 128,
            Tier::Avx2 => 256,
            Tier::Avx512 => 512,
        }
    }

    /// Number of `element` lanes processed per vector operation.
    #[must_use]
    pub const fn lanes(self, element: ElementType) -> usize {
        match self {
            Tier::Scalar => 1,
            _ => self.width_bits() / (8 * element.size_bytes()),
        }
    }

    /// Whether this tier fits under `ceiling`.
    #[must_use]
    pub const fn within(self, ceiling: Tier) -> bool {
        self.width_bits() <= ceiling.width_bits()
    }

    /// Lowercase canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Tier::Scalar => "scalar",
            Tier::Sse2 => "sse2",
            Tier::Neon => "neon",
            Tier::Avx2 => "avx2",
            Tier::Avx512 => "avx512",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" | "none" | "portable" => Ok(Tier::Scalar),
            "sse2" => Ok(Tier::Sse2),
            "neon" => Ok(Tier::Neon),
            "avx2" => Ok(Tier::Avx2),
            "avx512" | "avx512f" => Ok(Tier::Avx512),
            other => Err(Error::UnknownTier(other.to_string())),
        }
    }
}

impl TryFrom<String> for Tier {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Snapshot of the host's SIMD-relevant feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct CpuFeatures {
    /// SSE2 available.
    pub sse2: bool,
    /// AVX2 available.
    pub avx2: bool,
    /// FMA3 available.
    pub fma: bool,
    /// AVX-512 foundation available.
    pub avx512f: bool,
    /// ARM NEON available.
    pub neon: bool,
}

impl CpuFeatures {
    /// Probes the current CPU.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            return Self {
                sse2: is_x86_feature_detected!("sse2"),
                avx2: is_x86_feature_detected!("avx2"),
                fma: is_x86_feature_detected!("fma"),
                avx512f: is_x86_feature_detected!("avx512f"),
                neon: false,
            };
        }

        #[cfg(target_arch = "aarch64")]
        {
            return Self {
                neon: std::arch::is_aarch64_feature_detected!("neon"),
                ..Self::none()
            };
        }

        #[allow(unreachable_code)]
        Self::none()
    }

    /// A host with no SIMD extensions at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            sse2: false,
            avx2: false,
            fma: false,
            avx512f: false,
            neon: false,
        }
    }

    /// Whether code compiled for `tier` may run on this host.
    #[must_use]
    pub const fn supports(&self, tier: Tier) -> bool {
        match tier {
            Tier::Scalar => true,
            Tier::Sse2 => self.sse2,
            Tier::Neon => self.neon,
            Tier::Avx2 => self.avx2 && self.fma,
            Tier::Avx512 => self.avx512f,
        }
    }

    /// Widest tier this host supports.
    #[must_use]
    pub fn best_tier(&self) -> Tier {
        Tier::ALL
            .into_iter()
            .find(|tier| self.supports(*tier))
            .unwrap_or(Tier::Scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        let features = CpuFeatures::detect();
        let best = features.best_tier();
        println!("Detected features: {features:?}, best tier: {best}");

        assert!(features.supports(Tier::Scalar));

        // SSE2 is part of the x86_64 baseline.
        #[cfg(target_arch = "x86_64")]
        assert!(features.supports(Tier::Sse2));

        #[cfg(target_arch = "aarch64")]
        assert_eq!(best, Tier::Neon);
    }

    #[test]
    fn test_lanes() {
        assert_eq!(Tier::Avx512.lanes(ElementType::F32), 16);
        assert_eq!(Tier::Avx512.lanes(ElementType::F64), 8);
        assert_eq!(Tier::Avx2.lanes(ElementType::F32), 8);
        assert_eq!(Tier::Avx2.lanes(ElementType::F64), 4);
        assert_eq!(Tier::Sse2.lanes(ElementType::F32), 4);
        assert_eq!(Tier::Neon.lanes(ElementType::F64), 2);
        assert_eq!(Tier::Scalar.lanes(ElementType::F32), 1);
    }

    #[test]
    fn test_ceiling_compares_width() {
        assert!(Tier::Neon.within(Tier::Sse2));
        assert!(Tier::Sse2.within(Tier::Avx2));
        assert!(!Tier::Avx512.within(Tier::Avx2));
        assert!(Tier::Scalar.within(Tier::Scalar));
    }

    #[test]
    fn test_avx2_requires_fma() {
        let features = CpuFeatures {
            avx2: true,
            ..CpuFeatures::none()
        };
        assert!(!features.supports(Tier::Avx2));
        assert_eq!(features.best_tier(), Tier::Scalar);
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!("AVX512F".parse::<Tier>().unwrap(), Tier::Avx512);
        assert_eq!("portable".parse::<Tier>().unwrap(), Tier::Scalar);
        assert!(matches!("sve".parse::<Tier>(), Err(Error::UnknownTier(_))));
    }

    #[test]
    fn test_tier_serde_is_lenient() {
        let tier: Tier = serde_json::from_str("\"AVX2\"").unwrap();
        assert_eq!(tier, Tier::Avx2);
        assert_eq!(serde_json::to_string(&Tier::Avx512).unwrap(), "\"avx512\"");
        assert!(serde_json::from_str::<Tier>("\"mmx\"").is_err());
    }
}
