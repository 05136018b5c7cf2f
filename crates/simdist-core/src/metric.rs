//! Distance metric identities and reduced-distance conversions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::Error;

/// Distance metric computed by the dispatched kernels.
///
/// Every metric is a summation over an element-wise combination of two
/// vectors. The kernels return the *reduced* form, a monotonic surrogate of
/// the true distance that skips any final non-linear step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// L1 distance: `Σ |a[i] - b[i]|`. Reduced and true forms coincide.
    Manhattan,
    /// L2 distance. Reduced form is `Σ (a[i] - b[i])²`.
    Euclidean,
}

impl Metric {
    /// All metrics, in table order.
    pub const ALL: [Metric; 2] = [Metric::Manhattan, Metric::Euclidean];

    /// Lowercase canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Metric::Manhattan => "manhattan",
            Metric::Euclidean => "euclidean",
        }
    }

    /// Converts a reduced distance into the true distance.
    #[inline]
    #[must_use]
    pub fn rdist_to_dist<T: Element>(self, rdist: T) -> T {
        match self {
            Metric::Manhattan => rdist,
            Metric::Euclidean => rdist.sqrt(),
        }
    }

    /// Converts a true distance into its reduced form.
    ///
    /// Useful for turning a search radius into a threshold comparable with
    /// reduced distances.
    #[inline]
    #[must_use]
    pub fn dist_to_rdist<T: Element>(self, dist: T) -> T {
        match self {
            Metric::Manhattan => dist,
            Metric::Euclidean => dist * dist,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manhattan" | "l1" | "cityblock" => Ok(Metric::Manhattan),
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            other => Err(Error::UnknownMetric(other.to_string())),
        }
    }
}
