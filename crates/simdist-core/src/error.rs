//! Error types for simdist-core.

use thiserror::Error;

use crate::element::ElementType;
use crate::metric::Metric;

/// Kernel dispatch error types.
#[derive(Error, Debug)]
pub enum Error {
    /// No compiled variant satisfies the host CPU and the configured ceiling.
    ///
    /// This is a build or packaging defect: the scalar baseline is always
    /// compiled in and always eligible unless configuration excludes it.
    #[error("No kernel variant available for {metric} on {element}")]
    NoVariant {
        /// Metric whose selection failed.
        metric: Metric,
        /// Element type whose selection failed.
        element: ElementType,
    },

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration source could not be read or extracted.
    #[error("Configuration source error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// Unrecognized metric name.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Unrecognized instruction-set tier name.
    #[error("Unknown SIMD tier: {0}")]
    UnknownTier(String),

    /// Unrecognized element type name.
    #[error("Unknown element type: {0}")]
    UnknownElement(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Result type alias for dispatch and configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_variant_display() {
        let err = Error::NoVariant {
            metric: Metric::Manhattan,
            element: ElementType::F64,
        };
        assert_eq!(
            err.to_string(),
            "No kernel variant available for manhattan on f64"
        );
    }

    #[test]
    fn test_config_display() {
        let err = Error::Config("max_tier must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: max_tier must not be empty"
        );
    }

    #[test]
    fn test_error_from_figment() {
        let fig_err = figment::Error::from("bad value".to_string());
        let err: Error = fig_err.into();
        assert!(matches!(err, Error::Figment(_)));
    }
}
