/// Error types for the simulation library
use thiserror::Error;

/// Main error type for balance and capacity computations
#[derive(Error, Debug)]
pub enum SimError {
    /// Capture efficiency outside (0, 1]
    #[error("Capture efficiency must be in (0, 1], got {0}")]
    EfficiencyOutOfRange(f64),

    /// Capture area must be positive
    #[error("Capture area must be positive, got {0} m2")]
    NonPositiveArea(f64),

    /// Storage capacity cannot be negative
    #[error("Storage capacity cannot be negative, got {0} m3")]
    NegativeStorage(f64),

    /// Exceedance probability outside (0, 1)
    #[error("Exceedance probability must be in (0, 1), got {0}")]
    ExceedanceOutOfRange(f64),

    /// A required filter left zero records to simulate
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// No water year total reaches the design threshold
    #[error("No water year total reaches the design threshold of {threshold_mm} mm")]
    NoQualifyingYear { threshold_mm: f64 },

    /// The quantile of the yearly totals is not a usable design point
    #[error("Design threshold must be positive, got {0} mm")]
    DegenerateThreshold(f64),
}

/// Type alias for Results using SimError
pub type Result<T> = std::result::Result<T, SimError>;
