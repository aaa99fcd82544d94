//! Fatal error taxonomy.
//!
//! Both variants are raised while building a run (region, field, tracing
//! parameters), never while a flowline is being traced. Per-flowline
//! outcomes live in [`TraceState`](crate::flow::states::TraceState).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    /// A parameter is non-positive, non-finite, or otherwise unusable
    #[error("invalid configuration: `{parameter}` {reason}")]
    InvalidConfiguration {
        parameter: &'static str,
        reason: String,
    },

    /// Component grids disagree in shape with each other or with the region
    #[error("malformed field: {reason}")]
    MalformedField { reason: String },
}

impl FlowError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        FlowError::InvalidConfiguration {
            parameter,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        FlowError::MalformedField {
            reason: reason.into(),
        }
    }
}

/// Ensure `value` is finite and strictly positive
pub(crate) fn require_positive(parameter: &'static str, value: f64) -> Result<f64, FlowError> {
    if !value.is_finite() {
        return Err(FlowError::invalid(parameter, format!("must be finite, got {value}")));
    }
    if value <= 0.0 {
        return Err(FlowError::invalid(parameter, format!("must be positive, got {value}")));
    }
    Ok(value)
}
