//! Error taxonomy for precision testing.
//!
//! Input-constraint violations are returned to the immediate caller.
//! Evaluation failures are produced at the task boundary and folded into a
//! failed result by the [`Session`](crate::session::Session); they never
//! unwind past it.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrecError {
    #[error("Invalid iteration count {iterations}: quadrature needs at least 2 subdivisions")]
    InvalidIterations { iterations: u32 },
    #[error("Estimation domain is empty")]
    EmptyDomain,
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Length mismatch in batch check: {evaluated} evaluated values, {expected} expected values")]
    LengthMismatch { evaluated: usize, expected: usize },
    #[error("Function evaluation failed: {0}")]
    Evaluation(String),
    #[error("Output error: {0}")]
    Output(String),
}

impl PrecError {
    /// Convert a panic payload caught at a task boundary into an evaluation error.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        PrecError::Evaluation(message)
    }
}

impl From<std::io::Error> for PrecError {
    fn from(e: std::io::Error) -> Self {
        PrecError::Output(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_become_evaluation_errors() {
        let err = std::panic::catch_unwind(|| panic!("domain error at {}", 0.0))
            .map_err(PrecError::from_panic)
            .unwrap_err();
        assert_eq!(err, PrecError::Evaluation("domain error at 0".to_string()));

        let err = std::panic::catch_unwind(|| panic!("static message"))
            .map_err(PrecError::from_panic)
            .unwrap_err();
        assert_eq!(err, PrecError::Evaluation("static message".to_string()));
    }
}
