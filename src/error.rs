use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Misconfigured chart construction (wrong dimension/measure arity,
    /// unusable tuning values). Reported before any rendering attempt.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data-source failure surfaced to the caller. The engine never retries;
    /// retry policy belongs to the data-fetch collaborator.
    #[error("data fetch failed: {0}")]
    Fetch(String),

    /// Fault inside a gesture handler. Handlers catch this locally and reset
    /// that gesture's transient state; shared scale state stays untouched.
    #[error("gesture fault: {0}")]
    Gesture(String),
}
