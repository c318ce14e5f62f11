use thiserror::Error;

/// Failures surfaced to the driving loop instead of aborting the process.
///
/// `UnsupportedFeature` is recoverable: the instruction did not complete but
/// processor state is intact, so a host can pause, inspect, and resume.
/// `InvalidOperand` indicates a decoder/engine contract violation and should
/// be treated as fatal by the caller, though it is still reported rather
/// than panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(&'static str),
    #[error("invalid operand: {0}")]
    InvalidOperand(&'static str),
}

pub type Result<T> = core::result::Result<T, CpuError>;
