//! Error types for lumen

use thiserror::Error;

/// Errors surfaced to callers when parsing names or validating parameters.
///
/// Engine transitions themselves never fail; they fall back instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LumenError {
    #[error("Unknown scale: {0}")]
    UnknownScale(String),
    #[error("Unknown rhythm preset: {0}")]
    UnknownPreset(String),
    #[error("Unknown drift direction: {0}")]
    UnknownDirection(String),
    #[error("Lane {lane}: {hits} hits exceed {steps} steps")]
    HitsExceedSteps { lane: usize, hits: u32, steps: u32 },
    #[error("Lane {0}: step count must be at least 1")]
    ZeroSteps(usize),
    #[error("Lane {lane}: note range {low}..={high} is empty")]
    InvalidNoteRange { lane: usize, low: u8, high: u8 },
    #[error("{name} = {value} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Drift rate must be at least 1 phrase")]
    ZeroDriftRate,
    #[error("Drift range must be at least 1 step")]
    ZeroDriftRange,
}

pub type Result<T> = std::result::Result<T, LumenError>;
