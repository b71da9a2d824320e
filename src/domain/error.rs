// Domain errors
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WaterfallError {
    #[error("interval count must be at least 1")]
    ZeroIntervals,

    #[error("history window is empty: start {start} is not before end {end}")]
    EmptyWindow { start: String, end: String },
}
