//! Error types for the ALM engine
//!
//! Every failure carries the inputs that triggered it so a caller can
//! reproduce the computation. The core never retries and never substitutes
//! defaults for a failed result; retrying with different parameters (e.g.
//! different hedge tenors) is the caller's decision.

use thiserror::Error;

/// Unified error type for all ALM operations
#[derive(Debug, Error)]
pub enum AlmError {
    /// Malformed construction input: bad cash-flow schedule, mismatched rate
    /// vector, non-positive notional/frequency/maturity, invalid SAA weights
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Newton-Raphson tangent too flat to take a step
    #[error("degenerate IRR input: NPV derivative {derivative:.3e} at rate {rate:.6} is near zero")]
    DegenerateInput {
        /// Rate at which the derivative vanished
        rate: f64,
        /// The near-zero derivative value
        derivative: f64,
    },

    /// Iteration budget exhausted before meeting tolerance
    #[error("IRR did not converge after {iterations} iterations (last rate {last_rate:.6})")]
    NonConvergence {
        /// Iterations consumed
        iterations: u32,
        /// Rate estimate when the budget ran out
        last_rate: f64,
    },

    /// Hedge instruments with linearly dependent sensitivities cannot span
    /// both the duration and convexity targets
    #[error(
        "singular hedge system: det {det:.3e} from per-unit sensitivities \
         ({dv01_1}, {convexity_1}) and ({dv01_2}, {convexity_2})"
    )]
    SingularMatrix {
        /// Determinant of the 2x2 sensitivity matrix
        det: f64,
        dv01_1: f64,
        convexity_1: f64,
        dv01_2: f64,
        convexity_2: f64,
    },

    /// Lookup outside a table's defined domain where no extrapolation policy
    /// applies (e.g. a rating with no spread row, an age past the table)
    #[error("{what} out of range: {value}")]
    OutOfRange {
        /// What was being looked up
        what: String,
        /// The offending key, formatted for display
        value: String,
    },

    /// File access failure while loading assumptions
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV structure failure while loading assumptions
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed value inside an assumption file
    #[error("parse error in {file}: {detail}")]
    Parse {
        /// File being read
        file: String,
        /// What failed to parse
        detail: String,
    },
}

/// Result alias used throughout the crate
pub type AlmResult<T> = Result<T, AlmError>;
