//! Numerical solvers: internal rate of return and the two-instrument
//! immunization system

mod immunize;
mod irr;

pub use immunize::{immunize, HedgeNotionals, HedgeSensitivity, SINGULARITY_TOLERANCE};
pub use irr::{irr, irr_with, npv, IrrConfig};
