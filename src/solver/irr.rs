//! Internal rate of return via Newton-Raphson
//!
//! Finds the rate r with `NPV(r) = sum CF_t / (1+r)^t = 0`, where t is the
//! index of the cash flow in annual periods. `cashflows[0]` is typically the
//! initial outlay (negative) and later entries are receipts.

use serde::{Deserialize, Serialize};

use crate::error::{AlmError, AlmResult};

/// Derivative magnitudes below this are treated as a flat tangent
const DERIVATIVE_FLOOR: f64 = 1e-12;

/// Newton-Raphson configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IrrConfig {
    /// Starting estimate for the rate
    pub guess: f64,
    /// Convergence tolerance on |NPV|
    pub tolerance: f64,
    /// Iteration budget
    pub max_iterations: u32,
}

impl Default for IrrConfig {
    fn default() -> Self {
        Self {
            guess: 0.1,
            tolerance: 1e-8,
            max_iterations: 100,
        }
    }
}

/// Net present value of annual cash flows at a given rate
pub fn npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// NPV and its derivative with respect to the rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;
    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= t as f64 * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }
    (npv, dnpv)
}

/// IRR with default configuration
pub fn irr(cashflows: &[f64]) -> AlmResult<f64> {
    irr_with(cashflows, &IrrConfig::default())
}

/// IRR with explicit configuration
///
/// Converges when |NPV| drops below the tolerance. A near-zero derivative is
/// `DegenerateInput`; an exhausted iteration budget is `NonConvergence`.
/// Both carry the rate at which the solver stopped.
pub fn irr_with(cashflows: &[f64], config: &IrrConfig) -> AlmResult<f64> {
    if cashflows.is_empty() {
        return Err(AlmError::InvalidInput(
            "IRR needs at least one cash flow".to_string(),
        ));
    }
    let has_positive = cashflows.iter().any(|&cf| cf > 0.0);
    let has_negative = cashflows.iter().any(|&cf| cf < 0.0);
    if !has_positive || !has_negative {
        return Err(AlmError::InvalidInput(
            "IRR needs at least one sign change in the cash flows".to_string(),
        ));
    }

    let mut rate = config.guess;
    for _ in 0..config.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);
        if npv.abs() < config.tolerance {
            return Ok(rate);
        }
        if dnpv.abs() < DERIVATIVE_FLOOR {
            return Err(AlmError::DegenerateInput {
                rate,
                derivative: dnpv,
            });
        }
        rate -= npv / dnpv;
    }

    Err(AlmError::NonConvergence {
        iterations: config.max_iterations,
        last_rate: rate,
    })
}
