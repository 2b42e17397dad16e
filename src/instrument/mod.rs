//! Fixed-income asset instruments
//!
//! Every instrument reduces to a schedule of dated cash flows and a pure
//! `present_value(rate)` function over it. The `AssetInstrument` enum is the
//! form a block owns: each variant implements the same narrow contract
//! (cash flows, present value, maturity) independently.

mod bond;
mod mortgage;
mod private_credit;
mod swap;

pub use bond::Bond;
pub use mortgage::{AmortizationRow, Mortgage};
pub use private_credit::PrivateCredit;
pub use swap::{InterestRateSwap, SwapCashflowRow};

use serde::{Deserialize, Serialize};

use crate::error::{AlmError, AlmResult};

/// A single dated cash flow
///
/// `time` is in years from the valuation date; `amount` is signed from the
/// holder's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub time: f64,
    pub amount: f64,
}

impl CashFlow {
    pub fn new(time: f64, amount: f64) -> Self {
        Self { time, amount }
    }
}

/// Validate a cash-flow schedule: finite, non-negative, strictly increasing
/// times with no duplicates
pub fn validate_schedule(flows: &[CashFlow]) -> AlmResult<()> {
    for cf in flows {
        if !cf.time.is_finite() || cf.time < 0.0 {
            return Err(AlmError::InvalidInput(format!(
                "cash-flow time {} is negative or non-finite",
                cf.time
            )));
        }
        if !cf.amount.is_finite() {
            return Err(AlmError::InvalidInput(format!(
                "cash-flow amount at time {} is non-finite",
                cf.time
            )));
        }
    }
    if let Some(pair) = flows.windows(2).find(|w| w[0].time >= w[1].time) {
        return Err(AlmError::InvalidInput(format!(
            "cash-flow times must be strictly increasing: {} then {}",
            pair[0].time, pair[1].time
        )));
    }
    Ok(())
}

/// An asset position held by a block
///
/// Swaps are hedge overlays, not block assets, so they live outside this
/// enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssetInstrument {
    Bond(Bond),
    Mortgage(Mortgage),
    PrivateCredit(PrivateCredit),
}

impl AssetInstrument {
    /// The instrument's full cash-flow schedule
    pub fn cash_flows(&self) -> Vec<CashFlow> {
        match self {
            AssetInstrument::Bond(b) => b.cash_flows(),
            AssetInstrument::Mortgage(m) => m.cash_flows(),
            AssetInstrument::PrivateCredit(pc) => pc.cash_flows(),
        }
    }

    /// Present value at a flat annual rate
    ///
    /// Private credit receives the rate as its risk-free leg, preserving its
    /// discount-at-risk-free convention.
    pub fn present_value(&self, rate: f64) -> f64 {
        match self {
            AssetInstrument::Bond(b) => b.present_value(rate),
            AssetInstrument::Mortgage(m) => m.present_value(rate),
            AssetInstrument::PrivateCredit(pc) => pc.present_value_at(rate),
        }
    }

    /// Years to final cash flow
    pub fn maturity(&self) -> u32 {
        match self {
            AssetInstrument::Bond(b) => b.maturity,
            AssetInstrument::Mortgage(m) => m.term,
            AssetInstrument::PrivateCredit(pc) => pc.maturity,
        }
    }

    /// Payments per year
    pub fn frequency(&self) -> u32 {
        match self {
            AssetInstrument::Bond(b) => b.frequency,
            AssetInstrument::Mortgage(m) => m.frequency,
            AssetInstrument::PrivateCredit(pc) => pc.frequency,
        }
    }

    /// Face or principal amount
    pub fn face_amount(&self) -> f64 {
        match self {
            AssetInstrument::Bond(b) => b.face_value,
            AssetInstrument::Mortgage(m) => m.principal,
            AssetInstrument::PrivateCredit(pc) => pc.face_value,
        }
    }

    /// Bullet instruments repay face at maturity and are the ones whose
    /// proceeds get reinvested; mortgages amortize instead
    pub fn is_bullet(&self) -> bool {
        matches!(
            self,
            AssetInstrument::Bond(_) | AssetInstrument::PrivateCredit(_)
        )
    }
}
