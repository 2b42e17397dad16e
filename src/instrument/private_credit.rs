//! Private credit note with explicit yield decomposition

use serde::{Deserialize, Serialize};

use super::CashFlow;
use crate::assumptions::Rating;
use crate::error::{AlmError, AlmResult};
use crate::sensitivity;

/// Default illiquidity premium for private placements (200 bps)
pub const DEFAULT_ILLIQUIDITY_SPREAD: f64 = 0.020;
/// Default residual spread component (50 bps)
pub const DEFAULT_OTHER_SPREAD: f64 = 0.005;

/// A bullet note whose total yield decomposes into risk-free rate, credit
/// spread, illiquidity spread, and other spread
///
/// By convention the note is valued at the risk-free rate while its coupons
/// pay the total yield, so it prices above par. The premium is the
/// illiquidity spread a buy-and-hold investor captures by never selling
/// into an illiquid market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateCredit {
    /// Par / face value
    pub face_value: f64,
    /// Years to maturity
    pub maturity: u32,
    /// Risk-free rate component (decimal)
    pub risk_free_rate: f64,
    /// Credit spread component (decimal)
    pub credit_spread: f64,
    /// Illiquidity premium component (decimal)
    pub illiquidity_spread: f64,
    /// Any other spread component (decimal)
    pub other_spread: f64,
    /// Coupon payments per year
    pub frequency: u32,
    /// Credit rating, if rated
    pub rating: Option<Rating>,
}

impl PrivateCredit {
    /// Create a note with the default illiquidity and other spreads
    pub fn new(
        face_value: f64,
        maturity: u32,
        risk_free_rate: f64,
        credit_spread: f64,
        frequency: u32,
    ) -> AlmResult<Self> {
        if face_value <= 0.0 || !face_value.is_finite() {
            return Err(AlmError::InvalidInput(format!(
                "private credit face value must be positive, got {face_value}"
            )));
        }
        if maturity == 0 {
            return Err(AlmError::InvalidInput(
                "private credit maturity must be positive".to_string(),
            ));
        }
        if frequency == 0 {
            return Err(AlmError::InvalidInput(
                "private credit frequency must be at least 1".to_string(),
            ));
        }
        if risk_free_rate < 0.0 || credit_spread < 0.0 {
            return Err(AlmError::InvalidInput(format!(
                "private credit rates must be non-negative, got rf {risk_free_rate}, spread {credit_spread}"
            )));
        }
        Ok(Self {
            face_value,
            maturity,
            risk_free_rate,
            credit_spread,
            illiquidity_spread: DEFAULT_ILLIQUIDITY_SPREAD,
            other_spread: DEFAULT_OTHER_SPREAD,
            frequency,
            rating: None,
        })
    }

    /// Override the illiquidity and other spread components
    pub fn with_spreads(mut self, illiquidity_spread: f64, other_spread: f64) -> Self {
        self.illiquidity_spread = illiquidity_spread;
        self.other_spread = other_spread;
        self
    }

    /// Attach a rating
    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Total yield: sum of all components
    pub fn total_yield(&self) -> f64 {
        self.risk_free_rate + self.credit_spread + self.illiquidity_spread + self.other_spread
    }

    /// Total number of coupon periods
    pub fn n_periods(&self) -> u32 {
        self.maturity * self.frequency
    }

    /// Per-period coupon based on the total yield
    pub fn coupon(&self) -> f64 {
        self.face_value * self.total_yield() / self.frequency as f64
    }

    /// Cash-flow schedule: total-yield coupons plus face at maturity
    pub fn cash_flows(&self) -> Vec<CashFlow> {
        let n = self.n_periods();
        let c = self.coupon();
        let f = self.frequency as f64;
        (1..=n)
            .map(|k| {
                let amount = if k == n { c + self.face_value } else { c };
                CashFlow::new(k as f64 / f, amount)
            })
            .collect()
    }

    /// Present value at the note's own risk-free rate (the convention)
    pub fn present_value(&self) -> f64 {
        self.present_value_at(self.risk_free_rate)
    }

    /// Present value at an explicit discount rate
    pub fn present_value_at(&self, rate: f64) -> f64 {
        let pv = sensitivity::present_value(&self.cash_flows(), rate, self.frequency);
        if pv < 0.0 {
            log::warn!("private credit PV is negative ({pv:.2})");
        }
        pv
    }

    /// Macaulay duration in years at an explicit discount rate
    pub fn macaulay_duration(&self, rate: f64) -> f64 {
        sensitivity::macaulay_duration(&self.cash_flows(), rate, self.frequency)
    }

    /// Convexity in years squared at an explicit discount rate
    pub fn convexity(&self, rate: f64) -> f64 {
        sensitivity::convexity(&self.cash_flows(), rate, self.frequency)
    }
}
