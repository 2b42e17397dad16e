//! Plain-vanilla fixed-coupon bullet bond

use serde::{Deserialize, Serialize};

use super::CashFlow;
use crate::assumptions::Rating;
use crate::error::{AlmError, AlmResult};
use crate::sensitivity;

/// A fixed-coupon bullet bond
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bond {
    /// Par / face value
    pub face_value: f64,
    /// Annual coupon rate as a decimal (e.g. 0.05 for 5%)
    pub coupon_rate: f64,
    /// Years to maturity
    pub maturity: u32,
    /// Coupon payments per year
    pub frequency: u32,
    /// Credit rating, if rated
    pub rating: Option<Rating>,
    /// Credit spread component of the coupon rate, for reporting
    pub credit_spread: f64,
}

impl Bond {
    /// Create a bond, rejecting non-positive face/maturity and zero frequency
    pub fn new(face_value: f64, coupon_rate: f64, maturity: u32, frequency: u32) -> AlmResult<Self> {
        if face_value <= 0.0 || !face_value.is_finite() {
            return Err(AlmError::InvalidInput(format!(
                "bond face value must be positive, got {face_value}"
            )));
        }
        if !(0.0..1.0).contains(&coupon_rate) {
            return Err(AlmError::InvalidInput(format!(
                "bond coupon rate must be in [0, 1), got {coupon_rate}"
            )));
        }
        if maturity == 0 {
            return Err(AlmError::InvalidInput(
                "bond maturity must be positive".to_string(),
            ));
        }
        if frequency == 0 {
            return Err(AlmError::InvalidInput(
                "bond frequency must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            face_value,
            coupon_rate,
            maturity,
            frequency,
            rating: None,
            credit_spread: 0.0,
        })
    }

    /// Attach a rating and the spread component of the coupon
    pub fn with_rating(mut self, rating: Rating, credit_spread: f64) -> Self {
        self.rating = Some(rating);
        self.credit_spread = credit_spread;
        self
    }

    /// Total number of coupon periods
    pub fn n_periods(&self) -> u32 {
        self.maturity * self.frequency
    }

    /// Per-period coupon payment
    pub fn coupon(&self) -> f64 {
        self.face_value * self.coupon_rate / self.frequency as f64
    }

    /// Cash-flow schedule: level coupons plus face at maturity
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

    /// Present value at a flat annual discount rate
    pub fn present_value(&self, rate: f64) -> f64 {
        let pv = sensitivity::present_value(&self.cash_flows(), rate, self.frequency);
        if pv < 0.0 {
            log::warn!("bond PV is negative ({pv:.2}); check discount rate");
        }
        pv
    }

    /// Macaulay duration in years
    pub fn macaulay_duration(&self, rate: f64) -> f64 {
        let dur = sensitivity::macaulay_duration(&self.cash_flows(), rate, self.frequency);
        if dur < 0.0 || dur > self.maturity as f64 {
            log::warn!(
                "bond duration {dur:.2} outside expected range [0, {}]",
                self.maturity
            );
        }
        dur
    }

    /// Modified duration in years
    pub fn modified_duration(&self, rate: f64) -> f64 {
        sensitivity::modified_duration(&self.cash_flows(), rate, self.frequency)
    }

    /// Convexity in years squared
    pub fn convexity(&self, rate: f64) -> f64 {
        sensitivity::convexity(&self.cash_flows(), rate, self.frequency)
    }

    /// DV01 of the position at the given rate
    pub fn dv01(&self, rate: f64) -> f64 {
        sensitivity::dv01(|r| self.present_value(r), rate)
    }

    /// Dollar convexity of the position at the given rate
    pub fn dollar_convexity(&self, rate: f64) -> f64 {
        sensitivity::dollar_convexity(|r| self.present_value(r), rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_year_four_pct() -> Bond {
        Bond::new(100.0, 0.04, 5, 2).unwrap()
    }

    #[test]
    fn test_schedule_shape() {
        let bond = five_year_four_pct();
        let flows = bond.cash_flows();
        assert_eq!(flows.len(), 10);
        assert!((flows[0].time - 0.5).abs() < 1e-12);
        assert!((flows[0].amount - 2.0).abs() < 1e-12);
        assert!((flows[9].amount - 102.0).abs() < 1e-12);
    }

    #[test]
    fn test_prices_at_par_when_rate_equals_coupon() {
        let bond = five_year_four_pct();
        assert!((bond.present_value(0.04) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_and_convexity() {
        let bond = five_year_four_pct();
        let mac = bond.macaulay_duration(0.04);
        let modified = bond.modified_duration(0.04);

        assert!(mac > 0.0 && mac < 5.0);
        assert!((mac - 4.5811).abs() < 5e-3);
        assert!((modified - 4.4913).abs() < 5e-3);
        assert!(bond.convexity(0.04) > 0.0);
    }

    #[test]
    fn test_zero_coupon_duration_is_maturity() {
        let zero = Bond::new(100.0, 0.0, 10, 2).unwrap();
        assert!((zero.macaulay_duration(0.05) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_dv01_positive_for_long_position() {
        let bond = five_year_four_pct();
        assert!(bond.dv01(0.04) > 0.0);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(Bond::new(0.0, 0.04, 5, 2).is_err());
        assert!(Bond::new(100.0, 0.04, 0, 2).is_err());
        assert!(Bond::new(100.0, 0.04, 5, 0).is_err());
        assert!(Bond::new(100.0, -0.01, 5, 2).is_err());
    }
}
