//! Plain-vanilla fixed-for-floating interest rate swap
//!
//! Used to adjust portfolio duration. A pay-fixed position is economically
//! short a fixed-rate bond and long a floating-rate note, contributing
//! negative duration; receive-fixed is the opposite.
//!
//! All rate sensitivities here use the parallel-shift convention: the
//! floating-rate vector and the discount rate move together. Bumping only
//! the discount rate would make an at-par swap report zero sensitivity and
//! later surface as a singular immunization matrix.

use serde::{Deserialize, Serialize};

use crate::error::{AlmError, AlmResult};
use crate::sensitivity::ONE_BASIS_POINT;

/// Net swap cash flow for one payment period, from this party's perspective
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapCashflowRow {
    pub period: u32,
    pub year: f64,
    pub fixed_leg: f64,
    pub floating_leg: f64,
    /// Positive = net receipt, negative = net payment
    pub net_cashflow: f64,
}

/// Fixed-for-floating interest rate swap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestRateSwap {
    /// Notional principal (never exchanged)
    pub notional: f64,
    /// Annual fixed rate as a decimal
    pub fixed_rate: f64,
    /// Swap maturity in years
    pub tenor: u32,
    /// Payment frequency per year
    pub frequency: u32,
    /// True = pay fixed / receive floating; false = receive fixed
    pub pay_fixed: bool,
}

impl InterestRateSwap {
    /// Create a swap, rejecting non-positive notional/tenor and zero
    /// frequency
    pub fn new(
        notional: f64,
        fixed_rate: f64,
        tenor: u32,
        frequency: u32,
        pay_fixed: bool,
    ) -> AlmResult<Self> {
        if notional <= 0.0 || !notional.is_finite() {
            return Err(AlmError::InvalidInput(format!(
                "swap notional must be positive, got {notional}"
            )));
        }
        if !(0.0..1.0).contains(&fixed_rate) {
            return Err(AlmError::InvalidInput(format!(
                "swap fixed rate must be in [0, 1), got {fixed_rate}"
            )));
        }
        if tenor == 0 {
            return Err(AlmError::InvalidInput(
                "swap tenor must be positive".to_string(),
            ));
        }
        if frequency == 0 {
            return Err(AlmError::InvalidInput(
                "swap frequency must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            notional,
            fixed_rate,
            tenor,
            frequency,
            pay_fixed,
        })
    }

    /// Total number of payment periods
    pub fn n_periods(&self) -> u32 {
        self.tenor * self.frequency
    }

    fn check_floating(&self, floating_rates: &[f64]) -> AlmResult<()> {
        let n = self.n_periods() as usize;
        if floating_rates.len() != n {
            return Err(AlmError::InvalidInput(format!(
                "floating rate vector has {} entries but the swap has {} periods",
                floating_rates.len(),
                n
            )));
        }
        Ok(())
    }

    /// Net cash flows per period for a given floating-rate path
    ///
    /// The vector must contain exactly one annualized rate per payment
    /// period.
    pub fn cash_flows(&self, floating_rates: &[f64]) -> AlmResult<Vec<SwapCashflowRow>> {
        self.check_floating(floating_rates)?;

        let f = self.frequency as f64;
        let fixed_pmt = self.notional * self.fixed_rate / f;
        let sign = if self.pay_fixed { -1.0 } else { 1.0 };

        Ok((1..=self.n_periods())
            .map(|t| {
                let float_pmt = self.notional * floating_rates[(t - 1) as usize] / f;
                SwapCashflowRow {
                    period: t,
                    year: t as f64 / f,
                    fixed_leg: fixed_pmt,
                    floating_leg: float_pmt,
                    net_cashflow: sign * (fixed_pmt - float_pmt),
                }
            })
            .collect())
    }

    /// PV of net swap cash flows at a flat discount rate
    pub fn present_value(&self, floating_rates: &[f64], discount_rate: f64) -> AlmResult<f64> {
        let r = discount_rate / self.frequency as f64;
        let pv: f64 = self
            .cash_flows(floating_rates)?
            .iter()
            .map(|row| row.net_cashflow / (1.0 + r).powi(row.period as i32))
            .sum();
        if pv.abs() > self.notional {
            log::warn!(
                "swap PV ({pv:.2}) exceeds notional ({:.2}); verify rates",
                self.notional
            );
        }
        Ok(pv)
    }

    /// Macaulay duration of the net cash flows in years
    pub fn macaulay_duration(&self, floating_rates: &[f64], discount_rate: f64) -> AlmResult<f64> {
        let r = discount_rate / self.frequency as f64;
        let pv = self.present_value(floating_rates, discount_rate)?;
        let weighted: f64 = self
            .cash_flows(floating_rates)?
            .iter()
            .map(|row| row.year * row.net_cashflow / (1.0 + r).powi(row.period as i32))
            .sum();
        Ok(weighted / pv)
    }

    /// Convexity of the net cash flows in years squared
    pub fn convexity(&self, floating_rates: &[f64], discount_rate: f64) -> AlmResult<f64> {
        let f = self.frequency as f64;
        let r = discount_rate / f;
        let pv = self.present_value(floating_rates, discount_rate)?;
        let weighted: f64 = self
            .cash_flows(floating_rates)?
            .iter()
            .map(|row| {
                let k = row.period as f64;
                k * (k + 1.0) * row.net_cashflow / (1.0 + r).powf(k + 2.0)
            })
            .sum();
        Ok(weighted / (pv * f * f))
    }

    /// PV under a parallel shift of both the floating path and the discount
    /// rate
    fn shifted_pv(&self, floating_rates: &[f64], discount_rate: f64, shift: f64) -> AlmResult<f64> {
        let shifted: Vec<f64> = floating_rates.iter().map(|r| r + shift).collect();
        self.present_value(&shifted, discount_rate + shift)
    }

    /// DV01 under a one-basis-point parallel shift
    ///
    /// Positive means the position gains value when rates fall.
    pub fn dv01(&self, floating_rates: &[f64], discount_rate: f64) -> AlmResult<f64> {
        let down = self.shifted_pv(floating_rates, discount_rate, -ONE_BASIS_POINT)?;
        let up = self.shifted_pv(floating_rates, discount_rate, ONE_BASIS_POINT)?;
        Ok((down - up) / 2.0)
    }

    /// Dollar convexity under a parallel shift
    pub fn dollar_convexity(&self, floating_rates: &[f64], discount_rate: f64) -> AlmResult<f64> {
        let h = ONE_BASIS_POINT;
        let up = self.shifted_pv(floating_rates, discount_rate, h)?;
        let down = self.shifted_pv(floating_rates, discount_rate, -h)?;
        let base = self.present_value(floating_rates, discount_rate)?;
        Ok((up + down - 2.0 * base) / (h * h))
    }
}
