//! Fixed-rate fully-amortizing mortgage

use serde::{Deserialize, Serialize};

use super::CashFlow;
use crate::error::{AlmError, AlmResult};
use crate::sensitivity;

/// One row of an amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

/// A plain fixed-rate level-payment mortgage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mortgage {
    /// Original loan amount
    pub principal: f64,
    /// Fixed annual interest rate as a decimal
    pub annual_rate: f64,
    /// Loan term in years
    pub term: u32,
    /// Payments per year
    pub frequency: u32,
}

impl Mortgage {
    /// Create a mortgage, rejecting non-positive principal/term and zero
    /// frequency
    pub fn new(principal: f64, annual_rate: f64, term: u32, frequency: u32) -> AlmResult<Self> {
        if principal <= 0.0 || !principal.is_finite() {
            return Err(AlmError::InvalidInput(format!(
                "mortgage principal must be positive, got {principal}"
            )));
        }
        if !(0.0..1.0).contains(&annual_rate) {
            return Err(AlmError::InvalidInput(format!(
                "mortgage rate must be in [0, 1), got {annual_rate}"
            )));
        }
        if term == 0 {
            return Err(AlmError::InvalidInput(
                "mortgage term must be positive".to_string(),
            ));
        }
        if frequency == 0 {
            return Err(AlmError::InvalidInput(
                "mortgage frequency must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            principal,
            annual_rate,
            term,
            frequency,
        })
    }

    /// Per-period rate
    pub fn periodic_rate(&self) -> f64 {
        self.annual_rate / self.frequency as f64
    }

    /// Total number of payments
    pub fn n_periods(&self) -> u32 {
        self.term * self.frequency
    }

    /// Level periodic payment amount (closed form)
    pub fn payment(&self) -> f64 {
        let r = self.periodic_rate();
        let n = self.n_periods() as i32;
        if r.abs() < 1e-12 {
            return self.principal / n as f64;
        }
        let growth = (1.0 + r).powi(n);
        self.principal * r * growth / (growth - 1.0)
    }

    /// Outstanding balance after `period` payments (closed form)
    pub fn balance_at(&self, period: u32) -> f64 {
        let r = self.periodic_rate();
        let n = self.n_periods() as i32;
        if r.abs() < 1e-12 {
            return self.principal * (1.0 - period as f64 / n as f64);
        }
        let growth = (1.0 + r).powi(n);
        self.principal * (growth - (1.0 + r).powi(period as i32)) / (growth - 1.0)
    }

    /// Full amortization schedule
    pub fn schedule(&self) -> Vec<AmortizationRow> {
        let r = self.periodic_rate();
        let pmt = self.payment();
        let mut balance = self.principal;
        (1..=self.n_periods())
            .map(|period| {
                let interest = balance * r;
                let principal = pmt - interest;
                balance -= principal;
                AmortizationRow {
                    period,
                    payment: pmt,
                    interest,
                    principal,
                    balance: balance.max(0.0),
                }
            })
            .collect()
    }

    /// Cash-flow schedule: the level payments
    pub fn cash_flows(&self) -> Vec<CashFlow> {
        let pmt = self.payment();
        let f = self.frequency as f64;
        (1..=self.n_periods())
            .map(|k| CashFlow::new(k as f64 / f, pmt))
            .collect()
    }

    /// Present value at a flat annual discount rate
    pub fn present_value(&self, rate: f64) -> f64 {
        let pv = sensitivity::present_value(&self.cash_flows(), rate, self.frequency);
        if pv < 0.0 {
            log::warn!("mortgage PV is negative ({pv:.2}); check discount rate");
        }
        pv
    }

    /// Macaulay duration in years
    pub fn macaulay_duration(&self, rate: f64) -> f64 {
        let dur = sensitivity::macaulay_duration(&self.cash_flows(), rate, self.frequency);
        if dur < 0.0 || dur > self.term as f64 {
            log::warn!(
                "mortgage duration {dur:.2} outside expected range [0, {}]",
                self.term
            );
        }
        dur
    }

    /// Convexity in years squared
    pub fn convexity(&self, rate: f64) -> f64 {
        sensitivity::convexity(&self.cash_flows(), rate, self.frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thirty_year() -> Mortgage {
        Mortgage::new(300_000.0, 0.06, 30, 12).unwrap()
    }

    #[test]
    fn test_payment_closed_form() {
        // 300k, 6%, 30y monthly: the textbook payment is ~1798.65
        let m = thirty_year();
        assert!((m.payment() - 1798.65).abs() < 0.01);
    }

    #[test]
    fn test_schedule_amortizes_to_zero() {
        let m = Mortgage::new(100_000.0, 0.05, 15, 12).unwrap();
        let schedule = m.schedule();
        assert_eq!(schedule.len(), 180);
        assert!(schedule.last().unwrap().balance.abs() < 1e-6);

        // Principal portions grow over time
        assert!(schedule[0].principal < schedule[179].principal);
    }

    #[test]
    fn test_closed_form_balance_matches_schedule() {
        let m = thirty_year();
        let schedule = m.schedule();
        for period in [1u32, 60, 180, 359] {
            let from_schedule = schedule[(period - 1) as usize].balance;
            assert!((m.balance_at(period) - from_schedule).abs() < 1e-6);
        }
    }

    #[test]
    fn test_pv_at_note_rate_is_par() {
        let m = thirty_year();
        assert!((m.present_value(0.06) - 300_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_duration_below_term() {
        let m = thirty_year();
        let dur = m.macaulay_duration(0.06);
        assert!(dur > 0.0 && dur < 30.0);
        assert!(m.convexity(0.06) > 0.0);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(Mortgage::new(-1.0, 0.06, 30, 12).is_err());
        assert!(Mortgage::new(100.0, 0.06, 0, 12).is_err());
        assert!(Mortgage::new(100.0, 0.06, 30, 0).is_err());
    }
}
