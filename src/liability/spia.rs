//! Single Premium Immediate Annuity

use serde::{Deserialize, Serialize};

use super::{survival_probability, validate_qx};
use crate::error::{AlmError, AlmResult};
use crate::instrument::CashFlow;
use crate::sensitivity;

/// One payout period of a SPIA projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiaCashflowRow {
    pub period: u32,
    pub year: f64,
    /// Contractual payout this period
    pub payout: f64,
    /// Survival probability to the end of the period
    pub survival_prob: f64,
    /// Survival-weighted expected payout
    pub expected_payout: f64,
}

/// Single premium immediate annuity: a lump-sum premium buys periodic
/// income for life, optionally guaranteed for a certain period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spia {
    /// Single premium paid at issue
    pub premium: f64,
    /// Total annual payout to the annuitant
    pub annual_payout: f64,
    /// Annual mortality rates from the annuitant's issue age; the vector
    /// length bounds the modelling horizon
    pub qx: Vec<f64>,
    /// Payouts per year
    pub frequency: u32,
    /// Guaranteed payment period in years (0 = life only)
    pub certain_period: u32,
    /// Issue age, for reporting
    pub issue_age: u8,
}

impl Spia {
    pub fn new(
        premium: f64,
        annual_payout: f64,
        qx: Vec<f64>,
        frequency: u32,
        issue_age: u8,
    ) -> AlmResult<Self> {
        if premium <= 0.0 || annual_payout <= 0.0 {
            return Err(AlmError::InvalidInput(format!(
                "SPIA premium and payout must be positive, got {premium} and {annual_payout}"
            )));
        }
        if frequency == 0 {
            return Err(AlmError::InvalidInput(
                "SPIA frequency must be at least 1".to_string(),
            ));
        }
        validate_qx(&qx)?;
        Ok(Self {
            premium,
            annual_payout,
            qx,
            frequency,
            certain_period: 0,
            issue_age,
        })
    }

    /// Guarantee payments for the first `years` regardless of survival
    pub fn with_certain_period(mut self, years: u32) -> Self {
        self.certain_period = years;
        self
    }

    /// Expected payout rows, one per payment period until table exhaustion
    pub fn cashflow_rows(&self) -> Vec<SpiaCashflowRow> {
        let f = self.frequency as f64;
        let pmt = self.annual_payout / f;
        let n_periods = self.qx.len() as u32 * self.frequency;

        (1..=n_periods)
            .map(|t| {
                let year = t as f64 / f;
                let sp = survival_probability(&self.qx, year);
                let expected = if year <= self.certain_period as f64 {
                    pmt
                } else {
                    pmt * sp
                };
                SpiaCashflowRow {
                    period: t,
                    year,
                    payout: pmt,
                    survival_prob: sp,
                    expected_payout: expected,
                }
            })
            .collect()
    }

    /// Expected payouts as a dated schedule (insurer outflows)
    pub fn expected_benefit_flows(&self) -> Vec<CashFlow> {
        self.cashflow_rows()
            .into_iter()
            .map(|row| CashFlow::new(row.year, row.expected_payout))
            .collect()
    }

    /// PV of expected payouts at a flat annual rate
    pub fn present_value(&self, rate: f64) -> f64 {
        sensitivity::present_value(&self.expected_benefit_flows(), rate, self.frequency)
    }

    /// Macaulay duration of the expected payouts in years
    pub fn macaulay_duration(&self, rate: f64) -> f64 {
        sensitivity::macaulay_duration(&self.expected_benefit_flows(), rate, self.frequency)
    }

    /// Convexity of the expected payouts in years squared
    pub fn convexity(&self, rate: f64) -> f64 {
        sensitivity::convexity(&self.expected_benefit_flows(), rate, self.frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spia() -> Spia {
        Spia::new(100_000.0, 6_000.0, vec![0.01, 0.02, 0.03], 12, 70).unwrap()
    }

    #[test]
    fn test_row_count_matches_table_horizon() {
        let rows = spia().cashflow_rows();
        assert_eq!(rows.len(), 36); // 3 years monthly
    }

    #[test]
    fn test_expected_payout_decays_with_survival() {
        let rows = spia().cashflow_rows();
        assert!(rows[0].expected_payout > rows[35].expected_payout);
        // Every expected payout is the payout weighted by survival
        for row in &rows {
            assert!((row.expected_payout - row.payout * row.survival_prob).abs() < 1e-12);
        }
    }

    #[test]
    fn test_certain_period_pays_regardless_of_survival() {
        let annuity = spia().with_certain_period(1);
        let rows = annuity.cashflow_rows();
        for row in rows.iter().take(12) {
            assert_eq!(row.expected_payout, row.payout);
        }
        assert!(rows[12].expected_payout < rows[12].payout);
    }

    #[test]
    fn test_pv_below_undiscounted_total() {
        let annuity = spia();
        let total: f64 = annuity
            .cashflow_rows()
            .iter()
            .map(|r| r.expected_payout)
            .sum();
        let pv = annuity.present_value(0.04);
        assert!(pv > 0.0 && pv < total);
    }

    #[test]
    fn test_qx_one_terminates_payouts() {
        let annuity = Spia::new(100_000.0, 6_000.0, vec![0.01, 1.0, 0.5], 1, 70).unwrap();
        let rows = annuity.cashflow_rows();
        assert_eq!(rows[1].survival_prob, 0.0);
        assert_eq!(rows[2].expected_payout, 0.0);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(Spia::new(0.0, 6_000.0, vec![0.01], 12, 70).is_err());
        assert!(Spia::new(1.0, 6_000.0, vec![], 12, 70).is_err());
        assert!(Spia::new(1.0, 6_000.0, vec![0.01], 0, 70).is_err());
    }
}
