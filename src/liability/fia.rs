//! Fixed Indexed Annuity
//!
//! Single-premium deferred annuity whose credited rate tracks an external
//! index-return path, subject to an annual floor and cap after the
//! participation rate. Mortality only affects when the account value pays
//! out: as an expected death benefit each year, or as the maturity benefit
//! for survivors at the end of the term.

use serde::{Deserialize, Serialize};

use super::{survival_probability, validate_qx};
use crate::error::{AlmError, AlmResult};
use crate::instrument::CashFlow;
use crate::sensitivity;

/// One policy year of an FIA projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiaCashflowRow {
    pub year: u32,
    /// Account value at the end of the year
    pub account_value: f64,
    /// Survival probability to the end of the year
    pub survival_prob: f64,
    /// Probability of death during the year
    pub death_prob: f64,
    pub expected_death_benefit: f64,
    pub expected_maturity_benefit: f64,
    pub net_cashflow: f64,
}

/// Fixed indexed annuity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fia {
    /// Single premium paid at issue
    pub premium: f64,
    /// Accumulation period in years
    pub term: u32,
    /// Annual mortality rates from the annuitant's issue age; must cover the
    /// term
    pub qx: Vec<f64>,
    /// Minimum annual credited rate
    pub floor: f64,
    /// Maximum annual credited rate
    pub cap: f64,
    /// Fraction of the index return credited
    pub participation_rate: f64,
    /// Issue age, for reporting
    pub issue_age: u8,
}

impl Fia {
    pub fn new(premium: f64, term: u32, qx: Vec<f64>, issue_age: u8) -> AlmResult<Self> {
        if premium <= 0.0 || !premium.is_finite() {
            return Err(AlmError::InvalidInput(format!(
                "FIA premium must be positive, got {premium}"
            )));
        }
        if term == 0 {
            return Err(AlmError::InvalidInput(
                "FIA term must be positive".to_string(),
            ));
        }
        validate_qx(&qx)?;
        if qx.len() < term as usize {
            return Err(AlmError::InvalidInput(format!(
                "FIA qx vector covers {} years but the term is {}",
                qx.len(),
                term
            )));
        }
        Ok(Self {
            premium,
            term,
            qx,
            floor: 0.0,
            cap: 0.06,
            participation_rate: 1.0,
            issue_age,
        })
    }

    /// Override the crediting parameters
    pub fn with_crediting(mut self, floor: f64, cap: f64, participation_rate: f64) -> AlmResult<Self> {
        if floor > cap {
            return Err(AlmError::InvalidInput(format!(
                "FIA floor {floor} exceeds cap {cap}"
            )));
        }
        if participation_rate <= 0.0 {
            return Err(AlmError::InvalidInput(format!(
                "FIA participation rate must be positive, got {participation_rate}"
            )));
        }
        self.floor = floor;
        self.cap = cap;
        self.participation_rate = participation_rate;
        Ok(self)
    }

    /// Apply participation, floor, and cap to a single index return
    pub fn credited_rate(&self, index_return: f64) -> f64 {
        (index_return * self.participation_rate)
            .min(self.cap)
            .max(self.floor)
    }

    fn check_index(&self, index_returns: &[f64]) -> AlmResult<()> {
        if index_returns.len() < self.term as usize {
            return Err(AlmError::InvalidInput(format!(
                "FIA needs {} index returns but got {}",
                self.term,
                index_returns.len()
            )));
        }
        Ok(())
    }

    /// Account values `[AV_0, AV_1, ..., AV_term]` along an index path
    pub fn account_values(&self, index_returns: &[f64]) -> AlmResult<Vec<f64>> {
        self.check_index(index_returns)?;
        let mut av = self.premium;
        let mut values = Vec::with_capacity(self.term as usize + 1);
        values.push(av);
        for &ret in index_returns.iter().take(self.term as usize) {
            av *= 1.0 + self.credited_rate(ret);
            values.push(av);
        }
        Ok(values)
    }

    /// Expected annual cash flows along an index path
    pub fn cashflow_rows(&self, index_returns: &[f64]) -> AlmResult<Vec<FiaCashflowRow>> {
        let values = self.account_values(index_returns)?;

        Ok((1..=self.term)
            .map(|year| {
                let av = values[year as usize];
                let sp_start = survival_probability(&self.qx, (year - 1) as f64);
                let sp_end = survival_probability(&self.qx, year as f64);
                let death_prob = sp_start - sp_end;

                let expected_death_benefit = av * death_prob;
                let expected_maturity_benefit = if year == self.term { av * sp_end } else { 0.0 };
                FiaCashflowRow {
                    year,
                    account_value: av,
                    survival_prob: sp_end,
                    death_prob,
                    expected_death_benefit,
                    expected_maturity_benefit,
                    net_cashflow: expected_death_benefit + expected_maturity_benefit,
                }
            })
            .collect())
    }

    /// Expected benefits as a dated schedule (insurer outflows)
    pub fn expected_benefit_flows(&self, index_returns: &[f64]) -> AlmResult<Vec<CashFlow>> {
        Ok(self
            .cashflow_rows(index_returns)?
            .into_iter()
            .map(|row| CashFlow::new(row.year as f64, row.net_cashflow))
            .collect())
    }

    /// PV of expected benefits at a flat annual rate
    pub fn present_value(&self, index_returns: &[f64], rate: f64) -> AlmResult<f64> {
        Ok(sensitivity::present_value(
            &self.expected_benefit_flows(index_returns)?,
            rate,
            1,
        ))
    }

    /// Macaulay duration of the expected benefits in years
    pub fn macaulay_duration(&self, index_returns: &[f64], rate: f64) -> AlmResult<f64> {
        Ok(sensitivity::macaulay_duration(
            &self.expected_benefit_flows(index_returns)?,
            rate,
            1,
        ))
    }

    /// Convexity of the expected benefits in years squared
    pub fn convexity(&self, index_returns: &[f64], rate: f64) -> AlmResult<f64> {
        Ok(sensitivity::convexity(
            &self.expected_benefit_flows(index_returns)?,
            rate,
            1,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fia() -> Fia {
        Fia::new(100_000.0, 10, vec![0.01; 15], 55).unwrap()
    }

    #[test]
    fn test_credited_rate_floor_cap_participation() {
        let policy = fia().with_crediting(0.0, 0.06, 0.8).unwrap();
        assert_eq!(policy.credited_rate(-0.20), 0.0); // floored
        assert_eq!(policy.credited_rate(0.10), 0.06); // capped (0.08 > cap)
        assert!((policy.credited_rate(0.05) - 0.04).abs() < 1e-12); // 80% participation
    }

    #[test]
    fn test_account_value_compounds_credited_rates() {
        let policy = fia();
        let returns = vec![0.05, -0.10, 0.08, 0.0, 0.02, 0.03, 0.01, 0.04, 0.09, 0.05];
        let values = policy.account_values(&returns).unwrap();

        assert_eq!(values.len(), 11);
        assert_eq!(values[0], 100_000.0);
        // Year 1: +5% credited
        assert!((values[1] - 105_000.0).abs() < 1e-9);
        // Year 2: floored at 0
        assert!((values[2] - 105_000.0).abs() < 1e-9);
        // Year 3: capped at 6%
        assert!((values[3] - 105_000.0 * 1.06).abs() < 1e-9);
    }

    #[test]
    fn test_short_index_path_rejected() {
        let policy = fia();
        let result = policy.account_values(&vec![0.05; 9]);
        assert!(matches!(result, Err(AlmError::InvalidInput(_))));
    }

    #[test]
    fn test_maturity_benefit_only_in_final_year() {
        let policy = fia();
        let rows = policy.cashflow_rows(&vec![0.04; 10]).unwrap();
        for row in rows.iter().take(9) {
            assert_eq!(row.expected_maturity_benefit, 0.0);
        }
        let last = rows.last().unwrap();
        assert!(last.expected_maturity_benefit > 0.0);
        assert!(
            (last.expected_maturity_benefit - last.account_value * last.survival_prob).abs() < 1e-9
        );
    }

    #[test]
    fn test_benefits_account_for_all_lives() {
        // Death benefits plus the maturity benefit cover every policyholder:
        // expected payouts divided by AV probabilities sum to 1
        let policy = fia();
        let rows = policy.cashflow_rows(&vec![0.0; 10]).unwrap();
        let total_prob: f64 = rows
            .iter()
            .map(|r| r.death_prob + if r.year == 10 { r.survival_prob } else { 0.0 })
            .sum();
        assert!((total_prob - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pv_positive(){
        let policy = fia();
        let pv = policy.present_value(&vec![0.04; 10], 0.04).unwrap();
        assert!(pv > 0.0);
    }

    #[test]
    fn test_invalid_crediting() {
        assert!(fia().with_crediting(0.08, 0.06, 1.0).is_err());
        assert!(fia().with_crediting(0.0, 0.06, 0.0).is_err());
    }
}
