//! Whole life and term life insurance

use serde::{Deserialize, Serialize};

use super::{survival_probability, validate_qx};
use crate::error::{AlmError, AlmResult};
use crate::instrument::CashFlow;
use crate::sensitivity;

/// One period of a life-insurance projection
///
/// `net_cashflow = expected_benefit - expected_premium` (positive = net
/// outflow for the insurer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifeCashflowRow {
    pub period: u32,
    pub year: f64,
    /// Survival probability to the end of the period
    pub survival_prob: f64,
    /// Premium weighted by survival to the start of the period
    pub expected_premium: f64,
    /// Death benefit weighted by the probability of death in the period
    pub expected_benefit: f64,
    pub net_cashflow: f64,
}

fn project_rows(
    face_value: f64,
    annual_premium: f64,
    qx: &[f64],
    frequency: u32,
    n_periods: u32,
) -> Vec<LifeCashflowRow> {
    let f = frequency as f64;
    let pmt = annual_premium / f;

    (1..=n_periods)
        .map(|t| {
            let year_start = (t - 1) as f64 / f;
            let year_end = t as f64 / f;
            let sp_start = survival_probability(qx, year_start);
            let sp_end = survival_probability(qx, year_end);
            let death_prob = sp_start - sp_end;

            let expected_premium = pmt * sp_start;
            let expected_benefit = face_value * death_prob;
            LifeCashflowRow {
                period: t,
                year: year_end,
                survival_prob: sp_end,
                expected_premium,
                expected_benefit,
                net_cashflow: expected_benefit - expected_premium,
            }
        })
        .collect()
}

/// Level-premium whole life insurance: the death benefit is paid whenever
/// the insured dies, premiums are collected while alive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WholeLife {
    /// Death benefit amount
    pub face_value: f64,
    /// Level annual premium
    pub annual_premium: f64,
    /// Annual mortality rates from the insured's issue age
    pub qx: Vec<f64>,
    /// Premium payment periods per year
    pub frequency: u32,
    /// Issue age, for reporting
    pub issue_age: u8,
}

impl WholeLife {
    pub fn new(
        face_value: f64,
        annual_premium: f64,
        qx: Vec<f64>,
        frequency: u32,
        issue_age: u8,
    ) -> AlmResult<Self> {
        if face_value <= 0.0 || annual_premium <= 0.0 {
            return Err(AlmError::InvalidInput(format!(
                "whole life face and premium must be positive, got {face_value} and {annual_premium}"
            )));
        }
        if frequency == 0 {
            return Err(AlmError::InvalidInput(
                "whole life frequency must be at least 1".to_string(),
            ));
        }
        validate_qx(&qx)?;
        Ok(Self {
            face_value,
            annual_premium,
            qx,
            frequency,
            issue_age,
        })
    }

    /// Projection rows until table exhaustion
    pub fn cashflow_rows(&self) -> Vec<LifeCashflowRow> {
        let n_periods = self.qx.len() as u32 * self.frequency;
        project_rows(
            self.face_value,
            self.annual_premium,
            &self.qx,
            self.frequency,
            n_periods,
        )
    }

    /// Expected death benefits as a dated schedule (insurer outflows)
    pub fn expected_benefit_flows(&self) -> Vec<CashFlow> {
        self.cashflow_rows()
            .into_iter()
            .map(|row| CashFlow::new(row.year, row.expected_benefit))
            .collect()
    }

    /// PV of net cash flows (benefits minus premiums) at a flat annual rate
    pub fn net_present_value(&self, rate: f64) -> f64 {
        let flows: Vec<CashFlow> = self
            .cashflow_rows()
            .into_iter()
            .map(|row| CashFlow::new(row.year, row.net_cashflow))
            .collect();
        sensitivity::present_value(&flows, rate, self.frequency)
    }

    /// PV of expected death benefits at a flat annual rate
    pub fn benefit_present_value(&self, rate: f64) -> f64 {
        sensitivity::present_value(&self.expected_benefit_flows(), rate, self.frequency)
    }
}

/// Level-premium term life insurance: pays only if death occurs within the
/// policy term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermLife {
    /// Death benefit amount
    pub face_value: f64,
    /// Level annual premium
    pub annual_premium: f64,
    /// Policy term in years
    pub term: u32,
    /// Annual mortality rates from the insured's issue age; must cover the
    /// term
    pub qx: Vec<f64>,
    /// Premium payment periods per year
    pub frequency: u32,
    /// Issue age, for reporting
    pub issue_age: u8,
}

impl TermLife {
    pub fn new(
        face_value: f64,
        annual_premium: f64,
        term: u32,
        qx: Vec<f64>,
        frequency: u32,
        issue_age: u8,
    ) -> AlmResult<Self> {
        if face_value <= 0.0 || annual_premium <= 0.0 {
            return Err(AlmError::InvalidInput(format!(
                "term life face and premium must be positive, got {face_value} and {annual_premium}"
            )));
        }
        if term == 0 {
            return Err(AlmError::InvalidInput(
                "term length must be positive".to_string(),
            ));
        }
        if frequency == 0 {
            return Err(AlmError::InvalidInput(
                "term life frequency must be at least 1".to_string(),
            ));
        }
        validate_qx(&qx)?;
        if qx.len() < term as usize {
            return Err(AlmError::InvalidInput(format!(
                "term life qx vector covers {} years but the term is {}",
                qx.len(),
                term
            )));
        }
        Ok(Self {
            face_value,
            annual_premium,
            term,
            qx,
            frequency,
            issue_age,
        })
    }

    /// Projection rows over the policy term only
    ///
    /// The contract ends at the term even if the insured is alive; there is
    /// no benefit beyond it.
    pub fn cashflow_rows(&self) -> Vec<LifeCashflowRow> {
        let n_periods = self.term * self.frequency;
        project_rows(
            self.face_value,
            self.annual_premium,
            &self.qx,
            self.frequency,
            n_periods,
        )
    }

    /// Expected death benefits as a dated schedule (insurer outflows)
    pub fn expected_benefit_flows(&self) -> Vec<CashFlow> {
        self.cashflow_rows()
            .into_iter()
            .map(|row| CashFlow::new(row.year, row.expected_benefit))
            .collect()
    }

    /// PV of net cash flows (benefits minus premiums) at a flat annual rate
    pub fn net_present_value(&self, rate: f64) -> f64 {
        let flows: Vec<CashFlow> = self
            .cashflow_rows()
            .into_iter()
            .map(|row| CashFlow::new(row.year, row.net_cashflow))
            .collect();
        sensitivity::present_value(&flows, rate, self.frequency)
    }

    /// PV of expected death benefits at a flat annual rate
    pub fn benefit_present_value(&self, rate: f64) -> f64 {
        sensitivity::present_value(&self.expected_benefit_flows(), rate, self.frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_qx(q: f64, years: usize) -> Vec<f64> {
        vec![q; years]
    }

    #[test]
    fn test_whole_life_rows_cover_table() {
        let wl = WholeLife::new(100_000.0, 1_500.0, flat_qx(0.01, 30), 12, 40).unwrap();
        assert_eq!(wl.cashflow_rows().len(), 360);
    }

    #[test]
    fn test_death_probs_sum_to_one_minus_survival() {
        let wl = WholeLife::new(100_000.0, 1_500.0, flat_qx(0.02, 10), 4, 40).unwrap();
        let rows = wl.cashflow_rows();
        let total_benefit: f64 = rows.iter().map(|r| r.expected_benefit).sum();
        let final_survival = rows.last().unwrap().survival_prob;
        assert!((total_benefit - 100_000.0 * (1.0 - final_survival)).abs() < 1e-6);
    }

    #[test]
    fn test_term_truncates_at_term() {
        let term = TermLife::new(100_000.0, 500.0, 20, flat_qx(0.005, 60), 12, 35).unwrap();
        let rows = term.cashflow_rows();
        assert_eq!(rows.len(), 240);
        assert!((rows.last().unwrap().year - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_term_requires_qx_covering_term() {
        let result = TermLife::new(100_000.0, 500.0, 20, flat_qx(0.005, 10), 12, 35);
        assert!(matches!(result, Err(AlmError::InvalidInput(_))));
    }

    #[test]
    fn test_net_is_benefit_minus_premium() {
        let wl = WholeLife::new(50_000.0, 800.0, flat_qx(0.01, 5), 2, 50).unwrap();
        for row in wl.cashflow_rows() {
            assert!(
                (row.net_cashflow - (row.expected_benefit - row.expected_premium)).abs() < 1e-12
            );
        }
    }

    #[test]
    fn test_benefit_pv_positive_and_below_face() {
        let wl = WholeLife::new(100_000.0, 1_500.0, flat_qx(0.01, 40), 12, 40).unwrap();
        let pv = wl.benefit_present_value(0.04);
        assert!(pv > 0.0 && pv < 100_000.0);
    }
}
