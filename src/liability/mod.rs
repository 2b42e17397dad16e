//! Insurance liability models
//!
//! Each policy type turns a qx vector (annual mortality rates from the
//! insured's issue age) into a survival-weighted expected cash-flow
//! schedule. Policies are built once at block-generation time and are
//! immutable afterwards; only FIA crediting depends on an externally
//! supplied index-return path.

mod fia;
mod life;
mod spia;

pub use fia::{Fia, FiaCashflowRow};
pub use life::{LifeCashflowRow, TermLife, WholeLife};
pub use spia::{Spia, SpiaCashflowRow};

use serde::{Deserialize, Serialize};

use crate::error::{AlmError, AlmResult};
use crate::instrument::CashFlow;
use crate::sensitivity;

/// Probability of surviving from time 0 to `t` years
///
/// Whole years multiply out `(1 - qx)`; the fractional remainder uses the
/// uniform-distribution-of-deaths assumption within the year:
/// `S(t) = S(floor(t)) * (1 - frac * qx[floor(t)])`.
///
/// A qx of 1.0 at the table's final age drives survival to zero and with it
/// every remaining cash flow.
pub fn survival_probability(qx: &[f64], t: f64) -> f64 {
    let year = t as usize;
    let frac = t - year as f64;

    let mut sp = 1.0;
    for &q in qx.iter().take(year.min(qx.len())) {
        sp *= 1.0 - q;
    }
    if frac > 0.0 && year < qx.len() {
        sp *= 1.0 - frac * qx[year];
    }
    sp
}

/// Reject qx vectors with values outside [0, 1]; warn on unusually high ones
pub(crate) fn validate_qx(qx: &[f64]) -> AlmResult<()> {
    if qx.is_empty() {
        return Err(AlmError::InvalidInput(
            "policy qx vector must not be empty".to_string(),
        ));
    }
    for (i, &q) in qx.iter().enumerate() {
        if !q.is_finite() || !(0.0..=1.0).contains(&q) {
            return Err(AlmError::InvalidInput(format!(
                "qx[{i}] = {q} is outside [0, 1]"
            )));
        }
        if q > 0.5 && q < 1.0 {
            log::warn!("qx[{i}] = {q:.4} is unusually high (>50%)");
        }
    }
    Ok(())
}

/// A liability policy of any supported type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LiabilityPolicy {
    Spia(Spia),
    WholeLife(WholeLife),
    Term(TermLife),
    Fia(Fia),
}

impl LiabilityPolicy {
    /// Issue age of the insured
    pub fn issue_age(&self) -> u8 {
        match self {
            LiabilityPolicy::Spia(p) => p.issue_age,
            LiabilityPolicy::WholeLife(p) => p.issue_age,
            LiabilityPolicy::Term(p) => p.issue_age,
            LiabilityPolicy::Fia(p) => p.issue_age,
        }
    }

    /// Payment periods per year
    pub fn frequency(&self) -> u32 {
        match self {
            LiabilityPolicy::Spia(p) => p.frequency,
            LiabilityPolicy::WholeLife(p) => p.frequency,
            LiabilityPolicy::Term(p) => p.frequency,
            LiabilityPolicy::Fia(_) => 1,
        }
    }

    /// Expected benefit outflows as a dated schedule
    ///
    /// SPIA reports expected payouts; whole-life and term report expected
    /// death benefits; FIA reports expected death plus maturity benefits
    /// credited along `index_returns` (ignored by the other types).
    pub fn expected_benefit_flows(&self, index_returns: &[f64]) -> AlmResult<Vec<CashFlow>> {
        match self {
            LiabilityPolicy::Spia(p) => Ok(p.expected_benefit_flows()),
            LiabilityPolicy::WholeLife(p) => Ok(p.expected_benefit_flows()),
            LiabilityPolicy::Term(p) => Ok(p.expected_benefit_flows()),
            LiabilityPolicy::Fia(p) => p.expected_benefit_flows(index_returns),
        }
    }

    /// PV of expected benefit outflows at a flat annual rate
    pub fn benefit_present_value(&self, rate: f64, index_returns: &[f64]) -> AlmResult<f64> {
        let flows = self.expected_benefit_flows(index_returns)?;
        Ok(sensitivity::present_value(&flows, rate, self.frequency()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survival_whole_years() {
        let qx = vec![0.01, 0.02, 0.03];
        let s2 = survival_probability(&qx, 2.0);
        assert!((s2 - 0.99 * 0.98).abs() < 1e-12);
    }

    #[test]
    fn test_survival_udd_interpolation() {
        // S(2) = 0.98 and qx[2] = 0.01 give S(2.5) = 0.98 * (1 - 0.5*0.01)
        let qx = vec![0.0, 0.02, 0.01];
        let s25 = survival_probability(&qx, 2.5);
        assert!((s25 - 0.98 * 0.995).abs() < 1e-12);
        assert!((s25 - 0.9751).abs() < 1e-12);
    }

    #[test]
    fn test_survival_terminal_qx_one() {
        let qx = vec![0.1, 1.0, 0.1];
        assert_eq!(survival_probability(&qx, 2.0), 0.0);
        assert_eq!(survival_probability(&qx, 3.0), 0.0);
    }

    #[test]
    fn test_survival_beyond_table_is_flat() {
        let qx = vec![0.1];
        let s1 = survival_probability(&qx, 1.0);
        assert_eq!(survival_probability(&qx, 5.0), s1);
    }

    #[test]
    fn test_validate_qx() {
        assert!(validate_qx(&[0.0, 0.5, 1.0]).is_ok());
        assert!(validate_qx(&[]).is_err());
        assert!(validate_qx(&[1.5]).is_err());
        assert!(validate_qx(&[-0.1]).is_err());
    }
}
