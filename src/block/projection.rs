//! Year-by-year block projection with reinvestment
//!
//! An explicit state machine keyed by the projection year: each step
//! collects the asset and liability cash flows due that year, then rolls the
//! face of any bullet instrument whose final payment just landed into new
//! purchases per the SAA. Years run strictly in order — a later year's flows
//! depend on the holdings produced by the earlier years' reinvestment, so
//! the loop is sequential by construction.

use serde::{Deserialize, Serialize};

use super::{reinvest_allocation, Block};
use crate::assumptions::CreditSpreadCurve;
use crate::error::AlmResult;
use crate::instrument::AssetInstrument;

/// One projection year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub year: u32,
    /// Asset inflows due this year
    pub asset_cashflow: f64,
    /// Expected liability outflows due this year
    pub liability_cashflow: f64,
    /// Assets minus liabilities
    pub net_cashflow: f64,
    /// Face of bullet instruments that matured this year
    pub matured_proceeds: f64,
    /// Discount factor back to the valuation date
    pub discount_factor: f64,
}

/// Totals over a projection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub horizon: u32,
    pub total_asset_cashflow: f64,
    pub total_liability_cashflow: f64,
    pub total_reinvested: f64,
    /// PV of projected asset flows at the block rate
    pub pv_assets: f64,
    /// PV of projected liability flows at the block rate
    pub pv_liabilities: f64,
    pub pv_surplus: f64,
}

/// Complete projection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub rows: Vec<ProjectionRow>,
}

impl ProjectionResult {
    /// Summarize the run
    pub fn summary(&self) -> ProjectionSummary {
        let pv_assets: f64 = self
            .rows
            .iter()
            .map(|r| r.asset_cashflow * r.discount_factor)
            .sum();
        let pv_liabilities: f64 = self
            .rows
            .iter()
            .map(|r| r.liability_cashflow * r.discount_factor)
            .sum();
        ProjectionSummary {
            horizon: self.rows.len() as u32,
            total_asset_cashflow: self.rows.iter().map(|r| r.asset_cashflow).sum(),
            total_liability_cashflow: self.rows.iter().map(|r| r.liability_cashflow).sum(),
            total_reinvested: self.rows.iter().map(|r| r.matured_proceeds).sum(),
            pv_assets,
            pv_liabilities,
            pv_surplus: pv_assets - pv_liabilities,
        }
    }
}

/// A held instrument tagged with the year it was purchased, so its cash-flow
/// times can be placed on the projection calendar
#[derive(Debug, Clone)]
struct Holding {
    issue_year: u32,
    instrument: AssetInstrument,
}

impl Holding {
    /// Inflows from this holding that land in the given projection year
    fn cashflow_in_year(&self, year: u32) -> f64 {
        self.instrument
            .cash_flows()
            .iter()
            .filter(|cf| self.issue_year + cf.time.ceil() as u32 == year)
            .map(|cf| cf.amount)
            .sum()
    }

    /// Final payment year on the projection calendar
    fn maturity_year(&self) -> u32 {
        self.issue_year + self.instrument.maturity()
    }
}

/// Project a block over `horizon` years
///
/// The block itself is not mutated; the projection works on its own copy of
/// the holdings. Reinvestment happens at the end of the year a bullet
/// matures, at the block's discount rate — the model holds the rate
/// environment flat rather than simulating future curves.
pub fn project(
    block: &Block,
    horizon: u32,
    spreads: &CreditSpreadCurve,
) -> AlmResult<ProjectionResult> {
    let rate = block.discount_rate();
    let liability_by_year = block.liability_cash_flows();

    let mut held: Vec<Holding> = block
        .assets()
        .iter()
        .cloned()
        .map(|instrument| Holding {
            issue_year: 0,
            instrument,
        })
        .collect();

    let mut rows = Vec::with_capacity(horizon as usize);
    for year in 1..=horizon {
        let asset_cashflow: f64 = held.iter().map(|h| h.cashflow_in_year(year)).sum();
        let liability_cashflow = liability_by_year.get(&year).copied().unwrap_or(0.0);

        // Bullets whose final payment landed this year roll into new
        // purchases available from next year on
        let (matured, remaining): (Vec<_>, Vec<_>) = held
            .into_iter()
            .partition(|h| h.instrument.is_bullet() && h.maturity_year() <= year);
        let matured_proceeds: f64 = matured.iter().map(|h| h.instrument.face_amount()).sum();

        held = remaining;
        if matured_proceeds > 0.0 {
            let purchases =
                reinvest_allocation(matured_proceeds, &block.config().saa, rate, spreads)?;
            held.extend(purchases.into_iter().map(|instrument| Holding {
                issue_year: year,
                instrument,
            }));
        }

        rows.push(ProjectionRow {
            year,
            asset_cashflow,
            liability_cashflow,
            net_cashflow: asset_cashflow - liability_cashflow,
            matured_proceeds,
            discount_factor: (1.0 + rate).powi(-(year as i32)),
        });
    }

    Ok(ProjectionResult { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::MortalityTable;
    use crate::block::{BlockConfig, LiabilityKind, Saa};

    fn synthetic_mortality() -> MortalityTable {
        let rates: Vec<(f64, f64)> = (0..=120)
            .map(|age| {
                let q = (0.0005 * 1.07f64.powi(age)).min(1.0);
                (q * 0.9, q)
            })
            .collect();
        MortalityTable::new(rates).unwrap()
    }

    fn term_block() -> Block {
        let config = BlockConfig {
            n_policies: 20,
            ..BlockConfig::new(
                LiabilityKind::Term,
                Saa::term_mix(),
                10_000_000.0,
                (35, 55),
                0.04,
            )
        };
        Block::generate(config, &synthetic_mortality(), &CreditSpreadCurve::builtin()).unwrap()
    }

    #[test]
    fn test_projection_covers_horizon_in_order() {
        let block = term_block();
        let result = project(&block, 25, &CreditSpreadCurve::builtin()).unwrap();
        assert_eq!(result.rows.len(), 25);
        for (i, row) in result.rows.iter().enumerate() {
            assert_eq!(row.year, i as u32 + 1);
        }
    }

    #[test]
    fn test_first_maturity_triggers_reinvestment() {
        // The term ladder's shortest rung is 3 years, so year 3 is the first
        // with matured proceeds and no earlier year has any
        let block = term_block();
        let result = project(&block, 10, &CreditSpreadCurve::builtin()).unwrap();
        assert_eq!(result.rows[0].matured_proceeds, 0.0);
        assert_eq!(result.rows[1].matured_proceeds, 0.0);
        assert!(result.rows[2].matured_proceeds > 0.0);
    }

    #[test]
    fn test_reinvested_flows_appear_in_later_years() {
        // All-bond block: every initial bullet is gone by year 10, so any
        // flow after that can only come from reinvested proceeds
        use std::collections::BTreeMap;
        use crate::block::AssetClass;

        let config = BlockConfig {
            n_policies: 20,
            saa: Saa::new(BTreeMap::from([(AssetClass::GovtBonds, 1.0)])).unwrap(),
            ..BlockConfig::new(
                LiabilityKind::Term,
                Saa::term_mix(),
                10_000_000.0,
                (35, 55),
                0.04,
            )
        };
        let block =
            Block::generate(config, &synthetic_mortality(), &CreditSpreadCurve::builtin())
                .unwrap();

        let result = project(&block, 14, &CreditSpreadCurve::builtin()).unwrap();
        let late_flows: f64 = result
            .rows
            .iter()
            .filter(|r| r.year > 10 && r.year <= 13)
            .map(|r| r.asset_cashflow)
            .sum();
        assert!(late_flows > 0.0);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let block = term_block();
        let a = project(&block, 20, &CreditSpreadCurve::builtin()).unwrap();
        let b = project(&block, 20, &CreditSpreadCurve::builtin()).unwrap();
        for (ra, rb) in a.rows.iter().zip(&b.rows) {
            assert_eq!(ra.asset_cashflow.to_bits(), rb.asset_cashflow.to_bits());
            assert_eq!(ra.net_cashflow.to_bits(), rb.net_cashflow.to_bits());
        }
    }

    #[test]
    fn test_projection_does_not_mutate_block() {
        let block = term_block();
        let assets_before = block.assets().len();
        let _ = project(&block, 20, &CreditSpreadCurve::builtin()).unwrap();
        assert_eq!(block.assets().len(), assets_before);
    }

    #[test]
    fn test_summary_totals() {
        let block = term_block();
        let result = project(&block, 20, &CreditSpreadCurve::builtin()).unwrap();
        let summary = result.summary();
        assert_eq!(summary.horizon, 20);
        assert!(summary.total_asset_cashflow > 0.0);
        assert!(summary.total_liability_cashflow > 0.0);
        assert!(
            (summary.pv_surplus - (summary.pv_assets - summary.pv_liabilities)).abs() < 1e-9
        );
    }
}
