//! Rate-shock scenarios and seeded index-path simulation
//!
//! The runner revalues a block's surplus and hedge gaps across a list of
//! parallel shocks without regenerating the block: the block's policies and
//! assets are fixed, only the valuation rate moves.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::error::{AlmError, AlmResult};

/// Block valuation under one parallel shock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateScenarioRow {
    /// Shock in basis points relative to the block's discount rate
    pub shock_bps: f64,
    /// Shocked valuation rate
    pub rate: f64,
    pub asset_pv: f64,
    pub liability_pv: f64,
    pub surplus: f64,
    pub dv01_gap: f64,
}

/// Revalues blocks across a fixed list of parallel shocks
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    shocks_bps: Vec<f64>,
}

impl ScenarioRunner {
    pub fn new(shocks_bps: Vec<f64>) -> Self {
        Self { shocks_bps }
    }

    /// The usual shock ladder: -200 to +200 bps
    pub fn standard() -> Self {
        Self::new(vec![-200.0, -100.0, -50.0, 0.0, 50.0, 100.0, 200.0])
    }

    pub fn shocks_bps(&self) -> &[f64] {
        &self.shocks_bps
    }

    /// Revalue one block at every shock
    pub fn run(&self, block: &Block) -> Vec<RateScenarioRow> {
        self.shocks_bps
            .iter()
            .map(|&shock_bps| {
                let rate = block.discount_rate() + shock_bps / 10_000.0;
                RateScenarioRow {
                    shock_bps,
                    rate,
                    asset_pv: block.asset_present_value(rate),
                    liability_pv: block.liability_present_value(rate),
                    surplus: block.surplus(rate),
                    dv01_gap: block.dv01_gap(rate),
                }
            })
            .collect()
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::standard()
    }
}

/// Simulate annual index returns for FIA crediting
///
/// Seeded normal draws; the same seed reproduces the path bit-for-bit.
pub fn simulate_index_returns(
    seed: u64,
    years: usize,
    mean: f64,
    volatility: f64,
) -> AlmResult<Vec<f64>> {
    let normal = Normal::new(mean, volatility).map_err(|e| {
        AlmError::InvalidInput(format!(
            "bad index-return parameters (mean {mean}, vol {volatility}): {e}"
        ))
    })?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..years).map(|_| normal.sample(&mut rng)).collect())
}
