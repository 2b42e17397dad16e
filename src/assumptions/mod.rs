//! Shared read-only market and actuarial assumptions
//!
//! The mortality table, credit spread grid, and treasury curve are loaded
//! once — from CSV files or from the embedded defaults — and passed by
//! reference to every component that needs them. Nothing in the core mutates
//! them.

mod mortality;
mod spreads;
mod treasury;
pub mod loader;

pub use mortality::{Gender, MortalityTable};
pub use spreads::{CreditSpreadCurve, Rating, SpreadAnchors};
pub use treasury::RateCurve;

use std::path::Path;

use crate::error::AlmResult;

/// Container for one immutable snapshot of all shared assumptions
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub mortality: MortalityTable,
    pub spreads: CreditSpreadCurve,
    pub treasury: RateCurve,
}

impl Assumptions {
    /// Embedded defaults: IAM 2012 Basic mortality, the built-in spread grid,
    /// and the built-in treasury snapshot
    pub fn default_pricing() -> Self {
        Self {
            mortality: MortalityTable::iam_2012_basic(),
            spreads: CreditSpreadCurve::builtin(),
            treasury: RateCurve::builtin_treasury(),
        }
    }

    /// Load all three tables from CSV files in the default location
    pub fn from_csv() -> AlmResult<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load all three tables from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> AlmResult<Self> {
        Ok(Self {
            mortality: loader::load_mortality_table(path)?,
            spreads: loader::load_credit_spreads(path)?,
            treasury: loader::load_treasury_curve(path)?,
        })
    }
}
