//! Blocks of business
//!
//! A block is a homogeneous group of policies of one liability type plus the
//! asset portfolio backing them under a strategic asset allocation. The
//! block owns its policies and assets by value; the mortality table and
//! credit spread grid are injected where needed and never mutated.

mod projection;

pub use projection::{project, ProjectionResult, ProjectionRow, ProjectionSummary};

use std::collections::BTreeMap;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::assumptions::{CreditSpreadCurve, Gender, MortalityTable, Rating};
use crate::error::{AlmError, AlmResult};
use crate::instrument::{AssetInstrument, Bond, CashFlow, Mortgage, PrivateCredit};
use crate::liability::{Fia, LiabilityPolicy, Spia, TermLife, WholeLife};
use crate::sensitivity;
use crate::solver;

/// Asset classes recognized by the strategic asset allocation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AssetClass {
    GovtBonds,
    CorpBonds,
    Mortgages,
    PrivateCredit,
}

/// Rating split for government bond purchases
pub const GOVT_RATING_DIST: &[(Rating, f64)] = &[(Rating::AAA, 0.70), (Rating::AA, 0.30)];
/// Rating split for corporate bond purchases
pub const CORP_RATING_DIST: &[(Rating, f64)] = &[
    (Rating::A, 0.30),
    (Rating::BBB, 0.50),
    (Rating::BB, 0.15),
    (Rating::B, 0.05),
];
/// Rating split for private credit purchases
pub const PC_RATING_DIST: &[(Rating, f64)] = &[(Rating::BB, 0.40), (Rating::B, 0.60)];

/// Maximum share of the portfolio in private credit
pub const PRIVATE_CREDIT_CAP: f64 = 0.10;
/// Default tenor for reinvested bullet proceeds, in years
pub const REINVEST_TENOR: u32 = 5;

/// SPIA annual payout as a share of premium
const SPIA_PAYOUT_RATE: f64 = 0.06;
/// Whole life annual premium as a share of face
const WL_PREMIUM_RATE: f64 = 0.015;
/// Term annual premium as a share of face
const TERM_PREMIUM_RATE: f64 = 0.005;
/// Term length for generated term policies, in years
const TERM_YEARS: u32 = 20;
/// Accumulation period for generated FIA policies, in years
const FIA_TERM: u32 = 10;
/// Payment periods per year for generated SPIA/WL/Term policies
const POLICY_FREQUENCY: u32 = 12;

/// Strategic asset allocation: target weights by asset class
///
/// Weights must sum to 1.0 and private credit cannot exceed its cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Saa {
    weights: BTreeMap<AssetClass, f64>,
}

impl Saa {
    pub fn new(weights: BTreeMap<AssetClass, f64>) -> AlmResult<Self> {
        let total: f64 = weights.values().sum();
        if (total - 1.0).abs() > 1e-9 {
            return Err(AlmError::InvalidInput(format!(
                "SAA weights must sum to 1.0, got {total:.6}"
            )));
        }
        for (class, w) in &weights {
            if *w < 0.0 {
                return Err(AlmError::InvalidInput(format!(
                    "SAA weight for {class:?} is negative: {w}"
                )));
            }
        }
        let pc = weights
            .get(&AssetClass::PrivateCredit)
            .copied()
            .unwrap_or(0.0);
        if pc > PRIVATE_CREDIT_CAP + 1e-9 {
            return Err(AlmError::InvalidInput(format!(
                "private credit allocation ({:.1}%) exceeds the {:.0}% maximum",
                pc * 100.0,
                PRIVATE_CREDIT_CAP * 100.0
            )));
        }
        Ok(Self { weights })
    }

    /// Weight for one asset class (0 when absent)
    pub fn weight(&self, class: AssetClass) -> f64 {
        self.weights.get(&class).copied().unwrap_or(0.0)
    }

    /// Dollar amounts per asset class
    pub fn allocation(&self, total_amount: f64) -> BTreeMap<AssetClass, f64> {
        self.weights
            .iter()
            .map(|(class, w)| (*class, w * total_amount))
            .collect()
    }

    /// Default mix: 40% govt, 30% corp, 20% mortgages, 10% private credit
    pub fn default_mix() -> Self {
        Self {
            weights: BTreeMap::from([
                (AssetClass::GovtBonds, 0.40),
                (AssetClass::CorpBonds, 0.30),
                (AssetClass::Mortgages, 0.20),
                (AssetClass::PrivateCredit, 0.10),
            ]),
        }
    }

    /// Mix tuned for SPIA blocks (longer duration, more bonds)
    pub fn spia_mix() -> Self {
        Self {
            weights: BTreeMap::from([
                (AssetClass::GovtBonds, 0.50),
                (AssetClass::CorpBonds, 0.30),
                (AssetClass::Mortgages, 0.10),
                (AssetClass::PrivateCredit, 0.10),
            ]),
        }
    }

    /// Mix tuned for term blocks (shorter duration)
    pub fn term_mix() -> Self {
        Self {
            weights: BTreeMap::from([
                (AssetClass::GovtBonds, 0.30),
                (AssetClass::CorpBonds, 0.30),
                (AssetClass::Mortgages, 0.30),
                (AssetClass::PrivateCredit, 0.10),
            ]),
        }
    }
}

/// Liability type written in a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiabilityKind {
    Spia,
    WholeLife,
    Term,
    Fia,
}

impl fmt::Display for LiabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LiabilityKind::Spia => "SPIA",
            LiabilityKind::WholeLife => "WL",
            LiabilityKind::Term => "Term",
            LiabilityKind::Fia => "FIA",
        };
        f.pad(s)
    }
}

/// Bond maturity ladder used when investing a block's premium
fn maturity_ladder(kind: LiabilityKind) -> &'static [u32] {
    match kind {
        LiabilityKind::Spia | LiabilityKind::WholeLife => &[5, 10, 20, 30],
        LiabilityKind::Term => &[3, 5, 10],
        LiabilityKind::Fia => &[3, 5, 7, 10],
    }
}

/// Parameters for generating a block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockConfig {
    pub liability_kind: LiabilityKind,
    pub saa: Saa,
    /// Total starting liability amount (premium or face value)
    pub total_liability_amount: f64,
    /// (min_age, max_age) for random policy generation
    pub age_range: (u8, u8),
    /// Flat annual discount rate for PV calculations
    pub discount_rate: f64,
    /// Number of individual policies to generate
    pub n_policies: u32,
    /// Proportion male (0.0 = all female, 1.0 = all male)
    pub gender_split: f64,
    /// Random seed; the same seed reproduces the block exactly
    pub seed: u64,
    /// Annual index returns for FIA crediting (required for FIA blocks)
    pub index_returns: Vec<f64>,
    /// Total investable amount; computed from liability PVs when None
    pub premium: Option<f64>,
    /// Markup over the actuarial PV of benefits when premium is computed
    pub profit_margin: f64,
}

impl BlockConfig {
    /// Config with the usual defaults: 500 policies, even gender split,
    /// seed 42, 5% profit margin
    pub fn new(
        liability_kind: LiabilityKind,
        saa: Saa,
        total_liability_amount: f64,
        age_range: (u8, u8),
        discount_rate: f64,
    ) -> Self {
        Self {
            liability_kind,
            saa,
            total_liability_amount,
            age_range,
            discount_rate,
            n_policies: 500,
            gender_split: 0.5,
            seed: 42,
            index_returns: Vec::new(),
            premium: None,
            profit_margin: 0.05,
        }
    }

    fn validate(&self) -> AlmResult<()> {
        if self.total_liability_amount <= 0.0 {
            return Err(AlmError::InvalidInput(format!(
                "total liability amount must be positive, got {}",
                self.total_liability_amount
            )));
        }
        if self.n_policies == 0 {
            return Err(AlmError::InvalidInput(
                "block needs at least one policy".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.gender_split) {
            return Err(AlmError::InvalidInput(format!(
                "gender split must be in [0, 1], got {}",
                self.gender_split
            )));
        }
        if self.age_range.0 > self.age_range.1 {
            return Err(AlmError::InvalidInput(format!(
                "age range ({}, {}) is inverted",
                self.age_range.0, self.age_range.1
            )));
        }
        if self.profit_margin < 0.0 {
            return Err(AlmError::InvalidInput(format!(
                "profit margin must be non-negative, got {}",
                self.profit_margin
            )));
        }
        if let Some(premium) = self.premium {
            if premium <= 0.0 {
                return Err(AlmError::InvalidInput(format!(
                    "explicit premium must be positive, got {premium}"
                )));
            }
        }
        if self.liability_kind == LiabilityKind::Fia
            && self.index_returns.len() < FIA_TERM as usize
        {
            return Err(AlmError::InvalidInput(format!(
                "FIA blocks need {} index returns, got {}",
                FIA_TERM,
                self.index_returns.len()
            )));
        }
        Ok(())
    }
}

/// A block of business: liabilities and the assets backing them
#[derive(Debug, Clone)]
pub struct Block {
    config: BlockConfig,
    policies: Vec<LiabilityPolicy>,
    /// Per-policy (frequency, expected benefit flows), fixed at generation
    liability_flows: Vec<(u32, Vec<CashFlow>)>,
    assets: Vec<AssetInstrument>,
    premium: f64,
}

impl Block {
    /// Generate a block: seeded policies, premium by the equivalence
    /// principle, and assets per the SAA
    pub fn generate(
        config: BlockConfig,
        mortality: &MortalityTable,
        spreads: &CreditSpreadCurve,
    ) -> AlmResult<Self> {
        config.validate()?;

        let policies = Self::generate_policies(&config, mortality)?;
        let liability_flows: Vec<(u32, Vec<CashFlow>)> = policies
            .iter()
            .map(|p| Ok((p.frequency(), p.expected_benefit_flows(&config.index_returns)?)))
            .collect::<AlmResult<_>>()?;

        let pv_benefits: f64 = liability_flows
            .iter()
            .map(|(freq, flows)| sensitivity::present_value(flows, config.discount_rate, *freq))
            .sum();
        let premium = match config.premium {
            Some(p) => p,
            None => {
                let p = pv_benefits * (1.0 + config.profit_margin);
                log::info!(
                    "{} block premium ${p:.0} (PV benefits ${pv_benefits:.0} x {:.0}% margin)",
                    config.liability_kind,
                    (1.0 + config.profit_margin) * 100.0
                );
                p
            }
        };

        let assets = Self::generate_assets(&config, premium, spreads)?;
        Ok(Self {
            config,
            policies,
            liability_flows,
            assets,
            premium,
        })
    }

    /// Create the individual policies with seeded random ages and genders,
    /// each taking a pro-rata share of the total liability amount
    fn generate_policies(
        config: &BlockConfig,
        mortality: &MortalityTable,
    ) -> AlmResult<Vec<LiabilityPolicy>> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let (min_age, max_age) = config.age_range;
        let per_policy = config.total_liability_amount / config.n_policies as f64;

        (0..config.n_policies)
            .map(|_| {
                let age = rng.gen_range(min_age..=max_age);
                let gender = if rng.gen_bool(config.gender_split) {
                    Gender::Male
                } else {
                    Gender::Female
                };
                let qx = mortality.qx_from(age, gender)?;

                let policy = match config.liability_kind {
                    LiabilityKind::Spia => LiabilityPolicy::Spia(Spia::new(
                        per_policy,
                        per_policy * SPIA_PAYOUT_RATE,
                        qx,
                        POLICY_FREQUENCY,
                        age,
                    )?),
                    LiabilityKind::WholeLife => LiabilityPolicy::WholeLife(WholeLife::new(
                        per_policy,
                        per_policy * WL_PREMIUM_RATE,
                        qx,
                        POLICY_FREQUENCY,
                        age,
                    )?),
                    LiabilityKind::Term => LiabilityPolicy::Term(TermLife::new(
                        per_policy,
                        per_policy * TERM_PREMIUM_RATE,
                        TERM_YEARS,
                        qx,
                        POLICY_FREQUENCY,
                        age,
                    )?),
                    LiabilityKind::Fia => {
                        LiabilityPolicy::Fia(Fia::new(per_policy, FIA_TERM, qx, age)?)
                    }
                };
                Ok(policy)
            })
            .collect()
    }

    /// Invest the premium across asset classes per the SAA, splitting each
    /// class across ratings and the liability type's maturity ladder
    fn generate_assets(
        config: &BlockConfig,
        premium: f64,
        spreads: &CreditSpreadCurve,
    ) -> AlmResult<Vec<AssetInstrument>> {
        let alloc = config.saa.allocation(premium);
        let maturities = maturity_ladder(config.liability_kind);
        let rate = config.discount_rate;
        let mut assets = Vec::new();

        let govt = alloc.get(&AssetClass::GovtBonds).copied().unwrap_or(0.0);
        if govt > 0.0 {
            for &(rating, weight) in GOVT_RATING_DIST {
                for &maturity in maturities {
                    let spread = spreads.spread(rating, maturity as f64)?;
                    let face = govt * weight / maturities.len() as f64;
                    assets.push(AssetInstrument::Bond(
                        Bond::new(face, rate + spread, maturity, 2)?.with_rating(rating, spread),
                    ));
                }
            }
        }

        let corp = alloc.get(&AssetClass::CorpBonds).copied().unwrap_or(0.0);
        if corp > 0.0 {
            for &(rating, weight) in CORP_RATING_DIST {
                for &maturity in maturities {
                    let spread = spreads.spread(rating, maturity as f64)?;
                    let face = corp * weight / maturities.len() as f64;
                    assets.push(AssetInstrument::Bond(
                        Bond::new(face, rate + spread, maturity, 2)?.with_rating(rating, spread),
                    ));
                }
            }
        }

        let mortgages = alloc.get(&AssetClass::Mortgages).copied().unwrap_or(0.0);
        if mortgages > 0.0 {
            for term in [15u32, 30] {
                let spread = spreads.spread(Rating::A, term as f64)?;
                assets.push(AssetInstrument::Mortgage(Mortgage::new(
                    mortgages * 0.5,
                    rate + spread,
                    term,
                    12,
                )?));
            }
        }

        let pc = alloc.get(&AssetClass::PrivateCredit).copied().unwrap_or(0.0);
        if pc > 0.0 {
            let pc_maturities = [3u32, 5];
            for &(rating, weight) in PC_RATING_DIST {
                for &maturity in pc_maturities.iter() {
                    let spread = spreads.spread(rating, maturity as f64)?;
                    let face = pc * weight / pc_maturities.len() as f64;
                    assets.push(AssetInstrument::PrivateCredit(
                        PrivateCredit::new(face, maturity, rate, spread, 2)?.with_rating(rating),
                    ));
                }
            }
        }

        Ok(assets)
    }

    pub fn config(&self) -> &BlockConfig {
        &self.config
    }

    pub fn liability_kind(&self) -> LiabilityKind {
        self.config.liability_kind
    }

    pub fn discount_rate(&self) -> f64 {
        self.config.discount_rate
    }

    /// Total investable premium backing the block
    pub fn premium(&self) -> f64 {
        self.premium
    }

    pub fn policies(&self) -> &[LiabilityPolicy] {
        &self.policies
    }

    pub fn assets(&self) -> &[AssetInstrument] {
        &self.assets
    }

    /// Aggregate expected liability outflows by calendar year
    pub fn liability_cash_flows(&self) -> BTreeMap<u32, f64> {
        let mut by_year = BTreeMap::new();
        for (_, flows) in &self.liability_flows {
            for cf in flows {
                *by_year.entry(cf.time.ceil() as u32).or_insert(0.0) += cf.amount;
            }
        }
        by_year
    }

    /// Aggregate asset inflows by calendar year
    pub fn asset_cash_flows(&self) -> BTreeMap<u32, f64> {
        let mut by_year = BTreeMap::new();
        for asset in &self.assets {
            for cf in asset.cash_flows() {
                *by_year.entry(cf.time.ceil() as u32).or_insert(0.0) += cf.amount;
            }
        }
        by_year
    }

    /// PV of all assets at a flat annual rate
    pub fn asset_present_value(&self, rate: f64) -> f64 {
        self.assets.iter().map(|a| a.present_value(rate)).sum()
    }

    /// PV of all expected liability outflows at a flat annual rate
    pub fn liability_present_value(&self, rate: f64) -> f64 {
        self.liability_flows
            .iter()
            .map(|(freq, flows)| sensitivity::present_value(flows, rate, *freq))
            .sum()
    }

    /// Surplus = assets PV - liabilities PV, always derived on demand
    pub fn surplus(&self, rate: f64) -> f64 {
        self.asset_present_value(rate) - self.liability_present_value(rate)
    }

    /// DV01 of the asset portfolio
    pub fn asset_dv01(&self, rate: f64) -> f64 {
        sensitivity::dv01(|r| self.asset_present_value(r), rate)
    }

    /// DV01 of the liability portfolio
    pub fn liability_dv01(&self, rate: f64) -> f64 {
        sensitivity::dv01(|r| self.liability_present_value(r), rate)
    }

    /// DV01 gap the hedge must close (liabilities minus assets)
    pub fn dv01_gap(&self, rate: f64) -> f64 {
        self.liability_dv01(rate) - self.asset_dv01(rate)
    }

    /// Dollar convexity of the asset portfolio
    pub fn asset_dollar_convexity(&self, rate: f64) -> f64 {
        sensitivity::dollar_convexity(|r| self.asset_present_value(r), rate)
    }

    /// Dollar convexity of the liability portfolio
    pub fn liability_dollar_convexity(&self, rate: f64) -> f64 {
        sensitivity::dollar_convexity(|r| self.liability_present_value(r), rate)
    }

    /// Dollar-convexity gap the hedge must close (liabilities minus assets)
    pub fn dollar_convexity_gap(&self, rate: f64) -> f64 {
        self.liability_dollar_convexity(rate) - self.asset_dollar_convexity(rate)
    }

    /// IRR of the asset portfolio against the invested premium
    ///
    /// Cash flows are normalized by the premium before solving: IRR is
    /// scale-invariant, and the normalization keeps the solver's absolute
    /// NPV tolerance meaningful for billion-dollar blocks.
    pub fn asset_irr(&self) -> AlmResult<f64> {
        let by_year = self.asset_cash_flows();
        let max_year = by_year.keys().last().copied().unwrap_or(0);
        let mut cashflows = vec![-1.0];
        for year in 1..=max_year {
            cashflows.push(by_year.get(&year).copied().unwrap_or(0.0) / self.premium);
        }
        solver::irr(&cashflows)
    }

    /// Reinvest proceeds of bullet instruments that matured strictly before
    /// `year`, per the SAA at the default reinvestment tenor
    ///
    /// Returns the newly purchased instruments.
    pub fn reinvest(
        &mut self,
        year: u32,
        spreads: &CreditSpreadCurve,
    ) -> AlmResult<Vec<AssetInstrument>> {
        let (matured, remaining): (Vec<_>, Vec<_>) = self
            .assets
            .iter()
            .cloned()
            .partition(|a| a.is_bullet() && a.maturity() < year);
        let proceeds: f64 = matured.iter().map(|a| a.face_amount()).sum();
        if proceeds <= 0.0 {
            return Ok(Vec::new());
        }

        let new_assets = reinvest_allocation(
            proceeds,
            &self.config.saa,
            self.config.discount_rate,
            spreads,
        )?;
        self.assets = remaining;
        self.assets.extend(new_assets.iter().cloned());
        Ok(new_assets)
    }
}

/// Buy a fresh slate of instruments with matured proceeds, per SAA weights
/// at the then-current discount rate
///
/// Bullet purchases go to the default reinvestment tenor; mortgages roll
/// into a single 15-year pool. Using the current flat rate rather than a
/// simulated future curve is a stated simplifying assumption of the
/// projection model.
pub(crate) fn reinvest_allocation(
    proceeds: f64,
    saa: &Saa,
    discount_rate: f64,
    spreads: &CreditSpreadCurve,
) -> AlmResult<Vec<AssetInstrument>> {
    let alloc = saa.allocation(proceeds);
    let mut new_assets = Vec::new();

    let govt = alloc.get(&AssetClass::GovtBonds).copied().unwrap_or(0.0);
    if govt > 0.0 {
        for &(rating, weight) in GOVT_RATING_DIST {
            let spread = spreads.spread(rating, REINVEST_TENOR as f64)?;
            new_assets.push(AssetInstrument::Bond(
                Bond::new(govt * weight, discount_rate + spread, REINVEST_TENOR, 2)?
                    .with_rating(rating, spread),
            ));
        }
    }

    let corp = alloc.get(&AssetClass::CorpBonds).copied().unwrap_or(0.0);
    if corp > 0.0 {
        for &(rating, weight) in CORP_RATING_DIST {
            let spread = spreads.spread(rating, REINVEST_TENOR as f64)?;
            new_assets.push(AssetInstrument::Bond(
                Bond::new(corp * weight, discount_rate + spread, REINVEST_TENOR, 2)?
                    .with_rating(rating, spread),
            ));
        }
    }

    let mortgages = alloc.get(&AssetClass::Mortgages).copied().unwrap_or(0.0);
    if mortgages > 0.0 {
        let spread = spreads.spread(Rating::A, 15.0)?;
        new_assets.push(AssetInstrument::Mortgage(Mortgage::new(
            mortgages,
            discount_rate + spread,
            15,
            12,
        )?));
    }

    let pc = alloc.get(&AssetClass::PrivateCredit).copied().unwrap_or(0.0);
    if pc > 0.0 {
        for &(rating, weight) in PC_RATING_DIST {
            let spread = spreads.spread(rating, REINVEST_TENOR as f64)?;
            new_assets.push(AssetInstrument::PrivateCredit(
                PrivateCredit::new(pc * weight, REINVEST_TENOR, discount_rate, spread, 2)?
                    .with_rating(rating),
            ));
        }
    }

    Ok(new_assets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_mortality() -> MortalityTable {
        // Exponentially increasing qx from age 0, capped at 1
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
            n_policies: 50,
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
    fn test_saa_validation() {
        let bad_sum = BTreeMap::from([(AssetClass::GovtBonds, 0.5), (AssetClass::CorpBonds, 0.4)]);
        assert!(Saa::new(bad_sum).is_err());

        let over_cap = BTreeMap::from([
            (AssetClass::GovtBonds, 0.80),
            (AssetClass::PrivateCredit, 0.20),
        ]);
        assert!(Saa::new(over_cap).is_err());

        assert!(Saa::new(BTreeMap::from([
            (AssetClass::GovtBonds, 0.90),
            (AssetClass::PrivateCredit, 0.10),
        ]))
        .is_ok());
    }

    #[test]
    fn test_saa_allocation() {
        let saa = Saa::default_mix();
        let alloc = saa.allocation(1_000_000.0);
        assert!((alloc[&AssetClass::GovtBonds] - 400_000.0).abs() < 1e-6);
        assert!((alloc[&AssetClass::PrivateCredit] - 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_generate_policies_count_and_type() {
        let block = term_block();
        assert_eq!(block.policies().len(), 50);
        assert!(block
            .policies()
            .iter()
            .all(|p| matches!(p, LiabilityPolicy::Term(_))));
    }

    #[test]
    fn test_seed_reproducibility() {
        let a = term_block();
        let b = term_block();
        assert_eq!(a.premium(), b.premium());
        assert_eq!(
            a.policies()
                .iter()
                .map(|p| p.issue_age())
                .collect::<Vec<_>>(),
            b.policies()
                .iter()
                .map(|p| p.issue_age())
                .collect::<Vec<_>>()
        );
        assert_eq!(a.surplus(0.04).to_bits(), b.surplus(0.04).to_bits());
    }

    #[test]
    fn test_premium_below_face_for_term() {
        // Death benefits are survival-weighted, so the equivalence-principle
        // premium is far below total face
        let block = term_block();
        assert!(block.premium() > 0.0);
        assert!(block.premium() < block.config().total_liability_amount);
    }

    #[test]
    fn test_explicit_premium_drives_assets() {
        let config = BlockConfig {
            n_policies: 10,
            premium: Some(200_000.0),
            ..BlockConfig::new(
                LiabilityKind::WholeLife,
                Saa::default_mix(),
                1_000_000.0,
                (40, 50),
                0.04,
            )
        };
        let block =
            Block::generate(config, &synthetic_mortality(), &CreditSpreadCurve::builtin()).unwrap();
        let invested: f64 = block.assets().iter().map(|a| a.face_amount()).sum();
        assert!((invested - 200_000.0).abs() < 1.0);
    }

    #[test]
    fn test_higher_margin_means_higher_premium() {
        let base = BlockConfig {
            n_policies: 10,
            ..BlockConfig::new(
                LiabilityKind::WholeLife,
                Saa::default_mix(),
                1_000_000.0,
                (40, 50),
                0.04,
            )
        };
        let low = Block::generate(
            BlockConfig {
                profit_margin: 0.02,
                ..base.clone()
            },
            &synthetic_mortality(),
            &CreditSpreadCurve::builtin(),
        )
        .unwrap();
        let high = Block::generate(
            BlockConfig {
                profit_margin: 0.10,
                ..base
            },
            &synthetic_mortality(),
            &CreditSpreadCurve::builtin(),
        )
        .unwrap();
        assert!(high.premium() > low.premium());
    }

    #[test]
    fn test_fia_block_requires_index_returns() {
        let config = BlockConfig::new(
            LiabilityKind::Fia,
            Saa::default_mix(),
            1_000_000.0,
            (50, 60),
            0.04,
        );
        let result =
            Block::generate(config, &synthetic_mortality(), &CreditSpreadCurve::builtin());
        assert!(matches!(result, Err(AlmError::InvalidInput(_))));
    }

    #[test]
    fn test_fia_block_generates() {
        let config = BlockConfig {
            n_policies: 10,
            index_returns: vec![0.04; 15],
            ..BlockConfig::new(
                LiabilityKind::Fia,
                Saa::default_mix(),
                1_000_000.0,
                (50, 60),
                0.04,
            )
        };
        let block =
            Block::generate(config, &synthetic_mortality(), &CreditSpreadCurve::builtin()).unwrap();
        assert!(block
            .policies()
            .iter()
            .all(|p| matches!(p, LiabilityPolicy::Fia(_))));
        assert!(!block.liability_cash_flows().is_empty());
    }

    #[test]
    fn test_invalid_liability_amount() {
        let config = BlockConfig::new(
            LiabilityKind::Term,
            Saa::term_mix(),
            -5.0,
            (35, 55),
            0.04,
        );
        assert!(Block::generate(
            config,
            &synthetic_mortality(),
            &CreditSpreadCurve::builtin()
        )
        .is_err());
    }

    #[test]
    fn test_surplus_is_derived() {
        let block = term_block();
        let surplus = block.surplus(0.04);
        assert!(
            (surplus - (block.asset_present_value(0.04) - block.liability_present_value(0.04)))
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn test_asset_pv_decreasing_in_rate() {
        let block = term_block();
        assert!(block.asset_present_value(0.03) > block.asset_present_value(0.05));
    }

    #[test]
    fn test_asset_irr_near_portfolio_yield() {
        // Assets priced at coupon = discount + spread should earn a touch
        // above the block discount rate
        let block = term_block();
        let irr = block.asset_irr().unwrap();
        assert!(irr > block.discount_rate());
        assert!(irr < block.discount_rate() + 0.05);
    }

    #[test]
    fn test_reinvest_after_maturity() {
        let mut block = term_block();
        let before = block.assets().len();
        // The 3-year ladder rung has matured by year 4
        let new_assets = block
            .reinvest(4, &CreditSpreadCurve::builtin())
            .unwrap();
        assert!(!new_assets.is_empty());
        assert!(block.assets().len() <= before + new_assets.len());
        // Everything bought at the reinvestment tenor or longer
        assert!(new_assets
            .iter()
            .filter(|a| a.is_bullet())
            .all(|a| a.maturity() == REINVEST_TENOR));
    }

    #[test]
    fn test_reinvest_nothing_matured() {
        let mut block = term_block();
        let new_assets = block.reinvest(1, &CreditSpreadCurve::builtin()).unwrap();
        assert!(new_assets.is_empty());
    }

    #[test]
    fn test_dv01_gap_closes_with_hedge() {
        // Solve the block's gaps with two swaps and verify the plug-back
        use crate::instrument::InterestRateSwap;
        use crate::solver::{immunize, HedgeSensitivity};

        let block = term_block();
        let rate = block.discount_rate();
        let dv01_gap = block.dv01_gap(rate);
        let convexity_gap = block.dollar_convexity_gap(rate);

        let unit = |tenor: u32| {
            let swap = InterestRateSwap::new(1.0, rate, tenor, 2, false).unwrap();
            let floating = vec![rate; swap.n_periods() as usize];
            HedgeSensitivity {
                dv01: swap.dv01(&floating, rate).unwrap(),
                dollar_convexity: swap.dollar_convexity(&floating, rate).unwrap(),
            }
        };
        let unit_5y = unit(5);
        let unit_10y = unit(10);

        let solution = immunize(dv01_gap, convexity_gap, unit_5y, unit_10y).unwrap();
        let hedged_dv01 = solution.notional_1 * unit_5y.dv01 + solution.notional_2 * unit_10y.dv01;
        let hedged_convexity = solution.notional_1 * unit_5y.dollar_convexity
            + solution.notional_2 * unit_10y.dollar_convexity;
        assert!((hedged_dv01 - dv01_gap).abs() < dv01_gap.abs().max(1.0) * 1e-6);
        assert!(
            (hedged_convexity - convexity_gap).abs() < convexity_gap.abs().max(1.0) * 1e-6
        );
    }
}
