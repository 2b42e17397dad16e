//! ALM System CLI
//!
//! Builds one block per liability type, prints valuation and sensitivity
//! summaries, and solves the two-swap hedge that immunizes each block's
//! surplus.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use alm_system::block::{project, Block, BlockConfig, LiabilityKind, Saa};
use alm_system::instrument::{CashFlow, InterestRateSwap};
use alm_system::scenario::{simulate_index_returns, RateScenarioRow, ScenarioRunner};
use alm_system::sensitivity::key_rate_durations;
use alm_system::solver::{immunize, HedgeSensitivity};
use alm_system::Assumptions;

#[derive(Debug, Parser)]
#[command(name = "alm_system", about = "Insurance block ALM demonstration")]
struct Args {
    /// Flat annual discount rate; defaults to the 10-year treasury rate
    #[arg(long)]
    discount_rate: Option<f64>,

    /// Policies generated per block
    #[arg(long, default_value_t = 100)]
    policies: u32,

    /// Seed for policy generation and the FIA index path
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Projection horizon in years
    #[arg(long, default_value_t = 30)]
    horizon: u32,

    /// Directory with mortality.csv, credit_spreads.csv, and treasury.csv;
    /// embedded defaults are used when omitted
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Hedge swap tenors in years
    #[arg(long, default_value_t = 5)]
    hedge_tenor_1: u32,
    #[arg(long, default_value_t = 10)]
    hedge_tenor_2: u32,

    /// Write per-block rate-shock scenarios to this JSON file
    #[arg(long)]
    scenario_json: Option<PathBuf>,
}

/// Per-unit sensitivities of a receive-fixed par swap at the given tenor
fn unit_swap_sensitivity(tenor: u32, rate: f64) -> anyhow::Result<HedgeSensitivity> {
    let swap = InterestRateSwap::new(1.0, rate, tenor, 2, false)?;
    let floating = vec![rate; swap.n_periods() as usize];
    Ok(HedgeSensitivity {
        dv01: swap.dv01(&floating, rate)?,
        dollar_convexity: swap.dollar_convexity(&floating, rate)?,
    })
}

fn position_label(notional: f64) -> &'static str {
    if notional >= 0.0 {
        "receive-fixed"
    } else {
        "pay-fixed"
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("ALM System v0.1.0");
    println!("=================\n");

    let assumptions = match &args.assumptions {
        Some(path) => Assumptions::from_csv_path(path)
            .with_context(|| format!("loading assumptions from {}", path.display()))?,
        None => Assumptions::default_pricing(),
    };
    let discount_rate = args
        .discount_rate
        .unwrap_or_else(|| assumptions.treasury.rate(10.0));
    let index_returns = simulate_index_returns(args.seed, 20, 0.05, 0.10)?;

    println!("Discount rate: {:.2}%", discount_rate * 100.0);
    println!("Policies per block: {}", args.policies);
    println!("Seed: {}\n", args.seed);

    let block_specs = [
        (LiabilityKind::Spia, Saa::spia_mix(), 2_000_000_000.0, (65u8, 80u8)),
        (LiabilityKind::WholeLife, Saa::default_mix(), 1_000_000_000.0, (30, 50)),
        (LiabilityKind::Term, Saa::term_mix(), 5_000_000_000.0, (35, 55)),
        (LiabilityKind::Fia, Saa::default_mix(), 500_000_000.0, (50, 65)),
    ];

    let unit_1 = unit_swap_sensitivity(args.hedge_tenor_1, discount_rate)?;
    let unit_2 = unit_swap_sensitivity(args.hedge_tenor_2, discount_rate)?;
    let runner = ScenarioRunner::standard();
    let mut scenarios: std::collections::BTreeMap<String, Vec<RateScenarioRow>> =
        std::collections::BTreeMap::new();

    for (kind, saa, amount, age_range) in block_specs {
        let config = BlockConfig {
            n_policies: args.policies,
            seed: args.seed,
            index_returns: index_returns.clone(),
            ..BlockConfig::new(kind, saa, amount, age_range, discount_rate)
        };
        let block = Block::generate(config, &assumptions.mortality, &assumptions.spreads)
            .with_context(|| format!("generating {kind} block"))?;

        let asset_pv = block.asset_present_value(discount_rate);
        let liability_pv = block.liability_present_value(discount_rate);
        let dv01_gap = block.dv01_gap(discount_rate);
        let convexity_gap = block.dollar_convexity_gap(discount_rate);

        println!("-- {} Block {}", kind, "-".repeat(48 - kind.to_string().len()));
        println!("  Policies:            {:>10}", block.policies().len());
        println!("  Assets:              {:>10}", block.assets().len());
        println!("  Premium:            ${:>18.0}", block.premium());
        println!("  PV assets:          ${:>18.0}", asset_pv);
        println!("  PV liabilities:     ${:>18.0}", liability_pv);
        println!("  Surplus (A - L):    ${:>18.0}", block.surplus(discount_rate));
        println!("  Asset IRR:           {:>10.2}%", block.asset_irr()? * 100.0);
        println!("  DV01 gap:           ${:>18.2}", dv01_gap);
        println!("  C$ gap:             ${:>18.0}", convexity_gap);

        match immunize(dv01_gap, convexity_gap, unit_1, unit_2) {
            Ok(solution) => {
                println!(
                    "  Hedge: {:.0} notional {} {}y, {:.0} notional {} {}y",
                    solution.notional_1.abs(),
                    position_label(solution.notional_1),
                    args.hedge_tenor_1,
                    solution.notional_2.abs(),
                    position_label(solution.notional_2),
                    args.hedge_tenor_2,
                );
            }
            Err(err) => println!("  Hedge: not solvable ({err})"),
        }

        let projection = project(&block, args.horizon, &assumptions.spreads)?;
        let summary = projection.summary();
        println!(
            "  Projection ({}y): asset CF ${:.0}, liability CF ${:.0}, reinvested ${:.0}",
            summary.horizon,
            summary.total_asset_cashflow,
            summary.total_liability_cashflow,
            summary.total_reinvested,
        );

        // Key-rate profile of the aggregated asset flows against the
        // treasury grid
        let asset_flows: Vec<CashFlow> = block
            .asset_cash_flows()
            .into_iter()
            .map(|(year, amount)| CashFlow::new(year as f64, amount))
            .collect();
        let krds = key_rate_durations(&asset_flows, &assumptions.treasury, 0.0001)?;
        let profile: Vec<String> = krds
            .durations
            .iter()
            .map(|krd| format!("{}y: {:.2}", krd.tenor, krd.duration))
            .collect();
        println!("  Asset KRD: {}  (sum {:.2}, effective {:.2})", profile.join("  "),
            krds.total(), krds.effective_duration);

        scenarios.insert(kind.to_string(), runner.run(&block));
        println!();
    }

    if let Some(path) = &args.scenario_json {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &scenarios)?;
        println!("Rate-shock scenarios written to {}", path.display());
    }

    Ok(())
}
