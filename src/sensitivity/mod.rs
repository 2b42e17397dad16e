//! Rate-sensitivity engine
//!
//! Closed-form duration and convexity over a cash-flow schedule, plus
//! finite-difference DV01 and dollar convexity over an arbitrary
//! present-value function. The finite-difference entry points take the PV
//! function as a stateless closure so they can re-evaluate it at bumped
//! rates without knowing anything about the instrument behind it.

mod key_rate;

pub use key_rate::{
    curve_present_value, key_rate_durations, key_rate_durations_1bp, KeyRateDuration,
    KeyRateDurations,
};

use crate::instrument::CashFlow;

/// One basis point as a decimal rate
pub const ONE_BASIS_POINT: f64 = 0.0001;

/// Present value of a schedule at a flat annual rate
///
/// The rate compounds at the schedule's payment frequency:
/// `PV = sum CF_t / (1 + y/f)^(t*f)`.
pub fn present_value(flows: &[CashFlow], rate: f64, frequency: u32) -> f64 {
    let f = frequency as f64;
    let per_period = 1.0 + rate / f;
    flows
        .iter()
        .map(|cf| cf.amount / per_period.powf(cf.time * f))
        .sum()
}

/// Macaulay duration in years: the PV-weighted average cash-flow time
pub fn macaulay_duration(flows: &[CashFlow], rate: f64, frequency: u32) -> f64 {
    let f = frequency as f64;
    let per_period = 1.0 + rate / f;
    let pv = present_value(flows, rate, frequency);
    let weighted: f64 = flows
        .iter()
        .map(|cf| cf.time * cf.amount / per_period.powf(cf.time * f))
        .sum();
    weighted / pv
}

/// Modified duration: Macaulay scaled by the per-period gross rate
pub fn modified_duration(flows: &[CashFlow], rate: f64, frequency: u32) -> f64 {
    macaulay_duration(flows, rate, frequency) / (1.0 + rate / frequency as f64)
}

/// Convexity in years squared
///
/// `C = (1/(P*f^2)) * sum k(k+1) CF_k / (1 + y/f)^(k+2)` over the period
/// index `k = t*f`. Positive for any option-free schedule of receipts.
pub fn convexity(flows: &[CashFlow], rate: f64, frequency: u32) -> f64 {
    let f = frequency as f64;
    let per_period = 1.0 + rate / f;
    let pv = present_value(flows, rate, frequency);
    let weighted: f64 = flows
        .iter()
        .map(|cf| {
            let k = cf.time * f;
            k * (k + 1.0) * cf.amount / per_period.powf(k + 2.0)
        })
        .sum();
    weighted / (pv * f * f)
}

/// Dollar value of a one-basis-point parallel rate shift
///
/// Central difference on an arbitrary present-value function. Positive means
/// the position gains value when rates fall by one basis point.
pub fn dv01<F>(pv_fn: F, rate: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    dv01_with_bump(pv_fn, rate, ONE_BASIS_POINT)
}

/// DV01 with an explicit bump size
pub fn dv01_with_bump<F>(pv_fn: F, rate: f64, bump: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    (pv_fn(rate - bump) - pv_fn(rate + bump)) / 2.0
}

/// Dollar convexity: the second-order price sensitivity in dollars
///
/// Central second difference, `(PV(y+h) + PV(y-h) - 2 PV(y)) / h^2`.
pub fn dollar_convexity<F>(pv_fn: F, rate: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    dollar_convexity_with_bump(pv_fn, rate, ONE_BASIS_POINT)
}

/// Dollar convexity with an explicit bump size
pub fn dollar_convexity_with_bump<F>(pv_fn: F, rate: f64, bump: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    (pv_fn(rate + bump) + pv_fn(rate - bump) - 2.0 * pv_fn(rate)) / (bump * bump)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 5-year 4% semiannual coupon bond, $100 par
    fn par_bond_flows() -> Vec<CashFlow> {
        let mut flows: Vec<CashFlow> = (1..=10)
            .map(|k| CashFlow::new(k as f64 / 2.0, 2.0))
            .collect();
        flows.last_mut().unwrap().amount += 100.0;
        flows
    }

    #[test]
    fn test_par_bond_prices_at_par() {
        let pv = present_value(&par_bond_flows(), 0.04, 2);
        assert_relative_eq!(pv, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_par_bond_duration() {
        let flows = par_bond_flows();
        let mac = macaulay_duration(&flows, 0.04, 2);
        let modified = modified_duration(&flows, 0.04, 2);

        assert!((mac - 4.5811).abs() < 5e-3);
        assert!((modified - mac / 1.02).abs() < 1e-12);
        assert!(mac > 0.0 && mac < 5.0);
    }

    #[test]
    fn test_par_bond_convexity_positive() {
        let conv = convexity(&par_bond_flows(), 0.04, 2);
        assert!(conv > 0.0);
    }

    #[test]
    fn test_zero_coupon_duration_equals_maturity() {
        let flows = vec![CashFlow::new(7.0, 100.0)];
        let mac = macaulay_duration(&flows, 0.05, 2);
        assert!((mac - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_pv_decreasing_in_rate() {
        let flows = par_bond_flows();
        let mut prev = f64::MAX;
        for rate in [0.01, 0.02, 0.04, 0.06, 0.08] {
            let pv = present_value(&flows, rate, 2);
            assert!(pv < prev);
            prev = pv;
        }
    }

    #[test]
    fn test_dv01_from_quoted_prices() {
        // Portfolio quoted at $100,044,500 one bp down and $99,955,500 one bp up
        let pv_fn = |rate: f64| {
            let slope = (99_955_500.0_f64 - 100_044_500.0) / 0.0002;
            100_000_000.0 + slope * (rate - 0.04)
        };
        let result = dv01(pv_fn, 0.04);
        assert_relative_eq!(result, 44_500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_dv01_matches_modified_duration() {
        // For a plain schedule, DV01 ~= modified duration * PV * 1bp
        let flows = par_bond_flows();
        let pv = present_value(&flows, 0.04, 2);
        let modified = modified_duration(&flows, 0.04, 2);

        let result = dv01(|r| present_value(&flows, r, 2), 0.04);
        assert!((result - modified * pv * ONE_BASIS_POINT).abs() < 1e-4);
    }

    #[test]
    fn test_dollar_convexity_of_quadratic() {
        // PV(y) = a + b(y - y0)^2 has exact second derivative 2b
        let pv_fn = |rate: f64| 100.0 + 3.0e6 * (rate - 0.04) * (rate - 0.04);
        let result = dollar_convexity(pv_fn, 0.04);
        assert!((result - 6.0e6).abs() < 1e-3);
    }

    #[test]
    fn test_dollar_convexity_positive_for_bond() {
        let flows = par_bond_flows();
        let result = dollar_convexity(|r| present_value(&flows, r, 2), 0.04);
        assert!(result > 0.0);
    }
}
