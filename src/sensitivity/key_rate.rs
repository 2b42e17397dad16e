//! Key-rate durations
//!
//! Sensitivity to a rate move localized at one curve tenor. Each grid node
//! is bumped in isolation; the bump spreads onto nearby cash-flow dates
//! through the curve's own linear interpolation, so the per-node bumps
//! partition a parallel shift and the key-rate durations sum to the
//! effective duration.

use serde::{Deserialize, Serialize};

use super::ONE_BASIS_POINT;
use crate::assumptions::RateCurve;
use crate::error::{AlmError, AlmResult};
use crate::instrument::{validate_schedule, CashFlow};

/// Relative tolerance for the sum-vs-effective-duration check
const KRD_SUM_TOLERANCE: f64 = 1e-3;

/// Duration contribution of a single curve tenor
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KeyRateDuration {
    /// The tenor point in years
    pub tenor: f64,
    /// Duration at this tenor, in years
    pub duration: f64,
}

/// Key-rate durations across the full curve grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRateDurations {
    /// Per-tenor durations, in grid order
    pub durations: Vec<KeyRateDuration>,
    /// Effective duration under a parallel shift of the same curve
    pub effective_duration: f64,
}

impl KeyRateDurations {
    /// Sum of the per-tenor durations
    pub fn total(&self) -> f64 {
        self.durations.iter().map(|krd| krd.duration).sum()
    }

    /// Duration at a specific tenor, if that tenor is on the grid
    pub fn at_tenor(&self, tenor: f64) -> Option<&KeyRateDuration> {
        self.durations
            .iter()
            .find(|krd| (krd.tenor - tenor).abs() < 1e-9)
    }
}

/// Present value of a schedule discounted on a zero curve
///
/// Each cash flow discounts at the interpolated rate for its own date,
/// compounded annually.
pub fn curve_present_value(flows: &[CashFlow], curve: &RateCurve) -> f64 {
    flows
        .iter()
        .map(|cf| cf.amount / (1.0 + curve.rate(cf.time)).powf(cf.time))
        .sum()
}

/// Key-rate durations of a schedule against a rate curve
///
/// For each grid node: bump that node by `bump`, holding the others fixed,
/// and report `-(dP/P)/dy` from the central difference. The sum across all
/// nodes is checked against the parallel-shift effective duration; a
/// deviation beyond tolerance is logged and left visible on the result.
pub fn key_rate_durations(
    flows: &[CashFlow],
    curve: &RateCurve,
    bump: f64,
) -> AlmResult<KeyRateDurations> {
    if flows.is_empty() {
        return Err(AlmError::InvalidInput(
            "key-rate durations need a non-empty cash-flow schedule".to_string(),
        ));
    }
    validate_schedule(flows)?;
    if bump <= 0.0 || !bump.is_finite() {
        return Err(AlmError::InvalidInput(format!(
            "key-rate bump must be positive, got {bump}"
        )));
    }

    let base = curve_present_value(flows, curve);
    if base.abs() < 1e-10 {
        return Err(AlmError::InvalidInput(format!(
            "base present value {base:.3e} is too close to zero for key-rate durations"
        )));
    }

    let mut durations = Vec::with_capacity(curve.len());
    for (index, tenor) in curve.tenors().into_iter().enumerate() {
        let up = curve_present_value(flows, &curve.with_node_bumped(index, bump)?);
        let down = curve_present_value(flows, &curve.with_node_bumped(index, -bump)?);
        durations.push(KeyRateDuration {
            tenor,
            duration: (down - up) / (2.0 * base * bump),
        });
    }

    let pv_up = curve_present_value(flows, &curve.parallel_bumped(bump));
    let pv_down = curve_present_value(flows, &curve.parallel_bumped(-bump));
    let effective_duration = (pv_down - pv_up) / (2.0 * base * bump);

    let result = KeyRateDurations {
        durations,
        effective_duration,
    };
    let total = result.total();
    if effective_duration.abs() > 1e-12
        && ((total - effective_duration) / effective_duration).abs() > KRD_SUM_TOLERANCE
    {
        log::warn!(
            "key-rate durations sum to {total:.6} but effective duration is {effective_duration:.6}"
        );
    }
    Ok(result)
}

/// Key-rate durations with the standard one-basis-point bump
pub fn key_rate_durations_1bp(
    flows: &[CashFlow],
    curve: &RateCurve,
) -> AlmResult<KeyRateDurations> {
    key_rate_durations(flows, curve, ONE_BASIS_POINT)
}
