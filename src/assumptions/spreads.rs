//! Credit spread grid by rating and tenor
//!
//! Spreads are stored in whole basis points on a fixed tenor grid. Lookups
//! interpolate linearly between tenors and extrapolate flat beyond both ends
//! of the grid. The grid can be refreshed from four market anchor points
//! (10-year spreads for AAA, A, BBB, and BB); AA and B are re-derived from
//! their neighbours so the refreshed grid keeps the original shape.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AlmError, AlmResult};

/// Credit rating buckets, best to worst
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[allow(clippy::upper_case_acronyms)]
pub enum Rating {
    AAA,
    AA,
    A,
    BBB,
    BB,
    B,
}

impl Rating {
    /// All ratings in credit-quality order
    pub const ALL: [Rating; 6] = [
        Rating::AAA,
        Rating::AA,
        Rating::A,
        Rating::BBB,
        Rating::BB,
        Rating::B,
    ];
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rating::AAA => "AAA",
            Rating::AA => "AA",
            Rating::A => "A",
            Rating::BBB => "BBB",
            Rating::BB => "BB",
            Rating::B => "B",
        };
        f.pad(s)
    }
}

impl FromStr for Rating {
    type Err = AlmError;

    fn from_str(s: &str) -> AlmResult<Self> {
        match s.trim() {
            "AAA" => Ok(Rating::AAA),
            "AA" => Ok(Rating::AA),
            "A" => Ok(Rating::A),
            "BBB" => Ok(Rating::BBB),
            "BB" => Ok(Rating::BB),
            "B" => Ok(Rating::B),
            other => Err(AlmError::OutOfRange {
                what: "credit rating".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Market anchor spreads (basis points) used to refresh the grid
///
/// The four anchors correspond to observable 10-year index spreads:
/// AAA corporate, investment-grade (mapped to A), BAA (mapped to BBB),
/// and high-yield (mapped to BB).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpreadAnchors {
    pub aaa_10y_bps: f64,
    pub a_10y_bps: f64,
    pub bbb_10y_bps: f64,
    pub bb_10y_bps: f64,
}

/// Credit spreads by rating over a shared tenor grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditSpreadCurve {
    /// Tenor grid in years, strictly increasing
    tenors: Vec<f64>,
    /// Spread rows in basis points, one row per rating present
    rows: BTreeMap<Rating, Vec<f64>>,
}

impl CreditSpreadCurve {
    /// Build a curve from a tenor grid and per-rating rows of basis points
    pub fn new(tenors: Vec<f64>, rows: BTreeMap<Rating, Vec<f64>>) -> AlmResult<Self> {
        if tenors.is_empty() {
            return Err(AlmError::InvalidInput(
                "credit spread curve needs at least one tenor".to_string(),
            ));
        }
        if !tenors.windows(2).all(|w| w[0] < w[1]) {
            return Err(AlmError::InvalidInput(
                "credit spread tenors must be strictly increasing".to_string(),
            ));
        }
        for (rating, row) in &rows {
            if row.len() != tenors.len() {
                return Err(AlmError::InvalidInput(format!(
                    "spread row for {rating} has {} entries, expected {}",
                    row.len(),
                    tenors.len()
                )));
            }
            if row.iter().any(|s| !s.is_finite() || *s < 0.0) {
                return Err(AlmError::InvalidInput(format!(
                    "spread row for {rating} contains a negative or non-finite value"
                )));
            }
        }
        let curve = Self { tenors, rows };
        curve.warn_if_not_monotonic();
        Ok(curve)
    }

    /// Built-in long-run average spread grid
    pub fn builtin() -> Self {
        let tenors = vec![1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 20.0, 30.0];
        let mut rows = BTreeMap::new();
        rows.insert(Rating::AAA, vec![15.0, 20.0, 25.0, 30.0, 35.0, 45.0, 55.0, 60.0]);
        rows.insert(Rating::AA, vec![25.0, 30.0, 38.0, 48.0, 55.0, 65.0, 80.0, 90.0]);
        rows.insert(Rating::A, vec![40.0, 50.0, 60.0, 85.0, 100.0, 120.0, 140.0, 155.0]);
        rows.insert(Rating::BBB, vec![70.0, 85.0, 100.0, 119.0, 143.0, 170.0, 200.0, 220.0]);
        rows.insert(Rating::BB, vec![150.0, 180.0, 220.0, 280.0, 330.0, 420.0, 500.0, 550.0]);
        rows.insert(Rating::B, vec![250.0, 300.0, 360.0, 450.0, 520.0, 650.0, 760.0, 830.0]);
        Self { tenors, rows }
    }

    /// Tenor grid in years
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// Ratings present in the grid
    pub fn ratings(&self) -> impl Iterator<Item = Rating> + '_ {
        self.rows.keys().copied()
    }

    /// Spread in basis points for a rating at a tenor
    ///
    /// Linear interpolation between grid tenors; flat extrapolation beyond
    /// the shortest and longest tenor. A rating with no row is an error —
    /// there is no sensible cross-rating interpolation for lookups.
    pub fn spread_bps(&self, rating: Rating, tenor: f64) -> AlmResult<f64> {
        let row = self.rows.get(&rating).ok_or_else(|| AlmError::OutOfRange {
            what: "credit spread rating".to_string(),
            value: rating.to_string(),
        })?;

        let first = self.tenors[0];
        let last = self.tenors[self.tenors.len() - 1];
        if tenor <= first {
            return Ok(row[0]);
        }
        if tenor >= last {
            return Ok(row[row.len() - 1]);
        }
        // Find the bracketing grid points
        let hi = self.tenors.partition_point(|t| *t < tenor);
        let lo = hi - 1;
        if (self.tenors[hi] - tenor).abs() < 1e-12 {
            return Ok(row[hi]);
        }
        let w = (tenor - self.tenors[lo]) / (self.tenors[hi] - self.tenors[lo]);
        Ok(row[lo] + w * (row[hi] - row[lo]))
    }

    /// Spread as a decimal rate (30 bps -> 0.0030)
    pub fn spread(&self, rating: Rating, tenor: f64) -> AlmResult<f64> {
        Ok(self.spread_bps(rating, tenor)? / 10_000.0)
    }

    /// Refresh the grid from 10-year market anchors
    ///
    /// AAA, A, BBB, and BB rows are scaled by the ratio of the new anchor to
    /// the current 10-year value. AA is re-derived per tenor, keeping its
    /// relative position between AAA and A; B is re-derived per tenor,
    /// keeping its ratio to BB. All values round to whole basis points.
    pub fn refreshed(&self, anchors: &SpreadAnchors) -> AlmResult<CreditSpreadCurve> {
        let anchored = [
            (Rating::AAA, anchors.aaa_10y_bps),
            (Rating::A, anchors.a_10y_bps),
            (Rating::BBB, anchors.bbb_10y_bps),
            (Rating::BB, anchors.bb_10y_bps),
        ];

        let mut rows = BTreeMap::new();
        for (rating, anchor) in anchored {
            if anchor <= 0.0 || !anchor.is_finite() {
                return Err(AlmError::InvalidInput(format!(
                    "anchor spread for {rating} must be positive, got {anchor}"
                )));
            }
            let current_10y = self.spread_bps(rating, 10.0)?;
            if current_10y <= 0.0 {
                return Err(AlmError::InvalidInput(format!(
                    "cannot rescale {rating}: current 10y spread is {current_10y}"
                )));
            }
            let factor = anchor / current_10y;
            let row = self.row(rating)?;
            rows.insert(
                rating,
                row.iter().map(|s| (s * factor).round()).collect::<Vec<_>>(),
            );
        }

        // AA keeps its per-tenor position between AAA and A
        let aa_old = self.row(Rating::AA)?;
        let aaa_old = self.row(Rating::AAA)?;
        let a_old = self.row(Rating::A)?;
        let aaa_new = rows[&Rating::AAA].clone();
        let a_new = rows[&Rating::A].clone();
        let aa_new: Vec<f64> = (0..self.tenors.len())
            .map(|i| {
                let gap = a_old[i] - aaa_old[i];
                let frac = if gap.abs() < 1e-9 {
                    0.5
                } else {
                    (aa_old[i] - aaa_old[i]) / gap
                };
                (aaa_new[i] + frac * (a_new[i] - aaa_new[i])).round()
            })
            .collect();
        rows.insert(Rating::AA, aa_new);

        // B keeps its per-tenor ratio to BB
        let b_old = self.row(Rating::B)?;
        let bb_old = self.row(Rating::BB)?;
        let bb_new = rows[&Rating::BB].clone();
        let b_new: Vec<f64> = (0..self.tenors.len())
            .map(|i| (bb_new[i] * b_old[i] / bb_old[i]).round())
            .collect();
        rows.insert(Rating::B, b_new);

        let refreshed = CreditSpreadCurve {
            tenors: self.tenors.clone(),
            rows,
        };
        refreshed.warn_if_not_monotonic();
        Ok(refreshed)
    }

    fn row(&self, rating: Rating) -> AlmResult<&[f64]> {
        self.rows
            .get(&rating)
            .map(|r| r.as_slice())
            .ok_or_else(|| AlmError::OutOfRange {
                what: "credit spread rating".to_string(),
                value: rating.to_string(),
            })
    }

    /// Spreads should widen as credit quality falls at every tenor
    fn warn_if_not_monotonic(&self) {
        for (i, tenor) in self.tenors.iter().enumerate() {
            let mut prev: Option<(Rating, f64)> = None;
            for rating in Rating::ALL {
                let Some(row) = self.rows.get(&rating) else {
                    continue;
                };
                if let Some((prev_rating, prev_spread)) = prev {
                    if row[i] < prev_spread {
                        log::warn!(
                            "spread inversion at tenor {tenor}: {rating} ({}) below {prev_rating} ({prev_spread})",
                            row[i]
                        );
                    }
                }
                prev = Some((rating, row[i]));
            }
        }
    }
}

impl Default for CreditSpreadCurve {
    fn default() -> Self {
        Self::builtin()
    }
}
