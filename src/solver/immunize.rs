//! Two-instrument immunization
//!
//! Solves for the notionals of two hedging instruments that close a DV01 gap
//! and a dollar-convexity gap simultaneously:
//!
//! ```text
//! n1 * dv01_1 + n2 * dv01_2 = dv01_gap
//! n1 * c1    + n2 * c2     = convexity_gap
//! ```
//!
//! Positive notionals mean receive-fixed positions; negative notionals mean
//! pay-fixed of the absolute amount.

use serde::{Deserialize, Serialize};

use crate::error::{AlmError, AlmResult};

/// Determinants below this magnitude are treated as singular
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Per-unit-notional rate sensitivities of a hedge instrument
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HedgeSensitivity {
    pub dv01: f64,
    pub dollar_convexity: f64,
}

/// Solved hedge notionals
///
/// Sign convention: positive = receive-fixed, negative = pay-fixed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HedgeNotionals {
    pub notional_1: f64,
    pub notional_2: f64,
}

/// Solve the 2x2 hedge system by Cramer's rule
///
/// Fails with `SingularMatrix` when the two instruments have linearly
/// dependent sensitivities — tenors too close together, or a floating-leg
/// sensitivity computed without the parallel-shift convention — because they
/// then cannot independently target both duration and convexity.
pub fn immunize(
    dv01_gap: f64,
    convexity_gap: f64,
    unit_1: HedgeSensitivity,
    unit_2: HedgeSensitivity,
) -> AlmResult<HedgeNotionals> {
    let det = unit_1.dv01 * unit_2.dollar_convexity - unit_2.dv01 * unit_1.dollar_convexity;
    if det.abs() < SINGULARITY_TOLERANCE {
        return Err(AlmError::SingularMatrix {
            det,
            dv01_1: unit_1.dv01,
            convexity_1: unit_1.dollar_convexity,
            dv01_2: unit_2.dv01,
            convexity_2: unit_2.dollar_convexity,
        });
    }

    Ok(HedgeNotionals {
        notional_1: (dv01_gap * unit_2.dollar_convexity - convexity_gap * unit_2.dv01) / det,
        notional_2: (unit_1.dv01 * convexity_gap - unit_1.dollar_convexity * dv01_gap) / det,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT_1: HedgeSensitivity = HedgeSensitivity {
        dv01: 4.0,
        dollar_convexity: 20.0,
    };
    const UNIT_2: HedgeSensitivity = HedgeSensitivity {
        dv01: 8.0,
        dollar_convexity: 90.0,
    };

    #[test]
    fn test_solves_both_gaps_exactly() {
        let solution = immunize(500.0, 80_000.0, UNIT_1, UNIT_2).unwrap();

        let dv01 = solution.notional_1 * UNIT_1.dv01 + solution.notional_2 * UNIT_2.dv01;
        let convexity = solution.notional_1 * UNIT_1.dollar_convexity
            + solution.notional_2 * UNIT_2.dollar_convexity;
        assert!((dv01 - 500.0).abs() < 1e-9);
        assert!((convexity - 80_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_known_solution() {
        // det = 4*90 - 8*20 = 200; n1 = (500*90 - 80000*8)/200 = -2975,
        // n2 = (4*80000 - 20*500)/200 = 1550
        let solution = immunize(500.0, 80_000.0, UNIT_1, UNIT_2).unwrap();
        assert!((solution.notional_1 + 2975.0).abs() < 1e-9);
        assert!((solution.notional_2 - 1550.0).abs() < 1e-9);

        // Pay-fixed the short leg, receive-fixed the long leg
        assert!(solution.notional_1 < 0.0);
        assert!(solution.notional_2 > 0.0);
    }

    #[test]
    fn test_zero_gaps_need_no_hedge() {
        let solution = immunize(0.0, 0.0, UNIT_1, UNIT_2).unwrap();
        assert_eq!(solution.notional_1, 0.0);
        assert_eq!(solution.notional_2, 0.0);
    }

    #[test]
    fn test_dependent_instruments_are_singular() {
        let doubled = HedgeSensitivity {
            dv01: UNIT_1.dv01 * 2.0,
            dollar_convexity: UNIT_1.dollar_convexity * 2.0,
        };
        let result = immunize(500.0, 80_000.0, UNIT_1, doubled);
        match result {
            Err(AlmError::SingularMatrix { det, .. }) => assert!(det.abs() < 1e-9),
            other => panic!("expected SingularMatrix, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_convexity_instruments_are_singular() {
        // The failure mode of bumping only the discount rate on an at-par
        // floating instrument: both sensitivities collapse
        let flat_1 = HedgeSensitivity {
            dv01: 0.0,
            dollar_convexity: 0.0,
        };
        let flat_2 = HedgeSensitivity {
            dv01: 0.0,
            dollar_convexity: 0.0,
        };
        assert!(matches!(
            immunize(500.0, 80_000.0, flat_1, flat_2),
            Err(AlmError::SingularMatrix { .. })
        ));
    }
}
