//! Rounding policies applied to converted amounts.
//!
//! The half-down and half-even policies keep the formulas the product has
//! always used, which differ from their textbook definitions:
//!
//! - `roundHalfDown` is `floor(scaled + 0.5)`, i.e. ties go up for positive
//!   amounts.
//! - `roundHalfEven` rounds with `round(scaled)` when `floor(scaled)` is even
//!   and with `floor(scaled + 0.5)` otherwise.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FxError;

/// Named rounding policy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundingPolicy {
    /// Ties rounded away from zero.
    RoundHalfUp,
    /// `floor(scaled + 0.5)`.
    RoundHalfDown,
    /// Parity-switched rounding, see module docs.
    #[default]
    RoundHalfEven,
    /// Ceiling.
    RoundUp,
    /// Floor.
    RoundDown,
    /// Toward zero.
    Truncate,
}

impl RoundingPolicy {
    pub const ALL: [RoundingPolicy; 6] = [
        RoundingPolicy::RoundHalfUp,
        RoundingPolicy::RoundHalfDown,
        RoundingPolicy::RoundHalfEven,
        RoundingPolicy::RoundUp,
        RoundingPolicy::RoundDown,
        RoundingPolicy::Truncate,
    ];

    /// The wire name of the policy.
    pub fn name(&self) -> &'static str {
        match self {
            RoundingPolicy::RoundHalfUp => "roundHalfUp",
            RoundingPolicy::RoundHalfDown => "roundHalfDown",
            RoundingPolicy::RoundHalfEven => "roundHalfEven",
            RoundingPolicy::RoundUp => "roundUp",
            RoundingPolicy::RoundDown => "roundDown",
            RoundingPolicy::Truncate => "truncate",
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoundingPolicy {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.name() == s)
            .ok_or_else(|| FxError::InvalidPolicy(s.to_string()))
    }
}

/// Apply `policy` to `amount` at `decimals` places of precision.
pub fn round(amount: f64, decimals: i32, policy: RoundingPolicy) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = amount * factor;

    let rounded = match policy {
        RoundingPolicy::RoundHalfUp => scaled.round(),
        RoundingPolicy::RoundHalfDown => (scaled + 0.5).floor(),
        RoundingPolicy::RoundHalfEven => {
            if scaled.floor() % 2.0 == 0.0 {
                scaled.round()
            } else {
                (scaled + 0.5).floor()
            }
        }
        RoundingPolicy::RoundUp => scaled.ceil(),
        RoundingPolicy::RoundDown => scaled.floor(),
        RoundingPolicy::Truncate => scaled.trunc(),
    };

    rounded / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_directed_policies() {
        assert_eq!(round(2.5, 0, RoundingPolicy::RoundUp), 3.0);
        assert_eq!(round(2.5, 0, RoundingPolicy::RoundDown), 2.0);
        assert_eq!(round(2.4, 0, RoundingPolicy::Truncate), 2.0);
        assert_eq!(round(-2.5, 0, RoundingPolicy::Truncate), -2.0);
        assert_eq!(round(-2.5, 0, RoundingPolicy::RoundDown), -3.0);
        assert_eq!(round(-2.5, 0, RoundingPolicy::RoundUp), -2.0);
    }

    #[test]
    fn test_half_up_is_away_from_zero() {
        assert_eq!(round(2.5, 0, RoundingPolicy::RoundHalfUp), 3.0);
        assert_eq!(round(-2.5, 0, RoundingPolicy::RoundHalfUp), -3.0);
        assert_eq!(round(2.4, 0, RoundingPolicy::RoundHalfUp), 2.0);
    }

    #[test]
    fn test_half_down_keeps_floor_formula() {
        // Ties go up for positive amounts and toward +inf for negative ones.
        assert_eq!(round(2.5, 0, RoundingPolicy::RoundHalfDown), 3.0);
        assert_eq!(round(-2.5, 0, RoundingPolicy::RoundHalfDown), -2.0);
        assert_eq!(round(2.4, 0, RoundingPolicy::RoundHalfDown), 2.0);
    }

    #[test]
    fn test_half_even_keeps_parity_formula() {
        // floor(2.5) = 2 is even, round(2.5) = 3: not banker's rounding.
        assert_eq!(round(2.5, 0, RoundingPolicy::RoundHalfEven), 3.0);
        // floor(3.5) = 3 is odd, floor(4.0) = 4.
        assert_eq!(round(3.5, 0, RoundingPolicy::RoundHalfEven), 4.0);
        // floor(-2.5) = -3 is odd, floor(-2.0) = -2.
        assert_eq!(round(-2.5, 0, RoundingPolicy::RoundHalfEven), -2.0);
        assert_eq!(round(8999.999999, 0, RoundingPolicy::RoundHalfEven), 9000.0);
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(round(1.2345, 2, RoundingPolicy::RoundDown), 1.23);
        assert_eq!(round(1.2345, 2, RoundingPolicy::RoundUp), 1.24);
        assert_eq!(round(0.90049, 3, RoundingPolicy::RoundHalfUp), 0.9);
    }

    #[test]
    fn test_parse_policy_names() {
        for policy in RoundingPolicy::ALL {
            assert_eq!(policy.name().parse::<RoundingPolicy>().unwrap(), policy);
            assert_eq!(policy.to_string(), policy.name());
        }
        assert_eq!(RoundingPolicy::default(), RoundingPolicy::RoundHalfEven);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let err = "bankers".parse::<RoundingPolicy>().unwrap_err();
        assert!(matches!(err, FxError::InvalidPolicy(ref name) if name == "bankers"));
        assert!("ROUNDUP".parse::<RoundingPolicy>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&RoundingPolicy::RoundHalfEven).unwrap();
        assert_eq!(json, "\"roundHalfEven\"");
    }

    proptest! {
        #[test]
        fn prop_whole_unit_rounding_is_idempotent(x in -1.0e9f64..1.0e9f64) {
            for policy in RoundingPolicy::ALL {
                let once = round(x, 0, policy);
                prop_assert_eq!(round(once, 0, policy), once);
            }
        }

        #[test]
        fn prop_directed_policies_bracket_value(x in -1.0e6f64..1.0e6f64) {
            prop_assert!(round(x, 0, RoundingPolicy::RoundDown) <= x);
            prop_assert!(round(x, 0, RoundingPolicy::RoundUp) >= x);
            prop_assert!(round(x, 0, RoundingPolicy::Truncate).abs() <= x.abs());
        }
    }
}
