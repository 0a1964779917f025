use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const REGISTER_OPEN: &str = "open";
pub const REGISTER_CLOSED: &str = "closed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    In,
    Out,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
        }
    }

    fn signed(&self, amount: i64) -> i64 {
        match self {
            MovementKind::In => amount,
            MovementKind::Out => -amount,
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementKind::In),
            "out" => Ok(MovementKind::Out),
            other => Err(format!("Invalid movement type {other}")),
        }
    }
}

/// Opening balance plus ins minus outs.
pub fn expected_balance(opening: i64, movements: impl IntoIterator<Item = (MovementKind, i64)>) -> i64 {
    movements
        .into_iter()
        .fold(opening, |acc, (kind, amount)| acc + kind.signed(amount))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Reconciliation {
    pub expected: i64,
    pub counted: i64,
    /// Counted minus expected; negative means cash is missing.
    pub difference: i64,
}

impl Reconciliation {
    pub fn new(expected: i64, counted: i64) -> Self {
        Self {
            expected,
            counted,
            difference: counted - expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_balance_nets_movements() {
        let movements = [
            (MovementKind::In, 5_000),
            (MovementKind::Out, 1_200),
            (MovementKind::In, 300),
        ];
        assert_eq!(expected_balance(10_000, movements), 14_100);
    }

    #[test]
    fn no_movements_keeps_opening() {
        assert_eq!(expected_balance(2_500, []), 2_500);
    }

    #[test]
    fn reconciliation_reports_shortfall_and_surplus() {
        assert_eq!(Reconciliation::new(14_100, 14_000).difference, -100);
        assert_eq!(Reconciliation::new(14_100, 14_150).difference, 50);
        assert_eq!(Reconciliation::new(14_100, 14_100).difference, 0);
    }

    #[test]
    fn movement_kind_parses() {
        assert_eq!("out".parse::<MovementKind>(), Ok(MovementKind::Out));
        assert!("sangria".parse::<MovementKind>().is_err());
    }
}
