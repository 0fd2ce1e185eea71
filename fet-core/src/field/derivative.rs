//! Nodal value labels shared by every field store

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nodal value labels: the value itself and its parametric cross derivatives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DerivativeKind {
    Value,
    DDs1,
    DDs2,
    D2Ds1Ds2,
    DDs3,
    D2Ds1Ds3,
    D2Ds2Ds3,
    D3Ds1Ds2Ds3,
}

impl DerivativeKind {
    pub const COUNT: usize = 8;

    /// All kinds in storage order
    pub const ALL: [DerivativeKind; Self::COUNT] = [
        DerivativeKind::Value,
        DerivativeKind::DDs1,
        DerivativeKind::DDs2,
        DerivativeKind::D2Ds1Ds2,
        DerivativeKind::DDs3,
        DerivativeKind::D2Ds1Ds3,
        DerivativeKind::D2Ds2Ds3,
        DerivativeKind::D3Ds1Ds2Ds3,
    ];

    /// Position in [`DerivativeKind::ALL`]
    pub fn index(self) -> usize {
        match self {
            DerivativeKind::Value => 0,
            DerivativeKind::DDs1 => 1,
            DerivativeKind::DDs2 => 2,
            DerivativeKind::D2Ds1Ds2 => 3,
            DerivativeKind::DDs3 => 4,
            DerivativeKind::D2Ds1Ds3 => 5,
            DerivativeKind::D2Ds2Ds3 => 6,
            DerivativeKind::D3Ds1Ds2Ds3 => 7,
        }
    }

    /// Total derivative order (0 for the value)
    pub fn order(self) -> u8 {
        match self {
            DerivativeKind::Value => 0,
            DerivativeKind::DDs1 | DerivativeKind::DDs2 | DerivativeKind::DDs3 => 1,
            DerivativeKind::D2Ds1Ds2 | DerivativeKind::D2Ds1Ds3 | DerivativeKind::D2Ds2Ds3 => 2,
            DerivativeKind::D3Ds1Ds2Ds3 => 3,
        }
    }

    pub fn is_value(self) -> bool {
        self == DerivativeKind::Value
    }

    pub fn label(self) -> &'static str {
        match self {
            DerivativeKind::Value => "value",
            DerivativeKind::DDs1 => "d/ds1",
            DerivativeKind::DDs2 => "d/ds2",
            DerivativeKind::D2Ds1Ds2 => "d2/ds1ds2",
            DerivativeKind::DDs3 => "d/ds3",
            DerivativeKind::D2Ds1Ds3 => "d2/ds1ds3",
            DerivativeKind::D2Ds2Ds3 => "d2/ds2ds3",
            DerivativeKind::D3Ds1Ds2Ds3 => "d3/ds1ds2ds3",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in DerivativeKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_only_value_is_zero_order() {
        let zero_order: Vec<_> = DerivativeKind::ALL
            .iter()
            .filter(|k| k.order() == 0)
            .collect();
        assert_eq!(zero_order, vec![&DerivativeKind::Value]);
        assert!(DerivativeKind::Value.is_value());
        assert!(!DerivativeKind::DDs1.is_value());
    }

    #[test]
    fn test_orders() {
        assert_eq!(DerivativeKind::DDs3.order(), 1);
        assert_eq!(DerivativeKind::D2Ds2Ds3.order(), 2);
        assert_eq!(DerivativeKind::D3Ds1Ds2Ds3.order(), 3);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DerivativeKind::D2Ds1Ds2.label(), "d2/ds1ds2");
        assert_eq!(DerivativeKind::Value.label(), "value");
    }
}
