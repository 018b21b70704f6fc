//! Value brackets (scaglioni).
//!
//! Upper bounds are inclusive: a value equal to a boundary belongs to the
//! lower bracket. The seventh bracket is everything strictly above the last
//! boundary.

use rust_decimal::Decimal;

use crate::domain::{AssetValue, ValueBracket};
use crate::error::ValidationError;

/// Inclusive upper bounds of brackets 1..=6 (euro).
pub const BRACKET_UPPER_BOUNDS: [u32; 6] = [1_100, 5_200, 26_000, 52_000, 260_000, 520_000];

/// Number of brackets in the schedule.
pub const BRACKET_COUNT: usize = BRACKET_UPPER_BOUNDS.len() + 1;

/// Bracket by 1-based index. Indexes outside `1..=7` clamp to the nearest bracket.
pub fn bracket_at(index: u8) -> ValueBracket {
    let index = index.clamp(1, BRACKET_COUNT as u8);
    let pos = usize::from(index - 1);
    let lower = pos.checked_sub(1).map(|p| Decimal::from(BRACKET_UPPER_BOUNDS[p]));
    let upper = BRACKET_UPPER_BOUNDS.get(pos).map(|&b| Decimal::from(b));
    ValueBracket { index, lower, upper }
}

/// The whole schedule in ascending order.
pub fn all_brackets() -> [ValueBracket; BRACKET_COUNT] {
    std::array::from_fn(|pos| bracket_at(pos as u8 + 1))
}

/// Resolve the bracket for a raw decimal value.
///
/// Negative values are undefined by the regulation and rejected.
pub fn bracket_of(value: Decimal) -> Result<ValueBracket, ValidationError> {
    let asset = AssetValue::new(value)?;
    Ok(bracket_for(asset))
}

/// Resolve the bracket for an already validated asset value.
pub fn bracket_for(asset: AssetValue) -> ValueBracket {
    let value = asset.value();
    let pos = BRACKET_UPPER_BOUNDS
        .iter()
        .position(|&bound| value <= Decimal::from(bound))
        .unwrap_or(BRACKET_UPPER_BOUNDS.len());
    bracket_at(pos as u8 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn idx(v: Decimal) -> u8 {
        bracket_of(v).unwrap().index
    }

    #[test]
    fn boundaries_belong_to_lower_bracket() {
        assert_eq!(idx(dec!(0)), 1);
        assert_eq!(idx(dec!(1100.00)), 1);
        assert_eq!(idx(dec!(1100.01)), 2);
        assert_eq!(idx(dec!(5200)), 2);
        assert_eq!(idx(dec!(26000)), 3);
        assert_eq!(idx(dec!(52000)), 4);
        assert_eq!(idx(dec!(260000)), 5);
        assert_eq!(idx(dec!(520000.00)), 6);
        assert_eq!(idx(dec!(520000.01)), 7);
    }

    #[test]
    fn values_above_top_boundary_use_unbounded_bracket() {
        let b = bracket_of(dec!(600000)).unwrap();
        assert_eq!(b.index, 7);
        assert_eq!(b.upper, None);
        assert_eq!(idx(dec!(99999999999)), 7);
    }

    #[test]
    fn negative_value_is_rejected() {
        assert!(matches!(
            bracket_of(dec!(-1)),
            Err(ValidationError::NegativeAssetValue(_))
        ));
    }

    #[test]
    fn resolution_is_total_and_monotonic() {
        let mut prev = 0u8;
        let mut v = Decimal::ZERO;
        while v <= dec!(700000) {
            let b = bracket_of(v).unwrap();
            assert!(b.contains(v), "bracket {} must contain {v}", b.index);
            assert!(b.index >= prev);
            prev = b.index;
            v += dec!(517.37);
        }
        assert_eq!(prev, 7);
    }

    #[test]
    fn schedule_partitions_without_gaps() {
        let all = all_brackets();
        assert_eq!(all[0].lower, None);
        for pair in all.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower);
            assert_eq!(pair[0].index + 1, pair[1].index);
        }
        assert_eq!(all[BRACKET_COUNT - 1].upper, None);
    }
}
