//! Surcharge composition.
//!
//! Two mutually exclusive policies:
//! - complexity: base × level multiplier (1.0 / 1.2 / 1.4 / 1.8)
//! - service count: 1 service → ×1.0, 2 → ×1.2, N > 2 → ×(1.2 + 0.1 × (N − 2))

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::ComplexityLevel;
use crate::error::ValidationError;

const PAIR_MULTIPLIER: Decimal = dec!(1.2);
const PER_EXTRA_SERVICE: Decimal = dec!(0.1);

/// Multiplier for quoting `count` services under one umbrella fee.
pub fn service_count_multiplier(count: usize) -> Result<Decimal, ValidationError> {
    match count {
        0 => Err(ValidationError::ZeroServiceCount),
        1 => Ok(Decimal::ONE),
        n => Ok(PAIR_MULTIPLIER + PER_EXTRA_SERVICE * Decimal::from(n - 2)),
    }
}

pub fn apply_complexity(base_fee: Decimal, level: ComplexityLevel) -> Decimal {
    base_fee * level.multiplier()
}

pub fn apply_service_count(base_fee: Decimal, count: usize) -> Result<Decimal, ValidationError> {
    Ok(base_fee * service_count_multiplier(count)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_count_multipliers() {
        assert_eq!(service_count_multiplier(1).unwrap(), dec!(1));
        assert_eq!(service_count_multiplier(2).unwrap(), dec!(1.2));
        assert_eq!(service_count_multiplier(3).unwrap(), dec!(1.3));
        assert_eq!(service_count_multiplier(7).unwrap(), dec!(1.7));
        assert_eq!(
            service_count_multiplier(0).unwrap_err(),
            ValidationError::ZeroServiceCount
        );
    }

    #[test]
    fn service_count_surcharge_is_monotonic() {
        let base = dec!(1215);
        let mut prev = apply_service_count(base, 1).unwrap();
        for n in 2..=40 {
            let fee = apply_service_count(base, n).unwrap();
            assert!(fee >= prev, "fee for {n} services dropped");
            prev = fee;
        }
    }

    #[test]
    fn complexity_levels() {
        let base = dec!(1000);
        assert_eq!(apply_complexity(base, ComplexityLevel::Standard), dec!(1000));
        assert_eq!(apply_complexity(base, ComplexityLevel::Media), dec!(1200));
        assert_eq!(apply_complexity(base, ComplexityLevel::Alta), dec!(1400));
        assert_eq!(apply_complexity(base, ComplexityLevel::MoltoAlta), dec!(1800));
    }
}
