//! Cost stack composition.
//!
//! Stages run in the mandated order, each on the running subtotal:
//!
//! 1. allowance = fee × allowance_rate
//! 2. guild contribution = (fee + allowance) × guild_rate
//! 3. taxable base = fee + allowance + contribution
//! 4. tax = taxable base × tax_rate
//! 5. total = taxable base + tax
//!
//! The guild contribution is part of the taxable base (VAT applies to it).

use rust_decimal::Decimal;

use crate::domain::{FeeBreakdown, RegulationParams};

pub fn compose(professional_fee: Decimal, params: &RegulationParams) -> FeeBreakdown {
    let allowance = professional_fee * params.allowance_rate;
    let guild_contribution = (professional_fee + allowance) * params.guild_rate;
    let taxable_base = professional_fee + allowance + guild_contribution;
    let tax = taxable_base * params.tax_rate;
    let total = taxable_base + tax;

    FeeBreakdown {
        professional_fee,
        allowance,
        guild_contribution,
        taxable_base,
        tax,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn stack_follows_mandated_order() {
        let b = compose(dec!(1000), &RegulationParams::default());
        assert_eq!(b.allowance, dec!(150));
        assert_eq!(b.guild_contribution, dec!(46));
        assert_eq!(b.taxable_base, dec!(1196));
        assert_eq!(b.tax, dec!(263.12));
        assert_eq!(b.total, dec!(1459.12));
        assert!(b.is_consistent());
    }

    #[test]
    fn tax_is_never_on_bare_fee() {
        let params = RegulationParams::default();
        let b = compose(dec!(1215), &params);
        assert_ne!(b.tax, dec!(1215) * params.tax_rate);
        assert_eq!(b.tax, b.taxable_base * params.tax_rate);
    }

    #[test]
    fn composition_identity_holds_exactly() {
        let params = RegulationParams::default();
        for fee in [dec!(0), dec!(0.01), dec!(1.3), dec!(333.333), dec!(1579.5), dec!(13500)] {
            let b = compose(fee, &params);
            assert!(b.is_consistent(), "identity broken for {fee}");
            assert!(b.allowance >= Decimal::ZERO && b.tax >= Decimal::ZERO);
        }
    }

    #[test]
    fn zero_rates_disable_stages() {
        let params = RegulationParams {
            guild_rate: Decimal::ZERO,
            ..RegulationParams::default()
        };
        let b = compose(dec!(1000), &params);
        assert_eq!(b.guild_contribution, Decimal::ZERO);
        assert_eq!(b.taxable_base, dec!(1150));
    }
}
