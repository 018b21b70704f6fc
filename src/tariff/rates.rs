//! Base rate schedule.
//!
//! Provenance: the multi-category descriptive schedule (one row per service
//! category, one column per value bracket) is the single source of truth.
//! The single-row "Tabella 25" extrajudicial assistance values that also
//! circulated for the same regulation are not used anywhere, and the two are
//! never merged or averaged.

use rust_decimal::Decimal;

use crate::domain::{CategoryMatch, ServiceCategory, ValueBracket};
use crate::tariff::bracket::BRACKET_COUNT;

/// Base fee (euro) per category, indexed by bracket position (0 = bracket 1).
const RATE_TABLE: [(ServiceCategory, [u32; BRACKET_COUNT]); 7] = [
    (ServiceCategory::Consulenza, [100, 250, 500, 800, 1_300, 2_000, 3_000]),
    (ServiceCategory::Contratti, [150, 400, 700, 1_200, 1_800, 2_500, 3_500]),
    (ServiceCategory::Contenzioso, [300, 650, 1_200, 2_000, 3_500, 5_000, 7_000]),
    (ServiceCategory::Esecuzione, [250, 550, 900, 1_500, 2_500, 3_800, 5_500]),
    (ServiceCategory::Famiglia, [350, 750, 1_300, 2_200, 3_800, 5_500, 7_500]),
    (ServiceCategory::Stragiudiziale, [200, 450, 800, 1_300, 2_000, 3_000, 4_500]),
    (ServiceCategory::Amministrativo, [250, 550, 1_000, 1_700, 3_000, 4_500, 6_500]),
];

fn row(category: ServiceCategory) -> &'static [u32; BRACKET_COUNT] {
    // RATE_TABLE lists every category exactly once, in `ServiceCategory::ALL` order.
    let pos = ServiceCategory::ALL
        .iter()
        .position(|&c| c == category)
        .unwrap_or(0);
    &RATE_TABLE[pos].1
}

/// Base fee for a category in a bracket.
pub fn base_rate(category: ServiceCategory, bracket: ValueBracket) -> Decimal {
    Decimal::from(row(category)[bracket.position()])
}

/// Resolve a free-text service name to a category.
///
/// Order: case-sensitive substring match on the category name, then a
/// case-insensitive one, then `ServiceCategory::DEFAULT`. Categories are tried
/// in schedule order, so the first listed category wins on ties. Never fails.
pub fn resolve_category(service_name: &str) -> CategoryMatch {
    if let Some(&c) = ServiceCategory::ALL
        .iter()
        .find(|c| service_name.contains(c.name()))
    {
        return CategoryMatch::Matched(c);
    }

    let lowered = service_name.to_lowercase();
    if let Some(&c) = ServiceCategory::ALL
        .iter()
        .find(|c| lowered.contains(&c.name().to_lowercase()))
    {
        return CategoryMatch::Matched(c);
    }

    CategoryMatch::Defaulted(ServiceCategory::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariff::bracket::{all_brackets, bracket_at};
    use rust_decimal_macros::dec;

    #[test]
    fn table_rows_match_categories() {
        for (pos, (category, _)) in RATE_TABLE.iter().enumerate() {
            assert_eq!(*category, ServiceCategory::ALL[pos]);
        }
    }

    #[test]
    fn every_category_has_a_rate_per_bracket() {
        for category in ServiceCategory::ALL {
            let mut prev = Decimal::ZERO;
            for bracket in all_brackets() {
                let rate = base_rate(category, bracket);
                assert!(rate > prev, "{category} rates must grow with the bracket");
                prev = rate;
            }
        }
    }

    #[test]
    fn known_rates() {
        assert_eq!(base_rate(ServiceCategory::Contenzioso, bracket_at(3)), dec!(1200));
        assert_eq!(base_rate(ServiceCategory::Famiglia, bracket_at(7)), dec!(7500));
        assert_eq!(base_rate(ServiceCategory::Consulenza, bracket_at(1)), dec!(100));
    }

    #[test]
    fn resolution_prefers_exact_then_case_insensitive() {
        assert_eq!(
            resolve_category("Contenzioso civile"),
            CategoryMatch::Matched(ServiceCategory::Contenzioso)
        );
        assert_eq!(
            resolve_category("assistenza in materia di famiglia"),
            CategoryMatch::Matched(ServiceCategory::Famiglia)
        );
        // Exact match on a later category beats a case-insensitive match on an earlier one.
        assert_eq!(
            resolve_category("consulenza per Esecuzione"),
            CategoryMatch::Matched(ServiceCategory::Esecuzione)
        );
    }

    #[test]
    fn unmatched_name_falls_back_to_default() {
        assert_eq!(
            resolve_category("Xyz"),
            CategoryMatch::Defaulted(ServiceCategory::Consulenza)
        );
        assert!(resolve_category("").is_default());
    }
}
