//! Quote aggregation and the engine entry point.
//!
//! Two aggregation strategies, selected by `SurchargePolicy`:
//!
//! - itemized: every service priced on its own with the complexity multiplier;
//!   the grand total is the sum of each service's total
//! - combined: one umbrella fee built from the highest base rate in the
//!   selection, scaled by the service-count multiplier

use rust_decimal::Decimal;

use crate::domain::{
    AssetValue, CombinedQuote, ComplexityLevel, ItemizedQuote, Quotation, RegulationParams,
    ServiceFee, ServiceSelection, SurchargePolicy,
};
use crate::error::ValidationError;
use crate::tariff::bracket::bracket_for;
use crate::tariff::rates::{base_rate, resolve_category};
use crate::tariff::stack::compose;
use crate::tariff::surcharge::{apply_complexity, apply_service_count, service_count_multiplier};

/// Compute a full quotation.
///
/// Fails only on invalid input (negative value, empty selection, negative
/// regulation rate); unmatched service names fall back to the default
/// category instead.
pub fn compute_fee(
    asset_value: Decimal,
    selection: &ServiceSelection,
    policy: SurchargePolicy,
    params: &RegulationParams,
) -> Result<Quotation, ValidationError> {
    params.validate()?;
    let asset = AssetValue::new(asset_value)?;
    match policy {
        SurchargePolicy::Complexity(level) => {
            itemize(asset, selection, level, params).map(Quotation::Itemized)
        }
        SurchargePolicy::ServiceCount => combine(asset, selection, params).map(Quotation::Combined),
    }
}

/// Price one service on its own.
pub fn price_service(
    asset: AssetValue,
    service: &str,
    level: ComplexityLevel,
    params: &RegulationParams,
) -> ServiceFee {
    let bracket = bracket_for(asset);
    let category = resolve_category(service);
    let base_fee = base_rate(category.category(), bracket);
    let fee = apply_complexity(base_fee, level);

    ServiceFee {
        service: service.to_string(),
        category,
        base_fee,
        multiplier: level.multiplier(),
        breakdown: compose(fee, params),
    }
}

pub fn itemize(
    asset: AssetValue,
    selection: &ServiceSelection,
    level: ComplexityLevel,
    params: &RegulationParams,
) -> Result<ItemizedQuote, ValidationError> {
    if selection.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    let services: Vec<ServiceFee> = selection
        .names()
        .iter()
        .map(|name| price_service(asset, name, level, params))
        .collect();
    let grand_total = services.iter().map(|s| s.breakdown.total).sum();

    Ok(ItemizedQuote {
        asset_value: asset,
        bracket: bracket_for(asset),
        complexity: level,
        services,
        grand_total,
    })
}

pub fn combine(
    asset: AssetValue,
    selection: &ServiceSelection,
    params: &RegulationParams,
) -> Result<CombinedQuote, ValidationError> {
    if selection.is_empty() {
        return Err(ValidationError::EmptySelection);
    }
    let multiplier = service_count_multiplier(selection.len())?;
    let bracket = bracket_for(asset);

    let categories: Vec<_> = selection
        .names()
        .iter()
        .map(|name| resolve_category(name))
        .collect();

    // Highest base rate wins; ties keep the first category in selection order.
    let mut rate_category = categories[0].category();
    let mut base_fee = base_rate(rate_category, bracket);
    for m in &categories[1..] {
        let rate = base_rate(m.category(), bracket);
        if rate > base_fee {
            base_fee = rate;
            rate_category = m.category();
        }
    }

    let fee = apply_service_count(base_fee, selection.len())?;

    Ok(CombinedQuote {
        asset_value: asset,
        bracket,
        services: selection.names().to_vec(),
        categories,
        rate_category,
        base_fee,
        multiplier,
        breakdown: compose(fee, params),
    })
}
