//! Service statistics for the administrative dashboard.

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::store::StoreData;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCount {
    pub id: u32,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceAverage {
    pub id: u32,
    pub name: String,
    pub avg_value: Decimal,
    pub avg_fee: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalStats {
    pub total_quotes: usize,
    pub avg_value: Decimal,
    pub avg_fee: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatistics {
    /// Every service with how many quotes requested it, most requested first.
    pub service_counts: Vec<ServiceCount>,
    /// Average asset value and fee per service that appears in at least one quote, by name.
    pub service_values: Vec<ServiceAverage>,
    /// Quote counts per calendar month, chronological.
    pub monthly_counts: Vec<MonthlyCount>,
    pub totals: TotalStats,
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

pub fn compute_statistics(data: &StoreData) -> ServiceStatistics {
    let mut service_counts: Vec<ServiceCount> = data
        .services
        .iter()
        .map(|s| ServiceCount {
            id: s.id,
            name: s.name.clone(),
            count: data.quotes.iter().filter(|q| q.service_ids.contains(&s.id)).count(),
        })
        .collect();
    service_counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.name.cmp(&b.name)));

    let mut service_values: Vec<ServiceAverage> = data
        .services
        .iter()
        .filter_map(|s| {
            let quotes: Vec<_> = data.quotes.iter().filter(|q| q.service_ids.contains(&s.id)).collect();
            if quotes.is_empty() {
                return None;
            }
            let values: Vec<Decimal> = quotes.iter().map(|q| q.asset_value.value()).collect();
            let fees: Vec<Decimal> = quotes.iter().map(|q| q.total).collect();
            Some(ServiceAverage {
                id: s.id,
                name: s.name.clone(),
                avg_value: mean(&values),
                avg_fee: mean(&fees),
            })
        })
        .collect();
    service_values.sort_by(|a, b| a.name.cmp(&b.name));

    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for q in &data.quotes {
        *months.entry((q.created_at.year(), q.created_at.month())).or_default() += 1;
    }
    let monthly_counts = months
        .into_iter()
        .map(|((year, month), count)| MonthlyCount { year, month, count })
        .collect();

    let values: Vec<Decimal> = data.quotes.iter().map(|q| q.asset_value.value()).collect();
    let fees: Vec<Decimal> = data.quotes.iter().map(|q| q.total).collect();

    ServiceStatistics {
        service_counts,
        service_values,
        monthly_counts,
        totals: TotalStats {
            total_quotes: data.quotes.len(),
            avg_value: mean(&values),
            avg_fee: mean(&fees),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{client, quotation};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn empty_store_has_zero_totals() {
        let stats = compute_statistics(&StoreData::default());
        assert_eq!(stats.totals.total_quotes, 0);
        assert_eq!(stats.totals.avg_value, Decimal::ZERO);
        assert!(stats.monthly_counts.is_empty());
    }

    #[test]
    fn counts_and_averages() {
        let mut data = StoreData::default();
        let jan = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2025, 2, 3, 10, 0, 0).unwrap();
        let a = data.add_service("Contenzioso", "", None, jan).unwrap();
        let b = data.add_service("Famiglia", "", None, jan).unwrap();
        data.add_service("Amministrativo", "", None, jan).unwrap();

        let both = vec![a.clone(), b.clone()];
        let q1 = quotation(dec!(10000), &both);
        let q2 = quotation(dec!(30000), std::slice::from_ref(&a));
        data.save_quote(&client("Rossi"), &both, &q1, jan).unwrap();
        data.save_quote(&client("Verdi"), std::slice::from_ref(&a), &q2, feb).unwrap();

        let stats = compute_statistics(&data);
        assert_eq!(stats.service_counts[0].name, "Contenzioso");
        assert_eq!(stats.service_counts[0].count, 2);
        assert_eq!(stats.service_counts[1].count, 1);
        assert_eq!(stats.service_counts[2].count, 0);

        let contenzioso = stats.service_values.iter().find(|v| v.name == "Contenzioso").unwrap();
        assert_eq!(contenzioso.avg_value, dec!(20000));
        assert_eq!(contenzioso.avg_fee, (q1.total() + q2.total()) / dec!(2));
        assert_eq!(stats.service_values.len(), 2);

        assert_eq!(
            stats.monthly_counts,
            vec![
                MonthlyCount { year: 2025, month: 1, count: 1 },
                MonthlyCount { year: 2025, month: 2, count: 1 },
            ]
        );
        assert_eq!(stats.totals.total_quotes, 2);
    }
}
