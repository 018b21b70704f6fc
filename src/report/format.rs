//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the engine stays free of presentation concerns
//! - rounding to cents happens only here (and in exports)

use rust_decimal::Decimal;

use crate::domain::{
    FeeBreakdown, Quotation, RecentQuote, RegulationParams, Service, ServiceCategory, ValueBracket,
    round_cents,
};
use crate::store::ServiceStatistics;
use crate::tariff::{all_brackets, base_rate};

/// Format an amount as `€ 1,234.56` (thousands separator, 2 decimals).
pub fn format_eur(amount: Decimal) -> String {
    let mut rounded = round_cents(amount);
    rounded.rescale(2);
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("€ {sign}{grouped}.{frac_part}")
}

/// Format a fractional rate as a percentage label (`0.15` → `15%`).
pub fn format_percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// Labeled cost rows in the fixed document order.
pub fn cost_rows(breakdown: &FeeBreakdown, params: &RegulationParams) -> Vec<(String, Decimal)> {
    vec![
        ("Onorari professionali".to_string(), breakdown.professional_fee),
        (
            format!("Spese forfettarie ({})", format_percent(params.allowance_rate)),
            breakdown.allowance,
        ),
        (
            format!("Cassa previdenza avvocati ({})", format_percent(params.guild_rate)),
            breakdown.guild_contribution,
        ),
        (format!("IVA ({})", format_percent(params.tax_rate)), breakdown.tax),
        ("Totale".to_string(), breakdown.total),
    ]
}

pub fn format_cost_rows(breakdown: &FeeBreakdown, params: &RegulationParams) -> String {
    let mut out = String::new();
    for (label, amount) in cost_rows(breakdown, params) {
        out.push_str(&format!("{:<36} {:>18}\n", format!("{label}:"), format_eur(amount)));
    }
    out
}

pub fn format_bracket_range(bracket: &ValueBracket) -> String {
    match (bracket.lower, bracket.upper) {
        (None, Some(hi)) => format!("fino a {}", format_eur(hi)),
        (Some(lo), Some(hi)) => format!("da {} a {}", format_eur(lo + Decimal::new(1, 2)), format_eur(hi)),
        (Some(lo), None) => format!("oltre {}", format_eur(lo)),
        (None, None) => "qualsiasi valore".to_string(),
    }
}

/// Terminal summary of a quotation.
pub fn format_quotation(quotation: &Quotation, params: &RegulationParams) -> String {
    let mut out = String::new();
    let bracket = quotation.bracket();

    out.push_str("=== tariffa - Preventivo ===\n");
    out.push_str(&format!("Valore del bene: {}\n", format_eur(quotation.asset_value().value())));
    out.push_str(&format!(
        "Scaglione: {} ({})\n",
        bracket.index,
        format_bracket_range(&bracket)
    ));

    match quotation {
        Quotation::Itemized(q) => {
            out.push_str(&format!("Complessità: {}\n\n", q.complexity.display_name()));
            out.push_str(&format!(
                "{:<28} {:<16} {:>14} {:>6} {:>18}\n",
                "servizio", "categoria", "base", "x", "totale"
            ));
            out.push_str(&format!(
                "{:-<28} {:-<16} {:-<14} {:-<6} {:-<18}\n",
                "", "", "", "", ""
            ));
            for s in &q.services {
                let category = if s.category.is_default() {
                    format!("{}*", s.category.category())
                } else {
                    s.category.category().to_string()
                };
                out.push_str(&format!(
                    "{:<28} {:<16} {:>14} {:>6} {:>18}\n",
                    truncate(&s.service, 28),
                    category,
                    format_eur(s.base_fee),
                    s.multiplier.normalize(),
                    format_eur(s.breakdown.total)
                ));
            }
            if q.services.iter().any(|s| s.category.is_default()) {
                out.push_str("* categoria predefinita (nessuna corrispondenza)\n");
            }
            out.push('\n');
        }
        Quotation::Combined(q) => {
            out.push_str(&format!(
                "Servizi: {} | tariffa base {} ({}) x {}\n\n",
                q.services.len(),
                format_eur(q.base_fee),
                q.rate_category,
                q.multiplier.normalize()
            ));
        }
    }

    out.push_str(&format_cost_rows(&quotation.summary(), params));
    out
}

pub fn format_services(services: &[Service]) -> String {
    if services.is_empty() {
        return "No services available. Add one with `tariffa services add`.\n".to_string();
    }
    let mut out = String::new();
    out.push_str(&format!("{:>4} {:<28} {:<4} {}\n", "id", "name", "doc", "description"));
    out.push_str(&format!("{:-<4} {:-<28} {:-<4} {:-<30}\n", "", "", "", ""));
    for s in services {
        out.push_str(
            format!(
                "{:>4} {:<28} {:<4} {}\n",
                s.id,
                truncate(&s.name, 28),
                if s.document.is_some() { "yes" } else { "" },
                s.description
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

pub fn format_recent_quotes(quotes: &[RecentQuote]) -> String {
    if quotes.is_empty() {
        return "No quotes yet.\n".to_string();
    }
    let mut out = String::new();
    out.push_str(&format!(
        "{:>5} {:<10} {:<24} {:>18} {:>18}  {}\n",
        "id", "date", "client", "value", "total", "services"
    ));
    out.push_str(&format!(
        "{:-<5} {:-<10} {:-<24} {:-<18} {:-<18}  {:-<20}\n",
        "", "", "", "", "", ""
    ));
    for q in quotes {
        out.push_str(
            format!(
                "{:>5} {:<10} {:<24} {:>18} {:>18}  {}\n",
                q.id,
                q.created_at.format("%d/%m/%Y"),
                truncate(&q.client_name, 24),
                format_eur(q.asset_value.value()),
                format_eur(q.total),
                q.services.join(", ")
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

pub fn format_statistics(stats: &ServiceStatistics) -> String {
    let mut out = String::new();
    out.push_str("=== Statistiche generali ===\n");
    out.push_str(&format!("Totale preventivi: {}\n", stats.totals.total_quotes));
    out.push_str(&format!("Valore medio: {}\n", format_eur(stats.totals.avg_value)));
    out.push_str(&format!("Onorario medio: {}\n", format_eur(stats.totals.avg_fee)));

    out.push_str("\nRichieste per servizio:\n");
    let max = stats.service_counts.iter().map(|c| c.count).max().unwrap_or(0);
    for c in &stats.service_counts {
        out.push_str(&format!(
            "  {:<28} {:>5} {}\n",
            truncate(&c.name, 28),
            c.count,
            bar(c.count, max, 30)
        ));
    }

    if !stats.service_values.is_empty() {
        out.push_str("\nMedie per servizio:\n");
        for v in &stats.service_values {
            out.push_str(&format!(
                "  {:<28} valore {:>18} | onorario {:>18}\n",
                truncate(&v.name, 28),
                format_eur(v.avg_value),
                format_eur(v.avg_fee)
            ));
        }
    }

    if !stats.monthly_counts.is_empty() {
        out.push_str("\nPreventivi per mese:\n");
        let max = stats.monthly_counts.iter().map(|m| m.count).max().unwrap_or(0);
        for m in &stats.monthly_counts {
            out.push_str(&format!(
                "  {:04}-{:02} {:>5} {}\n",
                m.year,
                m.month,
                m.count,
                bar(m.count, max, 30)
            ));
        }
    }
    out
}

/// Bracket × category base-rate schedule.
pub fn format_tariff_table() -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<3} {:<42}", "#", "scaglione"));
    for c in ServiceCategory::ALL {
        out.push_str(&format!(" {:>14}", c.name()));
    }
    out.push('\n');
    for b in all_brackets() {
        out.push_str(&format!("{:<3} {:<42}", b.index, format_bracket_range(&b)));
        for c in ServiceCategory::ALL {
            out.push_str(&format!(" {:>14}", format_eur(base_rate(c, b))));
        }
        out.push('\n');
    }
    out
}

fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "#".repeat(count * width / max)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ComplexityLevel, ServiceSelection, SurchargePolicy};
    use crate::tariff::{bracket_at, compute_fee};
    use rust_decimal_macros::dec;

    #[test]
    fn eur_formatting() {
        assert_eq!(format_eur(dec!(0)), "€ 0.00");
        assert_eq!(format_eur(dec!(999.5)), "€ 999.50");
        assert_eq!(format_eur(dec!(1750.944)), "€ 1,750.94");
        assert_eq!(format_eur(dec!(1234567.891)), "€ 1,234,567.89");
        assert_eq!(format_eur(dec!(100.005)), "€ 100.01");
        assert_eq!(format_eur(dec!(520000)), "€ 520,000.00");
    }

    #[test]
    fn percent_labels() {
        assert_eq!(format_percent(dec!(0.15)), "15%");
        assert_eq!(format_percent(dec!(0.04)), "4%");
        assert_eq!(format_percent(dec!(0.225)), "22.5%");
    }

    #[test]
    fn cost_rows_are_in_fixed_order() {
        let params = RegulationParams::default();
        let b = crate::tariff::compose(dec!(1000), &params);
        let labels: Vec<String> = cost_rows(&b, &params).into_iter().map(|(l, _)| l).collect();
        assert_eq!(
            labels,
            vec![
                "Onorari professionali",
                "Spese forfettarie (15%)",
                "Cassa previdenza avvocati (4%)",
                "IVA (22%)",
                "Totale",
            ]
        );
    }

    #[test]
    fn bracket_ranges() {
        assert_eq!(format_bracket_range(&bracket_at(1)), "fino a € 1,100.00");
        assert_eq!(format_bracket_range(&bracket_at(2)), "da € 1,100.01 a € 5,200.00");
        assert_eq!(format_bracket_range(&bracket_at(7)), "oltre € 520,000.00");
    }

    #[test]
    fn quotation_summary_marks_defaulted_services() {
        let params = RegulationParams::default();
        let q = compute_fee(
            dec!(10000),
            &ServiceSelection::new(["Contenzioso", "Xyz"]).unwrap(),
            SurchargePolicy::Complexity(ComplexityLevel::Standard),
            &params,
        )
        .unwrap();
        let text = format_quotation(&q, &params);
        assert!(text.contains("Scaglione: 3"));
        assert!(text.contains("Consulenza*"));
        assert!(text.contains("Totale:"));
    }

    #[test]
    fn tariff_table_lists_every_bracket() {
        let table = format_tariff_table();
        assert_eq!(table.lines().count(), 8);
        assert!(table.contains("€ 7,500.00"));
    }
}
