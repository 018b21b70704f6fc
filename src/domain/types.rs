//! Shared domain types.
//!
//! These types are intentionally kept serializable so they can be:
//!
//! - produced by the fee engine
//! - persisted by the store alongside the quote they belong to
//! - reloaded later for history, statistics and exports

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Fee category a service is billed under.
///
/// Each category owns one base-rate row in the tariff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum ServiceCategory {
    Consulenza,
    Contratti,
    Contenzioso,
    Esecuzione,
    Famiglia,
    Stragiudiziale,
    Amministrativo,
}

impl ServiceCategory {
    /// All categories in schedule order (the order used for name matching).
    pub const ALL: [ServiceCategory; 7] = [
        ServiceCategory::Consulenza,
        ServiceCategory::Contratti,
        ServiceCategory::Contenzioso,
        ServiceCategory::Esecuzione,
        ServiceCategory::Famiglia,
        ServiceCategory::Stragiudiziale,
        ServiceCategory::Amministrativo,
    ];

    /// Category used when a service name matches nothing.
    pub const DEFAULT: ServiceCategory = ServiceCategory::Consulenza;

    pub fn name(self) -> &'static str {
        match self {
            ServiceCategory::Consulenza => "Consulenza",
            ServiceCategory::Contratti => "Contratti",
            ServiceCategory::Contenzioso => "Contenzioso",
            ServiceCategory::Esecuzione => "Esecuzione",
            ServiceCategory::Famiglia => "Famiglia",
            ServiceCategory::Stragiudiziale => "Stragiudiziale",
            ServiceCategory::Amministrativo => "Amministrativo",
        }
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Case difficulty surcharge applied to the base fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Standard,
    Media,
    Alta,
    #[value(name = "molto_alta")]
    MoltoAlta,
}

impl ComplexityLevel {
    pub const ALL: [ComplexityLevel; 4] = [
        ComplexityLevel::Standard,
        ComplexityLevel::Media,
        ComplexityLevel::Alta,
        ComplexityLevel::MoltoAlta,
    ];

    pub fn multiplier(self) -> Decimal {
        match self {
            ComplexityLevel::Standard => dec!(1.0),
            ComplexityLevel::Media => dec!(1.2),
            ComplexityLevel::Alta => dec!(1.4),
            // Ceiling allowed by the regulation (+80%).
            ComplexityLevel::MoltoAlta => dec!(1.8),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ComplexityLevel::Standard => "standard",
            ComplexityLevel::Media => "media",
            ComplexityLevel::Alta => "alta",
            ComplexityLevel::MoltoAlta => "molto alta",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ComplexityLevel::Standard => ComplexityLevel::Media,
            ComplexityLevel::Media => ComplexityLevel::Alta,
            ComplexityLevel::Alta => ComplexityLevel::MoltoAlta,
            ComplexityLevel::MoltoAlta => ComplexityLevel::Standard,
        }
    }
}

/// How the base fee is adjusted before the cost stack is applied.
///
/// The two variants drive two different quote flows and are never mixed:
/// `Complexity` prices every service on its own (itemized quote), while
/// `ServiceCount` prices the whole selection as one umbrella fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "level")]
pub enum SurchargePolicy {
    Complexity(ComplexityLevel),
    ServiceCount,
}

impl SurchargePolicy {
    pub fn describe(self) -> String {
        match self {
            SurchargePolicy::Complexity(level) => format!("itemized, complexity {}", level.display_name()),
            SurchargePolicy::ServiceCount => "combined, service-count surcharge".to_string(),
        }
    }
}

/// One tier of the value schedule.
///
/// A value `v` belongs to the bracket when `lower < v <= upper`; the first
/// bracket has no lower bound (it starts at 0 inclusive) and the last has no
/// upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueBracket {
    /// 1-based bracket number (1..=7).
    pub index: u8,
    pub lower: Option<Decimal>,
    pub upper: Option<Decimal>,
}

impl ValueBracket {
    pub fn contains(&self, value: Decimal) -> bool {
        let above_lower = self.lower.is_none_or(|lo| value > lo);
        let below_upper = self.upper.is_none_or(|hi| value <= hi);
        above_lower && below_upper
    }

    /// Zero-based position into rate tables.
    pub fn position(&self) -> usize {
        usize::from(self.index - 1)
    }
}

/// A validated, non-negative asset value (in euro).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetValue(Decimal);

impl AssetValue {
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value < Decimal::ZERO {
            return Err(ValidationError::NegativeAssetValue(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Parse user input such as `10000`, `10000.50`, `€ 10.000,50` or `10,000.50`.
    ///
    /// Separator rules:
    /// - both `.` and `,` present: the one occurring last is the decimal separator
    /// - only one kind present, occurring more than once: thousands separators
    /// - only one kind present, occurring once: a thousands separator when it
    ///   splits 1-3 leading digits from exactly 3 trailing ones (`600.000`,
    ///   `10,000`), otherwise the decimal separator (`1100,01`, `10000.500`)
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let cleaned: String = input
            .trim()
            .trim_start_matches('€')
            .trim_end_matches('€')
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect();
        if cleaned.is_empty() {
            return Err(ValidationError::InvalidAssetValue(input.trim().to_string()));
        }

        let normalized = normalize_separators(&cleaned);
        let value = Decimal::from_str(&normalized)
            .map_err(|_| ValidationError::InvalidAssetValue(input.trim().to_string()))?;
        Self::new(value)
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

fn normalize_separators(s: &str) -> String {
    let dots = s.matches('.').count();
    let commas = s.matches(',').count();
    match (dots, commas) {
        (0, 0) => s.to_string(),
        (1, 0) if is_single_group(s, '.') => s.replace('.', ""),
        (1, 0) => s.to_string(),
        (_, 0) => s.replace('.', ""),
        (0, 1) if is_single_group(s, ',') => s.replace(',', ""),
        (0, 1) => s.replace(',', "."),
        (0, _) => s.replace(',', ""),
        _ => {
            let last_dot = s.rfind('.').unwrap_or(0);
            let last_comma = s.rfind(',').unwrap_or(0);
            if last_comma > last_dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
    }
}

/// `123.456`-shaped: one separator with 1-3 digits before it and exactly 3 after.
fn is_single_group(s: &str, sep: char) -> bool {
    let Some((head, tail)) = s.split_once(sep) else {
        return false;
    };
    let head = head.strip_prefix('-').unwrap_or(head);
    (1..=3).contains(&head.len())
        && head.chars().all(|c| c.is_ascii_digit())
        && tail.len() == 3
        && tail.chars().all(|c| c.is_ascii_digit())
}

/// Free-text service names chosen for one quote (never empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSelection {
    names: Vec<String>,
}

impl ServiceSelection {
    pub fn new<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Regulation percentages applied by the cost stack.
///
/// Loaded from configuration; the defaults are the rates currently in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulationParams {
    /// Flat-rate disbursement allowance, fraction of the professional fee.
    pub allowance_rate: Decimal,
    /// Guild (cassa previdenza) contribution, fraction of fee + allowance.
    pub guild_rate: Decimal,
    /// VAT, fraction of the taxable base.
    pub tax_rate: Decimal,
}

impl Default for RegulationParams {
    fn default() -> Self {
        Self {
            allowance_rate: dec!(0.15),
            guild_rate: dec!(0.04),
            tax_rate: dec!(0.22),
        }
    }
}

impl RegulationParams {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("allowance_rate", self.allowance_rate),
            ("guild_rate", self.guild_rate),
            ("tax_rate", self.tax_rate),
        ] {
            if value < Decimal::ZERO {
                return Err(ValidationError::InvalidRate {
                    name,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Itemized cost stack for one professional fee.
///
/// Amounts are exact decimals; rounding happens only when formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub professional_fee: Decimal,
    pub allowance: Decimal,
    pub guild_contribution: Decimal,
    pub taxable_base: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl FeeBreakdown {
    pub const ZERO: FeeBreakdown = FeeBreakdown {
        professional_fee: Decimal::ZERO,
        allowance: Decimal::ZERO,
        guild_contribution: Decimal::ZERO,
        taxable_base: Decimal::ZERO,
        tax: Decimal::ZERO,
        total: Decimal::ZERO,
    };

    /// `total` equals the sum of the four itemized components.
    pub fn is_consistent(&self) -> bool {
        self.total == self.professional_fee + self.allowance + self.guild_contribution + self.tax
            && self.taxable_base == self.professional_fee + self.allowance + self.guild_contribution
    }

    /// Component-wise sum, used for itemized grand totals.
    pub fn add(&self, other: &FeeBreakdown) -> FeeBreakdown {
        FeeBreakdown {
            professional_fee: self.professional_fee + other.professional_fee,
            allowance: self.allowance + other.allowance,
            guild_contribution: self.guild_contribution + other.guild_contribution,
            taxable_base: self.taxable_base + other.taxable_base,
            tax: self.tax + other.tax,
            total: self.total + other.total,
        }
    }
}

/// Round to cents, halves away from zero. Only used for display and exports.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Outcome of resolving a free-text service name to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "match", content = "category")]
pub enum CategoryMatch {
    Matched(ServiceCategory),
    /// Nothing matched; the default category was used.
    Defaulted(ServiceCategory),
}

impl CategoryMatch {
    pub fn category(self) -> ServiceCategory {
        match self {
            CategoryMatch::Matched(c) | CategoryMatch::Defaulted(c) => c,
        }
    }

    pub fn is_default(self) -> bool {
        matches!(self, CategoryMatch::Defaulted(_))
    }
}

/// One service priced on its own (itemized flow).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFee {
    pub service: String,
    pub category: CategoryMatch,
    pub base_fee: Decimal,
    pub multiplier: Decimal,
    pub breakdown: FeeBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedQuote {
    pub asset_value: AssetValue,
    pub bracket: ValueBracket,
    pub complexity: ComplexityLevel,
    pub services: Vec<ServiceFee>,
    /// Sum of every service's own total.
    pub grand_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedQuote {
    pub asset_value: AssetValue,
    pub bracket: ValueBracket,
    pub services: Vec<String>,
    /// Categories resolved for the selection, in selection order.
    pub categories: Vec<CategoryMatch>,
    /// Category whose base rate was used (highest rate in the bracket).
    pub rate_category: ServiceCategory,
    pub base_fee: Decimal,
    pub multiplier: Decimal,
    pub breakdown: FeeBreakdown,
}

/// Engine output: one of the two quote flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "flow")]
pub enum Quotation {
    Itemized(ItemizedQuote),
    Combined(CombinedQuote),
}

impl Quotation {
    pub fn asset_value(&self) -> AssetValue {
        match self {
            Quotation::Itemized(q) => q.asset_value,
            Quotation::Combined(q) => q.asset_value,
        }
    }

    pub fn bracket(&self) -> ValueBracket {
        match self {
            Quotation::Itemized(q) => q.bracket,
            Quotation::Combined(q) => q.bracket,
        }
    }

    pub fn total(&self) -> Decimal {
        match self {
            Quotation::Itemized(q) => q.grand_total,
            Quotation::Combined(q) => q.breakdown.total,
        }
    }

    /// Cost rows to show on a document: the combined breakdown, or the
    /// component-wise sum of every itemized service.
    pub fn summary(&self) -> FeeBreakdown {
        match self {
            Quotation::Itemized(q) => q
                .services
                .iter()
                .fold(FeeBreakdown::ZERO, |acc, s| acc.add(&s.breakdown)),
            Quotation::Combined(q) => q.breakdown,
        }
    }

    /// Service names that fell back to the default category.
    pub fn defaulted_services(&self) -> Vec<&str> {
        match self {
            Quotation::Itemized(q) => q
                .services
                .iter()
                .filter(|s| s.category.is_default())
                .map(|s| s.service.as_str())
                .collect(),
            Quotation::Combined(q) => q
                .services
                .iter()
                .zip(&q.categories)
                .filter(|(_, c)| c.is_default())
                .map(|(s, _)| s.as_str())
                .collect(),
        }
    }
}

/// A service offered by the practice (catalogue entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: u32,
    pub name: String,
    pub description: String,
    /// Optional attached document (plain text), shown to clients on request.
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

/// Identity data entered by the client requesting a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub fiscal_code: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl Client {
    /// Required fields and phone characters. The email shape is only checked
    /// when a document is about to be sent (`has_valid_email`).
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (label, value) in [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("fiscal code", &self.fiscal_code),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidClient(format!("{label} is required")));
            }
        }
        if let Some(phone) = &self.phone {
            if !phone.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-')) {
                return Err(ValidationError::InvalidClient(format!("'{phone}' is not a valid phone number")));
            }
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

pub fn has_valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email.trim()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: u32,
    pub client: Client,
    pub created_at: DateTime<Utc>,
}

/// A submitted quote. Created once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: u32,
    pub client_id: u32,
    pub asset_value: AssetValue,
    pub total: Decimal,
    pub service_ids: Vec<u32>,
    pub quotation: Quotation,
    pub created_at: DateTime<Utc>,
}

/// Quote joined with its client and service names (history view).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentQuote {
    pub id: u32,
    pub asset_value: AssetValue,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub client_name: String,
    pub email: String,
    pub services: Vec<String>,
}
