//! Persistence for services, clients and quotes.
//!
//! The fee engine never touches this module; the submit workflow calls the
//! engine first and only then hands the finished quotation to a store, so a
//! failed write can never leave a half-computed quote behind.
//!
//! Two backends share one in-memory model (`StoreData`):
//! - `MemoryStore` for tests and the TUI preview
//! - `JsonFileStore`, a single JSON document on disk

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Client, ClientRecord, Quotation, QuoteRecord, RecentQuote, Service};
use crate::error::AppError;

pub mod export;
pub mod json;
pub mod memory;
pub mod stats;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use stats::{ServiceStatistics, compute_statistics};

/// Storage operations needed by the CLI and TUI.
pub trait QuoteStore {
    fn list_services(&self) -> Result<Vec<Service>, AppError>;

    fn add_service(
        &mut self,
        name: &str,
        description: &str,
        document: Option<String>,
    ) -> Result<Service, AppError>;

    /// Remove a service and unlink it from every quote. Returns `false` if the id is unknown.
    fn remove_service(&mut self, id: u32) -> Result<bool, AppError>;

    /// Insert or replace services by id. Returns the number of services written.
    fn import_services(&mut self, services: Vec<Service>) -> Result<usize, AppError>;

    /// Persist a client, the quote computed for them and its service links.
    fn save_quote(
        &mut self,
        client: &Client,
        services: &[Service],
        quotation: &Quotation,
    ) -> Result<QuoteRecord, AppError>;

    /// Most recent quotes first.
    fn recent_quotes(&self, limit: usize) -> Result<Vec<RecentQuote>, AppError>;

    /// Full copy of the stored data (statistics, exports).
    fn snapshot(&self) -> Result<StoreData, AppError>;
}

/// Everything the store holds, in one serializable document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub clients: Vec<ClientRecord>,
    #[serde(default)]
    pub quotes: Vec<QuoteRecord>,
}

impl StoreData {
    fn next_service_id(&self) -> Result<u32, AppError> {
        next_id(self.services.iter().map(|s| s.id), "service")
    }

    fn next_client_id(&self) -> Result<u32, AppError> {
        next_id(self.clients.iter().map(|c| c.id), "client")
    }

    fn next_quote_id(&self) -> Result<u32, AppError> {
        next_id(self.quotes.iter().map(|q| q.id), "quote")
    }

    /// Services sorted by name (catalogue order).
    pub fn sorted_services(&self) -> Vec<Service> {
        let mut out = self.services.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        out
    }

    pub fn add_service(
        &mut self,
        name: &str,
        description: &str,
        document: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Service, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::new(2, "Service name must not be empty."));
        }
        let service = Service {
            id: self.next_service_id()?,
            name: name.to_string(),
            description: description.trim().to_string(),
            document,
            created_at: now,
        };
        self.services.push(service.clone());
        Ok(service)
    }

    pub fn remove_service(&mut self, id: u32) -> bool {
        let before = self.services.len();
        self.services.retain(|s| s.id != id);
        if self.services.len() == before {
            return false;
        }
        for quote in &mut self.quotes {
            quote.service_ids.retain(|&sid| sid != id);
        }
        true
    }

    pub fn import_services(&mut self, services: Vec<Service>) -> usize {
        let n = services.len();
        for service in services {
            match self.services.iter_mut().find(|s| s.id == service.id) {
                Some(existing) => {
                    existing.name = service.name;
                    existing.description = service.description;
                    existing.document = service.document;
                }
                None => self.services.push(service),
            }
        }
        n
    }

    pub fn save_quote(
        &mut self,
        client: &Client,
        services: &[Service],
        quotation: &Quotation,
        now: DateTime<Utc>,
    ) -> Result<QuoteRecord, AppError> {
        client.validate()?;

        let client_id = self.next_client_id()?;
        let quote_id = self.next_quote_id()?;
        self.clients.push(ClientRecord {
            id: client_id,
            client: client.clone(),
            created_at: now,
        });

        let service_ids = unique_ids(services.iter().map(|s| s.id));

        let record = QuoteRecord {
            id: quote_id,
            client_id,
            asset_value: quotation.asset_value(),
            total: quotation.total(),
            service_ids,
            quotation: quotation.clone(),
            created_at: now,
        };
        self.quotes.push(record.clone());
        Ok(record)
    }

    pub fn recent_quotes(&self, limit: usize) -> Vec<RecentQuote> {
        let mut quotes: Vec<&QuoteRecord> = self.quotes.iter().collect();
        quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        quotes
            .into_iter()
            .take(limit)
            .map(|q| {
                let client = self.clients.iter().find(|c| c.id == q.client_id);
                RecentQuote {
                    id: q.id,
                    asset_value: q.asset_value,
                    total: q.total,
                    created_at: q.created_at,
                    client_name: client.map(|c| c.client.full_name()).unwrap_or_default(),
                    email: client.map(|c| c.client.email.clone()).unwrap_or_default(),
                    services: self.service_names(&q.service_ids),
                }
            })
            .collect()
    }

    pub fn service_names(&self, ids: &[u32]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.services.iter().find(|s| s.id == *id))
            .map(|s| s.name.clone())
            .collect()
    }
}

/// One past the highest id in use (1 for an empty table).
fn next_id(ids: impl Iterator<Item = u32>, table: &str) -> Result<u32, AppError> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| AppError::new(2, format!("No {table} ids left (highest id is {}).", u32::MAX)))
}

/// Drop repeated ids, keeping first occurrences in order.
pub fn unique_ids(ids: impl IntoIterator<Item = u32>) -> Vec<u32> {
    let mut out: Vec<u32> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::{ServiceSelection, SurchargePolicy};
    use crate::domain::RegulationParams;
    use rust_decimal::Decimal;

    pub fn client(last_name: &str) -> Client {
        Client {
            first_name: "Mario".into(),
            last_name: last_name.into(),
            email: "mario@example.it".into(),
            phone: None,
            fiscal_code: "RSSMRA80A01H501U".into(),
            address: None,
        }
    }

    pub fn quotation(value: Decimal, services: &[Service]) -> Quotation {
        let selection = ServiceSelection::new(services.iter().map(|s| s.name.clone())).unwrap();
        crate::tariff::compute_fee(
            value,
            &selection,
            SurchargePolicy::ServiceCount,
            &RegulationParams::default(),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::{client, quotation};
    use rust_decimal_macros::dec;

    #[test]
    fn repeated_services_are_linked_once() {
        let mut data = StoreData::default();
        let now = Utc::now();
        let a = data.add_service("Contenzioso", "", None, now).unwrap();
        let b = data.add_service("Famiglia", "", None, now).unwrap();
        let picked = vec![a.clone(), b.clone(), a.clone()];
        let q = quotation(dec!(10000), &[a.clone(), b.clone()]);

        let record = data.save_quote(&client("Rossi"), &picked, &q, now).unwrap();
        assert_eq!(record.service_ids, vec![a.id, b.id]);
    }

    #[test]
    fn exhausted_id_space_is_an_error_not_a_panic() {
        let mut data = StoreData::default();
        let now = Utc::now();
        let mut top = data.add_service("Consulenza", "", None, now).unwrap();
        top.id = u32::MAX;
        data.import_services(vec![top]);

        let err = data.add_service("Contratti", "", None, now).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(data.services.len(), 2);
    }

    #[test]
    fn unique_ids_keeps_first_occurrence_order() {
        assert_eq!(unique_ids([3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(unique_ids([]).is_empty());
    }
}
