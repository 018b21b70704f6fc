use chrono::Utc;

use crate::domain::{Client, Quotation, QuoteRecord, RecentQuote, Service};
use crate::error::AppError;
use crate::store::{QuoteStore, StoreData};

/// Store that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: StoreData,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuoteStore for MemoryStore {
    fn list_services(&self) -> Result<Vec<Service>, AppError> {
        Ok(self.data.sorted_services())
    }

    fn add_service(
        &mut self,
        name: &str,
        description: &str,
        document: Option<String>,
    ) -> Result<Service, AppError> {
        self.data.add_service(name, description, document, Utc::now())
    }

    fn remove_service(&mut self, id: u32) -> Result<bool, AppError> {
        Ok(self.data.remove_service(id))
    }

    fn import_services(&mut self, services: Vec<Service>) -> Result<usize, AppError> {
        Ok(self.data.import_services(services))
    }

    fn save_quote(
        &mut self,
        client: &Client,
        services: &[Service],
        quotation: &Quotation,
    ) -> Result<QuoteRecord, AppError> {
        self.data.save_quote(client, services, quotation, Utc::now())
    }

    fn recent_quotes(&self, limit: usize) -> Result<Vec<RecentQuote>, AppError> {
        Ok(self.data.recent_quotes(limit))
    }

    fn snapshot(&self) -> Result<StoreData, AppError> {
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{client, quotation};
    use rust_decimal_macros::dec;

    #[test]
    fn services_are_listed_by_name() {
        let mut store = MemoryStore::new();
        store.add_service("Contratti", "Redazione contratti", None).unwrap();
        store.add_service("Consulenza", "Parere legale", None).unwrap();
        let names: Vec<String> = store.list_services().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Consulenza", "Contratti"]);
    }

    #[test]
    fn blank_service_name_is_rejected() {
        let mut store = MemoryStore::new();
        assert_eq!(store.add_service("  ", "x", None).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn removing_a_service_unlinks_it_from_quotes() {
        let mut store = MemoryStore::new();
        let a = store.add_service("Contenzioso", "", None).unwrap();
        let b = store.add_service("Famiglia", "", None).unwrap();
        let services = vec![a.clone(), b.clone()];
        let q = quotation(dec!(10000), &services);
        store.save_quote(&client("Rossi"), &services, &q).unwrap();

        assert!(store.remove_service(a.id).unwrap());
        assert!(!store.remove_service(a.id).unwrap());

        let recent = store.recent_quotes(10).unwrap();
        assert_eq!(recent[0].services, vec!["Famiglia".to_string()]);
        // The stored quotation itself is untouched.
        assert_eq!(recent[0].total, q.total());
    }

    #[test]
    fn recent_quotes_are_newest_first_and_limited() {
        let mut store = MemoryStore::new();
        let s = store.add_service("Consulenza", "", None).unwrap();
        for (i, name) in ["Bianchi", "Verdi", "Neri"].iter().enumerate() {
            let q = quotation(dec!(1000) * rust_decimal::Decimal::from(i + 1), std::slice::from_ref(&s));
            store.save_quote(&client(name), std::slice::from_ref(&s), &q).unwrap();
        }
        let recent = store.recent_quotes(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].client_name, "Mario Neri");
        assert_eq!(recent[1].client_name, "Mario Verdi");
    }

    #[test]
    fn invalid_client_is_not_persisted() {
        let mut store = MemoryStore::new();
        let s = store.add_service("Consulenza", "", None).unwrap();
        let q = quotation(dec!(1000), std::slice::from_ref(&s));
        let mut bad = client("Rossi");
        bad.fiscal_code = String::new();
        assert!(store.save_quote(&bad, std::slice::from_ref(&s), &q).is_err());
        assert!(store.snapshot().unwrap().clients.is_empty());
        assert!(store.snapshot().unwrap().quotes.is_empty());
    }

    #[test]
    fn import_upserts_by_id() {
        let mut store = MemoryStore::new();
        let existing = store.add_service("Consulenza", "old", None).unwrap();
        let mut updated = existing.clone();
        updated.description = "new".into();
        let mut fresh = existing.clone();
        fresh.id = 10;
        fresh.name = "Esecuzione".into();

        assert_eq!(store.import_services(vec![updated, fresh]).unwrap(), 2);
        let services = store.list_services().unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].description, "new");
        assert_eq!(store.add_service("Famiglia", "", None).unwrap().id, 11);
    }
}
