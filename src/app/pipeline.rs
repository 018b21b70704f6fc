//! Shared quote workflow behind `tariffa quote` and `tariffa submit`.
//!
//! Keeping this in one place avoids duplicating the core sequence:
//! validate client -> compute quotation -> persist -> render document -> notify
//!
//! The engine runs before anything is written, so a store, document or
//! notification failure can never leave a partially computed quote behind.

use std::path::PathBuf;

use chrono::Local;
use tracing::warn;

use crate::domain::{
    AssetValue, Client, Quotation, QuoteRecord, RegulationParams, Service, ServiceSelection, SurchargePolicy,
    has_valid_email,
};
use crate::error::AppError;
use crate::notify::{Delivery, Notifier};
use crate::report::{QuoteDocument, write_document};
use crate::store::QuoteStore;

/// Everything needed to submit one quote.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub asset_value: String,
    pub client: Client,
    pub services: Vec<Service>,
    pub policy: SurchargePolicy,
    pub out_dir: PathBuf,
    pub send: bool,
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub record: QuoteRecord,
    pub document_path: PathBuf,
    pub delivery: Option<Delivery>,
}

/// Parse the value, compute the quotation and warn about default-category fallbacks.
pub fn quote(
    asset_value: &str,
    service_names: &[String],
    policy: SurchargePolicy,
    params: &RegulationParams,
) -> Result<Quotation, AppError> {
    let asset = AssetValue::parse(asset_value)?;
    let selection = ServiceSelection::new(service_names.iter().cloned())?;
    let quotation = crate::tariff::compute_fee(asset.value(), &selection, policy, params)?;

    for name in quotation.defaulted_services() {
        warn!(service = %name, "no tariff category matched, using default category");
    }
    Ok(quotation)
}

pub fn submit_quote<S, N>(
    store: &mut S,
    notifier: &N,
    request: &SubmitRequest,
    params: &RegulationParams,
) -> Result<SubmitOutcome, AppError>
where
    S: QuoteStore + ?Sized,
    N: Notifier + ?Sized,
{
    request.client.validate()?;

    let names: Vec<String> = request.services.iter().map(|s| s.name.clone()).collect();
    let quotation = quote(&request.asset_value, &names, request.policy, params)?;

    let record = store.save_quote(&request.client, &request.services, &quotation)?;

    let document = QuoteDocument {
        client: &request.client,
        services: &names,
        quotation: &quotation,
        params,
        issued_at: Local::now(),
    };
    let document_path = write_document(&request.out_dir, &document)?;

    let delivery = if request.send && !has_valid_email(&request.client.email) {
        // The quote is already stored and written; only sending is skipped.
        warn!(email = %request.client.email, "malformed email address, document not sent");
        None
    } else if request.send {
        let rendered = document.render();
        Some(notifier.send_quote(&request.client.email, &request.client.full_name(), rendered.as_bytes())?)
    } else {
        None
    };

    Ok(SubmitOutcome {
        record,
        document_path,
        delivery,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::SimulatedMailer;
    use crate::store::{MemoryStore, QuoteStore};
    use rust_decimal_macros::dec;

    fn request(out_dir: PathBuf, services: Vec<Service>, value: &str) -> SubmitRequest {
        SubmitRequest {
            asset_value: value.to_string(),
            client: Client {
                first_name: "Luca".into(),
                last_name: "Bianchi".into(),
                email: "luca@example.it".into(),
                phone: Some("+39 02 1234".into()),
                fiscal_code: "BNCLCU90A01F205Z".into(),
                address: None,
            },
            services,
            policy: SurchargePolicy::ServiceCount,
            out_dir,
            send: true,
        }
    }

    #[test]
    fn submit_persists_renders_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::new();
        let a = store.add_service("Contenzioso", "", None).unwrap();
        let b = store.add_service("Contratti", "", None).unwrap();
        let mailer = SimulatedMailer::new("studio@example.com");

        let req = request(dir.path().to_path_buf(), vec![a, b], "10.000,00");
        let outcome = submit_quote(&mut store, &mailer, &req, &RegulationParams::default()).unwrap();

        assert_eq!(outcome.record.asset_value.value(), dec!(10000));
        // Highest rate (Contenzioso, 1200) × 1.2 for two services.
        assert_eq!(outcome.record.quotation.summary().professional_fee, dec!(1440));
        assert!(outcome.document_path.exists());
        assert!(outcome.delivery.unwrap().simulated);
        assert_eq!(store.recent_quotes(5).unwrap().len(), 1);
    }

    #[test]
    fn invalid_value_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::new();
        let a = store.add_service("Contenzioso", "", None).unwrap();
        let mailer = SimulatedMailer::new("studio@example.com");

        let req = request(dir.path().join("docs"), vec![a], "-100");
        let err = submit_quote(&mut store, &mailer, &req, &RegulationParams::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(store.snapshot().unwrap().quotes.is_empty());
        assert!(!dir.path().join("docs").exists());
    }

    #[test]
    fn malformed_email_saves_but_does_not_send() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::new();
        let a = store.add_service("Famiglia", "", None).unwrap();
        let mailer = SimulatedMailer::new("studio@example.com");

        let mut req = request(dir.path().to_path_buf(), vec![a], "5000");
        req.client.email = "luca-at-example".into();
        let outcome = submit_quote(&mut store, &mailer, &req, &RegulationParams::default()).unwrap();

        assert!(outcome.delivery.is_none());
        assert!(outcome.document_path.exists());
        assert_eq!(store.snapshot().unwrap().quotes.len(), 1);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MemoryStore::new();
        let mailer = SimulatedMailer::new("studio@example.com");
        let req = request(dir.path().to_path_buf(), vec![], "1000");
        let err = submit_quote(&mut store, &mailer, &req, &RegulationParams::default()).unwrap_err();
        assert_eq!(err.message(), "Select at least one service.");
    }
}
