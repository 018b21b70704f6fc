//! Quote history export (CSV) and service catalogue import (JSON).
//!
//! The export is meant to be easy to consume in spreadsheets; amounts are
//! rounded to cents here, never in the store.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{Quotation, Service, round_cents};
use crate::error::AppError;
use crate::store::StoreData;

/// Write one row per stored quote, oldest first.
pub fn write_quotes_csv(path: &Path, data: &StoreData) -> Result<usize, AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record([
            "id",
            "created_at",
            "client",
            "email",
            "fiscal_code",
            "asset_value",
            "bracket",
            "flow",
            "total",
            "services",
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let mut quotes: Vec<_> = data.quotes.iter().collect();
    quotes.sort_by_key(|q| (q.created_at, q.id));

    for q in &quotes {
        let client = data.clients.iter().find(|c| c.id == q.client_id);
        let flow = match q.quotation {
            Quotation::Itemized(_) => "itemized",
            Quotation::Combined(_) => "combined",
        };
        writer
            .write_record([
                q.id.to_string(),
                q.created_at.to_rfc3339(),
                client.map(|c| c.client.full_name()).unwrap_or_default(),
                client.map(|c| c.client.email.clone()).unwrap_or_default(),
                client.map(|c| c.client.fiscal_code.clone()).unwrap_or_default(),
                round_cents(q.asset_value.value()).to_string(),
                q.quotation.bracket().index.to_string(),
                flow.to_string(),
                round_cents(q.total).to_string(),
                data.service_names(&q.service_ids).join("; "),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(quotes.len())
}

/// Catalogue entry as found in an import file; timestamps are optional.
#[derive(Debug, Deserialize)]
struct ImportedService {
    id: u32,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "file_content")]
    document: Option<String>,
}

/// Read a JSON array of services for `QuoteStore::import_services`.
pub fn read_services_json(path: &Path) -> Result<Vec<Service>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open services JSON '{}': {e}", path.display())))?;
    let imported: Vec<ImportedService> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid services JSON: {e}")))?;

    let now = chrono::Utc::now();
    Ok(imported
        .into_iter()
        .map(|s| Service {
            id: s.id,
            name: s.name,
            description: s.description,
            document: s.document,
            created_at: now,
        })
        .collect())
}
