//! Single-file JSON store.
//!
//! The whole `StoreData` document is read for every operation and written
//! back through a temporary file plus rename, so a crash mid-write leaves the
//! previous document intact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::{Client, Quotation, QuoteRecord, RecentQuote, Service};
use crate::error::AppError;
use crate::store::{QuoteStore, StoreData};

pub const STORE_FILE_NAME: &str = "tariffa.json";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `<dir>/tariffa.json`. Nothing is created until the first write.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(STORE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreData, AppError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "store file missing, starting empty");
            return Ok(StoreData::default());
        }
        let file = File::open(&self.path).map_err(|e| {
            AppError::store(format!("Failed to open store '{}': {e}", self.path.display()))
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            AppError::store(format!("Invalid store file '{}': {e}", self.path.display()))
        })
    }

    fn save(&self, data: &StoreData) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::store(format!("Failed to create data dir '{}': {e}", parent.display()))
                })?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        let file = File::create(&tmp)
            .map_err(|e| AppError::store(format!("Failed to create '{}': {e}", tmp.display())))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, data)
            .map_err(|e| AppError::store(format!("Failed to serialize store: {e}")))?;
        writer
            .flush()
            .map_err(|e| AppError::store(format!("Failed to write '{}': {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::store(format!("Failed to replace '{}': {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), "store written");
        Ok(())
    }

    fn update<T>(&self, f: impl FnOnce(&mut StoreData) -> Result<T, AppError>) -> Result<T, AppError> {
        let mut data = self.load()?;
        let out = f(&mut data)?;
        self.save(&data)?;
        Ok(out)
    }
}

impl QuoteStore for JsonFileStore {
    fn list_services(&self) -> Result<Vec<Service>, AppError> {
        Ok(self.load()?.sorted_services())
    }

    fn add_service(
        &mut self,
        name: &str,
        description: &str,
        document: Option<String>,
    ) -> Result<Service, AppError> {
        let service = self.update(|data| data.add_service(name, description, document, Utc::now()))?;
        info!(id = service.id, name = %service.name, "service added");
        Ok(service)
    }

    fn remove_service(&mut self, id: u32) -> Result<bool, AppError> {
        let removed = self.update(|data| Ok(data.remove_service(id)))?;
        if removed {
            info!(id, "service removed");
        }
        Ok(removed)
    }

    fn import_services(&mut self, services: Vec<Service>) -> Result<usize, AppError> {
        let n = self.update(|data| Ok(data.import_services(services)))?;
        info!(count = n, "services imported");
        Ok(n)
    }

    fn save_quote(
        &mut self,
        client: &Client,
        services: &[Service],
        quotation: &Quotation,
    ) -> Result<QuoteRecord, AppError> {
        let record = self.update(|data| data.save_quote(client, services, quotation, Utc::now()))?;
        info!(id = record.id, total = %record.total, "quote saved");
        Ok(record)
    }

    fn recent_quotes(&self, limit: usize) -> Result<Vec<RecentQuote>, AppError> {
        Ok(self.load()?.recent_quotes(limit))
    }

    fn snapshot(&self) -> Result<StoreData, AppError> {
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{client, quotation};
    use rust_decimal_macros::dec;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert!(store.list_services().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn data_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::in_dir(&dir.path().join("nested"));
        let s = store.add_service("Contenzioso", "Cause civili", Some("Modulo".into())).unwrap();
        let q = quotation(dec!(10000), std::slice::from_ref(&s));
        let saved = store.save_quote(&client("Rossi"), std::slice::from_ref(&s), &q).unwrap();

        let reopened = JsonFileStore::in_dir(&dir.path().join("nested"));
        let snapshot = reopened.snapshot().unwrap();
        assert_eq!(snapshot.services, vec![s]);
        assert_eq!(snapshot.quotes, vec![saved]);
        // Decimals round-trip exactly.
        assert_eq!(snapshot.quotes[0].quotation, q);
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE_NAME), "{ not json").unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert_eq!(store.list_services().unwrap_err().exit_code(), 3);
    }
}
