//! The quote document handed to the client.
//!
//! Rendered as plain text with a fixed section order: header and date,
//! client data, case information, requested services, cost breakdown.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::domain::{Client, Quotation, RegulationParams};
use crate::error::AppError;
use crate::report::format::{cost_rows, format_bracket_range, format_eur};

const NOT_SPECIFIED: &str = "Non specificato";
const RULE: &str = "------------------------------------------------------------";

#[derive(Debug, Clone)]
pub struct QuoteDocument<'a> {
    pub client: &'a Client,
    pub services: &'a [String],
    pub quotation: &'a Quotation,
    pub params: &'a RegulationParams,
    pub issued_at: DateTime<Local>,
}

impl QuoteDocument<'_> {
    /// `Preventivo_<Cognome>_<Nome>_<YYYYMMDD>.txt`
    pub fn file_name(&self) -> String {
        format!(
            "Preventivo_{}_{}_{}.txt",
            sanitize(&self.client.last_name),
            sanitize(&self.client.first_name),
            self.issued_at.format("%Y%m%d")
        )
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let c = self.client;

        out.push_str("PREVENTIVO SERVIZI LEGALI\n");
        out.push_str(&format!("{:>60}\n", format!("Data: {}", self.issued_at.format("%d/%m/%Y"))));
        out.push_str(RULE);
        out.push_str("\n\nDati del Cliente\n");
        for (label, value) in [
            ("Nome e Cognome", c.full_name()),
            ("Codice Fiscale", c.fiscal_code.clone()),
            ("Email", c.email.clone()),
            ("Telefono", optional(c.phone.as_deref())),
            ("Indirizzo", optional(c.address.as_deref())),
        ] {
            out.push_str(&format!("  {:<18} {value}\n", format!("{label}:")));
        }

        let bracket = self.quotation.bracket();
        out.push_str("\nInformazioni sulla pratica\n");
        out.push_str(&format!(
            "  {:<18} {}\n",
            "Valore del bene:",
            format_eur(self.quotation.asset_value().value())
        ));
        out.push_str(&format!(
            "  {:<18} {} ({})\n",
            "Scaglione:",
            bracket.index,
            format_bracket_range(&bracket)
        ));

        out.push_str("\nServizi richiesti\n");
        if self.services.is_empty() {
            out.push_str("  Nessun servizio selezionato\n");
        }
        for (i, name) in self.services.iter().enumerate() {
            out.push_str(&format!("  {:>2}. {name}\n", i + 1));
        }

        if let Quotation::Itemized(q) = self.quotation {
            out.push_str(&format!(
                "\nDettaglio per servizio (complessità {})\n",
                q.complexity.display_name()
            ));
            for s in &q.services {
                out.push_str(&format!("  {:<40} {:>18}\n", s.service, format_eur(s.breakdown.total)));
            }
        }

        out.push_str("\nDettaglio Costi\n");
        for (label, amount) in cost_rows(&self.quotation.summary(), self.params) {
            out.push_str(&format!("  {:<38} {:>18}\n", format!("{label}:"), format_eur(amount)));
        }
        out.push_str(RULE);
        out.push('\n');
        out
    }
}

/// Write the rendered document under `dir` and return its path.
pub fn write_document(dir: &Path, document: &QuoteDocument<'_>) -> Result<PathBuf, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(4, format!("Failed to create output dir '{}': {e}", dir.display())))?;

    let path = dir.join(document.file_name());
    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create document '{}': {e}", path.display())))?;
    file.write_all(document.render().as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write document: {e}")))?;
    Ok(path)
}

fn optional(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_SPECIFIED.to_string(),
    }
}

fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
