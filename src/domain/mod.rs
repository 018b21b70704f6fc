//! Domain types used throughout the quoting workflow.
//!
//! This module defines:
//!
//! - tariff vocabulary (`ServiceCategory`, `ComplexityLevel`, `ValueBracket`)
//! - engine inputs and outputs (`AssetValue`, `ServiceSelection`, `FeeBreakdown`, `Quotation`)
//! - records owned by the store (`Service`, `Client`, `QuoteRecord`)

pub mod types;

pub use types::*;
