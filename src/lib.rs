//! `tariffa` library crate.
//!
//! The binary (`tariffa`) is a thin wrapper around this library so that:
//!
//! - the fee engine is testable without spawning processes
//! - the CLI and the TUI share one quote workflow
//!
//! The engine lives in [`tariff`] and is pure: it never reads configuration,
//! touches the store or logs. Everything else feeds it or presents its output.

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod report;
pub mod store;
pub mod tariff;
pub mod tui;
