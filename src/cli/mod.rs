//! Command-line parsing for the legal fee quotation tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the tariff engine.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ComplexityLevel, SurchargePolicy};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tariffa", version, about = "Legal services fee quotation (value-bracket tariff)")]
pub struct Cli {
    /// Directory holding the quote store (overrides TARIFFA_DATA_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute a quote and print the breakdown (nothing is stored).
    Quote(QuoteArgs),
    /// Compute, store and render a quote for a client.
    Submit(SubmitArgs),
    /// Manage the service catalogue.
    Services {
        #[command(subcommand)]
        command: ServicesCommand,
    },
    /// Show the most recent stored quotes.
    History(HistoryArgs),
    /// Print request statistics per service and per month.
    Stats,
    /// Export the quote history to CSV.
    Export(ExportArgs),
    /// Print the bracket × category base-rate schedule.
    Brackets,
    /// Launch the interactive quote form.
    Tui(TuiArgs),
}

/// How the base fee is surcharged.
#[derive(Debug, Args, Clone)]
pub struct PolicyArgs {
    /// Price every service on its own with this complexity level (itemized quote).
    #[arg(short = 'c', long, value_enum, conflicts_with = "combined")]
    pub complexity: Option<ComplexityLevel>,

    /// Quote all services as one fee with the service-count surcharge.
    #[arg(long)]
    pub combined: bool,
}

impl PolicyArgs {
    /// Policy chosen by the flags, or `default` when neither flag is given.
    pub fn resolve(&self, default: SurchargePolicy) -> SurchargePolicy {
        match (self.complexity, self.combined) {
            (Some(level), _) => SurchargePolicy::Complexity(level),
            (None, true) => SurchargePolicy::ServiceCount,
            (None, false) => default,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct QuoteArgs {
    /// Asset value in euro (e.g. 10000, 10.000,50, 10,000.50).
    #[arg(short = 'v', long, allow_hyphen_values = true)]
    pub value: String,

    /// Service name (repeatable). Names are matched to tariff categories.
    #[arg(short = 's', long = "service", required = true)]
    pub services: Vec<String>,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Print the quotation as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SubmitArgs {
    /// Asset value in euro.
    #[arg(short = 'v', long, allow_hyphen_values = true)]
    pub value: String,

    /// Catalogue service id (repeatable). Without any, an interactive picker is shown.
    #[arg(long = "service-id")]
    pub service_ids: Vec<u32>,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub fiscal_code: String,

    #[arg(long)]
    pub address: Option<String>,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Directory the quote document is written to.
    #[arg(long, default_value = "preventivi")]
    pub out_dir: PathBuf,

    /// Send the document to the client's email address (simulated).
    #[arg(long)]
    pub send: bool,
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    /// List services in the catalogue.
    List,
    /// Add a service.
    Add {
        name: String,
        #[arg(default_value = "")]
        description: String,
        /// Text file attached to the service.
        #[arg(long, value_name = "FILE")]
        document: Option<PathBuf>,
    },
    /// Remove a service (also unlinks it from stored quotes).
    Remove { id: u32 },
    /// Import services from a JSON array (upsert by id).
    Import { file: PathBuf },
}

#[derive(Debug, Args, Clone)]
pub struct HistoryArgs {
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Output CSV path.
    #[arg(long, default_value = "preventivi.csv")]
    pub out: PathBuf,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    /// Initial asset value.
    #[arg(short = 'v', long)]
    pub value: Option<String>,
}
