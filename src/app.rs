//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads settings and sets up logging
//! - parses CLI arguments
//! - dispatches to the quote workflow, the store or the TUI

use std::path::Path;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ExportArgs, HistoryArgs, QuoteArgs, ServicesCommand, SubmitArgs, TuiArgs};
use crate::config::Settings;
use crate::domain::{Client, ComplexityLevel, Service, SurchargePolicy};
use crate::error::AppError;
use crate::notify::SimulatedMailer;
use crate::report;
use crate::store::{JsonFileStore, QuoteStore, compute_statistics, export, unique_ids};

pub mod pipeline;

/// Entry point for the `tariffa` binary.
pub fn run() -> Result<(), AppError> {
    // `tariffa` and `tariffa -v 10000` behave like `tariffa tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let mut settings = Settings::from_env()?;
    init_logging(&settings.log_filter);
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    debug!(data_dir = %settings.data_dir.display(), "settings loaded");

    match cli.command {
        Command::Quote(args) => handle_quote(args, &settings),
        Command::Submit(args) => handle_submit(args, &settings),
        Command::Services { command } => handle_services(command, &settings),
        Command::History(args) => handle_history(args, &settings),
        Command::Stats => handle_stats(&settings),
        Command::Export(args) => handle_export(args, &settings),
        Command::Brackets => {
            println!("{}", report::format_tariff_table());
            Ok(())
        }
        Command::Tui(args) => handle_tui(args, &settings),
    }
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn store_for(settings: &Settings) -> JsonFileStore {
    JsonFileStore::in_dir(&settings.data_dir)
}

fn handle_quote(args: QuoteArgs, settings: &Settings) -> Result<(), AppError> {
    let policy = args
        .policy
        .resolve(SurchargePolicy::Complexity(ComplexityLevel::Standard));
    let quotation = pipeline::quote(&args.value, &args.services, policy, &settings.params)?;

    if args.json {
        let json = serde_json::to_string_pretty(&quotation)
            .map_err(|e| AppError::new(4, format!("Failed to serialize quotation: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", report::format_quotation(&quotation, &settings.params));
    }
    Ok(())
}

fn handle_submit(args: SubmitArgs, settings: &Settings) -> Result<(), AppError> {
    let mut store = store_for(settings);
    let catalogue = store.list_services()?;

    let services = if args.service_ids.is_empty() {
        crate::cli::picker::prompt_for_services(&catalogue)?
    } else {
        services_by_id(&catalogue, &args.service_ids)?
    };

    let request = pipeline::SubmitRequest {
        asset_value: args.value,
        client: Client {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            fiscal_code: args.fiscal_code,
            address: args.address,
        },
        services,
        policy: args.policy.resolve(SurchargePolicy::ServiceCount),
        out_dir: args.out_dir,
        send: args.send,
    };

    let mailer = SimulatedMailer::new(settings.sender.clone());
    let outcome = pipeline::submit_quote(&mut store, &mailer, &request, &settings.params)?;

    println!("{}", report::format_quotation(&outcome.record.quotation, &settings.params));
    println!("Quote #{} saved.", outcome.record.id);
    println!("Document written to {}", outcome.document_path.display());
    if let Some(delivery) = outcome.delivery {
        println!("{}", delivery.message);
    }
    Ok(())
}

/// Catalogue entries for the given ids, in input order; repeated ids count once.
fn services_by_id(catalogue: &[Service], ids: &[u32]) -> Result<Vec<Service>, AppError> {
    unique_ids(ids.iter().copied())
        .into_iter()
        .map(|id| {
            catalogue
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| AppError::new(2, format!("Unknown service id {id}.")))
        })
        .collect()
}

fn handle_services(command: ServicesCommand, settings: &Settings) -> Result<(), AppError> {
    let mut store = store_for(settings);
    match command {
        ServicesCommand::List => {
            println!("{}", report::format_services(&store.list_services()?));
        }
        ServicesCommand::Add {
            name,
            description,
            document,
        } => {
            let document = document.map(|p| read_attachment(&p)).transpose()?;
            let service = store.add_service(&name, &description, document)?;
            println!("Service #{} '{}' added.", service.id, service.name);
        }
        ServicesCommand::Remove { id } => {
            if store.remove_service(id)? {
                println!("Service #{id} removed.");
            } else {
                warn!(id, "service not found");
                return Err(AppError::new(2, format!("Unknown service id {id}.")));
            }
        }
        ServicesCommand::Import { file } => {
            let services = export::read_services_json(&file)?;
            let n = store.import_services(services)?;
            println!("Imported {n} services from {}.", file.display());
        }
    }
    Ok(())
}

fn read_attachment(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", path.display())))
}

fn handle_history(args: HistoryArgs, settings: &Settings) -> Result<(), AppError> {
    let quotes = store_for(settings).recent_quotes(args.limit)?;
    println!("{}", report::format_recent_quotes(&quotes));
    Ok(())
}

fn handle_stats(settings: &Settings) -> Result<(), AppError> {
    let data = store_for(settings).snapshot()?;
    println!("{}", report::format_statistics(&compute_statistics(&data)));
    Ok(())
}

fn handle_export(args: ExportArgs, settings: &Settings) -> Result<(), AppError> {
    let data = store_for(settings).snapshot()?;
    let n = export::write_quotes_csv(&args.out, &data)?;
    println!("Exported {n} quotes to {}.", args.out.display());
    Ok(())
}

fn handle_tui(args: TuiArgs, settings: &Settings) -> Result<(), AppError> {
    crate::tui::run(args, settings)
}

/// Rewrite argv so `tariffa` defaults to `tariffa tui`.
///
/// Rules:
/// - `tariffa`                      -> `tariffa tui`
/// - `tariffa -v 10000 ...`         -> `tariffa tui -v 10000 ...`
/// - `tariffa --help/--version/-h`  -> unchanged (show top-level help/version)
/// - `tariffa --data-dir DIR`       -> `tariffa tui --data-dir DIR` (global flag)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "quote" | "submit" | "services" | "history" | "stats" | "export" | "brackets" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["tariffa"])), argv(&["tariffa", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["tariffa", "-v", "5000"])),
            argv(&["tariffa", "tui", "-v", "5000"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(
            rewrite_args(argv(&["tariffa", "quote", "-v", "1"])),
            argv(&["tariffa", "quote", "-v", "1"])
        );
        assert_eq!(rewrite_args(argv(&["tariffa", "--help"])), argv(&["tariffa", "--help"]));
    }

    #[test]
    fn unknown_service_id_is_usage_error() {
        let catalogue = vec![Service {
            id: 1,
            name: "Contratti".into(),
            description: String::new(),
            document: None,
            created_at: Utc::now(),
        }];
        assert_eq!(services_by_id(&catalogue, &[1]).unwrap().len(), 1);
        assert_eq!(services_by_id(&catalogue, &[1, 7]).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn repeated_service_ids_select_the_service_once() {
        let service = |id: u32, name: &str| Service {
            id,
            name: name.into(),
            description: String::new(),
            document: None,
            created_at: Utc::now(),
        };
        let catalogue = vec![service(1, "Contenzioso"), service(2, "Contratti")];

        let picked = services_by_id(&catalogue, &[2, 1, 2]).unwrap();
        let ids: Vec<u32> = picked.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let names: Vec<String> = picked.into_iter().map(|s| s.name).collect();
        let q = pipeline::quote("10000", &names, SurchargePolicy::ServiceCount, &Default::default()).unwrap();
        let crate::domain::Quotation::Combined(c) = q else {
            panic!("expected a combined quote");
        };
        assert_eq!(c.multiplier, rust_decimal_macros::dec!(1.2));
    }
}
