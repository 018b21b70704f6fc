//! Interactive service picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `tariffa submit` and tick services" UX

use std::io::{self, Write};

use crate::domain::Service;
use crate::error::AppError;

/// Prompt the user to select one or more services from the catalogue.
///
/// Behavior:
/// - list the catalogue, numbered
/// - accept numbers separated by commas or spaces (`1,3 4`)
/// - `q` cancels
pub fn prompt_for_services(services: &[Service]) -> Result<Vec<Service>, AppError> {
    if services.is_empty() {
        return Err(AppError::new(
            2,
            "No services available. Add one with `tariffa services add <name>`.",
        ));
    }

    println!("Available services:");
    for (idx, s) in services.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, s.name);
    }

    loop {
        print!("Select services by number (1-{}), comma separated (q to quit): ", services.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Pass services with `--service-id <id>`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        match parse_selection(input, services.len()) {
            Ok(positions) => return Ok(positions.into_iter().map(|p| services[p].clone()).collect()),
            Err(msg) => println!("{msg}"),
        }
    }
}

/// Parse `1,3 4` into zero-based positions (deduplicated, input order kept).
pub fn parse_selection(input: &str, count: usize) -> Result<Vec<usize>, String> {
    let mut out = Vec::new();
    for token in input.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
        let n: usize = token
            .parse()
            .map_err(|_| format!("'{token}' is not a number."))?;
        if n == 0 || n > count {
            return Err(format!("Selection out of range: {n} (1-{count})."));
        }
        if !out.contains(&(n - 1)) {
            out.push(n - 1);
        }
    }
    if out.is_empty() {
        return Err("Select at least one service.".to_string());
    }
    Ok(out)
}
