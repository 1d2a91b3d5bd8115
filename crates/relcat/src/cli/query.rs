use std::process::ExitCode;

use anyhow::Result;
use relcat_catalog::{Catalog, LookupError};
use serde_json::json;

use super::OutputFormat;

pub fn list(catalog: &Catalog, format: OutputFormat) -> Result<ExitCode> {
    print_lines(&catalog.list_products(), format)?;
    Ok(ExitCode::SUCCESS)
}

pub fn versions(catalog: &Catalog, product: &str, format: OutputFormat) -> Result<ExitCode> {
    match catalog.list_versions(product) {
        Ok(versions) => {
            print_lines(&versions, format)?;
            Ok(ExitCode::SUCCESS)
        },
        Err(e) => Ok(not_found(&e)),
    }
}

pub fn latest(catalog: &Catalog, product: &str, format: OutputFormat) -> Result<ExitCode> {
    let version = match catalog.latest_version(product) {
        Ok(version) => version,
        Err(e) => return Ok(not_found(&e)),
    };

    match format {
        OutputFormat::Text => println!("{version}"),
        OutputFormat::Json => {
            let product = relcat_catalog::normalize_name(product);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "product": product, "version": version }))?
            );
        },
    }
    Ok(ExitCode::SUCCESS)
}

/// Lookups that find nothing are reported, not raised.
pub fn not_found(e: &LookupError) -> ExitCode {
    eprintln!("{e}");
    ExitCode::FAILURE
}

fn print_lines(lines: &[&str], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => lines.iter().for_each(|line| println!("{line}")),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(lines)?),
    }
    Ok(())
}
