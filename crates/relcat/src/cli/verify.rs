use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use relcat_fetch::HttpManifestSource;
use relcat_verify::IntegrityVerifier;

use super::OutputFormat;
use crate::context::Context;

pub async fn run(ctx: &Context, file: &Path, format: OutputFormat) -> Result<ExitCode> {
    let source = HttpManifestSource::new(Arc::clone(&ctx.fetcher), ctx.settings.base_url.clone());
    IntegrityVerifier::new(source)
        .verify_file(file)
        .await
        .with_context(|| format!("{} failed verification", file.display()))?;

    match format {
        OutputFormat::Text => println!("{}: OK", file.display()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "file": file, "verified": true })
        ),
    }
    Ok(ExitCode::SUCCESS)
}
