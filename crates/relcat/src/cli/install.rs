use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use relcat_catalog::Catalog;
use relcat_install::{InstallError, Installer};
use relcat_resource::Platform;
use serde_json::json;

use super::{InstallArgs, OutputFormat};
use crate::context::Context;

/// Target platform: explicit flags, falling back to this machine.
pub fn target_platform(args: &InstallArgs) -> Platform {
    let local = Platform::local();
    Platform::new(
        args.os.as_deref().unwrap_or(&local.os),
        args.arch.as_deref().unwrap_or(&local.arch),
    )
}

/// Installs the executable, or with `archive_only` saves the verified
/// archive as downloaded.
pub async fn run(
    ctx: &Context,
    catalog: &Catalog,
    args: &InstallArgs,
    archive_only: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    let installer = Installer::over_http(Arc::clone(&ctx.fetcher), ctx.settings.base_url.clone())
        .platform(target_platform(args));
    let version = args.version.as_deref();

    let result = if archive_only {
        installer
            .save_archive(catalog, &args.product, version, &args.dir)
            .await
    } else {
        installer
            .install(catalog, &args.product, version, &args.dir)
            .await
    };

    let installed = match result {
        Ok(installed) => installed,
        Err(InstallError::Lookup(e)) => return Ok(super::query::not_found(&e)),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to install {}", args.product));
        },
    };

    match format {
        OutputFormat::Text => println!(
            "{} {} -> {}",
            installed.build.product,
            installed.build.version,
            installed.path.display()
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "build": installed.build,
                "path": installed.path,
            }))?
        ),
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_target_platform_overrides() {
        let args = InstallArgs {
            product: "terraform".to_string(),
            version: None,
            os:      Some("Windows".to_string()),
            arch:    None,
            dir:     PathBuf::from("."),
        };
        let platform = target_platform(&args);
        assert_eq!(platform.os, "windows");
        assert_eq!(platform.arch, Platform::local().arch);
    }
}
