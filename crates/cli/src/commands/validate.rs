use anyhow::{Context, Result};
use menusite_core::load_site;
use menusite_validator::{ValidationReport, validate_site};
use std::path::PathBuf;

pub async fn run(path: PathBuf) -> Result<()> {
    println!("🔍 Validating site at: {}", path.display());

    let site = load_site(&path).context("Failed to load site")?;
    println!("✓ {} loaded", site.manifest.site.display());
    println!("  Site: {} ({})", site.config.site_name, site.config.base_url);

    let report = validate_site(&site);
    print_report(&report);

    if !report.is_ok() {
        anyhow::bail!("Validation failed with {} error(s)", report.errors.len());
    }

    println!("\n✅ Site is valid");
    Ok(())
}

/// Shared with `serve` and `build`, which report but do not stop on warnings
pub fn print_report(report: &ValidationReport) {
    for line in &report.info {
        println!("  {}", line);
    }
    for warning in &report.warnings {
        println!("  ⚠ {}", warning);
    }
    for error in &report.errors {
        eprintln!("  ✗ {}", error);
    }
}
