use anyhow::{Context, Result};
use menusite_core::load_site;
use menusite_notifier::{IndexNowClient, Notifier};
use std::path::PathBuf;

/// Submit every route URL to IndexNow from the command line
pub async fn run(path: PathBuf) -> Result<()> {
    println!("📣 Submitting site to IndexNow...");

    let site = load_site(&path).context("Failed to load site")?;
    let urls = site.route_urls();
    println!("   ✓ Loaded: {} ({} URLs)", site.config.site_name, urls.len());

    let client = IndexNowClient::from_site(&site)?;
    let report = client.submit(&urls).await?;

    println!("\n✅ Submitted {} URLs (HTTP {})", urls.len(), report.status);
    if !report.body.trim().is_empty() {
        println!("   {}", report.body.trim());
    }
    Ok(())
}
