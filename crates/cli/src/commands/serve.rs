use anyhow::{Context, Result};
use menusite_core::load_site;
use menusite_notifier::{IndexNowClient, Notifier};
use menusite_validator::validate_site;
use std::path::PathBuf;
use std::sync::Arc;

use super::validate::print_report;
use crate::server::{AppState, cache::ResponseCache, router};

/// Load the site once and serve it until interrupted.
///
/// Content is read at startup only; restart to pick up edits.
pub async fn run(path: PathBuf, host: String, port: u16, no_cache: bool) -> Result<()> {
    println!("🍽  Starting menusite server...");
    println!("   Site: {}", path.display());

    let site = load_site(&path).context("Failed to load site")?;
    println!("   ✓ Loaded: {}", site.config.site_name);
    println!("   ✓ Routes: {}", site.routes.len());
    println!("   ✓ Data sources: {}", site.data.len());

    let report = validate_site(&site);
    if !report.warnings.is_empty() || !report.errors.is_empty() {
        print_report(&report);
    }

    let notifier: Option<Arc<dyn Notifier>> = match IndexNowClient::from_site(&site) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            log::warn!("IndexNow disabled: {:#}", e);
            None
        }
    };

    let state = AppState {
        site: Arc::new(site),
        notifier,
        cache: (!no_cache).then(ResponseCache::new),
    };
    if no_cache {
        println!("   ✓ Response cache disabled");
    }

    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Serving at: http://{}", addr);
    println!("   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    println!("\n👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for Ctrl+C: {}", e);
    }
}
