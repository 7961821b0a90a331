//! HTTP surface for a loaded site.

pub mod cache;
mod handlers;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use cache::ResponseCache;
use menusite_core::Site;
use menusite_notifier::Notifier;
use std::sync::Arc;
use tower_http::services::ServeDir;

#[derive(Clone)]
pub struct AppState {
    pub site: Arc<Site>,
    /// `None` when the site has no IndexNow key
    pub notifier: Option<Arc<dyn Notifier>>,
    /// `None` when caching is disabled
    pub cache: Option<ResponseCache>,
}

pub fn router(state: AppState) -> Router {
    let static_dir = state.site.static_dir();

    Router::new()
        .route("/robots.txt", get(handlers::robots))
        .route("/sitemap.xml", get(handlers::sitemap))
        .route("/ads.txt", get(handlers::ads_txt))
        .route("/admin-panel/{key}", get(handlers::admin_panel))
        .route("/api/index-now-submit", post(handlers::submit_urls))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(handlers::page)
        .layer(middleware::from_fn(handlers::log_requests))
        .with_state(state)
}
