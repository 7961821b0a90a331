use super::AppState;
use super::cache::{CachedPage, ResponseCache};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use menusite_core::Resolution;
use menusite_generator::{
    RenderContext, render_admin_page, render_not_found, render_page, robots_txt, sitemap_xml,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_XML: &str = "application/xml; charset=utf-8";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    #[serde(default)]
    admin_key: Option<String>,
}

/// Log one line per request: method, path, status, elapsed
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    log::info!(
        "{} {} {} {:?}",
        method,
        path,
        response.status().as_u16(),
        started.elapsed()
    );
    response
}

pub async fn robots(State(state): State<AppState>) -> Response {
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], robots_txt(&state.site.config)).into_response()
}

pub async fn sitemap(State(state): State<AppState>) -> Response {
    let today = chrono::Utc::now().date_naive();
    let xml = sitemap_xml(&state.site.config, &state.site.routes, today);
    ([(header::CONTENT_TYPE, APPLICATION_XML)], xml).into_response()
}

pub async fn ads_txt(State(state): State<AppState>) -> Response {
    match state.site.config.ads_txt.as_deref() {
        Some(body) => ([(header::CONTENT_TYPE, TEXT_PLAIN)], body.to_string()).into_response(),
        None => not_found(&state),
    }
}

pub async fn admin_panel(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    if !admin_key_matches(&state, Some(&key)) {
        return not_found(&state);
    }

    let ctx = RenderContext::from_site(&state.site);
    Html(render_admin_page(&ctx, state.site.routes.len())).into_response()
}

/// Submit every route URL to IndexNow. The key check happens before any outbound call.
pub async fn submit_urls(State(state): State<AppState>, body: Bytes) -> Response {
    let request: SubmitRequest = serde_json::from_slice(&body).unwrap_or_default();
    if !admin_key_matches(&state, request.admin_key.as_deref()) {
        log::warn!("rejected IndexNow submission: bad admin key");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        )
            .into_response();
    }

    let Some(notifier) = state.notifier.as_ref() else {
        log::error!("IndexNow submission requested but no indexNowKey is configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "IndexNow is not configured"})),
        )
            .into_response();
    };

    let urls = state.site.route_urls();
    match notifier.submit(&urls).await {
        Ok(report) => {
            log::info!("submitted {} URLs to IndexNow", urls.len());
            Json(json!({
                "success": true,
                "message": format!("Successfully submitted {} URLs to IndexNow", urls.len()),
                "submittedUrls": urls.len(),
                "apiResponse": report,
            }))
            .into_response()
        }
        Err(e) => {
            log::error!("IndexNow submission failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Everything not matched by a fixed route: key file, pages, redirects, 404
pub async fn page(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let request_path = uri.path();

    if let Some(name) = key_file_name(request_path) {
        return match state.site.config.metadata.index_now_key.as_deref() {
            Some(key) if !key.is_empty() && key == name => {
                ([(header::CONTENT_TYPE, TEXT_PLAIN)], key.to_string()).into_response()
            }
            _ => not_found(&state),
        };
    }

    let (path, document) = match state.site.routes.resolve(request_path) {
        Resolution::Found { path, document } => (path, document),
        Resolution::Redirect(to) => {
            let location = match uri.query() {
                Some(query) => format!("{}?{}", to, query),
                None => to,
            };
            return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response();
        }
        Resolution::NotFound => return not_found(&state),
    };

    let cache = state
        .cache
        .as_ref()
        .filter(|_| ResponseCache::is_cacheable(path));

    if let Some(cache) = cache
        && let Some(cached) = cache.get(path).await
    {
        log::debug!("cache hit {}", path);
        return cached_response(&cached, &headers);
    }

    let ctx = RenderContext::from_site(&state.site);
    let page = CachedPage::new(render_page(document, &ctx, path));
    let response = cached_response(&page, &headers);

    if let Some(cache) = cache {
        cache.store(path.to_string(), page);
    }

    response
}

fn cached_response(page: &CachedPage, headers: &HeaderMap) -> Response {
    let etag = HeaderValue::from_str(&page.etag).ok();

    let unchanged = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == page.etag);

    let mut response = if unchanged {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        Html(page.body.to_string()).into_response()
    };
    if let Some(etag) = etag {
        response.headers_mut().insert(header::ETAG, etag);
    }
    response
}

fn not_found(state: &AppState) -> Response {
    let ctx = RenderContext::from_site(&state.site);
    (StatusCode::NOT_FOUND, Html(render_not_found(&ctx))).into_response()
}

fn admin_key_matches(state: &AppState, supplied: Option<&str>) -> bool {
    match (state.site.config.metadata.admin_key.as_deref(), supplied) {
        (Some(expected), Some(supplied)) => !expected.is_empty() && expected == supplied,
        _ => false,
    }
}

/// `/<name>.txt` at the site root
fn key_file_name(path: &str) -> Option<&str> {
    let name = path.strip_prefix('/')?.strip_suffix(".txt")?;
    if name.is_empty() || name.contains('/') {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_file_name() {
        assert_eq!(key_file_name("/abc123.txt"), Some("abc123"));
        assert_eq!(key_file_name("/nested/abc123.txt"), None);
        assert_eq!(key_file_name("/.txt"), None);
        assert_eq!(key_file_name("/desserts"), None);
    }
}
