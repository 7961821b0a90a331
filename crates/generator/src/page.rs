use crate::RenderContext;
use crate::assets::{site_script, stylesheet};
use crate::blocks::render_blocks;
use crate::escape::html_escape;
use crate::layout::{footer, head_meta, header, page_chrome, tracking_snippets};
use crate::schema::{structured_data, structured_data_script};
use menusite_core::{ContentBlock, ContentDocument, PageMetadata};

/// Assemble the full HTML document for the page at normalized `path`
pub fn render_page(doc: &ContentDocument, ctx: &RenderContext, path: &str) -> String {
    let ld_json = structured_data_script(&structured_data(doc, ctx, path));
    let head = head_meta(&doc.metadata, ctx, path, social_image(doc));

    let title_heading = if !doc.has_hero() && !doc.metadata.h1.trim().is_empty() {
        format!(
            r#"<h1 class="page-title">{}</h1>
"#,
            html_escape(&doc.metadata.h1)
        )
    } else {
        String::new()
    };

    shell(
        ctx,
        path,
        &head,
        &ld_json,
        &format!("{}{}", title_heading, render_blocks(doc, ctx)),
    )
}

/// 404 body, rendered inside the normal site chrome
pub fn render_not_found(ctx: &RenderContext) -> String {
    let meta = PageMetadata {
        title: Some(format!("Page Not Found | {}", ctx.config.site_name)),
        description: "The page you requested could not be found.".to_string(),
        ..Default::default()
    };
    let head = format!(
        "{}\n    <meta name=\"robots\" content=\"noindex\">",
        head_meta(&meta, ctx, "/404", None)
    );
    let body = r#"<section class="not-found">
            <h1>Page Not Found</h1>
            <p>Sorry, we couldn't find that page.</p>
            <p><a class="hero-cta" href="/">Back to the home page</a></p>
        </section>"#;

    shell(ctx, "/404", &head, "", body)
}

/// Operator page for triggering an IndexNow submission.
///
/// The admin key is never written into the page; the operator types it in and
/// the script posts it to the submit API.
pub fn render_admin_page(ctx: &RenderContext, route_count: usize) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="robots" content="noindex, nofollow">
    <title>Admin Panel | {site}</title>
    {style}
</head>
<body>
    <main class="container admin-panel">
        <h1>Search Engine Submission</h1>
        <p>{count} pages will be submitted to IndexNow.</p>
        <form id="indexnow-form">
            <label for="admin-key">Admin key</label>
            <input id="admin-key" name="adminKey" type="password" autocomplete="off" required>
            <button type="submit">Submit all pages</button>
        </form>
        <pre id="indexnow-result" aria-live="polite"></pre>
    </main>
    <script>
        document.getElementById('indexnow-form').addEventListener('submit', async function (e) {{
            e.preventDefault();
            var out = document.getElementById('indexnow-result');
            out.textContent = 'Submitting...';
            try {{
                var res = await fetch('/api/index-now-submit', {{
                    method: 'POST',
                    headers: {{ 'Content-Type': 'application/json' }},
                    body: JSON.stringify({{ adminKey: document.getElementById('admin-key').value }})
                }});
                var body = await res.json();
                out.textContent = res.status + ' ' + JSON.stringify(body, null, 2);
            }} catch (err) {{
                out.textContent = 'Request failed: ' + err;
            }}
        }});
    </script>
</body>
</html>
"#,
        site = html_escape(&ctx.config.site_name),
        style = stylesheet(&ctx.config.colors),
        count = route_count
    )
}

/// Hero image first, then the first gallery image
fn social_image(doc: &ContentDocument) -> Option<&str> {
    doc.content_blocks.iter().find_map(|block| match block {
        ContentBlock::Hero(hero) => hero.image_url.as_deref(),
        ContentBlock::ImageGallery(gallery) => gallery.images.first().map(|i| i.url.as_str()),
        _ => None,
    })
}

fn shell(ctx: &RenderContext, path: &str, head: &str, ld_json: &str, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    {head}
    {style}
    {ld_json}
    {tracking}
</head>
<body>
    {header}
    <main class="container">
{main}
    </main>
    {footer}
    {chrome}
    <script>{script}</script>
</body>
</html>
"#,
        head = head,
        style = stylesheet(&ctx.config.colors),
        ld_json = ld_json,
        tracking = tracking_snippets(ctx.config),
        header = header(ctx.config, path),
        main = main,
        footer = footer(&ctx.config.navigation.footer),
        chrome = page_chrome(),
        script = site_script()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use menusite_core::{DataSources, SiteConfig};
    use serde_json::{Value, json};

    fn config() -> SiteConfig {
        serde_json::from_value(json!({
            "siteName": "Menu Prices",
            "baseURL": "https://menu.example.com",
            "metadata": {"adminKey": "s3cret-admin", "indexNowKey": "abc123"}
        }))
        .unwrap()
    }

    fn doc(blocks: Value) -> ContentDocument {
        serde_json::from_value(json!({
            "metadata": {"h1": "Dessert Prices", "description": "All the desserts"},
            "contentBlocks": blocks
        }))
        .unwrap()
    }

    #[test]
    fn test_single_title_and_ld_json() {
        let config = config();
        let data = DataSources::new();
        let ctx = RenderContext::new(&config, &data);
        let html = render_page(&doc(json!([])), &ctx, "/desserts");

        assert_eq!(html.matches("<title>").count(), 1);
        assert_eq!(html.matches(r#"<script type="application/ld+json">"#).count(), 1);
        assert!(html.contains(r#""url":"https://menu.example.com/desserts""#));
        assert!(html.contains(r#"<h1 class="page-title">Dessert Prices</h1>"#));
    }

    #[test]
    fn test_hero_replaces_page_heading() {
        let config = config();
        let data = DataSources::new();
        let ctx = RenderContext::new(&config, &data);
        let html = render_page(
            &doc(json!([{"type": "hero", "data": {"title": "Sweet Treats"}}])),
            &ctx,
            "/desserts",
        );
        assert!(!html.contains("page-title"));
        assert_eq!(html.matches("<h1").count(), 1);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let config = config();
        let mut data = DataSources::new();
        data.insert(
            "desserts.json",
            serde_json::from_value(json!({
                "Cakes": {"items": [{"name": "Cheesecake", "price": 7.5}]},
                "Pies": {"items": [{"name": "Apple Pie", "price": "4"}]}
            }))
            .unwrap(),
        );
        let ctx = RenderContext::new(&config, &data);
        let page = doc(json!([
            {"type": "tableOfContents", "data": {}},
            {"type": "dataTable", "data": {
                "title": "Menu",
                "categoriesDataUrl": "/data/desserts.json"
            }},
            {"type": "faq", "data": {"title": "FAQ", "items": [{"question": "Q", "answer": "A"}]}}
        ]));

        assert_eq!(
            render_page(&page, &ctx, "/desserts"),
            render_page(&page, &ctx, "/desserts")
        );
    }

    #[test]
    fn test_admin_page_never_embeds_key() {
        let config = config();
        let data = DataSources::new();
        let ctx = RenderContext::new(&config, &data);
        let html = render_admin_page(&ctx, 12);

        assert!(!html.contains("s3cret-admin"));
        assert!(html.contains(r#"type="password""#));
        assert!(html.contains("/api/index-now-submit"));
        assert!(html.contains("12 pages"));
    }

    #[test]
    fn test_not_found_page() {
        let config = config();
        let data = DataSources::new();
        let ctx = RenderContext::new(&config, &data);
        let html = render_not_found(&ctx);
        assert!(html.contains("<title>Page Not Found | Menu Prices</title>"));
        assert!(html.contains("noindex"));
    }
}
