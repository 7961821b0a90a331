use crate::RenderContext;
use crate::escape::html_escape;
use crate::format::absolute_url;
use menusite_core::{FooterEntry, FooterKind, NavItem, PageMetadata, SiteConfig};

/// Meta tags for `<head>`: title, description, canonical, Open Graph, Twitter Card
pub fn head_meta(
    meta: &PageMetadata,
    ctx: &RenderContext,
    path: &str,
    image: Option<&str>,
) -> String {
    let config = ctx.config;
    let title = if meta.page_title().trim().is_empty() {
        config.site_name.as_str()
    } else {
        meta.page_title()
    };
    let canonical = config.canonical_url(path);

    let mut tags = vec![
        r#"<meta charset="UTF-8">"#.to_string(),
        r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#.to_string(),
        format!("<title>{}</title>", html_escape(title)),
        format!(
            r#"<meta name="description" content="{}">"#,
            html_escape(&meta.description)
        ),
    ];

    if let Some(keyword) = meta.core_keyword.as_deref().filter(|k| !k.trim().is_empty()) {
        tags.push(format!(r#"<meta name="keywords" content="{}">"#, html_escape(keyword)));
    }
    if !meta.author.name.trim().is_empty() {
        tags.push(format!(
            r#"<meta name="author" content="{}">"#,
            html_escape(&meta.author.name)
        ));
    }

    tags.push(format!(r#"<link rel="canonical" href="{}">"#, html_escape(&canonical)));
    if let Some(favicon) = config.favicon.as_deref() {
        tags.push(format!(r#"<link rel="icon" href="{}">"#, html_escape(favicon)));
    }

    tags.push(r#"<meta property="og:type" content="website">"#.to_string());
    tags.push(format!(r#"<meta property="og:title" content="{}">"#, html_escape(title)));
    tags.push(format!(
        r#"<meta property="og:description" content="{}">"#,
        html_escape(&meta.description)
    ));
    tags.push(format!(r#"<meta property="og:url" content="{}">"#, html_escape(&canonical)));
    tags.push(format!(
        r#"<meta property="og:site_name" content="{}">"#,
        html_escape(&config.site_name)
    ));

    let image = image
        .or(config.logo_url.as_deref())
        .map(|url| absolute_url(config.base(), url));
    let card = if image.is_some() {
        "summary_large_image"
    } else {
        "summary"
    };
    if let Some(image) = &image {
        tags.push(format!(r#"<meta property="og:image" content="{}">"#, html_escape(image)));
    }

    tags.push(format!(r#"<meta name="twitter:card" content="{}">"#, card));
    tags.push(format!(r#"<meta name="twitter:title" content="{}">"#, html_escape(title)));
    tags.push(format!(
        r#"<meta name="twitter:description" content="{}">"#,
        html_escape(&meta.description)
    ));
    if let Some(image) = &image {
        tags.push(format!(r#"<meta name="twitter:image" content="{}">"#, html_escape(image)));
    }

    tags.join("\n    ")
}

/// Analytics and AdSense loaders, only for the IDs that are configured
pub fn tracking_snippets(config: &SiteConfig) -> String {
    let mut out = String::new();

    if let Some(id) = config.google_analytics_id.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!(
            r#"<script async src="https://www.googletagmanager.com/gtag/js?id={id}"></script>
    <script>
        window.dataLayer = window.dataLayer || [];
        function gtag(){{dataLayer.push(arguments);}}
        gtag('js', new Date());
        gtag('config', '{id}');
    </script>"#,
            id = html_escape(id)
        ));
    }

    if let Some(id) = config.google_adsense_id.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!(
            r#"<script async src="https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js?client={}" crossorigin="anonymous"></script>"#,
            html_escape(id)
        ));
    }

    out
}

/// Site header with one level of submenus
pub fn header(config: &SiteConfig, current_path: &str) -> String {
    let brand_logo = config
        .logo_url
        .as_deref()
        .map(|logo| {
            format!(
                r#"<img src="{}" alt="{}" height="40">"#,
                html_escape(logo),
                html_escape(&config.site_name)
            )
        })
        .unwrap_or_default();

    let items: String = config
        .navigation
        .header
        .iter()
        .map(|item| nav_item(item, current_path))
        .collect();

    format!(
        r#"<header class="site-header">
        <div class="header-inner">
            <a class="brand" href="/">{}<span>{}</span></a>
            <button class="nav-toggle" aria-label="Toggle navigation" aria-expanded="false" aria-controls="site-nav">&#9776;</button>
            <nav id="site-nav" class="site-nav" aria-label="Main">
                <ul class="nav-list">{}</ul>
            </nav>
        </div>
    </header>"#,
        brand_logo,
        html_escape(&config.site_name),
        items
    )
}

fn current_marker(url: &str, current_path: &str) -> &'static str {
    if url == current_path {
        r#" aria-current="page""#
    } else {
        ""
    }
}

fn nav_item(item: &NavItem, current_path: &str) -> String {
    if item.children.is_empty() {
        return format!(
            r#"<li class="nav-item"><a href="{}"{}>{}</a></li>"#,
            html_escape(&item.url),
            current_marker(&item.url, current_path),
            html_escape(&item.text)
        );
    }

    // Grandchildren are ignored; menus are one level deep
    let children: String = item
        .children
        .iter()
        .map(|child| {
            format!(
                r#"<li><a href="{}"{}>{}</a></li>"#,
                html_escape(&child.url),
                current_marker(&child.url, current_path),
                html_escape(&child.text)
            )
        })
        .collect();

    format!(
        r#"<li class="nav-item has-submenu"><a href="{}"{}>{}</a><button class="submenu-toggle" aria-expanded="false" aria-label="Expand {} menu">&#9662;</button><ul class="submenu">{}</ul></li>"#,
        html_escape(&item.url),
        current_marker(&item.url, current_path),
        html_escape(&item.text),
        html_escape(&item.text),
        children
    )
}

/// Footer built from typed entries: links, disclaimer line, copyright line
pub fn footer(entries: &[FooterEntry]) -> String {
    let of_kind = |kind: FooterKind| entries.iter().filter(move |e| e.kind == kind);

    let links: String = of_kind(FooterKind::Link)
        .map(|entry| match entry.url.as_deref() {
            Some(url) => format!(
                r#"<li><a href="{}">{}</a></li>"#,
                html_escape(url),
                html_escape(&entry.text)
            ),
            None => format!("<li><span>{}</span></li>", html_escape(&entry.text)),
        })
        .collect();
    let links = if links.is_empty() {
        String::new()
    } else {
        format!(
            r#"<nav class="footer-links" aria-label="Footer"><ul>{}</ul></nav>"#,
            links
        )
    };

    let disclaimer: String = of_kind(FooterKind::Disclaimer)
        .map(|entry| format!(r#"<p class="footer-disclaimer">{}</p>"#, html_escape(&entry.text)))
        .collect();

    let copyright: String = of_kind(FooterKind::Copyright)
        .map(|entry| format!(r#"<p class="footer-copyright">{}</p>"#, html_escape(&entry.text)))
        .collect();

    format!(
        r#"<footer class="site-footer">
        <div class="footer-inner">
            {}
            {}
            {}
        </div>
    </footer>"#,
        links, disclaimer, copyright
    )
}

/// Scroll-to-top button and the lightbox shell used by gallery and menu images
pub fn page_chrome() -> &'static str {
    r#"<button id="scroll-to-top" class="scroll-to-top" aria-label="Scroll to top">&#8593;</button>
    <div id="lightbox" class="lightbox" role="dialog" aria-modal="true" hidden>
        <button class="lightbox-close" aria-label="Close">&times;</button>
        <img src="" alt="">
        <p class="lightbox-caption"></p>
    </div>"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use menusite_core::DataSources;
    use serde_json::json;

    fn config(extra: serde_json::Value) -> SiteConfig {
        let mut base = json!({
            "siteName": "Menu Prices",
            "baseURL": "https://menu.example.com",
            "navigation": {
                "header": [
                    {"text": "Home", "url": "/"},
                    {"text": "Menus", "url": "/menus", "children": [
                        {"text": "Desserts", "url": "/desserts", "children": [
                            {"text": "Too Deep", "url": "/too-deep"}
                        ]}
                    ]}
                ],
                "footer": [
                    {"kind": "link", "text": "Privacy", "url": "/privacy"},
                    {
                        "kind": "disclaimer",
                        "text": "This website is not affiliated with any restaurant."
                    },
                    {"kind": "copyright", "text": "© 2025 Menu Prices"}
                ]
            }
        });
        if let (Some(target), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                target.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_header_submenu_one_level() {
        let html = header(&config(json!({})), "/desserts");
        assert!(html.contains("has-submenu"));
        assert!(html.contains(r#"<a href="/desserts" aria-current="page">Desserts</a>"#));
        assert!(!html.contains("Too Deep"));
    }

    #[test]
    fn test_footer_uses_explicit_kinds() {
        let html = footer(&config(json!({})).navigation.footer);
        assert!(html.contains(r#"<li><a href="/privacy">Privacy</a></li>"#));
        assert!(html.contains(
            r#"<p class="footer-disclaimer">This website is not affiliated with any restaurant.</p>"#
        ));
        assert!(html.contains(r#"<p class="footer-copyright">© 2025 Menu Prices</p>"#));
    }

    #[test]
    fn test_footer_does_not_sniff_prefixes() {
        let entries = vec![FooterEntry {
            kind: FooterKind::Link,
            text: "© looks like copyright".to_string(),
            url: Some("/about".to_string()),
        }];
        let html = footer(&entries);
        assert!(!html.contains("footer-copyright"));
        assert!(html.contains("© looks like copyright"));
    }

    #[test]
    fn test_tracking_snippets_are_conditional() {
        assert_eq!(tracking_snippets(&config(json!({}))), "");

        let html = tracking_snippets(&config(json!({
            "googleAnalyticsId": "G-TEST123",
            "googleAdsenseId": "ca-pub-42"
        })));
        assert!(html.contains("gtag/js?id=G-TEST123"));
        assert!(html.contains("adsbygoogle.js?client=ca-pub-42"));
    }

    #[test]
    fn test_head_meta() {
        let config = config(json!({"favicon": "/static/favicon.ico"}));
        let data = DataSources::new();
        let ctx = RenderContext::new(&config, &data);
        let meta: PageMetadata = serde_json::from_value(json!({
            "h1": "Dessert Prices",
            "description": "Cakes & pies",
            "coreKeyword": "dessert menu"
        }))
        .unwrap();

        let html = head_meta(&meta, &ctx, "/desserts", Some("/static/cake.webp"));
        assert!(html.contains("<title>Dessert Prices</title>"));
        assert!(html.contains(r#"<meta name="description" content="Cakes &amp; pies">"#));
        assert!(
            html.contains(r#"<link rel="canonical" href="https://menu.example.com/desserts">"#)
        );
        assert!(html.contains(r#"<meta name="keywords" content="dessert menu">"#));
        assert!(html.contains(
            r#"<meta property="og:image" content="https://menu.example.com/static/cake.webp">"#
        ));
        assert!(html.contains(r#"<meta name="twitter:card" content="summary_large_image">"#));
        assert!(html.contains(r#"<link rel="icon" href="/static/favicon.ico">"#));
    }
}
