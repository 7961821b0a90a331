use crate::escape::html_escape;
use chrono::NaiveDate;
use menusite_core::{RouteTable, SiteConfig};

pub fn robots_txt(config: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /admin-panel/\nDisallow: /api/\n\nSitemap: {}/sitemap.xml\n",
        config.base()
    )
}

/// One `<url>` per route, sorted by path. Pages without a publish date use `today`.
pub fn sitemap_xml(config: &SiteConfig, routes: &RouteTable, today: NaiveDate) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for (path, doc) in routes.iter() {
        let lastmod = doc.metadata.published_date().unwrap_or(today);
        let priority = if path == "/" { "1.0" } else { "0.8" };
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <priority>{}</priority>\n  </url>\n",
            html_escape(&config.canonical_url(path)),
            lastmod.format("%Y-%m-%d"),
            priority
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use menusite_core::ContentDocument;
    use serde_json::json;

    fn config() -> SiteConfig {
        serde_json::from_value(json!({
            "siteName": "Menu Prices",
            "baseURL": "https://menu.example.com/"
        }))
        .unwrap()
    }

    fn doc(date: Option<&str>) -> ContentDocument {
        serde_json::from_value(json!({
            "metadata": {"h1": "Page", "datePublished": date},
            "contentBlocks": []
        }))
        .unwrap()
    }

    #[test]
    fn test_robots_txt() {
        let robots = robots_txt(&config());
        assert!(robots.starts_with("User-agent: *\nAllow: /\n"));
        assert!(robots.contains("Disallow: /admin-panel/"));
        assert!(robots.contains("Disallow: /api/"));
        assert!(robots.contains("Sitemap: https://menu.example.com/sitemap.xml"));
    }

    #[test]
    fn test_sitemap_sorted_with_priorities() {
        let mut routes = RouteTable::new();
        routes.insert("/zebra-cakes", doc(None)).unwrap();
        routes.insert("/", doc(Some("2025-01-15T08:00:00Z"))).unwrap();
        routes.insert("/apple-pie", doc(Some("2024-11-02"))).unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let xml = sitemap_xml(&config(), &routes, today);

        let root = xml.find("<loc>https://menu.example.com/</loc>").unwrap();
        let apple = xml.find("<loc>https://menu.example.com/apple-pie</loc>").unwrap();
        let zebra = xml.find("<loc>https://menu.example.com/zebra-cakes</loc>").unwrap();
        assert!(root < apple && apple < zebra);

        assert!(xml.contains("<lastmod>2025-01-15</lastmod>\n    <priority>1.0</priority>"));
        assert!(xml.contains("<lastmod>2024-11-02</lastmod>\n    <priority>0.8</priority>"));
        assert!(xml.contains("<lastmod>2025-06-01</lastmod>"));
        assert_eq!(xml.matches("<url>").count(), 3);
    }
}
