//! Site checks run before serving or building.
//!
//! Errors are problems a visitor would see (broken menu data, clashing
//! anchors). Warnings are gaps in metadata or configuration.

use menusite_core::{
    CategoryFilter, ContentBlock, ContentDocument, DataSources, FooterKind, Site,
    is_valid_index_now_key, resolve_categories,
};
use menusite_generator::blocks::section_id;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate_site(site: &Site) -> ValidationReport {
    let mut report = ValidationReport::default();
    let config = &site.config;

    if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
        report.errors.push(format!(
            "site.json: baseURL '{}' must start with http:// or https://",
            config.base_url
        ));
    }
    if config.site_name.trim().is_empty() {
        report.warnings.push("site.json: siteName is empty".to_string());
    }
    if config.metadata.admin_key.as_deref().is_none_or(str::is_empty) {
        report
            .warnings
            .push("site.json: metadata.adminKey not set; admin panel is disabled".to_string());
    }
    if let Some(key) = config
        .metadata
        .index_now_key
        .as_deref()
        .filter(|k| !k.is_empty() && !is_valid_index_now_key(k))
    {
        report.errors.push(format!(
            "site.json: metadata.indexNowKey '{}' must be 8-128 characters of letters, digits or '-'",
            key
        ));
    }
    if config.metadata.index_now_key.as_deref().is_none_or(str::is_empty) {
        report.warnings.push(
            "site.json: metadata.indexNowKey not set; IndexNow submission is disabled".to_string(),
        );
    }
    if !config
        .navigation
        .footer
        .iter()
        .any(|entry| entry.kind == FooterKind::Copyright)
    {
        report
            .warnings
            .push("site.json: footer has no copyright entry".to_string());
    }

    if site.routes.is_empty() {
        report.errors.push("No content documents found".to_string());
    }

    for (path, doc) in site.routes.iter() {
        validate_document(path, doc, &site.data, &mut report);
    }

    report
        .info
        .push(format!("{} routes, {} data sources", site.routes.len(), site.data.len()));

    report
}

fn validate_document(
    path: &str,
    doc: &ContentDocument,
    data: &DataSources,
    report: &mut ValidationReport,
) {
    if doc.metadata.h1.trim().is_empty() && !doc.has_hero() {
        report.warnings.push(format!("{}: no h1 and no hero block", path));
    }
    if doc.metadata.description.trim().is_empty() {
        report.warnings.push(format!("{}: missing description", path));
    }

    let mut anchors = BTreeSet::new();
    let mut claim = |id: String, report: &mut ValidationReport| {
        if !id.is_empty() && !anchors.insert(id.clone()) {
            report
                .errors
                .push(format!("{}: duplicate anchor id '{}'", path, id));
        }
    };

    for block in &doc.content_blocks {
        if let Some(title) = block.toc_title() {
            claim(section_id(title), report);
        }

        match block {
            ContentBlock::Unsupported { kind, reason } => {
                report
                    .warnings
                    .push(format!("{}: unsupported block '{}' ({})", path, kind, reason));
            }
            ContentBlock::DataTable(table) => match resolve_categories(table, data) {
                Ok(categories) => {
                    for (name, _) in &categories {
                        claim(section_id(name), report);
                    }
                    if let Some(CategoryFilter::Only(names)) = &table.categories_filter {
                        for missing in names
                            .iter()
                            .filter(|n| !categories.iter().any(|(name, _)| name == n))
                        {
                            report.warnings.push(format!(
                                "{}: category '{}' not found in menu data",
                                path, missing
                            ));
                        }
                    }
                }
                Err(e) => report.errors.push(format!("{}: {}", path, e)),
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menusite_core::config::ProjectManifest;
    use menusite_core::{RouteTable, SiteConfig};
    use serde_json::{Value, json};
    use std::path::PathBuf;

    fn site(config: Value, pages: Vec<(&str, Value)>, data: DataSources) -> Site {
        let mut routes = RouteTable::new();
        for (path, doc) in pages {
            routes
                .insert(path, serde_json::from_value(doc).unwrap())
                .unwrap();
        }
        Site {
            root: PathBuf::from("."),
            manifest: ProjectManifest::default(),
            config: serde_json::from_value::<SiteConfig>(config).unwrap(),
            routes,
            data,
        }
    }

    fn good_config() -> Value {
        json!({
            "siteName": "Menu Prices",
            "baseURL": "https://menu.example.com",
            "navigation": {"footer": [{"kind": "copyright", "text": "© 2025"}]},
            "metadata": {"adminKey": "admin", "indexNowKey": "abc123def456"}
        })
    }

    fn page(blocks: Value) -> Value {
        json!({
            "metadata": {"h1": "Desserts", "description": "Sweet things"},
            "contentBlocks": blocks
        })
    }

    #[test]
    fn test_clean_site() {
        let site = site(good_config(), vec![("/", page(json!([])))], DataSources::new());
        let report = validate_site(&site);
        assert!(report.is_ok(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.info, vec!["1 routes, 0 data sources"]);
    }

    #[test]
    fn test_unknown_source_is_error() {
        let site = site(
            good_config(),
            vec![(
                "/desserts",
                page(json!([{"type": "dataTable", "data": {"categoriesDataUrl": "missing.json"}}])),
            )],
            DataSources::new(),
        );
        let report = validate_site(&site);
        assert_eq!(
            report.errors,
            vec!["/desserts: Menu data source 'missing.json' not found"]
        );
    }

    #[test]
    fn test_duplicate_anchors() {
        let site = site(
            good_config(),
            vec![(
                "/",
                page(json!([
                    {"type": "faq", "data": {"title": "Cakes", "items": []}},
                    {"type": "dataTable", "data": {"categories": {"Cakes": {"items": []}}}}
                ])),
            )],
            DataSources::new(),
        );
        let report = validate_site(&site);
        assert_eq!(report.errors, vec!["/: duplicate anchor id 'cakes'"]);
    }

    #[test]
    fn test_warnings() {
        let mut data = DataSources::new();
        data.insert(
            "desserts.json",
            serde_json::from_value(json!({"Cakes": {"items": []}})).unwrap(),
        );
        let site = site(
            json!({"siteName": "Menu Prices", "baseURL": "https://menu.example.com"}),
            vec![(
                "/",
                json!({
                    "metadata": {"h1": ""},
                    "contentBlocks": [
                        {"type": "carousel", "data": {}},
                        {"type": "dataTable", "data": {
                            "categoriesDataUrl": "desserts.json",
                            "categoriesFilter": ["Cakes", "Pies"]
                        }}
                    ]
                }),
            )],
            data,
        );

        let report = validate_site(&site);
        assert!(report.is_ok());
        let warnings = report.warnings.join("\n");
        assert!(warnings.contains("adminKey not set"));
        assert!(warnings.contains("indexNowKey not set"));
        assert!(warnings.contains("no copyright entry"));
        assert!(warnings.contains("/: no h1 and no hero block"));
        assert!(warnings.contains("/: missing description"));
        assert!(warnings.contains("unsupported block 'carousel'"));
        assert!(warnings.contains("/: category 'Pies' not found in menu data"));
    }

    #[test]
    fn test_index_now_key_must_be_safe_file_name() {
        for key in ["../../outside", "short", "has/slash-in-it"] {
            let mut config = good_config();
            config["metadata"]["indexNowKey"] = json!(key);
            let site = site(config, vec![("/", page(json!([])))], DataSources::new());
            let report = validate_site(&site);
            assert!(!report.is_ok(), "{} should be rejected", key);
            assert!(report.errors[0].contains("indexNowKey"));
        }
    }

    #[test]
    fn test_bad_base_url() {
        let mut config = good_config();
        config["baseURL"] = json!("menu.example.com");
        let site = site(config, vec![("/", page(json!([])))], DataSources::new());
        assert!(!validate_site(&site).is_ok());
    }
}
