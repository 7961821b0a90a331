use crate::error::{Error, Result};
use crate::types::ContentDocument;
use std::collections::BTreeMap;
use std::path::{Component, Path};

/// Outcome of looking up a request path
#[derive(Debug)]
pub enum Resolution<'a> {
    Found {
        path: &'a str,
        document: &'a ContentDocument,
    },
    /// The request differs from a known route only by its trailing slash
    Redirect(String),
    NotFound,
}

/// Normalized path → content document, built once at startup.
///
/// Iteration is ordered by path so sitemap output and build output are stable.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, ContentDocument>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document. The path is normalized; registering the same path twice is an error.
    pub fn insert(&mut self, path: &str, document: ContentDocument) -> Result<()> {
        let normalized = normalize_path(path).to_string();
        if self.routes.contains_key(&normalized) {
            return Err(Error::InvalidData(format!(
                "Duplicate route '{}'",
                normalized
            )));
        }
        self.routes.insert(normalized, document);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&ContentDocument> {
        self.routes.get(path)
    }

    pub fn resolve<'a>(&'a self, request_path: &str) -> Resolution<'a> {
        let normalized = normalize_path(request_path);
        match self.routes.get_key_value(normalized) {
            Some((path, document)) if normalized == request_path => Resolution::Found {
                path: path.as_str(),
                document,
            },
            Some((path, _)) => Resolution::Redirect(path.clone()),
            None => Resolution::NotFound,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentDocument)> {
        self.routes.iter().map(|(p, d)| (p.as_str(), d))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Strip a single trailing slash, leaving `/` untouched
pub fn normalize_path(path: &str) -> &str {
    if path.is_empty() {
        return "/";
    }
    if path.len() > 1
        && let Some(stripped) = path.strip_suffix('/')
    {
        return stripped;
    }
    path
}

/// Derive the route for a content file path relative to the content directory.
///
/// ```text
/// index.json              → /
/// menu-prices.json        → /menu-prices
/// locations/index.json    → /locations
/// locations/downtown.json → /locations/downtown
/// ```
///
/// Returns `None` for anything that is not a `.json` file.
pub fn route_for_content_file(relative: &Path) -> Option<String> {
    if relative.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }

    let mut segments: Vec<String> = Vec::new();
    for component in relative.with_extension("").components() {
        match component {
            Component::Normal(part) => segments.push(part.to_str()?.to_string()),
            _ => return None,
        }
    }

    if segments.last().map(String::as_str) == Some("index") {
        segments.pop();
    }

    Some(format!("/{}", segments.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageMetadata;

    fn doc(h1: &str) -> ContentDocument {
        ContentDocument {
            metadata: PageMetadata {
                h1: h1.to_string(),
                ..Default::default()
            },
            content_blocks: vec![],
        }
    }

    fn table() -> RouteTable {
        let mut routes = RouteTable::new();
        routes.insert("/", doc("Home")).unwrap();
        routes.insert("/desserts", doc("Desserts")).unwrap();
        routes
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/desserts/"), "/desserts");
        assert_eq!(normalize_path("/desserts"), "/desserts");
        assert_eq!(normalize_path("/desserts//"), "/desserts/");
    }

    #[test]
    fn test_resolve_known_route() {
        let routes = table();
        match routes.resolve("/desserts") {
            Resolution::Found { path, document } => {
                assert_eq!(path, "/desserts");
                assert_eq!(document.metadata.h1, "Desserts");
            }
            other => panic!("expected Found, got {:?}", other),
        }
        assert!(matches!(routes.resolve("/"), Resolution::Found { .. }));
    }

    #[test]
    fn test_resolve_trailing_slash_redirects() {
        let routes = table();
        match routes.resolve("/desserts/") {
            Resolution::Redirect(target) => assert_eq!(target, "/desserts"),
            other => panic!("expected Redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_unknown_route() {
        let routes = table();
        assert!(matches!(routes.resolve("/nope"), Resolution::NotFound));
        assert!(matches!(routes.resolve("/nope/"), Resolution::NotFound));
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let mut routes = table();
        let result = routes.insert("/desserts/", doc("Again"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("/desserts"));
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut routes = RouteTable::new();
        routes.insert("/zebra", doc("Z")).unwrap();
        routes.insert("/", doc("Home")).unwrap();
        routes.insert("/apple", doc("A")).unwrap();
        let paths: Vec<_> = routes.paths().collect();
        assert_eq!(paths, vec!["/", "/apple", "/zebra"]);
    }

    #[test]
    fn test_route_for_content_file() {
        assert_eq!(route_for_content_file(Path::new("index.json")).as_deref(), Some("/"));
        assert_eq!(
            route_for_content_file(Path::new("menu-prices.json")).as_deref(),
            Some("/menu-prices")
        );
        assert_eq!(
            route_for_content_file(Path::new("locations/index.json")).as_deref(),
            Some("/locations")
        );
        assert_eq!(
            route_for_content_file(Path::new("locations/downtown.json")).as_deref(),
            Some("/locations/downtown")
        );
        assert_eq!(route_for_content_file(Path::new("notes.md")), None);
    }
}
