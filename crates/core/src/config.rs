use crate::data::{DataSources, parse_data_source};
use crate::error::{Error, Result};
use crate::routes::{RouteTable, route_for_content_file};
use crate::site::Site;
use crate::types::{ContentDocument, SiteConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Name of the project manifest at the project root
pub const MANIFEST_FILE: &str = "menusite.toml";

/// Default IndexNow submission endpoint
pub const DEFAULT_INDEXNOW_ENDPOINT: &str = "https://api.indexnow.org/indexnow";

/// Raw TOML manifest; every field is optional
#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    paths: RawPaths,
    #[serde(default)]
    indexnow: RawIndexNow,
}

#[derive(Debug, Default, Deserialize)]
struct RawPaths {
    site: Option<String>,
    content: Option<String>,
    data: Option<String>,
    #[serde(rename = "static")]
    static_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawIndexNow {
    endpoint: Option<String>,
}

/// Validated project manifest. Paths are relative to the project root.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectManifest {
    pub site: PathBuf,
    pub content: PathBuf,
    pub data: PathBuf,
    pub static_dir: PathBuf,
    pub indexnow_endpoint: String,
}

impl Default for ProjectManifest {
    fn default() -> Self {
        Self {
            site: PathBuf::from("site.json"),
            content: PathBuf::from("content"),
            data: PathBuf::from("data"),
            static_dir: PathBuf::from("static"),
            indexnow_endpoint: DEFAULT_INDEXNOW_ENDPOINT.to_string(),
        }
    }
}

/// Parse a manifest from a string (useful for testing)
pub fn parse_manifest_str(content: &str) -> Result<ProjectManifest> {
    let raw: RawManifest = toml::from_str(content)?;
    let defaults = ProjectManifest::default();

    let pick = |value: Option<String>, default: PathBuf, field: &str| -> Result<PathBuf> {
        match value {
            Some(v) => validate_path(&v, field),
            None => Ok(default),
        }
    };

    Ok(ProjectManifest {
        site: pick(raw.paths.site, defaults.site, "paths.site")?,
        content: pick(raw.paths.content, defaults.content, "paths.content")?,
        data: pick(raw.paths.data, defaults.data, "paths.data")?,
        static_dir: pick(raw.paths.static_dir, defaults.static_dir, "paths.static")?,
        indexnow_endpoint: raw
            .indexnow
            .endpoint
            .unwrap_or(defaults.indexnow_endpoint),
    })
}

/// Read `menusite.toml` from a project root, falling back to defaults when absent
pub fn load_manifest(root: &Path) -> Result<ProjectManifest> {
    let path = root.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(ProjectManifest::default());
    }
    parse_manifest_str(&fs::read_to_string(path)?)
}

/// Parse `site.json` from a string
pub fn parse_site_config_str(content: &str) -> Result<SiteConfig> {
    serde_json::from_str(content).map_err(|e| Error::json("site config", e))
}

/// Load the whole project: manifest, site config, content routes and menu data.
///
/// Everything returned is immutable for the lifetime of the process.
pub fn load_site<P: AsRef<Path>>(root: P) -> Result<Site> {
    let root = root.as_ref().to_path_buf();
    if !root.is_dir() {
        return Err(Error::ConfigParse(format!(
            "Project directory does not exist: {}",
            root.display()
        )));
    }

    let manifest = load_manifest(&root)?;

    let site_path = root.join(&manifest.site);
    let site_json = fs::read_to_string(&site_path).map_err(|e| {
        Error::ConfigParse(format!("Cannot read {}: {}", site_path.display(), e))
    })?;
    let config: SiteConfig = serde_json::from_str(&site_json)
        .map_err(|e| Error::json(site_path.display().to_string(), e))?;

    let routes = load_routes(&root.join(&manifest.content))?;
    let data = load_data_sources(&root.join(&manifest.data))?;

    log::info!(
        "loaded site '{}': {} routes, {} menu data sources",
        config.site_name,
        routes.len(),
        data.len()
    );

    Ok(Site {
        root,
        manifest,
        config,
        routes,
        data,
    })
}

/// Build the route table from every `.json` file under the content directory
pub fn load_routes(content_dir: &Path) -> Result<RouteTable> {
    if !content_dir.is_dir() {
        return Err(Error::ConfigParse(format!(
            "Content directory does not exist: {}",
            content_dir.display()
        )));
    }

    let mut routes = RouteTable::new();
    for (relative, path) in json_files(content_dir) {
        let Some(route) = route_for_content_file(&relative) else {
            continue;
        };
        let text = fs::read_to_string(&path)?;
        let document: ContentDocument = serde_json::from_str(&text)
            .map_err(|e| Error::json(path.display().to_string(), e))?;
        log::debug!("route {} ← {}", route, relative.display());
        routes.insert(&route, document)?;
    }
    Ok(routes)
}

/// Load every menu data file under the data directory. A missing directory yields no sources.
pub fn load_data_sources(data_dir: &Path) -> Result<DataSources> {
    let mut sources = DataSources::new();
    if !data_dir.is_dir() {
        return Ok(sources);
    }

    for (relative, path) in json_files(data_dir) {
        let key = relative.to_string_lossy().replace('\\', "/");
        let text = fs::read_to_string(&path)?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| Error::json(path.display().to_string(), e))?;
        sources.insert(&key, parse_data_source(&key, value)?);
    }
    Ok(sources)
}

/// `.json` files under `dir`, sorted, as (relative path, full path)
fn json_files(dir: &Path) -> Vec<(PathBuf, PathBuf)> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("json"))
        .filter_map(|e| {
            let relative = e.path().strip_prefix(dir).ok()?.to_path_buf();
            Some((relative, e.path().to_path_buf()))
        })
        .collect()
}

/// Validate and convert a manifest path string to PathBuf.
///
/// Rejects absolute paths and parent directory references so a manifest can
/// only point inside its own project directory.
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    let path = Path::new(path_str);

    if path.is_absolute() || path_str.starts_with('/') {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    if path.components().any(|c| c == Component::ParentDir) {
        return Err(Error::ConfigParse(format!(
            "Parent directory references (..) not allowed in '{}': '{}'",
            field_name, path_str
        )));
    }

    Ok(path.to_path_buf())
}
