use crate::config::ProjectManifest;
use crate::data::DataSources;
use crate::routes::RouteTable;
use crate::types::SiteConfig;
use std::path::PathBuf;

/// A fully loaded project. Read-only once constructed.
#[derive(Debug)]
pub struct Site {
    pub root: PathBuf,
    pub manifest: ProjectManifest,
    pub config: SiteConfig,
    pub routes: RouteTable,
    pub data: DataSources,
}

impl Site {
    pub fn static_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.static_dir)
    }

    /// Absolute URL of every route, in route order
    pub fn route_urls(&self) -> Vec<String> {
        self.routes
            .paths()
            .map(|path| self.config.canonical_url(path))
            .collect()
    }
}
