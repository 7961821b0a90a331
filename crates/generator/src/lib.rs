//! HTML, JSON-LD and crawler files for a loaded site.
//!
//! Everything here is a pure function of the site data; the same input always
//! renders byte-identical output.

pub mod assets;
pub mod blocks;
pub mod escape;
pub mod format;
pub mod layout;
pub mod page;
pub mod schema;
pub mod seo;

use menusite_core::{DataSources, Site, SiteConfig};

pub use page::{render_admin_page, render_not_found, render_page};
pub use schema::structured_data;
pub use seo::{robots_txt, sitemap_xml};

/// Shared, read-only inputs every renderer needs
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub data: &'a DataSources,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a SiteConfig, data: &'a DataSources) -> Self {
        Self { config, data }
    }

    pub fn from_site(site: &'a Site) -> Self {
        Self::new(&site.config, &site.data)
    }
}
