pub mod config;
pub mod data;
pub mod error;
pub mod merge;
pub mod routes;
pub mod site;
pub mod types;

pub use config::load_site;
pub use data::{CategoryLookupError, DataSources, resolve_categories};
pub use error::{Error, Result};
pub use routes::{Resolution, RouteTable, normalize_path};
pub use site::Site;
pub use types::*;
