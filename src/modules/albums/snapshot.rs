use folio_kernel::settings::Environment;
use serde::Serialize;

use super::models::Album;

/// Static part of the client configuration, fixed at startup.
#[derive(Debug, Clone, Serialize)]
pub struct ClientMeta {
    pub name: String,
    pub version: String,
    pub environment: Environment,
    pub public: bool,
}

impl ClientMeta {
    pub fn new(environment: Environment, public: bool) -> Self {
        Self {
            name: "Folio".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment,
            public,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClientCounts {
    pub albums: usize,
    pub favorites: usize,
}

/// Everything a connected client needs to render its navigation. Published
/// in full on every `config.updated` event.
#[derive(Debug, Clone, Serialize)]
pub struct ClientConfig {
    #[serde(flatten)]
    pub meta: ClientMeta,
    /// Favorite albums ordered by name.
    pub albums: Vec<Album>,
    pub count: ClientCounts,
}
