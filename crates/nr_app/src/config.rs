use nr_core::ViewConfig;
use nr_fetch::DEFAULT_ENDPOINT;
use nr_storage::{BackendConfig, StorageKind};

/// Runtime settings of one reader session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub endpoint: String,
    /// Category requested when the history yields no recommendation
    pub default_category: Option<String>,
    pub storage: BackendConfig,
    pub view: ViewConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_category: None,
            storage: BackendConfig::new(StorageKind::File),
            view: ViewConfig::default(),
        }
    }
}
