use serde::{Deserialize, Serialize};

/// Global exercise metadata, as stored in the Catalog tab. Read-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Key the plan and set rows reference
    pub exercise: String,
    pub name: String,
    pub video_url: Option<String>,
    pub default_rest_secs: Option<u32>,
    pub requires_weight: bool,
    pub active: bool,
}
