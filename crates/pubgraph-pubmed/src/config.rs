//! PubMed fetch configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::record::Pmid;

/// E-utilities efetch endpoint; the identifier is appended verbatim
pub const DEFAULT_BASE_URL: &str =
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi?db=pubmed&retmode=xml&id=";

/// Per-request timeout for uncached fetches
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration for a batch fetch
#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint prefix, identifier appended
    pub base_url: String,
    /// Optional NCBI API key, sent as `&api_key=`
    pub api_key: Option<String>,
    /// One `<id>.xml` per identifier; `None` disables caching
    pub cache_dir: Option<PathBuf>,
    /// Sleep a jittered interval before each uncached request
    pub pace_delays: bool,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            cache_dir: None,
            pace_delays: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Request URL for one identifier
    pub fn url_for(&self, id: Pmid) -> String {
        match &self.api_key {
            Some(key) => format!("{}{id}&api_key={key}", self.base_url),
            None => format!("{}{id}", self.base_url),
        }
    }
}
