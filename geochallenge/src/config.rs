use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Endpoints, directories and tuning knobs for a generation run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Root of the World Bank v2 API, without a trailing slash.
    pub world_bank_base_url: String,
    pub wikidata_endpoint: String,
    /// Directory holding the local datasets and the fallback rank maps.
    pub data_dir: PathBuf,
    /// Directory the snapshot documents are written into.
    pub snapshot_dir: PathBuf,
    /// Prefix of flag image URLs; the lowercased alpha-2 code and `.png` are appended.
    pub flag_base_url: String,
    pub request_timeout_secs: u64,
    /// A live source yielding fewer entries than this is replaced by its fallback dataset.
    pub fallback_threshold: usize,
    /// Upper bound on the number of World Bank pages followed for one indicator.
    pub max_pages: u32,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            world_bank_base_url: "https://api.worldbank.org/v2".into(),
            wikidata_endpoint: "https://query.wikidata.org/sparql".into(),
            data_dir: PathBuf::from("data"),
            snapshot_dir: PathBuf::from("snapshot"),
            flag_base_url: "https://flagcdn.com/w80".into(),
            request_timeout_secs: 60,
            fallback_threshold: 10,
            max_pages: 40,
            user_agent: concat!("geochallenge/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}
