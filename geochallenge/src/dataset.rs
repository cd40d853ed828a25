//! Local JSON datasets: the four categories without a live source and the
//! fallback rank maps of the live ones.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::{Map, Value};

use crate::{country::RankMap, error::GeoChallengeResult};

/// This module contains the names of the files under the data directory.
pub mod paths {
    pub const FIFA_RANKING: &str = "fifa_ranking.json";
    pub const EEZ: &str = "eez_data.json";
    pub const RICE_PRODUCTION: &str = "rice_production.json";
    pub const FRANCOPHONES: &str = "francophones.json";
    pub const SMALL_AREA_FALLBACK: &str = "small_area_fallback.json";
    pub const GDP_FALLBACK: &str = "gdp_fallback.json";
    pub const CAPITAL_POP_FALLBACK: &str = "capital_pop_fallback.json";
    pub const MILITARY_FALLBACK: &str = "military_fallback.json";
}

/// Key of the rank map inside every dataset document.
const RANKS_KEY: &str = "ranks";

#[derive(Debug, Clone)]
pub struct LocalDatasetLoader {
    data_dir: PathBuf,
}

impl LocalDatasetLoader {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Parsed document, or an empty object when the file is missing or invalid.
    pub fn load(&self, name: &str) -> Value {
        let path = self.data_dir.join(name);
        if !path.exists() {
            warn!("Dataset {name} not found in {}", self.data_dir.display());
            return Value::Object(Map::new());
        }
        match read_json(&path) {
            Ok(document) => {
                info!("Loaded dataset {name}");
                document
            }
            Err(err) => {
                warn!("Failed to load dataset {name}: {err}");
                Value::Object(Map::new())
            }
        }
    }

    /// The rank map stored under `"ranks"` in the named document.
    pub fn load_ranks(&self, name: &str) -> RankMap {
        ranks_from_document(name, &self.load(name))
    }
}

fn read_json(path: &Path) -> GeoChallengeResult<Value> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Entries with a malformed code or a rank that is not a positive integer
/// are skipped.
pub fn ranks_from_document(name: &str, document: &Value) -> RankMap {
    let Some(ranks) = document.get(RANKS_KEY).and_then(Value::as_object) else {
        return RankMap::new();
    };
    ranks
        .iter()
        .filter_map(|(key, rank)| {
            let code = key.parse().ok();
            let rank = rank
                .as_u64()
                .filter(|rank| *rank > 0)
                .and_then(|rank| u32::try_from(rank).ok());
            match (code, rank) {
                (Some(code), Some(rank)) => Some((code, rank)),
                _ => {
                    warn!("Skipping entry {key:?}: {rank:?} in {name}");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::country::CountryCode;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn missing_file_should_load_as_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let loader = LocalDatasetLoader::new(dir.path());
        assert_eq!(loader.load(paths::EEZ), json!({}));
        assert!(loader.load_ranks(paths::EEZ).is_empty());
    }

    #[test]
    fn invalid_json_should_load_as_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), paths::RICE_PRODUCTION, "{\"ranks\": {");
        let loader = LocalDatasetLoader::new(dir.path());
        assert_eq!(loader.load(paths::RICE_PRODUCTION), json!({}));
    }

    #[test]
    fn ranks_should_be_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            paths::FIFA_RANKING,
            r#"{"source": "FIFA", "ranks": {"ARG": 1, "FRA": 2, "ENG": 4}}"#,
        );
        let ranks = LocalDatasetLoader::new(dir.path()).load_ranks(paths::FIFA_RANKING);
        let ranks: Vec<(String, u32)> = ranks.into_iter().map(|(c, r)| (c.into(), r)).collect();
        assert_eq!(
            ranks,
            vec![("ARG".into(), 1), ("ENG".into(), 4), ("FRA".into(), 2)]
        );
    }

    #[test]
    fn malformed_entries_should_be_skipped() {
        let document = json!({"ranks": {"USA": 1, "EU": 2, "CHN": 0, "IND": "3", "BRA": 4.5, "JPN": 5}});
        let ranks = ranks_from_document("test.json", &document);
        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks[&"USA".parse::<CountryCode>().unwrap()], 1);
        assert_eq!(ranks[&"JPN".parse::<CountryCode>().unwrap()], 5);
    }

    #[test]
    fn document_without_ranks_should_yield_nothing() {
        assert!(ranks_from_document("test.json", &json!({"data": []})).is_empty());
        assert!(ranks_from_document("test.json", &json!([1, 2])).is_empty());
    }
}
