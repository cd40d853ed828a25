//! The persisted snapshot document.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{aggregate::CountryEntry, country::CountryCode, error::GeoChallengeResult};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SnapshotMeta {
    /// Generation month, `YYYY-MM`.
    pub season: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub meta: SnapshotMeta,
    pub countries: BTreeMap<CountryCode, CountryEntry>,
}

impl Snapshot {
    pub fn new(countries: BTreeMap<CountryCode, CountryEntry>, generated_at: DateTime<Utc>) -> Self {
        Self {
            meta: SnapshotMeta {
                season: generated_at.format("%Y-%m").to_string(),
                generated_at,
            },
            countries,
        }
    }

    pub fn file_name(&self) -> String {
        format!("snapshot-{}.json", self.meta.season)
    }

    /// Writes the snapshot as pretty JSON into `dir`, creating it if needed,
    /// and returns the path written. An existing snapshot for the same
    /// season is replaced.
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> GeoChallengeResult<PathBuf> {
        std::fs::create_dir_all(&dir)?;
        let path = dir.as_ref().join(self.file_name());
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!("Wrote snapshot with {} countries to {}", self.countries.len(), path.display());
        Ok(path)
    }

    /// Reads a written snapshot back. Ranks equal to the sentinel come back
    /// as real ranks.
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> GeoChallengeResult<Self> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}
