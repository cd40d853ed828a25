//! Merges the per-category rank maps into snapshot entries.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    country::{Category, CountryCode, RankMap},
    registry::Registry,
};

/// Rank written for a category in which a country has no observation: one
/// past the largest plausible number of countries.
pub const SENTINEL_RANK: u32 = 196;

/// Flag key used when the registry knows nothing about a code.
pub const PLACEHOLDER_FLAG: &str = "xx";

/// A rank for each of the eight categories. Absent ranks are kept as `None`
/// and only become `SENTINEL_RANK` when serialized. The published document
/// cannot tell an absent rank from a real rank of `SENTINEL_RANK`, so every
/// published rank reads back as `Some`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Category, u32>",
    into = "BTreeMap<Category, u32>"
)]
pub struct CategoryRanks(BTreeMap<Category, Option<u32>>);

impl CategoryRanks {
    pub fn from_fn<F: FnMut(Category) -> Option<u32>>(mut rank_of: F) -> Self {
        Self(Category::iter().map(|c| (c, rank_of(c))).collect())
    }

    pub fn get(&self, category: Category) -> Option<u32> {
        self.0.get(&category).copied().flatten()
    }

    /// The rank as published, `SENTINEL_RANK` when unranked.
    pub fn published(&self, category: Category) -> u32 {
        self.get(category).unwrap_or(SENTINEL_RANK)
    }
}

impl From<BTreeMap<Category, u32>> for CategoryRanks {
    fn from(value: BTreeMap<Category, u32>) -> Self {
        Self::from_fn(|category| value.get(&category).copied())
    }
}

impl From<CategoryRanks> for BTreeMap<Category, u32> {
    fn from(value: CategoryRanks) -> Self {
        Category::iter().map(|c| (c, value.published(c))).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub name: String,
    pub flag: String,
    pub ranks: CategoryRanks,
}

/// Merges the category rank maps into one entry per country.
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: &'static Registry,
    flag_base_url: String,
}

impl Aggregator {
    pub fn new(flag_base_url: &str) -> Self {
        Self {
            registry: Registry::global(),
            flag_base_url: flag_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn flag_url(&self, flag_code: &str) -> String {
        format!("{}/{flag_code}.png", self.flag_base_url)
    }

    /// Display name and flag; the code itself and the placeholder flag when
    /// the registry has no entry.
    fn entry_metadata(&self, code: &CountryCode) -> (String, String) {
        match self.registry.metadata(code) {
            Some(metadata) => (metadata.name, self.flag_url(&metadata.flag_code)),
            None => {
                debug!("No registry entry for {code}, using placeholder metadata");
                (code.to_string(), self.flag_url(PLACEHOLDER_FLAG))
            }
        }
    }

    /// One entry for every code present in at least one category. Categories
    /// missing from `all_ranks` count as empty.
    pub fn merge(
        &self,
        all_ranks: &BTreeMap<Category, RankMap>,
    ) -> BTreeMap<CountryCode, CountryEntry> {
        let codes: BTreeSet<&CountryCode> = all_ranks.values().flat_map(|r| r.keys()).collect();
        codes
            .into_iter()
            .filter(|code| {
                let well_formed = code.as_str().len() == 3
                    && code.as_str().chars().all(|c| c.is_ascii_uppercase());
                if !well_formed {
                    warn!("Discarding malformed country code {code}");
                }
                well_formed
            })
            .map(|code| {
                let (name, flag) = self.entry_metadata(code);
                let ranks = CategoryRanks::from_fn(|category| {
                    all_ranks
                        .get(&category)
                        .and_then(|ranks| ranks.get(code))
                        .copied()
                });
                (code.clone(), CountryEntry { name, flag, ranks })
            })
            .collect()
    }
}
