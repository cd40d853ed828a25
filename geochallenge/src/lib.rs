use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;
use futures::future::join_all;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    aggregate::Aggregator,
    config::Config,
    country::{Category, CountryCode, RankMap},
    dataset::LocalDatasetLoader,
    registry::{CountryMetadata, Registry},
    resolver::IdentityResolver,
    snapshot::Snapshot,
    sources::{acquire, Provenance, SourceContext},
};

// Modules
pub mod aggregate;
pub mod config;
pub mod country;
pub mod dataset;
pub mod error;
pub mod ranking;
pub mod registry;
pub mod resolver;
pub mod snapshot;
pub mod sources;

/// Outcome of one category in a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub provenance: Provenance,
    pub entries: usize,
}

/// A generated snapshot along with how each category was obtained.
#[derive(Debug, Clone)]
pub struct Generation {
    pub snapshot: Snapshot,
    pub summaries: Vec<CategorySummary>,
}

/// Type for the snapshot generator and its collaborators
pub struct GeoChallenge {
    pub config: Config,
    client: reqwest::Client,
    resolver: IdentityResolver,
    loader: LocalDatasetLoader,
    aggregator: Aggregator,
}

impl GeoChallenge {
    /// Setup the generator with default configuration
    pub fn new() -> Result<Self> {
        Self::new_with_config(Config::default())
    }

    /// Setup the generator with custom configuration
    pub fn new_with_config(config: Config) -> Result<Self> {
        debug!("config: {config:?}");
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            resolver: IdentityResolver::new(),
            loader: LocalDatasetLoader::new(&config.data_dir),
            aggregator: Aggregator::new(&config.flag_base_url),
            config,
        })
    }

    /// Canonical code of a free-text country label
    pub fn resolve(&self, label: &str) -> Option<CountryCode> {
        self.resolver.resolve(label)
    }

    /// Display metadata of a code, as used in snapshot entries
    pub fn metadata(&self, code: &CountryCode) -> Option<CountryMetadata> {
        Registry::global().metadata(code)
    }

    /// Builds a snapshot from every category. Never fails: unavailable
    /// sources degrade to their fallback or to an empty category.
    pub async fn generate(&self) -> Generation {
        let ctx = SourceContext {
            client: &self.client,
            config: &self.config,
            resolver: &self.resolver,
        };
        let acquisitions = join_all(
            Category::iter().map(|category| acquire(category, &ctx, &self.loader)),
        )
        .await;

        let summaries = acquisitions
            .iter()
            .map(|acquisition| {
                info!(
                    "{}: {} countries ({})",
                    acquisition.category,
                    acquisition.ranks.len(),
                    acquisition.provenance
                );
                CategorySummary {
                    category: acquisition.category,
                    provenance: acquisition.provenance,
                    entries: acquisition.ranks.len(),
                }
            })
            .collect();
        let all_ranks: BTreeMap<Category, RankMap> = acquisitions
            .into_iter()
            .map(|acquisition| (acquisition.category, acquisition.ranks))
            .collect();

        let countries = self.aggregator.merge(&all_ranks);
        info!("Merged {} countries", countries.len());
        Generation {
            snapshot: Snapshot::new(countries, Utc::now()),
            summaries,
        }
    }
}
