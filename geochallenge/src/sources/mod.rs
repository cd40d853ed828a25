//! Live sources and the fallback policy shared by all of them.

use enum_dispatch::enum_dispatch;
use log::{info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::{
    config::Config,
    country::{Category, RankMap},
    dataset::{paths as PATHS, LocalDatasetLoader},
    error::GeoChallengeResult,
    ranking::SortOrder,
    resolver::IdentityResolver,
};

pub mod wikidata;
pub mod world_bank;

pub use wikidata::WikidataCapitals;
pub use world_bank::WorldBankIndicator;

/// Shared collaborators a live source needs to produce its ranks.
pub struct SourceContext<'a> {
    pub client: &'a Client,
    pub config: &'a Config,
    pub resolver: &'a IdentityResolver,
}

/// A live upstream producing a ranked category.
#[allow(async_fn_in_trait)]
#[enum_dispatch]
pub trait RankSource {
    /// Human readable name of the upstream, for logs.
    fn describe(&self) -> String;

    async fn fetch_ranks(&self, ctx: &SourceContext<'_>) -> GeoChallengeResult<RankMap>;
}

#[enum_dispatch(RankSource)]
#[derive(Debug, Clone)]
pub enum LiveSource {
    WorldBank(WorldBankIndicator),
    Wikidata(WikidataCapitals),
}

/// Where a category's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Provenance {
    Live,
    Fallback,
    Local,
    Empty,
}

/// How a category is acquired.
#[derive(Debug, Clone)]
pub enum CategorySource {
    Live {
        source: LiveSource,
        fallback: Option<&'static str>,
    },
    Local(&'static str),
}

impl CategorySource {
    /// The fixed acquisition plan of each category.
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::SmallArea => Self::Live {
                source: WorldBankIndicator::new("AG.LND.TOTL.K2", SortOrder::Ascending, None)
                    .into(),
                fallback: Some(PATHS::SMALL_AREA_FALLBACK),
            },
            Category::Gdp => Self::Live {
                source: WorldBankIndicator::new("NY.GDP.MKTP.CD", SortOrder::Descending, None)
                    .into(),
                fallback: Some(PATHS::GDP_FALLBACK),
            },
            Category::CapitalPop => Self::Live {
                source: WikidataCapitals::default().into(),
                fallback: Some(PATHS::CAPITAL_POP_FALLBACK),
            },
            Category::Military => Self::Live {
                source: WorldBankIndicator::new("MS.MIL.TOTL.P1", SortOrder::Descending, Some(2020))
                    .into(),
                fallback: Some(PATHS::MILITARY_FALLBACK),
            },
            Category::Football => Self::Local(PATHS::FIFA_RANKING),
            Category::Eez => Self::Local(PATHS::EEZ),
            Category::Rice => Self::Local(PATHS::RICE_PRODUCTION),
            Category::Francophones => Self::Local(PATHS::FRANCOPHONES),
        }
    }
}

/// The ranks of one category together with their provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub category: Category,
    pub ranks: RankMap,
    pub provenance: Provenance,
}

impl Acquisition {
    fn new(category: Category, ranks: RankMap, provenance: Provenance) -> Self {
        let provenance = if ranks.is_empty() {
            Provenance::Empty
        } else {
            provenance
        };
        Self {
            category,
            ranks,
            provenance,
        }
    }
}

/// Acquires one category. Never fails: live errors and thin results are
/// replaced by the fallback dataset when one is configured and non-empty.
pub async fn acquire(
    category: Category,
    ctx: &SourceContext<'_>,
    loader: &LocalDatasetLoader,
) -> Acquisition {
    match CategorySource::for_category(category) {
        CategorySource::Local(name) => {
            Acquisition::new(category, loader.load_ranks(name), Provenance::Local)
        }
        CategorySource::Live { source, fallback } => {
            info!("Fetching {category} from {}", source.describe());
            let live = source.fetch_ranks(ctx).await;
            with_fallback(
                category,
                live,
                fallback,
                loader,
                ctx.config.fallback_threshold,
            )
        }
    }
}

/// Applies the fallback policy to the outcome of a live fetch.
pub fn with_fallback(
    category: Category,
    live: GeoChallengeResult<RankMap>,
    fallback: Option<&str>,
    loader: &LocalDatasetLoader,
    threshold: usize,
) -> Acquisition {
    let live = match live {
        Ok(ranks) if ranks.len() >= threshold => {
            return Acquisition::new(category, ranks, Provenance::Live)
        }
        Ok(ranks) => {
            warn!(
                "Only {} countries retrieved for {category}, below the threshold of {threshold}",
                ranks.len()
            );
            ranks
        }
        Err(err) => {
            warn!("Failed to fetch {category}: {err}");
            RankMap::new()
        }
    };
    if let Some(name) = fallback {
        let fallback_ranks = loader.load_ranks(name);
        if !fallback_ranks.is_empty() {
            info!(
                "Using {} countries from fallback dataset {name} for {category}",
                fallback_ranks.len()
            );
            return Acquisition::new(category, fallback_ranks, Provenance::Fallback);
        }
        warn!("Fallback dataset {name} for {category} is empty");
    }
    Acquisition::new(category, live, Provenance::Live)
}
