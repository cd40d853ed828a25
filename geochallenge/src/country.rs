//! Canonical identifiers shared by every stage of a generation run.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::error::GeoChallengeError;

/// A canonical three letter country identifier, always stored uppercase.
///
/// Covers ISO 3166-1 alpha-3 codes as well as the handful of non-standard
/// codes some sources use (e.g. FIFA's `ENG`). The registry is not consulted
/// here: any well-formed code is accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = GeoChallengeError;

    /// Surrounding whitespace is ignored and lowercase letters are accepted,
    /// anything else must be exactly three ASCII letters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(GeoChallengeError::InvalidCountryCode(s.to_string()))
        }
    }
}

impl TryFrom<String> for CountryCode {
    type Error = GeoChallengeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> Self {
        value.0
    }
}

impl Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rank of every country with an observation in one category, best first.
pub type RankMap = BTreeMap<CountryCode, u32>;

/// The eight categories of the snapshot, in their serialization order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    SmallArea,
    Gdp,
    CapitalPop,
    Military,
    Football,
    Eez,
    Rice,
    Francophones,
}

impl Category {
    /// Human readable label, used for summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Category::SmallArea => "Smallest land area",
            Category::Gdp => "GDP",
            Category::CapitalPop => "Capital population",
            Category::Military => "Armed forces personnel",
            Category::Football => "FIFA ranking",
            Category::Eez => "Exclusive economic zone",
            Category::Rice => "Rice production",
            Category::Francophones => "French speakers",
        }
    }
}
