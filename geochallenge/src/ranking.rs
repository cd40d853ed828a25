//! Turns per-country observations into dense category ranks.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::country::{CountryCode, RankMap};

/// Which end of the value range earns rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Smaller is better.
    Ascending,
    /// Larger is better.
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricObservation {
    pub code: CountryCode,
    pub value: f64,
    /// Observation period as reported by the source, e.g. `"2021"`.
    pub period: Option<String>,
}

/// Only finite, strictly positive values take part in a ranking.
pub fn is_rankable(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Keeps the most recent observation per country. Periods compare as
/// strings, which orders the World Bank's `YYYY` dates correctly; among
/// observations of the same period the first one seen is kept.
pub fn collapse_to_latest<I>(observations: I) -> BTreeMap<CountryCode, f64>
where
    I: IntoIterator<Item = MetricObservation>,
{
    let mut latest: BTreeMap<CountryCode, MetricObservation> = BTreeMap::new();
    for observation in observations {
        let newer = latest
            .get(&observation.code)
            .map_or(true, |kept| observation.period > kept.period);
        if newer {
            latest.insert(observation.code.clone(), observation);
        }
    }
    latest
        .into_iter()
        .map(|(code, observation)| (code, observation.value))
        .collect()
}

/// Ranks 1..=K over the K values, ties broken on the country code so the
/// result does not depend on input order.
pub fn dense_rank(values: &BTreeMap<CountryCode, f64>, order: SortOrder) -> RankMap {
    values
        .iter()
        .sorted_by(|(code_a, a), (code_b, b)| {
            let by_value = match order {
                SortOrder::Ascending => a.total_cmp(b),
                SortOrder::Descending => b.total_cmp(a),
            };
            by_value.then_with(|| code_a.cmp(code_b))
        })
        .zip(1..)
        .map(|((code, _), rank)| (code.clone(), rank))
        .collect()
}
