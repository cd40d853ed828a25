//! World Bank indicators API (v2).

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use super::{RankSource, SourceContext};
use crate::{
    country::{CountryCode, RankMap},
    error::{GeoChallengeError, GeoChallengeResult},
    ranking::{collapse_to_latest, dense_rank, is_rankable, MetricObservation, SortOrder},
    registry::Registry,
};

const SOURCE_NAME: &str = "World Bank";
const PER_PAGE: u32 = 500;

/// Aggregates published alongside countries: regions, income groups and
/// lending categories.
pub static REGION_CODES: &[&str] = &[
    "AFE", "AFW", "ARB", "CEB", "CSS", "EAP", "EAR", "EAS", "ECA", "ECS", "EMU", "EUU", "FCS",
    "HIC", "HPC", "IBD", "IBT", "IDA", "IDB", "IDX", "INX", "LAC", "LCN", "LDC", "LIC", "LMC",
    "LMY", "LTE", "MEA", "MIC", "MNA", "NAC", "OED", "OSS", "PRE", "PSS", "PST", "SAS", "SSA",
    "SSF", "SST", "TEA", "TEC", "TLA", "TMN", "TSA", "TSS", "UMC", "WLD",
];

#[derive(Debug, Deserialize)]
struct WorldBankRecord {
    #[serde(default)]
    countryiso3code: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    value: Option<f64>,
}

/// One page of an indicator query: the records and the total page count.
#[derive(Debug)]
struct WorldBankPage {
    records: Vec<WorldBankRecord>,
    pages: u32,
}

/// Reads the `[meta, records]` pair the API answers with. A body without a
/// records element, such as an error message, is an empty page.
fn parse_page(body: Value) -> GeoChallengeResult<WorldBankPage> {
    let Value::Array(mut parts) = body else {
        return Err(GeoChallengeError::UnexpectedResponse {
            source_name: SOURCE_NAME.into(),
            reason: "body is not an array".into(),
        });
    };
    if parts.len() < 2 {
        warn!("{SOURCE_NAME} returned no records: {parts:?}");
        return Ok(WorldBankPage {
            records: vec![],
            pages: 0,
        });
    }
    let records = match parts.swap_remove(1) {
        Value::Null => vec![],
        records => serde_json::from_value(records)?,
    };
    let pages = parts[0]
        .get("pages")
        .and_then(|pages| {
            pages
                .as_u64()
                .or_else(|| pages.as_str().and_then(|s| s.parse().ok()))
        })
        .and_then(|pages| u32::try_from(pages).ok())
        .unwrap_or(1);
    Ok(WorldBankPage { records, pages })
}

/// A single indicator, ranked in the given order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldBankIndicator {
    pub indicator: String,
    pub order: SortOrder,
    /// Restricts the query to one year; otherwise every year is fetched and
    /// the most recent one per country is kept.
    pub year: Option<u32>,
}

impl WorldBankIndicator {
    pub fn new(indicator: &str, order: SortOrder, year: Option<u32>) -> Self {
        Self {
            indicator: indicator.into(),
            order,
            year,
        }
    }

    fn url(&self, base_url: &str, page: u32) -> String {
        let date = self
            .year
            .map(|year| format!("&date={year}"))
            .unwrap_or_default();
        format!(
            "{base_url}/country/all/indicator/{}?format=json&per_page={PER_PAGE}{date}&page={page}",
            self.indicator
        )
    }

    async fn fetch_records(&self, ctx: &SourceContext<'_>) -> GeoChallengeResult<Vec<WorldBankRecord>> {
        let mut records = vec![];
        let mut page = 1;
        loop {
            let url = self.url(&ctx.config.world_bank_base_url, page);
            debug!("Requesting {url}");
            let body: Value = ctx
                .client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            let parsed = parse_page(body)?;
            records.extend(parsed.records);
            if page >= parsed.pages || page >= ctx.config.max_pages {
                break;
            }
            page += 1;
        }
        Ok(records)
    }
}

/// Observations worth ranking: well-formed codes of actual countries with a
/// positive value.
fn observations(records: Vec<WorldBankRecord>) -> Vec<MetricObservation> {
    let registry = Registry::global();
    records
        .into_iter()
        .filter_map(|record| {
            let code: CountryCode = record.countryiso3code?.parse().ok()?;
            if REGION_CODES.contains(&code.as_str()) {
                return None;
            }
            let value = record.value.filter(|value| is_rankable(*value))?;
            if !registry.is_known(&code) {
                debug!("{code} is not in the reference registry, keeping it");
            }
            Some(MetricObservation {
                code,
                value,
                period: record.date,
            })
        })
        .collect()
}

impl RankSource for WorldBankIndicator {
    fn describe(&self) -> String {
        match self.year {
            Some(year) => format!("{SOURCE_NAME} indicator {} ({year})", self.indicator),
            None => format!("{SOURCE_NAME} indicator {}", self.indicator),
        }
    }

    async fn fetch_ranks(&self, ctx: &SourceContext<'_>) -> GeoChallengeResult<RankMap> {
        let records = self.fetch_records(ctx).await?;
        debug!("{} records for {}", records.len(), self.indicator);
        let latest = collapse_to_latest(observations(records));
        Ok(dense_rank(&latest, self.order))
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::{
        config::Config,
        country::Category,
        dataset::LocalDatasetLoader,
        resolver::IdentityResolver,
        sources::{with_fallback, Provenance},
    };

    fn record(code: &str, value: Option<f64>, date: &str) -> Value {
        json!({
            "indicator": {"id": "AG.LND.TOTL.K2", "value": "Land area (sq. km)"},
            "country": {"id": "XX", "value": "Somewhere"},
            "countryiso3code": code,
            "date": date,
            "value": value,
            "unit": "",
            "obs_status": "",
            "decimal": 0
        })
    }

    fn body(pages: u32, records: Vec<Value>) -> Value {
        json!([
            {"page": 1, "pages": pages, "per_page": 500, "total": records.len()},
            records
        ])
    }

    fn config_for(server: &MockServer) -> Config {
        Config {
            world_bank_base_url: server.base_url(),
            ..Config::default()
        }
    }

    async fn fetch(
        server: &MockServer,
        indicator: &WorldBankIndicator,
    ) -> GeoChallengeResult<RankMap> {
        let config = config_for(server);
        let client = reqwest::Client::new();
        let resolver = IdentityResolver::new();
        let ctx = SourceContext {
            client: &client,
            config: &config,
            resolver: &resolver,
        };
        indicator.fetch_ranks(&ctx).await
    }

    fn as_strings(ranks: &RankMap) -> Vec<(String, u32)> {
        ranks.iter().map(|(c, r)| (c.to_string(), *r)).collect()
    }

    #[test]
    fn url_should_include_the_year_when_set() {
        let all_years = WorldBankIndicator::new("NY.GDP.MKTP.CD", SortOrder::Descending, None);
        assert_eq!(
            all_years.url("https://api.worldbank.org/v2", 1),
            "https://api.worldbank.org/v2/country/all/indicator/NY.GDP.MKTP.CD?format=json&per_page=500&page=1"
        );
        let one_year = WorldBankIndicator::new("MS.MIL.TOTL.P1", SortOrder::Descending, Some(2020));
        assert!(one_year.url("http://x", 2).ends_with("&date=2020&page=2"));
    }

    #[test]
    fn error_bodies_should_parse_as_empty_pages() {
        let page = parse_page(json!([{"message": [{"id": "120", "key": "Invalid value"}]}])).unwrap();
        assert!(page.records.is_empty());
        let page = parse_page(json!([{"page": 1, "pages": 1}, null])).unwrap();
        assert!(page.records.is_empty());
        assert!(parse_page(json!({"oops": true})).is_err());
    }

    #[tokio::test]
    async fn smaller_areas_should_rank_first() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/country/all/indicator/AG.LND.TOTL.K2")
                    .query_param("format", "json")
                    .query_param("per_page", "500");
                then.status(200).json_body(body(
                    1,
                    vec![
                        record("SGP", Some(700.0), "2022"),
                        record("LUX", Some(2590.0), "2022"),
                        record("FRA", Some(550_000.0), "2022"),
                    ],
                ));
            })
            .await;

        let indicator = WorldBankIndicator::new("AG.LND.TOTL.K2", SortOrder::Ascending, None);
        let ranks = fetch(&server, &indicator).await.unwrap();
        mock.assert_async().await;
        assert_eq!(
            as_strings(&ranks),
            vec![("FRA".into(), 3), ("LUX".into(), 2), ("SGP".into(), 1)]
        );
    }

    #[tokio::test]
    async fn regions_nulls_and_malformed_codes_should_be_excluded() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/country/all/indicator/NY.GDP.MKTP.CD");
                then.status(200).json_body(body(
                    1,
                    vec![
                        record("WLD", Some(1.0e14), "2022"),
                        record("EUU", Some(1.7e13), "2022"),
                        record("", Some(5.0), "2022"),
                        record("A1", Some(5.0), "2022"),
                        record("DEU", None, "2022"),
                        record("ITA", Some(0.0), "2022"),
                        record("USA", Some(2.5e13), "2022"),
                        record("XKX", Some(9.0e9), "2022"),
                    ],
                ));
            })
            .await;

        let indicator = WorldBankIndicator::new("NY.GDP.MKTP.CD", SortOrder::Descending, None);
        let ranks = fetch(&server, &indicator).await.unwrap();
        assert_eq!(
            as_strings(&ranks),
            vec![("USA".into(), 1), ("XKX".into(), 2)]
        );
    }

    #[tokio::test]
    async fn multi_year_series_should_use_the_latest_year() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/country/all/indicator/NY.GDP.MKTP.CD");
                then.status(200).json_body(body(
                    1,
                    vec![
                        record("FRA", Some(3.0), "2023"),
                        record("FRA", Some(1.0), "2021"),
                        record("DEU", Some(4.0), "2023"),
                        record("DEU", None, "2024"),
                        record("DEU", Some(2.0), "2022"),
                    ],
                ));
            })
            .await;

        let indicator = WorldBankIndicator::new("NY.GDP.MKTP.CD", SortOrder::Descending, None);
        let ranks = fetch(&server, &indicator).await.unwrap();
        assert_eq!(
            as_strings(&ranks),
            vec![("DEU".into(), 1), ("FRA".into(), 2)]
        );
    }

    #[tokio::test]
    async fn pages_should_be_followed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/country/all/indicator/NY.GDP.MKTP.CD")
                    .query_param("page", "1");
                then.status(200)
                    .json_body(body(2, vec![record("FRA", Some(3.0), "2023")]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/country/all/indicator/NY.GDP.MKTP.CD")
                    .query_param("page", "2");
                then.status(200)
                    .json_body(body(2, vec![record("CHN", Some(9.0), "2023")]));
            })
            .await;

        let indicator = WorldBankIndicator::new("NY.GDP.MKTP.CD", SortOrder::Descending, None);
        let ranks = fetch(&server, &indicator).await.unwrap();
        assert_eq!(
            as_strings(&ranks),
            vec![("CHN".into(), 1), ("FRA".into(), 2)]
        );
    }

    #[tokio::test]
    async fn server_errors_should_fail_the_fetch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(503).body("unavailable");
            })
            .await;
        let indicator = WorldBankIndicator::new("NY.GDP.MKTP.CD", SortOrder::Descending, None);
        assert!(fetch(&server, &indicator).await.is_err());
    }

    #[tokio::test]
    async fn empty_response_should_activate_the_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(body(1, vec![]));
            })
            .await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("gdp_fallback.json"),
            r#"{"ranks": {"USA": 1, "CHN": 2}}"#,
        )
        .unwrap();
        let loader = LocalDatasetLoader::new(dir.path());

        let indicator = WorldBankIndicator::new("NY.GDP.MKTP.CD", SortOrder::Descending, None);
        let live = fetch(&server, &indicator).await;
        let acquisition = with_fallback(Category::Gdp, live, Some("gdp_fallback.json"), &loader, 10);
        assert_eq!(acquisition.provenance, Provenance::Fallback);
        assert_eq!(
            as_strings(&acquisition.ranks),
            vec![("CHN".into(), 2), ("USA".into(), 1)]
        );
    }
}
