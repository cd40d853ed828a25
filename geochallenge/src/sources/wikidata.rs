//! Capital city populations from the Wikidata SPARQL endpoint.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use super::{RankSource, SourceContext};
use crate::{
    country::{CountryCode, RankMap},
    error::GeoChallengeResult,
    ranking::{dense_rank, is_rankable, SortOrder},
};

/// Sovereign states (Q6256) with their capital (P36), the capital's
/// population (P1082) and, when known, the state's alpha-3 code (P298).
const CAPITAL_POPULATION_QUERY: &str = r#"
SELECT ?country ?countryLabel ?capital ?capitalLabel ?population ?iso3 WHERE {
  ?country wdt:P31 wd:Q6256 .
  ?country wdt:P36 ?capital .
  ?capital wdt:P1082 ?population .
  OPTIONAL { ?country wdt:P298 ?iso3 . }
  SERVICE wikibase:label { bd:serviceParam wikibase:language "en" }
}
ORDER BY DESC(?population)
LIMIT 200
"#;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<HashMap<String, SparqlValue>>,
}

#[derive(Debug, Deserialize)]
struct SparqlValue {
    value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WikidataCapitals;

impl WikidataCapitals {
    async fn query(&self, ctx: &SourceContext<'_>) -> GeoChallengeResult<SparqlResponse> {
        Ok(ctx
            .client
            .get(&ctx.config.wikidata_endpoint)
            .query(&[("query", CAPITAL_POPULATION_QUERY), ("format", "json")])
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

/// Largest capital population per resolvable country. The graph's own code
/// is preferred, the label is resolved otherwise.
fn capital_populations(
    bindings: &[HashMap<String, SparqlValue>],
    resolve: impl Fn(&str) -> Option<CountryCode>,
) -> BTreeMap<CountryCode, f64> {
    let mut populations: BTreeMap<CountryCode, f64> = BTreeMap::new();
    for binding in bindings {
        let label = binding
            .get("countryLabel")
            .map(|v| v.value.as_str())
            .unwrap_or_default();
        let Some(population) = binding
            .get("population")
            .and_then(|v| v.value.trim().parse::<f64>().ok())
            .filter(|population| is_rankable(*population))
        else {
            debug!("Skipping {label:?}: no usable population");
            continue;
        };
        let code = binding
            .get("iso3")
            .and_then(|v| v.value.parse::<CountryCode>().ok())
            .or_else(|| resolve(label));
        let Some(code) = code else {
            debug!("Skipping {label:?}: unresolved country");
            continue;
        };
        populations
            .entry(code)
            .and_modify(|kept| *kept = kept.max(population))
            .or_insert(population);
    }
    populations
}

impl RankSource for WikidataCapitals {
    fn describe(&self) -> String {
        "Wikidata capital populations".into()
    }

    async fn fetch_ranks(&self, ctx: &SourceContext<'_>) -> GeoChallengeResult<RankMap> {
        let response = self.query(ctx).await?;
        debug!("{} bindings from Wikidata", response.results.bindings.len());
        let populations =
            capital_populations(&response.results.bindings, |label| ctx.resolver.resolve(label));
        Ok(dense_rank(&populations, SortOrder::Descending))
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::{json, Value};

    use super::*;
    use crate::{config::Config, resolver::IdentityResolver};

    fn binding(label: &str, population: &str, iso3: Option<&str>) -> Value {
        let mut binding = json!({
            "country": {"type": "uri", "value": "http://www.wikidata.org/entity/Q1"},
            "countryLabel": {"type": "literal", "xml:lang": "en", "value": label},
            "capitalLabel": {"type": "literal", "xml:lang": "en", "value": "Capital"},
            "population": {
                "datatype": "http://www.w3.org/2001/XMLSchema#decimal",
                "type": "literal",
                "value": population
            }
        });
        if let Some(iso3) = iso3 {
            binding["iso3"] = json!({"type": "literal", "value": iso3});
        }
        binding
    }

    fn sparql_body(bindings: Vec<Value>) -> Value {
        json!({
            "head": {"vars": ["country", "countryLabel", "capital", "capitalLabel", "population", "iso3"]},
            "results": {"bindings": bindings}
        })
    }

    async fn fetch(server: &MockServer) -> GeoChallengeResult<RankMap> {
        let config = Config {
            wikidata_endpoint: server.url("/sparql"),
            ..Config::default()
        };
        let client = reqwest::Client::new();
        let resolver = IdentityResolver::new();
        let ctx = SourceContext {
            client: &client,
            config: &config,
            resolver: &resolver,
        };
        WikidataCapitals.fetch_ranks(&ctx).await
    }

    fn as_strings(ranks: &RankMap) -> Vec<(String, u32)> {
        ranks.iter().map(|(c, r)| (c.to_string(), *r)).collect()
    }

    #[tokio::test]
    async fn capitals_should_rank_by_population_descending() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/sparql")
                    .query_param("format", "json")
                    .query_param_exists("query")
                    .header("accept", SPARQL_RESULTS_JSON);
                then.status(200).json_body(sparql_body(vec![
                    binding("Japan", "13960000", Some("JPN")),
                    binding("France", "2145906", Some("FRA")),
                    binding("DR Congo", "17071000", None),
                ]));
            })
            .await;

        let ranks = fetch(&server).await.unwrap();
        mock.assert_async().await;
        assert_eq!(
            as_strings(&ranks),
            vec![("COD".into(), 1), ("FRA".into(), 3), ("JPN".into(), 2)]
        );
    }

    #[tokio::test]
    async fn malformed_responses_should_fail_the_fetch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/sparql");
                then.status(200).body("<html>rate limited</html>");
            })
            .await;
        assert!(fetch(&server).await.is_err());
    }

    #[test]
    fn graph_codes_should_be_preferred_over_labels() {
        let bindings: Vec<HashMap<String, SparqlValue>> = serde_json::from_value(json!([
            binding("Kingdom of the Netherlands", "931298", Some("NLD")),
            binding("Atlantis", "1000", Some("ATL")),
            binding("Some Label", "500", Some("1234")),
        ]))
        .unwrap();
        let populations = capital_populations(&bindings, |label| {
            (label == "Some Label").then(|| "SWE".parse().unwrap())
        });
        let codes: Vec<String> = populations.keys().map(|c| c.to_string()).collect();
        assert_eq!(codes, vec!["ATL", "NLD", "SWE"]);
    }

    #[test]
    fn unusable_records_should_be_dropped() {
        let bindings: Vec<HashMap<String, SparqlValue>> = serde_json::from_value(json!([
            binding("Atlantis Prime", "1000", None),
            binding("France", "0", Some("FRA")),
            binding("Germany", "n/a", Some("DEU")),
            binding("Italy", "2748109", Some("ITA")),
        ]))
        .unwrap();
        let resolver = IdentityResolver::new();
        let populations = capital_populations(&bindings, |label| resolver.resolve(label));
        assert_eq!(populations.len(), 1);
        assert!(populations.contains_key(&"ITA".parse::<CountryCode>().unwrap()));
    }

    #[test]
    fn repeated_countries_should_keep_the_largest_population() {
        let bindings: Vec<HashMap<String, SparqlValue>> = serde_json::from_value(json!([
            binding("Bolivia", "2000000", Some("BOL")),
            binding("Bolivia", "250000", Some("BOL")),
        ]))
        .unwrap();
        let populations = capital_populations(&bindings, |_| None);
        assert_eq!(
            populations[&"BOL".parse::<CountryCode>().unwrap()],
            2_000_000.0
        );
    }
}
