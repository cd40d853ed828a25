//! Maps free-text country labels onto canonical country codes.

use std::{
    collections::HashMap,
    sync::{LazyLock, Mutex},
};

use itertools::Itertools;
use log::debug;
use unicode_normalization::UnicodeNormalization;

use crate::{country::CountryCode, registry::Registry};

/// Labels the registry search gets wrong or cannot find, as reported by the
/// World Bank, Wikidata and FIFA.
static OVERRIDES: &[(&str, &str)] = &[
    ("United States", "USA"),
    ("United States of America", "USA"),
    ("USA", "USA"),
    ("US", "USA"),
    ("United Kingdom", "GBR"),
    ("UK", "GBR"),
    ("Great Britain", "GBR"),
    ("England", "ENG"),
    ("Scotland", "SCO"),
    ("Wales", "WAL"),
    ("Northern Ireland", "NIR"),
    ("Republic of Ireland", "IRL"),
    ("Russia", "RUS"),
    ("Russian Federation", "RUS"),
    ("South Korea", "KOR"),
    ("Korea, Rep.", "KOR"),
    ("Korea, South", "KOR"),
    ("Korea Republic", "KOR"),
    ("North Korea", "PRK"),
    ("Korea, Dem. People's Rep.", "PRK"),
    ("Korea, North", "PRK"),
    ("Korea DPR", "PRK"),
    ("Iran", "IRN"),
    ("Iran, Islamic Rep.", "IRN"),
    ("IR Iran", "IRN"),
    ("Venezuela", "VEN"),
    ("Venezuela, RB", "VEN"),
    ("Syria", "SYR"),
    ("Syrian Arab Republic", "SYR"),
    ("Egypt", "EGY"),
    ("Egypt, Arab Rep.", "EGY"),
    ("Laos", "LAO"),
    ("Lao PDR", "LAO"),
    ("Myanmar", "MMR"),
    ("Burma", "MMR"),
    ("Czech Republic", "CZE"),
    ("Czechia", "CZE"),
    ("Slovak Republic", "SVK"),
    ("Macedonia", "MKD"),
    ("North Macedonia", "MKD"),
    ("Moldova", "MDA"),
    ("Moldova, Republic of", "MDA"),
    ("Palestine", "PSE"),
    ("West Bank and Gaza", "PSE"),
    ("Yemen", "YEM"),
    ("Yemen, Rep.", "YEM"),
    ("Congo", "COG"),
    ("Congo, Rep.", "COG"),
    ("Republic of the Congo", "COG"),
    ("Congo, Dem. Rep.", "COD"),
    ("DR Congo", "COD"),
    ("Democratic Republic of the Congo", "COD"),
    ("Ivory Coast", "CIV"),
    ("Côte d'Ivoire", "CIV"),
    ("Côte d’Ivoire", "CIV"),
    ("Cote d'Ivoire", "CIV"),
    ("Tanzania", "TZA"),
    ("Tanzania, United Rep. of", "TZA"),
    ("Gambia", "GMB"),
    ("Gambia, The", "GMB"),
    ("The Gambia", "GMB"),
    ("Bahamas", "BHS"),
    ("Bahamas, The", "BHS"),
    ("The Bahamas", "BHS"),
    ("Kyrgyzstan", "KGZ"),
    ("Kyrgyz Republic", "KGZ"),
    ("Turkey", "TUR"),
    ("Türkiye", "TUR"),
    ("Turkiye", "TUR"),
    ("Cape Verde", "CPV"),
    ("Swaziland", "SWZ"),
    ("East Timor", "TLS"),
    ("Vatican City", "VAT"),
    ("Micronesia, Fed. Sts.", "FSM"),
    ("St. Lucia", "LCA"),
    ("St. Kitts and Nevis", "KNA"),
    ("St. Vincent and the Grenadines", "VCT"),
    ("Hong Kong SAR, China", "HKG"),
    ("Macao SAR, China", "MAC"),
    ("Kosovo", "XKX"),
];

/// Override keys in the same normal form as incoming labels.
static OVERRIDE_TABLE: LazyLock<HashMap<String, CountryCode>> = LazyLock::new(|| {
    OVERRIDES
        .iter()
        .filter_map(|(label, code)| Some((normalize(label), code.parse().ok()?)))
        .collect()
});

fn normalize(label: &str) -> String {
    label.trim().nfkd().collect()
}

/// Cleaned-up spellings tried once the label itself failed: without commas,
/// before the first comma and before the first parenthesis.
fn variants(label: &str) -> Vec<String> {
    [
        label.replace(',', ""),
        label.split(',').next().unwrap_or_default().trim().to_string(),
        label.split('(').next().unwrap_or_default().trim().to_string(),
    ]
    .into_iter()
    .filter(|variant| !variant.is_empty() && variant != label)
    .unique()
    .collect()
}

type Strategy = fn(&IdentityResolver, &str) -> Option<CountryCode>;

/// Resolves country labels, first successful strategy wins.
pub struct IdentityResolver {
    registry: &'static Registry,
    cache: Mutex<HashMap<String, Option<CountryCode>>>,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityResolver {
    const STRATEGIES: [Strategy; 3] = [
        IdentityResolver::from_override,
        IdentityResolver::from_registry,
        IdentityResolver::from_variants,
    ];

    pub fn new() -> Self {
        Self {
            registry: Registry::global(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Canonical code for `label`, or `None` when no strategy recognises it.
    pub fn resolve(&self, label: &str) -> Option<CountryCode> {
        let normalized = normalize(label);
        if normalized.is_empty() {
            return None;
        }
        if let Some(cached) = self
            .cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(&normalized).cloned())
        {
            return cached;
        }

        let resolved = Self::STRATEGIES
            .iter()
            .find_map(|strategy| strategy(self, &normalized));
        match &resolved {
            Some(code) => debug!("Resolved {label:?} to {code}"),
            None => debug!("Could not resolve country label {label:?}"),
        }
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(normalized, resolved.clone());
        }
        resolved
    }

    fn from_override(&self, label: &str) -> Option<CountryCode> {
        OVERRIDE_TABLE.get(label).cloned()
    }

    fn from_registry(&self, label: &str) -> Option<CountryCode> {
        self.registry
            .search_fuzzy(label)
            .first()
            .and_then(|record| record.alpha3.parse().ok())
    }

    fn from_variants(&self, label: &str) -> Option<CountryCode> {
        variants(label)
            .iter()
            .find_map(|variant| self.from_registry(variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(label: &str) -> Option<String> {
        IdentityResolver::new()
            .resolve(label)
            .map(|code| code.to_string())
    }

    #[test]
    fn overrides_should_take_precedence() {
        // Fuzzy search would pick the Republic of the Congo for this one.
        assert_eq!(
            Registry::global().search_fuzzy("Congo").first().map(|r| r.alpha3),
            Some("COG")
        );
        assert_eq!(resolve("DR Congo").as_deref(), Some("COD"));
        assert_eq!(resolve("Korea, Rep.").as_deref(), Some("KOR"));
        assert_eq!(resolve("Korea, Dem. People's Rep.").as_deref(), Some("PRK"));
        assert_eq!(resolve("England").as_deref(), Some("ENG"));
    }

    #[test]
    fn override_lookup_should_normalize_the_label() {
        assert_eq!(resolve("  Ivory Coast ").as_deref(), Some("CIV"));
        assert_eq!(resolve("Côte d'Ivoire").as_deref(), Some("CIV"));
        assert_eq!(resolve("Türkiye").as_deref(), Some("TUR"));
    }

    #[test]
    fn registry_should_resolve_plain_names() {
        assert_eq!(resolve("France").as_deref(), Some("FRA"));
        assert_eq!(resolve("People's Republic of China").as_deref(), Some("CHN"));
        assert_eq!(resolve("Kingdom of the Netherlands").as_deref(), Some("NLD"));
        assert_eq!(resolve("São Tomé and Príncipe").as_deref(), Some("STP"));
    }

    #[test]
    fn variants_should_rescue_qualified_names() {
        assert_eq!(
            variants("Micronesia, Federated States (of)"),
            vec![
                "Micronesia Federated States (of)",
                "Micronesia",
                "Micronesia, Federated States"
            ]
        );
        assert_eq!(resolve("Argentina (Republic), fourth").as_deref(), Some("ARG"));
    }

    #[test]
    fn unknown_labels_should_not_resolve() {
        assert_eq!(resolve("Atlantis Prime"), None);
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("   "), None);
    }

    #[test]
    fn resolutions_should_be_memoized() {
        let resolver = IdentityResolver::new();
        assert_eq!(resolver.resolve("France"), resolver.resolve(" France"));
        assert_eq!(resolver.cache.lock().unwrap().len(), 1);
        assert_eq!(resolver.resolve("Atlantis Prime"), None);
        assert_eq!(resolver.cache.lock().unwrap().len(), 2);
    }
}
