//! Embedded ISO 3166-1 reference registry.
//!
//! Offers exact alpha-3 lookup for display metadata and a fuzzy name search
//! used by the identity resolver.

use std::{collections::BTreeMap, sync::LazyLock};

use itertools::Itertools;
use log::debug;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::country::CountryCode;

/// Score of a query equal to a code or a folded name.
const EXACT_MATCH_POINTS: u32 = 50;
/// Minimum Jaro-Winkler similarity for a misspelt name to count as a candidate.
const SIMILARITY_THRESHOLD: f64 = 0.92;

#[derive(Debug, PartialEq, Eq)]
pub struct CountryRecord {
    pub alpha2: &'static str,
    pub alpha3: &'static str,
    pub name: &'static str,
    pub official_name: Option<&'static str>,
    pub common_name: Option<&'static str>,
}

impl CountryRecord {
    /// Preferred display name: the common name when the ISO name is bureaucratic.
    pub fn display_name(&self) -> &'static str {
        self.common_name.unwrap_or(self.name)
    }

    fn names(&self) -> impl Iterator<Item = &'static str> {
        [Some(self.name), self.official_name, self.common_name]
            .into_iter()
            .flatten()
    }
}

/// Codes used by individual sources that ISO 3166-1 does not assign.
#[derive(Debug, PartialEq, Eq)]
pub struct NonStandardCode {
    pub code: &'static str,
    pub name: &'static str,
    /// Flag image key understood by the flag CDN.
    pub flag_code: &'static str,
}

/// Display metadata attached to every snapshot entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryMetadata {
    pub name: String,
    pub flag_code: String,
}

const fn record(
    alpha2: &'static str,
    alpha3: &'static str,
    name: &'static str,
    official_name: Option<&'static str>,
    common_name: Option<&'static str>,
) -> CountryRecord {
    CountryRecord {
        alpha2,
        alpha3,
        name,
        official_name,
        common_name,
    }
}

pub static NON_STANDARD_CODES: &[NonStandardCode] = &[
    NonStandardCode {
        code: "ENG",
        name: "England",
        flag_code: "gb-eng",
    },
    NonStandardCode {
        code: "SCO",
        name: "Scotland",
        flag_code: "gb-sct",
    },
    NonStandardCode {
        code: "WAL",
        name: "Wales",
        flag_code: "gb-wls",
    },
    NonStandardCode {
        code: "NIR",
        name: "Northern Ireland",
        flag_code: "gb-nir",
    },
    NonStandardCode {
        code: "XKX",
        name: "Kosovo",
        flag_code: "xk",
    },
];

pub static COUNTRIES: &[CountryRecord] = &[
    record("AW", "ABW", "Aruba", None, None),
    record("AF", "AFG", "Afghanistan", Some("Islamic Republic of Afghanistan"), None),
    record("AO", "AGO", "Angola", Some("Republic of Angola"), None),
    record("AI", "AIA", "Anguilla", None, None),
    record("AX", "ALA", "Åland Islands", None, None),
    record("AL", "ALB", "Albania", Some("Republic of Albania"), None),
    record("AD", "AND", "Andorra", Some("Principality of Andorra"), None),
    record("AE", "ARE", "United Arab Emirates", None, None),
    record("AR", "ARG", "Argentina", Some("Argentine Republic"), None),
    record("AM", "ARM", "Armenia", Some("Republic of Armenia"), None),
    record("AS", "ASM", "American Samoa", None, None),
    record("AQ", "ATA", "Antarctica", None, None),
    record("TF", "ATF", "French Southern Territories", None, None),
    record("AG", "ATG", "Antigua and Barbuda", None, None),
    record("AU", "AUS", "Australia", None, None),
    record("AT", "AUT", "Austria", Some("Republic of Austria"), None),
    record("AZ", "AZE", "Azerbaijan", Some("Republic of Azerbaijan"), None),
    record("BI", "BDI", "Burundi", Some("Republic of Burundi"), None),
    record("BE", "BEL", "Belgium", Some("Kingdom of Belgium"), None),
    record("BJ", "BEN", "Benin", Some("Republic of Benin"), None),
    record("BQ", "BES", "Bonaire, Sint Eustatius and Saba", Some("Bonaire, Sint Eustatius and Saba"), None),
    record("BF", "BFA", "Burkina Faso", None, None),
    record("BD", "BGD", "Bangladesh", Some("People's Republic of Bangladesh"), None),
    record("BG", "BGR", "Bulgaria", Some("Republic of Bulgaria"), None),
    record("BH", "BHR", "Bahrain", Some("Kingdom of Bahrain"), None),
    record("BS", "BHS", "Bahamas", Some("Commonwealth of the Bahamas"), None),
    record("BA", "BIH", "Bosnia and Herzegovina", Some("Republic of Bosnia and Herzegovina"), None),
    record("BL", "BLM", "Saint Barthélemy", None, None),
    record("BY", "BLR", "Belarus", Some("Republic of Belarus"), None),
    record("BZ", "BLZ", "Belize", None, None),
    record("BM", "BMU", "Bermuda", None, None),
    record("BO", "BOL", "Bolivia, Plurinational State of", Some("Plurinational State of Bolivia"), Some("Bolivia")),
    record("BR", "BRA", "Brazil", Some("Federative Republic of Brazil"), None),
    record("BB", "BRB", "Barbados", None, None),
    record("BN", "BRN", "Brunei Darussalam", None, Some("Brunei")),
    record("BT", "BTN", "Bhutan", Some("Kingdom of Bhutan"), None),
    record("BV", "BVT", "Bouvet Island", None, None),
    record("BW", "BWA", "Botswana", Some("Republic of Botswana"), None),
    record("CF", "CAF", "Central African Republic", None, None),
    record("CA", "CAN", "Canada", None, None),
    record("CC", "CCK", "Cocos (Keeling) Islands", None, None),
    record("CH", "CHE", "Switzerland", Some("Swiss Confederation"), None),
    record("CL", "CHL", "Chile", Some("Republic of Chile"), None),
    record("CN", "CHN", "China", Some("People's Republic of China"), None),
    record("CI", "CIV", "Côte d'Ivoire", Some("Republic of Côte d'Ivoire"), None),
    record("CM", "CMR", "Cameroon", Some("Republic of Cameroon"), None),
    record("CD", "COD", "Congo, The Democratic Republic of the", None, Some("Democratic Republic of the Congo")),
    record("CG", "COG", "Congo", Some("Republic of the Congo"), None),
    record("CK", "COK", "Cook Islands", None, None),
    record("CO", "COL", "Colombia", Some("Republic of Colombia"), None),
    record("KM", "COM", "Comoros", Some("Union of the Comoros"), None),
    record("CV", "CPV", "Cabo Verde", Some("Republic of Cabo Verde"), Some("Cape Verde")),
    record("CR", "CRI", "Costa Rica", Some("Republic of Costa Rica"), None),
    record("CU", "CUB", "Cuba", Some("Republic of Cuba"), None),
    record("CW", "CUW", "Curaçao", Some("Curaçao"), None),
    record("CX", "CXR", "Christmas Island", None, None),
    record("KY", "CYM", "Cayman Islands", None, None),
    record("CY", "CYP", "Cyprus", Some("Republic of Cyprus"), None),
    record("CZ", "CZE", "Czechia", Some("Czech Republic"), None),
    record("DE", "DEU", "Germany", Some("Federal Republic of Germany"), None),
    record("DJ", "DJI", "Djibouti", Some("Republic of Djibouti"), None),
    record("DM", "DMA", "Dominica", Some("Commonwealth of Dominica"), None),
    record("DK", "DNK", "Denmark", Some("Kingdom of Denmark"), None),
    record("DO", "DOM", "Dominican Republic", None, None),
    record("DZ", "DZA", "Algeria", Some("People's Democratic Republic of Algeria"), None),
    record("EC", "ECU", "Ecuador", Some("Republic of Ecuador"), None),
    record("EG", "EGY", "Egypt", Some("Arab Republic of Egypt"), None),
    record("ER", "ERI", "Eritrea", Some("the State of Eritrea"), None),
    record("EH", "ESH", "Western Sahara", None, None),
    record("ES", "ESP", "Spain", Some("Kingdom of Spain"), None),
    record("EE", "EST", "Estonia", Some("Republic of Estonia"), None),
    record("ET", "ETH", "Ethiopia", Some("Federal Democratic Republic of Ethiopia"), None),
    record("FI", "FIN", "Finland", Some("Republic of Finland"), None),
    record("FJ", "FJI", "Fiji", Some("Republic of Fiji"), None),
    record("FK", "FLK", "Falkland Islands (Malvinas)", None, None),
    record("FR", "FRA", "France", Some("French Republic"), None),
    record("FO", "FRO", "Faroe Islands", None, None),
    record("FM", "FSM", "Micronesia, Federated States of", Some("Federated States of Micronesia"), Some("Micronesia")),
    record("GA", "GAB", "Gabon", Some("Gabonese Republic"), None),
    record("GB", "GBR", "United Kingdom", Some("United Kingdom of Great Britain and Northern Ireland"), None),
    record("GE", "GEO", "Georgia", None, None),
    record("GG", "GGY", "Guernsey", None, None),
    record("GH", "GHA", "Ghana", Some("Republic of Ghana"), None),
    record("GI", "GIB", "Gibraltar", None, None),
    record("GN", "GIN", "Guinea", Some("Republic of Guinea"), None),
    record("GP", "GLP", "Guadeloupe", None, None),
    record("GM", "GMB", "Gambia", Some("Republic of the Gambia"), None),
    record("GW", "GNB", "Guinea-Bissau", Some("Republic of Guinea-Bissau"), None),
    record("GQ", "GNQ", "Equatorial Guinea", Some("Republic of Equatorial Guinea"), None),
    record("GR", "GRC", "Greece", Some("Hellenic Republic"), None),
    record("GD", "GRD", "Grenada", None, None),
    record("GL", "GRL", "Greenland", None, None),
    record("GT", "GTM", "Guatemala", Some("Republic of Guatemala"), None),
    record("GF", "GUF", "French Guiana", None, None),
    record("GU", "GUM", "Guam", None, None),
    record("GY", "GUY", "Guyana", Some("Republic of Guyana"), None),
    record("HK", "HKG", "Hong Kong", Some("Hong Kong Special Administrative Region of China"), None),
    record("HM", "HMD", "Heard Island and McDonald Islands", None, None),
    record("HN", "HND", "Honduras", Some("Republic of Honduras"), None),
    record("HR", "HRV", "Croatia", Some("Republic of Croatia"), None),
    record("HT", "HTI", "Haiti", Some("Republic of Haiti"), None),
    record("HU", "HUN", "Hungary", Some("Hungary"), None),
    record("ID", "IDN", "Indonesia", Some("Republic of Indonesia"), None),
    record("IM", "IMN", "Isle of Man", None, None),
    record("IN", "IND", "India", Some("Republic of India"), None),
    record("IO", "IOT", "British Indian Ocean Territory", None, None),
    record("IE", "IRL", "Ireland", None, None),
    record("IR", "IRN", "Iran, Islamic Republic of", Some("Islamic Republic of Iran"), Some("Iran")),
    record("IQ", "IRQ", "Iraq", Some("Republic of Iraq"), None),
    record("IS", "ISL", "Iceland", Some("Republic of Iceland"), None),
    record("IL", "ISR", "Israel", Some("State of Israel"), None),
    record("IT", "ITA", "Italy", Some("Italian Republic"), None),
    record("JM", "JAM", "Jamaica", None, None),
    record("JE", "JEY", "Jersey", None, None),
    record("JO", "JOR", "Jordan", Some("Hashemite Kingdom of Jordan"), None),
    record("JP", "JPN", "Japan", None, None),
    record("KZ", "KAZ", "Kazakhstan", Some("Republic of Kazakhstan"), None),
    record("KE", "KEN", "Kenya", Some("Republic of Kenya"), None),
    record("KG", "KGZ", "Kyrgyzstan", Some("Kyrgyz Republic"), None),
    record("KH", "KHM", "Cambodia", Some("Kingdom of Cambodia"), None),
    record("KI", "KIR", "Kiribati", Some("Republic of Kiribati"), None),
    record("KN", "KNA", "Saint Kitts and Nevis", None, None),
    record("KR", "KOR", "Korea, Republic of", None, Some("South Korea")),
    record("KW", "KWT", "Kuwait", Some("State of Kuwait"), None),
    record("LA", "LAO", "Lao People's Democratic Republic", None, Some("Laos")),
    record("LB", "LBN", "Lebanon", Some("Lebanese Republic"), None),
    record("LR", "LBR", "Liberia", Some("Republic of Liberia"), None),
    record("LY", "LBY", "Libya", Some("Libya"), None),
    record("LC", "LCA", "Saint Lucia", None, None),
    record("LI", "LIE", "Liechtenstein", Some("Principality of Liechtenstein"), None),
    record("LK", "LKA", "Sri Lanka", Some("Democratic Socialist Republic of Sri Lanka"), None),
    record("LS", "LSO", "Lesotho", Some("Kingdom of Lesotho"), None),
    record("LT", "LTU", "Lithuania", Some("Republic of Lithuania"), None),
    record("LU", "LUX", "Luxembourg", Some("Grand Duchy of Luxembourg"), None),
    record("LV", "LVA", "Latvia", Some("Republic of Latvia"), None),
    record("MO", "MAC", "Macao", Some("Macao Special Administrative Region of China"), None),
    record("MF", "MAF", "Saint Martin (French part)", None, None),
    record("MA", "MAR", "Morocco", Some("Kingdom of Morocco"), None),
    record("MC", "MCO", "Monaco", Some("Principality of Monaco"), None),
    record("MD", "MDA", "Moldova, Republic of", Some("Republic of Moldova"), Some("Moldova")),
    record("MG", "MDG", "Madagascar", Some("Republic of Madagascar"), None),
    record("MV", "MDV", "Maldives", Some("Republic of Maldives"), None),
    record("MX", "MEX", "Mexico", Some("United Mexican States"), None),
    record("MH", "MHL", "Marshall Islands", Some("Republic of the Marshall Islands"), None),
    record("MK", "MKD", "North Macedonia", Some("Republic of North Macedonia"), None),
    record("ML", "MLI", "Mali", Some("Republic of Mali"), None),
    record("MT", "MLT", "Malta", Some("Republic of Malta"), None),
    record("MM", "MMR", "Myanmar", Some("Republic of Myanmar"), None),
    record("ME", "MNE", "Montenegro", Some("Montenegro"), None),
    record("MN", "MNG", "Mongolia", None, None),
    record("MP", "MNP", "Northern Mariana Islands", Some("Commonwealth of the Northern Mariana Islands"), None),
    record("MZ", "MOZ", "Mozambique", Some("Republic of Mozambique"), None),
    record("MR", "MRT", "Mauritania", Some("Islamic Republic of Mauritania"), None),
    record("MS", "MSR", "Montserrat", None, None),
    record("MQ", "MTQ", "Martinique", None, None),
    record("MU", "MUS", "Mauritius", Some("Republic of Mauritius"), None),
    record("MW", "MWI", "Malawi", Some("Republic of Malawi"), None),
    record("MY", "MYS", "Malaysia", None, None),
    record("YT", "MYT", "Mayotte", None, None),
    record("NA", "NAM", "Namibia", Some("Republic of Namibia"), None),
    record("NC", "NCL", "New Caledonia", None, None),
    record("NE", "NER", "Niger", Some("Republic of the Niger"), None),
    record("NF", "NFK", "Norfolk Island", None, None),
    record("NG", "NGA", "Nigeria", Some("Federal Republic of Nigeria"), None),
    record("NI", "NIC", "Nicaragua", Some("Republic of Nicaragua"), None),
    record("NU", "NIU", "Niue", Some("Niue"), None),
    record("NL", "NLD", "Netherlands", Some("Kingdom of the Netherlands"), None),
    record("NO", "NOR", "Norway", Some("Kingdom of Norway"), None),
    record("NP", "NPL", "Nepal", Some("Federal Democratic Republic of Nepal"), None),
    record("NR", "NRU", "Nauru", Some("Republic of Nauru"), None),
    record("NZ", "NZL", "New Zealand", None, None),
    record("OM", "OMN", "Oman", Some("Sultanate of Oman"), None),
    record("PK", "PAK", "Pakistan", Some("Islamic Republic of Pakistan"), None),
    record("PA", "PAN", "Panama", Some("Republic of Panama"), None),
    record("PN", "PCN", "Pitcairn", None, None),
    record("PE", "PER", "Peru", Some("Republic of Peru"), None),
    record("PH", "PHL", "Philippines", Some("Republic of the Philippines"), None),
    record("PW", "PLW", "Palau", Some("Republic of Palau"), None),
    record("PG", "PNG", "Papua New Guinea", Some("Independent State of Papua New Guinea"), None),
    record("PL", "POL", "Poland", Some("Republic of Poland"), None),
    record("PR", "PRI", "Puerto Rico", None, None),
    record("KP", "PRK", "Korea, Democratic People's Republic of", Some("Democratic People's Republic of Korea"), Some("North Korea")),
    record("PT", "PRT", "Portugal", Some("Portuguese Republic"), None),
    record("PY", "PRY", "Paraguay", Some("Republic of Paraguay"), None),
    record("PS", "PSE", "Palestine, State of", Some("the State of Palestine"), Some("Palestine")),
    record("PF", "PYF", "French Polynesia", None, None),
    record("QA", "QAT", "Qatar", Some("State of Qatar"), None),
    record("RE", "REU", "Réunion", None, None),
    record("RO", "ROU", "Romania", None, None),
    record("RU", "RUS", "Russian Federation", None, Some("Russia")),
    record("RW", "RWA", "Rwanda", Some("Rwandese Republic"), None),
    record("SA", "SAU", "Saudi Arabia", Some("Kingdom of Saudi Arabia"), None),
    record("SD", "SDN", "Sudan", Some("Republic of the Sudan"), None),
    record("SN", "SEN", "Senegal", Some("Republic of Senegal"), None),
    record("SG", "SGP", "Singapore", Some("Republic of Singapore"), None),
    record("GS", "SGS", "South Georgia and the South Sandwich Islands", None, None),
    record("SH", "SHN", "Saint Helena, Ascension and Tristan da Cunha", None, None),
    record("SJ", "SJM", "Svalbard and Jan Mayen", None, None),
    record("SB", "SLB", "Solomon Islands", None, None),
    record("SL", "SLE", "Sierra Leone", Some("Republic of Sierra Leone"), None),
    record("SV", "SLV", "El Salvador", Some("Republic of El Salvador"), None),
    record("SM", "SMR", "San Marino", Some("Republic of San Marino"), None),
    record("SO", "SOM", "Somalia", Some("Federal Republic of Somalia"), None),
    record("PM", "SPM", "Saint Pierre and Miquelon", None, None),
    record("RS", "SRB", "Serbia", Some("Republic of Serbia"), None),
    record("SS", "SSD", "South Sudan", Some("Republic of South Sudan"), None),
    record("ST", "STP", "Sao Tome and Principe", Some("Democratic Republic of Sao Tome and Principe"), None),
    record("SR", "SUR", "Suriname", Some("Republic of Suriname"), None),
    record("SK", "SVK", "Slovakia", Some("Slovak Republic"), None),
    record("SI", "SVN", "Slovenia", Some("Republic of Slovenia"), None),
    record("SE", "SWE", "Sweden", Some("Kingdom of Sweden"), None),
    record("SZ", "SWZ", "Eswatini", Some("Kingdom of Eswatini"), Some("Swaziland")),
    record("SX", "SXM", "Sint Maarten (Dutch part)", Some("Sint Maarten (Dutch part)"), None),
    record("SC", "SYC", "Seychelles", Some("Republic of Seychelles"), None),
    record("SY", "SYR", "Syrian Arab Republic", None, Some("Syria")),
    record("TC", "TCA", "Turks and Caicos Islands", None, None),
    record("TD", "TCD", "Chad", Some("Republic of Chad"), None),
    record("TG", "TGO", "Togo", Some("Togolese Republic"), None),
    record("TH", "THA", "Thailand", Some("Kingdom of Thailand"), None),
    record("TJ", "TJK", "Tajikistan", Some("Republic of Tajikistan"), None),
    record("TK", "TKL", "Tokelau", None, None),
    record("TM", "TKM", "Turkmenistan", None, None),
    record("TL", "TLS", "Timor-Leste", Some("Democratic Republic of Timor-Leste"), Some("East Timor")),
    record("TO", "TON", "Tonga", Some("Kingdom of Tonga"), None),
    record("TT", "TTO", "Trinidad and Tobago", Some("Republic of Trinidad and Tobago"), None),
    record("TN", "TUN", "Tunisia", Some("Republic of Tunisia"), None),
    record("TR", "TUR", "Türkiye", Some("Republic of Türkiye"), Some("Turkey")),
    record("TV", "TUV", "Tuvalu", None, None),
    record("TW", "TWN", "Taiwan, Province of China", Some("Taiwan, Province of China"), Some("Taiwan")),
    record("TZ", "TZA", "Tanzania, United Republic of", Some("United Republic of Tanzania"), Some("Tanzania")),
    record("UG", "UGA", "Uganda", Some("Republic of Uganda"), None),
    record("UA", "UKR", "Ukraine", None, None),
    record("UM", "UMI", "United States Minor Outlying Islands", None, None),
    record("UY", "URY", "Uruguay", Some("Eastern Republic of Uruguay"), None),
    record("US", "USA", "United States", Some("United States of America"), None),
    record("UZ", "UZB", "Uzbekistan", Some("Republic of Uzbekistan"), None),
    record("VA", "VAT", "Holy See (Vatican City State)", None, Some("Vatican City")),
    record("VC", "VCT", "Saint Vincent and the Grenadines", None, None),
    record("VE", "VEN", "Venezuela, Bolivarian Republic of", Some("Bolivarian Republic of Venezuela"), Some("Venezuela")),
    record("VG", "VGB", "Virgin Islands, British", Some("British Virgin Islands"), None),
    record("VI", "VIR", "Virgin Islands, U.S.", Some("Virgin Islands of the United States"), None),
    record("VN", "VNM", "Viet Nam", Some("Socialist Republic of Viet Nam"), Some("Vietnam")),
    record("VU", "VUT", "Vanuatu", Some("Republic of Vanuatu"), None),
    record("WF", "WLF", "Wallis and Futuna", None, None),
    record("WS", "WSM", "Samoa", Some("Independent State of Samoa"), None),
    record("YE", "YEM", "Yemen", Some("Republic of Yemen"), None),
    record("ZA", "ZAF", "South Africa", Some("Republic of South Africa"), None),
    record("ZM", "ZMB", "Zambia", Some("Republic of Zambia"), None),
    record("ZW", "ZWE", "Zimbabwe", Some("Republic of Zimbabwe"), None),
];

/// Lowercases, strips accents and collapses punctuation so that labels from
/// different sources compare equal.
pub fn fold(value: &str) -> String {
    value
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .join(" ")
}

type Scores = BTreeMap<&'static str, (u32, &'static CountryRecord)>;

fn add(scores: &mut Scores, record: &'static CountryRecord, points: u32) {
    scores.entry(record.alpha2).or_insert((0, record)).0 += points;
}

#[derive(Debug)]
struct FoldedRecord {
    record: &'static CountryRecord,
    names: Vec<String>,
}

/// The reference registry, with search keys precomputed once.
#[derive(Debug)]
pub struct Registry {
    folded: Vec<FoldedRecord>,
    by_alpha3: BTreeMap<&'static str, &'static CountryRecord>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| Registry::new(COUNTRIES));

impl Registry {
    fn new(records: &'static [CountryRecord]) -> Self {
        let folded = records
            .iter()
            .map(|record| FoldedRecord {
                record,
                names: record.names().map(fold).collect(),
            })
            .collect();
        let by_alpha3 = records.iter().map(|r| (r.alpha3, r)).collect();
        Self { folded, by_alpha3 }
    }

    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    pub fn lookup_alpha3(&self, alpha3: &str) -> Option<&'static CountryRecord> {
        self.by_alpha3.get(alpha3).copied()
    }

    /// Whether the code is either an ISO alpha-3 code or an allow-listed source code.
    pub fn is_known(&self, code: &CountryCode) -> bool {
        self.lookup_alpha3(code.as_str()).is_some()
            || NON_STANDARD_CODES.iter().any(|n| n.code == code.as_str())
    }

    /// Name and flag for a code, `None` when the code is neither in ISO 3166-1
    /// nor in the non-standard allow-list.
    pub fn metadata(&self, code: &CountryCode) -> Option<CountryMetadata> {
        if let Some(record) = self.lookup_alpha3(code.as_str()) {
            return Some(CountryMetadata {
                name: record.display_name().to_string(),
                flag_code: record.alpha2.to_ascii_lowercase(),
            });
        }
        NON_STANDARD_CODES
            .iter()
            .find(|n| n.code == code.as_str())
            .map(|n| CountryMetadata {
                name: n.name.to_string(),
                flag_code: n.flag_code.to_string(),
            })
    }

    /// Candidates for a free-text query, best first.
    ///
    /// Scoring: a query equal to a code or a name earns 50 points; the first
    /// name containing the query earns between 5 and 30 points depending on
    /// how early it appears. Only when nothing matches that way are
    /// misspellings considered, through Jaro-Winkler similarity. Ties are
    /// broken on the alpha-2 code.
    pub fn search_fuzzy(&self, query: &str) -> Vec<&'static CountryRecord> {
        let query = fold(query);
        if query.is_empty() {
            return vec![];
        }
        let mut scores: Scores = BTreeMap::new();

        for entry in &self.folded {
            let record = entry.record;
            let code_match = query.eq_ignore_ascii_case(record.alpha2)
                || query.eq_ignore_ascii_case(record.alpha3);
            if code_match || entry.names.iter().any(|name| *name == query) {
                add(&mut scores, record, EXACT_MATCH_POINTS);
            }
            if let Some(position) = entry.names.iter().find_map(|name| name.find(&query)) {
                let points = 30u32.saturating_sub(2 * position as u32).max(5);
                add(&mut scores, record, points);
            }
        }

        if scores.is_empty() {
            for entry in &self.folded {
                let best = entry
                    .names
                    .iter()
                    .map(|name| strsim::jaro_winkler(&query, name))
                    .fold(0.0_f64, f64::max);
                if best >= SIMILARITY_THRESHOLD {
                    add(&mut scores, entry.record, (best * 10.0).round() as u32);
                }
            }
        }

        let candidates = scores
            .into_iter()
            .sorted_by(|(a2_a, (score_a, _)), (a2_b, (score_b, _))| {
                score_b.cmp(score_a).then_with(|| a2_a.cmp(a2_b))
            })
            .map(|(_, (_, record))| record)
            .collect_vec();
        debug!(
            "Fuzzy search for {query:?}: {:?}",
            candidates.iter().map(|r| r.alpha3).take(3).collect_vec()
        );
        candidates
    }
}
