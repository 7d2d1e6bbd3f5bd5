//! Query intent parsing
//!
//! Turns free-text queries into structured preferences:
//! - "piscina barato" -> amenities [piscina], price cheap
//! - "apartamento en bocagrande con wifi" -> type apartamento, location bocagrande, amenities [wifi]
//! - "no sé, sorpréndeme" -> vague (no real preference)
//!
//! Matching runs on normalized text, so accents and case are ignored.
//! Keyword phrases match as substrings ("piscinas" fires "piscina"),
//! except where the hit lies inside a longer keyword that also matched:
//! "bar" does not fire inside "barato".

use std::sync::OnceLock;

use serde::Serialize;

use crate::text::normalize;

/// Preference field a keyword feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagFamily {
    Amenity,
    Type,
    Price,
    Location,
}

/// A surface phrase and the canonical tag it stands for
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    /// What the user may type
    pub phrase: &'static str,
    /// Canonical tag recorded in the preferences
    pub tag: &'static str,
    /// Fields the tag is recorded into (may be empty)
    pub families: &'static [TagFamily],
}

const fn rule(
    phrase: &'static str,
    tag: &'static str,
    families: &'static [TagFamily],
) -> KeywordRule {
    KeywordRule {
        phrase,
        tag,
        families,
    }
}

const AMENITY: &[TagFamily] = &[TagFamily::Amenity];
const TYPE: &[TagFamily] = &[TagFamily::Type];
const PRICE: &[TagFamily] = &[TagFamily::Price];
const LOCATION: &[TagFamily] = &[TagFamily::Location];
const AMENITY_AND_LOCATION: &[TagFamily] = &[TagFamily::Amenity, TagFamily::Location];
/// Recognized themes with no listing field to filter on
const THEME: &[TagFamily] = &[];

/// Keyword table, evaluated top to bottom.
///
/// Single-valued fields (type, price, location) keep the tag of the LAST
/// rule that fires, so later rows take precedence over earlier ones.
pub const KEYWORD_RULES: &[KeywordRule] = &[
    // Amenities
    rule("parqueadero", "parqueadero", AMENITY),
    rule("parking", "parqueadero", AMENITY),
    rule("estacionamiento", "parqueadero", AMENITY),
    rule("piscina", "piscina", AMENITY),
    rule("alberca", "piscina", AMENITY),
    rule("pool", "piscina", AMENITY),
    rule("wifi", "wifi", AMENITY),
    rule("internet", "wifi", AMENITY),
    rule("desayuno", "desayuno", AMENITY),
    rule("breakfast", "desayuno", AMENITY),
    rule("gimnasio", "gimnasio", AMENITY),
    rule("gym", "gimnasio", AMENITY),
    rule("spa", "spa", AMENITY),
    rule("jacuzzi", "jacuzzi", AMENITY),
    rule("bar", "bar", AMENITY),
    rule("restaurante", "restaurante", AMENITY),
    rule("restaurant", "restaurante", AMENITY),
    rule("playa", "playa", AMENITY_AND_LOCATION),
    rule("beach", "playa", AMENITY_AND_LOCATION),
    rule("aire acondicionado", "aire acondicionado", AMENITY),
    rule("ac", "aire acondicionado", AMENITY),
    rule("mascotas", "mascotas", AMENITY),
    rule("pet", "mascotas", AMENITY),
    rule("pet friendly", "mascotas", AMENITY),
    // Accommodation type
    rule("hotel", "hotel", TYPE),
    rule("hostal", "hostal", TYPE),
    rule("apartamento", "apartamento", TYPE),
    rule("apartaestudio", "apartamento", TYPE),
    rule("casa", "casa", TYPE),
    // Price tier
    rule("barato", "barato", PRICE),
    rule("económico", "barato", PRICE),
    rule("low cost", "barato", PRICE),
    rule("lujo", "lujo", PRICE),
    rule("lujoso", "lujo", PRICE),
    rule("premium", "lujo", PRICE),
    rule("exclusivo", "lujo", PRICE),
    rule("caro", "lujo", PRICE),
    // Location
    rule("centro", "centro", LOCATION),
    rule("bocagrande", "bocagrande", LOCATION),
    rule("mar", "playa", AMENITY_AND_LOCATION),
    // Themes
    rule("familiar", "familiar", THEME),
    rule("romántico", "romántico", THEME),
    rule("pareja", "romántico", THEME),
    rule("negocios", "negocios", THEME),
];

/// Phrases that express "no real preference"
pub const VAGUE_PHRASES: &[&str] = &[
    "no sé",
    "sorpréndeme",
    "elige por mí",
    "cualquiera",
    "lo que sea",
    "no tengo preferencia",
    "dame una opción",
    "dame opciones",
    "no importa",
    "random",
];

/// Price tier requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Cheap,
    Luxury,
}

impl PriceTier {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "barato" => Some(PriceTier::Cheap),
            "lujo" => Some(PriceTier::Luxury),
            _ => None,
        }
    }

    /// Normalized words a listing price text must contain for this tier
    pub fn price_markers(&self) -> &'static [&'static str] {
        match self {
            PriceTier::Cheap => &["barato", "economico", "low"],
            PriceTier::Luxury => &["lujo", "premium", "alto"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceTier::Cheap => "barato",
            PriceTier::Luxury => "lujo",
        }
    }
}

/// Structured interpretation of a single query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Preferences {
    /// Requested amenities, deduplicated, in first-seen order
    pub amenities: Vec<&'static str>,
    /// Requested accommodation type
    #[serde(rename = "type")]
    pub kind: Option<&'static str>,
    pub price: Option<PriceTier>,
    pub location: Option<&'static str>,
}

impl Preferences {
    /// True when nothing filterable was recognized
    pub fn is_empty(&self) -> bool {
        self.amenities.is_empty()
            && self.kind.is_none()
            && self.price.is_none()
            && self.location.is_none()
    }

    fn record(&mut self, family: TagFamily, tag: &'static str) {
        match family {
            TagFamily::Amenity => {
                if !self.amenities.contains(&tag) {
                    self.amenities.push(tag);
                }
            }
            TagFamily::Type => self.kind = Some(tag),
            TagFamily::Price => {
                if let Some(tier) = PriceTier::from_tag(tag) {
                    self.price = Some(tier);
                }
            }
            TagFamily::Location => self.location = Some(tag),
        }
    }

    /// Human-readable summary, e.g. "amenities: piscina, wifi; price: barato"
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();

        if !self.amenities.is_empty() {
            parts.push(format!("amenities: {}", self.amenities.join(", ")));
        }
        if let Some(kind) = self.kind {
            parts.push(format!("type: {kind}"));
        }
        if let Some(price) = self.price {
            parts.push(format!("price: {}", price.label()));
        }
        if let Some(location) = self.location {
            parts.push(format!("location: {location}"));
        }

        if parts.is_empty() {
            "no recognized preferences".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Result of analyzing a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// The user expressed indifference
    Vague,
    /// Structured preferences (possibly empty)
    Preferences(Preferences),
}

/// Keyword rule with its phrase pre-normalized
#[derive(Debug)]
struct CompiledRule {
    phrase: String,
    rule: KeywordRule,
}

/// Where a keyword phrase occurs in the normalized query
#[derive(Debug, Clone, Copy)]
struct KeywordSpan {
    rule: usize,
    start: usize,
    end: usize,
}

impl KeywordSpan {
    /// True when `other` lies inside this strictly longer span
    fn covers(&self, other: &KeywordSpan) -> bool {
        self.end - self.start > other.end - other.start
            && self.start <= other.start
            && other.end <= self.end
    }
}

/// Intent parser over the static keyword table
#[derive(Debug)]
pub struct IntentParser {
    rules: Vec<CompiledRule>,
    vague_phrases: Vec<String>,
}

impl Default for IntentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentParser {
    pub fn new() -> Self {
        Self::with_rules(KEYWORD_RULES, VAGUE_PHRASES)
    }

    pub fn with_rules(rules: &[KeywordRule], vague_phrases: &[&str]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|rule| CompiledRule {
                    phrase: normalize(rule.phrase),
                    rule: *rule,
                })
                .collect(),
            vague_phrases: vague_phrases.iter().map(|p| normalize(p)).collect(),
        }
    }

    /// Shared parser built from the static tables
    pub fn shared() -> &'static IntentParser {
        static PARSER: OnceLock<IntentParser> = OnceLock::new();
        PARSER.get_or_init(IntentParser::new)
    }

    /// Check a query for vague phrases (substring containment)
    pub fn is_vague(&self, query: &str) -> bool {
        let text = normalize(query);
        self.vague_phrases
            .iter()
            .any(|phrase| !phrase.is_empty() && text.contains(phrase.as_str()))
    }

    /// Extract structured preferences, ignoring vague phrases
    pub fn extract(&self, query: &str) -> Preferences {
        let text = normalize(query);
        let spans = self.keyword_spans(&text);
        let mut preferences = Preferences::default();

        for (index, compiled) in self.rules.iter().enumerate() {
            let fired = spans
                .iter()
                .filter(|span| span.rule == index)
                .any(|span| !spans.iter().any(|other| other.covers(span)));
            if fired {
                for family in compiled.rule.families {
                    preferences.record(*family, compiled.rule.tag);
                }
            }
        }

        preferences
    }

    /// Every occurrence of every keyword phrase in `text`
    fn keyword_spans(&self, text: &str) -> Vec<KeywordSpan> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, compiled)| !compiled.phrase.is_empty())
            .flat_map(|(rule, compiled)| {
                text.match_indices(compiled.phrase.as_str())
                    .map(move |(start, phrase)| KeywordSpan {
                        rule,
                        start,
                        end: start + phrase.len(),
                    })
            })
            .collect()
    }

    /// Analyze a query: vague detection first, then keyword extraction
    pub fn analyze(&self, query: &str) -> Intent {
        if self.is_vague(query) {
            return Intent::Vague;
        }
        Intent::Preferences(self.extract(query))
    }
}

/// Analyze a query with the shared parser
pub fn analyze(query: &str) -> Intent {
    IntentParser::shared().analyze(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(query: &str) -> Preferences {
        match analyze(query) {
            Intent::Preferences(p) => p,
            Intent::Vague => panic!("Expected preferences for {query:?}"),
        }
    }

    #[test]
    fn test_piscina_barato() {
        let p = prefs("piscina barato");
        assert_eq!(p.amenities, vec!["piscina"]);
        assert_eq!(p.price, Some(PriceTier::Cheap));
        assert_eq!(p.kind, None);
        assert_eq!(p.location, None);
    }

    #[test]
    fn test_synonyms_share_a_tag() {
        let p = prefs("pool with parking and gym");
        assert_eq!(p.amenities, vec!["parqueadero", "piscina", "gimnasio"]);
    }

    #[test]
    fn test_amenities_deduplicated() {
        let p = prefs("piscina alberca pool");
        assert_eq!(p.amenities, vec!["piscina"]);
    }

    #[test]
    fn test_accents_are_optional() {
        assert_eq!(prefs("algo economico").price, Some(PriceTier::Cheap));
        assert_eq!(prefs("algo ECONÓMICO").price, Some(PriceTier::Cheap));
    }

    #[test]
    fn test_playa_is_amenity_and_location() {
        let p = prefs("barato cerca de la playa");
        assert_eq!(p.amenities, vec!["playa"]);
        assert_eq!(p.location, Some("playa"));
        assert_eq!(p.price, Some(PriceTier::Cheap));
    }

    #[test]
    fn test_last_rule_wins_for_single_valued_fields() {
        // "casa" comes after "hotel" in the table
        assert_eq!(prefs("casa u hotel").kind, Some("casa"));
        assert_eq!(prefs("hotel o casa").kind, Some("casa"));
        // "mar" comes after "centro"
        assert_eq!(prefs("centro cerca al mar").location, Some("playa"));
        // "caro" comes after "barato"
        assert_eq!(prefs("barato o caro").price, Some(PriceTier::Luxury));
    }

    #[test]
    fn test_substring_matching() {
        let p = prefs("piscinas y parqueaderos");
        assert_eq!(p.amenities, vec!["parqueadero", "piscina"]);

        let p = prefs("hoteles en el centro");
        assert_eq!(p.kind, Some("hotel"));
        assert_eq!(p.location, Some("centro"));

        let p = prefs("apartamentos con parqueaderos");
        assert_eq!(p.kind, Some("apartamento"));
        assert_eq!(p.amenities, vec!["parqueadero"]);

        let p = prefs("vacaciones en marzo");
        assert_eq!(p.location, Some("playa"));
    }

    #[test]
    fn test_comma_separated_keywords() {
        let p = prefs("piscina,wifi");
        assert_eq!(p.amenities, vec!["piscina", "wifi"]);
    }

    #[test]
    fn test_keyword_inside_longer_keyword() {
        let p = prefs("hoteles baratos");
        assert!(p.amenities.is_empty(), "bar must not fire inside barato");
        assert_eq!(p.price, Some(PriceTier::Cheap));

        // Without "barato" in the query the short keyword stands on its own
        let p = prefs("piscinas baratas");
        assert_eq!(p.amenities, vec!["piscina", "bar"]);
        assert_eq!(p.price, None);

        let p = prefs("hotel con bar y algo barato");
        assert_eq!(p.amenities, vec!["bar"]);
        assert_eq!(p.price, Some(PriceTier::Cheap));
    }

    #[test]
    fn test_multi_word_phrase() {
        let p = prefs("con aire acondicionado y pet friendly");
        assert_eq!(p.amenities, vec!["aire acondicionado", "mascotas"]);
    }

    #[test]
    fn test_themes_are_not_filterable() {
        let p = prefs("plan romántico en pareja");
        assert!(p.is_empty());
    }

    #[test]
    fn test_no_match_is_empty() {
        let p = prefs("xyzabc123");
        assert!(p.is_empty());
        assert_eq!(p.describe(), "no recognized preferences");
    }

    #[test]
    fn test_vague_queries() {
        assert_eq!(analyze("no se"), Intent::Vague);
        assert_eq!(analyze("No sé, sorpréndeme"), Intent::Vague);
        assert_eq!(analyze("elige por mi"), Intent::Vague);
        assert_eq!(analyze("RANDOM"), Intent::Vague);
    }

    #[test]
    fn test_vague_short_circuits_keywords() {
        assert_eq!(analyze("no importa, piscina y barato"), Intent::Vague);
    }

    #[test]
    fn test_describe() {
        let p = prefs("hostal barato con wifi en el centro");
        assert_eq!(
            p.describe(),
            "amenities: wifi; type: hostal; price: barato; location: centro"
        );
    }

    #[test]
    fn test_custom_rules() {
        let rules = [rule("suite", "suite", TYPE)];
        let parser = IntentParser::with_rules(&rules, &["whatever"]);

        assert_eq!(parser.extract("una suite").kind, Some("suite"));
        assert!(parser.is_vague("whatever works"));
        assert!(!parser.is_vague("no se"));
    }

    #[test]
    fn test_intent_serialization() {
        let json = serde_json::to_value(analyze("piscina barato")).unwrap();
        assert_eq!(json["intent"], "preferences");
        assert_eq!(json["amenities"][0], "piscina");
        assert_eq!(json["price"], "cheap");

        let json = serde_json::to_value(analyze("no se")).unwrap();
        assert_eq!(json["intent"], "vague");
    }
}
