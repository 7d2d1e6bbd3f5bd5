//! Query filtering over the hotel listing
//!
//! One query goes through a fixed sequence of states, first match wins:
//! 1. Empty query: the full listing, in listing order
//! 2. Vague query ("no sé", "sorpréndeme"): the top rated hotels
//! 3. Recognized preferences: conjunctive filter over the listing, falling
//!    back to fuzzy search when nothing matches
//! 4. Anything else: fuzzy search
//!
//! The optional star filter runs last and never reorders results.

use std::cmp::Ordering;
use std::time::Duration;

use serde::Serialize;

use crate::config::SearchConfig;
use crate::fuzzy::HotelIndex;
use crate::hotel::Hotel;
use crate::intent::{Intent, IntentParser, Preferences};
use crate::text::normalize;

/// Message shown when a query matches nothing
pub const NO_RESULTS_MESSAGE: &str =
    "No se encontraron alojamientos con esa búsqueda. ¡Prueba otra frase o preferencia!";

/// How long the zero-results notice stays visible
pub const NO_RESULTS_DURATION: Duration = Duration::from_millis(3500);

/// Which state produced the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    All,
    Vague,
    Structured,
    FuzzyFallback,
    Fuzzy,
}

/// Result of filtering the listing for one query
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome<'a> {
    pub hotels: Vec<&'a Hotel>,
    pub mode: SearchMode,
    /// Preferences recognized in the query, when there were any
    pub preferences: Option<Preferences>,
}

impl SearchOutcome<'_> {
    /// True when the fuzzy matcher produced the results
    pub fn matched_via_fuzzy(&self) -> bool {
        matches!(self.mode, SearchMode::Fuzzy | SearchMode::FuzzyFallback)
    }

    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
    }
}

/// Filter the listing for a query and an optional star classification
pub fn filter_hotels<'a>(
    hotels: &'a [Hotel],
    index: &dyn HotelIndex,
    query: &str,
    star_filter: Option<u8>,
    options: &SearchConfig,
) -> SearchOutcome<'a> {
    let query = query.trim();

    let mut outcome = if query.is_empty() {
        SearchOutcome {
            hotels: hotels.iter().collect(),
            mode: SearchMode::All,
            preferences: None,
        }
    } else {
        match IntentParser::shared().analyze(query) {
            Intent::Vague => SearchOutcome {
                hotels: top_rated(hotels, options.vague_limit),
                mode: SearchMode::Vague,
                preferences: None,
            },
            Intent::Preferences(preferences) if !preferences.is_empty() => {
                let matched: Vec<&Hotel> = hotels
                    .iter()
                    .filter(|hotel| matches_preferences(hotel, &preferences))
                    .collect();

                if matched.is_empty() {
                    log::debug!("No structured match for {:?}, using fuzzy search", query);
                    SearchOutcome {
                        hotels: fuzzy_hotels(hotels, index, query),
                        mode: SearchMode::FuzzyFallback,
                        preferences: Some(preferences),
                    }
                } else {
                    SearchOutcome {
                        hotels: matched,
                        mode: SearchMode::Structured,
                        preferences: Some(preferences),
                    }
                }
            }
            Intent::Preferences(_) => SearchOutcome {
                hotels: fuzzy_hotels(hotels, index, query),
                mode: SearchMode::Fuzzy,
                preferences: None,
            },
        }
    };

    if let Some(stars) = star_filter {
        outcome.hotels = filter_by_stars(outcome.hotels, stars);
    }

    log::debug!(
        "Search {:?} (stars {:?}): {:?} mode, {} hotels",
        query,
        star_filter,
        outcome.mode,
        outcome.hotels.len()
    );

    outcome
}

/// Keep hotels whose star classification equals `stars`, preserving order
pub fn filter_by_stars(hotels: Vec<&Hotel>, stars: u8) -> Vec<&Hotel> {
    hotels
        .into_iter()
        .filter(|hotel| hotel.star_count() == Some(stars))
        .collect()
}

/// The `limit` best rated hotels; equal ratings keep listing order
pub fn top_rated(hotels: &[Hotel], limit: usize) -> Vec<&Hotel> {
    let mut ranked: Vec<&Hotel> = hotels.iter().collect();
    ranked.sort_by(|a, b| {
        b.rating_value()
            .partial_cmp(&a.rating_value())
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}

/// Check a hotel against every recognized preference
pub fn matches_preferences(hotel: &Hotel, preferences: &Preferences) -> bool {
    if !preferences.amenities.is_empty() {
        let amenities = normalize(&hotel.amenities);
        if !preferences
            .amenities
            .iter()
            .all(|tag| amenities.contains(&normalize(tag)))
        {
            return false;
        }
    }

    if let Some(kind) = preferences.kind {
        if !normalize(&hotel.kind).contains(&normalize(kind)) {
            return false;
        }
    }

    if let Some(tier) = preferences.price {
        if !hotel.has_price() {
            return false;
        }
        let price = normalize(&hotel.price);
        if !tier.price_markers().iter().any(|marker| price.contains(marker)) {
            return false;
        }
    }

    if let Some(location) = preferences.location {
        if !normalize(&hotel.location).contains(&normalize(location)) {
            return false;
        }
    }

    true
}

fn fuzzy_hotels<'a>(hotels: &'a [Hotel], index: &dyn HotelIndex, query: &str) -> Vec<&'a Hotel> {
    index
        .search(query)
        .into_iter()
        .filter_map(|hit| hotels.get(hit.position))
        .collect()
}

/// Visual weight of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeStyle {
    Error,
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    pub style: NoticeStyle,
}

/// What to show around a result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsView {
    /// Recommendations are only shown while nothing is being searched
    pub show_recommendations: bool,
    pub heading: String,
    /// Result count summary, present when a query or star filter is active
    pub banner: Option<String>,
    /// Zero-results notice for non-empty queries
    pub notice: Option<Notice>,
}

impl ResultsView {
    pub fn from_outcome(outcome: &SearchOutcome<'_>, query: &str, star_filter: Option<u8>) -> Self {
        let query = query.trim();
        let searching = !query.is_empty() || star_filter.is_some();

        if !searching {
            return Self {
                show_recommendations: true,
                heading: "Todos los hoteles".to_string(),
                banner: None,
                notice: None,
            };
        }

        let criteria = describe_criteria(query, star_filter);
        let count = outcome.hotels.len();
        let plural = if count == 1 { "" } else { "s" };

        let notice = (!query.is_empty() && outcome.is_empty()).then(|| Notice {
            message: NO_RESULTS_MESSAGE.to_string(),
            duration: NO_RESULTS_DURATION,
            style: NoticeStyle::Error,
        });

        Self {
            show_recommendations: false,
            heading: format!("Resultados de búsqueda{criteria}"),
            banner: Some(format!(
                "{count} resultado{plural} encontrado{plural}{criteria}"
            )),
            notice,
        }
    }
}

fn describe_criteria(query: &str, star_filter: Option<u8>) -> String {
    let mut criteria = String::new();
    if !query.is_empty() {
        criteria.push_str(&format!(" para \"{query}\""));
    }
    if let Some(stars) = star_filter {
        let plural = if stars > 1 { "s" } else { "" };
        criteria.push_str(&format!(" con {stars} estrella{plural}"));
    }
    criteria
}

mod duration_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::{FuzzyIndex, SearchHit};
    use crate::intent::PriceTier;

    fn hotel(name: &str, amenities: &str, price: &str, location: &str, stars: &str) -> Hotel {
        Hotel {
            name: name.to_string(),
            amenities: amenities.to_string(),
            price: price.to_string(),
            location: location.to_string(),
            stars: stars.to_string(),
            ..Hotel::default()
        }
    }

    fn sample() -> Vec<Hotel> {
        let mut mar = hotel("Hotel Mar", "piscina, wifi", "barato", "Bocagrande", "4");
        mar.rating_score = Some(8.1);
        let mut luna = hotel("Casa Luna", "jacuzzi", "premium", "Centro", "5");
        luna.rating_score = Some(9.4);
        vec![mar, luna]
    }

    fn names(hotels: &[&Hotel]) -> Vec<String> {
        hotels.iter().map(|h| h.name.clone()).collect()
    }

    fn run<'a>(hotels: &'a [Hotel], query: &str, stars: Option<u8>) -> SearchOutcome<'a> {
        let options = SearchConfig::default();
        let index = FuzzyIndex::new(hotels, &options);
        filter_hotels(hotels, &index, query, stars, &options)
    }

    /// Index returning fixed hits, to observe what the orchestrator does with them
    struct FixedIndex(Vec<usize>);

    impl HotelIndex for FixedIndex {
        fn search(&self, _query: &str) -> Vec<SearchHit> {
            self.0
                .iter()
                .map(|&position| SearchHit {
                    position,
                    score: 0.1,
                    matched_on: crate::fuzzy::SearchKey::Name,
                    match_type: crate::fuzzy::MatchType::Fuzzy,
                })
                .collect()
        }
    }

    #[test]
    fn test_structured_match() {
        let hotels = sample();
        let outcome = run(&hotels, "piscina barato", None);

        assert_eq!(outcome.mode, SearchMode::Structured);
        assert_eq!(names(&outcome.hotels), vec!["Hotel Mar"]);
        assert!(!outcome.matched_via_fuzzy());

        let preferences = outcome.preferences.unwrap();
        assert_eq!(preferences.amenities, vec!["piscina"]);
        assert_eq!(preferences.price, Some(PriceTier::Cheap));
    }

    #[test]
    fn test_vague_query_ranks_by_rating() {
        let hotels = sample();
        let outcome = run(&hotels, "no se", None);

        assert_eq!(outcome.mode, SearchMode::Vague);
        assert_eq!(names(&outcome.hotels), vec!["Casa Luna", "Hotel Mar"]);
    }

    #[test]
    fn test_vague_query_ignores_keywords_and_caps() {
        let hotels: Vec<Hotel> = (0..10)
            .map(|i| {
                let mut h = hotel(&format!("Hotel {i}"), "piscina", "barato", "Centro", "3");
                h.rating_score = Some(f64::from(i));
                h
            })
            .collect();

        let outcome = run(&hotels, "sorpréndeme, algo con piscina", None);
        assert_eq!(outcome.mode, SearchMode::Vague);
        assert_eq!(
            names(&outcome.hotels),
            vec!["Hotel 9", "Hotel 8", "Hotel 7", "Hotel 6", "Hotel 5", "Hotel 4"]
        );
    }

    #[test]
    fn test_vague_ties_keep_listing_order() {
        let hotels = vec![
            hotel("Primero", "", "", "", ""),
            hotel("Segundo", "", "", "", ""),
        ];
        let outcome = run(&hotels, "random", None);
        assert_eq!(names(&outcome.hotels), vec!["Primero", "Segundo"]);
    }

    #[test]
    fn test_structured_then_star_filter() {
        let hotels = sample();
        let outcome = run(&hotels, "jacuzzi centro", Some(5));

        assert_eq!(outcome.mode, SearchMode::Structured);
        assert_eq!(names(&outcome.hotels), vec!["Casa Luna"]);

        let outcome = run(&hotels, "jacuzzi centro", Some(4));
        assert!(outcome.hotels.is_empty());
    }

    #[test]
    fn test_structured_keeps_listing_order() {
        let hotels = vec![
            hotel("Zeta", "wifi", "", "", ""),
            hotel("Alfa", "spa", "", "", ""),
            hotel("Beta", "wifi, spa", "", "", ""),
        ];
        let outcome = run(&hotels, "wifi", None);
        assert_eq!(names(&outcome.hotels), vec!["Zeta", "Beta"]);
    }

    #[test]
    fn test_structured_requires_available_price() {
        let hotels = vec![
            hotel("Sin precio", "piscina", "Consultar", "", ""),
            hotel("Con precio", "piscina", "Precio bajo, económico", "", ""),
        ];
        let outcome = run(&hotels, "barato", None);
        assert_eq!(names(&outcome.hotels), vec!["Con precio"]);
    }

    #[test]
    fn test_structured_empty_falls_back_to_fuzzy() {
        let hotels = sample();
        let index = FixedIndex(vec![1, 0]);
        let options = SearchConfig::default();

        // No hotel is in Bocagrande and has a jacuzzi
        let outcome = filter_hotels(&hotels, &index, "jacuzzi bocagrande", None, &options);
        assert_eq!(outcome.mode, SearchMode::FuzzyFallback);
        assert!(outcome.matched_via_fuzzy());
        assert!(outcome.preferences.is_some());
        assert_eq!(names(&outcome.hotels), vec!["Casa Luna", "Hotel Mar"]);
    }

    #[test]
    fn test_fallback_equals_fuzzy_output() {
        let hotels = sample();
        let options = SearchConfig::default();
        let index = FuzzyIndex::new(&hotels, &options);

        let query = "jacuzzi bocagrande";
        let outcome = filter_hotels(&hotels, &index, query, None, &options);
        let expected: Vec<&Hotel> = index
            .search(query)
            .into_iter()
            .map(|hit| &hotels[hit.position])
            .collect();

        assert_eq!(outcome.mode, SearchMode::FuzzyFallback);
        assert_eq!(outcome.hotels, expected);
    }

    #[test]
    fn test_plain_fuzzy_search() {
        let hotels = sample();
        let outcome = run(&hotels, "luna", None);

        assert_eq!(outcome.mode, SearchMode::Fuzzy);
        assert!(outcome.preferences.is_none());
        assert_eq!(names(&outcome.hotels), vec!["Casa Luna"]);
    }

    #[test]
    fn test_no_match_is_empty_with_notice() {
        let hotels = sample();
        let outcome = run(&hotels, "xyzabc123", None);

        assert_eq!(outcome.mode, SearchMode::Fuzzy);
        assert!(outcome.is_empty());

        let view = ResultsView::from_outcome(&outcome, "xyzabc123", None);
        let notice = view.notice.unwrap();
        assert_eq!(notice.message, NO_RESULTS_MESSAGE);
        assert_eq!(notice.duration, Duration::from_millis(3500));
        assert_eq!(notice.style, NoticeStyle::Error);
        assert_eq!(
            view.banner.as_deref(),
            Some("0 resultados encontrados para \"xyzabc123\"")
        );
    }

    #[test]
    fn test_empty_query_is_identity() {
        let hotels = sample();
        let outcome = run(&hotels, "   ", None);

        assert_eq!(outcome.mode, SearchMode::All);
        assert_eq!(outcome.hotels, hotels.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_query_with_star_filter() {
        let hotels = sample();
        let outcome = run(&hotels, "", Some(4));
        assert_eq!(names(&outcome.hotels), vec!["Hotel Mar"]);

        let view = ResultsView::from_outcome(&outcome, "", Some(4));
        assert!(!view.show_recommendations);
        assert_eq!(view.heading, "Resultados de búsqueda con 4 estrellas");
        assert!(view.notice.is_none());
    }

    #[test]
    fn test_star_filter_is_idempotent() {
        let mut hotels = sample();
        hotels.push(hotel("Sin clasificar", "", "", "", "Sin clasificar"));
        hotels.push(hotel("Otro", "", "", "", "4 estrellas"));

        let once = filter_by_stars(hotels.iter().collect(), 4);
        let twice = filter_by_stars(once.clone(), 4);

        assert_eq!(names(&once), vec!["Hotel Mar", "Otro"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_view_without_search() {
        let hotels = sample();
        let outcome = run(&hotels, "", None);
        let view = ResultsView::from_outcome(&outcome, "", None);

        assert!(view.show_recommendations);
        assert_eq!(view.heading, "Todos los hoteles");
        assert!(view.banner.is_none());
        assert!(view.notice.is_none());
    }

    #[test]
    fn test_view_singular_banner() {
        let hotels = sample();
        let outcome = run(&hotels, "jacuzzi centro", Some(5));
        let view = ResultsView::from_outcome(&outcome, "jacuzzi centro", Some(5));

        assert_eq!(
            view.heading,
            "Resultados de búsqueda para \"jacuzzi centro\" con 5 estrellas"
        );
        assert_eq!(
            view.banner.as_deref(),
            Some("1 resultado encontrado para \"jacuzzi centro\" con 5 estrellas")
        );
    }

    #[test]
    fn test_star_filter_without_query_has_no_notice() {
        let hotels = sample();
        let outcome = run(&hotels, "", Some(1));
        assert!(outcome.is_empty());

        let view = ResultsView::from_outcome(&outcome, "", Some(1));
        assert!(view.notice.is_none());
        assert_eq!(
            view.banner.as_deref(),
            Some("0 resultados encontrados con 1 estrella")
        );
    }
}
