//! Preference-based recommendations
//!
//! Narrows the listing by star classification, minimum rating and
//! important amenities. Without any preference the first few hotels of
//! the listing are recommended as-is.

use serde::Serialize;

use crate::hotel::Hotel;
use crate::text::normalize;

/// Hotels recommended when no preference is given
pub const UNFILTERED_LIMIT: usize = 10;

/// Recommendation preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendationFilter {
    /// Accepted star classifications (any of)
    pub stars: Vec<u8>,
    /// Lowest accepted rating
    pub min_rating: Option<f64>,
    /// Important amenities (any of)
    pub amenities: Vec<String>,
}

impl RecommendationFilter {
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty() && self.min_rating.is_none() && self.amenities.is_empty()
    }

    pub fn accepts(&self, hotel: &Hotel) -> bool {
        if !self.stars.is_empty() {
            let stars = hotel.stars_count.or_else(|| hotel.star_count());
            if !stars.is_some_and(|s| self.stars.contains(&s)) {
                return false;
            }
        }

        if let Some(min_rating) = self.min_rating {
            if hotel.rating_value() < min_rating {
                return false;
            }
        }

        if !self.amenities.is_empty() {
            let text = normalize(&hotel.amenities);
            let mut wanted = self
                .amenities
                .iter()
                .map(|a| normalize(a))
                .filter(|a| !a.is_empty());
            if !wanted.any(|amenity| text.contains(&amenity)) {
                return false;
            }
        }

        true
    }
}

/// Recommend hotels for the given preferences, in listing order
pub fn recommend<'a>(hotels: &'a [Hotel], filter: &RecommendationFilter, limit: usize) -> Vec<&'a Hotel> {
    if filter.is_empty() {
        return hotels.iter().take(UNFILTERED_LIMIT.min(limit)).collect();
    }

    let recommended: Vec<&Hotel> = hotels
        .iter()
        .filter(|hotel| filter.accepts(hotel))
        .take(limit)
        .collect();

    log::debug!(
        "Recommendations for {:?}: {} of {} hotels",
        filter,
        recommended.len(),
        hotels.len()
    );
    recommended
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel(name: &str, stars: &str, rating: f64, amenities: &str) -> Hotel {
        Hotel {
            name: name.to_string(),
            stars: stars.to_string(),
            rating_score: Some(rating),
            amenities: amenities.to_string(),
            ..Hotel::default()
        }
    }

    fn listing() -> Vec<Hotel> {
        vec![
            hotel("Caribe", "5 estrellas", 9.0, "Piscina, Spa"),
            hotel("Laguito", "3", 7.2, "WiFi gratis"),
            hotel("Centro", "4", 8.4, "Desayuno, WiFi"),
            hotel("Hostal", "Sin clasificar", 6.0, ""),
        ]
    }

    fn names(hotels: &[&Hotel]) -> Vec<String> {
        hotels.iter().map(|h| h.name.clone()).collect()
    }

    #[test]
    fn test_no_preferences_returns_first_ten() {
        let hotels: Vec<Hotel> = (0..15)
            .map(|i| hotel(&format!("H{i}"), "3", 7.0, ""))
            .collect();

        let result = recommend(&hotels, &RecommendationFilter::default(), 20);
        assert_eq!(result.len(), UNFILTERED_LIMIT);
        assert_eq!(result[0].name, "H0");
    }

    #[test]
    fn test_filter_by_stars() {
        let hotels = listing();
        let filter = RecommendationFilter {
            stars: vec![4, 5],
            ..Default::default()
        };
        assert_eq!(names(&recommend(&hotels, &filter, 20)), vec!["Caribe", "Centro"]);
    }

    #[test]
    fn test_explicit_stars_count_wins() {
        let mut h = hotel("Explicit", "Sin clasificar", 8.0, "");
        h.stars_count = Some(4);
        let filter = RecommendationFilter {
            stars: vec![4],
            ..Default::default()
        };
        assert!(filter.accepts(&h));
    }

    #[test]
    fn test_filter_by_min_rating() {
        let hotels = listing();
        let filter = RecommendationFilter {
            min_rating: Some(8.0),
            ..Default::default()
        };
        assert_eq!(names(&recommend(&hotels, &filter, 20)), vec!["Caribe", "Centro"]);
    }

    #[test]
    fn test_amenities_any_of() {
        let hotels = listing();
        let filter = RecommendationFilter {
            amenities: vec!["wifi".to_string(), "spa".to_string()],
            ..Default::default()
        };
        assert_eq!(
            names(&recommend(&hotels, &filter, 20)),
            vec!["Caribe", "Laguito", "Centro"]
        );
    }

    #[test]
    fn test_combined_filters_and_cap() {
        let hotels = listing();
        let filter = RecommendationFilter {
            stars: vec![3, 4, 5],
            min_rating: Some(7.0),
            amenities: vec!["WiFi".to_string()],
        };
        assert_eq!(names(&recommend(&hotels, &filter, 20)), vec!["Laguito", "Centro"]);
        assert_eq!(names(&recommend(&hotels, &filter, 1)), vec!["Laguito"]);
    }
}
