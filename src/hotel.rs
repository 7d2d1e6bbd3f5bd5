//! Hotel records as served by the listing API
//!
//! The listing is produced by a scraper, so most fields are loosely typed:
//! ratings may arrive as text or numbers, amenities as a comma-separated
//! string or as a JSON list, and missing values as `null`.

use serde::{Deserialize, Serialize};

use crate::text::slugify;

/// Price texts that mean "no price known"
const UNAVAILABLE_PRICES: &[&str] = &["n/d", "consultar"];

/// Star texts that mean "not classified"
const UNRATED_STARS: &[&str] = &["no disponible", "sin clasificar"];

/// A single hotel listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotel {
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub slug: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(deserialize_with = "lenient::text")]
    pub price: String,
    #[serde(deserialize_with = "lenient::text")]
    pub stars: String,
    pub stars_count: Option<u8>,
    #[serde(deserialize_with = "lenient::text")]
    pub rating: String,
    pub rating_score: Option<f64>,
    pub valoracion_promedio: Option<f64>,
    #[serde(deserialize_with = "lenient::joined")]
    pub amenities: String,
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub kind: String,
    #[serde(deserialize_with = "lenient::text")]
    pub image: String,
    #[serde(deserialize_with = "lenient::text")]
    pub link: String,
}

impl Hotel {
    /// URL slug, derived from the name when the listing has none
    pub fn slug(&self) -> String {
        if self.slug.trim().is_empty() {
            slugify(&self.name)
        } else {
            self.slug.clone()
        }
    }

    /// Star classification: the first digit found in the stars text.
    ///
    /// Returns `None` for unclassified hotels and unparseable text.
    pub fn star_count(&self) -> Option<u8> {
        let stars = self.stars.trim();
        if stars.is_empty() || UNRATED_STARS.contains(&stars.to_lowercase().as_str()) {
            return None;
        }

        stars
            .chars()
            .find_map(|c| c.to_digit(10))
            .and_then(|d| u8::try_from(d).ok())
    }

    /// Whether the listing carries a usable price
    pub fn has_price(&self) -> bool {
        let price = self.price.trim();
        !price.is_empty() && !UNAVAILABLE_PRICES.contains(&price.to_lowercase().as_str())
    }

    /// Numeric rating used for "top rated" ordering.
    ///
    /// Prefers the numeric score, then the textual rating (decimal comma
    /// accepted), then the users' average. Unrated hotels sort as 0.
    pub fn rating_value(&self) -> f64 {
        self.rating_score
            .or_else(|| parse_decimal(&self.rating))
            .or(self.valoracion_promedio)
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }

    /// Price text for display, "Consultar" when unknown
    pub fn price_label(&self) -> &str {
        if self.has_price() {
            self.price.trim()
        } else {
            "Consultar"
        }
    }

    /// Web search link for hotels without a published price
    pub fn price_lookup_url(&self) -> Option<String> {
        if self.has_price() {
            return None;
        }

        let query = format!("{} {}", self.name, self.location);
        Some(format!(
            "https://www.google.com/search?q={}+precio+hotel",
            urlencoding::encode(query.trim())
        ))
    }

    /// Five-slot star bar, or "Sin clasificar"
    pub fn stars_display(&self) -> String {
        match self.star_count() {
            Some(count) => {
                let filled = usize::from(count.min(5));
                format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
            }
            None => "Sin clasificar".to_string(),
        }
    }

    /// Location text for display
    pub fn location_label(&self) -> &str {
        let location = self.location.trim();
        if location.is_empty() {
            "No disponible"
        } else {
            location
        }
    }
}

fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.replace(',', ".").parse().ok()
}

/// Deserializers tolerant of the scraper's loose typing
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(value_to_text(Value::deserialize(deserializer)?))
    }

    pub fn joined<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .map(value_to_text)
                .filter(|item| !item.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            other => value_to_text(other),
        })
    }

    fn value_to_text(value: Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel_with_stars(stars: &str) -> Hotel {
        Hotel {
            name: "Hotel Test".to_string(),
            stars: stars.to_string(),
            ..Hotel::default()
        }
    }

    #[test]
    fn test_hotel_deserialize_api_record() {
        let json = r#"{
            "id": 7,
            "name": "Hotel Mar",
            "slug": "",
            "description": "Frente al mar",
            "location": "Bocagrande, Cartagena",
            "price": "COP 250.000",
            "stars": "4 estrellas",
            "stars_count": 4,
            "image": "",
            "images": [],
            "rating": "8,7",
            "rating_score": null,
            "rating_max_score": 10,
            "amenities": ["Piscina", "WiFi gratis"],
            "reviews": [],
            "link": "https://example.com/hotel-mar",
            "fuente_principal": "booking"
        }"#;

        let hotel: Hotel = serde_json::from_str(json).unwrap();
        assert_eq!(hotel.id, Some(7));
        assert_eq!(hotel.amenities, "Piscina, WiFi gratis");
        assert_eq!(hotel.slug(), "hotel-mar");
        assert_eq!(hotel.star_count(), Some(4));
        assert_eq!(hotel.rating_value(), 8.7);
    }

    #[test]
    fn test_hotel_deserialize_loose_types() {
        let json = r#"{"name": "Casa Luna", "stars": 5, "rating": 9.1, "amenities": null, "type": "casa"}"#;

        let hotel: Hotel = serde_json::from_str(json).unwrap();
        assert_eq!(hotel.stars, "5");
        assert_eq!(hotel.rating, "9.1");
        assert_eq!(hotel.amenities, "");
        assert_eq!(hotel.kind, "casa");
    }

    #[test]
    fn test_star_count() {
        assert_eq!(hotel_with_stars("3").star_count(), Some(3));
        assert_eq!(hotel_with_stars("Hotel de 5 estrellas").star_count(), Some(5));
        assert_eq!(hotel_with_stars("Sin clasificar").star_count(), None);
        assert_eq!(hotel_with_stars("No disponible").star_count(), None);
        assert_eq!(hotel_with_stars("").star_count(), None);
        assert_eq!(hotel_with_stars("estrellas").star_count(), None);
    }

    #[test]
    fn test_price_availability() {
        let mut hotel = Hotel::default();
        assert!(!hotel.has_price());
        assert_eq!(hotel.price_label(), "Consultar");

        hotel.price = "N/D".to_string();
        assert!(!hotel.has_price());

        hotel.price = "consultar".to_string();
        assert!(!hotel.has_price());

        hotel.price = "COP 120.000".to_string();
        assert!(hotel.has_price());
        assert_eq!(hotel.price_label(), "COP 120.000");
        assert!(hotel.price_lookup_url().is_none());
    }

    #[test]
    fn test_price_lookup_url() {
        let hotel = Hotel {
            name: "Hotel Mar".to_string(),
            location: "Bocagrande".to_string(),
            ..Hotel::default()
        };

        assert_eq!(
            hotel.price_lookup_url().unwrap(),
            "https://www.google.com/search?q=Hotel%20Mar%20Bocagrande+precio+hotel"
        );
    }

    #[test]
    fn test_rating_value_fallbacks() {
        let mut hotel = Hotel::default();
        assert_eq!(hotel.rating_value(), 0.0);

        hotel.valoracion_promedio = Some(7.5);
        assert_eq!(hotel.rating_value(), 7.5);

        hotel.rating = "8.0".to_string();
        assert_eq!(hotel.rating_value(), 8.0);

        hotel.rating_score = Some(9.2);
        assert_eq!(hotel.rating_value(), 9.2);
    }

    #[test]
    fn test_explicit_slug_wins() {
        let hotel = Hotel {
            name: "Hotel Mar".to_string(),
            slug: "mar-cartagena".to_string(),
            ..Hotel::default()
        };
        assert_eq!(hotel.slug(), "mar-cartagena");
    }

    #[test]
    fn test_stars_display() {
        assert_eq!(hotel_with_stars("4").stars_display(), "★★★★☆");
        assert_eq!(hotel_with_stars("9").stars_display(), "★★★★★");
        assert_eq!(hotel_with_stars("").stars_display(), "Sin clasificar");
    }
}
