//! Listing and detail commands

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use tabled::Tabled;

use crate::catalog::Catalog;
use crate::config::RuntimeContext;
use crate::fuzzy::{Match, MatchResult};
use crate::hotel::Hotel;
use crate::output::{output_for_format, print_table, truncate};

/// Confidence lead the best candidate needs over the runner-up
const CLEAR_WINNER_MARGIN: f64 = 0.1;

/// Candidates listed in an ambiguity error
const MAX_CANDIDATES: usize = 5;

#[derive(Debug, Tabled)]
pub struct HotelRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Stars")]
    stars: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Amenities")]
    amenities: String,
}

impl From<&Hotel> for HotelRow {
    fn from(hotel: &Hotel) -> Self {
        let rating = hotel.rating_value();
        Self {
            name: hotel.name.clone(),
            stars: hotel.stars_display(),
            rating: if rating > 0.0 {
                format!("{rating:.1}")
            } else {
                "-".to_string()
            },
            price: truncate(hotel.price_label(), 24),
            location: truncate(hotel.location_label(), 28),
            amenities: truncate(&hotel.amenities, 40),
        }
    }
}

/// Print hotels as a table, with a fallback line when there are none
pub fn print_hotels(ctx: &RuntimeContext, hotels: &[&Hotel]) -> Result<()> {
    if hotels.is_empty() {
        println!("No hotels found");
        return Ok(());
    }
    let rows: Vec<HotelRow> = hotels.iter().map(|h| HotelRow::from(*h)).collect();
    print_table(ctx, &rows)
}

pub async fn list(ctx: &RuntimeContext) -> Result<()> {
    let catalog = Catalog::load(ctx).await?;
    let hotels: Vec<&Hotel> = catalog.hotels().iter().collect();

    output_for_format(ctx, &hotels, || print_hotels(ctx, &hotels))
}

#[derive(Debug, Serialize)]
struct HotelDetail<'a> {
    slug: String,
    star_count: Option<u8>,
    rating_value: f64,
    price_lookup_url: Option<String>,
    hotel: &'a Hotel,
}

pub async fn show(ctx: &RuntimeContext, input: &str) -> Result<()> {
    let catalog = Catalog::load(ctx).await?;
    let found = pick_match(input, catalog.find(input))?;
    let hotel = found.item;

    if found.confidence < 1.0 {
        log::info!(
            "Matched {:?} to {:?} ({:?}, confidence {:.2})",
            found.matched_input,
            found.matched_on,
            found.match_type,
            found.confidence
        );
    }

    let detail = HotelDetail {
        slug: hotel.slug(),
        star_count: hotel.star_count(),
        rating_value: hotel.rating_value(),
        price_lookup_url: hotel.price_lookup_url(),
        hotel,
    };

    output_for_format(ctx, &detail, || {
        println!("{}", hotel.name);
        println!("{}", "=".repeat(hotel.name.chars().count()));
        println!("Stars:     {}", hotel.stars_display());
        println!("Rating:    {:.1}", detail.rating_value);
        println!("Price:     {}", hotel.price_label());
        if let Some(url) = &detail.price_lookup_url {
            println!("           Find prices: {url}");
        }
        println!("Location:  {}", hotel.location_label());
        if !hotel.kind.is_empty() {
            println!("Type:      {}", hotel.kind);
        }
        if !hotel.amenities.is_empty() {
            println!("Amenities: {}", hotel.amenities);
        }
        if !hotel.link.is_empty() {
            println!("Link:      {}", hotel.link);
        }
        if !hotel.description.is_empty() {
            println!();
            println!("{}", hotel.description.trim());
        }
        Ok(())
    })
}

/// Resolve a match result to one hotel, or explain the ambiguity
fn pick_match<'a>(input: &str, result: MatchResult<&'a Hotel>) -> Result<Match<&'a Hotel>> {
    match result {
        MatchResult::Single(m) => Ok(m),
        MatchResult::Multiple(mut matches) => {
            matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
            let clear_winner = matches.len() < 2
                || matches[0].confidence - matches[1].confidence > CLEAR_WINNER_MARGIN;
            if clear_winner {
                return MatchResult::Multiple(matches)
                    .best()
                    .ok_or_else(|| anyhow!("No hotel matches '{input}'"));
            }

            let candidates: Vec<String> = matches
                .iter()
                .take(MAX_CANDIDATES)
                .map(|m| format!("{} ({})", m.item.name, m.item.slug()))
                .collect();
            bail!(
                "'{input}' matches several hotels. Did you mean:\n  {}",
                candidates.join("\n  ")
            )
        }
        MatchResult::None => bail!("No hotel matches '{input}'"),
    }
}
