//! Autocomplete suggestions

use anyhow::Result;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::RuntimeContext;
use crate::fuzzy::{SearchHit, SearchKey};
use crate::hotel::Hotel;
use crate::output::output_for_format;

#[derive(Debug, Serialize)]
struct Suggestion {
    name: String,
    slug: String,
    location: String,
    matched_on: SearchKey,
    score: f64,
}

impl Suggestion {
    fn new(hotel: &Hotel, hit: SearchHit) -> Self {
        Self {
            name: hotel.name.clone(),
            slug: hotel.slug(),
            location: hotel.location_label().to_string(),
            matched_on: hit.matched_on,
            score: hit.score,
        }
    }
}

pub async fn run(ctx: &RuntimeContext, query: &[String]) -> Result<()> {
    let query = query.join(" ");
    let catalog = Catalog::load(ctx).await?;

    let suggestions: Vec<Suggestion> = catalog
        .suggest(&query)
        .into_iter()
        .map(|(hotel, hit)| Suggestion::new(hotel, hit))
        .collect();

    output_for_format(ctx, &suggestions, || {
        if suggestions.is_empty() {
            println!("No suggestions for '{}'", query.trim());
        }
        for suggestion in &suggestions {
            log::debug!(
                "{} matched on {:?} (score {:.2})",
                suggestion.slug,
                suggestion.matched_on,
                suggestion.score
            );
            println!("{}  ({})", suggestion.name, suggestion.location);
        }
        Ok(())
    })
}
