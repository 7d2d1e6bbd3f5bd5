//! Search command implementation

use anyhow::Result;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::cli::SearchArgs;
use crate::commands::hotels::print_hotels;
use crate::config::RuntimeContext;
use crate::hotel::Hotel;
use crate::intent::Preferences;
use crate::output::output_for_format;
use crate::recommend::RecommendationFilter;
use crate::search::{ResultsView, SearchMode, SearchOutcome};

#[derive(Debug, Serialize)]
struct SearchReport<'a> {
    query: &'a str,
    stars: Option<u8>,
    mode: SearchMode,
    matched_via_fuzzy: bool,
    preferences: Option<&'a Preferences>,
    view: &'a ResultsView,
    hotels: &'a [&'a Hotel],
}

pub async fn run(ctx: &RuntimeContext, args: SearchArgs) -> Result<()> {
    let query = args.query.join(" ");
    let catalog = Catalog::load(ctx).await?;

    let outcome = catalog.search(&query, args.stars);
    let view = ResultsView::from_outcome(&outcome, &query, args.stars);

    if let Some(notice) = &view.notice {
        if !ctx.global.quiet {
            eprintln!("{}", notice.message);
        }
    }

    let report = SearchReport {
        query: query.trim(),
        stars: args.stars,
        mode: outcome.mode,
        matched_via_fuzzy: outcome.matched_via_fuzzy(),
        preferences: outcome.preferences.as_ref(),
        view: &view,
        hotels: &outcome.hotels,
    };

    output_for_format(ctx, &report, || {
        if view.show_recommendations {
            let recommended = catalog.recommend(&RecommendationFilter::default());
            if !recommended.is_empty() {
                println!("Recomendados");
                print_hotels(ctx, &recommended)?;
                println!();
            }
        }

        println!("{}", view.heading);
        if let Some(banner) = &view.banner {
            println!("{banner}");
        }
        if args.explain {
            println!("{}", explain(&outcome));
        }
        println!();
        print_hotels(ctx, &outcome.hotels)
    })
}

/// One-line account of how the results were chosen
fn explain(outcome: &SearchOutcome<'_>) -> String {
    let preferences = outcome
        .preferences
        .as_ref()
        .map(Preferences::describe)
        .unwrap_or_else(|| "no recognized preferences".to_string());

    match outcome.mode {
        SearchMode::All => "Showing the full listing".to_string(),
        SearchMode::Vague => "Vague query: showing the top rated hotels".to_string(),
        SearchMode::Structured => format!("Filtered by {preferences}"),
        SearchMode::FuzzyFallback => {
            format!("Nothing matched {preferences}; showing fuzzy matches instead")
        }
        SearchMode::Fuzzy => "No keywords recognized: showing fuzzy matches".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    fn catalog() -> Catalog {
        let hotels = vec![
            Hotel {
                name: "Hotel Mar".to_string(),
                amenities: "piscina, wifi".to_string(),
                price: "barato".to_string(),
                location: "Bocagrande".to_string(),
                stars: "4".to_string(),
                ..Hotel::default()
            },
            Hotel {
                name: "Casa Luna".to_string(),
                amenities: "jacuzzi".to_string(),
                price: "premium".to_string(),
                location: "Centro".to_string(),
                stars: "5".to_string(),
                ..Hotel::default()
            },
        ];
        Catalog::new(hotels, SearchConfig::default())
    }

    #[test]
    fn test_explain_modes() {
        let catalog = catalog();

        assert_eq!(explain(&catalog.search("", None)), "Showing the full listing");
        assert_eq!(
            explain(&catalog.search("no importa", None)),
            "Vague query: showing the top rated hotels"
        );
        assert_eq!(
            explain(&catalog.search("piscina barato", None)),
            "Filtered by amenities: piscina; price: barato"
        );
        assert_eq!(
            explain(&catalog.search("xyzabc123", None)),
            "No keywords recognized: showing fuzzy matches"
        );
    }

    #[test]
    fn test_report_serialization() {
        let catalog = catalog();
        let outcome = catalog.search("piscina barato", None);
        let view = ResultsView::from_outcome(&outcome, "piscina barato", None);
        let report = SearchReport {
            query: "piscina barato",
            stars: None,
            mode: outcome.mode,
            matched_via_fuzzy: outcome.matched_via_fuzzy(),
            preferences: outcome.preferences.as_ref(),
            view: &view,
            hotels: &outcome.hotels,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "structured");
        assert_eq!(json["matched_via_fuzzy"], false);
        assert_eq!(json["hotels"][0]["name"], "Hotel Mar");
        assert_eq!(json["view"]["banner"], "1 resultado encontrado para \"piscina barato\"");
    }
}
