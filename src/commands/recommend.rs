//! Recommendation command

use anyhow::Result;

use crate::api::HotelClient;
use crate::catalog::Catalog;
use crate::cli::RecommendArgs;
use crate::commands::hotels::print_hotels;
use crate::config::RuntimeContext;
use crate::hotel::Hotel;
use crate::output::output_for_format;
use crate::recommend::RecommendationFilter;

pub async fn run(ctx: &RuntimeContext, args: RecommendArgs) -> Result<()> {
    if args.remote {
        let client = HotelClient::new(ctx)?;
        let hotels = client.get_recommendations().await?;
        let hotels: Vec<&Hotel> = hotels.iter().collect();
        return output_for_format(ctx, &hotels, || print_hotels(ctx, &hotels));
    }

    let filter = RecommendationFilter {
        stars: args.stars,
        min_rating: args.min_rating,
        amenities: args.amenities,
    };

    let catalog = Catalog::load(ctx).await?;
    let hotels = catalog.recommend(&filter);

    output_for_format(ctx, &hotels, || print_hotels(ctx, &hotels))
}
