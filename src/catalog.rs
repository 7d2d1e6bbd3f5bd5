//! Hotel catalog: the loaded listing plus its search index
//!
//! The listing comes from the server (`/api/hotels`, cached on disk) or
//! from a local JSON file. The fuzzy index is built once per load and is
//! read-only afterwards.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::api::{parse_listing, HotelClient};
use crate::cache::ListingCache;
use crate::config::{RuntimeContext, SearchConfig};
use crate::fuzzy::{find_hotel, FuzzyIndex, MatchResult, SearchHit};
use crate::hotel::Hotel;
use crate::recommend::{recommend, RecommendationFilter};
use crate::search::{filter_hotels, SearchOutcome};

/// Where the listing is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotelSource {
    Server(String),
    File(PathBuf),
}

impl HotelSource {
    /// Resolve the source: a local file wins over the server
    pub fn from_context(ctx: &RuntimeContext) -> Result<Self> {
        if let Some(path) = ctx.hotels_file() {
            return Ok(HotelSource::File(path));
        }
        Ok(HotelSource::Server(
            ctx.server_url()?.trim_end_matches('/').to_string(),
        ))
    }

    /// Key identifying this source in the cache
    pub fn cache_key(&self) -> String {
        match self {
            HotelSource::Server(url) => url.clone(),
            HotelSource::File(path) => format!("file://{}", path.display()),
        }
    }
}

impl fmt::Display for HotelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotelSource::Server(url) => write!(f, "{url}"),
            HotelSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read a listing from a local JSON file
pub fn read_hotels_file(path: &Path) -> Result<Vec<Hotel>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading hotel listing {}", path.display()))?;
    let payload = serde_json::from_str(&content)
        .with_context(|| format!("parsing hotel listing {}", path.display()))?;
    parse_listing(payload).with_context(|| format!("reading hotel listing {}", path.display()))
}

/// Fetch the listing from the server, going through the cache when allowed
pub async fn fetch_hotels(ctx: &RuntimeContext, refresh: bool) -> Result<Vec<Hotel>> {
    let source = HotelSource::from_context(ctx)?;
    log::debug!("Loading listing from {source}");
    let url = match &source {
        HotelSource::File(path) => return read_hotels_file(path),
        HotelSource::Server(url) => url.clone(),
    };

    let cache = if ctx.use_cache() {
        Some(ListingCache::open()?)
    } else {
        None
    };

    let client = HotelClient::new(ctx)?;
    fetch_through_cache(&client, cache.as_ref(), &url, ctx.config.cache.ttl, refresh).await
}

/// Serve a fresh cache, else fetch and store. Unless refreshing, an
/// expired cache for the same source stands in when the fetch fails.
async fn fetch_through_cache(
    client: &HotelClient,
    cache: Option<&ListingCache>,
    source: &str,
    ttl: u64,
    refresh: bool,
) -> Result<Vec<Hotel>> {
    if !refresh {
        if let Some(hotels) = cache.and_then(|c| c.load(source)) {
            return Ok(hotels);
        }
    }

    let hotels = match client.get_hotels().await {
        Ok(hotels) => hotels,
        Err(err) if refresh => return Err(err),
        Err(err) => match cache.and_then(|c| c.load_stale(source)) {
            Some(hotels) => {
                log::warn!("Listing server unavailable, using cached listing: {err:#}");
                return Ok(hotels);
            }
            None => return Err(err),
        },
    };
    log::info!("Fetched {} hotels from {}", hotels.len(), client.base_url());

    if let Some(cache) = cache {
        if let Err(err) = cache.store(&hotels, ttl, source) {
            log::warn!("Could not cache listing: {err:#}");
        }
    }

    Ok(hotels)
}

/// Loaded listing with its search index
pub struct Catalog {
    hotels: Vec<Hotel>,
    index: FuzzyIndex,
    options: SearchConfig,
}

impl Catalog {
    pub fn new(hotels: Vec<Hotel>, options: SearchConfig) -> Self {
        let index = FuzzyIndex::new(&hotels, &options);
        if index.is_empty() {
            log::warn!("The hotel listing is empty");
        } else {
            log::debug!("Indexed {} hotels", index.len());
        }
        Self {
            hotels,
            index,
            options,
        }
    }

    /// Load the configured listing
    pub async fn load(ctx: &RuntimeContext) -> Result<Self> {
        let hotels = fetch_hotels(ctx, false).await?;
        Ok(Self::new(hotels, ctx.config.search.clone()))
    }

    pub fn hotels(&self) -> &[Hotel] {
        &self.hotels
    }

    /// Run the full query pipeline
    pub fn search(&self, query: &str, stars: Option<u8>) -> SearchOutcome<'_> {
        filter_hotels(&self.hotels, &self.index, query, stars, &self.options)
    }

    /// Autocomplete: best fuzzy hits for a partial query
    pub fn suggest(&self, query: &str) -> Vec<(&Hotel, SearchHit)> {
        self.index
            .search_limit(query, self.options.suggestion_limit)
            .into_iter()
            .filter_map(|hit| self.hotels.get(hit.position).map(|hotel| (hotel, hit)))
            .collect()
    }

    /// Look up one hotel by slug or name
    pub fn find(&self, input: &str) -> MatchResult<&Hotel> {
        find_hotel(input, &self.hotels, &self.index)
    }

    pub fn recommend(&self, filter: &RecommendationFilter) -> Vec<&Hotel> {
        recommend(&self.hotels, filter, self.options.recommendation_limit)
    }
}
