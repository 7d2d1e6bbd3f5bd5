//! Listing cache for staysift
//!
//! Keeps the last fetched hotel listing on disk for:
//! - Fast repeated searches without network calls
//! - Offline use when the listing server is down
//!
//! Cache is stored at XDG_CACHE_HOME/staysift/ with configurable TTL.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::hotel::Hotel;

const APP_NAME: &str = env!("CARGO_PKG_NAME");

const HOTELS_FILE: &str = "hotels.json";

/// Default TTL values in seconds
pub mod ttl {
    /// Hotel listing - scraped rarely (1 hour)
    pub const HOTELS: u64 = 3600;
}

/// A cache file with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile<T> {
    /// When the cache was last updated
    pub updated_at: u64,
    /// TTL in seconds
    pub ttl: u64,
    /// Listing source this cache is for (to invalidate on source change)
    pub source: String,
    /// The cached data
    pub data: T,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl<T> CacheFile<T> {
    pub fn new(data: T, ttl: u64, source: String) -> Self {
        Self {
            updated_at: now_secs(),
            ttl,
            source,
            data,
        }
    }

    pub fn is_valid(&self, source: &str) -> bool {
        self.source == source && now_secs() < self.updated_at.saturating_add(self.ttl)
    }

    pub fn age(&self) -> Duration {
        Duration::from_secs(now_secs().saturating_sub(self.updated_at))
    }

    pub fn expires_in(&self) -> Option<Duration> {
        let now = now_secs();
        let expires_at = self.updated_at.saturating_add(self.ttl);
        (now < expires_at).then(|| Duration::from_secs(expires_at - now))
    }
}

/// On-disk copy of the hotel listing
#[derive(Debug, Clone)]
pub struct ListingCache {
    dir: PathBuf,
}

impl ListingCache {
    /// Cache in the default XDG location
    pub fn open() -> Result<Self> {
        Ok(Self::at(cache_dir()?))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn hotels_path(&self) -> PathBuf {
        self.dir.join(HOTELS_FILE)
    }

    fn read(&self) -> Option<CacheFile<Vec<Hotel>>> {
        let path = self.hotels_path();
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(file) => Some(file),
            Err(err) => {
                log::warn!("Ignoring unreadable cache {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Load the cached listing if it is fresh and for the same source
    pub fn load(&self, source: &str) -> Option<Vec<Hotel>> {
        let file = self.read()?;
        if file.is_valid(source) {
            log::debug!(
                "Listing cache hit: {} hotels, {} old",
                file.data.len(),
                humantime::format_duration(file.age())
            );
            Some(file.data)
        } else {
            log::debug!("Listing cache expired or for different source");
            None
        }
    }

    /// Load the cached listing for this source even when it has expired
    pub fn load_stale(&self, source: &str) -> Option<Vec<Hotel>> {
        let file = self.read().filter(|file| file.source == source)?;
        log::debug!(
            "Using stale listing cache: {} hotels, {} old",
            file.data.len(),
            humantime::format_duration(file.age())
        );
        Some(file.data)
    }

    /// Save a freshly fetched listing
    pub fn store(&self, hotels: &[Hotel], ttl: u64, source: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating cache directory {}", self.dir.display()))?;

        let path = self.hotels_path();
        let file = CacheFile::new(hotels, ttl, source.to_string());
        let content = serde_json::to_string_pretty(&file)?;
        fs::write(&path, content)
            .with_context(|| format!("writing listing cache to {}", path.display()))?;

        log::info!("Cached {} hotels at {}", hotels.len(), path.display());
        Ok(())
    }

    /// Remove all cache files
    pub fn clear(&self) -> Result<bool> {
        if !self.dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&self.dir)
            .with_context(|| format!("removing cache directory {}", self.dir.display()))?;
        Ok(true)
    }

    /// Status of the cached listing relative to `source`
    pub fn status(&self, source: &str) -> Result<CacheStatus> {
        let path = self.hotels_path();
        let hotels = if path.exists() {
            let metadata = fs::metadata(&path)
                .with_context(|| format!("reading metadata of {}", path.display()))?;
            self.read().map(|file| CacheFileStatus {
                path: path.clone(),
                count: file.data.len(),
                size_bytes: metadata.len(),
                age_secs: file.age().as_secs(),
                expires_in_secs: file.expires_in().map(|d| d.as_secs()),
                current_source: file.source == source,
                source: file.source,
            })
        } else {
            None
        };

        Ok(CacheStatus {
            cache_dir: self.dir.clone(),
            total_size_bytes: hotels.as_ref().map_or(0, |s| s.size_bytes),
            hotels,
        })
    }
}

/// Get the cache directory path
pub fn cache_dir() -> Result<PathBuf> {
    // Check XDG_CACHE_HOME first
    if let Some(dir) = env::var_os("XDG_CACHE_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    // Use platform-specific cache directory
    if let Some(mut dir) = dirs::cache_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    // Fallback to ~/.cache
    dirs::home_dir()
        .map(|home| home.join(".cache").join(APP_NAME))
        .ok_or_else(|| anyhow::anyhow!("unable to determine cache directory"))
}

/// Cache status information
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub cache_dir: PathBuf,
    pub hotels: Option<CacheFileStatus>,
    pub total_size_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheFileStatus {
    pub path: PathBuf,
    pub count: usize,
    pub size_bytes: u64,
    pub age_secs: u64,
    pub expires_in_secs: Option<u64>,
    pub source: String,
    /// Whether the cache belongs to the configured source
    pub current_source: bool,
}
