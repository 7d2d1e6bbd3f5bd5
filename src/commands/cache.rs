//! Cache management commands

use std::time::Duration;

use anyhow::Result;
use tabled::Tabled;

use crate::cache::{CacheStatus, ListingCache};
use crate::catalog::{fetch_hotels, HotelSource};
use crate::cli::{CacheCommand, OutputFormat};
use crate::config::RuntimeContext;
use crate::output::{output_for_format, print_table};

/// Execute cache commands
pub async fn execute(ctx: &RuntimeContext, command: CacheCommand) -> Result<()> {
    match command {
        CacheCommand::Status => status(ctx),
        CacheCommand::Refresh => refresh(ctx).await,
        CacheCommand::Clear => clear(ctx),
        CacheCommand::Path => path(ctx),
    }
}

#[derive(Tabled)]
struct CacheRow {
    #[tabled(rename = "Type")]
    cache_type: &'static str,
    #[tabled(rename = "Items")]
    items: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Expires In")]
    expires: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

impl From<&CacheStatus> for CacheRow {
    fn from(status: &CacheStatus) -> Self {
        match &status.hotels {
            Some(file) => CacheRow {
                cache_type: "Hotels",
                items: file.count.to_string(),
                size: format_bytes(file.size_bytes),
                age: format_duration(file.age_secs),
                expires: file
                    .expires_in_secs
                    .map(format_duration)
                    .unwrap_or_else(|| "expired".to_string()),
                status: match (file.current_source, file.expires_in_secs) {
                    (false, _) => "different source",
                    (true, None) => "stale",
                    (true, Some(_)) => "valid",
                },
            },
            None => CacheRow {
                cache_type: "Hotels",
                items: "-".to_string(),
                size: "-".to_string(),
                age: "-".to_string(),
                expires: "-".to_string(),
                status: "not cached",
            },
        }
    }
}

fn status(ctx: &RuntimeContext) -> Result<()> {
    let source = HotelSource::from_context(ctx)
        .map(|s| s.cache_key())
        .unwrap_or_else(|_| "unknown".to_string());
    let status = ListingCache::open()?.status(&source)?;

    output_for_format(ctx, &status, || {
        println!("Cache directory: {}", status.cache_dir.display());
        println!("Source: {source}");
        println!();
        print_table(ctx, &[CacheRow::from(&status)])?;
        println!();
        println!("Total size: {}", format_bytes(status.total_size_bytes));
        Ok(())
    })
}

async fn refresh(ctx: &RuntimeContext) -> Result<()> {
    if let HotelSource::File(path) = HotelSource::from_context(ctx)? {
        if !ctx.global.quiet {
            println!(
                "Listing is read from {}; nothing to cache.",
                path.display()
            );
        }
        return Ok(());
    }

    if !ctx.use_cache() {
        log::warn!("Caching is disabled; the listing will be fetched but not stored");
    }

    let hotels = fetch_hotels(ctx, true).await?;
    if !ctx.global.quiet {
        println!("Listing refreshed: {} hotels", hotels.len());
    }
    Ok(())
}

fn clear(ctx: &RuntimeContext) -> Result<()> {
    let cache = ListingCache::open()?;
    let removed = cache.clear()?;

    if !ctx.global.quiet {
        if removed {
            println!("Cache cleared: {}", cache.dir().display());
        } else {
            println!("Cache directory does not exist: {}", cache.dir().display());
        }
    }

    Ok(())
}

fn path(ctx: &RuntimeContext) -> Result<()> {
    let cache = ListingCache::open()?;
    let dir = cache.dir();

    match ctx.output_format() {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "path": dir.display().to_string() })
            );
        }
        OutputFormat::Yaml => {
            println!("path: {}", dir.display());
        }
        _ => {
            println!("{}", dir.display());
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn format_duration(secs: u64) -> String {
    humantime::format_duration(Duration::from_secs(secs)).to_string()
}
