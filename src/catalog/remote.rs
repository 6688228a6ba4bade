//! Optional remote catalog overlay: fetched as plain JSON, cached under the
//! project cache dir with a TTL. Freshness is tracked by a `fetched_at`
//! timestamp embedded in the cached payload so it survives file copies.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::CatalogOverlay;

const CACHE_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Serialize, Deserialize)]
struct CachedOverlay {
    fetched_at: DateTime<Utc>,
    overlay: CatalogOverlay,
}

fn cache_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cloudcost").map(|d| d.cache_dir().join("catalog.json"))
}

fn load_cached(require_fresh: bool) -> Option<CatalogOverlay> {
    let path = cache_path()?;
    let data = fs::read_to_string(&path).ok()?;
    let cached: CachedOverlay = serde_json::from_str(&data).ok()?;
    if require_fresh {
        let age = Utc::now().signed_duration_since(cached.fetched_at);
        if age.num_seconds() >= CACHE_TTL_SECS {
            return None;
        }
    }
    Some(cached.overlay)
}

fn save_cache(overlay: &CatalogOverlay) {
    let Some(path) = cache_path() else { return };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let cached = CachedOverlay {
        fetched_at: Utc::now(),
        overlay: CatalogOverlay {
            pricing: overlay.pricing.clone(),
            knowledge: overlay.knowledge.clone(),
            approved: overlay.approved.clone(),
        },
    };
    let _ = fs::write(&path, serde_json::to_string(&cached).unwrap_or_default());
}

fn fetch(url: &str) -> Result<CatalogOverlay> {
    let body = ureq::get(url).call()?.body_mut().read_to_string()?;
    let overlay: CatalogOverlay =
        serde_json::from_str(&body).context("Failed to parse remote catalog")?;
    Ok(overlay)
}

pub fn load_overlay(url: &str, offline: bool) -> Result<CatalogOverlay> {
    // Try cache first
    if let Some(overlay) = load_cached(true) {
        return Ok(overlay);
    }

    if offline {
        // Offline: accept stale cache
        if let Some(overlay) = load_cached(false) {
            eprintln!("Warning: using stale catalog cache");
            return Ok(overlay);
        }
        bail!("--offline: no cached catalog overlay found");
    }

    // Fetch fresh
    match fetch(url) {
        Ok(overlay) => {
            save_cache(&overlay);
            Ok(overlay)
        }
        Err(e) => {
            // Stale cache beats the builtin-only fallback
            if let Some(overlay) = load_cached(false) {
                eprintln!("Warning: catalog fetch failed ({e}), using stale cache");
                return Ok(overlay);
            }
            Err(e).context("Failed to fetch remote catalog")
        }
    }
}
