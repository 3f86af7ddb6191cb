// LeadScout Engine — Configuration
// One serde-backed struct holds every tunable the core consumes: cipher key
// material, quota ceilings, pause TTL, retry shape, fetch-variant order, and
// the niche → hashtag presets. Nothing in the core logic hard-codes these;
// the embedding application loads/persists this struct and may override any
// field. `from_env()` applies `LEADSCOUT_*` environment overrides on top of
// the defaults for simple deployments.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::atoms::constants::*;

/// One upstream query variant the adaptive fetch chain may try.
/// `name` selects the upstream method; `params` carries that method's extra
/// parameter set. Order in `CoreConfig::fetch_variants` encodes preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchVariant {
    pub name: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl FetchVariant {
    pub fn named(name: &str) -> Self {
        FetchVariant { name: name.to_string(), params: json!({}) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Base64-encoded 32-byte AES-256-GCM key for session blobs.
    /// Absent ⇒ `SessionCipher::from_config` fails with a config error.
    pub cipher_key: Option<String>,

    /// Data root override. Default: `~/.leadscout/`.
    pub data_dir: Option<PathBuf>,

    /// Per-caller request ceilings, checked after counting (fail expensive).
    pub hourly_cap: u64,
    pub daily_cap: u64,

    /// Pause circuit-breaker TTL in seconds.
    pub pause_ttl_secs: u64,

    /// Retry policy shape for transient upstream failures.
    pub max_retries: u32,
    pub backoff_base_ms: u64,

    /// Ordered upstream query variants — richer "recent" methods first,
    /// coarser fallbacks last.
    pub fetch_variants: Vec<FetchVariant>,

    /// Substrings identifying a shape/validation mismatch in upstream
    /// error text (the typed `ShapeMismatch` variant always matches).
    pub shape_markers: Vec<String>,

    /// Media requested per hashtag per query.
    pub media_per_tag: u32,

    /// Shared lead-emission budget across all tags in one query.
    pub lead_cap: usize,

    /// Named hashtag presets. A query names a preset ("fitness") or
    /// supplies custom tags; either way at most three tags are scanned.
    pub niches: HashMap<String, Vec<String>>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            cipher_key: None,
            data_dir: None,
            hourly_cap: DEFAULT_HOURLY_CAP,
            daily_cap: DEFAULT_DAILY_CAP,
            pause_ttl_secs: DEFAULT_PAUSE_TTL_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            fetch_variants: default_fetch_variants(),
            shape_markers: default_shape_markers(),
            media_per_tag: DEFAULT_MEDIA_PER_TAG,
            lead_cap: DEFAULT_LEAD_CAP,
            niches: default_niches(),
        }
    }
}

impl CoreConfig {
    /// Defaults with `LEADSCOUT_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut cfg = CoreConfig::default();
        if let Ok(key) = std::env::var(ENV_CIPHER_KEY) {
            if !key.is_empty() {
                cfg.cipher_key = Some(key);
            }
        }
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.is_empty() {
                cfg.data_dir = Some(PathBuf::from(dir));
            }
        }
        if let Some(v) = env_u64(ENV_HOURLY_CAP) {
            cfg.hourly_cap = v;
        }
        if let Some(v) = env_u64(ENV_DAILY_CAP) {
            cfg.daily_cap = v;
        }
        if let Some(v) = env_u64(ENV_PAUSE_TTL_SECS) {
            cfg.pause_ttl_secs = v;
        }
        if let Some(v) = env_u64(ENV_MAX_RETRIES) {
            cfg.max_retries = v as u32;
        }
        if let Some(v) = env_u64(ENV_BACKOFF_BASE_MS) {
            cfg.backoff_base_ms = v;
        }
        cfg
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Preference order against the unstable upstream contract: the rich
/// "recent" endpoint first, its older v1 form next, the coarse "top"
/// listing as a last resort.
fn default_fetch_variants() -> Vec<FetchVariant> {
    vec![
        FetchVariant::named("recent"),
        FetchVariant::named("recent_v1"),
        FetchVariant::named("top"),
    ]
}

/// Error-text fragments the upstream library emits when a response fails
/// its local structural validation (as opposed to auth or throttling).
fn default_shape_markers() -> Vec<String> {
    vec![
        "validation error".to_string(),
        "field required".to_string(),
        "value is not a valid".to_string(),
        "unexpected keyword".to_string(),
        "KeyError".to_string(),
    ]
}

fn default_niches() -> HashMap<String, Vec<String>> {
    let presets = [
        ("fitness", ["fitness", "workout", "gym"]),
        ("beauty", ["beauty", "skincare", "makeup"]),
        ("travel", ["travel", "wanderlust", "travelgram"]),
        ("food", ["food", "foodie", "foodporn"]),
    ];
    presets
        .into_iter()
        .map(|(niche, tags)| {
            (niche.to_string(), tags.into_iter().map(String::from).collect())
        })
        .collect()
}
