// ── LeadScout Atoms: Constants ─────────────────────────────────────────────
// All named defaults for the crate live here.
// Rationale: collecting constants in one place eliminates magic numbers and
// keeps every tunable auditable next to its env-var override name.

// ── Quota governance ───────────────────────────────────────────────────────
// The hourly ceiling matches the upstream pacing we can sustain without
// tripping anti-automation heuristics; the daily ceiling is a backstop.
pub(crate) const DEFAULT_HOURLY_CAP: u64 = 30;
pub(crate) const DEFAULT_DAILY_CAP: u64 = 200;

/// Hour-bucket counters expire one window after creation.
pub(crate) const HOUR_BUCKET_TTL_SECS: u64 = 3_600;
/// Day-bucket counters expire one window after creation.
pub(crate) const DAY_BUCKET_TTL_SECS: u64 = 86_400;

/// How long a caller stays paused after an upstream challenge.
pub(crate) const DEFAULT_PAUSE_TTL_SECS: u64 = 86_400;

// ── Retry policy ───────────────────────────────────────────────────────────
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 2;
pub(crate) const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

// ── Discovery query shape ──────────────────────────────────────────────────
/// Shared emission budget across all tags in one query.
pub(crate) const DEFAULT_LEAD_CAP: usize = 20;
/// Media requested per hashtag per query.
pub(crate) const DEFAULT_MEDIA_PER_TAG: u32 = 15;
/// At most this many hashtags are scanned per query.
pub(crate) const MAX_TAGS_PER_QUERY: usize = 3;

// ── Environment variable names (config overrides) ──────────────────────────
pub(crate) const ENV_CIPHER_KEY: &str = "LEADSCOUT_CIPHER_KEY";
pub(crate) const ENV_DATA_DIR: &str = "LEADSCOUT_DATA_DIR";
pub(crate) const ENV_HOURLY_CAP: &str = "LEADSCOUT_HOURLY_CAP";
pub(crate) const ENV_DAILY_CAP: &str = "LEADSCOUT_DAILY_CAP";
pub(crate) const ENV_PAUSE_TTL_SECS: &str = "LEADSCOUT_PAUSE_TTL_SECS";
pub(crate) const ENV_MAX_RETRIES: &str = "LEADSCOUT_MAX_RETRIES";
pub(crate) const ENV_BACKOFF_BASE_MS: &str = "LEADSCOUT_BACKOFF_BASE_MS";
