// LeadScout Engine — Discovery Orchestrator
// The only piece touching every subsystem. One query runs one sequential
// chain: pause check → quota check → handle resolution → session
// load/decrypt → session probe under retry → per-tag fetch via the
// adaptive chain → filter/dedup with the shared cap → persist the
// refreshed session. Concurrent queries from different callers are fine;
// quota/pause state is the only shared mutable resource.

use std::sync::Arc;

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::atoms::constants::MAX_TAGS_PER_QUERY;
use crate::atoms::error::{EngineError, EngineResult, QuotaWindow};
use crate::engine::cipher::SessionCipher;
use crate::engine::config::CoreConfig;
use crate::engine::fetch::FetchChain;
use crate::engine::filter::{CandidateLead, LeadSieve, Thresholds};
use crate::engine::paths;
use crate::engine::quota::{CapStore, QuotaGovernor};
use crate::engine::retry::RetryPolicy;
use crate::engine::upstream::{UpstreamClient, UpstreamError};
use crate::engine::vault::SessionVault;

// ── Caller-visible outcomes ────────────────────────────────────────────────

/// The compact vocabulary the embedding application sees. Every internal
/// condition translates into one of these (or Ok with results).
#[derive(Debug, Error)]
pub enum QueryError {
    /// Circuit breaker is live — all protected operations fail fast.
    #[error("account paused after upstream challenge — try again later")]
    Paused,

    /// No connected upstream account for this caller.
    #[error("upstream account not connected")]
    NotConnected,

    /// Stored session unusable (auth rejected, crypto failure, rotation).
    #[error("reconnect needed: {0}")]
    ReconnectRequired(String),

    /// Internal quota or upstream throttle.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Malformed query (unknown niche, empty custom tag list).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Durable storage failure while reading/writing the vault.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Upstream failed in a way the core does not recover from.
    #[error("upstream failure: {0}")]
    UpstreamFailed(String),
}

/// One discovery query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// Named preset, or "custom" with `custom_tags` supplied.
    pub niche: String,
    #[serde(default)]
    pub custom_tags: Option<Vec<String>>,
    /// Explicit account handle; falls back to the caller's last-used
    /// hint, then to the most recently modified slot.
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub thresholds: Thresholds,
}

// ── Engine ─────────────────────────────────────────────────────────────────

pub struct DiscoveryEngine<C: UpstreamClient> {
    client: C,
    vault: SessionVault,
    governor: QuotaGovernor,
    retry: RetryPolicy,
    chain: FetchChain,
    config: CoreConfig,
}

impl<C: UpstreamClient> DiscoveryEngine<C> {
    /// Build with the in-process quota backend (single-instance only —
    /// the governor logs the degraded-mode notice).
    pub fn new(client: C, config: CoreConfig) -> EngineResult<Self> {
        let governor = QuotaGovernor::new(&config);
        Self::assemble(client, config, governor)
    }

    /// Build with an injected quota/pause backend (shared store in
    /// production deployments).
    pub fn with_cap_store(
        client: C,
        config: CoreConfig,
        store: Arc<dyn CapStore>,
    ) -> EngineResult<Self> {
        let governor = QuotaGovernor::with_store(&config, store);
        Self::assemble(client, config, governor)
    }

    fn assemble(client: C, config: CoreConfig, governor: QuotaGovernor) -> EngineResult<Self> {
        let cipher = SessionCipher::from_config(&config)?;
        let vault = SessionVault::open(paths::data_dir(&config), cipher)?;
        let retry = RetryPolicy::from_config(&config);
        let chain = FetchChain::from_config(&config);
        Ok(DiscoveryEngine { client, vault, governor, retry, chain, config })
    }

    // ── Connect ────────────────────────────────────────────────────────

    /// Log in upstream, encrypt and persist the session, and remember the
    /// handle for this caller. A challenge during login trips the pause
    /// circuit breaker before surfacing.
    pub async fn connect(
        &self,
        caller: i64,
        handle: &str,
        secret: &str,
    ) -> Result<(), QueryError> {
        if self.governor.is_paused(caller) {
            return Err(QueryError::Paused);
        }

        let session = self
            .retry
            .run(|| self.client.login(handle, secret), UpstreamError::is_transient)
            .await
            .map_err(|e| self.translate_upstream(caller, e))?;

        let state = self.client.export_session_state(&session);
        self.vault.save(handle, &state).map_err(translate_engine)?;
        self.vault
            .record_last_used(caller, handle)
            .map_err(translate_engine)?;
        info!("[discovery] caller {} connected '{}'", caller, handle);
        Ok(())
    }

    // ── Discover ───────────────────────────────────────────────────────

    /// Run one bounded, rate-governed discovery query.
    pub async fn discover(
        &self,
        caller: i64,
        request: &QueryRequest,
    ) -> Result<Vec<CandidateLead>, QueryError> {
        if self.governor.is_paused(caller) {
            return Err(QueryError::Paused);
        }
        // Fail expensive: the attempt counts even when rejected.
        self.governor
            .check_and_consume(caller)
            .map_err(|window: QuotaWindow| {
                QueryError::RateLimited(format!("{} request cap exceeded", window))
            })?;

        let tags = self.resolve_tags(request)?;
        let handle = self
            .resolve_handle(caller, request.handle.as_deref())
            .ok_or(QueryError::NotConnected)?;
        let session = self.vault.load(&handle).map_err(translate_engine)?;

        // Lightweight probe before spending upstream calls on the scan.
        self.retry
            .run(|| self.client.validate_session(&session), UpstreamError::is_transient)
            .await
            .map_err(|e| self.translate_upstream(caller, e))?;

        let mut sieve = LeadSieve::new(request.thresholds.clone(), self.config.lead_cap);
        for tag in &tags {
            if sieve.is_full() {
                break;
            }
            let media = self
                .chain
                .fetch_hashtag_media(&self.client, &session, tag, self.config.media_per_tag)
                .await
                .map_err(|e| self.translate_upstream(caller, e))?;
            sieve
                .scan(&self.client, &session, &media)
                .await
                .map_err(|e| self.translate_upstream(caller, e))?;
        }

        // Internal tokens may have rotated during the scan; re-encrypt and
        // persist. A save failure here must not discard finished results.
        let refreshed = self.client.export_session_state(&session);
        if let Err(e) = self.vault.save(&handle, &refreshed) {
            warn!("[discovery] failed to persist refreshed session for '{}': {}", handle, e);
        }

        info!(
            "[discovery] caller {} query over {} tag(s) yielded {} lead(s)",
            caller,
            tags.len(),
            sieve.lead_count()
        );
        Ok(sieve.into_leads())
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Niche preset or custom tag list, trimmed and capped.
    fn resolve_tags(&self, request: &QueryRequest) -> Result<Vec<String>, QueryError> {
        if request.niche == "custom" {
            let raw = request
                .custom_tags
                .as_ref()
                .ok_or_else(|| QueryError::InvalidQuery("custom hashtags required".into()))?;
            let tags: Vec<String> = raw
                .iter()
                .map(|t| t.trim().trim_start_matches('#').to_string())
                .filter(|t| !t.is_empty())
                .take(MAX_TAGS_PER_QUERY)
                .collect();
            if tags.is_empty() {
                return Err(QueryError::InvalidQuery("custom hashtags required".into()));
            }
            Ok(tags)
        } else {
            self.config
                .niches
                .get(&request.niche)
                .map(|tags| tags.iter().take(MAX_TAGS_PER_QUERY).cloned().collect())
                .ok_or_else(|| {
                    QueryError::InvalidQuery(format!("unsupported niche '{}'", request.niche))
                })
        }
    }

    /// Explicit handle → caller hint → most recently modified slot.
    fn resolve_handle(&self, caller: i64, explicit: Option<&str>) -> Option<String> {
        if let Some(handle) = explicit {
            return Some(handle.to_string());
        }
        if let Some(handle) = self.vault.last_used(caller) {
            return Some(handle);
        }
        self.vault.most_recently_modified_handle()
    }

    /// Map the upstream failure vocabulary onto caller-visible outcomes.
    /// Challenges trip the pause circuit breaker as a side effect.
    fn translate_upstream(&self, caller: i64, err: UpstreamError) -> QueryError {
        match err {
            UpstreamError::ChallengeRequired(_) => {
                self.governor.pause(caller);
                QueryError::Paused
            }
            UpstreamError::AuthFailed(msg) | UpstreamError::SessionInvalid(msg) => {
                QueryError::ReconnectRequired(msg)
            }
            UpstreamError::Throttled(msg) => QueryError::RateLimited(msg),
            other => QueryError::UpstreamFailed(other.to_string()),
        }
    }
}

/// Vault/engine failures onto caller-visible outcomes.
fn translate_engine(err: EngineError) -> QueryError {
    match err {
        EngineError::NotConnected => QueryError::NotConnected,
        EngineError::Crypto(msg) => QueryError::ReconnectRequired(msg),
        EngineError::Paused(_) => QueryError::Paused,
        EngineError::QuotaExceeded(window) => {
            QueryError::RateLimited(format!("{} request cap exceeded", window))
        }
        other => QueryError::Storage(other.to_string()),
    }
}
