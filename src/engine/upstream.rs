// LeadScout Engine — Upstream Client Seam
// The real social-API client (login, feed probe, hashtag fetch, account
// lookup) lives outside this crate. The core consumes it through this trait
// and reacts only to its documented failure vocabulary. Tests drive the
// engine with scripted implementations.

use async_trait::async_trait;
use thiserror::Error;

use crate::engine::config::FetchVariant;
use crate::engine::fetch::RawMedia;

/// Opaque upstream login state (credentials/cookies/device metadata).
/// The core never inspects it — only encrypts, stores, and hands it back.
pub type SessionState = serde_json::Value;

/// Follower profile for one upstream account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProfile {
    pub handle: String,
    /// Absent upstream counts are coerced to 0 by the client.
    pub follower_count: u64,
}

// ── Failure vocabulary ─────────────────────────────────────────────────────

/// Canonical error type for all upstream operations.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// Credentials rejected at login — not retryable.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Stored session no longer accepted — caller must reconnect.
    #[error("session invalid: {0}")]
    SessionInvalid(String),

    /// Anti-automation challenge — trips the pause circuit breaker.
    #[error("challenge required: {0}")]
    ChallengeRequired(String),

    /// Upstream throttled the request — retryable.
    #[error("throttled: {0}")]
    Throttled(String),

    /// Response failed local structural validation. Swallowed by the
    /// adaptive fetch chain, never surfaced to callers directly.
    #[error("response shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Looked-up account does not exist.
    #[error("account not found: {0}")]
    NotFound(String),

    /// Server-side (5xx-class) failure — retryable.
    #[error("upstream server error: {0}")]
    Server(String),

    /// This client build does not implement the requested query variant.
    #[error("unsupported query variant: {0}")]
    Unsupported(String),
}

impl UpstreamError {
    /// Transient failures are the only ones worth retrying. Auth,
    /// challenge, and malformed-input errors are never transient —
    /// retrying them wastes quota and risks tripping upstream defenses.
    pub fn is_transient(&self) -> bool {
        matches!(self, UpstreamError::Throttled(_) | UpstreamError::Server(_))
    }
}

// ── The client trait ───────────────────────────────────────────────────────

/// Every upstream client backend implements this.
/// The engine treats it as an opaque capability: one login per handle,
/// a lightweight session probe, variant-parameterized hashtag queries,
/// and per-account profile lookups.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Authenticate and produce fresh session state.
    async fn login(&self, handle: &str, secret: &str) -> Result<SessionState, UpstreamError>;

    /// Cheap probe (e.g. a timeline fetch) verifying the session still works.
    async fn validate_session(&self, session: &SessionState) -> Result<(), UpstreamError>;

    /// Fetch raw media for one hashtag using one query variant.
    async fn query_by_tag(
        &self,
        session: &SessionState,
        tag: &str,
        limit: u32,
        variant: &FetchVariant,
    ) -> Result<Vec<RawMedia>, UpstreamError>;

    /// Resolve an account id to its handle and follower count.
    async fn lookup_account(
        &self,
        session: &SessionState,
        account_id: u64,
    ) -> Result<AccountProfile, UpstreamError>;

    /// Export current session state (internal tokens may have rotated
    /// during use) for re-encryption and persistence.
    fn export_session_state(&self, session: &SessionState) -> SessionState;
}
