// ── LeadScout Atoms: Error Types ───────────────────────────────────────────
// Single canonical error enum for the engine, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (Config, Crypto, Storage…).
//   • The `#[from]` attribute wires std/external error conversions.
//   • No variant carries secret material (keys, session blobs) in its
//     message — handles and caller ids are fine, payloads are not.
//
// Upstream failures have their own vocabulary (`UpstreamError` in
// engine/upstream.rs) and are wrapped here via `EngineError::Upstream`.
// The orchestrator translates everything into the compact caller-visible
// `QueryError` set (engine/discovery.rs).

use thiserror::Error;

use crate::engine::upstream::UpstreamError;

// ── Quota windows ──────────────────────────────────────────────────────────

/// Which quota window rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaWindow {
    Hourly,
    Daily,
}

impl std::fmt::Display for QuotaWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotaWindow::Hourly => write!(f, "hourly"),
            QuotaWindow::Daily => write!(f, "daily"),
        }
    }
}

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine configuration is invalid or missing (e.g. no cipher key).
    /// Fatal for the operation; never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authenticated encryption failed — tampered ciphertext, rotated key.
    /// Surfaced to the caller as "reconnect required".
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Filesystem or OS-level I/O failure.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No stored session for the requested handle. A user-actionable
    /// precondition, not a system fault.
    #[error("No upstream account connected")]
    NotConnected,

    /// Caller is under an active pause flag (circuit breaker tripped).
    #[error("Caller {0} is paused")]
    Paused(i64),

    /// A quota window rejected the request (the attempt still counted).
    #[error("{0} request cap exceeded")]
    QuotaExceeded(QuotaWindow),

    /// Upstream client failure, classified by `UpstreamError`.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All engine operations should return this type.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<EngineError> for String {
    fn from(e: EngineError) -> Self {
        e.to_string()
    }
}
