// LeadScout Engine — Adaptive Fetch Chain
// The upstream API's response shape is unstable across server rollouts; a
// strict single-method call frequently fails shape validation even though
// the query is valid. The chain tries an ordered list of query variants
// until one succeeds. Only shape mismatches are swallowed — throttling and
// auth failures propagate at once and must not be masked.

use log::{debug, info, warn};

use crate::engine::config::{CoreConfig, FetchVariant};
use crate::engine::upstream::{SessionState, UpstreamClient, UpstreamError};

// ── Raw media ──────────────────────────────────────────────────────────────

/// Typed media record — the shape richer upstream methods return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaRecord {
    pub user_id: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
}

/// One raw media item. The upstream library's output shape varies by
/// method: richer variants yield typed records, fallbacks yield untyped
/// mappings. Extractors are total — a single malformed record must not
/// abort the whole query, so missing fields default instead of failing.
#[derive(Debug, Clone)]
pub enum RawMedia {
    Typed(MediaRecord),
    Untyped(serde_json::Value),
}

impl RawMedia {
    /// Owning account id, if the record carries one.
    pub fn user_id(&self) -> Option<u64> {
        match self {
            RawMedia::Typed(m) => m.user_id,
            RawMedia::Untyped(v) => v
                .get("user")
                .and_then(|u| u.get("pk"))
                .or_else(|| v.get("user_id"))
                .and_then(value_as_u64),
        }
    }

    pub fn like_count(&self) -> u64 {
        match self {
            RawMedia::Typed(m) => m.like_count.unwrap_or(0),
            RawMedia::Untyped(v) => v.get("like_count").and_then(value_as_u64).unwrap_or(0),
        }
    }

    pub fn comment_count(&self) -> u64 {
        match self {
            RawMedia::Typed(m) => m.comment_count.unwrap_or(0),
            RawMedia::Untyped(v) => v.get("comment_count").and_then(value_as_u64).unwrap_or(0),
        }
    }
}

/// Some upstream variants stringify numeric ids.
fn value_as_u64(v: &serde_json::Value) -> Option<u64> {
    v.as_u64().or_else(|| v.as_str()?.trim().parse().ok())
}

// ── The chain ──────────────────────────────────────────────────────────────

pub struct FetchChain {
    variants: Vec<FetchVariant>,
    shape_markers: Vec<String>,
}

impl FetchChain {
    pub fn from_config(config: &CoreConfig) -> Self {
        FetchChain {
            variants: config.fetch_variants.clone(),
            shape_markers: config.shape_markers.clone(),
        }
    }

    /// Try each variant in order for one hashtag.
    ///   • unsupported variant        → skip
    ///   • success                    → return immediately
    ///   • shape/validation mismatch  → record and continue
    ///   • anything else              → propagate immediately
    /// Every variant failing on shape yields an empty sequence, not an
    /// error: "upstream returned nothing usable" reads as "no matches".
    pub async fn fetch_hashtag_media<C: UpstreamClient + ?Sized>(
        &self,
        client: &C,
        session: &SessionState,
        tag: &str,
        limit: u32,
    ) -> Result<Vec<RawMedia>, UpstreamError> {
        for variant in &self.variants {
            match client.query_by_tag(session, tag, limit, variant).await {
                Ok(media) => {
                    info!(
                        "[fetch] variant '{}' returned {} media for #{}",
                        variant.name,
                        media.len(),
                        tag
                    );
                    return Ok(media);
                }
                Err(UpstreamError::Unsupported(msg)) => {
                    debug!("[fetch] variant '{}' unavailable: {}", variant.name, msg);
                }
                Err(err) if self.is_shape_mismatch(&err) => {
                    warn!(
                        "[fetch] variant '{}' shape mismatch on #{}: {} — trying next",
                        variant.name, tag, err
                    );
                }
                Err(err) => return Err(err),
            }
        }
        warn!("[fetch] all variants failed shape validation for #{} — treating as empty", tag);
        Ok(Vec::new())
    }

    /// Typed shape mismatches match directly; server-carried error text is
    /// scanned against the configured validation markers, since some client
    /// builds report validation failures as generic errors.
    fn is_shape_mismatch(&self, err: &UpstreamError) -> bool {
        match err {
            UpstreamError::ShapeMismatch(_) => true,
            UpstreamError::Server(msg) => {
                self.shape_markers.iter().any(|marker| msg.contains(marker.as_str()))
            }
            _ => false,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
