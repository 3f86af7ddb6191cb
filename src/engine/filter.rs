// LeadScout Engine — Result Filter / Dedup
// Turns raw media streams into candidate leads: per-query dedup by owner
// id (first occurrence wins), follower-range and engagement thresholds,
// and one shared emission budget across all tags in the query. Scanning
// is sequential by design — it keeps the shared cap deterministic and
// respects upstream pacing.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::atoms::constants::DEFAULT_LEAD_CAP;
use crate::engine::fetch::RawMedia;
use crate::engine::upstream::{SessionState, UpstreamClient, UpstreamError};

/// Numeric thresholds for one query. Follower bounds are inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_followers: u64,
    pub max_followers: u64,
    pub min_engagement: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds { min_followers: 0, max_followers: 10_000_000, min_engagement: 0.0 }
    }
}

/// One filtered, de-duplicated discovery result. Transient — never
/// persisted, exists only within one query's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateLead {
    pub handle: String,
    pub follower_count: u64,
    pub engagement_rate: f64,
}

/// Per-query sieve. Construct once per query; the dedup set and the
/// emission budget are scoped to that invocation only.
pub struct LeadSieve {
    thresholds: Thresholds,
    cap: usize,
    seen: HashSet<u64>,
    leads: Vec<CandidateLead>,
}

impl LeadSieve {
    pub fn new(thresholds: Thresholds, cap: usize) -> Self {
        LeadSieve { thresholds, cap, seen: HashSet::new(), leads: Vec::new() }
    }

    pub fn with_defaults(thresholds: Thresholds) -> Self {
        Self::new(thresholds, DEFAULT_LEAD_CAP)
    }

    /// True once the shared budget is spent; callers stop scanning.
    pub fn is_full(&self) -> bool {
        self.leads.len() >= self.cap
    }

    pub fn lead_count(&self) -> usize {
        self.leads.len()
    }

    /// Scan one tag's media in input order. Profile lookups go through the
    /// upstream client; any lookup failure fails the whole query (errors
    /// mid-scan are never converted into silent truncation).
    pub async fn scan<C: UpstreamClient + ?Sized>(
        &mut self,
        client: &C,
        session: &SessionState,
        media: &[RawMedia],
    ) -> Result<(), UpstreamError> {
        for item in media {
            if self.is_full() {
                break;
            }
            let Some(user_id) = item.user_id() else {
                continue;
            };
            // First occurrence wins — later media from this account are
            // skipped even when this one fails the thresholds.
            if !self.seen.insert(user_id) {
                continue;
            }

            let profile = client.lookup_account(session, user_id).await?;
            let followers = profile.follower_count;
            if followers < self.thresholds.min_followers
                || followers > self.thresholds.max_followers
            {
                debug!(
                    "[filter] '{}' out of follower range ({} ∉ [{}, {}])",
                    profile.handle,
                    followers,
                    self.thresholds.min_followers,
                    self.thresholds.max_followers
                );
                continue;
            }

            let engagement_rate = if followers > 0 {
                (item.like_count() + item.comment_count()) as f64 / followers as f64
            } else {
                0.0
            };
            if engagement_rate < self.thresholds.min_engagement {
                continue;
            }

            self.leads.push(CandidateLead {
                handle: profile.handle,
                follower_count: followers,
                engagement_rate,
            });
        }
        Ok(())
    }

    pub fn into_leads(self) -> Vec<CandidateLead> {
        self.leads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follower_bounds_are_inclusive() {
        let t = Thresholds { min_followers: 1_000, max_followers: 10_000, min_engagement: 0.0 };
        // Boundary checks mirror the scan predicate.
        assert!(!(1_000 < t.min_followers || 1_000 > t.max_followers));
        assert!(!(10_000 < t.min_followers || 10_000 > t.max_followers));
        assert!(999 < t.min_followers);
        assert!(10_001 > t.max_followers);
    }

    #[test]
    fn sieve_reports_full_at_cap() {
        let mut sieve = LeadSieve::new(Thresholds::default(), 2);
        assert!(!sieve.is_full());
        sieve.leads.push(CandidateLead {
            handle: "a".into(),
            follower_count: 1,
            engagement_rate: 0.0,
        });
        sieve.leads.push(CandidateLead {
            handle: "b".into(),
            follower_count: 1,
            engagement_rate: 0.0,
        });
        assert!(sieve.is_full());
    }
}
