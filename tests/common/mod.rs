#![allow(dead_code)] // each test binary uses a different subset

// Shared test fixtures: a scripted upstream client and config helpers.
// The scripted client records every call so tests can assert on chain
// order, retry counts, and scan budgets.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use leadscout_core::{
    AccountProfile, CoreConfig, MediaRecord, RawMedia, SessionState, UpstreamClient, UpstreamError,
};

/// CoreConfig pointed at a temp dir, with a fixed cipher key and a
/// millisecond backoff so retries don't slow the suite down.
pub fn test_config(data_dir: &Path) -> CoreConfig {
    CoreConfig {
        cipher_key: Some(test_key()),
        data_dir: Some(data_dir.to_path_buf()),
        backoff_base_ms: 1,
        ..CoreConfig::default()
    }
}

pub fn test_key() -> String {
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, [7u8; 32])
}

pub fn typed_media(user_id: u64, likes: u64, comments: u64) -> RawMedia {
    RawMedia::Typed(MediaRecord {
        user_id: Some(user_id),
        like_count: Some(likes),
        comment_count: Some(comments),
    })
}

// ── Scripted upstream client ───────────────────────────────────────────────

pub enum VariantBehavior {
    /// Variant always fails with this error.
    Fail(UpstreamError),
    /// Variant succeeds with per-tag media (missing tag ⇒ empty).
    MediaByTag(HashMap<String, Vec<RawMedia>>),
}

#[derive(Default)]
struct Inner {
    login_results: Mutex<VecDeque<Result<SessionState, UpstreamError>>>,
    validate_results: Mutex<VecDeque<Result<(), UpstreamError>>>,
    variants: Mutex<HashMap<String, VariantBehavior>>,
    profiles: Mutex<HashMap<u64, AccountProfile>>,
    variant_calls: Mutex<Vec<String>>,
    login_calls: AtomicU32,
    validate_calls: AtomicU32,
    lookup_calls: AtomicU32,
}

#[derive(Clone, Default)]
pub struct ScriptedClient {
    inner: Arc<Inner>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a login outcome; once drained, logins succeed with a stub
    /// session.
    pub fn push_login(&self, result: Result<SessionState, UpstreamError>) {
        self.inner.login_results.lock().push_back(result);
    }

    /// Queue a session-probe outcome; once drained, probes succeed.
    pub fn push_validate(&self, result: Result<(), UpstreamError>) {
        self.inner.validate_results.lock().push_back(result);
    }

    pub fn script_variant(&self, name: &str, behavior: VariantBehavior) {
        self.inner.variants.lock().insert(name.to_string(), behavior);
    }

    /// Script one variant to return the same media for every tag.
    pub fn script_variant_media(&self, name: &str, tags: &[&str], media: Vec<RawMedia>) {
        let by_tag = tags.iter().map(|t| (t.to_string(), media.clone())).collect();
        self.script_variant(name, VariantBehavior::MediaByTag(by_tag));
    }

    pub fn add_profile(&self, id: u64, handle: &str, follower_count: u64) {
        self.inner.profiles.lock().insert(
            id,
            AccountProfile { handle: handle.to_string(), follower_count },
        );
    }

    pub fn login_calls(&self) -> u32 {
        self.inner.login_calls.load(Ordering::SeqCst)
    }

    pub fn validate_calls(&self) -> u32 {
        self.inner.validate_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> u32 {
        self.inner.lookup_calls.load(Ordering::SeqCst)
    }

    /// Every `variant:tag` query in call order.
    pub fn variant_calls(&self) -> Vec<String> {
        self.inner.variant_calls.lock().clone()
    }
}

#[async_trait]
impl UpstreamClient for ScriptedClient {
    async fn login(&self, handle: &str, _secret: &str) -> Result<SessionState, UpstreamError> {
        self.inner.login_calls.fetch_add(1, Ordering::SeqCst);
        match self.inner.login_results.lock().pop_front() {
            Some(result) => result,
            None => Ok(json!({"handle": handle, "device": "stub"})),
        }
    }

    async fn validate_session(&self, _session: &SessionState) -> Result<(), UpstreamError> {
        self.inner.validate_calls.fetch_add(1, Ordering::SeqCst);
        match self.inner.validate_results.lock().pop_front() {
            Some(result) => result,
            None => Ok(()),
        }
    }

    async fn query_by_tag(
        &self,
        _session: &SessionState,
        tag: &str,
        _limit: u32,
        variant: &leadscout_core::FetchVariant,
    ) -> Result<Vec<RawMedia>, UpstreamError> {
        self.inner
            .variant_calls
            .lock()
            .push(format!("{}:{}", variant.name, tag));
        match self.inner.variants.lock().get(&variant.name) {
            Some(VariantBehavior::Fail(err)) => Err(err.clone()),
            Some(VariantBehavior::MediaByTag(by_tag)) => {
                Ok(by_tag.get(tag).cloned().unwrap_or_default())
            }
            None => Err(UpstreamError::Unsupported(variant.name.clone())),
        }
    }

    async fn lookup_account(
        &self,
        _session: &SessionState,
        account_id: u64,
    ) -> Result<AccountProfile, UpstreamError> {
        self.inner.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .profiles
            .lock()
            .get(&account_id)
            .cloned()
            .ok_or_else(|| UpstreamError::NotFound(format!("account {}", account_id)))
    }

    fn export_session_state(&self, session: &SessionState) -> SessionState {
        json!({"settings": session, "refreshed": true})
    }
}
