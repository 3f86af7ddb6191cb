// LeadScout Engine — Session Vault
// Maps an account handle to one encrypted session blob on disk and keeps a
// small per-caller "last used handle" hint beside it.
//
// Layout under the data root:
//   sessions/{percent-encoded-handle}.enc   — encrypted session blob
//   callers/{caller_id}.last                — last-used-handle hint
//
// Percent-encoding keeps the handle → slot mapping injective and
// filesystem-safe; two distinct handles can never collide on one slot.
// Writes go temp-then-rename so a crash mid-write never leaves a
// partially written, undecryptable slot.

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use log::{info, warn};

use crate::atoms::error::{EngineError, EngineResult};
use crate::engine::cipher::SessionCipher;
use crate::engine::paths;

const SLOT_EXT: &str = "enc";
const HINT_EXT: &str = "last";

pub struct SessionVault {
    sessions_dir: PathBuf,
    callers_dir: PathBuf,
    cipher: SessionCipher,
}

impl SessionVault {
    /// Open the vault under `root`, creating its directories.
    pub fn open(root: PathBuf, cipher: SessionCipher) -> EngineResult<Self> {
        let sessions_dir = paths::sessions_dir(&root);
        let callers_dir = paths::callers_dir(&root);
        fs::create_dir_all(&sessions_dir)?;
        fs::create_dir_all(&callers_dir)?;
        info!("[vault] opened at {:?}", root);
        Ok(SessionVault { sessions_dir, callers_dir, cipher })
    }

    fn slot_path(&self, handle: &str) -> PathBuf {
        let escaped = urlencoding::encode(handle);
        self.sessions_dir.join(format!("{}.{}", escaped, SLOT_EXT))
    }

    fn hint_path(&self, caller: i64) -> PathBuf {
        self.callers_dir.join(format!("{}.{}", caller, HINT_EXT))
    }

    // ── Session slots ──────────────────────────────────────────────────

    /// Serialize, encrypt, and atomically write one handle's session.
    /// Overwrites any existing slot — manual reconnect replaces state.
    pub fn save(&self, handle: &str, session: &serde_json::Value) -> EngineResult<()> {
        let encrypted = self.cipher.encrypt(session)?;
        let path = self.slot_path(handle);
        let tmp = path.with_extension("enc.tmp");
        fs::write(&tmp, &encrypted)?;
        fs::rename(&tmp, &path)?;
        info!("[vault] saved encrypted session for '{}'", handle);
        Ok(())
    }

    /// Load and decrypt one handle's session.
    pub fn load(&self, handle: &str) -> EngineResult<serde_json::Value> {
        let path = self.slot_path(handle);
        if !path.exists() {
            return Err(EngineError::NotConnected);
        }
        let encrypted = fs::read_to_string(&path)?;
        self.cipher.decrypt(encrypted.trim())
    }

    /// True iff a slot exists for this handle.
    pub fn has_session(&self, handle: &str) -> bool {
        self.slot_path(handle).exists()
    }

    // ── Last-used-handle hint ──────────────────────────────────────────

    /// Remember which handle this caller connected most recently.
    pub fn record_last_used(&self, caller: i64, handle: &str) -> EngineResult<()> {
        let path = self.hint_path(caller);
        let tmp = path.with_extension("last.tmp");
        fs::write(&tmp, handle)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// The caller's last-used handle, if recorded.
    pub fn last_used(&self, caller: i64) -> Option<String> {
        let content = fs::read_to_string(self.hint_path(caller)).ok()?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    // ── Fallback discovery ─────────────────────────────────────────────

    /// The handle whose slot was modified most recently. O(stored
    /// sessions) directory scan — acceptable on this rare fallback path
    /// because the set is small. "Most recently connected account wins."
    pub fn most_recently_modified_handle(&self) -> Option<String> {
        let entries = match fs::read_dir(&self.sessions_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("[vault] cannot scan sessions dir: {}", e);
                return None;
            }
        };

        let mut newest: Option<(SystemTime, String)> = None;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SLOT_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(handle) = urlencoding::decode(stem) else {
                continue;
            };
            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
                newest = Some((modified, handle.into_owned()));
            }
        }
        newest.map(|(_, handle)| handle)
    }
}
