// LeadScout Engine — Session Cipher
// AES-256-GCM for upstream session blobs. Authenticated encryption only:
// a tampered ciphertext or a rotated key must fail decryption, never yield
// wrong data silently. The key arrives base64-encoded via configuration and
// is zeroized when the cipher is dropped.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use zeroize::Zeroizing;

use crate::atoms::error::{EngineError, EngineResult};
use crate::engine::config::CoreConfig;

/// AES-256-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

pub struct SessionCipher {
    key: Zeroizing<[u8; 32]>,
}

impl SessionCipher {
    /// Build from the configured base64 key.
    /// Fails with a config error if the key is absent or malformed.
    pub fn from_config(config: &CoreConfig) -> EngineResult<Self> {
        let encoded = config
            .cipher_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                EngineError::Config("cipher key missing — set LEADSCOUT_CIPHER_KEY".into())
            })?;
        Self::from_base64_key(encoded)
    }

    /// Build from a base64-encoded 32-byte key.
    pub fn from_base64_key(encoded: &str) -> EngineResult<Self> {
        let bytes =
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded.trim())
                .map_err(|e| EngineError::Config(format!("cipher key is not valid base64: {}", e)))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| EngineError::Config("cipher key must decode to 32 bytes".into()))?;
        Ok(SessionCipher { key: Zeroizing::new(key) })
    }

    /// Encrypt a structured session payload.
    /// Output: `base64(nonce ‖ ciphertext)`, with a fresh random nonce.
    pub fn encrypt(&self, payload: &serde_json::Value) -> EngineResult<String> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&*self.key));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let plaintext = serde_json::to_vec(payload)?;
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_ref())
            .map_err(|_| EngineError::Crypto("encryption failed".into()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&ciphertext);
        Ok(base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &blob))
    }

    /// Decrypt a session blob produced by `encrypt`.
    /// Any tampering, truncation, or key mismatch fails with a crypto error.
    pub fn decrypt(&self, encoded: &str) -> EngineResult<serde_json::Value> {
        let blob =
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded.trim())
                .map_err(|_| EngineError::Crypto("session blob is not valid base64".into()))?;
        if blob.len() <= NONCE_LEN {
            return Err(EngineError::Crypto("session blob truncated".into()));
        }
        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&*self.key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| EngineError::Crypto("authentication failed — wrong key or tampered blob".into()))?;

        Ok(serde_json::from_slice(&plaintext)?)
    }
}
