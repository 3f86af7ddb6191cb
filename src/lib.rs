// LeadScout Core Engine
// Encrypted session vault, quota governance, and creator-lead discovery
// against an unstable upstream social API.
//
// The crate is a library: the HTTP surface, request validation, and the
// real upstream client live in the embedding application. This core owns
// the account-session lifecycle (encrypt, persist, refresh), the per-caller
// rate governance (dual-window caps + 24h pause circuit breaker), retry
// of transient upstream failures, method-fallback fetching, and the
// filter/dedup pass that turns raw media into candidate leads.

pub mod atoms;
pub mod engine;

pub use atoms::error::{EngineError, EngineResult, QuotaWindow};
pub use engine::cipher::SessionCipher;
pub use engine::config::{CoreConfig, FetchVariant};
pub use engine::discovery::{DiscoveryEngine, QueryError, QueryRequest};
pub use engine::fetch::{FetchChain, MediaRecord, RawMedia};
pub use engine::filter::{CandidateLead, LeadSieve, Thresholds};
pub use engine::quota::{CapStore, MemoryCapStore, QuotaGovernor};
pub use engine::retry::RetryPolicy;
pub use engine::upstream::{AccountProfile, SessionState, UpstreamClient, UpstreamError};
pub use engine::vault::SessionVault;
