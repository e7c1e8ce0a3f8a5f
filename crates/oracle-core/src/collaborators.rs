//! External collaborator interfaces consumed by the engine.
//!
//! The engine has no protocol of its own; a surrounding service layer wires
//! real implementations in. Default implementations for the generation
//! bridge, soul-memory store, and collective-field logger live in this crate;
//! safety moderation and facet detection stay external.

use async_trait::async_trait;

use crate::error::OracleError;
use crate::shared::{InsightLogRecord, MemoryRecord, SafetyVerdict};

/// Prompt in, text out. May fail; callers recover locally.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Append-and-retrieve memory. Retrieval is best-effort from the engine's
/// perspective: a failed fetch degrades the turn to empty context.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn fetch_relevant(
        &self,
        user_id: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<MemoryRecord>, OracleError>;

    async fn append(&self, record: MemoryRecord) -> Result<(), OracleError>;
}

/// Fire-and-forget insight sink. Failures must never abort the turn.
#[async_trait]
pub trait InsightLogger: Send + Sync {
    async fn append(&self, record: InsightLogRecord) -> Result<(), OracleError>;
}

/// Safety moderation for journey step input.
#[async_trait]
pub trait SafetyService: Send + Sync {
    async fn moderate(&self, text: &str, user_id: &str) -> Result<SafetyVerdict, OracleError>;
}

/// Secondary facet tag for a reply, independent of element.
#[async_trait]
pub trait FacetDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Result<String, OracleError>;
}
