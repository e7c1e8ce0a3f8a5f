//! Collective-field logger: the default `InsightLogger`.
//!
//! Emits a sanitized projection of each turn to the `oracle::collective`
//! tracing target. The raw query text and real user id never leave this
//! module; only the anonymized id, the archetype, the element, the valence,
//! and the phase are emitted.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::collaborators::InsightLogger;
use crate::error::OracleError;
use crate::shared::InsightLogRecord;

/// The projection actually emitted to the field.
#[derive(Debug, Clone, Serialize)]
pub struct EmittedInsight {
    pub anon_id: String,
    pub archetype: String,
    pub element: String,
    pub emotion: f32,
    pub phase: String,
    pub context_len: usize,
}

/// Strip everything identifying or verbatim from a turn record.
fn sanitize(record: &InsightLogRecord) -> EmittedInsight {
    EmittedInsight {
        anon_id: record.anon_id.clone(),
        archetype: record.archetype.clone(),
        element: record.element.as_str().to_string(),
        emotion: record.emotion,
        phase: record.phase.as_str().to_string(),
        context_len: record.context.len(),
    }
}

#[derive(Default)]
pub struct CollectiveFieldLogger;

impl CollectiveFieldLogger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InsightLogger for CollectiveFieldLogger {
    async fn append(&self, record: InsightLogRecord) -> Result<(), OracleError> {
        let emitted = sanitize(&record);
        info!(
            target: "oracle::collective",
            anon_id = %emitted.anon_id,
            archetype = %emitted.archetype,
            element = %emitted.element,
            emotion = emitted.emotion,
            phase = %emitted.phase,
            context_len = emitted.context_len,
            "insight emitted to collective field"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{Element, InsightPayload, SpiralPhase};

    #[test]
    fn sanitized_projection_carries_no_raw_text() {
        let record = InsightLogRecord {
            anon_id: "a1b2c3".to_string(),
            archetype: "Ember-Guardian".to_string(),
            element: Element::Fire,
            insight: InsightPayload {
                message: "rekindle the spark".to_string(),
                raw_input: "I feel so stuck and my name is Ada".to_string(),
            },
            emotion: -0.4,
            phase: SpiralPhase::Challenge,
            context: vec![],
        };
        let emitted = sanitize(&record);
        let json = serde_json::to_string(&emitted).unwrap();
        assert!(!json.contains("Ada"));
        assert!(!json.contains("rekindle"));
        assert!(json.contains("a1b2c3"));
        assert!(json.contains("fire"));
        assert!(json.contains("challenge"));
    }
}
