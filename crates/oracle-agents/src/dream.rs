//! Dream oracle: extended-shape responder for dream material.
//!
//! Declares `accepts_extended` so the dispatcher hands it the full query and
//! retrieval context; prior dream memories shape the reading and are counted
//! in the reply metadata.

use async_trait::async_trait;
use oracle_core::{Element, MemoryRecord, OracleError, Query, Responder, ResponderReply};

pub struct DreamOracle;

#[async_trait]
impl Responder for DreamOracle {
    fn name(&self) -> &str {
        "dream_oracle"
    }

    fn accepts_extended(&self) -> bool {
        true
    }

    async fn respond(&self, text: &str) -> Result<ResponderReply, OracleError> {
        // Minimal fallback path; the pool normally routes through the
        // extended shape.
        self.respond_extended(&Query::new(text, "anonymous"), &[]).await
    }

    async fn respond_extended(
        &self,
        query: &Query,
        memories: &[MemoryRecord],
    ) -> Result<ResponderReply, OracleError> {
        let recurring = memories
            .iter()
            .filter(|m| m.content.to_lowercase().contains("dream"))
            .count();

        let content = if recurring > 0 {
            format!(
                "This dream is not arriving alone; {recurring} earlier night \
                 visits echo in it. Hold the image that repeats and ask what it \
                 has been waiting to tell you."
            )
        } else {
            "Hold the dream loosely, like water in cupped hands. Which image \
             still carries a charge when you recall it now?"
                .to_string()
        };

        let mut reply = ResponderReply::minimal(content, 0.78)
            .with_element(Element::Water)
            .with_archetype("Dream-Walker")
            .with_reflection("What part of the dream felt most like you?");
        reply.provider = Some(self.name().to_string());
        reply.metadata.insert(
            "phase".to_string(),
            serde_json::json!(query.phase().as_str()),
        );
        reply.metadata.insert(
            "recurring_dream_memories".to_string(),
            serde_json::json!(recurring),
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn memory(content: &str) -> MemoryRecord {
        MemoryRecord {
            user_id: "u1".to_string(),
            content: content.to_string(),
            element: None,
            source_agent: None,
            confidence: None,
            metadata: serde_json::Map::new(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn recurring_dreams_shape_the_reading() {
        let q = Query::new("I dreamed of the flooded house again", "u1");
        let mems = vec![memory("a dream of rising water"), memory("grocery note")];
        let reply = DreamOracle.respond_extended(&q, &mems).await.unwrap();
        assert_eq!(reply.metadata["recurring_dream_memories"], serde_json::json!(1));
        assert!(reply.content.contains("not arriving alone"));
        assert_eq!(reply.provider.as_deref(), Some("dream_oracle"));
    }

    #[tokio::test]
    async fn first_dream_gets_open_reading() {
        let q = Query::new("strange dream last night", "u1");
        let reply = DreamOracle.respond_extended(&q, &[]).await.unwrap();
        assert!(reply.content.contains("cupped hands"));
        assert_eq!(reply.metadata["phase"], serde_json::json!("initiation"));
    }
}
