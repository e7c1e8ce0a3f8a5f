//! Shadow mirror: the always-consulted probe for projected material.
//!
//! Looks for absolutist and projection language. A hit returns a reply that
//! preempts elemental routing; anything else returns None and the turn falls
//! through to the classifier.

use async_trait::async_trait;
use oracle_core::{OracleError, Query, ResponderReply, ShadowWorker};

/// Language that tends to carry disowned material.
const ABSOLUTIST_CUES: &[&str] = &["always", "never", "everyone", "no one", "nobody"];
const PROJECTION_CUES: &[&str] = &["hate", "can't stand", "disgusts me", "makes me sick"];

pub struct ShadowMirror;

#[async_trait]
impl ShadowWorker for ShadowMirror {
    fn name(&self) -> &str {
        "shadow_oracle"
    }

    async fn probe(&self, query: &Query) -> Result<Option<ResponderReply>, OracleError> {
        let lower = query.text.to_lowercase();
        let absolutist = ABSOLUTIST_CUES.iter().any(|c| lower.contains(c));
        let projecting = PROJECTION_CUES.iter().any(|c| lower.contains(c));
        if !absolutist && !projecting {
            return Ok(None);
        }

        let content = if projecting {
            "Notice the heat in that reaction. What we cannot stand in another \
             is often a door to something unlived in ourselves."
        } else {
            "Always and never are the shadow's favorite words. Where is the one \
             exception hiding, and what does it cost you to admit it?"
        };

        Ok(Some(
            ResponderReply::minimal(content, 0.7)
                .with_archetype("Shadow-Mirror")
                .with_reflection("What would change if the opposite were even ten percent true?"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absolutist_language_trips_the_probe() {
        let reply = ShadowMirror
            .probe(&Query::new("nobody ever listens to me, they never do", "u1"))
            .await
            .unwrap();
        assert!(reply.is_some());
        assert_eq!(
            reply.unwrap().archetype.as_deref(),
            Some("Shadow-Mirror")
        );
    }

    #[tokio::test]
    async fn neutral_language_passes_through() {
        let reply = ShadowMirror
            .probe(&Query::new("thinking about my garden today", "u1"))
            .await
            .unwrap();
        assert!(reply.is_none());
    }
}
