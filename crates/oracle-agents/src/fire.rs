//! Fire oracle: catalytic voice for passion, creation, and stuckness.
//!
//! Routes the query into a sub-theme before answering: stagnation gets the
//! rekindling voice, creative material gets the igniting voice, everything
//! else gets the general fire reading. Confidence varies by sub-theme so
//! downstream scoring can tell a targeted reading from a generic one.

use async_trait::async_trait;
use oracle_core::{Element, OracleError, Responder, ResponderReply};

const STUCK_CUES: &[&str] = &["stuck", "lost", "unmotivated", "stagnant"];
const CREATE_CUES: &[&str] = &["create", "creative", "inspiration", "idea"];

pub struct FireOracle;

#[async_trait]
impl Responder for FireOracle {
    fn name(&self) -> &str {
        "fire_oracle"
    }

    async fn respond(&self, text: &str) -> Result<ResponderReply, OracleError> {
        let lower = text.to_lowercase();

        if STUCK_CUES.iter().any(|c| lower.contains(c)) {
            return Ok(ResponderReply::minimal(
                "The ember is not dead, only banked. Name the smallest act that \
                 still carries heat for you, and do only that today.",
                0.7,
            )
            .with_element(Element::Fire)
            .with_archetype("Ember-Guardian")
            .with_reflection("What was the last thing that made you lose track of time?"));
        }

        if CREATE_CUES.iter().any(|c| lower.contains(c)) {
            return Ok(ResponderReply::minimal(
                "Creation wants a first mark, not a perfect one. Strike while the \
                 vision is still rough; polish belongs to a later fire.",
                0.75,
            )
            .with_element(Element::Fire)
            .with_archetype("Wild Creator")
            .with_reflection("What would you make if no one ever saw it?"));
        }

        Ok(ResponderReply::minimal(
            "Fire answers fire. Bring your will to one point and let the rest \
             burn off as distraction.",
            0.65,
        )
        .with_element(Element::Fire)
        .with_archetype("Fire-Soul"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stuck_material_gets_rekindling_voice() {
        let reply = FireOracle.respond("I feel so stuck lately").await.unwrap();
        assert_eq!(reply.archetype.as_deref(), Some("Ember-Guardian"));
        assert_eq!(reply.confidence, 0.7);
        assert!(reply.reflection_prompt.is_some());
    }

    #[tokio::test]
    async fn creative_material_gets_igniting_voice() {
        let reply = FireOracle
            .respond("I have an idea I want to create")
            .await
            .unwrap();
        assert_eq!(reply.archetype.as_deref(), Some("Wild Creator"));
        assert_eq!(reply.confidence, 0.75);
    }

    #[tokio::test]
    async fn default_fire_reading() {
        let reply = FireOracle.respond("more passion please").await.unwrap();
        assert_eq!(reply.archetype.as_deref(), Some("Fire-Soul"));
        assert_eq!(reply.element, Some(Element::Fire));
        assert_eq!(reply.confidence, 0.65);
    }
}
