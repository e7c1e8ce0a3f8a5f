//! Air oracle: clarity, perspective, and the spoken thought.

use async_trait::async_trait;
use oracle_core::{Element, OracleError, Responder, ResponderReply};

pub struct AirOracle;

#[async_trait]
impl Responder for AirOracle {
    fn name(&self) -> &str {
        "air_oracle"
    }

    async fn respond(&self, _text: &str) -> Result<ResponderReply, OracleError> {
        Ok(ResponderReply::minimal(
            "Step back far enough and the tangle becomes a pattern. Say the \
             problem out loud in one sentence; what falls away was never it.",
            0.65,
        )
        .with_element(Element::Air)
        .with_archetype("Air-Messenger"))
    }
}
