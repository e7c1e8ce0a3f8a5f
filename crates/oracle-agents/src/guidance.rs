//! Guidance oracle: minimal-shape responder for open requests for support.

use async_trait::async_trait;
use oracle_core::{OracleError, Responder, ResponderReply};

pub struct GuidanceOracle;

#[async_trait]
impl Responder for GuidanceOracle {
    fn name(&self) -> &str {
        "guidance_oracle"
    }

    async fn respond(&self, _text: &str) -> Result<ResponderReply, OracleError> {
        Ok(ResponderReply::minimal(
            "You do not need the whole path, only the next honest step and a \
             hand on your own shoulder while you take it.",
            0.68,
        )
        .with_archetype("Guide")
        .with_reflection("If a trusted friend asked you this question, what would you tell them?"))
    }
}
