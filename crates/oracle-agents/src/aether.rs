//! Aether oracle: the unifying voice and the default when nothing else resonates.

use async_trait::async_trait;
use oracle_core::{Element, OracleError, Responder, ResponderReply};

pub struct AetherOracle;

#[async_trait]
impl Responder for AetherOracle {
    fn name(&self) -> &str {
        "aether_oracle"
    }

    async fn respond(&self, _text: &str) -> Result<ResponderReply, OracleError> {
        Ok(ResponderReply::minimal(
            "All five currents meet here. Sit with the question without choosing \
             a direction yet; the next element will announce itself.",
            0.6,
        )
        .with_element(Element::Aether)
        .with_archetype("Aether-Witness"))
    }
}
