//! Earth oracle: grounding, practicality, and slow building.

use async_trait::async_trait;
use oracle_core::{Element, OracleError, Responder, ResponderReply};

pub struct EarthOracle;

#[async_trait]
impl Responder for EarthOracle {
    fn name(&self) -> &str {
        "earth_oracle"
    }

    async fn respond(&self, _text: &str) -> Result<ResponderReply, OracleError> {
        Ok(ResponderReply::minimal(
            "Roots first, then branches. Choose one small practice you can \
             repeat tomorrow at the same hour, and let the structure hold you.",
            0.65,
        )
        .with_element(Element::Earth)
        .with_archetype("Earth-Tender")
        .with_reflection("What in your life already holds steady without effort?"))
    }
}
