//! Water oracle: emotional depth, grief, and flow.

use async_trait::async_trait;
use oracle_core::{Element, OracleError, Responder, ResponderReply};

const GRIEF_CUES: &[&str] = &["grief", "loss", "tears", "mourning"];

pub struct WaterOracle;

#[async_trait]
impl Responder for WaterOracle {
    fn name(&self) -> &str {
        "water_oracle"
    }

    async fn respond(&self, text: &str) -> Result<ResponderReply, OracleError> {
        let lower = text.to_lowercase();

        if GRIEF_CUES.iter().any(|c| lower.contains(c)) {
            return Ok(ResponderReply::minimal(
                "Grief is water finding its level. You do not have to move it \
                 along; you only have to let it be wet.",
                0.72,
            )
            .with_element(Element::Water)
            .with_archetype("Depth-Keeper")
            .with_reflection("What are the tears carrying that words cannot?"));
        }

        Ok(ResponderReply::minimal(
            "Feel it fully before you name it. The current knows the shape of \
             the riverbed better than the map does.",
            0.65,
        )
        .with_element(Element::Water)
        .with_archetype("Flow-Weaver"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn grief_material_gets_depth_keeper() {
        let reply = WaterOracle.respond("so much grief this year").await.unwrap();
        assert_eq!(reply.archetype.as_deref(), Some("Depth-Keeper"));
        assert_eq!(reply.element, Some(Element::Water));
    }
}
