//! Keyword facet detector: the default `FacetDetector`.
//!
//! Maps the dominant element of the text onto its facet label. Independent of
//! routing: the dispatcher may answer through a triggered responder while the
//! facet still reflects the elemental coloring of the input.

use async_trait::async_trait;
use oracle_core::{classify, Element, FacetDetector, OracleError};

pub struct KeywordFacetDetector;

fn facet_for(element: Element) -> &'static str {
    match element {
        Element::Fire => "fire-vision",
        Element::Water => "water-healing",
        Element::Earth => "earth-grounding",
        Element::Air => "air-clarity",
        Element::Aether => "aether-presence",
    }
}

#[async_trait]
impl FacetDetector for KeywordFacetDetector {
    async fn detect(&self, text: &str) -> Result<String, OracleError> {
        Ok(facet_for(classify(text)).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn facet_follows_dominant_element() {
        let facet = KeywordFacetDetector
            .detect("I need passion and energy")
            .await
            .unwrap();
        assert_eq!(facet, "fire-vision");
        let facet = KeywordFacetDetector.detect("hello there").await.unwrap();
        assert_eq!(facet, "aether-presence");
    }
}
