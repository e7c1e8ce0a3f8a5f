//! oracle-agents: the built-in responder set for the oracle engine.
//!
//! Five elemental voices, three keyword-triggered voices (dream, mentor,
//! guidance), the shadow mirror, and the keyword facet detector. `default_pool`
//! wires all of them into a complete `ResponderPool`.

mod aether;
mod air;
mod dream;
mod earth;
mod facet;
mod fire;
mod guidance;
mod mentor;
mod shadow;
mod water;

use std::sync::Arc;

use oracle_core::{Element, OracleError, ResponderPool};

pub use aether::AetherOracle;
pub use air::AirOracle;
pub use dream::DreamOracle;
pub use earth::EarthOracle;
pub use facet::KeywordFacetDetector;
pub use fire::FireOracle;
pub use guidance::GuidanceOracle;
pub use mentor::MentorOracle;
pub use shadow::ShadowMirror;
pub use water::WaterOracle;

/// The full built-in pool: all elemental slots, the trigger voices, and the
/// shadow mirror.
pub fn default_pool() -> Result<ResponderPool, OracleError> {
    ResponderPool::builder()
        .elemental(Element::Fire, Arc::new(FireOracle))
        .elemental(Element::Water, Arc::new(WaterOracle))
        .elemental(Element::Earth, Arc::new(EarthOracle))
        .elemental(Element::Air, Arc::new(AirOracle))
        .elemental(Element::Aether, Arc::new(AetherOracle))
        .dream(Arc::new(DreamOracle))
        .mentor(Arc::new(MentorOracle))
        .guidance(Arc::new(GuidanceOracle))
        .shadow(Arc::new(ShadowMirror))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_is_complete() {
        let pool = default_pool().unwrap();
        for element in Element::ALL {
            assert!(pool.elemental(element).is_ok());
        }
    }

    #[test]
    fn dream_queries_route_to_the_dream_oracle() {
        let pool = default_pool().unwrap();
        let (rule, responder) = pool.triggered("I had a dream about my grandmother").unwrap();
        assert_eq!(rule, "dream");
        assert_eq!(responder.name(), "dream_oracle");
        assert!(responder.accepts_extended());
    }

    #[test]
    fn coaching_queries_route_to_the_mentor() {
        let pool = default_pool().unwrap();
        let (rule, responder) = pool.triggered("I need a coach for my goals").unwrap();
        assert_eq!(rule, "mentor");
        assert_eq!(responder.name(), "mentor_oracle");
    }
}
