//! Concurrency behavior of the journey runner: advances on one journey
//! serialize through its own lock, and journeys never interfere with each
//! other.

use std::sync::Arc;

use async_trait::async_trait;
use oracle_core::{
    GenerationService, JourneyRunner, OracleError, SafetyService, SafetyVerdict, WorkflowCatalog,
};

struct SlowGen;

#[async_trait]
impl GenerationService for SlowGen {
    async fn generate(&self, _prompt: &str) -> Result<String, OracleError> {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        Ok("a slow but steady word".to_string())
    }
}

struct AlwaysSafe;

#[async_trait]
impl SafetyService for AlwaysSafe {
    async fn moderate(&self, _text: &str, _user_id: &str) -> Result<SafetyVerdict, OracleError> {
        Ok(SafetyVerdict::safe())
    }
}

fn runner() -> Arc<JourneyRunner> {
    Arc::new(JourneyRunner::new(
        Arc::new(WorkflowCatalog::builtin()),
        Arc::new(SlowGen),
        Arc::new(AlwaysSafe),
    ))
}

#[tokio::test]
async fn concurrent_advances_on_one_journey_serialize() {
    let r = runner();
    let start = r
        .start_journey("morning_reflection", "u1", serde_json::json!({}))
        .unwrap();
    let id = start.journey_id.clone();

    let (a, b) = tokio::join!(
        {
            let r = Arc::clone(&r);
            let id = id.clone();
            async move { r.execute_next_step(&id, None).await }
        },
        {
            let r = Arc::clone(&r);
            let id = id.clone();
            async move { r.execute_next_step(&id, None).await }
        }
    );
    a.unwrap();
    b.unwrap();

    // Exactly two steps advanced, no duplicated or skipped index.
    let journey = r.get_journey_status(&id).await.unwrap();
    assert_eq!(journey.current_step_index, 2);
    assert_eq!(journey.step_history.len(), 2);
    assert_eq!(journey.step_history[0].step.id, "air_greeting");
    assert_eq!(journey.step_history[1].step.id, "set_intention");
}

#[tokio::test]
async fn separate_journeys_do_not_interfere() {
    let r = runner();
    let j1 = r
        .start_journey("dream_integration", "u1", serde_json::json!({}))
        .unwrap();
    let j2 = r
        .start_journey("dream_integration", "u2", serde_json::json!({}))
        .unwrap();
    assert_ne!(j1.journey_id, j2.journey_id);

    r.execute_next_step(&j1.journey_id, None).await.unwrap();
    let one = r.get_journey_status(&j1.journey_id).await.unwrap();
    let two = r.get_journey_status(&j2.journey_id).await.unwrap();
    assert_eq!(one.current_step_index, 1);
    assert_eq!(two.current_step_index, 0);
}
