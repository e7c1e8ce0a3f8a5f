//! Journey runner: instantiates a workflow template for one user and
//! advances it one step at a time.
//!
//! Lookup failures (unknown workflow, unknown journey) are fatal to the call
//! and bubble to the caller. Step-execution failures never are: generation
//! and safety errors are recovered locally into diagnostic step results so a
//! journey always advances instead of getting stuck.
//!
//! Each journey sits behind its own async mutex inside the registry, so
//! concurrent `execute_next_step` calls on the same journey serialize into a
//! single-writer sequence. Cancellation is cooperative: it flips the status
//! flag and does not interrupt a step already awaiting the generation
//! service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::collaborators::{GenerationService, SafetyService};
use crate::error::OracleError;
use crate::shared::Element;
use crate::workflow::catalog::{Step, StepKind, WorkflowCatalog, WorkflowTemplate};

/// In-character fallback surfaced when the generation service fails.
pub const AGENT_ERROR_MESSAGE: &str =
    "I encountered a moment of silence within the oracle. Let us simply breathe here together.";

/// Default intervention message when the safety service flags input without
/// supplying its own response.
const SAFETY_DEFAULT_MESSAGE: &str =
    "Let us pause here. What you shared deserves more care than this space can hold alone.";

const PAUSE_DEFAULT_SECS: u64 = 30;
const PAUSE_DEFAULT_INSTRUCTION: &str = "Pause here. Breathe slowly and let the last step settle.";
const REFLECTION_DEFAULT_PROMPT: &str =
    "What is present for you right now, at this point on the spiral?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JourneyStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl JourneyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JourneyStatus::Active => "active",
            JourneyStatus::Paused => "paused",
            JourneyStatus::Completed => "completed",
            JourneyStatus::Cancelled => "cancelled",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, JourneyStatus::Completed | JourneyStatus::Cancelled)
    }
}

/// Result of executing one journey step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepOutcome {
    AgentResponse {
        element: Option<Element>,
        content: String,
    },
    SafetyIntervention {
        message: String,
        support_resources: Vec<String>,
    },
    AgentError {
        message: String,
    },
    Pause {
        duration_secs: u64,
        instruction: String,
    },
    MemoryQueued {
        note: String,
    },
    MemoryError {
        message: String,
    },
    Reflection {
        prompt: String,
    },
    UnknownStep {
        step_id: String,
    },
}

/// Append-only history entry: one per advanced step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepExecution {
    pub step: Step,
    pub result: StepOutcome,
    pub executed_at: DateTime<Utc>,
    #[serde(default)]
    pub user_input: Option<String>,
}

/// One running instance of a workflow template for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
    pub id: String,
    pub user_id: String,
    pub workflow_id: String,
    pub context: serde_json::Value,
    pub current_step_index: usize,
    pub status: JourneyStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    pub step_history: Vec<StepExecution>,
}

/// Returned by `start_journey`.
#[derive(Debug, Clone)]
pub struct JourneyStart {
    pub journey_id: String,
    pub workflow: Arc<WorkflowTemplate>,
    pub next_step: Step,
}

/// Returned by `execute_next_step`.
#[derive(Debug, Clone)]
pub struct StepAdvance {
    /// None only for the idempotent completed-journey read.
    pub step_result: Option<StepOutcome>,
    pub next_step: Option<Step>,
    pub journey_complete: bool,
}

pub struct JourneyRunner {
    catalog: Arc<WorkflowCatalog>,
    journeys: DashMap<String, Arc<Mutex<Journey>>>,
    generation: Arc<dyn GenerationService>,
    safety: Arc<dyn SafetyService>,
}

impl JourneyRunner {
    pub fn new(
        catalog: Arc<WorkflowCatalog>,
        generation: Arc<dyn GenerationService>,
        safety: Arc<dyn SafetyService>,
    ) -> Self {
        Self {
            catalog,
            journeys: DashMap::new(),
            generation,
            safety,
        }
    }

    /// Instantiate a journey from a template. Unknown workflow ids are fatal.
    pub fn start_journey(
        &self,
        workflow_id: &str,
        user_id: &str,
        context: serde_json::Value,
    ) -> Result<JourneyStart, OracleError> {
        let workflow = self
            .catalog
            .get(workflow_id)
            .ok_or_else(|| OracleError::WorkflowNotFound(workflow_id.to_string()))?;
        let first_step = workflow
            .steps
            .first()
            .cloned()
            .ok_or_else(|| OracleError::WorkflowNotFound(workflow_id.to_string()))?;

        let journey_id = Uuid::new_v4().to_string();
        let journey = Journey {
            id: journey_id.clone(),
            user_id: user_id.to_string(),
            workflow_id: workflow_id.to_string(),
            context,
            current_step_index: 0,
            status: JourneyStatus::Active,
            started_at: Utc::now(),
            completed_at: None,
            cancelled_at: None,
            step_history: Vec::new(),
        };
        self.journeys
            .insert(journey_id.clone(), Arc::new(Mutex::new(journey)));
        info!(
            target: "oracle::journey",
            journey = %journey_id,
            workflow = workflow_id,
            "journey started"
        );
        Ok(JourneyStart {
            journey_id,
            workflow,
            next_step: first_step,
        })
    }

    /// Advance the journey by exactly one step. Calling past the last step is
    /// an idempotent completion read: no side effects, no history mutation.
    pub async fn execute_next_step(
        &self,
        journey_id: &str,
        user_input: Option<&str>,
    ) -> Result<StepAdvance, OracleError> {
        let entry = self.journey_entry(journey_id)?;
        let mut journey = entry.lock().await;
        let template = self
            .catalog
            .get(&journey.workflow_id)
            .ok_or_else(|| OracleError::WorkflowNotFound(journey.workflow_id.clone()))?;

        if journey.current_step_index >= template.steps.len() {
            return Ok(StepAdvance {
                step_result: None,
                next_step: None,
                journey_complete: true,
            });
        }

        let step = template.steps[journey.current_step_index].clone();
        let result = self.execute_step(&journey, &template, &step, user_input).await;

        journey.step_history.push(StepExecution {
            step,
            result: result.clone(),
            executed_at: Utc::now(),
            user_input: user_input.map(str::to_string),
        });
        journey.current_step_index += 1;

        let journey_complete = journey.current_step_index == template.steps.len();
        if journey_complete && !journey.status.is_terminal() {
            journey.status = JourneyStatus::Completed;
            journey.completed_at = Some(Utc::now());
            info!(
                target: "oracle::journey",
                journey = %journey.id,
                steps = journey.step_history.len(),
                "journey completed"
            );
        }

        let next_step = template.steps.get(journey.current_step_index).cloned();
        Ok(StepAdvance {
            step_result: Some(result),
            next_step,
            journey_complete,
        })
    }

    /// Toggle Active↔Paused. Returns false for unknown ids and for terminal
    /// journeys (the toggle is rejected rather than resurrecting them).
    pub async fn pause_journey(&self, journey_id: &str) -> bool {
        let Ok(entry) = self.journey_entry(journey_id) else {
            return false;
        };
        let mut journey = entry.lock().await;
        if journey.status.is_terminal() {
            warn!(
                target: "oracle::journey",
                journey = %journey.id,
                status = journey.status.as_str(),
                "pause toggle rejected on terminal journey"
            );
            return false;
        }
        journey.status = match journey.status {
            JourneyStatus::Active => JourneyStatus::Paused,
            _ => JourneyStatus::Active,
        };
        true
    }

    /// Cancel a journey. Returns false only for unknown ids; re-cancel is a
    /// harmless overwrite.
    pub async fn cancel_journey(&self, journey_id: &str) -> bool {
        let Ok(entry) = self.journey_entry(journey_id) else {
            return false;
        };
        let mut journey = entry.lock().await;
        journey.status = JourneyStatus::Cancelled;
        journey.cancelled_at = Some(Utc::now());
        info!(target: "oracle::journey", journey = %journey.id, "journey cancelled");
        true
    }

    /// Structural snapshot of a journey; identical across repeated calls when
    /// nothing advanced in between.
    pub async fn get_journey_status(&self, journey_id: &str) -> Option<Journey> {
        let entry = self.journey_entry(journey_id).ok()?;
        let journey = entry.lock().await;
        Some(journey.clone())
    }

    pub fn get_available_workflows(&self) -> Vec<Arc<WorkflowTemplate>> {
        self.catalog.all().to_vec()
    }

    pub fn get_workflow_by_trigger(&self, keyword: &str) -> Option<Arc<WorkflowTemplate>> {
        self.catalog.find_by_trigger(keyword)
    }

    fn journey_entry(&self, journey_id: &str) -> Result<Arc<Mutex<Journey>>, OracleError> {
        self.journeys
            .get(journey_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| OracleError::JourneyNotFound(journey_id.to_string()))
    }

    /// Execute one step's side effect. Never returns an error: every upstream
    /// failure is folded into a diagnostic outcome.
    async fn execute_step(
        &self,
        journey: &Journey,
        template: &WorkflowTemplate,
        step: &Step,
        user_input: Option<&str>,
    ) -> StepOutcome {
        match step.kind {
            StepKind::AgentCall => self.run_agent_call(journey, template, step, user_input).await,
            StepKind::Pause => run_pause(step),
            StepKind::MemoryStore => run_memory_store(journey, step),
            StepKind::Reflection => run_reflection(step),
            StepKind::Unknown => {
                warn!(
                    target: "oracle::journey",
                    journey = %journey.id,
                    step = %step.id,
                    "unrecognized step type"
                );
                StepOutcome::UnknownStep {
                    step_id: step.id.clone(),
                }
            }
        }
    }

    async fn run_agent_call(
        &self,
        journey: &Journey,
        template: &WorkflowTemplate,
        step: &Step,
        user_input: Option<&str>,
    ) -> StepOutcome {
        if let Some(input) = user_input {
            match self.safety.moderate(input, &journey.user_id).await {
                Ok(verdict) if !verdict.safe => {
                    return StepOutcome::SafetyIntervention {
                        message: verdict
                            .response
                            .unwrap_or_else(|| SAFETY_DEFAULT_MESSAGE.to_string()),
                        support_resources: verdict.support_resources,
                    };
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        target: "oracle::journey",
                        journey = %journey.id,
                        error = %e,
                        "safety check failed; step degrades to agent_error"
                    );
                    return StepOutcome::AgentError {
                        message: AGENT_ERROR_MESSAGE.to_string(),
                    };
                }
            }
        }

        let prompt = build_agent_prompt(journey, template, step, user_input);
        match self.generation.generate(&prompt).await {
            Ok(content) => StepOutcome::AgentResponse {
                element: step.agent_element,
                content,
            },
            Err(e) => {
                warn!(
                    target: "oracle::journey",
                    journey = %journey.id,
                    step = %step.id,
                    error = %e,
                    "generation failed; recovering with agent_error"
                );
                StepOutcome::AgentError {
                    message: AGENT_ERROR_MESSAGE.to_string(),
                }
            }
        }
    }
}

/// Context-carrying prompt: workflow, step, user input, and progress so far.
fn build_agent_prompt(
    journey: &Journey,
    template: &WorkflowTemplate,
    step: &Step,
    user_input: Option<&str>,
) -> String {
    let voice = step
        .agent_element
        .map(|e| e.as_str())
        .unwrap_or("aether");
    let hint = step
        .config
        .get("prompt")
        .and_then(|v| v.as_str())
        .unwrap_or("Guide the seeker through this step.");
    format!(
        "You are the {voice} voice of the oracle, guiding the '{workflow}' journey.\n\
         Step: {step_name}\n\
         Steps completed so far: {prior}\n\
         Seeker input: {input}\n\
         {hint}",
        workflow = template.id,
        step_name = step.name,
        prior = journey.step_history.len(),
        input = user_input.unwrap_or("(none)"),
    )
}

fn run_pause(step: &Step) -> StepOutcome {
    StepOutcome::Pause {
        duration_secs: step
            .config
            .get("duration_secs")
            .and_then(|v| v.as_u64())
            .unwrap_or(PAUSE_DEFAULT_SECS),
        instruction: step
            .config
            .get("instruction")
            .and_then(|v| v.as_str())
            .unwrap_or(PAUSE_DEFAULT_INSTRUCTION)
            .to_string(),
    }
}

/// Queue a completion note for the memory layer. Only logged in this scope;
/// a malformed note template downgrades to a soft memory_error.
fn run_memory_store(journey: &Journey, step: &Step) -> StepOutcome {
    match build_memory_note(journey, step) {
        Ok(note) => {
            info!(
                target: "oracle::journey",
                journey = %journey.id,
                step = %step.id,
                note = %note,
                "memory note queued"
            );
            StepOutcome::MemoryQueued { note }
        }
        Err(message) => {
            warn!(
                target: "oracle::journey",
                journey = %journey.id,
                step = %step.id,
                error = %message,
                "memory note construction failed"
            );
            StepOutcome::MemoryError { message }
        }
    }
}

fn build_memory_note(journey: &Journey, step: &Step) -> Result<String, String> {
    match step.config.get("note") {
        None => Ok(format!(
            "Completed step '{}' of journey '{}'.",
            step.id, journey.workflow_id
        )),
        Some(serde_json::Value::String(note)) => Ok(note.clone()),
        Some(other) => Err(format!(
            "memory note must be a string, got: {other}"
        )),
    }
}

fn run_reflection(step: &Step) -> StepOutcome {
    StepOutcome::Reflection {
        prompt: step
            .config
            .get("prompt")
            .and_then(|v| v.as_str())
            .unwrap_or(REFLECTION_DEFAULT_PROMPT)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::SafetyVerdict;
    use async_trait::async_trait;

    struct StaticGen(Result<&'static str, &'static str>);

    #[async_trait]
    impl GenerationService for StaticGen {
        async fn generate(&self, _prompt: &str) -> Result<String, OracleError> {
            match self.0 {
                Ok(s) => Ok(s.to_string()),
                Err(e) => Err(OracleError::upstream(e)),
            }
        }
    }

    struct StaticSafety(bool);

    #[async_trait]
    impl SafetyService for StaticSafety {
        async fn moderate(&self, _text: &str, _user_id: &str) -> Result<SafetyVerdict, OracleError> {
            if self.0 {
                Ok(SafetyVerdict::safe())
            } else {
                Ok(SafetyVerdict {
                    safe: false,
                    response: Some("hold on, seeker".to_string()),
                    support_resources: vec!["support-line".to_string()],
                })
            }
        }
    }

    fn runner(generation: StaticGen, safety: StaticSafety) -> JourneyRunner {
        JourneyRunner::new(
            Arc::new(WorkflowCatalog::builtin()),
            Arc::new(generation),
            Arc::new(safety),
        )
    }

    #[tokio::test]
    async fn start_unknown_workflow_is_fatal() {
        let r = runner(StaticGen(Ok("light")), StaticSafety(true));
        let err = r.start_journey("no_such_flow", "u1", serde_json::json!({}));
        assert!(matches!(err, Err(OracleError::WorkflowNotFound(_))));
    }

    #[tokio::test]
    async fn morning_reflection_runs_to_completion() {
        let r = runner(StaticGen(Ok("dawn light")), StaticSafety(true));
        let start = r
            .start_journey("morning_reflection", "u1", serde_json::json!({}))
            .unwrap();
        assert_eq!(start.next_step.id, "air_greeting");

        let mut complete = false;
        for _ in 0..6 {
            let adv = r.execute_next_step(&start.journey_id, None).await.unwrap();
            assert!(adv.step_result.is_some());
            complete = adv.journey_complete;
        }
        assert!(complete);

        let journey = r.get_journey_status(&start.journey_id).await.unwrap();
        assert_eq!(journey.status, JourneyStatus::Completed);
        assert!(journey.completed_at.is_some());
        assert_eq!(journey.current_step_index, 6);
        assert_eq!(journey.step_history.len(), 6);
    }

    #[tokio::test]
    async fn completion_read_is_idempotent() {
        let r = runner(StaticGen(Ok("light")), StaticSafety(true));
        let start = r
            .start_journey("shadow_integration", "u1", serde_json::json!({}))
            .unwrap();
        for _ in 0..4 {
            r.execute_next_step(&start.journey_id, None).await.unwrap();
        }
        let before = r.get_journey_status(&start.journey_id).await.unwrap();

        let adv = r.execute_next_step(&start.journey_id, None).await.unwrap();
        assert!(adv.journey_complete);
        assert!(adv.step_result.is_none());
        assert!(adv.next_step.is_none());

        let after = r.get_journey_status(&start.journey_id).await.unwrap();
        assert_eq!(after.step_history.len(), before.step_history.len());
        assert_eq!(after.current_step_index, before.current_step_index);
    }

    #[tokio::test]
    async fn generation_failure_becomes_agent_error_and_advances() {
        let r = runner(StaticGen(Err("model offline")), StaticSafety(true));
        let start = r
            .start_journey("morning_reflection", "u1", serde_json::json!({}))
            .unwrap();
        let adv = r.execute_next_step(&start.journey_id, None).await.unwrap();
        match adv.step_result.unwrap() {
            StepOutcome::AgentError { message } => assert_eq!(message, AGENT_ERROR_MESSAGE),
            other => panic!("expected agent_error, got {other:?}"),
        }
        let journey = r.get_journey_status(&start.journey_id).await.unwrap();
        assert_eq!(journey.current_step_index, 1);
        assert_eq!(journey.step_history.len(), 1);
    }

    #[tokio::test]
    async fn unsafe_input_yields_intervention_and_still_advances() {
        let r = runner(StaticGen(Ok("light")), StaticSafety(false));
        let start = r
            .start_journey("morning_reflection", "u1", serde_json::json!({}))
            .unwrap();
        let adv = r
            .execute_next_step(&start.journey_id, Some("dark thoughts"))
            .await
            .unwrap();
        match adv.step_result.unwrap() {
            StepOutcome::SafetyIntervention {
                message,
                support_resources,
            } => {
                assert_eq!(message, "hold on, seeker");
                assert_eq!(support_resources, vec!["support-line".to_string()]);
            }
            other => panic!("expected safety_intervention, got {other:?}"),
        }
        let journey = r.get_journey_status(&start.journey_id).await.unwrap();
        assert_eq!(journey.current_step_index, 1);
        assert!(journey.step_history[0].user_input.as_deref() == Some("dark thoughts"));
    }

    #[tokio::test]
    async fn pause_and_reflection_steps_use_config_with_defaults() {
        let r = runner(StaticGen(Ok("light")), StaticSafety(true));
        let start = r
            .start_journey("morning_reflection", "u1", serde_json::json!({}))
            .unwrap();
        r.execute_next_step(&start.journey_id, None).await.unwrap(); // air_greeting
        let adv = r.execute_next_step(&start.journey_id, None).await.unwrap(); // set_intention
        assert!(matches!(
            adv.step_result.unwrap(),
            StepOutcome::Reflection { prompt } if prompt.contains("quality")
        ));
        let adv = r.execute_next_step(&start.journey_id, None).await.unwrap(); // breath_pause
        match adv.step_result.unwrap() {
            StepOutcome::Pause {
                duration_secs,
                instruction,
            } => {
                assert_eq!(duration_secs, 60);
                assert!(!instruction.is_empty());
            }
            other => panic!("expected pause, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn memory_store_step_queues_note() {
        let r = runner(StaticGen(Ok("light")), StaticSafety(true));
        let start = r
            .start_journey("morning_reflection", "u1", serde_json::json!({}))
            .unwrap();
        for _ in 0..4 {
            r.execute_next_step(&start.journey_id, None).await.unwrap();
        }
        let adv = r.execute_next_step(&start.journey_id, None).await.unwrap(); // record_intention
        assert!(matches!(
            adv.step_result.unwrap(),
            StepOutcome::MemoryQueued { note } if note.contains("intention")
        ));
    }

    #[tokio::test]
    async fn pause_toggle_guards_terminal_states() {
        let r = runner(StaticGen(Ok("light")), StaticSafety(true));
        let start = r
            .start_journey("shadow_integration", "u1", serde_json::json!({}))
            .unwrap();

        assert!(r.pause_journey(&start.journey_id).await);
        let j = r.get_journey_status(&start.journey_id).await.unwrap();
        assert_eq!(j.status, JourneyStatus::Paused);
        assert!(r.pause_journey(&start.journey_id).await);
        let j = r.get_journey_status(&start.journey_id).await.unwrap();
        assert_eq!(j.status, JourneyStatus::Active);

        assert!(r.cancel_journey(&start.journey_id).await);
        assert!(!r.pause_journey(&start.journey_id).await);
        let j = r.get_journey_status(&start.journey_id).await.unwrap();
        assert_eq!(j.status, JourneyStatus::Cancelled);
        assert!(j.cancelled_at.is_some());
    }

    #[tokio::test]
    async fn cancel_semantics() {
        let r = runner(StaticGen(Ok("light")), StaticSafety(true));
        assert!(!r.cancel_journey("missing").await);
        assert!(r.get_journey_status("missing").await.is_none());

        let start = r
            .start_journey("dream_integration", "u1", serde_json::json!({}))
            .unwrap();
        assert!(r.cancel_journey(&start.journey_id).await);
        // Re-cancel is a harmless overwrite.
        assert!(r.cancel_journey(&start.journey_id).await);
        let j = r.get_journey_status(&start.journey_id).await.unwrap();
        assert_eq!(j.status, JourneyStatus::Cancelled);
    }

    #[tokio::test]
    async fn unknown_journey_is_fatal_for_execute() {
        let r = runner(StaticGen(Ok("light")), StaticSafety(true));
        let err = r.execute_next_step("missing", None).await;
        assert!(matches!(err, Err(OracleError::JourneyNotFound(_))));
    }

    #[tokio::test]
    async fn status_snapshot_is_stable_between_advances() {
        let r = runner(StaticGen(Ok("light")), StaticSafety(true));
        let start = r
            .start_journey("dream_integration", "u1", serde_json::json!({}))
            .unwrap();
        r.execute_next_step(&start.journey_id, Some("a falling dream"))
            .await
            .unwrap();
        let a = r.get_journey_status(&start.journey_id).await.unwrap();
        let b = r.get_journey_status(&start.journey_id).await.unwrap();
        assert_eq!(serde_json::to_value(&a).unwrap(), serde_json::to_value(&b).unwrap());
    }

    #[test]
    fn step_outcome_serializes_with_type_tag() {
        let v = serde_json::to_value(StepOutcome::UnknownStep {
            step_id: "x".to_string(),
        })
        .unwrap();
        assert_eq!(v["type"], serde_json::json!("unknown_step"));
        let v = serde_json::to_value(StepOutcome::SafetyIntervention {
            message: "m".to_string(),
            support_resources: vec![],
        })
        .unwrap();
        assert_eq!(v["type"], serde_json::json!("safety_intervention"));
    }
}
