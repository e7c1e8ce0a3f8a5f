//! Workflow catalog: named, immutable step templates for guided journeys.
//!
//! Templates are defined once at process start and shared read-only across
//! all journeys. Execution is strictly linear by step index; a step has no
//! successor field.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::shared::Element;

/// What a journey step does when executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Safety-checked prompt to the generation service via an elemental voice.
    AgentCall,
    /// Timed rest with an instruction; no external call.
    Pause,
    /// Queue a completion note for the memory layer.
    MemoryStore,
    /// Static contemplation prompt from config.
    Reflection,
    /// Anything a future template version might add; executed as a
    /// diagnostic no-op rather than a failure.
    #[serde(other)]
    Unknown,
}

/// One unit of work within a workflow template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub name: String,
    pub kind: StepKind,
    /// Step-type specific settings (prompt, duration, note template).
    #[serde(default)]
    pub config: serde_json::Value,
    /// Elemental voice for agent_call steps.
    #[serde(default)]
    pub agent_element: Option<Element>,
}

impl Step {
    fn new(id: &str, name: &str, kind: StepKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            config: serde_json::Value::Null,
            agent_element: None,
        }
    }

    fn with_element(mut self, element: Element) -> Self {
        self.agent_element = Some(element);
        self
    }

    fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}

/// Immutable, shareable journey template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Keywords that surface this template via `find_by_trigger`.
    pub triggers: Vec<String>,
    pub steps: Vec<Step>,
}

/// Read-only table of workflow templates, built once at startup and owned by
/// the journey runner (no ambient module state).
pub struct WorkflowCatalog {
    templates: Vec<Arc<WorkflowTemplate>>,
}

impl WorkflowCatalog {
    /// The built-in template set.
    pub fn builtin() -> Self {
        Self {
            templates: vec![
                Arc::new(morning_reflection()),
                Arc::new(dream_integration()),
                Arc::new(shadow_integration()),
            ],
        }
    }

    pub fn get(&self, workflow_id: &str) -> Option<Arc<WorkflowTemplate>> {
        self.templates
            .iter()
            .find(|t| t.id == workflow_id)
            .cloned()
    }

    /// First template (in registration order) whose trigger list has a
    /// case-insensitive substring match for the keyword.
    pub fn find_by_trigger(&self, keyword: &str) -> Option<Arc<WorkflowTemplate>> {
        let kw = keyword.trim().to_lowercase();
        if kw.is_empty() {
            return None;
        }
        self.templates
            .iter()
            .find(|t| t.triggers.iter().any(|trig| trig.to_lowercase().contains(&kw)))
            .cloned()
    }

    pub fn all(&self) -> &[Arc<WorkflowTemplate>] {
        &self.templates
    }
}

impl Default for WorkflowCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn morning_reflection() -> WorkflowTemplate {
    WorkflowTemplate {
        id: "morning_reflection".to_string(),
        name: "Morning Reflection".to_string(),
        description: "Six-step dawn sequence: clarity, intention, breath, activation, anchoring, blessing."
            .to_string(),
        triggers: vec!["morning".to_string(), "start my day".to_string()],
        steps: vec![
            Step::new("air_greeting", "Air Greeting", StepKind::AgentCall)
                .with_element(Element::Air)
                .with_config(serde_json::json!({
                    "prompt": "Greet the seeker at dawn and invite one clear thought for the day."
                })),
            Step::new("set_intention", "Set Intention", StepKind::Reflection).with_config(
                serde_json::json!({
                    "prompt": "What quality do you want to carry through this day?"
                }),
            ),
            Step::new("breath_pause", "Breath Pause", StepKind::Pause).with_config(
                serde_json::json!({ "duration_secs": 60, "instruction": "Breathe slowly; let the intention settle." }),
            ),
            Step::new("fire_activation", "Fire Activation", StepKind::AgentCall)
                .with_element(Element::Fire)
                .with_config(serde_json::json!({
                    "prompt": "Ignite one small act of energy the seeker can take this morning."
                })),
            Step::new("record_intention", "Record Intention", StepKind::MemoryStore).with_config(
                serde_json::json!({ "note": "Morning intention set and anchored." }),
            ),
            Step::new("aether_blessing", "Aether Blessing", StepKind::AgentCall)
                .with_element(Element::Aether)
                .with_config(serde_json::json!({
                    "prompt": "Close the morning sequence with a short unifying blessing."
                })),
        ],
    }
}

fn dream_integration() -> WorkflowTemplate {
    WorkflowTemplate {
        id: "dream_integration".to_string(),
        name: "Dream Integration".to_string(),
        description: "Recall a dream, descend into its waters, and surface its meaning.".to_string(),
        triggers: vec!["dream".to_string()],
        steps: vec![
            Step::new("dream_recall", "Dream Recall", StepKind::Reflection).with_config(
                serde_json::json!({
                    "prompt": "Describe the dream as it returns to you, without interpreting it yet."
                }),
            ),
            Step::new("water_immersion", "Water Immersion", StepKind::AgentCall)
                .with_element(Element::Water)
                .with_config(serde_json::json!({
                    "prompt": "Receive the dream material and reflect its emotional current back."
                })),
            Step::new("symbol_pause", "Symbol Pause", StepKind::Pause).with_config(
                serde_json::json!({ "duration_secs": 45, "instruction": "Hold the strongest image from the dream." }),
            ),
            Step::new("dream_memory", "Dream Memory", StepKind::MemoryStore).with_config(
                serde_json::json!({ "note": "Dream material recorded for the symbolic thread." }),
            ),
            Step::new("air_meaning", "Air Meaning", StepKind::AgentCall)
                .with_element(Element::Air)
                .with_config(serde_json::json!({
                    "prompt": "Offer one clear perspective on what the dream may be saying."
                })),
        ],
    }
}

fn shadow_integration() -> WorkflowTemplate {
    WorkflowTemplate {
        id: "shadow_integration".to_string(),
        name: "Shadow Integration".to_string(),
        description: "Meet projected material gently and fold it back in.".to_string(),
        triggers: vec!["shadow".to_string()],
        steps: vec![
            Step::new("shadow_greeting", "Shadow Greeting", StepKind::AgentCall)
                .with_element(Element::Aether)
                .with_config(serde_json::json!({
                    "prompt": "Welcome the seeker into shadow work without judgment."
                })),
            Step::new("shadow_prompt", "Shadow Prompt", StepKind::Reflection).with_config(
                serde_json::json!({
                    "prompt": "Name one trait in another person that reliably irritates you. Where does it live in you?"
                }),
            ),
            Step::new("integration_pause", "Integration Pause", StepKind::Pause).with_config(
                serde_json::json!({ "duration_secs": 90, "instruction": "Stay with whatever arose; no fixing." }),
            ),
            Step::new("shadow_memory", "Shadow Memory", StepKind::MemoryStore).with_config(
                serde_json::json!({ "note": "Shadow material acknowledged." }),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn morning_reflection_shape() {
        let catalog = WorkflowCatalog::builtin();
        let t = catalog.get("morning_reflection").unwrap();
        assert_eq!(t.steps.len(), 6);
        assert_eq!(t.steps[0].id, "air_greeting");
        assert_eq!(t.steps[0].kind, StepKind::AgentCall);
        assert_eq!(t.steps[0].agent_element, Some(Element::Air));
    }

    #[test]
    fn get_unknown_returns_none() {
        assert!(WorkflowCatalog::builtin().get("nope").is_none());
    }

    #[test]
    fn find_by_trigger_is_case_insensitive() {
        let catalog = WorkflowCatalog::builtin();
        assert_eq!(
            catalog.find_by_trigger("MORNING").unwrap().id,
            "morning_reflection"
        );
        assert_eq!(
            catalog.find_by_trigger("Dream").unwrap().id,
            "dream_integration"
        );
        assert!(catalog.find_by_trigger("tarot").is_none());
        assert!(catalog.find_by_trigger("").is_none());
    }

    #[test]
    fn unknown_step_kind_deserializes() {
        let s: StepKind = serde_json::from_str("\"galactic_alignment\"").unwrap();
        assert_eq!(s, StepKind::Unknown);
    }
}
