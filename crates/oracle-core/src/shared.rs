//! Shared types used across the oracle crates: elements, spiral phases,
//! queries, replies, and the write-only record shapes consumed by the
//! memory store and the collective-field logger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// Elements and spiral phases
// -----------------------------------------------------------------------------

/// Elemental archetype driving responder choice and reply flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Air,
    Aether,
}

impl Element {
    /// Enumeration order used for classifier tie-breaks: first element with
    /// the maximum score wins.
    pub const ALL: [Element; 5] = [
        Element::Fire,
        Element::Water,
        Element::Earth,
        Element::Air,
        Element::Aether,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "fire",
            Element::Water => "water",
            Element::Earth => "earth",
            Element::Air => "air",
            Element::Aether => "aether",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fire" => Some(Element::Fire),
            "water" => Some(Element::Water),
            "earth" => Some(Element::Earth),
            "air" => Some(Element::Air),
            "aether" => Some(Element::Aether),
            _ => None,
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Growth phase carried on insight records and elemental replies. The numeric
/// phase-gating simulation lives outside this engine; the label travels with
/// the data so downstream scoring can use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpiralPhase {
    #[default]
    Initiation,
    Exploration,
    Challenge,
    Transformation,
    Integration,
    Mastery,
    Transcendence,
}

impl SpiralPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpiralPhase::Initiation => "initiation",
            SpiralPhase::Exploration => "exploration",
            SpiralPhase::Challenge => "challenge",
            SpiralPhase::Transformation => "transformation",
            SpiralPhase::Integration => "integration",
            SpiralPhase::Mastery => "mastery",
            SpiralPhase::Transcendence => "transcendence",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "initiation" => Some(SpiralPhase::Initiation),
            "exploration" => Some(SpiralPhase::Exploration),
            "challenge" => Some(SpiralPhase::Challenge),
            "transformation" => Some(SpiralPhase::Transformation),
            "integration" => Some(SpiralPhase::Integration),
            "mastery" => Some(SpiralPhase::Mastery),
            "transcendence" => Some(SpiralPhase::Transcendence),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Turn input and output
// -----------------------------------------------------------------------------

/// Immutable input to one conversational turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub user_id: String,
    /// Opaque personalization context (e.g. spiral phase, tone preference).
    /// Passed through to extended-query responders untouched.
    #[serde(default)]
    pub personalization: Option<serde_json::Value>,
}

impl Query {
    pub fn new(text: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user_id: user_id.into(),
            personalization: None,
        }
    }

    /// Spiral phase from personalization context, defaulting to Initiation.
    pub fn phase(&self) -> SpiralPhase {
        self.personalization
            .as_ref()
            .and_then(|p| p.get("phase"))
            .and_then(|v| v.as_str())
            .and_then(SpiralPhase::from_str)
            .unwrap_or_default()
    }
}

/// Normalized reply returned from one turn. Constructed once by the
/// dispatcher; never mutated after return. `metadata` always carries at least
/// `facet`, `provider`, and `feedback_prompt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub content: String,
    /// Responder confidence in [0, 1].
    pub confidence: f32,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Name of the responder that actually produced `content`.
    pub provider: String,
    /// Ordered trace of routing decisions taken for this turn.
    pub routing_path: Vec<String>,
}

// -----------------------------------------------------------------------------
// Write-only record shapes
// -----------------------------------------------------------------------------

/// Append-only memory entry. Lifecycle is owned by the memory store; the
/// engine only writes these and reads them back as retrieval context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default)]
    pub source_agent: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// Message body of a collective-field insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightPayload {
    pub message: String,
    pub raw_input: String,
}

/// Anonymized insight emitted to the collective field after each turn.
/// Fire-and-forget: a failed append never aborts the turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightLogRecord {
    /// Stable anonymized id derived from the user id; never the raw id.
    pub anon_id: String,
    pub archetype: String,
    pub element: Element,
    pub insight: InsightPayload,
    /// Emotional valence of the raw input in [-1, 1].
    pub emotion: f32,
    pub phase: SpiralPhase,
    /// Retrieval context the turn was answered against.
    pub context: Vec<MemoryRecord>,
}

/// Verdict returned by the safety moderation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub safe: bool,
    /// In-character intervention message to surface instead of the reply.
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub support_resources: Vec<String>,
}

impl SafetyVerdict {
    pub fn safe() -> Self {
        Self {
            safe: true,
            response: None,
            support_resources: Vec::new(),
        }
    }
}
