//! Responder capability model and the fixed responder pool.
//!
//! Responders come in two shapes: a string-query shape returning a minimal
//! reply, and an extended-query shape returning a richer reply that carries
//! its own metadata/provider/model fields. The shape is declared once at
//! registration via `accepts_extended()`, never inspected per call; the
//! dispatcher adapts through that flag.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::OracleError;
use crate::shared::{Element, MemoryRecord, Query};

/// Keyword triggers checked ahead of elemental scoring, in rule order.
pub const DREAM_TRIGGERS: &[&str] = &["dream"];
pub const MENTOR_TRIGGERS: &[&str] = &["coach", "mentor", "goal", "plan"];
pub const GUIDANCE_TRIGGERS: &[&str] = &["guidance", "support", "direction"];

/// Feedback prompt attached when the shadow worker preempts routing.
pub const FEEDBACK_PROMPT_SHADOW: &str =
    "Sit with what surfaced. Did this reflection name something you usually turn away from?";
/// Feedback prompt for elemental and keyword-triggered replies.
pub const FEEDBACK_PROMPT_ORACLE: &str =
    "Did this guidance resonate with where you are right now?";

/// Payload produced by any responder. Minimal-shape responders fill only
/// `content` and `confidence`; extended-shape responders may set their own
/// provider, model, and metadata which the dispatcher merges through.
#[derive(Debug, Clone, Default)]
pub struct ResponderReply {
    pub content: String,
    pub confidence: f32,
    pub element: Option<Element>,
    pub archetype: Option<String>,
    pub reflection_prompt: Option<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Set by extended-shape responders that name themselves.
    pub provider: Option<String>,
    /// Model id when the responder delegated to a model.
    pub model: Option<String>,
}

impl ResponderReply {
    /// Minimal reply: content plus confidence, nothing else.
    pub fn minimal(content: impl Into<String>, confidence: f32) -> Self {
        Self {
            content: content.into(),
            confidence: confidence.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    pub fn with_reflection(mut self, prompt: impl Into<String>) -> Self {
        self.reflection_prompt = Some(prompt.into());
        self
    }
}

/// A named unit capable of turning a query into reply content.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Unique name for routing and provider attribution.
    fn name(&self) -> &str;

    /// Declared capability: when true, the dispatcher calls
    /// `respond_extended` with the full query and retrieval context.
    fn accepts_extended(&self) -> bool {
        false
    }

    /// String-query shape: text in, minimal reply out.
    async fn respond(&self, text: &str) -> Result<ResponderReply, OracleError>;

    /// Extended-query shape. Default delegates to the minimal shape so a
    /// responder only implements the signature it declared.
    async fn respond_extended(
        &self,
        query: &Query,
        memories: &[MemoryRecord],
    ) -> Result<ResponderReply, OracleError> {
        let _ = memories;
        self.respond(&query.text).await
    }
}

/// The always-consulted shadow-work path. A non-empty probe result preempts
/// elemental routing entirely.
#[async_trait]
pub trait ShadowWorker: Send + Sync {
    fn name(&self) -> &str;

    /// Returns a reply when the query shows shadow material, None otherwise.
    async fn probe(&self, query: &Query) -> Result<Option<ResponderReply>, OracleError>;
}

/// Fixed registry of responders for one engine instance. Built once at
/// startup; the builder fails fast when an elemental slot is missing, so
/// elemental lookup is total at runtime.
pub struct ResponderPool {
    elemental: HashMap<Element, Arc<dyn Responder>>,
    dream: Arc<dyn Responder>,
    mentor: Arc<dyn Responder>,
    guidance: Arc<dyn Responder>,
    shadow: Arc<dyn ShadowWorker>,
}

impl ResponderPool {
    pub fn builder() -> ResponderPoolBuilder {
        ResponderPoolBuilder::default()
    }

    /// Responder for an element. `ResponderMissing` here means the builder
    /// invariant was broken — fatal, not user-recoverable.
    pub fn elemental(&self, element: Element) -> Result<Arc<dyn Responder>, OracleError> {
        self.elemental
            .get(&element)
            .cloned()
            .ok_or_else(|| OracleError::ResponderMissing(element.as_str().to_string()))
    }

    pub fn shadow(&self) -> &Arc<dyn ShadowWorker> {
        &self.shadow
    }

    /// First matching keyword trigger, in rule order. Returns the rule label
    /// and the triggered responder; None falls through to the shadow probe
    /// and elemental routing.
    pub fn triggered(&self, text: &str) -> Option<(&'static str, Arc<dyn Responder>)> {
        let lower = text.to_lowercase();
        if DREAM_TRIGGERS.iter().any(|k| lower.contains(k)) {
            return Some(("dream", Arc::clone(&self.dream)));
        }
        if MENTOR_TRIGGERS.iter().any(|k| lower.contains(k)) {
            return Some(("mentor", Arc::clone(&self.mentor)));
        }
        if GUIDANCE_TRIGGERS.iter().any(|k| lower.contains(k)) {
            return Some(("guidance", Arc::clone(&self.guidance)));
        }
        None
    }
}

/// Builder that enforces a complete pool: all five elemental responders,
/// the three trigger responders, and the shadow worker.
#[derive(Default)]
pub struct ResponderPoolBuilder {
    elemental: HashMap<Element, Arc<dyn Responder>>,
    dream: Option<Arc<dyn Responder>>,
    mentor: Option<Arc<dyn Responder>>,
    guidance: Option<Arc<dyn Responder>>,
    shadow: Option<Arc<dyn ShadowWorker>>,
}

impl ResponderPoolBuilder {
    pub fn elemental(mut self, element: Element, responder: Arc<dyn Responder>) -> Self {
        self.elemental.insert(element, responder);
        self
    }

    pub fn dream(mut self, responder: Arc<dyn Responder>) -> Self {
        self.dream = Some(responder);
        self
    }

    pub fn mentor(mut self, responder: Arc<dyn Responder>) -> Self {
        self.mentor = Some(responder);
        self
    }

    pub fn guidance(mut self, responder: Arc<dyn Responder>) -> Self {
        self.guidance = Some(responder);
        self
    }

    pub fn shadow(mut self, worker: Arc<dyn ShadowWorker>) -> Self {
        self.shadow = Some(worker);
        self
    }

    pub fn build(self) -> Result<ResponderPool, OracleError> {
        for element in Element::ALL {
            if !self.elemental.contains_key(&element) {
                return Err(OracleError::ResponderMissing(element.as_str().to_string()));
            }
        }
        let missing = |slot: &str| OracleError::ResponderMissing(slot.to_string());
        Ok(ResponderPool {
            elemental: self.elemental,
            dream: self.dream.ok_or_else(|| missing("dream"))?,
            mentor: self.mentor.ok_or_else(|| missing("mentor"))?,
            guidance: self.guidance.ok_or_else(|| missing("guidance"))?,
            shadow: self.shadow.ok_or_else(|| missing("shadow"))?,
        })
    }
}
