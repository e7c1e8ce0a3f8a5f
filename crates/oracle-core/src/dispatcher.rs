//! Turn dispatcher: one conversational turn from query to normalized reply.
//!
//! Routing per turn: keyword triggers (dream → mentor → guidance, first match
//! wins), then the unconditional shadow probe, then elemental fallback via
//! the classifier. The chosen responder is invoked through the capability
//! adapter; the result is enriched with facet/provider metadata, persisted to
//! memory, and mirrored to the collective field. Memory persistence and
//! insight logging are independent best-effort writes: a failure in either
//! never blocks the other or the returned reply.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::classifier;
use crate::collaborators::{FacetDetector, InsightLogger, MemoryStore};
use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::responder::{
    Responder, ResponderPool, ResponderReply, FEEDBACK_PROMPT_ORACLE, FEEDBACK_PROMPT_SHADOW,
};
use crate::shared::{InsightLogRecord, InsightPayload, MemoryRecord, Query, Reply};

/// Which rule family answered the turn; selects the feedback prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteFamily {
    Shadow,
    Oracle,
}

pub struct TurnDispatcher {
    pool: Arc<ResponderPool>,
    memory: Arc<dyn MemoryStore>,
    insights: Arc<dyn InsightLogger>,
    facets: Arc<dyn FacetDetector>,
    config: OracleConfig,
}

impl TurnDispatcher {
    pub fn new(
        pool: Arc<ResponderPool>,
        memory: Arc<dyn MemoryStore>,
        insights: Arc<dyn InsightLogger>,
        facets: Arc<dyn FacetDetector>,
        config: OracleConfig,
    ) -> Self {
        Self {
            pool,
            memory,
            insights,
            facets,
            config,
        }
    }

    /// Handle one turn. Only lookup-class failures surface as `Err`; every
    /// collaborator failure degrades in place.
    pub async fn handle_turn(&self, query: &Query) -> Result<Reply, OracleError> {
        let memories = match self
            .memory
            .fetch_relevant(&query.user_id, &query.text, self.config.memory_top_k)
            .await
        {
            Ok(m) => m,
            Err(e) => {
                warn!(
                    target: "oracle::dispatch",
                    error = %e,
                    "memory fetch failed; continuing with empty context"
                );
                Vec::new()
            }
        };

        let mut routing_path = Vec::new();
        let (raw, provider, family) = self.route(query, &memories, &mut routing_path).await?;

        let facet = match self.facets.detect(&query.text).await {
            Ok(f) => f,
            Err(e) => {
                warn!(target: "oracle::dispatch", error = %e, "facet detection failed");
                String::new()
            }
        };

        let reply = finalize_reply(raw, provider, family, facet, routing_path);

        // Independent side-channel writes: each isolated, both best-effort.
        self.persist_memory(query, &reply).await;
        self.emit_insight(query, &reply, memories).await;

        Ok(reply)
    }

    /// Apply trigger rules, shadow probe, and elemental fallback. Returns the
    /// raw responder payload, the provider name, and the rule family.
    async fn route(
        &self,
        query: &Query,
        memories: &[MemoryRecord],
        routing_path: &mut Vec<String>,
    ) -> Result<(ResponderReply, String, RouteFamily), OracleError> {
        if let Some((rule, responder)) = self.pool.triggered(&query.text) {
            routing_path.push(format!("trigger:{rule}"));
            let reply = self.invoke(&responder, query, memories).await?;
            let provider = reply
                .provider
                .clone()
                .unwrap_or_else(|| responder.name().to_string());
            routing_path.push(provider.clone());
            return Ok((reply, provider, RouteFamily::Oracle));
        }

        if self.config.shadow_enabled {
            match self.pool.shadow().probe(query).await {
                Ok(Some(reply)) => {
                    let provider = reply
                        .provider
                        .clone()
                        .unwrap_or_else(|| self.pool.shadow().name().to_string());
                    routing_path.push("shadow".to_string());
                    routing_path.push(provider.clone());
                    return Ok((reply, provider, RouteFamily::Shadow));
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(target: "oracle::dispatch", error = %e, "shadow probe failed; falling through");
                }
            }
        }

        let element = classifier::classify(&query.text);
        routing_path.push(format!("element:{element}"));
        let responder = self.pool.elemental(element)?;
        let reply = self.invoke(&responder, query, memories).await?;
        let provider = reply
            .provider
            .clone()
            .unwrap_or_else(|| responder.name().to_string());
        routing_path.push(provider.clone());
        Ok((reply, provider, RouteFamily::Oracle))
    }

    /// Signature-adapting wrapper: the shape was declared at registration.
    async fn invoke(
        &self,
        responder: &Arc<dyn Responder>,
        query: &Query,
        memories: &[MemoryRecord],
    ) -> Result<ResponderReply, OracleError> {
        if responder.accepts_extended() {
            responder.respond_extended(query, memories).await
        } else {
            responder.respond(&query.text).await
        }
    }

    async fn persist_memory(&self, query: &Query, reply: &Reply) {
        let record = MemoryRecord {
            user_id: query.user_id.clone(),
            content: reply.content.clone(),
            element: reply
                .metadata
                .get("element")
                .and_then(|v| v.as_str())
                .and_then(crate::shared::Element::from_str),
            source_agent: Some(reply.provider.clone()),
            confidence: Some(reply.confidence),
            metadata: reply.metadata.clone(),
            timestamp: Utc::now(),
        };
        if let Err(e) = self.memory.append(record).await {
            warn!(target: "oracle::dispatch", error = %e, "memory append failed; turn continues");
        }
    }

    async fn emit_insight(&self, query: &Query, reply: &Reply, context: Vec<MemoryRecord>) {
        let element = reply
            .metadata
            .get("element")
            .and_then(|v| v.as_str())
            .and_then(crate::shared::Element::from_str)
            .unwrap_or_else(|| classifier::classify(&query.text));
        let record = InsightLogRecord {
            anon_id: anonymize(&query.user_id),
            archetype: reply
                .metadata
                .get("archetype")
                .and_then(|v| v.as_str())
                .unwrap_or(&reply.provider)
                .to_string(),
            element,
            insight: InsightPayload {
                message: reply.content.clone(),
                raw_input: query.text.clone(),
            },
            emotion: assess_emotional_valence(&query.text),
            phase: query.phase(),
            context,
        };
        if let Err(e) = self.insights.append(record).await {
            warn!(target: "oracle::dispatch", error = %e, "insight append failed; turn continues");
        }
        debug!(target: "oracle::dispatch", provider = %reply.provider, "turn stabilized");
    }
}

/// Merge responder output into the normalized Reply shape. The metadata map
/// always ends up with `facet`, `provider`, and `feedback_prompt`.
fn finalize_reply(
    raw: ResponderReply,
    provider: String,
    family: RouteFamily,
    facet: String,
    routing_path: Vec<String>,
) -> Reply {
    let feedback_prompt = match family {
        RouteFamily::Shadow => FEEDBACK_PROMPT_SHADOW,
        RouteFamily::Oracle => FEEDBACK_PROMPT_ORACLE,
    };
    let mut metadata = raw.metadata;
    metadata.insert("facet".to_string(), serde_json::json!(facet));
    metadata.insert("provider".to_string(), serde_json::json!(provider));
    metadata.insert(
        "feedback_prompt".to_string(),
        serde_json::json!(feedback_prompt),
    );
    if let Some(element) = raw.element {
        metadata.insert("element".to_string(), serde_json::json!(element.as_str()));
    }
    if let Some(archetype) = raw.archetype {
        metadata.insert("archetype".to_string(), serde_json::json!(archetype));
    }
    if let Some(prompt) = raw.reflection_prompt {
        metadata.insert("reflection_prompt".to_string(), serde_json::json!(prompt));
    }
    if let Some(model) = raw.model {
        metadata.insert("model".to_string(), serde_json::json!(model));
    }
    Reply {
        content: raw.content,
        confidence: raw.confidence.clamp(0.0, 1.0),
        metadata,
        provider,
        routing_path,
    }
}

/// Stable anonymized id for collective-field emission; never the raw user id.
fn anonymize(user_id: &str) -> String {
    let mut hasher = DefaultHasher::new();
    user_id.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Coarse emotional valence of the input in [-1, 1] from polarity keywords.
fn assess_emotional_valence(text: &str) -> f32 {
    const POSITIVE: &[&str] = &[
        "grateful", "joy", "happy", "love", "excited", "hope", "peace", "calm",
    ];
    const NEGATIVE: &[&str] = &[
        "sad", "angry", "afraid", "anxious", "lost", "stuck", "grief", "hate",
        "overwhelmed", "lonely",
    ];
    let lower = text.to_lowercase();
    let pos = POSITIVE.iter().filter(|k| lower.contains(*k)).count() as f32;
    let neg = NEGATIVE.iter().filter(|k| lower.contains(*k)).count() as f32;
    if pos + neg == 0.0 {
        return 0.0;
    }
    ((pos - neg) / (pos + neg)).clamp(-1.0, 1.0)
}
