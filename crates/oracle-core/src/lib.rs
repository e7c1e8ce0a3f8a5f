//! oracle-core: routing and workflow engine for a conversational oracle.
//!
//! One conversational turn flows through the `TurnDispatcher`: retrieval
//! context is fetched, keyword triggers and the shadow probe are consulted,
//! an elemental responder answers as fallback, and the turn is persisted to
//! soul memory and echoed (anonymized) into the collective field. Guided
//! multi-step journeys run through the `JourneyRunner` against the static
//! `WorkflowCatalog`.

mod claude_bridge;
mod classifier;
mod collaborators;
mod config;
mod dispatcher;
mod error;
mod insight;
mod responder;
mod shared;
mod soul_memory;
pub mod workflow;

// Shared types
pub use shared::{
    Element, InsightLogRecord, InsightPayload, MemoryRecord, Query, Reply, SafetyVerdict,
    SpiralPhase,
};

// Errors and configuration
pub use config::OracleConfig;
pub use error::OracleError;

// Elemental classification
pub use classifier::{classify, score, AETHER_BASELINE};

// Responders and the pool
pub use responder::{
    Responder, ResponderPool, ResponderPoolBuilder, ResponderReply, ShadowWorker,
    DREAM_TRIGGERS, FEEDBACK_PROMPT_ORACLE, FEEDBACK_PROMPT_SHADOW, GUIDANCE_TRIGGERS,
    MENTOR_TRIGGERS,
};

// Turn dispatch
pub use dispatcher::TurnDispatcher;

// Collaborator interfaces and the default implementations
pub use collaborators::{FacetDetector, GenerationService, InsightLogger, MemoryStore, SafetyService};
pub use claude_bridge::ClaudeBridge;
pub use insight::{CollectiveFieldLogger, EmittedInsight};
pub use soul_memory::SoulMemoryStore;

// Workflows and journeys
pub use workflow::{
    Journey, JourneyRunner, JourneyStart, JourneyStatus, Step, StepAdvance, StepExecution,
    StepKind, StepOutcome, WorkflowCatalog, WorkflowTemplate,
};
