//! Guided multi-step workflows: the template catalog and the journey runner
//! that walks a user through one template.

pub mod catalog;
pub mod journey;

pub use catalog::{Step, StepKind, WorkflowCatalog, WorkflowTemplate};
pub use journey::{
    Journey, JourneyRunner, JourneyStart, JourneyStatus, StepAdvance, StepExecution, StepOutcome,
};
