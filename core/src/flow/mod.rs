// fitbook/src/flow/mod.rs

//! A small async step engine: named steps, `before`/`on`/`after` handlers,
//! early stop, and resumption from a named step. The checkout workflow is
//! built on it.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod error;
mod execution;
pub mod step;

pub use context_data::ContextData;
pub use control::{FlowOutcome, StepControl};
pub use definition::{Flow, Handler};
pub use error::{FlowError, FlowResult};
pub use step::{SkipCondition, StepDef};
