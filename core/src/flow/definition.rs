// fitbook/src/flow/definition.rs

//! `Flow<TData, Err>`: an ordered list of named steps and the handlers
//! registered against them.

use super::context_data::ContextData;
use super::control::StepControl;
use super::error::{FlowError, FlowResult};
use super::step::StepDef;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// A step handler. It receives a clone of the shared context and resolves to
/// the control signal for the flow.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>> + Send + Sync,
>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  pub(crate) const ALL: [Phase; 3] = [Phase::Before, Phase::On, Phase::After];

  pub(crate) fn label(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

/// Ordered steps over context `TData`; handlers fail with `Err`.
///
/// `Err` must absorb [`FlowError`] so that structural problems found while
/// running (a required step without handlers, an unknown resume point) come
/// back through the same error channel as handler failures.
pub struct Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) handlers: HashMap<(String, Phase), Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(name: impl Into<String>, steps: Vec<StepDef<TData>>) -> FlowResult<Self> {
    let mut flow = Self {
      name: name.into(),
      steps: Vec::with_capacity(steps.len()),
      handlers: HashMap::new(),
    };
    for step in steps {
      flow.ensure_step_not_exists(&step.name)?;
      flow.steps.push(step);
    }
    Ok(flow)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> impl Iterator<Item = &str> {
    self.steps.iter().map(|s| s.name.as_str())
  }

  pub(crate) fn position(&self, step_name: &str) -> FlowResult<usize> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  fn ensure_step_not_exists(&self, step_name: &str) -> FlowResult<()> {
    if self.steps.iter().any(|s| s.name == step_name) {
      return Err(FlowError::DuplicateStep {
        step_name: step_name.to_string(),
      });
    }
    Ok(())
  }

  pub fn insert_after_step(&mut self, existing_step_name: &str, step: StepDef<TData>) -> FlowResult<()> {
    let idx = self.position(existing_step_name)?;
    self.ensure_step_not_exists(&step.name)?;
    self.steps.insert(idx + 1, step);
    Ok(())
  }

  pub fn remove_step(&mut self, step_name: &str) {
    if let Some(idx) = self.steps.iter().position(|s| s.name == step_name) {
      self.steps.remove(idx);
      for phase in Phase::ALL {
        self.handlers.remove(&(step_name.to_string(), phase));
      }
    }
  }

  pub(crate) fn handlers_for(&self, step_name: &str, phase: Phase) -> Option<&Vec<Handler<TData, Err>>> {
    self
      .handlers
      .get(&(step_name.to_string(), phase))
      .filter(|handlers| !handlers.is_empty())
  }

  fn push_handler<F, HandlerErr>(
    &mut self,
    step_name: &str,
    phase: Phase,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<()>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.position(step_name)?;
    let handler: Handler<TData, Err> = Box::new(move |ctx_data| {
      let fut = handler_fn(ctx_data);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self
      .handlers
      .entry((step_name.to_string(), phase))
      .or_default()
      .push(handler);
    Ok(())
  }

  /// Registers a handler that runs before the `on` handlers of `step_name`.
  pub fn before<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<()>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(step_name, Phase::Before, handler_fn)
  }

  pub fn on<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<()>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(step_name, Phase::On, handler_fn)
  }

  pub fn after<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<()>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.push_handler(step_name, Phase::After, handler_fn)
  }
}
