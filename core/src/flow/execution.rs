// fitbook/src/flow/execution.rs

//! `Flow::run` and `Flow::run_from`.

use super::context_data::ContextData;
use super::control::{FlowOutcome, StepControl};
use super::definition::{Flow, Phase};
use super::error::FlowError;
use super::step::StepDef;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step from the first one.
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<FlowOutcome, Err> {
    self.run_steps(0, ctx_data).await
  }

  /// Runs from `step_name` onwards, skipping everything before it. Used to
  /// pick a persisted workflow back up at the step it had not finished.
  pub async fn run_from(&self, step_name: &str, ctx_data: ContextData<TData>) -> Result<FlowOutcome, Err> {
    let start = self.position(step_name).map_err(Err::from)?;
    self.run_steps(start, ctx_data).await
  }

  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(flow = %self.name, start_index = start, num_steps = self.steps.len()),
    err(Display)
  )]
  async fn run_steps(&self, start: usize, ctx_data: ContextData<TData>) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, "Flow execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate().skip(start) {
      let step_span = span!(Level::INFO, "flow_step", step_name = step_def.name.as_str(), step_index = step_idx);
      let control = self.run_step(step_def, ctx_data.clone()).instrument(step_span).await?;
      if control == StepControl::Stop {
        return Ok(FlowOutcome::Stopped);
      }
    }

    event!(Level::DEBUG, "Flow execution completed.");
    Ok(FlowOutcome::Completed)
  }

  async fn run_step(&self, step_def: &StepDef<TData>, ctx_data: ContextData<TData>) -> Result<StepControl, Err> {
    let step_name = step_def.name.as_str();

    if let Some(skip_cond) = &step_def.skip_if {
      if skip_cond(ctx_data.clone()) {
        event!(Level::INFO, "Step skipped by its skip condition.");
        return Ok(StepControl::Continue);
      }
    }

    let has_any = Phase::ALL.iter().any(|phase| self.handlers_for(step_name, *phase).is_some());
    if !has_any {
      if step_def.optional {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(StepControl::Continue);
      }
      event!(Level::ERROR, "Non-optional step has no handlers.");
      return Err(Err::from(FlowError::HandlerMissing {
        step_name: step_def.name.clone(),
      }));
    }

    for phase in Phase::ALL {
      let Some(handlers) = self.handlers_for(step_name, phase) else {
        continue;
      };
      for (handler_idx, handler_fn) in handlers.iter().enumerate() {
        event!(Level::TRACE, phase = phase.label(), handler_idx, "Executing handler.");
        match handler_fn(ctx_data.clone()).await {
          Ok(StepControl::Continue) => {}
          Ok(StepControl::Stop) => {
            event!(Level::INFO, phase = phase.label(), "Flow stopped by a handler.");
            return Ok(StepControl::Stop);
          }
          Err(e) => {
            event!(Level::ERROR, phase = phase.label(), error = %e, "Handler failed.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Step finished.");
    Ok(StepControl::Continue)
  }
}
