// fitbook/src/flow/control.rs

/// Returned by a step handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Run the remaining handlers of this step, then the next step.
  Continue,
  /// Halt the flow here. Not an error: the handler has recorded why in the
  /// context (e.g. a charge that needs the user to resubmit).
  Stop,
}

/// Outcome of a full flow run that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  Completed,
  Stopped,
}
