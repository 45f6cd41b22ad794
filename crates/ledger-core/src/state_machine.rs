use crate::error::StateMachineError;
use crate::types::PeriodStatus;

/// Validates a reporting-period status transition.
///
/// Returning a period to an earlier status is only possible from `Review`
/// (back to `Draft`) and from `Audit` (back to `Review`).
pub fn validate_transition(from: PeriodStatus, to: PeriodStatus) -> Result<(), StateMachineError> {
    if from == PeriodStatus::Locked {
        return Err(StateMachineError::Locked);
    }
    if allowed(from, to) {
        tracing::debug!(%from, %to, "period transition accepted");
        Ok(())
    } else {
        Err(StateMachineError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: PeriodStatus) -> Vec<PeriodStatus> {
    use PeriodStatus::*;
    match from {
        Draft => vec![Review],
        Review => vec![Draft, Submitted],
        Submitted => vec![Audit],
        Audit => vec![Review, Verified],
        Verified => vec![Locked],
        Locked => vec![],
    }
}

fn allowed(from: PeriodStatus, to: PeriodStatus) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
