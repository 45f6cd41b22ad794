use crate::error::WizardError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Scope,
    Category,
    Activity,
    Details,
    Review,
}

impl WizardStep {
    /// All steps in display order
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Scope,
        WizardStep::Category,
        WizardStep::Activity,
        WizardStep::Details,
        WizardStep::Review,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Scope => "scope",
            WizardStep::Category => "category",
            WizardStep::Activity => "activity",
            WizardStep::Details => "details",
            WizardStep::Review => "review",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates a step transition.
///
/// Every step change the wizard makes goes through this table:
///
/// - `set_scope` lands on `Category` from any step, so it appears in every row
/// - `set_category` moves `Category` to `Activity`, or to `Details` for 3.1 / 3.2
/// - `set_activity` moves `Activity` to `Details`
/// - `add_entry` moves `Details` back to `Scope`
/// - `review` moves `Scope` to `Review`
/// - `go_back` takes the reverse edge of each of the above
pub fn validate_transition(from: WizardStep, to: WizardStep) -> Result<(), WizardError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(WizardError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: WizardStep) -> Vec<WizardStep> {
    use WizardStep::*;
    match from {
        Scope => vec![Category, Review],
        Category => vec![Category, Activity, Details, Scope],
        Activity => vec![Category, Details],
        Details => vec![Category, Activity, Scope],
        Review => vec![Category, Scope],
    }
}

fn allowed(from: WizardStep, to: WizardStep) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
