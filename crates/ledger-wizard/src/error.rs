//! Wizard errors
//!
//! Step misuse is reported here. An incomplete draft is not an error:
//! `add_entry` answers `false` and the caller re-checks the required fields.
//! Incomplete entries handed back from outside the wizard are.

use crate::entry::RequiredField;
use crate::step::WizardStep;
use ledger_core::{Category, Scope};

/// Wizard operation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    /// Operation issued while the wizard sits on another step
    #[error("expected step {expected}, wizard is at {actual}")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    /// Step edge not in the transition table
    #[error("illegal wizard transition: {from} -> {to}")]
    IllegalTransition { from: WizardStep, to: WizardStep },

    /// Category chosen before a scope
    #[error("no scope selected")]
    NoScopeSelected,

    /// Known category filed under a different scope
    #[error("category {category} belongs to {expected}, not {selected}")]
    CategoryScopeMismatch {
        category: Category,
        expected: Scope,
        selected: Scope,
    },

    /// Specialized categories take their activity from the sub-form
    #[error("category {0} has its own entry form and no activity picker")]
    SpecializedCategory(Category),

    /// Spend sub-form used outside a specialized category
    #[error("spend-based entry requires a specialized category, got {0}")]
    NotSpendBased(Category),

    /// Review requested with an empty buffer
    #[error("no entries to review")]
    NothingToReview,

    /// Restored entry lacks a required field
    #[error("entry {index} is incomplete: missing {}", join_fields(.missing))]
    IncompleteEntry {
        index: usize,
        missing: Vec<RequiredField>,
    },
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_step_display() {
        let err = WizardError::WrongStep {
            expected: WizardStep::Details,
            actual: WizardStep::Scope,
        };
        assert_eq!(err.to_string(), "expected step details, wizard is at scope");
    }

    #[test]
    fn mismatch_display_names_both_scopes() {
        let err = WizardError::CategoryScopeMismatch {
            category: Category::PurchasedElectricity,
            expected: Scope::Scope2,
            selected: Scope::Scope1,
        };
        assert_eq!(
            err.to_string(),
            "category 2.1 belongs to Scope 2, not Scope 1"
        );
    }

    #[test]
    fn incomplete_entry_lists_fields() {
        let err = WizardError::IncompleteEntry {
            index: 2,
            missing: vec![RequiredField::Description, RequiredField::Quantity],
        };
        assert_eq!(
            err.to_string(),
            "entry 2 is incomplete: missing description, quantity"
        );
    }
}
