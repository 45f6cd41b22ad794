//! Ledger Wizard - activity-entry state machine
//!
//! A finite step sequence with one conditional skip:
//!
//! ```text
//! scope → category → activity → details → (buffer) → scope …
//!                  ↘ details (categories 3.1 / 3.2)
//! ```
//!
//! The wizard is a plain owned value with no UI or I/O attached, so every
//! transition can be exercised directly in tests. Submission lives in
//! `ledger-client`.
//!
//! # Example
//!
//! ```rust
//! use ledger_core::Scope;
//! use ledger_wizard::{ActivityWizard, EntryField, WizardStep};
//!
//! let mut wizard = ActivityWizard::new();
//! wizard.set_scope(Scope::Scope3);
//! assert_eq!(wizard.set_category("3.1").unwrap(), WizardStep::Details);
//! wizard.set_entry_field(EntryField::ActivityKey("it_equipment".into())).unwrap();
//! wizard.set_entry_field(EntryField::Description("Laptops".into())).unwrap();
//! wizard.apply_spend(2_000.0, "EUR", 0.35, "EEIO").unwrap();
//! assert!(wizard.add_entry());
//! assert_eq!(wizard.entries().len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod entry;
pub mod error;
pub mod step;
pub mod wizard;

pub use entry::{EntryDraft, EntryField, FactorSnapshot, RequiredField, WizardEntry};
pub use error::WizardError;
pub use step::{allowed_transitions, validate_transition, WizardStep};
pub use wizard::{ActivityWizard, SPEND_UNIT};
