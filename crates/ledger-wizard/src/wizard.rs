//! Activity-entry wizard
//!
//! Walks the user through `scope → category → activity → details` and buffers
//! completed entries until they are submitted in bulk. The wizard owns its
//! state; callers hold it by value or behind whatever handle their UI uses.

use crate::entry::{EntryDraft, EntryField, FactorSnapshot, RequiredField, WizardEntry};
use crate::error::WizardError;
use crate::step::{validate_transition, WizardStep};
use chrono::{Local, NaiveDate};
use ledger_core::currency::{calculate_spend_emissions, SpendEmissions};
use ledger_core::{Category, EmissionFactor, Scope};

/// Unit recorded for spend-based entries
pub const SPEND_UNIT: &str = "USD";

/// Wizard state container
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityWizard {
    step: WizardStep,
    scope: Option<Scope>,
    category: Option<Category>,
    draft: EntryDraft,
    entries: Vec<WizardEntry>,
}

impl Default for ActivityWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityWizard {
    /// Fresh wizard on the scope step
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: WizardStep::Scope,
            scope: None,
            category: None,
            draft: EntryDraft::default(),
            entries: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    #[inline]
    #[must_use]
    pub fn scope(&self) -> Option<Scope> {
        self.scope
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn draft(&self) -> &EntryDraft {
        &self.draft
    }

    /// Buffered entries awaiting submission
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[WizardEntry] {
        &self.entries
    }

    /// Select a scope; clears category, activity, factor and the draft
    ///
    /// Every step has an edge to `Category`, so this never fails in
    /// practice; a refused edge leaves the wizard untouched.
    pub fn set_scope(&mut self, scope: Scope) {
        if let Err(err) = self.move_to(WizardStep::Category) {
            tracing::warn!(%scope, error = %err, "wizard scope selection refused");
            return;
        }
        self.scope = Some(scope);
        self.category = None;
        self.draft = EntryDraft::default();
        tracing::debug!(%scope, "wizard scope selected");
    }

    /// Select a category
    ///
    /// Categories 3.1 and 3.2 have their own sub-forms and jump straight to
    /// `Details`; every other code goes to `Activity`.
    ///
    /// # Errors
    /// Returns error when not on the category step or when a known category
    /// belongs to another scope
    pub fn set_category(&mut self, category: impl Into<Category>) -> Result<WizardStep, WizardError> {
        self.expect_step(WizardStep::Category)?;
        let category = category.into();
        let selected = self.scope.ok_or(WizardError::NoScopeSelected)?;

        if !category.is_unknown() {
            if let Some(expected) = category.scope().filter(|s| *s != selected) {
                return Err(WizardError::CategoryScopeMismatch {
                    category,
                    expected,
                    selected,
                });
            }
        }

        let next = if category.is_specialized() {
            WizardStep::Details
        } else {
            WizardStep::Activity
        };
        self.move_to(next)?;
        tracing::debug!(category = %category, %next, "wizard category selected");
        self.category = Some(category);
        Ok(next)
    }

    /// Select an activity and its emission factor
    ///
    /// The draft unit is seeded from the factor's activity unit.
    ///
    /// # Errors
    /// Returns error when not on the activity step
    pub fn set_activity(
        &mut self,
        activity_key: impl Into<String>,
        factor: Option<&EmissionFactor>,
    ) -> Result<(), WizardError> {
        if let Some(category) = self.category.as_ref().filter(|c| c.is_specialized()) {
            return Err(WizardError::SpecializedCategory(category.clone()));
        }
        self.expect_step(WizardStep::Activity)?;
        self.move_to(WizardStep::Details)?;

        self.draft.activity_key = Some(activity_key.into());
        self.draft.unit = factor.map(|f| f.activity_unit.clone());
        self.draft.factor = factor.map(FactorSnapshot::from);
        tracing::debug!(activity = ?self.draft.activity_key, "wizard activity selected");
        Ok(())
    }

    /// Merge one field into the draft
    ///
    /// # Errors
    /// Returns error when not on the details step
    pub fn set_entry_field(&mut self, field: EntryField) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Details)?;
        self.draft.apply(field);
        Ok(())
    }

    /// Fill the draft from a spend amount for a spend-based category
    ///
    /// Sets quantity to the USD amount, unit to [`SPEND_UNIT`] and the factor
    /// to `ef_per_usd`.
    ///
    /// # Errors
    /// Returns error when not on the details step of a specialized category
    pub fn apply_spend(
        &mut self,
        amount: f64,
        currency: &str,
        ef_per_usd: f64,
        source: impl Into<String>,
    ) -> Result<SpendEmissions, WizardError> {
        self.expect_step(WizardStep::Details)?;
        match self.category.as_ref() {
            Some(c) if c.is_specialized() => {}
            Some(c) => return Err(WizardError::NotSpendBased(c.clone())),
            None => return Err(WizardError::NoScopeSelected),
        }

        let estimate = calculate_spend_emissions(amount, currency, ef_per_usd);
        self.draft.quantity = Some(estimate.amount_usd);
        self.draft.unit = Some(SPEND_UNIT.to_string());
        self.draft.factor = Some(FactorSnapshot {
            co2e_factor: ef_per_usd,
            source: source.into(),
            display_name: "Spend-based".to_string(),
        });
        Ok(estimate)
    }

    /// Required fields still absent or falsy
    #[must_use]
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if self.scope.is_none() {
            missing.push(RequiredField::Scope);
        }
        if self.category.is_none() {
            missing.push(RequiredField::CategoryCode);
        }
        missing.extend(self.draft.missing());
        missing
    }

    /// Append the draft dated today, see [`ActivityWizard::add_entry_on`]
    pub fn add_entry(&mut self) -> bool {
        self.add_entry_on(Local::now().date_naive())
    }

    /// Append the draft to the buffer
    ///
    /// Succeeds only when every required field is present; a missing
    /// activity date becomes `today`. On success the selection is reset and
    /// the wizard returns to the scope step. On failure nothing changes.
    pub fn add_entry_on(&mut self, today: NaiveDate) -> bool {
        let Some(entry) = self.build_entry(today) else {
            tracing::debug!(missing = ?self.missing_fields(), "wizard entry incomplete");
            return false;
        };
        if let Err(err) = self.move_to(WizardStep::Scope) {
            tracing::warn!(error = %err, "wizard entry refused");
            return false;
        }

        tracing::debug!(
            scope = %entry.scope,
            category = %entry.category_code,
            activity = %entry.activity_key,
            "wizard entry buffered"
        );
        self.entries.push(entry);
        self.clear_selection();
        true
    }

    /// Move back one step, clearing the selection that led forward
    ///
    /// From a specialized category's details the wizard returns to
    /// `Category`, mirroring the forward skip. Description and date typed
    /// on the details step are kept; quantity is dropped with the activity
    /// because it was entered in that activity's unit.
    pub fn go_back(&mut self) -> WizardStep {
        let specialized = self.category.as_ref().is_some_and(Category::is_specialized);
        let previous = match self.step {
            WizardStep::Scope => return WizardStep::Scope,
            WizardStep::Review | WizardStep::Category => WizardStep::Scope,
            WizardStep::Activity => WizardStep::Category,
            WizardStep::Details if specialized => WizardStep::Category,
            WizardStep::Details => WizardStep::Activity,
        };
        let from = self.step;
        if let Err(err) = self.move_to(previous) {
            tracing::warn!(error = %err, "wizard step back refused");
            return from;
        }

        match from {
            WizardStep::Category => self.scope = None,
            WizardStep::Activity => self.category = None,
            WizardStep::Details => {
                self.draft.clear_activity();
                if specialized {
                    self.category = None;
                }
            }
            WizardStep::Scope | WizardStep::Review => {}
        }
        tracing::debug!(%from, to = %previous, "wizard step back");
        previous
    }

    /// Open the review step
    ///
    /// # Errors
    /// Returns error when the buffer is empty or a selection is in progress
    pub fn review(&mut self) -> Result<(), WizardError> {
        if self.entries.is_empty() {
            return Err(WizardError::NothingToReview);
        }
        self.move_to(WizardStep::Review)
    }

    /// Preview total over buffered entries, kg CO2e
    #[must_use]
    pub fn total_co2e(&self) -> f64 {
        self.entries.iter().map(WizardEntry::preview_co2e).sum()
    }

    /// Remove a buffered entry
    pub fn remove_entry(&mut self, index: usize) -> Option<WizardEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Hand the buffered entries to a submitter, leaving the buffer empty
    pub fn take_entries(&mut self) -> Vec<WizardEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Put entries back at the front of the buffer, e.g. after a failed submit
    ///
    /// # Errors
    /// Returns [`WizardError::IncompleteEntry`] for the first entry with a
    /// blank or falsy required field; the buffer is left untouched.
    pub fn restore_entries(&mut self, mut entries: Vec<WizardEntry>) -> Result<(), WizardError> {
        if let Some((index, missing)) = entries
            .iter()
            .map(WizardEntry::missing)
            .enumerate()
            .find(|(_, missing)| !missing.is_empty())
        {
            return Err(WizardError::IncompleteEntry { index, missing });
        }
        entries.append(&mut self.entries);
        self.entries = entries;
        Ok(())
    }

    /// Drop everything and return to the scope step
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn build_entry(&self, today: NaiveDate) -> Option<WizardEntry> {
        let scope = self.scope?;
        let category_code = self.category.clone()?;
        if !self.draft.missing().is_empty() {
            return None;
        }
        let draft = &self.draft;
        let factor = draft.factor.as_ref();

        Some(WizardEntry {
            scope,
            category_code,
            activity_key: draft.activity_key.clone()?,
            description: draft.description.clone()?,
            quantity: draft.quantity?,
            unit: draft.unit.clone()?,
            activity_date: draft.activity_date.unwrap_or(today),
            site_id: draft.site_id,
            co2e_factor: factor.map(|f| f.co2e_factor),
            factor_source: factor.map(|f| f.source.clone()),
            factor_name: factor.map(|f| f.display_name.clone()),
        })
    }

    fn clear_selection(&mut self) {
        self.scope = None;
        self.category = None;
        self.draft = EntryDraft::default();
    }

    fn expect_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    fn move_to(&mut self, next: WizardStep) -> Result<(), WizardError> {
        validate_transition(self.step, next)?;
        self.step = next;
        Ok(())
    }
}
