//! Entry types
//!
//! An [`EntryDraft`] is the half-filled form; a [`WizardEntry`] only exists
//! once every required field has been supplied.

use chrono::NaiveDate;
use ledger_core::{Category, EmissionFactor, Scope, SiteId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of the factor chosen for an entry, used for the preview total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSnapshot {
    /// kg CO2e per unit
    pub co2e_factor: f64,
    pub source: String,
    pub display_name: String,
}

impl From<&EmissionFactor> for FactorSnapshot {
    fn from(factor: &EmissionFactor) -> Self {
        Self {
            co2e_factor: factor.co2e_factor,
            source: factor.source.clone(),
            display_name: factor.display_name.clone(),
        }
    }
}

/// Completed, independently submittable activity entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardEntry {
    pub scope: Scope,
    pub category_code: Category,
    pub activity_key: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub activity_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<SiteId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2e_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_name: Option<String>,
}

impl WizardEntry {
    /// Preview emissions in kg CO2e; a missing factor contributes 0
    #[inline]
    #[must_use]
    pub fn preview_co2e(&self) -> f64 {
        self.quantity * self.co2e_factor.unwrap_or(0.0)
    }

    /// Required fields that are blank or falsy
    ///
    /// Entries deserialized from outside the wizard can carry values the
    /// draft would never accept; this applies the same rules.
    #[must_use]
    pub fn missing(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if !is_filled(Some(self.activity_key.as_str())) {
            missing.push(RequiredField::ActivityKey);
        }
        if !is_filled(Some(self.description.as_str())) {
            missing.push(RequiredField::Description);
        }
        if !is_valid_quantity(self.quantity) {
            missing.push(RequiredField::Quantity);
        }
        if !is_filled(Some(self.unit.as_str())) {
            missing.push(RequiredField::Unit);
        }
        missing
    }
}

/// Field edit applied on the details step
#[derive(Debug, Clone, PartialEq)]
pub enum EntryField {
    ActivityKey(String),
    Description(String),
    Quantity(f64),
    Unit(String),
    ActivityDate(NaiveDate),
    Site(Option<SiteId>),
    Factor(Option<FactorSnapshot>),
}

/// Required field names, reported by `missing_fields`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Scope,
    CategoryCode,
    ActivityKey,
    Description,
    Quantity,
    Unit,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequiredField::Scope => "scope",
            RequiredField::CategoryCode => "category_code",
            RequiredField::ActivityKey => "activity_key",
            RequiredField::Description => "description",
            RequiredField::Quantity => "quantity",
            RequiredField::Unit => "unit",
        };
        f.write_str(name)
    }
}

/// Entry being assembled on the details step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub activity_key: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub activity_date: Option<NaiveDate>,
    pub site_id: Option<SiteId>,
    pub factor: Option<FactorSnapshot>,
}

impl EntryDraft {
    /// Merge one field edit
    pub fn apply(&mut self, field: EntryField) {
        match field {
            EntryField::ActivityKey(key) => self.activity_key = Some(key),
            EntryField::Description(text) => self.description = Some(text),
            EntryField::Quantity(quantity) => self.quantity = Some(quantity),
            EntryField::Unit(unit) => self.unit = Some(unit),
            EntryField::ActivityDate(date) => self.activity_date = Some(date),
            EntryField::Site(site) => self.site_id = site,
            EntryField::Factor(factor) => self.factor = factor,
        }
    }

    /// Drop everything tied to the chosen activity
    ///
    /// Quantity goes too: it is expressed in the activity's unit.
    pub(crate) fn clear_activity(&mut self) {
        self.activity_key = None;
        self.quantity = None;
        self.unit = None;
        self.factor = None;
    }

    /// Draft fields that are absent or falsy
    pub(crate) fn missing(&self) -> Vec<RequiredField> {
        let mut missing = Vec::new();
        if !is_filled(self.activity_key.as_deref()) {
            missing.push(RequiredField::ActivityKey);
        }
        if !is_filled(self.description.as_deref()) {
            missing.push(RequiredField::Description);
        }
        if !self.quantity.is_some_and(is_valid_quantity) {
            missing.push(RequiredField::Quantity);
        }
        if !is_filled(self.unit.as_deref()) {
            missing.push(RequiredField::Unit);
        }
        missing
    }
}

fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn is_valid_quantity(quantity: f64) -> bool {
    quantity.is_finite() && quantity != 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_misses_every_field() {
        let draft = EntryDraft::default();
        assert_eq!(
            draft.missing(),
            vec![
                RequiredField::ActivityKey,
                RequiredField::Description,
                RequiredField::Quantity,
                RequiredField::Unit,
            ]
        );
    }

    #[test]
    fn zero_and_nan_quantities_are_missing() {
        let mut draft = EntryDraft::default();
        draft.apply(EntryField::Quantity(0.0));
        assert!(draft.missing().contains(&RequiredField::Quantity));
        draft.apply(EntryField::Quantity(f64::NAN));
        assert!(draft.missing().contains(&RequiredField::Quantity));
        draft.apply(EntryField::Quantity(-3.5));
        assert!(!draft.missing().contains(&RequiredField::Quantity));
    }

    #[test]
    fn blank_strings_are_missing() {
        let mut draft = EntryDraft::default();
        draft.apply(EntryField::Description("   ".into()));
        assert!(draft.missing().contains(&RequiredField::Description));
    }

    fn fleet_entry() -> WizardEntry {
        WizardEntry {
            scope: Scope::Scope1,
            category_code: Category::MobileCombustion,
            activity_key: "diesel".into(),
            description: "Fleet".into(),
            quantity: 120.0,
            unit: "L".into(),
            activity_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            site_id: None,
            co2e_factor: None,
            factor_source: None,
            factor_name: None,
        }
    }

    #[test]
    fn preview_without_factor_is_zero() {
        assert_eq!(fleet_entry().preview_co2e(), 0.0);
    }

    #[test]
    fn clearing_activity_drops_quantity_but_keeps_description() {
        let mut draft = EntryDraft::default();
        draft.apply(EntryField::ActivityKey("diesel".into()));
        draft.apply(EntryField::Description("Fleet".into()));
        draft.apply(EntryField::Quantity(40.0));
        draft.apply(EntryField::Unit("L".into()));
        draft.clear_activity();
        assert_eq!(draft.quantity, None);
        assert_eq!(draft.description.as_deref(), Some("Fleet"));
        assert_eq!(
            draft.missing(),
            vec![
                RequiredField::ActivityKey,
                RequiredField::Quantity,
                RequiredField::Unit,
            ]
        );
    }

    #[test]
    fn complete_entry_misses_nothing() {
        assert!(fleet_entry().missing().is_empty());
    }

    #[test]
    fn deserialized_entry_with_blank_fields_is_incomplete() {
        let entry = WizardEntry {
            activity_key: " ".into(),
            description: String::new(),
            quantity: f64::NAN,
            unit: "\t".into(),
            ..fleet_entry()
        };
        assert_eq!(
            entry.missing(),
            vec![
                RequiredField::ActivityKey,
                RequiredField::Description,
                RequiredField::Quantity,
                RequiredField::Unit,
            ]
        );
        let zero = WizardEntry {
            quantity: 0.0,
            ..fleet_entry()
        };
        assert_eq!(zero.missing(), vec![RequiredField::Quantity]);
    }
}
