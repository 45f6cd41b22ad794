//! Fixture builders and proptest strategies

use chrono::NaiveDate;
use ledger_client::{AuthSession, Organization, User};
use ledger_core::{
    ActivityId, ActivityWithEmission, Category, EmissionFactor, PeriodId, PeriodStatus,
    ReportingPeriod, Scope, SiteId,
};
use ledger_wizard::{ActivityWizard, EntryField};
use proptest::prelude::*;
use uuid::Uuid;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn factor(key: &str, unit: &str, co2e_factor: f64) -> EmissionFactor {
    EmissionFactor {
        activity_key: key.to_string(),
        activity_unit: unit.to_string(),
        co2e_factor,
        source: "DEFRA 2024".to_string(),
        display_name: key.replace('_', " "),
    }
}

/// A small factor table covering each scope
pub fn sample_factors() -> Vec<EmissionFactor> {
    vec![
        factor("natural_gas", "kWh", 0.18293),
        factor("diesel", "L", 2.51279),
        factor("refrigerant_r410a", "kg", 2088.0),
        factor("electricity_grid", "kWh", 0.20707),
        factor("district_heating", "kWh", 0.17965),
        factor("flight_long_haul", "passenger.km", 0.19085),
        factor("hotel_night", "night", 10.4),
        factor("waste_landfill", "tonne", 446.2),
    ]
}

/// Builder for [`ActivityWithEmission`] records
#[derive(Debug, Clone)]
pub struct ActivityBuilder {
    activity: ActivityWithEmission,
}

impl ActivityBuilder {
    pub fn new(category: impl Into<Category>) -> Self {
        let category = category.into();
        let scope = category.scope().unwrap_or(Scope::Scope3);
        Self {
            activity: ActivityWithEmission {
                id: ActivityId::new(),
                scope,
                category_code: category,
                site_id: None,
                site_name: None,
                activity_key: "generic".to_string(),
                description: "fixture".to_string(),
                quantity: 1.0,
                unit: "unit".to_string(),
                activity_date: date(2025, 1, 15),
                co2e_kg: 0.0,
                factor_source: Some("DEFRA 2024".to_string()),
            },
        }
    }

    #[must_use]
    pub fn co2e(mut self, kg: f64) -> Self {
        self.activity.co2e_kg = kg;
        self
    }

    #[must_use]
    pub fn site(mut self, id: SiteId, name: &str) -> Self {
        self.activity.site_id = Some(id);
        self.activity.site_name = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn on(mut self, day: NaiveDate) -> Self {
        self.activity.activity_date = day;
        self
    }

    #[must_use]
    pub fn quantity(mut self, quantity: f64, unit: &str) -> Self {
        self.activity.quantity = quantity;
        self.activity.unit = unit.to_string();
        self
    }

    #[must_use]
    pub fn key(mut self, key: &str) -> Self {
        self.activity.activity_key = key.to_string();
        self
    }

    pub fn build(self) -> ActivityWithEmission {
        self.activity
    }
}

/// Shortcut for an unassigned activity with the given category and CO2e
pub fn activity(code: &str, co2e_kg: f64) -> ActivityWithEmission {
    ActivityBuilder::new(code).co2e(co2e_kg).build()
}

pub fn sample_period(status: PeriodStatus) -> ReportingPeriod {
    ReportingPeriod {
        id: PeriodId::new(),
        name: "FY2025".to_string(),
        start_date: date(2025, 1, 1),
        end_date: date(2025, 12, 31),
        status,
    }
}

pub fn sample_session(token: &str) -> AuthSession {
    AuthSession {
        token: token.to_string(),
        user: User {
            id: Uuid::new_v4(),
            email: "analyst@acme.test".to_string(),
            full_name: Some("Acme Analyst".to_string()),
            role: Some("editor".to_string()),
        },
        organization: Organization {
            id: Uuid::new_v4(),
            name: "Acme Manufacturing".to_string(),
            country: Some("DE".to_string()),
            subscription_plan: Some("professional".to_string()),
        },
    }
}

/// Wizard holding `count` complete Scope 1 fuel entries
pub fn filled_wizard(count: usize) -> ActivityWizard {
    let diesel = factor("diesel", "L", 2.5);
    let mut wizard = ActivityWizard::new();
    for i in 0..count {
        wizard.set_scope(Scope::Scope1);
        wizard.set_category(Category::MobileCombustion).unwrap();
        wizard.set_activity("diesel", Some(&diesel)).unwrap();
        wizard
            .set_entry_field(EntryField::Description(format!("Fleet refuel {i}")))
            .unwrap();
        wizard
            .set_entry_field(EntryField::Quantity(100.0 * (i + 1) as f64))
            .unwrap();
        wizard
            .set_entry_field(EntryField::ActivityDate(date(2025, 3, 1)))
            .unwrap();
        assert!(wizard.add_entry(), "fixture entry {i} incomplete");
    }
    wizard
}

/// Any known category
pub fn arb_category() -> impl Strategy<Value = Category> {
    proptest::sample::select(Category::KNOWN.to_vec())
}

/// Activities spread over a few sites, months and categories
pub fn arb_activity() -> impl Strategy<Value = ActivityWithEmission> {
    let sites = vec![
        None,
        Some((SiteId(Uuid::from_u128(1)), "Berlin")),
        Some((SiteId(Uuid::from_u128(2)), "Lyon")),
        Some((SiteId(Uuid::from_u128(3)), "Austin")),
    ];
    (
        arb_category(),
        proptest::sample::select(sites),
        0.0f64..10_000.0,
        1u32..=12,
        1u32..=28,
    )
        .prop_map(|(category, site, co2e, month, day)| {
            let mut builder = ActivityBuilder::new(category)
                .co2e(co2e)
                .on(date(2025, month, day));
            if let Some((id, name)) = site {
                builder = builder.site(id, name);
            }
            builder.build()
        })
}

pub fn arb_activities(max: usize) -> impl Strategy<Value = Vec<ActivityWithEmission>> {
    proptest::collection::vec(arb_activity(), 0..=max)
}
