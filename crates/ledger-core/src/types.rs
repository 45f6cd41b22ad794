//! Core domain types
//!
//! Defines the fundamental types shared by every Ledger crate:
//! - GHG Protocol scopes and categories
//! - Emission factors as returned by the factor search
//! - Activity records with backend-computed emissions
//! - Reporting periods and their workflow status

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Backend identifier of an activity record
    ActivityId
);
uuid_id!(
    /// Backend identifier of an organization site
    SiteId
);
uuid_id!(
    /// Backend identifier of a reporting period
    PeriodId
);

/// GHG Protocol scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Scope {
    /// Direct emissions from owned or controlled sources
    Scope1,
    /// Indirect emissions from purchased energy
    Scope2,
    /// Other indirect value-chain emissions
    Scope3,
}

impl Scope {
    /// All scopes in reporting order
    pub const ALL: [Scope; 3] = [Scope::Scope1, Scope::Scope2, Scope::Scope3];

    /// Numeric value (1, 2 or 3)
    #[inline]
    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            Scope::Scope1 => 1,
            Scope::Scope2 => 2,
            Scope::Scope3 => 3,
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Scope::Scope1 => "Scope 1 - Direct emissions",
            Scope::Scope2 => "Scope 2 - Purchased energy",
            Scope::Scope3 => "Scope 3 - Value chain",
        }
    }
}

impl TryFrom<u8> for Scope {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Scope::Scope1),
            2 => Ok(Scope::Scope2),
            3 => Ok(Scope::Scope3),
            other => Err(CoreError::InvalidScope(other.to_string())),
        }
    }
}

impl From<Scope> for u8 {
    fn from(scope: Scope) -> Self {
        scope.value()
    }
}

impl FromStr for Scope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("scope")
            .or_else(|| trimmed.strip_prefix("Scope"))
            .unwrap_or(trimmed)
            .trim_start_matches(&['_', ' ', '-'][..]);
        digits
            .parse::<u8>()
            .map_err(|_| CoreError::InvalidScope(s.to_string()))
            .and_then(Scope::try_from)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope {}", self.value())
    }
}

/// GHG Protocol emission category
///
/// Known codes are closed variants; anything else is kept verbatim in
/// [`Category::Unknown`] so lookups degrade to an explicit branch instead of
/// a missing key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    StationaryCombustion,
    MobileCombustion,
    FugitiveEmissions,
    ProcessEmissions,
    PurchasedElectricity,
    PurchasedHeatSteam,
    PurchasedCooling,
    PurchasedGoodsServices,
    CapitalGoods,
    FuelEnergyActivities,
    UpstreamTransportation,
    WasteGenerated,
    BusinessTravel,
    EmployeeCommuting,
    UpstreamLeasedAssets,
    DownstreamTransportation,
    ProcessingOfSoldProducts,
    UseOfSoldProducts,
    EndOfLifeTreatment,
    DownstreamLeasedAssets,
    Franchises,
    Investments,
    /// Code not in the catalogue
    Unknown(String),
}

impl Category {
    /// Every known category in catalogue order
    pub const KNOWN: [Category; 22] = [
        Category::StationaryCombustion,
        Category::MobileCombustion,
        Category::FugitiveEmissions,
        Category::ProcessEmissions,
        Category::PurchasedElectricity,
        Category::PurchasedHeatSteam,
        Category::PurchasedCooling,
        Category::PurchasedGoodsServices,
        Category::CapitalGoods,
        Category::FuelEnergyActivities,
        Category::UpstreamTransportation,
        Category::WasteGenerated,
        Category::BusinessTravel,
        Category::EmployeeCommuting,
        Category::UpstreamLeasedAssets,
        Category::DownstreamTransportation,
        Category::ProcessingOfSoldProducts,
        Category::UseOfSoldProducts,
        Category::EndOfLifeTreatment,
        Category::DownstreamLeasedAssets,
        Category::Franchises,
        Category::Investments,
    ];

    /// Parse a category code, falling back to [`Category::Unknown`]
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        Self::KNOWN
            .iter()
            .find(|c| c.code() == code)
            .cloned()
            .unwrap_or_else(|| Category::Unknown(code.to_string()))
    }

    /// Dotted category code, e.g. `"3.1"`
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Category::StationaryCombustion => "1.1",
            Category::MobileCombustion => "1.2",
            Category::FugitiveEmissions => "1.3",
            Category::ProcessEmissions => "1.4",
            Category::PurchasedElectricity => "2.1",
            Category::PurchasedHeatSteam => "2.2",
            Category::PurchasedCooling => "2.3",
            Category::PurchasedGoodsServices => "3.1",
            Category::CapitalGoods => "3.2",
            Category::FuelEnergyActivities => "3.3",
            Category::UpstreamTransportation => "3.4",
            Category::WasteGenerated => "3.5",
            Category::BusinessTravel => "3.6",
            Category::EmployeeCommuting => "3.7",
            Category::UpstreamLeasedAssets => "3.8",
            Category::DownstreamTransportation => "3.9",
            Category::ProcessingOfSoldProducts => "3.10",
            Category::UseOfSoldProducts => "3.11",
            Category::EndOfLifeTreatment => "3.12",
            Category::DownstreamLeasedAssets => "3.13",
            Category::Franchises => "3.14",
            Category::Investments => "3.15",
            Category::Unknown(code) => code,
        }
    }

    /// Display name for charts and tables
    #[must_use]
    pub fn display_name(&self) -> Cow<'static, str> {
        let name = match self {
            Category::StationaryCombustion => "Stationary combustion",
            Category::MobileCombustion => "Mobile combustion",
            Category::FugitiveEmissions => "Fugitive emissions",
            Category::ProcessEmissions => "Process emissions",
            Category::PurchasedElectricity => "Purchased electricity",
            Category::PurchasedHeatSteam => "Purchased heat and steam",
            Category::PurchasedCooling => "Purchased cooling",
            Category::PurchasedGoodsServices => "Purchased goods and services",
            Category::CapitalGoods => "Capital goods",
            Category::FuelEnergyActivities => "Fuel- and energy-related activities",
            Category::UpstreamTransportation => "Upstream transportation and distribution",
            Category::WasteGenerated => "Waste generated in operations",
            Category::BusinessTravel => "Business travel",
            Category::EmployeeCommuting => "Employee commuting",
            Category::UpstreamLeasedAssets => "Upstream leased assets",
            Category::DownstreamTransportation => "Downstream transportation and distribution",
            Category::ProcessingOfSoldProducts => "Processing of sold products",
            Category::UseOfSoldProducts => "Use of sold products",
            Category::EndOfLifeTreatment => "End-of-life treatment of sold products",
            Category::DownstreamLeasedAssets => "Downstream leased assets",
            Category::Franchises => "Franchises",
            Category::Investments => "Investments",
            Category::Unknown(code) => {
                return Cow::Owned(format!("Unknown category ({code})"));
            }
        };
        Cow::Borrowed(name)
    }

    /// Scope this category reports under
    ///
    /// Unknown codes are attributed by their leading digit when it names a
    /// valid scope.
    #[must_use]
    pub fn scope(&self) -> Option<Scope> {
        let code = self.code();
        let major = code.split('.').next().unwrap_or(code);
        major.parse::<u8>().ok().and_then(|n| Scope::try_from(n).ok())
    }

    /// Categories with their own entry sub-forms (no activity picker)
    #[inline]
    #[must_use]
    pub fn is_specialized(&self) -> bool {
        matches!(
            self,
            Category::PurchasedGoodsServices | Category::CapitalGoods
        )
    }

    /// Well-to-tank emissions derived by the backend from Scope 1/2 data
    #[inline]
    #[must_use]
    pub fn is_backend_calculated(&self) -> bool {
        matches!(self, Category::FuelEnergyActivities)
    }

    /// Whether the code is outside the catalogue
    #[inline]
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Category::Unknown(_))
    }

    /// Known categories belonging to `scope`
    pub fn for_scope(scope: Scope) -> impl Iterator<Item = Category> {
        Self::KNOWN
            .into_iter()
            .filter(move |c| c.scope() == Some(scope))
    }
}

impl From<String> for Category {
    fn from(code: String) -> Self {
        Category::from_code(&code)
    }
}

impl From<&str> for Category {
    fn from(code: &str) -> Self {
        Category::from_code(code)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Unknown(code) => code,
            known => known.code().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Emission factor returned by the factor search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    /// Activity key the factor applies to
    pub activity_key: String,
    /// Unit the activity quantity is measured in
    pub activity_unit: String,
    /// kg CO2e per activity unit
    pub co2e_factor: f64,
    /// Publishing database, e.g. "DEFRA 2024"
    pub source: String,
    /// Human-readable activity name
    pub display_name: String,
}

/// Activity record with the backend's authoritative emissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityWithEmission {
    pub id: ActivityId,
    pub scope: Scope,
    pub category_code: Category,
    #[serde(default)]
    pub site_id: Option<SiteId>,
    #[serde(default)]
    pub site_name: Option<String>,
    pub activity_key: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub activity_date: NaiveDate,
    /// Emissions in kg CO2e
    pub co2e_kg: f64,
    #[serde(default)]
    pub factor_source: Option<String>,
}

/// Reporting-period workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Data entry open
    Draft,
    /// Internal review
    Review,
    /// Submitted for assurance
    Submitted,
    /// External audit in progress
    Audit,
    /// Audit completed
    Verified,
    /// Frozen, no further edits
    Locked,
}

impl PeriodStatus {
    /// Whether activities may still be added or edited
    #[inline]
    #[must_use]
    pub fn accepts_edits(self) -> bool {
        matches!(self, PeriodStatus::Draft)
    }

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodStatus::Draft => "draft",
            PeriodStatus::Review => "review",
            PeriodStatus::Submitted => "submitted",
            PeriodStatus::Audit => "audit",
            PeriodStatus::Verified => "verified",
            PeriodStatus::Locked => "locked",
        }
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PeriodStatus::Draft),
            "review" => Ok(PeriodStatus::Review),
            "submitted" => Ok(PeriodStatus::Submitted),
            "audit" => Ok(PeriodStatus::Audit),
            "verified" => Ok(PeriodStatus::Verified),
            "locked" => Ok(PeriodStatus::Locked),
            _ => Err(CoreError::InvalidPeriodStatus(s.to_string())),
        }
    }
}

/// Reporting period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub id: PeriodId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PeriodStatus,
}

impl ReportingPeriod {
    /// Whether `date` falls inside the period (inclusive)
    #[inline]
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parses_numeric_and_prefixed() {
        assert_eq!("1".parse::<Scope>().unwrap(), Scope::Scope1);
        assert_eq!("scope2".parse::<Scope>().unwrap(), Scope::Scope2);
        assert_eq!("Scope 3".parse::<Scope>().unwrap(), Scope::Scope3);
        assert!("4".parse::<Scope>().is_err());
        assert!("x".parse::<Scope>().is_err());
    }

    #[test]
    fn scope_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Scope::Scope2).unwrap(), "2");
        let scope: Scope = serde_json::from_str("3").unwrap();
        assert_eq!(scope, Scope::Scope3);
        assert!(serde_json::from_str::<Scope>("0").is_err());
    }

    #[test]
    fn category_known_codes() {
        assert_eq!(Category::from_code("3.1"), Category::PurchasedGoodsServices);
        assert_eq!(Category::from_code(" 3.15 "), Category::Investments);
        assert_eq!(Category::from_code("2.1").scope(), Some(Scope::Scope2));
        assert_eq!(Category::from_code("3.10").code(), "3.10");
    }

    #[test]
    fn category_unknown_fallback() {
        let cat = Category::from_code("3.99");
        assert!(cat.is_unknown());
        assert_eq!(cat.code(), "3.99");
        assert_eq!(cat.scope(), Some(Scope::Scope3));
        assert_eq!(cat.display_name(), "Unknown category (3.99)");

        let cat = Category::from_code("custom");
        assert_eq!(cat.scope(), None);
    }

    #[test]
    fn specialized_categories() {
        assert!(Category::from_code("3.1").is_specialized());
        assert!(Category::from_code("3.2").is_specialized());
        assert!(!Category::from_code("3.3").is_specialized());
        assert!(Category::from_code("3.3").is_backend_calculated());
    }

    #[test]
    fn categories_per_scope() {
        assert_eq!(Category::for_scope(Scope::Scope1).count(), 4);
        assert_eq!(Category::for_scope(Scope::Scope2).count(), 3);
        assert_eq!(Category::for_scope(Scope::Scope3).count(), 15);
    }

    #[test]
    fn category_serde_uses_code() {
        let json = serde_json::to_string(&Category::BusinessTravel).unwrap();
        assert_eq!(json, "\"3.6\"");
        let back: Category = serde_json::from_str("\"9.9\"").unwrap();
        assert_eq!(back, Category::Unknown("9.9".to_string()));
    }

    #[test]
    fn period_status_round_trip_names() {
        for status in [
            PeriodStatus::Draft,
            PeriodStatus::Review,
            PeriodStatus::Submitted,
            PeriodStatus::Audit,
            PeriodStatus::Verified,
            PeriodStatus::Locked,
        ] {
            assert_eq!(status.as_str().parse::<PeriodStatus>().unwrap(), status);
        }
        assert!("archived".parse::<PeriodStatus>().is_err());
    }

    #[test]
    fn period_contains_is_inclusive() {
        let period = ReportingPeriod {
            id: PeriodId::new(),
            name: "FY2025".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            status: PeriodStatus::Draft,
        };
        assert!(period.contains(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }
}
