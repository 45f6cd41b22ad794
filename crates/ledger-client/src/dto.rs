//! Request and response bodies exchanged with the backend

use chrono::{DateTime, NaiveDate, Utc};
use ledger_core::{PeriodId, PeriodStatus, Scope, SiteId};
use ledger_wizard::WizardEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Tenant the user belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub subscription_plan: Option<String>,
}

/// Token plus the identity it was issued for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
    pub organization: Organization,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
}

/// Self-service sign-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub organization_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Invitation of a colleague into the current organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteRequest {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AcceptInvitationRequest<'a> {
    pub(crate) token: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PasswordResetRequest<'a> {
    pub(crate) email: &'a str,
}

/// Physical location emissions are attributed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSite {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPeriod {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct StatusChange {
    pub(crate) status: PeriodStatus,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BulkCreate<'a> {
    pub(crate) activities: &'a [WizardEntry],
}

/// Emission-factor lookup filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl FactorQuery {
    /// Factors for one category
    #[must_use]
    pub fn for_category(scope: Scope, code: impl Into<String>) -> Self {
        Self {
            scope: Some(scope),
            category_code: Some(code.into()),
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }
}

/// Backend-computed period totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub period_id: PeriodId,
    pub total_co2e_kg: f64,
    pub scope1_co2e_kg: f64,
    pub scope2_co2e_kg: f64,
    pub scope3_co2e_kg: f64,
    #[serde(default)]
    pub activity_count: usize,
}

/// Reduction target against a base year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecarbonizationTarget {
    pub id: Uuid,
    pub name: String,
    pub base_year: i32,
    pub target_year: i32,
    pub reduction_percent: f64,
    #[serde(default)]
    pub scopes: Vec<Scope>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTarget {
    pub name: String,
    pub base_year: i32,
    pub target_year: i32,
    pub reduction_percent: f64,
    #[serde(default)]
    pub scopes: Vec<Scope>,
}

/// Installation registered for CBAM import declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CbamInstallation {
    pub id: Uuid,
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub operator_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CheckoutRequest<'a> {
    pub(crate) plan: &'a str,
}

/// Hosted billing page the user is redirected to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSession {
    pub url: String,
}

/// Audit-trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub action: String,
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Audit-log filter and paging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            entity_type: None,
            page: 1,
            page_size: 50,
        }
    }
}

/// Generic error body returned by the backend
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(alias = "detail", alias = "error")]
    pub(crate) message: String,
}
