//! Backend surface consumed by the client

use ledger_core::{
    ActivityId, ActivityWithEmission, EmissionFactor, PeriodId, PeriodStatus, ReportingPeriod,
};
use ledger_wizard::WizardEntry;

use crate::dto::{
    AuditLogEntry, AuditLogQuery, AuthSession, BillingSession, CbamInstallation,
    DecarbonizationTarget, FactorQuery, InviteRequest, NewPeriod, NewSite, NewTarget,
    Organization, RegisterRequest, ReportSummary, Site,
};
use crate::error::ApiResult;

/// Carbon Ledger REST API
///
/// Implemented over HTTP by [`HttpLedgerApi`](crate::HttpLedgerApi) and in
/// memory by the test utilities. Every call is a single request/response;
/// callers decide how to surface failures.
#[async_trait::async_trait]
pub trait LedgerApi: Send + Sync {
    // Authentication

    async fn login(&self, email: &str, password: &str) -> ApiResult<AuthSession>;

    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthSession>;

    async fn invite_user(&self, request: &InviteRequest) -> ApiResult<()>;

    async fn accept_invitation(&self, token: &str, password: &str) -> ApiResult<AuthSession>;

    async fn request_password_reset(&self, email: &str) -> ApiResult<()>;

    // Organization and sites

    async fn current_organization(&self) -> ApiResult<Organization>;

    async fn list_sites(&self) -> ApiResult<Vec<Site>>;

    async fn create_site(&self, site: &NewSite) -> ApiResult<Site>;

    // Reporting periods

    async fn list_periods(&self) -> ApiResult<Vec<ReportingPeriod>>;

    async fn create_period(&self, period: &NewPeriod) -> ApiResult<ReportingPeriod>;

    /// Move a period along the review workflow
    ///
    /// # Errors
    /// `ApiError::Workflow` when the transition is not allowed from the
    /// period's current status; no request is sent in that case.
    async fn transition_period(
        &self,
        period: &ReportingPeriod,
        to: PeriodStatus,
    ) -> ApiResult<ReportingPeriod>;

    // Activities

    async fn list_activities(&self, period: PeriodId) -> ApiResult<Vec<ActivityWithEmission>>;

    async fn create_activity(
        &self,
        period: PeriodId,
        entry: &WizardEntry,
    ) -> ApiResult<ActivityWithEmission>;

    /// Create many activities in one request; the backend computes CO2e
    async fn bulk_create_activities(
        &self,
        period: PeriodId,
        entries: &[WizardEntry],
    ) -> ApiResult<Vec<ActivityWithEmission>>;

    async fn delete_activity(&self, id: ActivityId) -> ApiResult<()>;

    // Reference data and reports

    async fn search_factors(&self, query: &FactorQuery) -> ApiResult<Vec<EmissionFactor>>;

    async fn report_summary(&self, period: PeriodId) -> ApiResult<ReportSummary>;

    async fn list_targets(&self) -> ApiResult<Vec<DecarbonizationTarget>>;

    async fn create_target(&self, target: &NewTarget) -> ApiResult<DecarbonizationTarget>;

    async fn list_cbam_installations(&self) -> ApiResult<Vec<CbamInstallation>>;

    // Billing

    async fn create_checkout_session(&self, plan: &str) -> ApiResult<BillingSession>;

    async fn create_portal_session(&self) -> ApiResult<BillingSession>;

    // Audit

    async fn list_audit_log(&self, query: &AuditLogQuery) -> ApiResult<Vec<AuditLogEntry>>;
}
