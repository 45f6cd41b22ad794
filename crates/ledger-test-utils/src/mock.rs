//! In-memory [`LedgerApi`] for tests

use chrono::Utc;
use dashmap::DashMap;
use ledger_client::{
    ApiError, ApiResult, AuditLogEntry, AuditLogQuery, AuthSession, BillingSession,
    CbamInstallation, DecarbonizationTarget, FactorQuery, InviteRequest, LedgerApi, NewPeriod,
    NewSite, NewTarget, Organization, RegisterRequest, ReportSummary, Site,
};
use ledger_core::{
    state_machine, ActivityId, ActivityWithEmission, EmissionFactor, PeriodId, PeriodStatus,
    ReportingPeriod, Scope, SiteId,
};
use ledger_wizard::WizardEntry;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::fixtures::{sample_factors, sample_session};

/// Password the mock accepts for every account
pub const MOCK_PASSWORD: &str = "correct horse";

/// Backend double holding everything in memory
///
/// Emissions are computed from the mock's own factor table, so results can
/// differ from the wizard's preview just like a real backend.
#[derive(Debug)]
pub struct MockLedgerApi {
    session: AuthSession,
    factors: Vec<EmissionFactor>,
    sites: DashMap<SiteId, Site>,
    periods: DashMap<PeriodId, ReportingPeriod>,
    activities: DashMap<PeriodId, Vec<ActivityWithEmission>>,
    targets: DashMap<Uuid, DecarbonizationTarget>,
    audit: Mutex<Vec<AuditLogEntry>>,
    calls: Mutex<Vec<&'static str>>,
    fail_next: Mutex<Option<ApiError>>,
}

impl Default for MockLedgerApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedgerApi {
    pub fn new() -> Self {
        Self {
            session: sample_session("mock-token"),
            factors: sample_factors(),
            sites: DashMap::new(),
            periods: DashMap::new(),
            activities: DashMap::new(),
            targets: DashMap::new(),
            audit: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_factors(mut self, factors: Vec<EmissionFactor>) -> Self {
        self.factors = factors;
        self
    }

    /// Register a period directly, bypassing the API
    pub fn insert_period(&self, period: ReportingPeriod) -> PeriodId {
        let id = period.id;
        self.periods.insert(id, period);
        id
    }

    pub fn insert_site(&self, name: &str) -> SiteId {
        let id = SiteId::new();
        self.sites.insert(
            id,
            Site {
                id,
                name: name.to_string(),
                country: None,
                address: None,
            },
        );
        id
    }

    /// Make the next call fail with `err`
    pub fn fail_next(&self, err: ApiError) {
        *self.fail_next.lock() = Some(err);
    }

    /// Names of the trait methods invoked so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn stored_activities(&self, period: PeriodId) -> Vec<ActivityWithEmission> {
        self.activities
            .get(&period)
            .map(|a| a.value().clone())
            .unwrap_or_default()
    }

    fn enter(&self, name: &'static str) -> ApiResult<()> {
        self.calls.lock().push(name);
        match self.fail_next.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found(what: &str) -> ApiError {
        ApiError::Status {
            status: 404,
            message: format!("{what} not found"),
        }
    }

    fn audit(&self, action: &str, entity_type: &str, entity_id: String) {
        self.audit.lock().push(AuditLogEntry {
            id: Uuid::new_v4(),
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: Some(entity_id),
            user_email: Some(self.session.user.email.clone()),
            created_at: Utc::now(),
        });
    }

    fn editable_period(&self, period: PeriodId) -> ApiResult<()> {
        let status = self
            .periods
            .get(&period)
            .map(|p| p.status)
            .ok_or_else(|| Self::not_found("reporting period"))?;
        if status.accepts_edits() {
            Ok(())
        } else {
            Err(ApiError::PeriodClosed(status))
        }
    }

    fn compute(&self, entry: &WizardEntry) -> ActivityWithEmission {
        let (factor, source) = self
            .factors
            .iter()
            .find(|f| f.activity_key == entry.activity_key)
            .map(|f| (f.co2e_factor, Some(f.source.clone())))
            .unwrap_or((
                entry.co2e_factor.unwrap_or(0.0),
                entry.factor_source.clone(),
            ));
        let site_name = entry
            .site_id
            .and_then(|id| self.sites.get(&id).map(|s| s.name.clone()));
        ActivityWithEmission {
            id: ActivityId::new(),
            scope: entry.scope,
            category_code: entry.category_code.clone(),
            site_id: entry.site_id,
            site_name,
            activity_key: entry.activity_key.clone(),
            description: entry.description.clone(),
            quantity: entry.quantity,
            unit: entry.unit.clone(),
            activity_date: entry.activity_date,
            co2e_kg: entry.quantity * factor,
            factor_source: source,
        }
    }
}

#[async_trait::async_trait]
impl LedgerApi for MockLedgerApi {
    async fn login(&self, email: &str, password: &str) -> ApiResult<AuthSession> {
        self.enter("login")?;
        if password != MOCK_PASSWORD {
            return Err(ApiError::Unauthorized);
        }
        let mut session = self.session.clone();
        session.user.email = email.to_string();
        Ok(session)
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthSession> {
        self.enter("register")?;
        let mut session = self.session.clone();
        session.user.email = request.email.clone();
        session.user.full_name = Some(request.full_name.clone());
        session.organization.name = request.organization_name.clone();
        session.organization.country = request.country.clone();
        Ok(session)
    }

    async fn invite_user(&self, request: &InviteRequest) -> ApiResult<()> {
        self.enter("invite_user")?;
        self.audit("invite", "user", request.email.clone());
        Ok(())
    }

    async fn accept_invitation(&self, token: &str, password: &str) -> ApiResult<AuthSession> {
        self.enter("accept_invitation")?;
        if token.is_empty() || password.is_empty() {
            return Err(ApiError::Status {
                status: 400,
                message: "Invalid invitation".to_string(),
            });
        }
        Ok(self.session.clone())
    }

    async fn request_password_reset(&self, _email: &str) -> ApiResult<()> {
        self.enter("request_password_reset")
    }

    async fn current_organization(&self) -> ApiResult<Organization> {
        self.enter("current_organization")?;
        Ok(self.session.organization.clone())
    }

    async fn list_sites(&self) -> ApiResult<Vec<Site>> {
        self.enter("list_sites")?;
        let mut sites: Vec<Site> = self.sites.iter().map(|s| s.value().clone()).collect();
        sites.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sites)
    }

    async fn create_site(&self, site: &NewSite) -> ApiResult<Site> {
        self.enter("create_site")?;
        let created = Site {
            id: SiteId::new(),
            name: site.name.clone(),
            country: site.country.clone(),
            address: site.address.clone(),
        };
        self.sites.insert(created.id, created.clone());
        self.audit("create", "site", created.id.to_string());
        Ok(created)
    }

    async fn list_periods(&self) -> ApiResult<Vec<ReportingPeriod>> {
        self.enter("list_periods")?;
        let mut periods: Vec<ReportingPeriod> =
            self.periods.iter().map(|p| p.value().clone()).collect();
        periods.sort_by_key(|p| std::cmp::Reverse(p.start_date));
        Ok(periods)
    }

    async fn create_period(&self, period: &NewPeriod) -> ApiResult<ReportingPeriod> {
        self.enter("create_period")?;
        if period.end_date < period.start_date {
            return Err(ApiError::Status {
                status: 422,
                message: "end_date precedes start_date".to_string(),
            });
        }
        let created = ReportingPeriod {
            id: PeriodId::new(),
            name: period.name.clone(),
            start_date: period.start_date,
            end_date: period.end_date,
            status: PeriodStatus::Draft,
        };
        self.periods.insert(created.id, created.clone());
        self.audit("create", "reporting_period", created.id.to_string());
        Ok(created)
    }

    async fn transition_period(
        &self,
        period: &ReportingPeriod,
        to: PeriodStatus,
    ) -> ApiResult<ReportingPeriod> {
        self.enter("transition_period")?;
        let mut stored = self
            .periods
            .get_mut(&period.id)
            .ok_or_else(|| Self::not_found("reporting period"))?;
        state_machine::validate_transition(stored.status, to)?;
        stored.status = to;
        let updated = stored.value().clone();
        drop(stored);
        self.audit(to.as_str(), "reporting_period", updated.id.to_string());
        Ok(updated)
    }

    async fn list_activities(&self, period: PeriodId) -> ApiResult<Vec<ActivityWithEmission>> {
        self.enter("list_activities")?;
        if !self.periods.contains_key(&period) {
            return Err(Self::not_found("reporting period"));
        }
        Ok(self.stored_activities(period))
    }

    async fn create_activity(
        &self,
        period: PeriodId,
        entry: &WizardEntry,
    ) -> ApiResult<ActivityWithEmission> {
        self.enter("create_activity")?;
        self.editable_period(period)?;
        let created = self.compute(entry);
        self.activities
            .entry(period)
            .or_default()
            .push(created.clone());
        self.audit("create", "activity", created.id.to_string());
        Ok(created)
    }

    async fn bulk_create_activities(
        &self,
        period: PeriodId,
        entries: &[WizardEntry],
    ) -> ApiResult<Vec<ActivityWithEmission>> {
        self.enter("bulk_create_activities")?;
        self.editable_period(period)?;
        let created: Vec<ActivityWithEmission> = entries.iter().map(|e| self.compute(e)).collect();
        self.activities
            .entry(period)
            .or_default()
            .extend(created.iter().cloned());
        self.audit("bulk_create", "activity", format!("{} records", created.len()));
        Ok(created)
    }

    async fn delete_activity(&self, id: ActivityId) -> ApiResult<()> {
        self.enter("delete_activity")?;
        let period = self
            .activities
            .iter()
            .find(|entry| entry.value().iter().any(|a| a.id == id))
            .map(|entry| *entry.key())
            .ok_or_else(|| Self::not_found("activity"))?;
        self.editable_period(period)?;
        if let Some(mut list) = self.activities.get_mut(&period) {
            list.retain(|a| a.id != id);
        }
        self.audit("delete", "activity", id.to_string());
        Ok(())
    }

    async fn search_factors(&self, query: &FactorQuery) -> ApiResult<Vec<EmissionFactor>> {
        self.enter("search_factors")?;
        let needle = query.search.as_deref().map(str::to_lowercase);
        Ok(self
            .factors
            .iter()
            .filter(|f| {
                needle.as_deref().map_or(true, |n| {
                    f.activity_key.contains(n) || f.display_name.to_lowercase().contains(n)
                })
            })
            .cloned()
            .collect())
    }

    async fn report_summary(&self, period: PeriodId) -> ApiResult<ReportSummary> {
        self.enter("report_summary")?;
        if !self.periods.contains_key(&period) {
            return Err(Self::not_found("reporting period"));
        }
        let activities = self.stored_activities(period);
        let scope_total = |scope: Scope| -> f64 {
            activities
                .iter()
                .filter(|a| a.scope == scope)
                .map(|a| a.co2e_kg)
                .sum()
        };
        Ok(ReportSummary {
            period_id: period,
            total_co2e_kg: activities.iter().map(|a| a.co2e_kg).sum(),
            scope1_co2e_kg: scope_total(Scope::Scope1),
            scope2_co2e_kg: scope_total(Scope::Scope2),
            scope3_co2e_kg: scope_total(Scope::Scope3),
            activity_count: activities.len(),
        })
    }

    async fn list_targets(&self) -> ApiResult<Vec<DecarbonizationTarget>> {
        self.enter("list_targets")?;
        let mut targets: Vec<_> = self.targets.iter().map(|t| t.value().clone()).collect();
        targets.sort_by_key(|t| t.target_year);
        Ok(targets)
    }

    async fn create_target(&self, target: &NewTarget) -> ApiResult<DecarbonizationTarget> {
        self.enter("create_target")?;
        if target.target_year <= target.base_year {
            return Err(ApiError::Status {
                status: 422,
                message: "target_year must follow base_year".to_string(),
            });
        }
        let created = DecarbonizationTarget {
            id: Uuid::new_v4(),
            name: target.name.clone(),
            base_year: target.base_year,
            target_year: target.target_year,
            reduction_percent: target.reduction_percent,
            scopes: target.scopes.clone(),
        };
        self.targets.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_cbam_installations(&self) -> ApiResult<Vec<CbamInstallation>> {
        self.enter("list_cbam_installations")?;
        Ok(Vec::new())
    }

    async fn create_checkout_session(&self, plan: &str) -> ApiResult<BillingSession> {
        self.enter("create_checkout_session")?;
        Ok(BillingSession {
            url: format!("https://billing.test/checkout/{plan}"),
        })
    }

    async fn create_portal_session(&self) -> ApiResult<BillingSession> {
        self.enter("create_portal_session")?;
        Ok(BillingSession {
            url: "https://billing.test/portal".to_string(),
        })
    }

    async fn list_audit_log(&self, query: &AuditLogQuery) -> ApiResult<Vec<AuditLogEntry>> {
        self.enter("list_audit_log")?;
        let page = query.page.max(1) as usize;
        let size = query.page_size as usize;
        Ok(self
            .audit
            .lock()
            .iter()
            .rev()
            .filter(|e| {
                query
                    .entity_type
                    .as_deref()
                    .map_or(true, |t| e.entity_type == t)
            })
            .skip((page - 1) * size)
            .take(size)
            .cloned()
            .collect())
    }
}
