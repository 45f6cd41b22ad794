//! reqwest-backed [`LedgerApi`]

use std::sync::Arc;
use std::time::Duration;

use ledger_core::{
    state_machine, ActivityId, ActivityWithEmission, ApiConfig, EmissionFactor, PeriodId,
    PeriodStatus, ReportingPeriod,
};
use ledger_wizard::WizardEntry;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::api::LedgerApi;
use crate::auth::AuthStore;
use crate::dto::{
    AcceptInvitationRequest, AuditLogEntry, AuditLogQuery, AuthSession, BillingSession,
    BulkCreate, CbamInstallation, CheckoutRequest, DecarbonizationTarget, ErrorBody, FactorQuery,
    InviteRequest, LoginRequest, NewPeriod, NewSite, NewTarget, Organization,
    PasswordResetRequest, RegisterRequest, ReportSummary, Site, StatusChange,
};
use crate::error::{ApiError, ApiResult};

const RETRY_DELAY: Duration = Duration::from_millis(250);

/// JSON-over-HTTP client
#[derive(Debug, Clone)]
pub struct HttpLedgerApi {
    client: reqwest::Client,
    base_url: String,
    retries: u32,
    auth: Arc<AuthStore>,
}

impl HttpLedgerApi {
    /// Build a client from API settings
    ///
    /// # Errors
    /// `ApiError::Transport` if the TLS backend cannot be initialised.
    pub fn new(config: &ApiConfig, auth: Arc<AuthStore>) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("carbon-ledger/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retries: config.retries,
            auth,
        })
    }

    /// Shared session store
    #[must_use]
    pub fn auth(&self) -> &Arc<AuthStore> {
        &self.auth
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Send once, retrying transport failures up to `retries` times
    ///
    /// Only idempotent methods are resent. A POST that dropped its
    /// connection may already have been applied by the backend.
    async fn execute<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> ApiResult<Response>
    where
        Q: Serialize + Sync + ?Sized,
        B: Serialize + Sync + ?Sized,
    {
        let url = self.url(path);
        let mut attempt = 0;
        loop {
            let mut request = self.client.request(method.clone(), &url);
            if let Some(token) = self.auth.token() {
                request = request.bearer_auth(token);
            }
            if let Some(query) = query {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!(%method, %url, attempt, "sending request");
            match request.send().await {
                Ok(response) => return self.check(response).await,
                Err(err) => {
                    let err = ApiError::from(err);
                    if err.is_retryable() && is_idempotent(&method) && attempt < self.retries {
                        attempt += 1;
                        warn!(%method, %url, error = %err, "transport failure, retrying");
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Map non-success statuses to errors
    async fn check(&self, response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            warn!("backend rejected session token");
            if let Err(err) = self.auth.invalidate() {
                error!(error = %err, "failed to clear session store");
            }
            return Err(ApiError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self
            .execute::<(), ()>(Method::GET, path, None, None)
            .await?;
        Ok(response.json().await?)
    }

    async fn get_with<Q, T>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        Q: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute::<Q, ()>(Method::GET, path, Some(query), None)
            .await?;
        Ok(response.json().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute::<(), B>(method, path, None, Some(body))
            .await?;
        Ok(response.json().await?)
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self
            .execute::<(), ()>(Method::POST, path, None, None)
            .await?;
        Ok(response.json().await?)
    }

    /// Persist a freshly issued session
    fn remember(&self, session: AuthSession) -> ApiResult<AuthSession> {
        self.auth.set_session(session.clone())?;
        Ok(session)
    }
}

/// Join a base URL and an absolute path without doubling slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Extract a human-readable message from an error response body
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait::async_trait]
impl LedgerApi for HttpLedgerApi {
    async fn login(&self, email: &str, password: &str) -> ApiResult<AuthSession> {
        let session = self
            .send_json(Method::POST, "/auth/login", &LoginRequest { email, password })
            .await?;
        self.remember(session)
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthSession> {
        let session = self
            .send_json(Method::POST, "/auth/register", request)
            .await?;
        self.remember(session)
    }

    async fn invite_user(&self, request: &InviteRequest) -> ApiResult<()> {
        self.execute::<(), _>(Method::POST, "/auth/invite", None, Some(request))
            .await?;
        info!(email = %request.email, role = %request.role, "invitation sent");
        Ok(())
    }

    async fn accept_invitation(&self, token: &str, password: &str) -> ApiResult<AuthSession> {
        let session = self
            .send_json(
                Method::POST,
                "/auth/accept-invitation",
                &AcceptInvitationRequest { token, password },
            )
            .await?;
        self.remember(session)
    }

    async fn request_password_reset(&self, email: &str) -> ApiResult<()> {
        self.execute::<(), _>(
            Method::POST,
            "/auth/forgot-password",
            None,
            Some(&PasswordResetRequest { email }),
        )
        .await?;
        Ok(())
    }

    async fn current_organization(&self) -> ApiResult<Organization> {
        self.get("/organizations/current").await
    }

    async fn list_sites(&self) -> ApiResult<Vec<Site>> {
        self.get("/sites").await
    }

    async fn create_site(&self, site: &NewSite) -> ApiResult<Site> {
        self.send_json(Method::POST, "/sites", site).await
    }

    async fn list_periods(&self) -> ApiResult<Vec<ReportingPeriod>> {
        self.get("/reporting-periods").await
    }

    async fn create_period(&self, period: &NewPeriod) -> ApiResult<ReportingPeriod> {
        self.send_json(Method::POST, "/reporting-periods", period)
            .await
    }

    async fn transition_period(
        &self,
        period: &ReportingPeriod,
        to: PeriodStatus,
    ) -> ApiResult<ReportingPeriod> {
        state_machine::validate_transition(period.status, to)?;
        let updated: ReportingPeriod = self
            .send_json(
                Method::POST,
                &format!("/reporting-periods/{}/status", period.id),
                &StatusChange { status: to },
            )
            .await?;
        info!(period = %period.id, from = %period.status, to = %updated.status, "period transitioned");
        Ok(updated)
    }

    async fn list_activities(&self, period: PeriodId) -> ApiResult<Vec<ActivityWithEmission>> {
        self.get(&format!("/reporting-periods/{period}/activities"))
            .await
    }

    async fn create_activity(
        &self,
        period: PeriodId,
        entry: &WizardEntry,
    ) -> ApiResult<ActivityWithEmission> {
        self.send_json(
            Method::POST,
            &format!("/reporting-periods/{period}/activities"),
            entry,
        )
        .await
    }

    async fn bulk_create_activities(
        &self,
        period: PeriodId,
        entries: &[WizardEntry],
    ) -> ApiResult<Vec<ActivityWithEmission>> {
        self.send_json(
            Method::POST,
            &format!("/reporting-periods/{period}/activities/bulk"),
            &BulkCreate { activities: entries },
        )
        .await
    }

    async fn delete_activity(&self, id: ActivityId) -> ApiResult<()> {
        self.execute::<(), ()>(Method::DELETE, &format!("/activities/{id}"), None, None)
            .await?;
        Ok(())
    }

    async fn search_factors(&self, query: &FactorQuery) -> ApiResult<Vec<EmissionFactor>> {
        self.get_with("/emission-factors/search", query).await
    }

    async fn report_summary(&self, period: PeriodId) -> ApiResult<ReportSummary> {
        self.get(&format!("/reports/{period}/summary")).await
    }

    async fn list_targets(&self) -> ApiResult<Vec<DecarbonizationTarget>> {
        self.get("/decarbonization/targets").await
    }

    async fn create_target(&self, target: &NewTarget) -> ApiResult<DecarbonizationTarget> {
        self.send_json(Method::POST, "/decarbonization/targets", target)
            .await
    }

    async fn list_cbam_installations(&self) -> ApiResult<Vec<CbamInstallation>> {
        self.get("/cbam/installations").await
    }

    async fn create_checkout_session(&self, plan: &str) -> ApiResult<BillingSession> {
        self.send_json(Method::POST, "/billing/checkout", &CheckoutRequest { plan })
            .await
    }

    async fn create_portal_session(&self) -> ApiResult<BillingSession> {
        self.post_empty("/billing/portal").await
    }

    async fn list_audit_log(&self, query: &AuditLogQuery) -> ApiResult<Vec<AuditLogEntry>> {
        self.get_with("/audit-logs", query).await
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idempotent_methods_are_resent() {
        assert!(is_idempotent(&Method::GET));
        assert!(is_idempotent(&Method::DELETE));
        assert!(!is_idempotent(&Method::POST));
        assert!(!is_idempotent(&Method::PATCH));
    }

    #[test]
    fn url_joining_normalises_slashes() {
        assert_eq!(join_url("http://h/api/", "/sites"), "http://h/api/sites");
        assert_eq!(join_url("http://h/api", "sites"), "http://h/api/sites");
    }

    #[test]
    fn error_message_prefers_json_body() {
        let msg = error_message(StatusCode::CONFLICT, r#"{"message":"Period is locked"}"#);
        assert_eq!(msg, "Period is locked");
    }

    #[test]
    fn error_message_falls_back_to_text_then_reason() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, " upstream down "), "upstream down");
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/api/".into(),
            ..ApiConfig::default()
        };
        let api = HttpLedgerApi::new(&config, AuthStore::in_memory().shared()).unwrap();
        assert_eq!(api.url("/sites"), "http://localhost:8000/api/sites");
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected_before_sending() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..ApiConfig::default()
        };
        let api = HttpLedgerApi::new(&config, AuthStore::in_memory().shared()).unwrap();
        let period = ReportingPeriod {
            id: PeriodId::new(),
            name: "FY2025".into(),
            start_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            status: PeriodStatus::Draft,
        };
        let err = api
            .transition_period(&period, PeriodStatus::Verified)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Workflow(_)));
    }
}
