//! Ledger Client - backend access for Carbon Ledger
//!
//! - [`LedgerApi`]: the REST surface as an async trait
//! - [`HttpLedgerApi`]: `reqwest` implementation with bearer auth and a
//!   single retry on transport failure
//! - [`AuthStore`]: session persisted as JSON, cleared on HTTP 401
//! - [`submit_entries`]: hands the wizard buffer to the bulk endpoint
//!
//! # Example
//!
//! ```rust,no_run
//! use ledger_client::{AuthStore, HttpLedgerApi, LedgerApi};
//! use ledger_core::LedgerConfig;
//!
//! # async fn run() -> Result<(), ledger_client::ApiError> {
//! let config = LedgerConfig::default();
//! let auth = AuthStore::load(&config.auth.store_path).shared();
//! let api = HttpLedgerApi::new(&config.api, auth)?;
//! let session = api.login("ops@example.com", "secret").await?;
//! println!("signed in to {}", session.organization.name);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod api;
pub mod auth;
pub mod dto;
pub mod error;
pub mod http;
pub mod submit;

pub use api::LedgerApi;
pub use auth::AuthStore;
pub use dto::{
    AuditLogEntry, AuditLogQuery, AuthSession, BillingSession, CbamInstallation,
    DecarbonizationTarget, FactorQuery, InviteRequest, NewPeriod, NewSite, NewTarget,
    Organization, RegisterRequest, ReportSummary, Site, User,
};
pub use error::{ApiError, ApiResult, StoreError};
pub use http::HttpLedgerApi;
pub use submit::submit_entries;
