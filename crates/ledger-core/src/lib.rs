//! Ledger Core - shared carbon-accounting domain
//!
//! Provides the pieces every other Ledger crate builds on:
//! - GHG Protocol scopes and categories with explicit unknown-code fallback
//! - Spend-based emission estimates with a fixed currency table
//! - Reporting-period workflow validation
//! - Client configuration
//!
//! # Example
//!
//! ```rust
//! use ledger_core::currency::calculate_spend_emissions;
//!
//! let estimate = calculate_spend_emissions(100.0, "USD", 0.5);
//! assert_eq!(estimate.co2e, 50.0);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod currency;
pub mod error;
pub mod state_machine;
pub mod types;

pub use config::{ApiConfig, AuthConfig, LedgerConfig};
pub use currency::{calculate_spend_emissions, convert_to_usd, usd_rate, Currency, SpendEmissions};
pub use error::{ConfigError, CoreError, StateMachineError};
pub use types::{
    ActivityId, ActivityWithEmission, Category, EmissionFactor, PeriodId, PeriodStatus,
    ReportingPeriod, Scope, SiteId,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Ledger Core
    pub use crate::{
        ActivityWithEmission, Category, Currency, EmissionFactor, LedgerConfig, PeriodStatus,
        Scope,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
