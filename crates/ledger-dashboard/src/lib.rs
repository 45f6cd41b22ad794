//! Ledger Dashboard - read-only views over computed activities
//!
//! Stateless grouping, percentage and export helpers. Inputs are the
//! backend's already-computed [`ActivityWithEmission`](ledger_core::ActivityWithEmission)
//! records; nothing here recalculates emissions.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod aggregation;
pub mod export;

pub use aggregation::{
    category_breakdown, group_by, group_by_category, group_by_month, group_by_scope,
    group_by_site, monthly_trend, percentage, scope_breakdown, site_breakdown, summary,
    BreakdownRow, EmissionsSummary, Group, MonthKey, SiteKey,
};
pub use export::{quote_field, to_csv, CSV_HEADERS};
