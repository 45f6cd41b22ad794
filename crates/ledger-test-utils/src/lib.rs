//! Testing utilities for the Carbon Ledger workspace
//!
//! Shared fixtures, proptest strategies and an in-memory backend.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

pub mod fixtures;
pub mod mock;

pub use fixtures::{
    activity, arb_activities, arb_activity, arb_category, date, factor, filled_wizard,
    sample_factors, sample_period, sample_session, ActivityBuilder,
};
pub use mock::{MockLedgerApi, MOCK_PASSWORD};
