//! Carbon Ledger command-line front end
//!
//! Offline subcommands (`spend`, `categories`, `summary`, `export`) work on
//! local data; the rest talk to the backend through `ledger-client`.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod commands;

pub use cli::build_cli;
pub use commands::GroupBy;
