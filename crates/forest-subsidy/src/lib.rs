//! Eligibility and funding rules for forestry subsidy programs.
//!
//! The [`eligibility`] module holds the analyzer and the program rule engine; the
//! remaining modules cover the catalogue, CSV batch imports and service bootstrap.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod telemetry;
