//! sonar-query - filter-group compilation for a genomic sample browser
//!
//! Builds nested AND/OR filter criteria over sample metadata, mutation
//! profiles, replicon accessions and lineages, compiles them into the
//! backend's query-string protocol, and reshapes statistics responses into
//! gap-free, plot-ready series.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod filters;
pub mod query;
pub mod reshape;
pub mod session;

pub use error::{Result, SonarError};
