//! Log-threshold alerting pipeline.
//!
//! This crate provides:
//! - Criteria → query-clause filter building
//! - Ungrouped and grouped (composite aggregation) search-body assembly,
//!   with a filter-then-count optimization for `more than` style thresholds
//! - Result processing that reports firing groups through injected
//!   collaborator traits, with alert-limit bookkeeping
//! - An evaluation executor tying query building, search and processing
//!   together behind an injected search client

pub mod clients;
pub mod executor;
pub mod fields;
pub mod filters;
pub mod query;
pub mod reason;
pub mod results;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;
