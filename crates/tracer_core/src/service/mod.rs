//! Tracing pipeline services.
//!
//! # Responsibility
//! - Compose repository lookups, grouping and document assembly into the
//!   trace use-case.
//! - Keep the serving layer decoupled from storage details.

pub mod backlink_aggregator;
pub mod document_builder;
pub mod identifier;
pub mod region_matcher;
pub mod trace_service;
