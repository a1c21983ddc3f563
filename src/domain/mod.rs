//! Core domain types and logic.

pub mod observation;
pub mod series;
pub mod holding;
pub mod portfolio;
pub mod report;
pub mod ingest;
pub mod error;
