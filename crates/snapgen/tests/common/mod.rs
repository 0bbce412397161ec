//! Shared test utilities for snapgen integration tests.
//!
//! This module provides:
//! - scripted fakes for the AI collaborators
//! - `XlsxBuilder` for writing small real workbooks
//! - `Harness` wiring a store, an ingestion pipeline and an orchestrator

pub mod fakes;
pub mod harness;
pub mod xlsx;

pub use fakes::*;
pub use harness::Harness;
pub use xlsx::XlsxBuilder;
