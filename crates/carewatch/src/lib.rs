//! Core library for the CareWatch monitoring platform.
//!
//! Care workers record structured observations during client visits; the
//! [`monitoring`] module turns those observations into a deterministic risk
//! assessment and drives the resulting alerts through their review
//! lifecycle. Everything stateful goes through injected store/clock/id
//! ports so the same logic runs against the bundled in-memory store or a
//! real database.

pub mod config;
pub mod error;
pub mod monitoring;
pub mod telemetry;
