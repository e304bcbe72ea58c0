//! Revenue Desk - revenue management core for short-term rental operators.
//!
//! Plans (budget and rolling forecast), booking actuals, operating costs,
//! competitor rates and monitoring reports, persisted as reactive slots in a
//! local store and optionally mirrored to a remote `/store` record.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod runtime;
