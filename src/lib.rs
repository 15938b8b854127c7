//! Wedplan backend - wedding-planning platform API
//!
//! This crate implements the data-access core of the platform: a
//! table-agnostic collection gateway with ownership injection, and a
//! webhook normalizer turning heterogeneous payment-provider callbacks
//! into idempotent payment state transitions.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
