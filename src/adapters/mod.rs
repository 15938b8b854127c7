//! Adapters: concrete implementations of the ports, organized by concern.

pub mod auth;
pub mod http;
pub mod postgres;
pub mod providers;
pub mod rates;
