//! Herd prediction service
//!
//! HTTP front end over the herd engine: prediction routes, model status,
//! health probes and Prometheus metrics.

pub mod api;
pub mod config;
