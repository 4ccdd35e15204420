//! Admission Control - Multi-tenant API rate limiting
//!
//! This crate decides whether a client's API call may proceed, using
//! tiered token buckets (client default, per HTTP method, per API path)
//! that refill continuously over time.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
