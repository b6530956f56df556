//! HTTP API: configuration, routing, access-control middleware, and
//! request/response mapping.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod cors;
pub mod middleware;
