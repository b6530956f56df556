//! `retailx-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod subject;

pub use error::{DomainError, DomainResult};
pub use subject::Subject;
