//! Domain types shared by the tracker crates.
//!
//! - [`issue`] -- issue enums (type, impact, status) and field limits.
//! - [`validation`] -- request-body validation producing typed inputs.
//! - [`search`] -- helpers for building substring filters.
//! - [`error`] -- the domain error type.

pub mod error;
pub mod issue;
pub mod search;
pub mod types;
pub mod validation;
