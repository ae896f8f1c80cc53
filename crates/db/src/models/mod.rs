//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - The DTOs used to insert or query that table

pub mod issue;
pub mod session;
pub mod user;
