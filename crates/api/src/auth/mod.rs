//! Session issuance and cookie handling.

pub mod session;
