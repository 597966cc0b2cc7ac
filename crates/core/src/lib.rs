//! Domain logic for the CATalist adoption service.
//!
//! This crate performs no IO; it is shared by the database layer, the API
//! server and the tests.

pub mod adoption;
pub mod cat;
pub mod error;
pub mod hashing;
pub mod recognition;
pub mod roles;
pub mod search;
pub mod types;
pub mod validation;
