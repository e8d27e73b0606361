//! Core domain types: identifiers and errors

pub mod error;
pub mod ids;
