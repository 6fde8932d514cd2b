//! Repository layer for the question store.
//!
//! # Responsibility
//! - Define the store contract consumed by services and outer layers.
//! - Keep SQL and transaction handling out of callers.
//!
//! # Invariants
//! - Every multi-statement write is a single transaction.
//! - Errors surface verbatim; there is no retry or recovery here.

pub mod question_repo;
