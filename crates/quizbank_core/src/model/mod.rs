//! Quiz domain model.
//!
//! # Responsibility
//! - Define the value types exchanged between the store and its callers.
//!
//! # Invariants
//! - Options have no identity of their own; they live and die with their
//!   parent question.

pub mod question;
