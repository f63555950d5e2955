//! Validation Engine.
//!
//! Runs once per logical table after every sheet has been ingested and
//! every merge group consolidated. Each call is pure: it reads the shared
//! registries and returns its own diagnostics and overlay.

mod checks;
mod engine;

pub use engine::{TableValidation, ValidationContext, ValidationTarget, validate_table};
