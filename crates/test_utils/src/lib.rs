//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! workflow test suites.
//!
//! # Modules
//!
//! - `fixtures`: Fixed instants, applicants, products and a wired harness
//! - `builders`: Builder patterns for test data construction
//! - `doubles`: Repository wrappers that inject storage failures
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod doubles;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use doubles::*;
pub use assertions::*;
pub use generators::*;
