//! Repository port implementations for [`PostgresStore`](crate::PostgresStore)
//!
//! One module per entity. Rows are read with runtime-checked `query_as`
//! into private row structs and converted into domain types; statuses are
//! stored as their snake_case names and structured applicant and risk data
//! as JSONB.
//!
//! Natural keys are protected by unique constraints (see the migration),
//! so a losing concurrent create fails with SQLSTATE 23505 and surfaces as
//! `PortError::AlreadyExists`.

mod applications;
mod offers;
mod policies;
mod products;
mod quotes;
mod underwriting;
