//! Core Kernel - Foundational types for the quote-to-policy workflow
//!
//! This crate provides the building blocks shared by every workflow crate:
//! - Monthly premium amounts with half-up rounding to cents
//! - An injectable clock so services never read the wall clock directly
//! - Strongly-typed identifiers for each workflow entity
//! - The error vocabulary used by repository ports and domain services

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{MonthlyPremium, round_half_up};
pub use temporal::{Clock, SharedClock, SystemClock, FixedClock, TemporalError, add_years};
pub use identifiers::{
    ProductId, QuoteId, ApplicationId, UnderwritingCaseId, OfferId, PolicyId,
};
pub use error::{CoreError, ErrorKind};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
