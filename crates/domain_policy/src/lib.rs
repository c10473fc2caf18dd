//! Quote-to-Policy Workflow Domain
//!
//! This crate implements the workflow that turns a priced quote into an
//! issued policy, following the same hexagonal layout as the rest of the
//! workspace: entities and rules here, storage behind the traits in
//! [`ports`].
//!
//! # Architecture
//!
//! - **Entities**: Quote, Application, UnderwritingCase, Offer, Policy
//! - **Pure engines**: pricing ([`quote::price`]) and risk scoring
//!   ([`underwriting::score_risk`], [`underwriting::determine_decision`])
//! - **Services**: one per entity lifecycle, in [`services`]
//! - **Ports**: async repository traits, with an in-memory backend in
//!   [`memory`]
//!
//! # Pipeline
//!
//! ```text
//! Quote(priced) -> Application(draft -> submitted -> under_review -> approved | declined)
//!                                                               |
//!                  UnderwritingCase(approved | declined | referred)
//!                                                               |
//!                  Offer(pending -> accepted -> issued) -> Policy(active)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_policy::{InMemoryStore, WorkflowServices, WorkflowSettings};
//! use core_kernel::SystemClock;
//!
//! let repos = InMemoryStore::repositories();
//! let services = WorkflowServices::new(&repos, SystemClock::shared(), WorkflowSettings::default());
//!
//! let quote = services.quotes.price(&input).await?;
//! let app = services.applications.create(ApplicationInput { quote_id: quote.id, applicant }).await?;
//! services.applications.submit(app.id).await?;
//! ```

mod status;

pub mod application;
pub mod error;
pub mod memory;
pub mod offer;
pub mod policy;
pub mod ports;
pub mod premium;
pub mod product;
pub mod quote;
pub mod services;
pub mod settings;
pub mod underwriting;

pub use application::{Applicant, Application, ApplicationInput, ApplicationPatch, ApplicationStatus};
pub use error::PolicyError;
pub use memory::InMemoryStore;
pub use offer::{Offer, OfferStatus, OFFER_VALIDITY_DAYS};
pub use policy::{Policy, PolicyFilter, PolicyPage, PolicyStatus};
pub use ports::{
    ApplicationRepository, OfferRepository, PolicyRepository, ProductRepository, QuoteRepository,
    Repositories, UnderwritingRepository,
};
pub use product::Product;
pub use quote::{Quote, QuoteInput, QuoteStatus, QUOTE_VALIDITY_HOURS};
pub use services::{
    ApplicationService, CatalogService, OfferService, PolicyService, QuoteService,
    UnderwritingService, WorkflowServices,
};
pub use settings::WorkflowSettings;
pub use underwriting::{
    DecisionInput, RiskFactors, RiskScore, UnderwritingCase, UwDecision, UwMethod,
};
