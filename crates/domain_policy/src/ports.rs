//! Repository ports
//!
//! One trait per entity. Both storage backends implement all of them and
//! report failures as [`PortError`]. The idempotency protocol rests on two
//! signals: `create` returns [`PortError::AlreadyExists`] on a natural-key
//! collision, and lookups return [`PortError::NotFound`] when nothing
//! matches.
//!
//! | Entity | Natural key enforced by `create` |
//! |--------|----------------------------------|
//! | Application | `quote_id` |
//! | UnderwritingCase | `application_id` |
//! | Offer | `application_id` |
//! | Policy | `offer_id` (and `number`) |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{
    ApplicationId, DomainPort, HealthCheckable, OfferId, PolicyId, PortError, ProductId, QuoteId,
    UnderwritingCaseId,
};

use crate::application::{Application, ApplicationStatus};
use crate::offer::Offer;
use crate::policy::{Policy, PolicyFilter};
use crate::product::Product;
use crate::quote::Quote;
use crate::underwriting::UnderwritingCase;

/// Product catalog storage
#[async_trait]
pub trait ProductRepository: DomainPort {
    /// Lists the catalog ordered by slug
    async fn list(&self) -> Result<Vec<Product>, PortError>;

    async fn get(&self, id: ProductId) -> Result<Product, PortError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Product, PortError>;

    /// Inserts or replaces the product with the same slug
    ///
    /// An existing product keeps its id.
    async fn upsert_by_slug(&self, product: &Product) -> Result<Product, PortError>;
}

/// Quote storage
#[async_trait]
pub trait QuoteRepository: DomainPort {
    async fn create(&self, quote: &Quote) -> Result<(), PortError>;

    async fn get(&self, id: QuoteId) -> Result<Quote, PortError>;
}

/// Application storage
#[async_trait]
pub trait ApplicationRepository: DomainPort {
    /// Fails with `AlreadyExists` if an application already uses the quote
    async fn create(&self, application: &Application) -> Result<(), PortError>;

    async fn get(&self, id: ApplicationId) -> Result<Application, PortError>;

    /// Replaces a stored application; `NotFound` if it does not exist
    async fn update(&self, application: &Application) -> Result<(), PortError>;

    /// Oldest first, at most `limit`
    async fn find_by_status(
        &self,
        status: ApplicationStatus,
        limit: usize,
    ) -> Result<Vec<Application>, PortError>;
}

/// Underwriting case storage
#[async_trait]
pub trait UnderwritingRepository: DomainPort {
    /// Fails with `AlreadyExists` if the application already has a case
    async fn create(&self, case: &UnderwritingCase) -> Result<(), PortError>;

    async fn get(&self, id: UnderwritingCaseId) -> Result<UnderwritingCase, PortError>;

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<UnderwritingCase, PortError>;

    async fn update(&self, case: &UnderwritingCase) -> Result<(), PortError>;

    /// Cases awaiting a reviewer, oldest first
    async fn find_referred(&self, limit: usize) -> Result<Vec<UnderwritingCase>, PortError>;
}

/// Offer storage
#[async_trait]
pub trait OfferRepository: DomainPort {
    /// Fails with `AlreadyExists` if the application already has an offer
    async fn create(&self, offer: &Offer) -> Result<(), PortError>;

    async fn get(&self, id: OfferId) -> Result<Offer, PortError>;

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<Offer, PortError>;

    async fn update(&self, offer: &Offer) -> Result<(), PortError>;

    /// Accepted offers waiting for issuance, oldest first
    async fn find_accepted(&self, limit: usize) -> Result<Vec<Offer>, PortError>;

    /// Marks pending offers with `expires_at < before` as expired
    ///
    /// Returns how many offers changed.
    async fn expire_offers(&self, before: DateTime<Utc>) -> Result<u64, PortError>;
}

/// Policy storage
#[async_trait]
pub trait PolicyRepository: DomainPort {
    /// Fails with `AlreadyExists` if the offer already has a policy or the
    /// number is taken
    async fn create(&self, policy: &Policy) -> Result<(), PortError>;

    async fn get(&self, id: PolicyId) -> Result<Policy, PortError>;

    async fn get_by_number(&self, number: &str) -> Result<Policy, PortError>;

    async fn get_by_offer(&self, offer_id: OfferId) -> Result<Policy, PortError>;

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<Policy, PortError>;

    /// Returns one page, newest first, plus the total number of matches
    async fn list(
        &self,
        filter: &PolicyFilter,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Policy>, u64), PortError>;

    /// Atomically increments and returns the counter for `year`
    ///
    /// The first call for a year returns 1. Concurrent callers never
    /// receive the same value.
    async fn next_policy_sequence(&self, year: i32) -> Result<u64, PortError>;
}

/// Every port a backend provides, ready to hand to the services
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub underwriting: Arc<dyn UnderwritingRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub policies: Arc<dyn PolicyRepository>,
    pub health: Arc<dyn HealthCheckable>,
}

impl Repositories {
    /// Builds the bundle from a single backend that implements every port
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ProductRepository
            + QuoteRepository
            + ApplicationRepository
            + UnderwritingRepository
            + OfferRepository
            + PolicyRepository
            + HealthCheckable,
    {
        Self {
            products: backend.clone(),
            quotes: backend.clone(),
            applications: backend.clone(),
            underwriting: backend.clone(),
            offers: backend.clone(),
            policies: backend.clone(),
            health: backend,
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
