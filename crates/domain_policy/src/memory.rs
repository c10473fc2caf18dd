//! In-memory storage backend
//!
//! Implements every repository port over `BTreeMap`s behind one tokio
//! `RwLock`. Uniqueness checks and the insert they guard happen under the
//! same write guard, so concurrent creates see the same `AlreadyExists`
//! signal the PostgreSQL backend produces from its unique indexes. Used by
//! the test suites and by the worker when no database is configured.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, ApplicationId, DomainPort, HealthCheckResult, HealthCheckable, OfferId, PolicyId,
    PortError, ProductId, QuoteId, UnderwritingCaseId,
};

use crate::application::{Application, ApplicationStatus};
use crate::offer::{Offer, OfferStatus};
use crate::policy::{Policy, PolicyFilter};
use crate::ports::{
    ApplicationRepository, OfferRepository, PolicyRepository, ProductRepository, QuoteRepository,
    Repositories, UnderwritingRepository,
};
use crate::product::Product;
use crate::quote::Quote;
use crate::underwriting::{UnderwritingCase, UwDecision};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<Uuid, Product>,
    quotes: BTreeMap<Uuid, Quote>,
    applications: BTreeMap<Uuid, Application>,
    cases: BTreeMap<Uuid, UnderwritingCase>,
    offers: BTreeMap<Uuid, Offer>,
    policies: BTreeMap<Uuid, Policy>,
    policy_counters: BTreeMap<i32, u64>,
}

/// Process-local store implementing all repository ports
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store and wraps every port around it
    pub fn repositories() -> Repositories {
        Repositories::from_backend(Arc::new(Self::new()))
    }
}

impl DomainPort for InMemoryStore {}

/// Sorts oldest first and keeps at most `limit`
fn oldest_first<T>(
    rows: impl Iterator<Item = T>,
    key: impl Fn(&T) -> DateTime<Utc>,
    limit: usize,
) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|row| key(row));
    rows.truncate(limit);
    rows
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Product>, PortError> {
        let tables = self.tables.read().await;
        let mut products: Vec<Product> = tables.products.values().cloned().collect();
        products.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(products)
    }

    async fn get(&self, id: ProductId) -> Result<Product, PortError> {
        let tables = self.tables.read().await;
        tables
            .products
            .get(id.as_uuid())
            .cloned()
            .ok_or_else(|| PortError::not_found("Product", id))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Product, PortError> {
        let tables = self.tables.read().await;
        tables
            .products
            .values()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| PortError::not_found("Product", slug))
    }

    async fn upsert_by_slug(&self, product: &Product) -> Result<Product, PortError> {
        let mut tables = self.tables.write().await;
        let existing_id = tables
            .products
            .values()
            .find(|p| p.slug == product.slug)
            .map(|p| p.id);

        let mut stored = product.clone();
        if let Some(id) = existing_id {
            stored.id = id;
        }
        tables.products.insert(*stored.id.as_uuid(), stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl QuoteRepository for InMemoryStore {
    async fn create(&self, quote: &Quote) -> Result<(), PortError> {
        let mut tables = self.tables.write().await;
        if tables.quotes.contains_key(quote.id.as_uuid()) {
            return Err(PortError::already_exists("Quote", quote.id));
        }
        tables.quotes.insert(*quote.id.as_uuid(), quote.clone());
        Ok(())
    }

    async fn get(&self, id: QuoteId) -> Result<Quote, PortError> {
        let tables = self.tables.read().await;
        tables
            .quotes
            .get(id.as_uuid())
            .cloned()
            .ok_or_else(|| PortError::not_found("Quote", id))
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryStore {
    async fn create(&self, application: &Application) -> Result<(), PortError> {
        let mut tables = self.tables.write().await;
        if tables.applications.contains_key(application.id.as_uuid()) {
            return Err(PortError::already_exists("Application", application.id));
        }
        if tables.applications.values().any(|a| a.quote_id == application.quote_id) {
            return Err(PortError::already_exists(
                "Application",
                format!("quote_id {}", application.quote_id),
            ));
        }
        tables.applications.insert(*application.id.as_uuid(), application.clone());
        Ok(())
    }

    async fn get(&self, id: ApplicationId) -> Result<Application, PortError> {
        let tables = self.tables.read().await;
        tables
            .applications
            .get(id.as_uuid())
            .cloned()
            .ok_or_else(|| PortError::not_found("Application", id))
    }

    async fn update(&self, application: &Application) -> Result<(), PortError> {
        let mut tables = self.tables.write().await;
        match tables.applications.get_mut(application.id.as_uuid()) {
            Some(slot) => {
                *slot = application.clone();
                Ok(())
            }
            None => Err(PortError::not_found("Application", application.id)),
        }
    }

    async fn find_by_status(
        &self,
        status: ApplicationStatus,
        limit: usize,
    ) -> Result<Vec<Application>, PortError> {
        let tables = self.tables.read().await;
        Ok(oldest_first(
            tables.applications.values().filter(|a| a.status == status).cloned(),
            |a| a.created_at,
            limit,
        ))
    }
}

#[async_trait]
impl UnderwritingRepository for InMemoryStore {
    async fn create(&self, case: &UnderwritingCase) -> Result<(), PortError> {
        let mut tables = self.tables.write().await;
        if tables.cases.contains_key(case.id.as_uuid())
            || tables.cases.values().any(|c| c.application_id == case.application_id)
        {
            return Err(PortError::already_exists(
                "UnderwritingCase",
                format!("application_id {}", case.application_id),
            ));
        }
        tables.cases.insert(*case.id.as_uuid(), case.clone());
        Ok(())
    }

    async fn get(&self, id: UnderwritingCaseId) -> Result<UnderwritingCase, PortError> {
        let tables = self.tables.read().await;
        tables
            .cases
            .get(id.as_uuid())
            .cloned()
            .ok_or_else(|| PortError::not_found("UnderwritingCase", id))
    }

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<UnderwritingCase, PortError> {
        let tables = self.tables.read().await;
        tables
            .cases
            .values()
            .find(|c| c.application_id == application_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("UnderwritingCase", application_id))
    }

    async fn update(&self, case: &UnderwritingCase) -> Result<(), PortError> {
        let mut tables = self.tables.write().await;
        match tables.cases.get_mut(case.id.as_uuid()) {
            Some(slot) => {
                *slot = case.clone();
                Ok(())
            }
            None => Err(PortError::not_found("UnderwritingCase", case.id)),
        }
    }

    async fn find_referred(&self, limit: usize) -> Result<Vec<UnderwritingCase>, PortError> {
        let tables = self.tables.read().await;
        Ok(oldest_first(
            tables.cases.values().filter(|c| c.decision == UwDecision::Referred).cloned(),
            |c| c.created_at,
            limit,
        ))
    }
}

#[async_trait]
impl OfferRepository for InMemoryStore {
    async fn create(&self, offer: &Offer) -> Result<(), PortError> {
        let mut tables = self.tables.write().await;
        if tables.offers.contains_key(offer.id.as_uuid())
            || tables.offers.values().any(|o| o.application_id == offer.application_id)
        {
            return Err(PortError::already_exists(
                "Offer",
                format!("application_id {}", offer.application_id),
            ));
        }
        tables.offers.insert(*offer.id.as_uuid(), offer.clone());
        Ok(())
    }

    async fn get(&self, id: OfferId) -> Result<Offer, PortError> {
        let tables = self.tables.read().await;
        tables
            .offers
            .get(id.as_uuid())
            .cloned()
            .ok_or_else(|| PortError::not_found("Offer", id))
    }

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<Offer, PortError> {
        let tables = self.tables.read().await;
        tables
            .offers
            .values()
            .find(|o| o.application_id == application_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Offer", application_id))
    }

    async fn update(&self, offer: &Offer) -> Result<(), PortError> {
        let mut tables = self.tables.write().await;
        match tables.offers.get_mut(offer.id.as_uuid()) {
            Some(slot) => {
                *slot = offer.clone();
                Ok(())
            }
            None => Err(PortError::not_found("Offer", offer.id)),
        }
    }

    async fn find_accepted(&self, limit: usize) -> Result<Vec<Offer>, PortError> {
        let tables = self.tables.read().await;
        Ok(oldest_first(
            tables.offers.values().filter(|o| o.status == OfferStatus::Accepted).cloned(),
            |o| o.accepted_at.unwrap_or(o.created_at),
            limit,
        ))
    }

    async fn expire_offers(&self, before: DateTime<Utc>) -> Result<u64, PortError> {
        let mut tables = self.tables.write().await;
        let mut expired = 0;
        for offer in tables.offers.values_mut() {
            if offer.status == OfferStatus::Pending && offer.expires_at < before {
                offer.status = OfferStatus::Expired;
                expired += 1;
            }
        }
        Ok(expired)
    }
}

#[async_trait]
impl PolicyRepository for InMemoryStore {
    async fn create(&self, policy: &Policy) -> Result<(), PortError> {
        let mut tables = self.tables.write().await;
        if tables.policies.values().any(|p| p.offer_id == policy.offer_id) {
            return Err(PortError::already_exists(
                "Policy",
                format!("offer_id {}", policy.offer_id),
            ));
        }
        if tables.policies.contains_key(policy.id.as_uuid())
            || tables.policies.values().any(|p| p.number == policy.number)
        {
            return Err(PortError::already_exists("Policy", format!("number {}", policy.number)));
        }
        tables.policies.insert(*policy.id.as_uuid(), policy.clone());
        Ok(())
    }

    async fn get(&self, id: PolicyId) -> Result<Policy, PortError> {
        let tables = self.tables.read().await;
        tables
            .policies
            .get(id.as_uuid())
            .cloned()
            .ok_or_else(|| PortError::not_found("Policy", id))
    }

    async fn get_by_number(&self, number: &str) -> Result<Policy, PortError> {
        let tables = self.tables.read().await;
        tables
            .policies
            .values()
            .find(|p| p.number == number)
            .cloned()
            .ok_or_else(|| PortError::not_found("Policy", number))
    }

    async fn get_by_offer(&self, offer_id: OfferId) -> Result<Policy, PortError> {
        let tables = self.tables.read().await;
        tables
            .policies
            .values()
            .find(|p| p.offer_id == offer_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Policy", offer_id))
    }

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<Policy, PortError> {
        let tables = self.tables.read().await;
        tables
            .policies
            .values()
            .find(|p| p.application_id == application_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Policy", application_id))
    }

    async fn list(
        &self,
        filter: &PolicyFilter,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Policy>, u64), PortError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<Policy> = tables
            .policies
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));

        let total = matching.len() as u64;
        let page = matching.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn next_policy_sequence(&self, year: i32) -> Result<u64, PortError> {
        let mut tables = self.tables.write().await;
        let counter = tables.policy_counters.entry(year).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

#[async_trait]
impl HealthCheckable for InMemoryStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let _tables = self.tables.read().await;
        HealthCheckResult {
            adapter_id: "memory".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: start.elapsed().as_millis() as u64,
            message: None,
            checked_at: Utc::now(),
        }
    }
}
