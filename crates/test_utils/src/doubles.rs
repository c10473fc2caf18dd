//! Repository Failure Doubles
//!
//! Wrappers that delegate to a real repository but can be told to fail or
//! to miss. Hiding lookups reproduces the losing side of a create race: the
//! existence check sees nothing, then the create collides with the row a
//! concurrent worker already wrote.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{
    ApplicationId, DomainPort, OfferId, PolicyId, PortError, UnderwritingCaseId,
};
use domain_policy::{
    Application, ApplicationRepository, ApplicationStatus, Offer, OfferRepository, Policy,
    PolicyFilter, PolicyRepository, UnderwritingCase, UnderwritingRepository,
};

/// Shared switches for a double
#[derive(Debug, Default)]
pub struct FaultPlan {
    hidden_lookups: AtomicUsize,
    fail_updates: AtomicBool,
}

impl FaultPlan {
    /// The next `n` natural-key lookups report `NotFound`
    pub fn hide_next_lookups(&self, n: usize) {
        self.hidden_lookups.store(n, Ordering::SeqCst);
    }

    /// Every update fails with a timeout while set
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    fn take_hidden(&self) -> bool {
        self.hidden_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn update_fails(&self) -> bool {
        self.fail_updates.load(Ordering::SeqCst)
    }
}

/// Offer repository double
pub struct FlakyOffers {
    inner: Arc<dyn OfferRepository>,
    pub plan: FaultPlan,
}

impl FlakyOffers {
    pub fn new(inner: Arc<dyn OfferRepository>) -> Arc<Self> {
        Arc::new(Self { inner, plan: FaultPlan::default() })
    }
}

impl DomainPort for FlakyOffers {}

#[async_trait]
impl OfferRepository for FlakyOffers {
    async fn create(&self, offer: &Offer) -> Result<(), PortError> {
        self.inner.create(offer).await
    }

    async fn get(&self, id: OfferId) -> Result<Offer, PortError> {
        self.inner.get(id).await
    }

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<Offer, PortError> {
        if self.plan.take_hidden() {
            return Err(PortError::not_found("Offer", application_id));
        }
        self.inner.get_by_application(application_id).await
    }

    async fn update(&self, offer: &Offer) -> Result<(), PortError> {
        if self.plan.update_fails() {
            return Err(PortError::timeout("offers.update", 500));
        }
        self.inner.update(offer).await
    }

    async fn find_accepted(&self, limit: usize) -> Result<Vec<Offer>, PortError> {
        self.inner.find_accepted(limit).await
    }

    async fn expire_offers(&self, before: DateTime<Utc>) -> Result<u64, PortError> {
        self.inner.expire_offers(before).await
    }
}

/// Policy repository double
pub struct FlakyPolicies {
    inner: Arc<dyn PolicyRepository>,
    pub plan: FaultPlan,
}

impl FlakyPolicies {
    pub fn new(inner: Arc<dyn PolicyRepository>) -> Arc<Self> {
        Arc::new(Self { inner, plan: FaultPlan::default() })
    }
}

impl DomainPort for FlakyPolicies {}

#[async_trait]
impl PolicyRepository for FlakyPolicies {
    async fn create(&self, policy: &Policy) -> Result<(), PortError> {
        self.inner.create(policy).await
    }

    async fn get(&self, id: PolicyId) -> Result<Policy, PortError> {
        self.inner.get(id).await
    }

    async fn get_by_number(&self, number: &str) -> Result<Policy, PortError> {
        self.inner.get_by_number(number).await
    }

    async fn get_by_offer(&self, offer_id: OfferId) -> Result<Policy, PortError> {
        if self.plan.take_hidden() {
            return Err(PortError::not_found("Policy", offer_id));
        }
        self.inner.get_by_offer(offer_id).await
    }

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<Policy, PortError> {
        self.inner.get_by_application(application_id).await
    }

    async fn list(
        &self,
        filter: &PolicyFilter,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Policy>, u64), PortError> {
        self.inner.list(filter, limit, offset).await
    }

    async fn next_policy_sequence(&self, year: i32) -> Result<u64, PortError> {
        self.inner.next_policy_sequence(year).await
    }
}

/// Underwriting case repository double
pub struct FlakyCases {
    inner: Arc<dyn UnderwritingRepository>,
    pub plan: FaultPlan,
}

impl FlakyCases {
    pub fn new(inner: Arc<dyn UnderwritingRepository>) -> Arc<Self> {
        Arc::new(Self { inner, plan: FaultPlan::default() })
    }
}

impl DomainPort for FlakyCases {}

#[async_trait]
impl UnderwritingRepository for FlakyCases {
    async fn create(&self, case: &UnderwritingCase) -> Result<(), PortError> {
        self.inner.create(case).await
    }

    async fn get(&self, id: UnderwritingCaseId) -> Result<UnderwritingCase, PortError> {
        self.inner.get(id).await
    }

    async fn get_by_application(&self, application_id: ApplicationId) -> Result<UnderwritingCase, PortError> {
        if self.plan.take_hidden() {
            return Err(PortError::not_found("UnderwritingCase", application_id));
        }
        self.inner.get_by_application(application_id).await
    }

    async fn update(&self, case: &UnderwritingCase) -> Result<(), PortError> {
        if self.plan.update_fails() {
            return Err(PortError::timeout("underwriting.update", 500));
        }
        self.inner.update(case).await
    }

    async fn find_referred(&self, limit: usize) -> Result<Vec<UnderwritingCase>, PortError> {
        self.inner.find_referred(limit).await
    }
}

/// Application repository double that times out reads of chosen ids
pub struct FlakyApplications {
    inner: Arc<dyn ApplicationRepository>,
    unreachable: Mutex<HashSet<ApplicationId>>,
}

impl FlakyApplications {
    pub fn new(inner: Arc<dyn ApplicationRepository>) -> Arc<Self> {
        Arc::new(Self { inner, unreachable: Mutex::new(HashSet::new()) })
    }

    /// Reads of this application time out from now on
    pub fn make_unreachable(&self, id: ApplicationId) {
        self.unreachable.lock().unwrap().insert(id);
    }

    /// Reads of this application succeed again
    pub fn make_reachable(&self, id: ApplicationId) {
        self.unreachable.lock().unwrap().remove(&id);
    }
}

impl DomainPort for FlakyApplications {}

#[async_trait]
impl ApplicationRepository for FlakyApplications {
    async fn create(&self, application: &Application) -> Result<(), PortError> {
        self.inner.create(application).await
    }

    async fn get(&self, id: ApplicationId) -> Result<Application, PortError> {
        if self.unreachable.lock().unwrap().contains(&id) {
            return Err(PortError::timeout("applications.get", 500));
        }
        self.inner.get(id).await
    }

    async fn update(&self, application: &Application) -> Result<(), PortError> {
        self.inner.update(application).await
    }

    async fn find_by_status(
        &self,
        status: ApplicationStatus,
        limit: usize,
    ) -> Result<Vec<Application>, PortError> {
        self.inner.find_by_status(status, limit).await
    }
}
