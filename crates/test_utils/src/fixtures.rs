//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the workflow and a harness that
//! wires every service to a fresh in-memory store and a frozen clock.

use chrono::{DateTime, Duration, TimeZone, Utc};

use core_kernel::{Clock, FixedClock};
use domain_policy::product::default_catalog;
use domain_policy::{
    Applicant, Application, ApplicationInput, InMemoryStore, Offer, Product, Quote, QuoteInput,
    Repositories, WorkflowServices, WorkflowSettings,
};

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Instant every harness clock starts at (Mar 1, 2025 noon UTC)
    pub fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    /// Leap day, for calendar arithmetic tests
    pub fn leap_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 29, 9, 0, 0).unwrap()
    }

    /// Last second of 2025
    pub fn year_end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap()
    }
}

/// Fixture for applicant data
pub struct ApplicantFixtures;

impl ApplicantFixtures {
    /// 35-year-old non-smoker, the low-risk reference applicant
    pub fn standard() -> Applicant {
        Applicant {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            date_of_birth: "1990-01-15".to_string(),
            age: 35,
            smoker: false,
            state: "CA".to_string(),
        }
    }

    /// A smoker, which always lands in the referred queue
    pub fn smoker() -> Applicant {
        Applicant {
            smoker: true,
            ..Self::standard()
        }
    }

    /// Older than the hard decline age
    pub fn over_80() -> Applicant {
        Applicant {
            date_of_birth: "1940-05-01".to_string(),
            age: 85,
            ..Self::standard()
        }
    }
}

/// Fixture for catalog data
pub struct ProductFixtures;

impl ProductFixtures {
    /// `term-life-10`: 10 years, 50k to 500k, base rate 0.25
    pub fn term_life_10() -> Product {
        Self::by_slug("term-life-10")
    }

    /// Returns a product from the default catalog
    ///
    /// # Panics
    ///
    /// Panics if the slug is not in the default catalog.
    pub fn by_slug(slug: &str) -> Product {
        default_catalog()
            .into_iter()
            .find(|p| p.slug == slug)
            .unwrap_or_else(|| panic!("no default product {slug}"))
    }
}

/// Fixture for quote requests
pub struct QuoteFixtures;

impl QuoteFixtures {
    /// 150,000 on `term-life-10` for the standard applicant
    pub fn reference_input() -> QuoteInput {
        QuoteInput {
            product_slug: "term-life-10".to_string(),
            coverage_amount: 150_000,
            term_years: 10,
            age: 35,
            smoker: false,
        }
    }

    /// A request matching the applicant's risk inputs
    pub fn for_applicant(applicant: &Applicant) -> QuoteInput {
        QuoteInput {
            age: applicant.age,
            smoker: applicant.smoker,
            ..Self::reference_input()
        }
    }
}

/// Every service over one in-memory store, with a controllable clock
pub struct WorkflowHarness {
    pub repos: Repositories,
    pub clock: FixedClock,
    pub services: WorkflowServices,
}

impl Default for WorkflowHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowHarness {
    /// Fresh store, clock at [`TemporalFixtures::base_time`]
    pub fn new() -> Self {
        Self::with_repositories(InMemoryStore::repositories())
    }

    /// Harness over existing repositories, e.g. wrapped in failure doubles
    pub fn with_repositories(repos: Repositories) -> Self {
        let clock = FixedClock::new(TemporalFixtures::base_time());
        let services = WorkflowServices::new(&repos, clock.shared(), WorkflowSettings::default());
        Self { repos, clock, services }
    }

    /// Seeds the default catalog
    pub async fn seed(&self) {
        self.services.catalog.seed(&default_catalog()).await.unwrap();
    }

    /// Seeds the catalog and prices a quote for the applicant
    pub async fn quote_for(&self, applicant: &Applicant) -> Quote {
        self.seed().await;
        self.services
            .quotes
            .price(&QuoteFixtures::for_applicant(applicant))
            .await
            .unwrap()
    }

    /// A draft application for the applicant
    pub async fn draft_application(&self, applicant: Applicant) -> Application {
        let quote = self.quote_for(&applicant).await;
        self.services
            .applications
            .create(ApplicationInput { quote_id: quote.id, applicant })
            .await
            .unwrap()
    }

    /// A submitted application for the applicant
    pub async fn submitted_application(&self, applicant: Applicant) -> Application {
        let draft = self.draft_application(applicant).await;
        self.services.applications.submit(draft.id).await.unwrap()
    }

    /// Runs the standard applicant through auto-approval and returns the offer
    pub async fn pending_offer(&self) -> Offer {
        let app = self.submitted_application(ApplicantFixtures::standard()).await;
        self.services.underwriting.process_application(app.id).await.unwrap();
        self.services.offers.get_by_application(app.id).await.unwrap()
    }

    /// A pending offer that has been accepted
    pub async fn accepted_offer(&self) -> Offer {
        let offer = self.pending_offer().await;
        self.services.offers.accept(offer.id).await.unwrap()
    }

    /// Current harness time
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Moves the clock forward
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}
