//! Quote to policy with both drivers on the scheduler

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

use domain_policy::{
    ApplicationInput, ApplicationStatus, OfferStatus, PolicyFilter, PolicyStatus, UwDecision,
};
use infra_jobs::{IssuanceDriver, Scheduler, UnderwritingDriver, DEFAULT_BATCH_SIZE};
use test_utils::{
    assert_policy_number, assert_premium_eq, ApplicantFixtures, QuoteFixtures, WorkflowHarness,
};

#[tokio::test(start_paused = true)]
async fn test_submitted_application_becomes_a_policy() {
    let harness = WorkflowHarness::new();
    harness.seed().await;

    let quote = harness.services.quotes.price(&QuoteFixtures::reference_input()).await.unwrap();
    assert_premium_eq(quote.monthly_premium, dec!(37.50));

    let draft = harness
        .services
        .applications
        .create(ApplicationInput { quote_id: quote.id, applicant: ApplicantFixtures::standard() })
        .await
        .unwrap();
    let application = harness.services.applications.submit(draft.id).await.unwrap();

    let shutdown = CancellationToken::new();
    let scheduler = Scheduler::new(Duration::from_secs(5));
    let handles = vec![
        scheduler.spawn(
            Arc::new(UnderwritingDriver::new(&harness.repos, &harness.services, DEFAULT_BATCH_SIZE)),
            shutdown.clone(),
        ),
        scheduler.spawn(
            Arc::new(IssuanceDriver::new(&harness.repos, &harness.services, DEFAULT_BATCH_SIZE)),
            shutdown.clone(),
        ),
    ];

    // first ticks run immediately
    tokio::time::sleep(Duration::from_millis(10)).await;

    let case = harness.services.underwriting.get_by_application(application.id).await.unwrap();
    assert_eq!(case.decision, UwDecision::Approved);
    assert_eq!(case.risk_score.score, 10);

    let offer = harness.services.offers.get_by_application(application.id).await.unwrap();
    assert_eq!(offer.status, OfferStatus::Pending);
    assert_premium_eq(offer.monthly_premium, dec!(37.50));
    harness.services.offers.accept(offer.id).await.unwrap();

    // next issuance tick
    tokio::time::sleep(Duration::from_secs(5)).await;

    let filter = PolicyFilter { application_id: Some(application.id), status: None };
    let page = harness.services.policies.list(&filter, 0, 0).await.unwrap();
    assert_eq!(page.total, 1);

    let policy = &page.policies[0];
    assert_policy_number(&policy.number, 2025, 1);
    assert_eq!(policy.status, PolicyStatus::Active);
    assert_eq!(policy.offer_id, offer.id);
    assert_eq!(policy.coverage_amount, 150_000);
    assert_premium_eq(policy.monthly_premium, dec!(37.50));
    assert_eq!(policy.effective_date, policy.issued_at);
    assert_eq!(policy.expiry_date, chrono::Utc.with_ymd_and_hms(2035, 3, 1, 12, 0, 0).unwrap());

    assert_eq!(
        harness.services.applications.get(application.id).await.unwrap().status,
        ApplicationStatus::Approved
    );
    assert_eq!(harness.services.offers.get(offer.id).await.unwrap().status, OfferStatus::Issued);

    shutdown.cancel();
    for handle in handles {
        handle.await.unwrap();
    }
}
