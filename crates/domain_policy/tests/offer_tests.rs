//! Offer Lifecycle Tests

use std::sync::Arc;

use chrono::Duration;
use rust_decimal_macros::dec;

use core_kernel::{ErrorKind, OfferId};
use domain_policy::{InMemoryStore, OfferStatus, PolicyError, OFFER_VALIDITY_DAYS};
use test_utils::*;

fn harness_with_flaky_offers() -> (WorkflowHarness, Arc<FlakyOffers>) {
    let mut repos = InMemoryStore::repositories();
    let offers = FlakyOffers::new(repos.offers.clone());
    repos.offers = offers.clone();
    (WorkflowHarness::with_repositories(repos), offers)
}

mod generation {
    use super::*;

    #[tokio::test]
    async fn test_offer_terms_follow_application() {
        let harness = WorkflowHarness::new();
        let offer = harness.pending_offer().await;

        assert_eq!(offer.status, OfferStatus::Pending);
        assert_eq!(offer.coverage_amount, 150_000);
        assert_eq!(offer.term_years, 10);
        assert_premium_eq(offer.monthly_premium, dec!(37.50));
        assert_eq!(
            offer.expires_at,
            TemporalFixtures::base_time() + Duration::days(OFFER_VALIDITY_DAYS)
        );
        assert!(offer.accepted_at.is_none());
    }

    #[tokio::test]
    async fn test_generate_is_idempotent() {
        let harness = WorkflowHarness::new();
        let offer = harness.pending_offer().await;

        let again = harness.services.offers.generate_offer(offer.application_id).await.unwrap();
        assert_eq!(again.id, offer.id);
    }

    #[tokio::test]
    async fn test_unapproved_application_rejected() {
        let harness = WorkflowHarness::new();
        let app = harness.submitted_application(ApplicantFixtures::standard()).await;

        assert_error_kind(
            harness.services.offers.generate_offer(app.id).await,
            ErrorKind::InvalidState,
        );
    }

    #[tokio::test]
    async fn test_lost_create_race_returns_existing() {
        let (harness, offers) = harness_with_flaky_offers();
        let offer = harness.pending_offer().await;

        offers.plan.hide_next_lookups(1);
        let again = harness.services.offers.generate_offer(offer.application_id).await.unwrap();
        assert_eq!(again.id, offer.id);
    }
}

mod acceptance {
    use super::*;

    #[tokio::test]
    async fn test_accept_pending_offer() {
        let harness = WorkflowHarness::new();
        let offer = harness.pending_offer().await;
        harness.advance(Duration::days(3));

        let accepted = harness.services.offers.accept(offer.id).await.unwrap();

        assert_eq!(accepted.status, OfferStatus::Accepted);
        assert_eq!(accepted.accepted_at, Some(TemporalFixtures::base_time() + Duration::days(3)));
        let stored = harness.services.offers.get(offer.id).await.unwrap();
        assert_eq!(stored.status, OfferStatus::Accepted);
    }

    #[tokio::test]
    async fn test_accept_at_expiry_instant_succeeds() {
        let harness = WorkflowHarness::new();
        let offer = harness.pending_offer().await;
        harness.advance(Duration::days(OFFER_VALIDITY_DAYS));

        assert!(harness.services.offers.accept(offer.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_accept_after_expiry_marks_expired() {
        let harness = WorkflowHarness::new();
        let offer = harness.pending_offer().await;
        harness.advance(Duration::days(OFFER_VALIDITY_DAYS) + Duration::seconds(1));

        let err = harness.services.offers.accept(offer.id).await.unwrap_err();
        assert!(matches!(err, PolicyError::OfferExpired));

        let stored = harness.services.offers.get(offer.id).await.unwrap();
        assert_eq!(stored.status, OfferStatus::Expired);
    }

    #[tokio::test]
    async fn test_expiry_write_failure_still_reports_expired() {
        let (harness, offers) = harness_with_flaky_offers();
        let offer = harness.pending_offer().await;
        harness.advance(Duration::days(OFFER_VALIDITY_DAYS + 1));

        offers.plan.fail_updates(true);
        let err = harness.services.offers.accept(offer.id).await.unwrap_err();
        assert!(matches!(err, PolicyError::OfferExpired));

        let stored = harness.services.offers.get(offer.id).await.unwrap();
        assert_eq!(stored.status, OfferStatus::Pending);
    }

    #[tokio::test]
    async fn test_accept_twice_rejected() {
        let harness = WorkflowHarness::new();
        let offer = harness.accepted_offer().await;

        assert_error_kind(harness.services.offers.accept(offer.id).await, ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_unknown_offer_is_not_found() {
        let harness = WorkflowHarness::new();
        assert_error_kind(harness.services.offers.accept(OfferId::new_v7()).await, ErrorKind::NotFound);
    }
}

mod decline {
    use super::*;

    #[tokio::test]
    async fn test_decline_is_terminal() {
        let harness = WorkflowHarness::new();
        let offer = harness.pending_offer().await;

        let declined = harness.services.offers.decline(offer.id).await.unwrap();
        assert_eq!(declined.status, OfferStatus::Declined);
        assert_eq!(declined.declined_at, Some(TemporalFixtures::base_time()));

        assert_error_kind(harness.services.offers.accept(offer.id).await, ErrorKind::InvalidState);
        assert_error_kind(harness.services.offers.decline(offer.id).await, ErrorKind::InvalidState);
    }
}

mod expiry_sweep {
    use super::*;

    #[tokio::test]
    async fn test_only_stale_pending_offers_expire() {
        let harness = WorkflowHarness::new();
        let stale = harness.pending_offer().await;
        let accepted = harness.accepted_offer().await;

        harness.advance(Duration::days(10));
        let fresh = harness.pending_offer().await;

        harness.advance(Duration::days(25));
        let expired = harness.services.offers.expire_stale(harness.now()).await.unwrap();
        assert_eq!(expired, 1);

        assert_eq!(harness.services.offers.get(stale.id).await.unwrap().status, OfferStatus::Expired);
        assert_eq!(harness.services.offers.get(accepted.id).await.unwrap().status, OfferStatus::Accepted);
        assert_eq!(harness.services.offers.get(fresh.id).await.unwrap().status, OfferStatus::Pending);

        assert_eq!(harness.services.offers.expire_stale(harness.now()).await.unwrap(), 0);
    }
}
