//! Underwriting Workflow Tests
//!
//! # Test Organization
//!
//! - `automatic` - Scoring-driven decisions made by `process_application`
//! - `idempotency` - Re-runs and lost create races
//! - `manual` - Reviewer decisions on referred cases
//! - `referred_queue` - Listing cases awaiting review
//! - `scoring_properties` - Invariants of the scoring and decision rules

use std::sync::Arc;

use chrono::Duration;

use core_kernel::{ApplicationId, ErrorKind, UnderwritingCaseId};
use domain_policy::underwriting::{
    can_auto_approve, determine_decision, score_risk, AUTO_APPROVED_REASON, AUTO_DECLINED_REASON,
    FLAG_AGE_OVER_80, FLAG_SMOKER,
};
use domain_policy::{
    ApplicationStatus, DecisionInput, InMemoryStore, OfferStatus, RiskFactors, UnderwritingCase,
    UwDecision, UwMethod,
};
use test_utils::*;

fn approve(reason: &str) -> DecisionInput {
    DecisionInput {
        decision: UwDecision::Approved,
        reason: reason.to_string(),
    }
}

fn decline(reason: &str) -> DecisionInput {
    DecisionInput {
        decision: UwDecision::Declined,
        reason: reason.to_string(),
    }
}

/// Harness whose case repository can be told to miss lookups or fail writes
fn harness_with_flaky_cases() -> (WorkflowHarness, Arc<FlakyCases>) {
    let mut repos = InMemoryStore::repositories();
    let cases = FlakyCases::new(repos.underwriting.clone());
    repos.underwriting = cases.clone();
    (WorkflowHarness::with_repositories(repos), cases)
}

/// Opens a case directly in storage, as another worker would have
async fn open_case_behind_the_service(harness: &WorkflowHarness, application_id: ApplicationId) -> UnderwritingCase {
    let app = harness.services.applications.get(application_id).await.unwrap();
    let factors = RiskFactors::from_application(&app);
    let score = score_risk(&factors);
    let (decision, method) = determine_decision(&factors, &score);
    let case = UnderwritingCase::automatic(app.id, factors, score, decision, method, harness.now());
    harness.repos.underwriting.create(&case).await.unwrap();
    case
}

mod automatic {
    use super::*;

    #[tokio::test]
    async fn test_low_risk_is_approved_with_offer() {
        let harness = WorkflowHarness::new();
        let app = harness.submitted_application(ApplicantFixtures::standard()).await;

        let case = harness.services.underwriting.process_application(app.id).await.unwrap();

        assert_eq!(case.decision, UwDecision::Approved);
        assert_eq!(case.method, UwMethod::Auto);
        assert_eq!(case.risk_score.score, 10);
        assert_eq!(case.decided_by, "system");
        assert_eq!(case.reason, AUTO_APPROVED_REASON);
        assert_eq!(case.decided_at, Some(TemporalFixtures::base_time()));

        let app = harness.services.applications.get(app.id).await.unwrap();
        assert_eq!(app.status, ApplicationStatus::Approved);

        let offer = harness.services.offers.get_by_application(app.id).await.unwrap();
        assert_eq!(offer.status, OfferStatus::Pending);
        assert_eq!(offer.monthly_premium, app.monthly_premium);
    }

    #[tokio::test]
    async fn test_over_80_is_declined_without_offer() {
        let harness = WorkflowHarness::new();
        let app = harness.submitted_application(ApplicantFixtures::over_80()).await;

        let case = harness.services.underwriting.process_application(app.id).await.unwrap();

        assert_eq!(case.decision, UwDecision::Declined);
        assert_eq!(case.risk_score.score, 100);
        assert_eq!(case.reason, AUTO_DECLINED_REASON);
        assert_eq!(case.decided_by, "system");

        let app = harness.services.applications.get(app.id).await.unwrap();
        assert_eq!(app.status, ApplicationStatus::Declined);
        assert_error_kind(
            harness.services.offers.get_by_application(app.id).await,
            ErrorKind::NotFound,
        );
    }

    #[tokio::test]
    async fn test_smoker_is_referred_and_left_under_review() {
        let harness = WorkflowHarness::new();
        let app = harness.submitted_application(ApplicantFixtures::smoker()).await;

        let case = harness.services.underwriting.process_application(app.id).await.unwrap();

        assert_eq!(case.decision, UwDecision::Referred);
        assert_eq!(case.risk_score.score, 35);
        assert!(case.risk_score.flags.contains(&FLAG_SMOKER.to_string()));
        assert!(case.decided_by.is_empty());
        assert!(case.decided_at.is_none());

        let app = harness.services.applications.get(app.id).await.unwrap();
        assert_eq!(app.status, ApplicationStatus::UnderReview);
        assert_error_kind(
            harness.services.offers.get_by_application(app.id).await,
            ErrorKind::NotFound,
        );
    }

    #[tokio::test]
    async fn test_draft_cannot_be_processed() {
        let harness = WorkflowHarness::new();
        let draft = harness.draft_application(ApplicantFixtures::standard()).await;

        assert_error_kind(
            harness.services.underwriting.process_application(draft.id).await,
            ErrorKind::InvalidState,
        );
        assert_error_kind(
            harness.services.underwriting.get_by_application(draft.id).await,
            ErrorKind::NotFound,
        );
    }

    #[tokio::test]
    async fn test_unknown_application_is_not_found() {
        let harness = WorkflowHarness::new();
        assert_error_kind(
            harness.services.underwriting.process_application(ApplicationId::new_v7()).await,
            ErrorKind::NotFound,
        );
    }
}

mod idempotency {
    use super::*;

    #[tokio::test]
    async fn test_existing_case_returned_unchanged() {
        let harness = WorkflowHarness::new();
        let app = harness.submitted_application(ApplicantFixtures::standard()).await;
        let existing = open_case_behind_the_service(&harness, app.id).await;

        let case = harness.services.underwriting.process_application(app.id).await.unwrap();

        assert_eq!(case.id, existing.id);
        let app = harness.services.applications.get(app.id).await.unwrap();
        assert_eq!(app.status, ApplicationStatus::Submitted);
    }

    #[tokio::test]
    async fn test_lost_create_race_returns_winner() {
        let (harness, cases) = harness_with_flaky_cases();
        let app = harness.submitted_application(ApplicantFixtures::standard()).await;
        let winner = open_case_behind_the_service(&harness, app.id).await;

        cases.plan.hide_next_lookups(1);
        let case = harness.services.underwriting.process_application(app.id).await.unwrap();

        assert_eq!(case.id, winner.id);
        // The loser does not approve or generate an offer on the winner's behalf
        assert_error_kind(
            harness.services.offers.get_by_application(app.id).await,
            ErrorKind::NotFound,
        );
    }
}

mod manual {
    use super::*;

    async fn referred_case(harness: &WorkflowHarness) -> UnderwritingCase {
        let app = harness.submitted_application(ApplicantFixtures::smoker()).await;
        harness.services.underwriting.process_application(app.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_approve_referred_case_generates_offer() {
        let harness = WorkflowHarness::new();
        let case = referred_case(&harness).await;
        harness.advance(Duration::hours(2));

        let decided = harness
            .services
            .underwriting
            .make_decision(case.id, approve("medical records reviewed"), "reviewer-7")
            .await
            .unwrap();

        assert_eq!(decided.decision, UwDecision::Approved);
        assert_eq!(decided.method, UwMethod::Manual);
        assert_eq!(decided.decided_by, "reviewer-7");
        assert_eq!(decided.reason, "medical records reviewed");
        assert_eq!(decided.decided_at, Some(TemporalFixtures::base_time() + Duration::hours(2)));

        let app = harness.services.applications.get(case.application_id).await.unwrap();
        assert_eq!(app.status, ApplicationStatus::Approved);
        let offer = harness.services.offers.get_by_application(app.id).await.unwrap();
        assert_eq!(offer.status, OfferStatus::Pending);
    }

    #[tokio::test]
    async fn test_empty_decider_defaults_to_admin() {
        let harness = WorkflowHarness::new();
        let case = referred_case(&harness).await;

        let decided = harness
            .services
            .underwriting
            .make_decision(case.id, decline("risk too high"), "")
            .await
            .unwrap();

        assert_eq!(decided.decided_by, "admin");
        let app = harness.services.applications.get(case.application_id).await.unwrap();
        assert_eq!(app.status, ApplicationStatus::Declined);
        assert_error_kind(
            harness.services.offers.get_by_application(app.id).await,
            ErrorKind::NotFound,
        );
    }

    #[tokio::test]
    async fn test_decided_case_cannot_be_redecided() {
        let harness = WorkflowHarness::new();
        let case = referred_case(&harness).await;
        harness
            .services
            .underwriting
            .make_decision(case.id, approve("ok"), "reviewer")
            .await
            .unwrap();

        assert_error_kind(
            harness.services.underwriting.make_decision(case.id, decline("changed my mind"), "reviewer").await,
            ErrorKind::InvalidState,
        );
    }

    #[tokio::test]
    async fn test_auto_approved_case_cannot_be_overridden() {
        let harness = WorkflowHarness::new();
        let app = harness.submitted_application(ApplicantFixtures::standard()).await;
        let case = harness.services.underwriting.process_application(app.id).await.unwrap();

        assert_error_kind(
            harness.services.underwriting.make_decision(case.id, decline("no"), "reviewer").await,
            ErrorKind::InvalidState,
        );
    }

    #[tokio::test]
    async fn test_only_approve_or_decline_accepted() {
        let harness = WorkflowHarness::new();
        let case = referred_case(&harness).await;

        let input = DecisionInput {
            decision: UwDecision::Referred,
            reason: "still unsure".to_string(),
        };
        assert_error_kind(
            harness.services.underwriting.make_decision(case.id, input, "reviewer").await,
            ErrorKind::Validation,
        );
        assert_error_kind(
            harness.services.underwriting.make_decision(case.id, approve("  "), "reviewer").await,
            ErrorKind::Validation,
        );
    }

    #[tokio::test]
    async fn test_unknown_case_is_not_found() {
        let harness = WorkflowHarness::new();
        assert_error_kind(
            harness
                .services
                .underwriting
                .make_decision(UnderwritingCaseId::new_v7(), approve("ok"), "reviewer")
                .await,
            ErrorKind::NotFound,
        );
    }

    #[tokio::test]
    async fn test_failed_case_write_leaves_application_under_review() {
        let (harness, cases) = harness_with_flaky_cases();
        let case = referred_case(&harness).await;

        cases.plan.fail_updates(true);
        assert_error_kind(
            harness.services.underwriting.make_decision(case.id, approve("ok"), "reviewer").await,
            ErrorKind::Unavailable,
        );

        let app = harness.services.applications.get(case.application_id).await.unwrap();
        assert_eq!(app.status, ApplicationStatus::UnderReview);
        let stored = harness.services.underwriting.get_case(case.id).await.unwrap();
        assert_eq!(stored.decision, UwDecision::Referred);
    }
}

mod referred_queue {
    use super::*;

    #[tokio::test]
    async fn test_lists_only_referred_oldest_first() {
        let harness = WorkflowHarness::new();

        let mut referred = Vec::new();
        for _ in 0..3 {
            let app = harness.submitted_application(ApplicantFixtures::smoker()).await;
            referred.push(harness.services.underwriting.process_application(app.id).await.unwrap().id);
            harness.advance(Duration::minutes(1));
        }
        let approved = harness.submitted_application(ApplicantFixtures::standard()).await;
        harness.services.underwriting.process_application(approved.id).await.unwrap();

        let listed: Vec<_> = harness
            .services
            .underwriting
            .list_referred(0)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(listed, referred);

        let limited = harness.services.underwriting.list_referred(2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, referred[0]);
    }

    #[tokio::test]
    async fn test_decided_case_leaves_queue() {
        let harness = WorkflowHarness::new();
        let app = harness.submitted_application(ApplicantFixtures::smoker()).await;
        let case = harness.services.underwriting.process_application(app.id).await.unwrap();

        harness
            .services
            .underwriting
            .make_decision(case.id, approve("ok"), "reviewer")
            .await
            .unwrap();

        assert!(harness.services.underwriting.list_referred(-5).await.unwrap().is_empty());
    }
}

mod scoring_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn age_over_80_is_declined_outright(factors in risk_factors_strategy()) {
            let score = score_risk(&factors);

            if factors.age > 80 {
                prop_assert_eq!(score.score, 100);
                prop_assert_eq!(score.flags.clone(), vec![FLAG_AGE_OVER_80.to_string()]);
                prop_assert_eq!(
                    determine_decision(&factors, &score),
                    (UwDecision::Declined, UwMethod::Auto)
                );
            } else {
                prop_assert!(!score.flags.iter().any(|f| f == FLAG_AGE_OVER_80));
            }
        }

        #[test]
        fn approvable_profiles_are_never_referred(factors in risk_factors_strategy()) {
            let score = score_risk(&factors);
            let (decision, method) = determine_decision(&factors, &score);

            if can_auto_approve(&factors, &score) || score.score <= 20 {
                prop_assert_ne!(decision, UwDecision::Referred);
            }
            prop_assert_eq!(method, UwMethod::Auto);
        }

        #[test]
        fn scoring_is_deterministic(factors in risk_factors_strategy()) {
            prop_assert_eq!(score_risk(&factors), score_risk(&factors));
        }

        #[test]
        fn scoring_never_recommends_decline_below_81(factors in risk_factors_strategy()) {
            let score = score_risk(&factors);
            prop_assert!(score.score <= 100);

            if factors.age <= 80 {
                prop_assert!(matches!(score.recommended, UwDecision::Approved | UwDecision::Referred));
            }
        }
    }
}
