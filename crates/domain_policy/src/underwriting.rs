//! Underwriting risk engine
//!
//! Scoring is a fixed rule table, deterministic and free of I/O. The
//! engine produces a [`RiskScore`] with its own recommendation, but the
//! automatic decision is taken by [`determine_decision`], which applies its
//! own rule order and does not read `RiskScore::recommended`. Both are kept
//! as they are; tests pin the combinations where they disagree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ApplicationId, UnderwritingCaseId};

use crate::application::Application;
use crate::error::PolicyError;
use crate::status::status_enum;

/// Ages strictly above this are declined outright
pub const HARD_DECLINE_AGE: u32 = 80;
/// Scores at or below this are low risk
pub const LOW_RISK_SCORE: u32 = 20;
/// Highest score that still qualifies for the auto-approve profile
pub const AUTO_APPROVE_MAX_SCORE: u32 = 30;
/// Auto-approve profile: applicant must be younger than this
pub const AUTO_APPROVE_AGE_LIMIT: u32 = 45;
/// Auto-approve profile: coverage must be below this
pub const AUTO_APPROVE_COVERAGE_LIMIT: i64 = 250_000;

/// Decided-by value for automatic decisions
pub const SYSTEM_DECIDER: &str = "system";
/// Decided-by value for manual decisions with no caller identity
pub const DEFAULT_MANUAL_DECIDER: &str = "admin";

pub const AUTO_APPROVED_REASON: &str = "Auto-approved: meets low-risk criteria";
pub const AUTO_DECLINED_REASON: &str = "Auto-declined: does not meet eligibility requirements";

pub const FLAG_AGE_OVER_80: &str = "age_over_80";
pub const FLAG_SENIOR_65_PLUS: &str = "senior_65_plus";
pub const FLAG_SENIOR: &str = "senior";
pub const FLAG_SMOKER: &str = "smoker";
pub const FLAG_HIGH_COVERAGE: &str = "high_coverage";
pub const FLAG_MEDIUM_HIGH_COVERAGE: &str = "medium_high_coverage";

status_enum! {
    /// Underwriting decision on a case
    UwDecision {
        Pending => "pending",
        Approved => "approved",
        Declined => "declined",
        /// Needs a human reviewer
        Referred => "referred",
    }
}

impl UwDecision {
    /// Returns true if the case may move from `self` to `next`
    ///
    /// pending -> {approved, declined, referred}, referred -> {approved, declined}
    pub fn can_transition_to(&self, next: UwDecision) -> bool {
        use UwDecision::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Declined)
                | (Pending, Referred)
                | (Referred, Approved)
                | (Referred, Declined)
        )
    }
}

status_enum! {
    /// How a decision was reached
    UwMethod {
        Auto => "auto",
        Manual => "manual",
    }
}

/// Scoring inputs, snapshotted when the case is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub age: u32,
    pub smoker: bool,
    pub coverage_amount: i64,
    pub term_years: u32,
}

impl RiskFactors {
    /// Snapshots the current application data
    pub fn from_application(application: &Application) -> Self {
        Self {
            age: application.applicant.age,
            smoker: application.applicant.smoker,
            coverage_amount: application.coverage_amount,
            term_years: application.term_years,
        }
    }
}

/// Output of the scoring rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    /// 0 to 100, higher is riskier
    pub score: u32,
    pub flags: Vec<String>,
    pub recommended: UwDecision,
}

/// Scores an applicant's risk
///
/// Age above 80 short-circuits to a score of 100 with a `declined`
/// recommendation. Otherwise age band, smoking and coverage band each add
/// points. A total of 20 or less recommends `approved`; anything higher
/// recommends `referred`. No score recommends `declined`.
///
/// # Example
///
/// ```rust
/// use domain_policy::underwriting::{score_risk, RiskFactors, UwDecision};
///
/// let score = score_risk(&RiskFactors { age: 35, smoker: false, coverage_amount: 150_000, term_years: 10 });
/// assert_eq!(score.score, 10);
/// assert_eq!(score.recommended, UwDecision::Approved);
/// ```
pub fn score_risk(factors: &RiskFactors) -> RiskScore {
    if factors.age > HARD_DECLINE_AGE {
        return RiskScore {
            score: 100,
            flags: vec![FLAG_AGE_OVER_80.to_string()],
            recommended: UwDecision::Declined,
        };
    }

    let mut score = 0;
    let mut flags = Vec::new();

    match factors.age {
        a if a > 65 => {
            score += 50;
            flags.push(FLAG_SENIOR_65_PLUS.to_string());
        }
        a if a > 60 => {
            score += 35;
            flags.push(FLAG_SENIOR.to_string());
        }
        a if a > 50 => score += 25,
        a if a > 40 => score += 10,
        _ => {}
    }

    if factors.smoker {
        score += 25;
        flags.push(FLAG_SMOKER.to_string());
    }

    match factors.coverage_amount {
        c if c > 500_000 => {
            score += 25;
            flags.push(FLAG_HIGH_COVERAGE.to_string());
        }
        c if c > 250_000 => {
            score += 15;
            flags.push(FLAG_MEDIUM_HIGH_COVERAGE.to_string());
        }
        c if c > 100_000 => score += 10,
        _ => {}
    }

    let recommended = if score <= LOW_RISK_SCORE {
        UwDecision::Approved
    } else {
        UwDecision::Referred
    };

    RiskScore { score, flags, recommended }
}

/// Hard stop on age, for callers that do not go through scoring
pub fn should_auto_decline(factors: &RiskFactors) -> bool {
    factors.age > HARD_DECLINE_AGE
}

/// Returns true for the young, non-smoking, moderate-coverage profile
pub fn can_auto_approve(factors: &RiskFactors, score: &RiskScore) -> bool {
    factors.age < AUTO_APPROVE_AGE_LIMIT
        && !factors.smoker
        && factors.coverage_amount < AUTO_APPROVE_COVERAGE_LIMIT
        && score.score <= AUTO_APPROVE_MAX_SCORE
}

/// Picks the automatic decision, first rule wins
///
/// 1. hard age stop: declined
/// 2. auto-approve profile: approved
/// 3. low score: approved
/// 4. otherwise: referred
///
/// The method is always [`UwMethod::Auto`].
pub fn determine_decision(factors: &RiskFactors, score: &RiskScore) -> (UwDecision, UwMethod) {
    if should_auto_decline(factors) {
        return (UwDecision::Declined, UwMethod::Auto);
    }
    if can_auto_approve(factors, score) {
        return (UwDecision::Approved, UwMethod::Auto);
    }
    if score.score <= LOW_RISK_SCORE {
        return (UwDecision::Approved, UwMethod::Auto);
    }
    (UwDecision::Referred, UwMethod::Auto)
}

/// The risk assessment record for one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderwritingCase {
    pub id: UnderwritingCaseId,
    pub application_id: ApplicationId,
    pub risk_factors: RiskFactors,
    pub risk_score: RiskScore,
    pub decision: UwDecision,
    pub method: UwMethod,
    /// `system` for automatic decisions, the reviewer otherwise; empty while undecided
    pub decided_by: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl UnderwritingCase {
    /// Opens a case with an automatic decision
    ///
    /// Approved and declined cases are stamped as decided by the system.
    /// Referred cases carry no decider, reason or decision time.
    pub fn automatic(
        application_id: ApplicationId,
        risk_factors: RiskFactors,
        risk_score: RiskScore,
        decision: UwDecision,
        method: UwMethod,
        now: DateTime<Utc>,
    ) -> Self {
        let mut case = Self {
            id: UnderwritingCaseId::new_v7(),
            application_id,
            risk_factors,
            risk_score,
            decision,
            method,
            decided_by: String::new(),
            reason: String::new(),
            created_at: now,
            updated_at: now,
            decided_at: None,
        };

        if method == UwMethod::Auto && decision != UwDecision::Referred {
            case.decided_by = SYSTEM_DECIDER.to_string();
            case.decided_at = Some(now);
            case.reason = match decision {
                UwDecision::Approved => AUTO_APPROVED_REASON.to_string(),
                _ => AUTO_DECLINED_REASON.to_string(),
            };
        }
        case
    }

    /// Records a reviewer's decision
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidStateTransition` if the case's current
    /// decision does not allow `decision`.
    pub fn decide_manually(
        &mut self,
        decision: UwDecision,
        reason: &str,
        decided_by: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        if !self.decision.can_transition_to(decision) {
            return Err(PolicyError::transition("underwriting case", self.decision, decision));
        }
        self.decision = decision;
        self.method = UwMethod::Manual;
        self.decided_by = if decided_by.trim().is_empty() {
            DEFAULT_MANUAL_DECIDER.to_string()
        } else {
            decided_by.to_string()
        };
        self.reason = reason.to_string();
        self.updated_at = now;
        self.decided_at = Some(now);
        Ok(())
    }
}

/// A reviewer's decision on a referred case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionInput {
    pub decision: UwDecision,
    pub reason: String,
}

impl DecisionInput {
    /// Only approve or decline, with a reason
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !matches!(self.decision, UwDecision::Approved | UwDecision::Declined) {
            return Err(PolicyError::validation("decision must be 'approved' or 'declined'"));
        }
        if self.reason.trim().is_empty() {
            return Err(PolicyError::validation("reason is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors(age: u32, smoker: bool, coverage_amount: i64) -> RiskFactors {
        RiskFactors { age, smoker, coverage_amount, term_years: 10 }
    }

    #[test]
    fn test_age_over_80_is_hard_stop() {
        let score = score_risk(&factors(85, true, 2_000_000));
        assert_eq!(score.score, 100);
        assert_eq!(score.flags, vec!["age_over_80".to_string()]);
        assert_eq!(score.recommended, UwDecision::Declined);
    }

    #[test]
    fn test_coverage_band_only() {
        let score = score_risk(&factors(35, false, 150_000));
        assert_eq!(score.score, 10);
        assert!(score.flags.is_empty());
        assert_eq!(score.recommended, UwDecision::Approved);
    }

    #[test]
    fn test_flags_accumulate() {
        let score = score_risk(&factors(66, true, 600_000));
        assert_eq!(score.score, 100);
        assert_eq!(score.flags, vec!["senior_65_plus", "smoker", "high_coverage"]);
        assert_eq!(score.recommended, UwDecision::Referred);

        let score = score_risk(&factors(62, false, 300_000));
        assert_eq!(score.score, 50);
        assert_eq!(score.flags, vec!["senior", "medium_high_coverage"]);
    }

    #[test]
    fn test_auto_approve_profile_alone_approves() {
        // Real scores for this profile never exceed 20, so raise it by hand
        let f = factors(44, false, 249_999);
        let mut s = score_risk(&f);
        assert_eq!(s.score, 20);
        s.score = 30;
        assert!(can_auto_approve(&f, &s));
        assert_eq!(determine_decision(&f, &s), (UwDecision::Approved, UwMethod::Auto));
    }

    #[test]
    fn test_low_score_alone_approves() {
        let f = factors(50, false, 100_000);
        let s = score_risk(&f);
        assert_eq!(s.score, 10);
        assert!(!can_auto_approve(&f, &s));
        assert_eq!(determine_decision(&f, &s), (UwDecision::Approved, UwMethod::Auto));
    }

    #[test]
    fn test_decision_ignores_engine_recommendation() {
        // The engine recommends approved, the decision agrees through rule 3;
        // flipping the recommendation does not change the outcome
        let f = factors(50, false, 100_000);
        let mut s = score_risk(&f);
        s.recommended = UwDecision::Referred;
        assert_eq!(determine_decision(&f, &s).0, UwDecision::Approved);
    }

    #[test]
    fn test_smoker_is_referred_not_declined() {
        let f = factors(35, true, 150_000);
        let s = score_risk(&f);
        assert_eq!(s.score, 35);
        assert_eq!(determine_decision(&f, &s), (UwDecision::Referred, UwMethod::Auto));
    }

    #[test]
    fn test_manual_decision_defaults_decider() {
        let now = Utc::now();
        let f = factors(55, true, 150_000);
        let s = score_risk(&f);
        let mut case = UnderwritingCase::automatic(
            ApplicationId::new_v7(), f, s, UwDecision::Referred, UwMethod::Auto, now,
        );
        assert!(case.decided_at.is_none());
        assert!(case.decided_by.is_empty());

        case.decide_manually(UwDecision::Approved, "reviewed", "", now).unwrap();
        assert_eq!(case.decided_by, "admin");
        assert_eq!(case.method, UwMethod::Manual);

        let err = case.decide_manually(UwDecision::Declined, "again", "bob", now).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_decision_input_rejects_referred() {
        let input = DecisionInput { decision: UwDecision::Referred, reason: "x".to_string() };
        assert!(input.validate().is_err());
        let input = DecisionInput { decision: UwDecision::Approved, reason: " ".to_string() };
        assert!(input.validate().is_err());
    }
}
