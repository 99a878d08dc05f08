//! Ordered eligibility checks.
//!
//! `evaluate` is a pure function over an already-fetched [`EligibilitySnapshot`];
//! `resolve` does the fetching. The first failing check decides the outcome.

use super::outcome::{Eligibility, IneligibleDetail};
use super::reason::ReasonCode;
use super::store::EligibilityStore;
use crate::entities::SubscriptionStatus;
use crate::error::AppResult;
use crate::models::{
    AssignmentRecord, BatchRecord, ExamRecord, StudentRecord, SubscriptionRecord,
};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct EligibilitySnapshot {
    pub student: Option<StudentRecord>,
    pub batch: Option<BatchRecord>,
    pub assignment: Option<AssignmentRecord>,
    pub subscription: Option<SubscriptionRecord>,
    pub exams: Vec<ExamRecord>,
}

fn ineligible(reason: ReasonCode, detail: IneligibleDetail) -> Eligibility {
    Eligibility::Ineligible { reason, detail }
}

pub fn evaluate(
    student_id: i64,
    snapshot: EligibilitySnapshot,
    now: DateTime<Utc>,
) -> Eligibility {
    let EligibilitySnapshot {
        student,
        batch,
        assignment,
        subscription,
        exams,
    } = snapshot;

    let Some(student) = student else {
        return ineligible(
            ReasonCode::StudentNotFound,
            IneligibleDetail {
                student_id: Some(student_id),
                ..Default::default()
            },
        );
    };

    let Some(batch_id) = student.batch_id else {
        return ineligible(
            ReasonCode::NoBatchAssigned,
            IneligibleDetail {
                student_id: Some(student.id),
                ..Default::default()
            },
        );
    };

    if batch.is_none() {
        return ineligible(
            ReasonCode::BatchNotFound,
            IneligibleDetail {
                student_id: Some(student.id),
                batch_id: Some(batch_id),
                ..Default::default()
            },
        );
    }

    let Some(assignment) = assignment else {
        return ineligible(
            ReasonCode::BatchNotAssignedToPlan,
            IneligibleDetail {
                student_id: Some(student.id),
                batch_id: Some(batch_id),
                ..Default::default()
            },
        );
    };
    let required_plan = assignment.plan;

    let Some(subscription) = subscription else {
        return ineligible(
            ReasonCode::NoSubscription,
            IneligibleDetail {
                student_id: Some(student.id),
                batch_id: Some(batch_id),
                required_plan: Some(required_plan),
                ..Default::default()
            },
        );
    };

    if subscription.is_expired_at(now) {
        return ineligible(
            ReasonCode::SubscriptionExpired,
            IneligibleDetail {
                student_id: Some(student.id),
                batch_id: Some(batch_id),
                required_plan: Some(required_plan),
                subscribed_plan: Some(subscription.plan),
                subscription_status: Some(subscription.status),
                expired_at: Some(subscription.end_date),
            },
        );
    }

    if subscription.status != SubscriptionStatus::Active {
        return ineligible(
            ReasonCode::SubscriptionNotActive,
            IneligibleDetail {
                student_id: Some(student.id),
                batch_id: Some(batch_id),
                required_plan: Some(required_plan),
                subscribed_plan: Some(subscription.plan),
                subscription_status: Some(subscription.status),
                ..Default::default()
            },
        );
    }

    if subscription.plan.id != required_plan.id {
        return ineligible(
            ReasonCode::PlanMismatch,
            IneligibleDetail {
                student_id: Some(student.id),
                batch_id: Some(batch_id),
                required_plan: Some(required_plan),
                subscribed_plan: Some(subscription.plan),
                ..Default::default()
            },
        );
    }

    if exams.is_empty() {
        return ineligible(
            ReasonCode::NoExamsAssigned,
            IneligibleDetail {
                student_id: Some(student.id),
                batch_id: Some(batch_id),
                ..Default::default()
            },
        );
    }

    Eligibility::Eligible {
        plan: required_plan,
        subscription,
        exam_count: exams.len(),
        exams,
    }
}

/// Fetch everything the checks need and evaluate them at `now`.
///
/// The batch id always comes from the student record. Once it is known the
/// remaining lookups run concurrently; reporting order is decided afterwards
/// by [`evaluate`].
pub async fn resolve<S>(store: &S, student_id: i64, now: DateTime<Utc>) -> AppResult<Eligibility>
where
    S: EligibilityStore + ?Sized,
{
    let student = store.find_student_by_id(student_id).await?;
    let Some(batch_id) = student.as_ref().and_then(|s| s.batch_id) else {
        let snapshot = EligibilitySnapshot {
            student,
            ..Default::default()
        };
        return Ok(evaluate(student_id, snapshot, now));
    };

    let (batch, assignment, subscription, exams) = tokio::try_join!(
        store.find_batch_by_id(batch_id),
        store.find_active_batch_assignment(batch_id),
        store.find_subscription(student_id),
        store.find_exams_for_batch(batch_id),
    )?;

    let snapshot = EligibilitySnapshot {
        student,
        batch,
        assignment,
        subscription,
        exams,
    };
    Ok(evaluate(student_id, snapshot, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::testing::*;
    use crate::error::AppError;
    use chrono::Duration;

    const STUDENT: i64 = 1;
    const BATCH: i64 = 10;

    fn now() -> DateTime<Utc> {
        fixed_now()
    }

    /// Student 1 in batch 10, batch requires plan 100, student holds plan 100
    /// for 30 more days, one exam assigned.
    fn eligible_store() -> InMemoryStore {
        InMemoryStore::default()
            .with_student(student(STUDENT, Some(BATCH)))
            .with_batch(batch(BATCH))
            .with_assignment(assignment(1, BATCH, plan(100, "Plan X")))
            .with_subscription(subscription(
                1,
                STUDENT,
                plan(100, "Plan X"),
                SubscriptionStatus::Active,
                now() - Duration::days(1),
                now() + Duration::days(30),
            ))
            .with_exam(exam(1000, "Algebra Midterm"), &[BATCH])
    }

    async fn reason_for(store: &InMemoryStore) -> Option<ReasonCode> {
        resolve(store, STUDENT, now()).await.unwrap().reason()
    }

    #[tokio::test]
    async fn test_full_success() {
        let outcome = resolve(&eligible_store(), STUDENT, now()).await.unwrap();
        match outcome {
            Eligibility::Eligible {
                plan,
                subscription,
                exam_count,
                exams,
            } => {
                assert_eq!(plan.id, 100);
                assert_eq!(subscription.id, 1);
                assert!(exam_count >= 1);
                assert_eq!(exams[0].id, 1000);
            }
            other => panic!("expected eligible, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_student_not_found() {
        let outcome = resolve(&eligible_store(), 999, now()).await.unwrap();
        assert_eq!(outcome.reason(), Some(ReasonCode::StudentNotFound));
        let Eligibility::Ineligible { detail, .. } = outcome else {
            unreachable!()
        };
        assert_eq!(detail.student_id, Some(999));
    }

    #[tokio::test]
    async fn test_no_batch_wins_over_any_subscription_state() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::Expired,
            SubscriptionStatus::Suspended,
            SubscriptionStatus::Cancelled,
        ] {
            let store = InMemoryStore::default()
                .with_student(student(STUDENT, None))
                .with_subscription(subscription(
                    1,
                    STUDENT,
                    plan(100, "Plan X"),
                    status,
                    now() - Duration::days(1),
                    now() + Duration::days(30),
                ));
            assert_eq!(reason_for(&store).await, Some(ReasonCode::NoBatchAssigned));
        }
    }

    #[tokio::test]
    async fn test_missing_batch_record() {
        let mut store = eligible_store();
        store.batches.clear();
        assert_eq!(reason_for(&store).await, Some(ReasonCode::BatchNotFound));
    }

    #[tokio::test]
    async fn test_batch_without_plan_despite_active_subscription() {
        let mut store = eligible_store();
        store.assignments.clear();
        let outcome = resolve(&store, STUDENT, now()).await.unwrap();
        let Eligibility::Ineligible { reason, detail } = outcome else {
            panic!("expected ineligible");
        };
        assert_eq!(reason, ReasonCode::BatchNotAssignedToPlan);
        assert_eq!(detail.required_plan, None);
    }

    #[tokio::test]
    async fn test_inactive_assignment_is_ignored() {
        let mut store = eligible_store();
        store.assignments[0].is_active = false;
        assert_eq!(
            reason_for(&store).await,
            Some(ReasonCode::BatchNotAssignedToPlan)
        );
    }

    #[tokio::test]
    async fn test_no_subscription_carries_required_plan() {
        let mut store = eligible_store();
        store.subscriptions.clear();
        let outcome = resolve(&store, STUDENT, now()).await.unwrap();
        let Eligibility::Ineligible { reason, detail } = outcome else {
            panic!("expected ineligible");
        };
        assert_eq!(reason, ReasonCode::NoSubscription);
        assert_eq!(detail.required_plan.map(|p| p.name), Some("Plan X".into()));
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let mut store = eligible_store();
        store.subscriptions[0].end_date = now();
        assert!(resolve(&store, STUDENT, now()).await.unwrap().is_eligible());

        store.subscriptions[0].end_date = now() - Duration::milliseconds(1);
        assert_eq!(
            reason_for(&store).await,
            Some(ReasonCode::SubscriptionExpired)
        );
    }

    #[tokio::test]
    async fn test_expired_reported_before_status() {
        let mut store = eligible_store();
        store.subscriptions[0].status = SubscriptionStatus::Suspended;
        store.subscriptions[0].end_date = now() - Duration::days(2);
        assert_eq!(
            reason_for(&store).await,
            Some(ReasonCode::SubscriptionExpired)
        );
    }

    #[tokio::test]
    async fn test_not_active_reports_status() {
        let mut store = eligible_store();
        store.subscriptions[0].status = SubscriptionStatus::Suspended;
        let outcome = resolve(&store, STUDENT, now()).await.unwrap();
        let Eligibility::Ineligible { reason, detail } = outcome else {
            panic!("expected ineligible");
        };
        assert_eq!(reason, ReasonCode::SubscriptionNotActive);
        assert_eq!(detail.subscription_status, Some(SubscriptionStatus::Suspended));
    }

    #[tokio::test]
    async fn test_plan_mismatch_names_both_plans() {
        let mut store = eligible_store();
        store.subscriptions[0].plan = plan(200, "Plan A");
        let outcome = resolve(&store, STUDENT, now()).await.unwrap();
        let Eligibility::Ineligible { reason, detail } = outcome else {
            panic!("expected ineligible");
        };
        assert_eq!(reason, ReasonCode::PlanMismatch);
        assert_eq!(detail.required_plan.unwrap().name, "Plan X");
        assert_eq!(detail.subscribed_plan.unwrap().name, "Plan A");
    }

    #[tokio::test]
    async fn test_no_exams_assigned() {
        let mut store = eligible_store();
        store.exams.clear();
        assert_eq!(reason_for(&store).await, Some(ReasonCode::NoExamsAssigned));
    }

    #[tokio::test]
    async fn test_exams_of_other_batches_do_not_count() {
        let mut store = eligible_store();
        store.exams.clear();
        let store = store.with_exam(exam(2000, "Other"), &[BATCH + 1]);
        assert_eq!(reason_for(&store).await, Some(ReasonCode::NoExamsAssigned));
    }

    #[tokio::test]
    async fn test_first_failing_check_wins() {
        let mut store = eligible_store();
        store.subscriptions.clear();
        store.exams.clear();
        assert_eq!(reason_for(&store).await, Some(ReasonCode::NoSubscription));
    }

    #[tokio::test]
    async fn test_idempotent() {
        let store = eligible_store();
        let first = resolve(&store, STUDENT, now()).await.unwrap();
        let second = resolve(&store, STUDENT, now()).await.unwrap();
        assert_eq!(first, second);

        let mut store = store;
        store.subscriptions[0].plan = plan(200, "Plan A");
        let first = resolve(&store, STUDENT, now()).await.unwrap();
        let second = resolve(&store, STUDENT, now()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_batch_comes_from_student_record() {
        // another batch with a plan and exams must not leak into the check
        let store = eligible_store()
            .with_batch(batch(BATCH + 1))
            .with_exam(exam(3000, "Other batch exam"), &[BATCH + 1]);
        let outcome = resolve(&store, STUDENT, now()).await.unwrap();
        let Eligibility::Eligible { exams, .. } = outcome else {
            panic!("expected eligible");
        };
        assert!(exams.iter().all(|e| e.id != 3000));
    }

    #[tokio::test]
    async fn test_storage_failure_is_an_error_not_ineligible() {
        let store = eligible_store().failing();
        let err = resolve(&store, STUDENT, now()).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[test]
    fn test_evaluate_empty_snapshot() {
        let outcome = evaluate(5, EligibilitySnapshot::default(), now());
        assert_eq!(outcome.reason(), Some(ReasonCode::StudentNotFound));
    }
}
