use crate::database::DbPool;
use crate::eligibility::{EligibilityStore, SeaOrmEligibilityStore};
use crate::entities::{
    SubscriptionStatus, batch_assignment_entity as assignments, batch_entity as batches,
    plan_college_entity as plan_colleges, student_entity as students,
    student_subscription_entity as subs, subscription_plan_entity as plans,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::{DateTime, Months, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, IntoActiveModel, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};

/// Validity window for a new purchase. Remaining time on an unexpired
/// subscription to the same plan carries over.
pub fn subscription_window(
    now: DateTime<Utc>,
    duration_months: i32,
    carried_end: Option<DateTime<Utc>>,
) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    if duration_months <= 0 {
        return Err(AppError::ValidationError(
            "Plan duration must be positive".into(),
        ));
    }
    let base = carried_end.filter(|end| *end > now).unwrap_or(now);
    let end = base
        .checked_add_months(Months::new(duration_months as u32))
        .ok_or_else(|| AppError::ValidationError("Subscription end date out of range".into()))?;
    Ok((now, end))
}

/// A plan with no college restrictions is open to every college.
pub fn plan_allows_college(eligible_colleges: &[i64], college_id: i64) -> bool {
    eligible_colleges.is_empty() || eligible_colleges.contains(&college_id)
}

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DbPool,
    store: SeaOrmEligibilityStore,
}

/// Row lock on the student; every write to a student's subscriptions takes it first.
async fn lock_student(txn: &DatabaseTransaction, student_id: i64) -> AppResult<students::Model> {
    students::Entity::find_by_id(student_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))
}

/// Row lock on the batch; every write to a batch's plan assignments takes it first.
async fn lock_batch(txn: &DatabaseTransaction, batch_id: i64) -> AppResult<batches::Model> {
    batches::Entity::find_by_id(batch_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch not found".into()))
}

impl SubscriptionService {
    pub fn new(pool: DbPool) -> Self {
        let store = SeaOrmEligibilityStore::new(pool.clone());
        Self { pool, store }
    }

    pub async fn current_subscription(
        &self,
        student_id: i64,
    ) -> AppResult<Option<SubscriptionRecord>> {
        self.store.find_subscription(student_id).await
    }

    /// 支付验证成功后记录订阅，学生同时只保留一个 active 订阅
    pub async fn record_subscription(
        &self,
        req: RecordSubscriptionRequest,
        now: DateTime<Utc>,
    ) -> AppResult<SubscriptionRecord> {
        let payment_reference = req.payment_reference.trim().to_string();
        if payment_reference.is_empty() {
            return Err(AppError::ValidationError(
                "Payment reference is required".into(),
            ));
        }
        if req.amount_paid < 0 {
            return Err(AppError::ValidationError(
                "Amount paid cannot be negative".into(),
            ));
        }

        let txn = self.pool.begin().await?;

        lock_student(&txn, req.student_id).await?;
        let plan = plans::Entity::find_by_id(req.plan_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription plan not found".into()))?;
        if !plan.is_active {
            return Err(AppError::ValidationError(
                "Subscription plan is not active".into(),
            ));
        }

        let duplicate = subs::Entity::find()
            .filter(subs::Column::PaymentReference.eq(payment_reference.clone()))
            .one(&txn)
            .await?;
        if duplicate.is_some() {
            return Err(AppError::ValidationError(
                "Payment reference already recorded".into(),
            ));
        }

        let active = subs::Entity::find()
            .filter(subs::Column::StudentId.eq(req.student_id))
            .filter(subs::Column::Status.eq(SubscriptionStatus::Active))
            .all(&txn)
            .await?;
        let carried_end = active
            .iter()
            .filter(|s| s.plan_id == plan.id)
            .map(|s| s.end_date)
            .max();
        for previous in active {
            log::info!(
                "Cancelling subscription {} of student {} superseded by payment {}",
                previous.id,
                previous.student_id,
                payment_reference
            );
            let mut am = previous.into_active_model();
            am.status = Set(SubscriptionStatus::Cancelled);
            am.updated_at = Set(Some(now));
            am.update(&txn).await?;
        }

        let (start_date, end_date) = subscription_window(now, plan.duration_months, carried_end)?;
        let created = subs::ActiveModel {
            student_id: Set(req.student_id),
            plan_id: Set(plan.id),
            start_date: Set(start_date),
            end_date: Set(end_date),
            status: Set(SubscriptionStatus::Active),
            payment_reference: Set(payment_reference),
            amount_paid: Set(req.amount_paid),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!(
            "Recorded subscription {} for student {} on plan {} until {}",
            created.id,
            created.student_id,
            plan.id,
            created.end_date
        );
        Ok(SubscriptionRecord::from_parts(created, PlanRecord::from(plan)))
    }

    pub async fn update_subscription_status(
        &self,
        subscription_id: i64,
        status: SubscriptionStatus,
        now: DateTime<Utc>,
    ) -> AppResult<SubscriptionRecord> {
        let txn = self.pool.begin().await?;
        let student_id = subs::Entity::find_by_id(subscription_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".into()))?
            .student_id;

        // student first, then the subscription, same order as record_subscription
        lock_student(&txn, student_id).await?;
        let sub = subs::Entity::find_by_id(subscription_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription not found".into()))?;

        if !sub.status.can_transition_to(status) {
            return Err(AppError::ValidationError(format!(
                "Cannot change subscription status from {} to {}",
                sub.status, status
            )));
        }

        if status == SubscriptionStatus::Active {
            let other_active = subs::Entity::find()
                .filter(subs::Column::StudentId.eq(sub.student_id))
                .filter(subs::Column::Status.eq(SubscriptionStatus::Active))
                .filter(subs::Column::Id.ne(sub.id))
                .one(&txn)
                .await?;
            if other_active.is_some() {
                return Err(AppError::ValidationError(
                    "Student already has an active subscription".into(),
                ));
            }
        }

        let mut am = sub.into_active_model();
        am.status = Set(status);
        am.updated_at = Set(Some(now));
        let updated = am.update(&txn).await?;

        let plan = plans::Entity::find_by_id(updated.plan_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!(
                    "subscription {} references missing plan {}",
                    updated.id, updated.plan_id
                ))
            })?;
        txn.commit().await?;

        Ok(SubscriptionRecord::from_parts(updated, PlanRecord::from(plan)))
    }

    /// 批次同时只保留一个 active 套餐
    pub async fn assign_plan_to_batch(
        &self,
        batch_id: i64,
        plan_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<AssignmentRecord> {
        let txn = self.pool.begin().await?;

        let batch = lock_batch(&txn, batch_id).await?;
        let plan = plans::Entity::find_by_id(plan_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription plan not found".into()))?;
        if !plan.is_active {
            return Err(AppError::ValidationError(
                "Subscription plan is not active".into(),
            ));
        }

        let eligible_colleges: Vec<i64> = plan_colleges::Entity::find()
            .filter(plan_colleges::Column::PlanId.eq(plan.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|row| row.college_id)
            .collect();
        if !plan_allows_college(&eligible_colleges, batch.college_id) {
            return Err(AppError::ValidationError(
                "Subscription plan is not available for this batch's college".into(),
            ));
        }

        let others = assignments::Entity::find()
            .filter(assignments::Column::BatchId.eq(batch.id))
            .filter(assignments::Column::IsActive.eq(true))
            .filter(assignments::Column::PlanId.ne(plan.id))
            .all(&txn)
            .await?;
        for other in others {
            let mut am = other.into_active_model();
            am.is_active = Set(false);
            am.update(&txn).await?;
        }

        let existing = assignments::Entity::find()
            .filter(assignments::Column::BatchId.eq(batch.id))
            .filter(assignments::Column::PlanId.eq(plan.id))
            .one(&txn)
            .await?;
        let saved = match existing {
            Some(row) => {
                let mut am = row.into_active_model();
                am.is_active = Set(true);
                am.assigned_at = Set(now);
                am.update(&txn).await?
            }
            None => {
                assignments::ActiveModel {
                    batch_id: Set(batch.id),
                    plan_id: Set(plan.id),
                    is_active: Set(true),
                    assigned_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };
        txn.commit().await?;

        log::info!("Batch {} now requires plan {}", batch.id, plan.id);
        Ok(AssignmentRecord::from_parts(saved, PlanRecord::from(plan)))
    }

    pub async fn unassign_batch_plan(&self, batch_id: i64) -> AppResult<u64> {
        let txn = self.pool.begin().await?;
        lock_batch(&txn, batch_id).await?;

        let active = assignments::Entity::find()
            .filter(assignments::Column::BatchId.eq(batch_id))
            .filter(assignments::Column::IsActive.eq(true))
            .all(&txn)
            .await?;
        let mut deactivated = 0u64;
        for row in active {
            let mut am = row.into_active_model();
            am.is_active = Set(false);
            am.update(&txn).await?;
            deactivated += 1;
        }
        txn.commit().await?;
        Ok(deactivated)
    }

    /// 将已过期但仍为 active 的订阅标记为 expired
    pub async fn expire_subscriptions(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let lapsed = subs::Entity::find()
            .filter(subs::Column::Status.eq(SubscriptionStatus::Active))
            .filter(subs::Column::EndDate.lt(now))
            .all(self.pool.as_ref())
            .await?;
        let mut expired = 0u64;
        for sub in lapsed {
            let mut am = sub.into_active_model();
            am.status = Set(SubscriptionStatus::Expired);
            am.updated_at = Set(Some(now));
            am.update(self.pool.as_ref()).await?;
            expired += 1;
        }
        Ok(expired)
    }
}
