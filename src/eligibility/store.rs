use crate::entities::{
    SubscriptionStatus, batch_assignment_entity as assignments, batch_entity as batches,
    exam_batch_entity as exam_batches, exam_entity as exams, student_entity as students,
    student_subscription_entity as subs, subscription_plan_entity as plans,
};
use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    AssignmentRecord, BatchRecord, ExamRecord, PlanRecord, StudentRecord, SubscriptionRecord,
};
use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

/// Read-only lookups the eligibility checks depend on.
///
/// A miss is `Ok(None)` / an empty list; `Err` is reserved for storage faults.
#[async_trait]
pub trait EligibilityStore: Send + Sync {
    async fn find_student_by_id(&self, student_id: i64) -> AppResult<Option<StudentRecord>>;

    async fn find_batch_by_id(&self, batch_id: i64) -> AppResult<Option<BatchRecord>>;

    /// The most recently assigned active plan for the batch.
    async fn find_active_batch_assignment(
        &self,
        batch_id: i64,
    ) -> AppResult<Option<AssignmentRecord>>;

    /// The student's current subscription, see [`pick_current_subscription`].
    async fn find_subscription(&self, student_id: i64) -> AppResult<Option<SubscriptionRecord>>;

    async fn find_exams_for_batch(&self, batch_id: i64) -> AppResult<Vec<ExamRecord>>;
}

/// Choose the subscription that counts when a student has several records:
/// an active one first, then the latest `start_date`, then the highest id.
pub fn pick_current_subscription<I>(records: I) -> Option<SubscriptionRecord>
where
    I: IntoIterator<Item = SubscriptionRecord>,
{
    records
        .into_iter()
        .max_by_key(|s| (s.status == SubscriptionStatus::Active, s.start_date, s.id))
}

#[derive(Clone)]
pub struct SeaOrmEligibilityStore {
    pool: DbPool,
}

impl SeaOrmEligibilityStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn missing_plan(kind: &str, id: i64, plan_id: i64) -> AppError {
    AppError::InternalError(format!("{kind} {id} references missing plan {plan_id}"))
}

#[async_trait]
impl EligibilityStore for SeaOrmEligibilityStore {
    async fn find_student_by_id(&self, student_id: i64) -> AppResult<Option<StudentRecord>> {
        let student = students::Entity::find_by_id(student_id)
            .one(self.pool.as_ref())
            .await?;
        Ok(student.map(StudentRecord::from))
    }

    async fn find_batch_by_id(&self, batch_id: i64) -> AppResult<Option<BatchRecord>> {
        let batch = batches::Entity::find_by_id(batch_id)
            .one(self.pool.as_ref())
            .await?;
        Ok(batch.map(BatchRecord::from))
    }

    async fn find_active_batch_assignment(
        &self,
        batch_id: i64,
    ) -> AppResult<Option<AssignmentRecord>> {
        let row = assignments::Entity::find()
            .filter(assignments::Column::BatchId.eq(batch_id))
            .filter(assignments::Column::IsActive.eq(true))
            .order_by_desc(assignments::Column::AssignedAt)
            .order_by_desc(assignments::Column::Id)
            .find_also_related(plans::Entity)
            .one(self.pool.as_ref())
            .await?;

        match row {
            None => Ok(None),
            Some((assignment, Some(plan))) => Ok(Some(AssignmentRecord::from_parts(
                assignment,
                PlanRecord::from(plan),
            ))),
            Some((assignment, None)) => Err(missing_plan(
                "batch assignment",
                assignment.id,
                assignment.plan_id,
            )),
        }
    }

    async fn find_subscription(&self, student_id: i64) -> AppResult<Option<SubscriptionRecord>> {
        let rows = subs::Entity::find()
            .filter(subs::Column::StudentId.eq(student_id))
            .find_also_related(plans::Entity)
            .all(self.pool.as_ref())
            .await?;

        let records = rows
            .into_iter()
            .map(|(sub, plan)| match plan {
                Some(plan) => Ok(SubscriptionRecord::from_parts(sub, PlanRecord::from(plan))),
                None => Err(missing_plan("subscription", sub.id, sub.plan_id)),
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(pick_current_subscription(records))
    }

    async fn find_exams_for_batch(&self, batch_id: i64) -> AppResult<Vec<ExamRecord>> {
        let list = exams::Entity::find()
            .inner_join(exam_batches::Entity)
            .filter(exam_batches::Column::BatchId.eq(batch_id))
            .order_by_asc(exams::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        Ok(list.into_iter().map(ExamRecord::from).collect())
    }
}
