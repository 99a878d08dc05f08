//! In-memory [`EligibilityStore`] and record builders for tests.

use super::store::{EligibilityStore, pick_current_subscription};
use crate::database::DbPool;
use crate::entities::{
    SubscriptionStatus, batch_assignment_entity as assignments, batch_entity as batches,
    student_entity as students, student_subscription_entity as subs,
    subscription_plan_entity as plans,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AssignmentRecord, BatchRecord, ExamRecord, PlanRecord, StudentRecord, SubscriptionRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub students: Vec<StudentRecord>,
    pub batches: Vec<BatchRecord>,
    pub assignments: Vec<AssignmentRecord>,
    pub subscriptions: Vec<SubscriptionRecord>,
    /// exam plus the batches it is assigned to
    pub exams: Vec<(ExamRecord, Vec<i64>)>,
    pub fail: bool,
}

impl InMemoryStore {
    pub fn with_student(mut self, s: StudentRecord) -> Self {
        self.students.push(s);
        self
    }

    pub fn with_batch(mut self, b: BatchRecord) -> Self {
        self.batches.push(b);
        self
    }

    pub fn with_assignment(mut self, a: AssignmentRecord) -> Self {
        self.assignments.push(a);
        self
    }

    pub fn with_subscription(mut self, s: SubscriptionRecord) -> Self {
        self.subscriptions.push(s);
        self
    }

    pub fn with_exam(mut self, e: ExamRecord, batch_ids: &[i64]) -> Self {
        self.exams.push((e, batch_ids.to_vec()));
        self
    }

    /// Every lookup returns a database error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn check(&self) -> AppResult<()> {
        if self.fail {
            return Err(AppError::DatabaseError(sea_orm::DbErr::Custom(
                "storage unavailable".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EligibilityStore for InMemoryStore {
    async fn find_student_by_id(&self, student_id: i64) -> AppResult<Option<StudentRecord>> {
        self.check()?;
        Ok(self.students.iter().find(|s| s.id == student_id).cloned())
    }

    async fn find_batch_by_id(&self, batch_id: i64) -> AppResult<Option<BatchRecord>> {
        self.check()?;
        Ok(self.batches.iter().find(|b| b.id == batch_id).cloned())
    }

    async fn find_active_batch_assignment(
        &self,
        batch_id: i64,
    ) -> AppResult<Option<AssignmentRecord>> {
        self.check()?;
        Ok(self
            .assignments
            .iter()
            .filter(|a| a.batch_id == batch_id && a.is_active)
            .max_by_key(|a| (a.assigned_at, a.id))
            .cloned())
    }

    async fn find_subscription(&self, student_id: i64) -> AppResult<Option<SubscriptionRecord>> {
        self.check()?;
        Ok(pick_current_subscription(
            self.subscriptions
                .iter()
                .filter(|s| s.student_id == student_id)
                .cloned(),
        ))
    }

    async fn find_exams_for_batch(&self, batch_id: i64) -> AppResult<Vec<ExamRecord>> {
        self.check()?;
        Ok(self
            .exams
            .iter()
            .filter(|(_, batches)| batches.contains(&batch_id))
            .map(|(e, _)| e.clone())
            .collect())
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
}

pub fn student(id: i64, batch_id: Option<i64>) -> StudentRecord {
    StudentRecord {
        id,
        name: format!("Student {id}"),
        batch_id,
        is_blocked: false,
    }
}

pub fn batch(id: i64) -> BatchRecord {
    BatchRecord {
        id,
        name: format!("Batch {id}"),
        college_id: 3,
        is_active: true,
    }
}

pub fn plan(id: i64, name: &str) -> PlanRecord {
    PlanRecord {
        id,
        name: name.to_string(),
        price: 49_900,
        duration_months: 6,
    }
}

pub fn assignment(id: i64, batch_id: i64, plan: PlanRecord) -> AssignmentRecord {
    AssignmentRecord {
        id,
        batch_id,
        plan,
        is_active: true,
        assigned_at: fixed_now() - chrono::Duration::days(60),
    }
}

pub fn subscription(
    id: i64,
    student_id: i64,
    plan: PlanRecord,
    status: SubscriptionStatus,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> SubscriptionRecord {
    SubscriptionRecord {
        id,
        student_id,
        plan,
        start_date,
        end_date,
        status,
        payment_reference: format!("pay_{id}"),
        amount_paid: 49_900,
    }
}

pub fn exam(id: i64, title: &str) -> ExamRecord {
    ExamRecord {
        id,
        title: title.to_string(),
        subject: Some("Mathematics".to_string()),
        duration_minutes: 90,
        is_published: true,
    }
}

pub fn student_model(id: i64, batch_id: Option<i64>) -> students::Model {
    students::Model {
        id,
        name: format!("Student {id}"),
        email: format!("student{id}@example.com"),
        batch_id,
        is_blocked: false,
        created_at: None,
        updated_at: None,
    }
}

pub fn batch_model(id: i64, college_id: i64) -> batches::Model {
    batches::Model {
        id,
        name: format!("Batch {id}"),
        college_id,
        subject: None,
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

pub fn plan_model(id: i64, duration_months: i32, is_active: bool) -> plans::Model {
    plans::Model {
        id,
        name: format!("Plan {id}"),
        price: 49_900,
        duration_months,
        is_active,
        is_default: false,
        created_at: None,
        updated_at: None,
    }
}

pub fn assignment_model(
    id: i64,
    batch_id: i64,
    plan_id: i64,
    is_active: bool,
) -> assignments::Model {
    assignments::Model {
        id,
        batch_id,
        plan_id,
        is_active,
        assigned_at: fixed_now() - chrono::Duration::days(60),
    }
}

pub fn subscription_model(
    id: i64,
    student_id: i64,
    plan_id: i64,
    status: SubscriptionStatus,
    end_date: DateTime<Utc>,
) -> subs::Model {
    subs::Model {
        id,
        student_id,
        plan_id,
        start_date: end_date - chrono::Duration::days(180),
        end_date,
        status,
        payment_reference: format!("pay_{id}"),
        amount_paid: 49_900,
        created_at: None,
        updated_at: None,
    }
}

/// Every statement a mock connection received, with string quotes unescaped.
/// All other handles to the connection must be dropped first.
pub fn sql_log(db: DbPool) -> String {
    let log = Arc::try_unwrap(db)
        .ok()
        .expect("mock connection is still shared")
        .into_transaction_log();
    format!("{log:?}").replace("\\\"", "\"")
}
