//! Read-side records consumed by the eligibility resolver.
//!
//! These are storage-agnostic snapshots of the entity rows; the sea-orm store
//! converts into them and tests build them directly.

use crate::entities::{
    SubscriptionStatus, batch_assignment_entity as assignments, batch_entity as batches,
    exam_entity as exams, student_entity as students, student_subscription_entity as subs,
    subscription_plan_entity as plans,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentRecord {
    pub id: i64,
    pub name: String,
    pub batch_id: Option<i64>,
    pub is_blocked: bool,
}

impl From<students::Model> for StudentRecord {
    fn from(m: students::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            batch_id: m.batch_id,
            is_blocked: m.is_blocked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchRecord {
    pub id: i64,
    pub name: String,
    pub college_id: i64,
    pub is_active: bool,
}

impl From<batches::Model> for BatchRecord {
    fn from(m: batches::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            college_id: m.college_id,
            is_active: m.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlanRecord {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub duration_months: i32,
}

impl From<plans::Model> for PlanRecord {
    fn from(m: plans::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            price: m.price,
            duration_months: m.duration_months,
        }
    }
}

/// An active batch-to-plan assignment together with the plan it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssignmentRecord {
    pub id: i64,
    pub batch_id: i64,
    pub plan: PlanRecord,
    pub is_active: bool,
    pub assigned_at: DateTime<Utc>,
}

impl AssignmentRecord {
    pub fn from_parts(m: assignments::Model, plan: PlanRecord) -> Self {
        Self {
            id: m.id,
            batch_id: m.batch_id,
            plan,
            is_active: m.is_active,
            assigned_at: m.assigned_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionRecord {
    pub id: i64,
    pub student_id: i64,
    pub plan: PlanRecord,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub payment_reference: String,
    pub amount_paid: i64,
}

impl SubscriptionRecord {
    pub fn from_parts(m: subs::Model, plan: PlanRecord) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            plan,
            start_date: m.start_date,
            end_date: m.end_date,
            status: m.status,
            payment_reference: m.payment_reference,
            amount_paid: m.amount_paid,
        }
    }

    /// Strictly after `end_date`; a subscription ending exactly at `now` is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExamRecord {
    pub id: i64,
    pub title: String,
    pub subject: Option<String>,
    pub duration_minutes: i32,
    pub is_published: bool,
}

impl From<exams::Model> for ExamRecord {
    fn from(m: exams::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            subject: m.subject,
            duration_minutes: m.duration_minutes,
            is_published: m.is_published,
        }
    }
}
