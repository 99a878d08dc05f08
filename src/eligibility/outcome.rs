use super::reason::{Actor, ReasonCode};
use crate::entities::SubscriptionStatus;
use crate::models::{ExamRecord, PlanRecord, SubscriptionRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of one eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Eligibility {
    Eligible {
        plan: PlanRecord,
        subscription: SubscriptionRecord,
        exam_count: usize,
        exams: Vec<ExamRecord>,
    },
    Ineligible {
        reason: ReasonCode,
        detail: IneligibleDetail,
    },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible { .. })
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            Eligibility::Eligible { .. } => None,
            Eligibility::Ineligible { reason, .. } => Some(*reason),
        }
    }
}

/// Context for an ineligible outcome. Only the fields relevant to the reason are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IneligibleDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_plan: Option<PlanRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed_plan: Option<PlanRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,
}

/// Admin-facing diagnostic wrapping an outcome with its remediation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EligibilityReport {
    pub student_id: i64,
    pub checked_at: DateTime<Utc>,
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_required_by: Option<Actor>,
    pub message: String,
    pub outcome: Eligibility,
}

impl EligibilityReport {
    pub fn new(student_id: i64, checked_at: DateTime<Utc>, outcome: Eligibility) -> Self {
        let (reason, action_required_by, message) = match outcome.reason() {
            Some(reason) => {
                let remediation = reason.remediation();
                (
                    Some(reason),
                    Some(remediation.actor),
                    remediation.message.to_string(),
                )
            }
            None => (None, None, "Exam access granted".to_string()),
        };
        Self {
            student_id,
            checked_at,
            eligible: outcome.is_eligible(),
            reason,
            action_required_by,
            message,
            outcome,
        }
    }
}
