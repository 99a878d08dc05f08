use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Why a student cannot access their batch's exams, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    StudentNotFound,
    NoBatchAssigned,
    BatchNotFound,
    BatchNotAssignedToPlan,
    NoSubscription,
    SubscriptionExpired,
    SubscriptionNotActive,
    PlanMismatch,
    NoExamsAssigned,
}

/// Who has to do something before the student can get in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Admin,
    Student,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remediation {
    pub actor: Actor,
    pub message: &'static str,
}

const REMEDIATIONS: [(ReasonCode, Actor, &str); 9] = [
    (
        ReasonCode::StudentNotFound,
        Actor::Admin,
        "Student account not found. Contact an administrator.",
    ),
    (
        ReasonCode::NoBatchAssigned,
        Actor::Admin,
        "You are not assigned to a batch yet. Ask an administrator to assign you to one.",
    ),
    (
        ReasonCode::BatchNotFound,
        Actor::Admin,
        "Your batch could not be found. Ask an administrator to check your batch assignment.",
    ),
    (
        ReasonCode::BatchNotAssignedToPlan,
        Actor::Admin,
        "Your batch has no subscription plan yet. Ask an administrator to assign one.",
    ),
    (
        ReasonCode::NoSubscription,
        Actor::Student,
        "You need a subscription to access exams. Purchase the plan required by your batch.",
    ),
    (
        ReasonCode::SubscriptionExpired,
        Actor::Student,
        "Your subscription has expired. Renew it to access exams again.",
    ),
    (
        ReasonCode::SubscriptionNotActive,
        Actor::Student,
        "Your subscription is not active. Renew or reactivate it to access exams.",
    ),
    (
        ReasonCode::PlanMismatch,
        Actor::Student,
        "Your subscription does not match the plan required by your batch. Subscribe to the required plan.",
    ),
    (
        ReasonCode::NoExamsAssigned,
        Actor::Admin,
        "No exams are assigned to your batch yet. Ask an administrator to assign exams.",
    ),
];

impl ReasonCode {
    pub const ALL: [ReasonCode; 9] = [
        ReasonCode::StudentNotFound,
        ReasonCode::NoBatchAssigned,
        ReasonCode::BatchNotFound,
        ReasonCode::BatchNotAssignedToPlan,
        ReasonCode::NoSubscription,
        ReasonCode::SubscriptionExpired,
        ReasonCode::SubscriptionNotActive,
        ReasonCode::PlanMismatch,
        ReasonCode::NoExamsAssigned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::StudentNotFound => "STUDENT_NOT_FOUND",
            ReasonCode::NoBatchAssigned => "NO_BATCH_ASSIGNED",
            ReasonCode::BatchNotFound => "BATCH_NOT_FOUND",
            ReasonCode::BatchNotAssignedToPlan => "BATCH_NOT_ASSIGNED_TO_PLAN",
            ReasonCode::NoSubscription => "NO_SUBSCRIPTION",
            ReasonCode::SubscriptionExpired => "SUBSCRIPTION_EXPIRED",
            ReasonCode::SubscriptionNotActive => "SUBSCRIPTION_NOT_ACTIVE",
            ReasonCode::PlanMismatch => "PLAN_MISMATCH",
            ReasonCode::NoExamsAssigned => "NO_EXAMS_ASSIGNED",
        }
    }

    pub fn remediation(&self) -> Remediation {
        // the table covers every variant, checked by tests
        REMEDIATIONS
            .iter()
            .find(|(code, _, _)| code == self)
            .map(|&(_, actor, message)| Remediation { actor, message })
            .unwrap_or(Remediation {
                actor: Actor::Admin,
                message: "Exam access is unavailable. Contact an administrator.",
            })
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_reason_has_its_own_remediation() {
        for code in ReasonCode::ALL {
            assert!(
                REMEDIATIONS.iter().any(|(c, _, _)| *c == code),
                "missing remediation for {code}"
            );
        }
        assert_eq!(REMEDIATIONS.len(), ReasonCode::ALL.len());
    }

    #[test]
    fn test_subscription_problems_are_for_the_student() {
        use ReasonCode::*;
        for code in [NoSubscription, SubscriptionExpired, SubscriptionNotActive, PlanMismatch] {
            assert_eq!(code.remediation().actor, Actor::Student, "{code}");
        }
        for code in [
            StudentNotFound,
            NoBatchAssigned,
            BatchNotFound,
            BatchNotAssignedToPlan,
            NoExamsAssigned,
        ] {
            assert_eq!(code.remediation().actor, Actor::Admin, "{code}");
        }
    }

    #[test]
    fn test_serialized_code_matches_as_str() {
        for code in ReasonCode::ALL {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, serde_json::Value::String(code.as_str().to_string()));
        }
    }
}
