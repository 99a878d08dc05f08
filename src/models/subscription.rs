use crate::entities::SubscriptionStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sent by the payment-verification flow once a purchase is confirmed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordSubscriptionRequest {
    pub student_id: i64,
    pub plan_id: i64,
    pub payment_reference: String,
    /// minor currency units
    pub amount_paid: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateSubscriptionStatusRequest {
    pub status: SubscriptionStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignBatchPlanRequest {
    pub plan_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnassignBatchPlanResponse {
    pub batch_id: i64,
    pub deactivated: u64,
}
