use crate::eligibility::{Actor, IneligibleDetail, ReasonCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IneligibleDebug {
    pub reason: ReasonCode,
    pub action_required_by: Actor,
    pub detail: IneligibleDetail,
}

/// Body of a 403 returned to a student who cannot access exams.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IneligibleResponse {
    pub success: bool,
    pub message: String,
    pub debug: IneligibleDebug,
}

impl IneligibleResponse {
    pub fn new(reason: ReasonCode, detail: IneligibleDetail) -> Self {
        let remediation = reason.remediation();
        Self {
            success: false,
            message: remediation.message.to_string(),
            debug: IneligibleDebug {
                reason,
                action_required_by: remediation.actor,
                detail,
            },
        }
    }
}
