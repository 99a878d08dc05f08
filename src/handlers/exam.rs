use crate::eligibility::{Eligibility, IneligibleDetail, ReasonCode};
use crate::middlewares::require_student;
use crate::models::IneligibleResponse;
use crate::services::EligibilityService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn ineligible_response(reason: ReasonCode, detail: IneligibleDetail) -> HttpResponse {
    HttpResponse::Forbidden().json(IneligibleResponse::new(reason, detail))
}

#[utoipa::path(
    get,
    path = "/exams/eligibility",
    tag = "exam",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Student may access exams"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not eligible; `debug.reason` holds the reason code", body = IneligibleResponse),
        (status = 500, description = "Eligibility could not be determined", body = ErrorResponse)
    )
)]
pub async fn get_eligibility(
    eligibility_service: web::Data<EligibilityService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match require_student(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match eligibility_service.check_student(user.user_id).await {
        Ok(Eligibility::Eligible {
            plan,
            subscription,
            exam_count,
            ..
        }) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Exam access granted",
            "data": {
                "plan": plan,
                "subscription": subscription,
                "exam_count": exam_count
            }
        }))),
        Ok(Eligibility::Ineligible { reason, detail }) => Ok(ineligible_response(reason, detail)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/exams",
    tag = "exam",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Exams assigned to the student's batch"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not eligible; `debug.reason` holds the reason code", body = IneligibleResponse)
    )
)]
pub async fn list_exams(
    eligibility_service: web::Data<EligibilityService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match require_student(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match eligibility_service.check_student(user.user_id).await {
        Ok(Eligibility::Eligible {
            exams, exam_count, ..
        }) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Exams loaded",
            "data": {
                "exams": exams,
                "total": exam_count
            }
        }))),
        Ok(Eligibility::Ineligible { reason, detail }) => Ok(ineligible_response(reason, detail)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn exam_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/exams")
            .route("", web::get().to(list_exams))
            .route("/eligibility", web::get().to(get_eligibility)),
    );
}
