use crate::middlewares::require_admin;
use crate::models::*;
use crate::services::{EligibilityService, SubscriptionService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/admin/students/{student_id}/eligibility",
    tag = "admin",
    params(("student_id" = i64, Path, description = "Student id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Eligibility diagnostic", body = EligibilityReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn get_student_eligibility(
    eligibility_service: web::Data<EligibilityService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match eligibility_service.report(path.into_inner()).await {
        Ok(report) => {
            let message = report.message.clone();
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "message": message,
                "data": report
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/batches/{batch_id}/subscription-plan",
    tag = "admin",
    params(("batch_id" = i64, Path, description = "Batch id")),
    request_body = AssignBatchPlanRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plan assigned; other plans of the batch deactivated", body = AssignmentRecord),
        (status = 400, description = "Plan inactive or not available to the batch's college"),
        (status = 404, description = "Batch or plan not found")
    )
)]
pub async fn assign_batch_plan(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AssignBatchPlanRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match subscription_service
        .assign_plan_to_batch(path.into_inner(), request.plan_id, Utc::now())
        .await
    {
        Ok(assignment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": assignment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/batches/{batch_id}/subscription-plan",
    tag = "admin",
    params(("batch_id" = i64, Path, description = "Batch id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Batch plan assignments deactivated", body = UnassignBatchPlanResponse),
        (status = 404, description = "Batch not found")
    )
)]
pub async fn unassign_batch_plan(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    let batch_id = path.into_inner();
    match subscription_service.unassign_batch_plan(batch_id).await {
        Ok(deactivated) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": UnassignBatchPlanResponse { batch_id, deactivated }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/subscriptions",
    tag = "admin",
    request_body = RecordSubscriptionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscription recorded; previous active subscriptions cancelled", body = SubscriptionRecord),
        (status = 400, description = "Invalid payment or inactive plan"),
        (status = 404, description = "Student or plan not found")
    )
)]
pub async fn record_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    request: web::Json<RecordSubscriptionRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match subscription_service
        .record_subscription(request.into_inner(), Utc::now())
        .await
    {
        Ok(subscription) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": subscription
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/subscriptions/{subscription_id}/status",
    tag = "admin",
    params(("subscription_id" = i64, Path, description = "Subscription id")),
    request_body = UpdateSubscriptionStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status changed", body = SubscriptionRecord),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Subscription not found")
    )
)]
pub async fn update_subscription_status(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateSubscriptionStatusRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match subscription_service
        .update_subscription_status(path.into_inner(), request.status, Utc::now())
        .await
    {
        Ok(subscription) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": subscription
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route(
                "/students/{student_id}/eligibility",
                web::get().to(get_student_eligibility),
            )
            .route(
                "/batches/{batch_id}/subscription-plan",
                web::put().to(assign_batch_plan),
            )
            .route(
                "/batches/{batch_id}/subscription-plan",
                web::delete().to(unassign_batch_plan),
            )
            .route("/subscriptions", web::post().to(record_subscription))
            .route(
                "/subscriptions/{subscription_id}/status",
                web::put().to(update_subscription_status),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::testing::*;
    use crate::middlewares::AuthMiddleware;
    use crate::utils::{JwtService, UserRole};
    use actix_web::http::StatusCode;
    use actix_web::App;
    use actix_web::test as actix_test;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::Value;
    use std::sync::Arc;

    async fn call(
        method: actix_web::http::Method,
        uri: &str,
        role: UserRole,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let jwt = JwtService::new("test-secret", 3600);
        let token = jwt.generate_access_token(99, role).unwrap();
        let store = InMemoryStore::default()
            .with_student(student(1, Some(10)))
            .with_batch(batch(10));
        let eligibility = EligibilityService::new(Arc::new(store));
        // no queries are expected to reach the database in these tests
        let subscriptions = SubscriptionService::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt))
                .app_data(web::Data::new(eligibility))
                .app_data(web::Data::new(subscriptions))
                .service(web::scope("/api/v1").configure(admin_config)),
        )
        .await;

        let mut req = actix_test::TestRequest::default()
            .method(method)
            .uri(uri)
            .insert_header(("Authorization", format!("Bearer {token}")));
        if let Some(body) = body {
            req = req.set_json(body);
        }
        let resp = actix_test::call_service(&app, req.to_request()).await;
        let status = resp.status();
        let body: Value = actix_test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_admin_sees_diagnostic_with_200() {
        let (status, body) = call(
            actix_web::http::Method::GET,
            "/api/v1/admin/students/1/eligibility",
            UserRole::Admin,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["eligible"], false);
        assert_eq!(body["data"]["reason"], "BATCH_NOT_ASSIGNED_TO_PLAN");
        assert_eq!(body["data"]["action_required_by"], "admin");
        assert_eq!(body["data"]["outcome"]["status"], "ineligible");
    }

    #[actix_web::test]
    async fn test_unknown_student_diagnostic() {
        let (status, body) = call(
            actix_web::http::Method::GET,
            "/api/v1/admin/students/404/eligibility",
            UserRole::Admin,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["reason"], "STUDENT_NOT_FOUND");
    }

    #[actix_web::test]
    async fn test_students_cannot_use_admin_endpoints() {
        let (status, body) = call(
            actix_web::http::Method::GET,
            "/api/v1/admin/students/1/eligibility",
            UserRole::Student,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");

        let (status, _) = call(
            actix_web::http::Method::POST,
            "/api/v1/admin/subscriptions",
            UserRole::Student,
            Some(serde_json::json!({
                "student_id": 1,
                "plan_id": 100,
                "payment_reference": "pay_1",
                "amount_paid": 49900
            })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            actix_web::http::Method::PUT,
            "/api/v1/admin/batches/10/subscription-plan",
            UserRole::Student,
            Some(serde_json::json!({ "plan_id": 100 })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
