use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::eligibility::{Actor, Eligibility, EligibilityReport, IneligibleDetail, ReasonCode};
use crate::entities::SubscriptionStatus;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::exam::get_eligibility,
        handlers::exam::list_exams,
        handlers::subscription::get_current_subscription,
        handlers::admin::get_student_eligibility,
        handlers::admin::assign_batch_plan,
        handlers::admin::unassign_batch_plan,
        handlers::admin::record_subscription,
        handlers::admin::update_subscription_status,
    ),
    components(
        schemas(
            Eligibility,
            EligibilityReport,
            IneligibleDetail,
            ReasonCode,
            Actor,
            SubscriptionStatus,
            StudentRecord,
            BatchRecord,
            PlanRecord,
            AssignmentRecord,
            SubscriptionRecord,
            ExamRecord,
            RecordSubscriptionRequest,
            UpdateSubscriptionStatusRequest,
            AssignBatchPlanRequest,
            UnassignBatchPlanResponse,
            IneligibleResponse,
            IneligibleDebug,
            ErrorResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "exam", description = "Student exam access API"),
        (name = "subscription", description = "Student subscription API"),
        (name = "admin", description = "Eligibility diagnostics and subscription administration API"),
    ),
    info(
        title = "Exam Portal Backend API",
        version = "1.0.0",
        description = "Exam access and subscription eligibility REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
