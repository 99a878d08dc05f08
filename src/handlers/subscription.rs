use crate::middlewares::require_student;
use crate::services::SubscriptionService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/subscriptions/current",
    tag = "subscription",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current subscription, or null when the student has none", body = SubscriptionRecord),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match require_student(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.current_subscription(user.user_id).await {
        Ok(subscription) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": subscription
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions").route("/current", web::get().to(get_current_subscription)),
    );
}
