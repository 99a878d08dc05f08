use actix_cors::Cors;
use actix_web::http::header;

/// CORS for the API. An empty allow-list accepts any origin.
pub fn create_cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if allowed_origins.is_empty() {
        return cors.allow_any_origin();
    }
    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;
    use actix_web::{App, HttpResponse, web};

    async fn origin_header(allowed: &[String], origin: &str) -> Option<String> {
        let app = actix_test::init_service(
            App::new()
                .wrap(create_cors(allowed))
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;
        let req = actix_test::TestRequest::get()
            .uri("/ping")
            .insert_header((header::ORIGIN, origin))
            .to_request();
        match actix_test::try_call_service(&app, req).await {
            Ok(resp) => resp
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            Err(_) => None,
        }
    }

    #[actix_web::test]
    async fn test_allow_list_is_enforced() {
        let allowed = vec!["https://portal.example.com".to_string()];
        assert_eq!(
            origin_header(&allowed, "https://portal.example.com").await,
            Some("https://portal.example.com".to_string())
        );
        assert_eq!(origin_header(&allowed, "https://evil.example.com").await, None);
    }

    #[actix_web::test]
    async fn test_empty_allow_list_accepts_any_origin() {
        assert!(origin_header(&[], "https://anywhere.example.com").await.is_some());
    }
}
