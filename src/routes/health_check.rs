use actix_web::HttpResponse;
use serde_json::json;

#[tracing::instrument(name = "Health check handler")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[tracing::instrument(name = "Root info handler")]
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "name": "Tokyo Travel Guide API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
