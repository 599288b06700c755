use actix_web::HttpResponse;
use serde_json::json;

use crate::domain::services::suggestions::SUGGESTED_QUESTIONS;

/// Static starter questions for an empty chat widget. No model involved.
#[tracing::instrument(name = "List suggested questions")]
pub async fn suggestions() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "suggestions": SUGGESTED_QUESTIONS }))
}
