use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;

use crate::domain::entities::ContentItem;
use crate::helper::error_chain_fmt;
use crate::use_cases::{SearchContentError, SearchContentUseCase};

#[derive(Debug, serde::Deserialize)]
pub struct SearchBodyData {
    pub query: String,
    pub category: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct SearchResponseData {
    pub results: Vec<ContentItem>,
    pub total: usize,
}

#[tracing::instrument(name = "Search the travel guide", skip(use_case, body))]
pub async fn search(
    use_case: web::Data<SearchContentUseCase>,
    body: web::Json<SearchBodyData>,
) -> Result<HttpResponse, SearchError> {
    let outcome = use_case
        .execute(&body.query, body.category.clone())
        .await
        .map_err(|error| match error {
            SearchContentError::InvalidQuery(ref invalid) => {
                SearchError::InvalidQuery(invalid.to_string())
            }
        })?;

    Ok(HttpResponse::Ok().json(SearchResponseData {
        results: outcome.results,
        total: outcome.total,
    }))
}

#[derive(thiserror::Error)]
pub enum SearchError {
    #[error("{0}")]
    InvalidQuery(String),
}

impl std::fmt::Debug for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SearchError {
    fn status_code(&self) -> StatusCode {
        match self {
            SearchError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        }
    }

    #[tracing::instrument(name = "Response error from search controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
