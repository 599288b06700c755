use actix_web::{web, HttpResponse};
use tracing::{error, info};

use crate::domain::entities::{Category, ContentItem};
use crate::ports::ContentStore;
use crate::repositories::ContentPostgresRepository;

#[derive(Debug, serde::Serialize)]
pub struct SectionsResponseData {
    pub categories: Vec<CategoryData>,
}

#[derive(Debug, serde::Serialize)]
pub struct CategoryData {
    pub category: String,
    pub label_hebrew: String,
    pub count: i64,
    pub icon: String,
}

/// Lists the guide categories that currently hold content, with their Hebrew
/// label, icon and item count. A store failure renders an empty list: the
/// frontend treats it as "nothing to browse yet".
#[tracing::instrument(name = "List the guide sections", skip(content_repository))]
pub async fn sections(content_repository: web::Data<ContentPostgresRepository>) -> HttpResponse {
    let counts = match content_repository.list_categories().await {
        Ok(counts) => counts,
        Err(error) => {
            error!(?error, "Failed to count the knowledge base categories");
            Vec::new()
        }
    };

    let categories = counts
        .iter()
        .map(|entry| {
            let (label_hebrew, icon) = Category::display_meta(&entry.category);
            CategoryData {
                category: entry.category.clone(),
                label_hebrew,
                count: entry.count,
                icon,
            }
        })
        .collect();

    HttpResponse::Ok().json(SectionsResponseData { categories })
}

/// Lists the content of one category. An unknown category name is not an
/// error: it renders an empty list, like a known category with no content.
#[tracing::instrument(name = "List a guide section", skip(content_repository))]
pub async fn section_items(
    content_repository: web::Data<ContentPostgresRepository>,
    path: web::Path<String>,
) -> HttpResponse {
    let raw_category = path.into_inner();
    let category = match raw_category.parse::<Category>() {
        Ok(category) => category,
        Err(_) => {
            info!(category = %raw_category, "Unknown category requested");
            return HttpResponse::Ok().json(Vec::<ContentItem>::new());
        }
    };

    let items = match content_repository.list_by_category(&category).await {
        Ok(items) => items,
        Err(error) => {
            error!(?error, "Failed to list the section content");
            Vec::new()
        }
    };

    HttpResponse::Ok().json(items)
}
