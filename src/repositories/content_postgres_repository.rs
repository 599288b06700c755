use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Category, ContentItem, RetrievedContent};
use crate::ports::{CategoryCount, ContentStore, ContentStoreError};

/// Knowledge-base reads against Postgres with the pgvector extension.
pub struct ContentPostgresRepository {
    pg_pool: PgPool,
}

impl ContentPostgresRepository {
    pub fn new(pg_pool: PgPool) -> Self {
        Self { pg_pool }
    }
}

#[async_trait]
impl ContentStore for ContentPostgresRepository {
    #[tracing::instrument(
        name = "Searching similar content in database",
        skip(self, embedding),
        fields(threshold, limit)
    )]
    async fn similarity_search(
        &self,
        embedding: &[f32],
        category_filter: &Option<String>,
        threshold: f64,
        limit: u16,
    ) -> Result<Vec<RetrievedContent>, ContentStoreError> {
        let rows: Vec<RetrievedContentRow> = sqlx::query_as(
            r#"
    SELECT id, title, title_hebrew, content, content_hebrew, category, subcategory,
           tags, location_name, latitude, longitude, price_range,
           recommended_duration, best_time_to_visit,
           1 - (embedding <=> $1::vector) AS similarity
    FROM guide_content
    WHERE 1 - (embedding <=> $1::vector) > $2
      AND ($3::text IS NULL OR category = $3)
    ORDER BY embedding <=> $1::vector
    LIMIT $4
            "#,
        )
        .bind(vector_literal(embedding))
        .bind(threshold)
        .bind(category_filter.as_deref())
        .bind(i64::from(limit))
        .fetch_all(&self.pg_pool)
        .await?;

        Ok(rows.into_iter().map(RetrievedContent::from).collect())
    }

    #[tracing::instrument(name = "Counting content per category in database", skip(self))]
    async fn list_categories(&self) -> Result<Vec<CategoryCount>, ContentStoreError> {
        let counts: Vec<CategoryCount> = sqlx::query_as(
            r#"
    SELECT category, COUNT(*) AS count
    FROM guide_content
    GROUP BY category
    ORDER BY category
            "#,
        )
        .fetch_all(&self.pg_pool)
        .await?;

        Ok(counts)
    }

    #[tracing::instrument(name = "Listing content of a category from database", skip(self))]
    async fn list_by_category(
        &self,
        category: &Category,
    ) -> Result<Vec<ContentItem>, ContentStoreError> {
        let items: Vec<ContentItem> = sqlx::query_as(
            r#"
    SELECT id, title, title_hebrew, content, content_hebrew, category, subcategory,
           tags, location_name, latitude, longitude, price_range,
           recommended_duration, best_time_to_visit
    FROM guide_content
    WHERE category = $1
    ORDER BY title_hebrew
            "#,
        )
        .bind(category.as_str())
        .fetch_all(&self.pg_pool)
        .await?;

        Ok(items)
    }
}

/// Text literal of a vector, e.g. `[0.1,-0.2,0.3]`, cast to `vector` server
/// side. sqlx has no codec for the pgvector type.
fn vector_literal(embedding: &[f32]) -> String {
    let mut literal = String::with_capacity(embedding.len() * 10 + 2);
    literal.push('[');
    for (i, value) in embedding.iter().enumerate() {
        if i > 0 {
            literal.push(',');
        }
        literal.push_str(&value.to_string());
    }
    literal.push(']');
    literal
}

#[derive(sqlx::FromRow)]
struct RetrievedContentRow {
    id: Uuid,
    title: String,
    title_hebrew: String,
    content: String,
    content_hebrew: String,
    category: String,
    subcategory: Option<String>,
    tags: Vec<String>,
    location_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    price_range: Option<String>,
    recommended_duration: Option<String>,
    best_time_to_visit: Option<String>,
    similarity: f64,
}

impl From<RetrievedContentRow> for RetrievedContent {
    fn from(row: RetrievedContentRow) -> Self {
        RetrievedContent {
            item: ContentItem {
                id: row.id,
                title: row.title,
                title_hebrew: row.title_hebrew,
                content: row.content,
                content_hebrew: row.content_hebrew,
                category: row.category,
                subcategory: row.subcategory,
                tags: row.tags,
                location_name: row.location_name,
                latitude: row.latitude,
                longitude: row.longitude,
                price_range: row.price_range,
                recommended_duration: row.recommended_duration,
                best_time_to_visit: row.best_time_to_visit,
            },
            similarity: row.similarity,
        }
    }
}
