use typed_builder::TypedBuilder;
use uuid::Uuid;

/// A knowledge-base record about Tokyo.
///
/// Rows are written by the external seeding pipeline together with their
/// embedding. The serving path only ever reads them, so the entity carries
/// no mutation methods and no embedding column.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, sqlx::FromRow, TypedBuilder)]
pub struct ContentItem {
    #[builder(default=Uuid::new_v4())]
    pub id: Uuid,

    pub title: String,
    pub title_hebrew: String,

    pub content: String,
    pub content_hebrew: String,

    /// One of the closed category set, as stored. Kept as text on the read
    /// path so unexpected seeded values still list and search.
    pub category: String,

    #[builder(default)]
    pub subcategory: Option<String>,

    #[builder(default)]
    pub tags: Vec<String>,

    #[builder(default)]
    pub location_name: Option<String>,
    #[builder(default)]
    pub latitude: Option<f64>,
    #[builder(default)]
    pub longitude: Option<f64>,

    #[builder(default)]
    pub price_range: Option<String>,
    #[builder(default)]
    pub recommended_duration: Option<String>,
    #[builder(default)]
    pub best_time_to_visit: Option<String>,
}

/// One ranked row out of a similarity search, before any response shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedContent {
    pub item: ContentItem,
    pub similarity: f64,
}

/// The citation projection of a retrieved item returned to chat callers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceReference {
    pub id: Uuid,
    pub title: String,
    pub title_hebrew: String,
    pub category: String,
    pub similarity: f64,
}

impl From<&RetrievedContent> for SourceReference {
    fn from(retrieved: &RetrievedContent) -> Self {
        Self {
            id: retrieved.item.id,
            title: retrieved.item.title.clone(),
            title_hebrew: retrieved.item.title_hebrew.clone(),
            category: retrieved.item.category.clone(),
            // Scores are cosine similarities; 3 decimals is plenty for display.
            similarity: (retrieved.similarity * 1000.0).round() / 1000.0,
        }
    }
}
