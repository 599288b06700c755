use std::net::TcpListener;

use actix_web::{web, App, HttpResponse, HttpServer};
use chrono::Utc;
use once_cell::sync::Lazy;
use secrecy::Secret;
use serde_json::json;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use tokyo_guide_service::{
    configuration::{get_configuration, DatabaseSettings, EmbeddingBackend},
    startup::{get_connection_pool, Application},
    telemetry::{get_tracing_subscriber, init_tracing_subscriber},
};
use tracing::info;
use uuid::Uuid;

/// Embedding dimension from `configuration/base.yaml`.
pub const EMBEDDING_DIMENSION: usize = 384;

/// Suggestion token cap from `configuration/base.yaml`, used by the
/// completion stub to tell the suggestion call apart from the answer call.
const SUGGESTION_MAX_COMPLETION_TOKENS: u64 = 512;

pub const STUB_ANSWER: &str = "בטוקיו כדאי לבקר במגדל טוקיו ובמקדש סנסוג'י.";
pub const STUB_SUGGESTIONS: [&str; 3] = [
    "מה עוד כדאי לראות בטוקיו?",
    "איפה לאכול סושי טוב?",
    "מתי הזמן הטוב לבקר?",
];

// Ensures that the `tracing` stack is only initialized once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // We cannot assign the output of `get_tracing_subscriber` to a variable based on the value of `TEST_LOG`
    // because the sink is part of the type returned by `get_tracing_subscriber`, therefore they are not the
    // same type. We could work around it, but this is the most straight-forward way of moving forward.
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_tracing_subscriber(subscriber);
    } else {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_tracing_subscriber(subscriber);
    };
});

pub struct TestApp {
    pub address: String,
    pub port: u16,
    /// Database connection used to assert checks thanks to db queries
    pub db_pool: PgPool,
}

impl TestApp {
    /// Inserts one knowledge-base item with the given embedding.
    pub async fn seed_content_item(
        &self,
        title: &str,
        title_hebrew: &str,
        category: &str,
        embedding: &[f32],
    ) {
        sqlx::query(
            r#"
    INSERT INTO guide_content
        (title, title_hebrew, content, content_hebrew, category, embedding)
    VALUES ($1, $2, $3, $4, $5, $6::vector)
            "#,
        )
        .bind(title)
        .bind(title_hebrew)
        .bind(format!("About {}.", title))
        .bind(format!("על {}.", title_hebrew))
        .bind(category)
        .bind(vector_literal(embedding))
        .execute(&self.db_pool)
        .await
        .expect("Failed to seed a guide content item");
    }

    /// Number of turns stored on a session row.
    pub async fn stored_turn_count(&self, session_id: Uuid) -> i32 {
        sqlx::query_scalar(r#"SELECT jsonb_array_length(turns) FROM chat_sessions WHERE id = $1"#)
            .bind(session_id)
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to fetch the session row")
    }
}

/// The embedding the provider stub answers with. Seeding content with this
/// exact vector makes it a perfect match (cosine similarity 1).
pub fn matching_embedding() -> Vec<f32> {
    let mut embedding = vec![0.0; EMBEDDING_DIMENSION];
    embedding[0] = 1.0;
    embedding
}

/// At an angle to [`matching_embedding`]: cosine similarity 0.6, above the
/// retrieval threshold but behind a perfect match.
pub fn partially_matching_embedding() -> Vec<f32> {
    let mut embedding = vec![0.0; EMBEDDING_DIMENSION];
    embedding[0] = 0.6;
    embedding[1] = 0.8;
    embedding
}

/// Orthogonal to [`matching_embedding`]: cosine similarity 0, always below
/// the retrieval threshold.
pub fn unrelated_embedding() -> Vec<f32> {
    let mut embedding = vec![0.0; EMBEDDING_DIMENSION];
    embedding[1] = 1.0;
    embedding
}

/// Launches the server as a background task
/// When a tokio runtime is shut down all tasks spawned on it are dropped.
/// tokio::test spins up a new runtime at the beginning of each test case and they shut down at the end of each test case.
/// Therefore no need to implement any clean up logic to avoid leaking resources between test runs
pub async fn spawn_app() -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    // Plays both the embedding and the completion provider
    let provider_stub_url = spawn_provider_stub();

    // Randomizes configuration to ensure test isolation
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Uses a different database for each test case
        c.database.database_name = format!(
            "test_{}_{}",
            Utc::now().format("%Y-%m-%d_%H-%M-%S"),
            Uuid::new_v4()
        );
        // Uses a random OS port: port 0 is special-cased at the OS level:
        // trying to bind port 0 will trigger an OS scan for an available port which will then be bound to the application.
        c.application.port = 0;

        // Points both providers at the in-process stub
        c.embedding.backend = EmbeddingBackend::Hosted;
        c.embedding.api_base_url = provider_stub_url.clone();
        c.embedding.api_token = Some(Secret::new("test-inference-token".to_string()));
        c.completion.api_base_url = provider_stub_url;
        c.completion.api_key = Some(Secret::new("test-completion-key".to_string()));

        c
    };

    // Creates and migrates the database
    set_up_database(&configuration.database).await;

    // Only one actix-web worker is needed for integration tests
    let application = Application::build(configuration.clone(), Some(1))
        .await
        .expect("Failed to build application.");

    let application_port = application.port();

    // Launches the application as a background task
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        port: application_port,
        db_pool: get_connection_pool(&configuration.database),
    }
}

/// Creates and migrates a database for integration test
///
/// Not relying on the bash script to dynamically create databases and run migrations
async fn set_up_database(config: &DatabaseSettings) -> PgPool {
    // Creates database
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres");

    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database.");

    info!("Created database: {}", config.database_name);

    let connection_pool = PgPool::connect_with(config.with_db())
        .await
        .expect("Failed to connect to Postgres.");

    // Migrates database
    sqlx::migrate!()
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    info!("Migration done for database: {}", config.database_name);

    connection_pool
}

/// One HTTP server standing in for both upstream providers: the Hugging Face
/// feature-extraction pipeline and the chat-completions endpoint.
fn spawn_provider_stub() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind the stub listener");
    let port = listener
        .local_addr()
        .expect("Failed to read the stub address")
        .port();

    let server = HttpServer::new(|| {
        App::new()
            .route(
                "/models/{model:.*}/pipeline/feature-extraction",
                web::post().to(feature_extraction_stub),
            )
            .route("/chat/completions", web::post().to(chat_completions_stub))
    })
    .listen(listener)
    .expect("Failed to listen on the stub listener")
    .workers(1)
    .run();

    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

async fn feature_extraction_stub() -> HttpResponse {
    HttpResponse::Ok().json(matching_embedding())
}

/// Tells the suggestion call apart from the answer call by its token cap.
async fn chat_completions_stub(body: web::Json<serde_json::Value>) -> HttpResponse {
    let max_completion_tokens = body["max_completion_tokens"].as_u64().unwrap_or_default();

    let content = if max_completion_tokens == SUGGESTION_MAX_COMPLETION_TOKENS {
        STUB_SUGGESTIONS.join("\n")
    } else {
        STUB_ANSWER.to_string()
    };

    HttpResponse::Ok().json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

fn vector_literal(embedding: &[f32]) -> String {
    let values: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(","))
}
