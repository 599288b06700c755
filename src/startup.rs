use actix_cors::Cors;
use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{net::TcpListener, sync::Arc};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::{
    adapters::{
        GroqCompletionClient, GroqCompletionClientError, HostedEmbeddingClient,
        HostedEmbeddingClientError,
    },
    configuration::{
        ApplicationSettings, DatabaseSettings, EmbeddingBackend, EmbeddingSettings, Settings,
    },
    ports::{CompletionProvider, EmbeddingProvider},
    repositories::{ContentPostgresRepository, SessionPostgresRepository},
    routes::{chat, health_check, root, search, section_items, sections, suggestions},
    use_cases::{AnswerQuestionUseCase, SearchContentUseCase},
};

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    EmbeddingClientError(#[from] HostedEmbeddingClientError),
    #[error(transparent)]
    CompletionClientError(#[from] GroqCompletionClientError),
    #[cfg(feature = "local-embeddings")]
    #[error(transparent)]
    LocalEmbeddingsError(#[from] crate::adapters::LocalEmbeddingsError),
    #[cfg(not(feature = "local-embeddings"))]
    #[error("The `local` embedding backend needs this binary compiled with the `local-embeddings` feature")]
    LocalBackendNotCompiled,
}

impl Application {
    /// Wires the providers, repositories and use cases, binds the listener
    /// and prepares the server. Missing provider credentials fail here, not
    /// on the first request.
    ///
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application", skip(settings))]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let connection_pool = get_connection_pool(&settings.database);

        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let embedding_provider = build_embedding_provider(&settings.embedding).await?;
        let completion_provider: Arc<dyn CompletionProvider> =
            Arc::new(GroqCompletionClient::new(settings.completion.clone())?);

        let content_repository = Arc::new(ContentPostgresRepository::new(connection_pool.clone()));
        let session_repository = Arc::new(SessionPostgresRepository::new(connection_pool));

        let answer_question_use_case = AnswerQuestionUseCase::new(
            embedding_provider.clone(),
            completion_provider,
            content_repository.clone(),
            session_repository,
            settings.rag.clone(),
            settings.completion.max_completion_tokens,
            settings.completion.suggestion_max_completion_tokens,
        );
        let search_content_use_case =
            SearchContentUseCase::new(embedding_provider, content_repository.clone(), settings.rag);

        let server = run(
            listener,
            &settings.application,
            nb_workers,
            content_repository,
            answer_question_use_case,
            search_content_use_case,
        )?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
///
/// # Parameters
/// - nb_workers: number of actix-web workers
///   if `None`, the number of available physical CPUs is used as the worker count.
pub fn run(
    listener: TcpListener,
    application_settings: &ApplicationSettings,
    nb_workers: Option<usize>,
    content_repository: Arc<ContentPostgresRepository>,
    answer_question_use_case: AnswerQuestionUseCase,
    search_content_use_case: SearchContentUseCase,
) -> Result<Server, std::io::Error> {
    // Wraps shared state in `actix_web::Data` (`Arc`) to be able to register
    // it and access it from handlers. Shared among all workers.
    let content_repository = Data::from(content_repository);
    let answer_question_use_case = Data::new(answer_question_use_case);
    let search_content_use_case = Data::new(search_content_use_case);

    let cors_allowed_origins = application_settings.cors_allowed_origins.clone();

    // `move` to capture variables from the surrounding environment
    let server = HttpServer::new(move || {
        info!("Starting actix-web worker");

        App::new()
            .wrap(TracingLogger::default())
            .wrap(build_cors(&cors_allowed_origins))
            .route("/", web::get().to(root))
            .route("/health", web::get().to(health_check))
            .route("/api/chat", web::post().to(chat))
            .route("/api/sections", web::get().to(sections))
            .route("/api/section/{category}", web::get().to(section_items))
            .route("/api/search", web::post().to(search))
            .route("/api/suggestions", web::get().to(suggestions))
            .app_data(content_repository.clone())
            .app_data(answer_question_use_case.clone())
            .app_data(search_content_use_case.clone())
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web default (one per physical CPU)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    // No await
    Ok(server.run())
}

// Cors is not Clone, one instance per worker.
fn build_cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default().allow_any_method().allow_any_header();
    if allowed_origins.iter().any(|origin| origin == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }
    cors
}

/// Picks the embedding implementation from configuration.
///
/// The in-process model is only compiled in with the `local-embeddings`
/// feature; selecting it without that feature is a build-time configuration
/// error surfaced at startup.
async fn build_embedding_provider(
    settings: &EmbeddingSettings,
) -> Result<Arc<dyn EmbeddingProvider>, ApplicationBuildError> {
    match settings.backend {
        EmbeddingBackend::Hosted => Ok(Arc::new(HostedEmbeddingClient::new(settings.clone())?)),
        #[cfg(feature = "local-embeddings")]
        EmbeddingBackend::Local => Ok(Arc::new(
            crate::adapters::LocalEmbeddings::spawn(settings.dimension).await?,
        )),
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingBackend::Local => Err(ApplicationBuildError::LocalBackendNotCompiled),
    }
}

// Or should we keep a clone of the pool connection in `Application` ?
pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(settings.with_db())
}
