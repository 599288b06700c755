use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::domain::entities::{ChatSession, ChatTurn, Platform};
use crate::ports::{SessionStore, SessionStoreError};

/// Conversation records in Postgres, with the turn list as one JSONB column.
pub struct SessionPostgresRepository {
    pg_pool: PgPool,
}

impl SessionPostgresRepository {
    pub fn new(pg_pool: PgPool) -> Self {
        Self { pg_pool }
    }
}

#[async_trait]
impl SessionStore for SessionPostgresRepository {
    #[tracing::instrument(name = "Fetching chat session from database", skip(self))]
    async fn find_session(&self, id: Uuid) -> Result<Option<ChatSession>, SessionStoreError> {
        let row: Option<ChatSessionRow> = sqlx::query_as(
            r#"
    SELECT id, user_id, platform, turns, started_at, updated_at
    FROM chat_sessions
    WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pg_pool)
        .await?;

        Ok(row.map(ChatSession::from))
    }

    #[tracing::instrument(name = "Saving new chat session in database", skip(self, session), fields(session_id = %session.id))]
    async fn create_session(&self, session: &ChatSession) -> Result<(), SessionStoreError> {
        sqlx::query(
            r#"
    INSERT INTO chat_sessions (id, user_id, platform, turns, started_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id)
        .bind(&session.user_id)
        .bind(session.platform.as_str())
        .bind(Json(&session.turns))
        .bind(session.started_at)
        .bind(session.updated_at)
        .execute(&self.pg_pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(name = "Appending turns to chat session in database", skip(self, turns), fields(turn_count = turns.len()))]
    async fn append_turns(&self, id: Uuid, turns: &[ChatTurn]) -> Result<(), SessionStoreError> {
        let result = sqlx::query(
            r#"
    UPDATE chat_sessions
    SET turns = turns || $2::jsonb, updated_at = now()
    WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(turns))
        .execute(&self.pg_pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!("No chat session row to append to");
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ChatSessionRow {
    id: Uuid,
    user_id: String,
    platform: String,
    turns: Json<Vec<ChatTurn>>,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ChatSessionRow> for ChatSession {
    fn from(row: ChatSessionRow) -> Self {
        ChatSession {
            id: row.id,
            user_id: row.user_id,
            // Unknown stored labels keep the session readable.
            platform: row.platform.parse().unwrap_or(Platform::Web),
            turns: row.turns.0,
            started_at: row.started_at,
            updated_at: row.updated_at,
        }
    }
}
