use chrono::{DateTime, Utc};
use std::str::FromStr;
use typed_builder::TypedBuilder;
use uuid::Uuid;

/// Which side of the conversation produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One utterance in a conversation, as persisted in `chat_sessions.turns`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Client surface a session was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Web,
    Telegram,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Telegram => "telegram",
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(Platform::Web),
            "telegram" => Ok(Platform::Telegram),
            _ => Err(format!("Invalid Platform: {}", s)),
        }
    }
}

/// A user's conversation record.
///
/// Identifiers are minted by this service, never by the store. The turn list
/// is append-only: the serving path adds turns and never rewrites or trims
/// what is already persisted. Cleaning up abandoned sessions is an external
/// concern.
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct ChatSession {
    #[builder(default=Uuid::new_v4())]
    pub id: Uuid,

    #[builder(default="anonymous".to_string())]
    pub user_id: String,

    #[builder(default=Platform::Web)]
    pub platform: Platform,

    #[builder(default)]
    pub turns: Vec<ChatTurn>,

    #[builder(default=Utc::now())]
    pub started_at: DateTime<Utc>,

    #[builder(default=Utc::now())]
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// The latest `window` turns, oldest first.
    ///
    /// Storage is unbounded; only the slice replayed to the language model
    /// is windowed.
    pub fn recent_turns(&self, window: usize) -> &[ChatTurn] {
        let start = self.turns.len().saturating_sub(window);
        &self.turns[start..]
    }
}
