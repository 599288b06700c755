use crate::domain::entities::{ChatTurn, RetrievedContent, TurnRole, UserQuestion};

/// System instruction for the travel-guide assistant. `{context}` is replaced
/// with the retrieved knowledge-base sections before every completion call.
const SYSTEM_PROMPT_TEMPLATE: &str = "אתה מדריך טיולים מומחה לטוקיו, יפן. אתה עונה על שאלות בעברית בצורה ידידותית, מדויקת ומפורטת.

השתמש במידע הבא כדי לענות על שאלות המשתמש:

{context}

הנחיות:
1. ענה תמיד בעברית, אלא אם המשתמש שואל באנגלית.
2. ציין שמות מקומות גם באנגלית (באותיות לטיניות) לצד העברית, לנוחות ניווט.
3. תן תשובות ברורות, מדויקות ומועילות על בסיס המידע שקיבלת.
4. אם המידע לא מופיע בהקשר שקיבלת, אמור זאת בכנות ונסה לתת עצה כללית.
5. כשממליץ על מסעדות או מקומות, ציין גם את האזור/שכונה.
6. היה חם ומזמין, כמו חבר שמכיר את טוקיו היטב.
7. אם המשתמש שואל על מחירים, ציין ביין יפני (¥) וגם הערכה בשקלים.
";

/// What the model is told when retrieval produced nothing.
const EMPTY_CONTEXT_PLACEHOLDER: &str = "אין מידע ספציפי זמין.";

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Role tag of a message sent to the completion provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl From<TurnRole> for ChatRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => ChatRole::User,
            TurnRole::Assistant => ChatRole::Assistant,
        }
    }
}

/// One message of a chat-completion request, provider-agnostic.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Renders retrieved sources into the context block of the system prompt.
///
/// Every source contributes a `## {hebrew title}` section with its Hebrew
/// body capped at `chars_per_source`. Sources arrive most-relevant-first and
/// keep that order, so the strongest match sits at the head of the prompt.
pub fn compose_context(retrieved: &[RetrievedContent], chars_per_source: usize) -> String {
    retrieved
        .iter()
        .map(|source| {
            format!(
                "## {}\n{}",
                source.item.title_hebrew,
                truncate_chars(&source.item.content_hebrew, chars_per_source)
            )
        })
        .collect::<Vec<String>>()
        .join(SECTION_SEPARATOR)
}

/// The full message list for one answer-generation call: system instruction
/// with the context injected, then the replayed history window, then the
/// question itself.
pub fn build_answer_messages(
    question: &UserQuestion,
    context: &str,
    history: &[ChatTurn],
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system_prompt(context)));

    for turn in history {
        messages.push(ChatMessage {
            role: turn.role.into(),
            content: turn.content.clone(),
        });
    }

    messages.push(ChatMessage::user(question.as_ref()));
    messages
}

fn system_prompt(context: &str) -> String {
    let context = if context.is_empty() {
        EMPTY_CONTEXT_PLACEHOLDER
    } else {
        context
    };
    SYSTEM_PROMPT_TEMPLATE.replace("{context}", context)
}

// Truncation counts chars, not bytes: slicing Hebrew on a byte index panics.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}
