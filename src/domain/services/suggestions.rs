use crate::domain::services::prompt::ChatMessage;

/// How many follow-up questions a chat response carries.
const SUGGESTION_COUNT: usize = 3;

const SUGGESTION_SYSTEM_PROMPT: &str = "אתה עוזר ליצור שאלות המשך. בהינתן שאלה ותשובה על טוקיו, צור בדיוק 3 שאלות המשך קצרות ורלוונטיות בעברית. החזר רק את השאלות, כל אחת בשורה חדשה, ללא מספור.";

/// Popular questions served by the suggestions endpoint for a fresh widget.
pub const SUGGESTED_QUESTIONS: [&str; 10] = [
    "מה כדאי לאכול בטוקיו?",
    "איפה הכי כדאי לישון בטוקיו?",
    "איך להתניידד בתחבורה ציבורית בטוקיו?",
    "מה ההמלצות לקניות בטוקיו?",
    "אילו שכונות מומלצות לביקור ראשון?",
    "איפה לאכול ראמן טוב בטוקיו?",
    "מה לעשות בשיבויה?",
    "כמה עולה טיול לטוקיו?",
    "מה כדאי להביא מיפן?",
    "האם כדאי לבקר בקיוטו?",
];

/// The message pair asking the model for follow-up questions to the answer
/// it just gave.
pub fn build_suggestion_messages(question: &str, answer: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SUGGESTION_SYSTEM_PROMPT),
        ChatMessage::user(format!("שאלה: {}\n\nתשובה: {}", question, answer)),
    ]
}

/// Extracts the follow-up questions out of a raw completion: one per line,
/// trimmed, capped at three. Models occasionally pad with blank lines, which
/// are dropped.
pub fn parse_suggestions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(SUGGESTION_COUNT)
        .map(str::to_string)
        .collect()
}

/// Served when the suggestion call fails or comes back empty.
pub fn fallback_suggestions() -> Vec<String> {
    vec![
        "מה כדאי לאכול בטוקיו?".to_string(),
        "איך להתניידד בתחבורה ציבורית?".to_string(),
        "אילו שכונות מומלצות לביקור?".to_string(),
    ]
}
