use super::classify::CATEGORY_SENTENCE_LIMIT;
use super::practice::PRACTICE_SENTENCE_COUNT;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

pub fn classify_messages(diary: &str) -> Vec<ChatMessage> {
    let system = format!(
        "You are a cognitive behavioral therapy assistant. Read the user's diary entry and \
         sort what happened into four categories: situation (objective facts), feeling \
         (emotions), thought (automatic thoughts and interpretations) and behavior (what the \
         writer did). For each category write between 1 and {limit} short sentences in the \
         same language as the diary, in the writer's own voice. Reply with JSON only, shaped as \
         {{\"situation\": {{\"sentences\": []}}, \"feeling\": {{\"sentences\": []}}, \
         \"thought\": {{\"sentences\": []}}, \"behavior\": {{\"sentences\": []}}}}.",
        limit = CATEGORY_SENTENCE_LIMIT
    );

    vec![ChatMessage::system(system), ChatMessage::user(diary)]
}

pub fn practice_messages(diary: &str, context: Option<&Value>) -> Vec<ChatMessage> {
    let system = format!(
        "You are a cognitive behavioral therapy coach. Rewrite the thoughts in the user's diary \
         entry as exactly {count} short, kind and realistic sentences the writer can read aloud \
         to practice a healthier perspective. Use the same language as the diary and keep each \
         sentence under 80 characters. Reply with JSON only, shaped as \
         {{\"sentences\": [\"...\"]}}.",
        count = PRACTICE_SENTENCE_COUNT
    );

    let user = match context {
        Some(context) => format!("Diary:\n{}\n\nAnalysis:\n{}", diary, context),
        None => format!("Diary:\n{}", diary),
    };

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}
