use super::error::CollaboratorError;
use super::parse::clean_sentences;
use crate::domain::tts::AudioClip;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PRACTICE_SENTENCE_COUNT: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSentence {
    pub text: String,
    /// `None` when speech is disabled or synthesis failed for this sentence
    pub audio: Option<AudioClip>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeResult {
    pub ok: bool,
    pub sentences: Vec<PracticeSentence>,
}

impl PracticeResult {
    /// Pair sentences with their audio by index.
    pub fn new(sentences: Vec<String>, audio: Vec<Option<AudioClip>>) -> Self {
        let mut audio = audio.into_iter();
        let sentences = sentences
            .into_iter()
            .map(|text| PracticeSentence {
                text,
                audio: audio.next().flatten(),
            })
            .collect();

        Self {
            ok: true,
            sentences,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSentence {
    Text(String),
    Object {
        #[serde(alias = "sentence")]
        text: String,
    },
}

impl RawSentence {
    fn into_text(self) -> String {
        match self {
            RawSentence::Text(text) | RawSentence::Object { text } => text,
        }
    }
}

/// Validate a practice reply and return exactly `PRACTICE_SENTENCE_COUNT` sentences.
pub fn parse_practice_sentences(value: Value) -> Result<Vec<String>, CollaboratorError> {
    let list = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map
            .remove("sentences")
            .or_else(|| map.remove("practice"))
        {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CollaboratorError::Format(
                    "practice reply has no 'sentences' list".to_string(),
                ))
            }
        },
        _ => {
            return Err(CollaboratorError::Format(
                "practice reply is neither an object nor a list".to_string(),
            ))
        }
    };

    let raw: Vec<String> = list
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawSentence>(item).ok())
        .map(RawSentence::into_text)
        .collect();

    let sentences = clean_sentences(raw, PRACTICE_SENTENCE_COUNT);
    if sentences.len() < PRACTICE_SENTENCE_COUNT {
        return Err(CollaboratorError::Format(format!(
            "expected {} practice sentences, got {}",
            PRACTICE_SENTENCE_COUNT,
            sentences.len()
        )));
    }

    Ok(sentences)
}
