use super::error::CollaboratorError;
use super::parse::clean_sentences;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// At most this many sentences are kept per category
pub const CATEGORY_SENTENCE_LIMIT: usize = 3;

pub const CATEGORIES: [&str; 4] = ["situation", "feeling", "thought", "behavior"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySuggestions {
    pub sentences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub situation: CategorySuggestions,
    pub feeling: CategorySuggestions,
    pub thought: CategorySuggestions,
    pub behavior: CategorySuggestions,
}

/// Shapes models actually produce for one category.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCategory {
    List(Vec<String>),
    Object {
        #[serde(alias = "suggestions", alias = "items")]
        sentences: Vec<String>,
    },
    Text(String),
}

impl RawCategory {
    fn into_sentences(self) -> Vec<String> {
        match self {
            RawCategory::List(items) | RawCategory::Object { sentences: items } => items,
            RawCategory::Text(text) => vec![text],
        }
    }
}

/// Validate and normalize a classification reply.
pub fn parse_classification(value: Value) -> Result<Classification, CollaboratorError> {
    // Some models nest everything under a top-level "categories" key.
    let root = match value {
        Value::Object(mut map) if map.contains_key("categories") => {
            map.remove("categories").unwrap_or(Value::Null)
        }
        other => other,
    };

    let Value::Object(mut map) = root else {
        return Err(CollaboratorError::Format(
            "classification reply is not a JSON object".to_string(),
        ));
    };

    let mut take = |name: &str| -> Result<CategorySuggestions, CollaboratorError> {
        let raw = map.remove(name).ok_or_else(|| {
            CollaboratorError::Format(format!("classification is missing '{}'", name))
        })?;

        let category: RawCategory = serde_json::from_value(raw).map_err(|_| {
            CollaboratorError::Format(format!("category '{}' has an unexpected shape", name))
        })?;

        let sentences = clean_sentences(category.into_sentences(), CATEGORY_SENTENCE_LIMIT);
        if sentences.is_empty() {
            return Err(CollaboratorError::Format(format!(
                "category '{}' has no usable sentences",
                name
            )));
        }

        Ok(CategorySuggestions { sentences })
    };

    Ok(Classification {
        situation: take(CATEGORIES[0])?,
        feeling: take(CATEGORIES[1])?,
        thought: take(CATEGORIES[2])?,
        behavior: take(CATEGORIES[3])?,
    })
}
