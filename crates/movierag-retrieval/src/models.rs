use movierag_core::error::{MovieRagError, Result};
use movierag_core::models::Answer;
use serde::{Serialize, Serializer};

/// Message returned when a question arrives before an index is attached
pub const NOT_READY_MESSAGE: &str = "Please ingest data first.";

/// Outcome of asking a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// No index is attached yet
    NotReady,

    /// Structured answer from the chat model
    Answered(Answer),
}

impl Reply {
    pub fn answer(&self) -> Option<&Answer> {
        match self {
            Reply::Answered(answer) => Some(answer),
            Reply::NotReady => None,
        }
    }
}

impl Serialize for Reply {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Reply::NotReady => serializer.serialize_str(NOT_READY_MESSAGE),
            Reply::Answered(answer) => answer.serialize(serializer),
        }
    }
}

/// Parse a raw chat reply into an [`Answer`]
///
/// Accepts the object bare, wrapped in a Markdown code fence, or surrounded by
/// prose; the outermost `{...}` span is deserialized.
pub fn parse_answer(raw: &str) -> Result<Answer> {
    let body = strip_code_fence(raw.trim());

    let json = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => {
            return Err(MovieRagError::SchemaValidation {
                reason: "reply does not contain a JSON object".to_string(),
                raw: raw.to_string(),
            })
        }
    };

    serde_json::from_str(json).map_err(|e| MovieRagError::SchemaValidation {
        reason: e.to_string(),
        raw: raw.to_string(),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the info string (e.g. `json`) on the opening line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const VALID: &str =
        r#"{"answer": "Neil McCauley", "contexts": ["McCauley leads a crew"], "reasoning": "The plot names him."}"#;

    fn expected() -> Answer {
        Answer {
            answer: "Neil McCauley".to_string(),
            contexts: vec!["McCauley leads a crew".to_string()],
            reasoning: "The plot names him.".to_string(),
        }
    }

    #[test]
    fn test_parse_bare_object() {
        assert_eq!(parse_answer(VALID).unwrap(), expected());
    }

    #[test]
    fn test_parse_fenced_object() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert_eq!(parse_answer(&fenced).unwrap(), expected());

        let plain_fence = format!("```\n{}\n```\n", VALID);
        assert_eq!(parse_answer(&plain_fence).unwrap(), expected());
    }

    #[test]
    fn test_parse_object_with_prose() {
        let chatty = format!("Here is the answer:\n{}\nHope that helps!", VALID);
        assert_eq!(parse_answer(&chatty).unwrap(), expected());
    }

    #[test]
    fn test_parse_missing_field() {
        let raw = r#"{"answer": "x", "contexts": []}"#;

        match parse_answer(raw) {
            Err(MovieRagError::SchemaValidation { reason, raw: kept }) => {
                assert!(reason.contains("reasoning"));
                assert_eq!(kept, raw);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_wrong_type() {
        let raw = r#"{"answer": "x", "contexts": "not a list", "reasoning": "r"}"#;
        assert!(matches!(parse_answer(raw), Err(MovieRagError::SchemaValidation { .. })));
    }

    #[test]
    fn test_parse_no_json() {
        let result = parse_answer("I don't know.");
        assert!(matches!(result, Err(MovieRagError::SchemaValidation { .. })));
        assert!(matches!(parse_answer("} {"), Err(MovieRagError::SchemaValidation { .. })));
    }

    #[test]
    fn test_reply_serialization() {
        let json = serde_json::to_string(&Reply::NotReady).unwrap();
        assert_eq!(json, "\"Please ingest data first.\"");

        let value = serde_json::to_value(Reply::Answered(expected())).unwrap();
        assert_eq!(value["answer"], "Neil McCauley");
        assert_eq!(value["contexts"][0], "McCauley leads a crew");
    }

    proptest! {
        #[test]
        fn prop_parse_ignores_surrounding_prose(
            prefix in "[a-zA-Z .:\n]{0,40}",
            suffix in "[a-zA-Z .!\n]{0,40}",
        ) {
            let raw = format!("{}{}{}", prefix, VALID, suffix);
            prop_assert_eq!(parse_answer(&raw).unwrap(), expected());
        }
    }
}
