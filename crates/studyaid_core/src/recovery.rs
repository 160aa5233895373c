//! crates/studyaid_core/src/recovery.rs
//!
//! Recovers a JSON payload from a free-text LLM reply. Replies are expected
//! to be a bare JSON object, but in practice arrive wrapped in prose, fenced
//! code blocks, or both. Recovery is all-or-nothing: success yields a fully
//! typed value, failure yields a classified error the caller can render.

use serde_json::Value;

use crate::domain::{Flashcard, Question, QuestionKind};
use crate::ports::PortError;

/// How recovery of an LLM reply failed. Each variant maps to a distinct
/// user-facing message; none are fatal.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    /// The reply was empty or whitespace-only. Distinct from a parse
    /// failure so the caller can suggest a retry.
    #[error("The model returned an empty response")]
    EmptyResponse,
    /// No parseable JSON object could be found in the reply.
    #[error("The model reply was not valid JSON: {0}")]
    InvalidJson(String),
    /// The JSON parsed but the expected top-level key was absent.
    #[error("The model reply was missing the expected \"{0}\" key")]
    MissingKey(&'static str),
    /// The JSON parsed but a value had the wrong shape.
    #[error("The model reply had an unexpected shape: {0}")]
    UnexpectedShape(String),
}

impl From<RecoveryError> for PortError {
    fn from(e: RecoveryError) -> Self {
        match e {
            RecoveryError::EmptyResponse => PortError::EmptyResponse,
            other => PortError::Malformed(other.to_string()),
        }
    }
}

/// Extracts the body of a fenced code block, if the reply is wrapped in one.
/// Accepts both ```json and bare ``` fences.
fn fenced_body(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let end = rest.rfind("```")?;
    Some(rest[..end].trim())
}

/// Finds the first top-level JSON object in `text` using a balanced-brace
/// scan that is aware of string literals and escapes. This deliberately
/// replaces the old first-`{`-to-last-`}` heuristic, which could swallow
/// trailing prose into the candidate span.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Recovers a JSON value from a raw LLM reply.
///
/// Order of attempts: trim; reject empty input; unwrap a fenced code block;
/// otherwise scan for the first balanced object embedded in the text.
pub fn recover_json(raw: &str) -> Result<Value, RecoveryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RecoveryError::EmptyResponse);
    }

    let candidate = match fenced_body(trimmed) {
        Some(body) => body,
        None => balanced_object(trimmed).unwrap_or(trimmed),
    };

    serde_json::from_str(candidate).map_err(|e| RecoveryError::InvalidJson(e.to_string()))
}

/// Recovers a JSON object and validates that `key` is present and holds an
/// array, returning the array's elements.
pub fn recover_keyed_array(raw: &str, key: &'static str) -> Result<Vec<Value>, RecoveryError> {
    let value = recover_json(raw)?;
    let object = value.as_object().ok_or_else(|| {
        RecoveryError::UnexpectedShape("top-level value is not an object".to_string())
    })?;
    let entry = object.get(key).ok_or(RecoveryError::MissingKey(key))?;
    let items = entry.as_array().ok_or_else(|| {
        RecoveryError::UnexpectedShape(format!("\"{}\" is not an array", key))
    })?;
    Ok(items.clone())
}

fn string_field(item: &Value, field: &str) -> Result<String, RecoveryError> {
    item.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            RecoveryError::UnexpectedShape(format!("question missing string field \"{}\"", field))
        })
}

/// Decodes a quiz reply into typed questions.
///
/// Beyond JSON shape, this enforces the options invariant: fill-in-the-blank
/// questions carry no options, every other kind carries at least two.
pub fn parse_quiz(raw: &str) -> Result<Vec<Question>, RecoveryError> {
    let items = recover_keyed_array(raw, "quiz")?;
    let mut questions = Vec::with_capacity(items.len());

    for item in &items {
        let kind_str = string_field(item, "type")?;
        let kind = QuestionKind::from_wire(&kind_str).ok_or_else(|| {
            RecoveryError::UnexpectedShape(format!("unknown question type \"{}\"", kind_str))
        })?;

        let prompt = string_field(item, "question")?;
        let answer = string_field(item, "answer")?;

        let options: Vec<String> = match item.get("options") {
            Some(Value::Array(raw_options)) => raw_options
                .iter()
                .map(|o| {
                    o.as_str().map(str::to_string).ok_or_else(|| {
                        RecoveryError::UnexpectedShape(
                            "question option is not a string".to_string(),
                        )
                    })
                })
                .collect::<Result<_, _>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(RecoveryError::UnexpectedShape(
                    "\"options\" is not an array".to_string(),
                ))
            }
        };

        match kind {
            QuestionKind::FillInTheBlank if !options.is_empty() => {
                return Err(RecoveryError::UnexpectedShape(
                    "fill-in-the-blank question must not carry options".to_string(),
                ));
            }
            QuestionKind::MultipleChoice | QuestionKind::TrueFalse if options.len() < 2 => {
                return Err(RecoveryError::UnexpectedShape(format!(
                    "\"{}\" question needs at least two options",
                    kind_str
                )));
            }
            _ => {}
        }

        questions.push(Question {
            kind,
            prompt,
            options,
            answer,
        });
    }

    Ok(questions)
}

/// Decodes a flashcard reply into typed cards.
pub fn parse_flashcards(raw: &str) -> Result<Vec<Flashcard>, RecoveryError> {
    let items = recover_keyed_array(raw, "flashcards")?;
    items
        .iter()
        .map(|item| {
            let front = item.get("front").and_then(Value::as_str);
            let back = item.get("back").and_then(Value::as_str);
            match (front, back) {
                (Some(front), Some(back)) => Ok(Flashcard {
                    front: front.to_string(),
                    back: back.to_string(),
                }),
                _ => Err(RecoveryError::UnexpectedShape(
                    "flashcard missing \"front\" or \"back\"".to_string(),
                )),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_object_surrounded_by_garbage() {
        let raw = r#"prefix garbage {"flashcards":[{"front":"Q","back":"A"}]} suffix garbage"#;
        let cards = parse_flashcards(raw).unwrap();
        assert_eq!(
            cards,
            vec![Flashcard {
                front: "Q".to_string(),
                back: "A".to_string()
            }]
        );
    }

    #[test]
    fn empty_input_is_classified_distinctly() {
        assert!(matches!(recover_json(""), Err(RecoveryError::EmptyResponse)));
        assert!(matches!(
            recover_json("   \n\t "),
            Err(RecoveryError::EmptyResponse)
        ));
        // A non-empty unparseable reply is a different failure.
        assert!(matches!(
            recover_json("not json at all"),
            Err(RecoveryError::InvalidJson(_))
        ));
    }

    #[test]
    fn extracts_fenced_json_block() {
        let raw = "```json\n{\"quiz\":[]}\n```";
        let questions = parse_quiz(raw).unwrap();
        assert!(questions.is_empty());
    }

    #[test]
    fn extracts_unlabeled_fence() {
        let raw = "```\n{\"flashcards\":[]}\n```";
        assert!(parse_flashcards(raw).unwrap().is_empty());
    }

    #[test]
    fn balanced_scan_stops_at_matching_brace() {
        // The old first-{-to-last-} heuristic would have swallowed the
        // trailing fragment and failed to parse.
        let raw = r#"{"flashcards":[]} and here is a stray } brace"#;
        assert!(parse_flashcards(raw).unwrap().is_empty());
    }

    #[test]
    fn balanced_scan_ignores_braces_inside_strings() {
        let raw = r#"{"flashcards":[{"front":"what does {x} mean?","back":"a placeholder"}]}"#;
        let cards = parse_flashcards(raw).unwrap();
        assert_eq!(cards[0].front, "what does {x} mean?");
    }

    #[test]
    fn missing_key_is_distinct_from_bad_shape() {
        assert!(matches!(
            recover_keyed_array(r#"{"cards": []}"#, "flashcards"),
            Err(RecoveryError::MissingKey("flashcards"))
        ));
        assert!(matches!(
            recover_keyed_array(r#"{"flashcards": "nope"}"#, "flashcards"),
            Err(RecoveryError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn quiz_with_unknown_type_is_rejected() {
        let raw = r#"{"quiz":[{"type":"essay","question":"Discuss.","options":[],"answer":"x"}]}"#;
        assert!(matches!(
            parse_quiz(raw),
            Err(RecoveryError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn quiz_options_invariant_is_enforced() {
        let blank_with_options = r#"{"quiz":[{"type":"fill-in-the-blank","question":"____ sorts in O(n log n)","options":["Merge sort"],"answer":"Merge sort"}]}"#;
        assert!(matches!(
            parse_quiz(blank_with_options),
            Err(RecoveryError::UnexpectedShape(_))
        ));

        let choice_without_options = r#"{"quiz":[{"type":"multiple-choice","question":"Pick one","options":[],"answer":"x"}]}"#;
        assert!(matches!(
            parse_quiz(choice_without_options),
            Err(RecoveryError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn well_formed_quiz_parses() {
        let raw = r#"{"quiz":[
            {"type":"multiple-choice","question":"Which is a stable sort?","options":["Quicksort","Merge sort","Heapsort","Selection sort"],"answer":"Merge sort"},
            {"type":"true-false","question":"Dijkstra handles negative edges.","options":["True","False"],"answer":"False"},
            {"type":"fill-in-the-blank","question":"BFS uses a ____.","options":[],"answer":"queue"}
        ]}"#;
        let questions = parse_quiz(raw).unwrap();
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].kind, QuestionKind::MultipleChoice);
        assert_eq!(questions[2].kind, QuestionKind::FillInTheBlank);
        assert!(questions[2].options.is_empty());
    }
}
