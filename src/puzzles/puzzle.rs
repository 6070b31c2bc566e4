//! The puzzle record and its validation.
//!
//! Model replies are decoded into a loose `serde_json::Value` first and then
//! checked field by field here, so a reply that is almost right produces a
//! precise error instead of a generic deserialization failure.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Number of tokens in every puzzle.
pub const TOKEN_COUNT: usize = 5;

/// One "Odd One Out" puzzle as persisted for the front-end.
///
/// Field order matters: it is the key order of the written JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Puzzle {
    /// Five distinct, trimmed tokens.
    pub tokens: Vec<String>,
    /// Position of the outlier in `tokens`.
    pub answer_index: usize,
    /// Feature shared by the other four tokens.
    pub category: String,
    pub explanation: String,
    /// Progress flag owned by the front-end. Always false when generated.
    pub completed: bool,
}

impl Puzzle {
    /// The outlier token, if `answer_index` points inside `tokens`.
    pub fn answer(&self) -> Option<&str> {
        self.tokens.get(self.answer_index).map(String::as_str)
    }
}

/// Reasons a decoded model reply is not a usable puzzle.
///
/// Messages never echo model output, so error classification cannot be
/// fooled by words the model happened to write.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `tokens` must be an array")]
    TokensNotArray,
    #[error("expected {expected} tokens, got {actual}")]
    WrongTokenCount { expected: usize, actual: usize },
    #[error("token {0} is not a string")]
    TokenNotString(usize),
    #[error("token {0} is empty")]
    EmptyToken(usize),
    #[error("tokens {first} and {second} are identical")]
    DuplicateToken { first: usize, second: usize },
    #[error("field `answer_index` must be an integer")]
    AnswerIndexNotInteger,
    #[error("answer_index {0} is outside 0..5")]
    AnswerIndexOutOfRange(i64),
    #[error("field `{0}` must be a string")]
    NotAString(&'static str),
    #[error("field `{0}` is empty")]
    EmptyField(&'static str),
}

/// Validate a decoded reply and produce a normalized puzzle.
///
/// The input is left untouched; all strings in the result are trimmed and
/// `completed` is false.
pub fn validate_puzzle(value: &Value) -> Result<Puzzle, ValidationError> {
    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

    let tokens = object
        .get("tokens")
        .ok_or(ValidationError::MissingField("tokens"))?;
    let tokens = validate_tokens(tokens)?;

    let answer_index = object
        .get("answer_index")
        .ok_or(ValidationError::MissingField("answer_index"))?;
    let answer_index = validate_answer_index(answer_index)?;

    let category = required_text(object.get("category"), "category")?;
    let explanation = required_text(object.get("explanation"), "explanation")?;

    Ok(Puzzle {
        tokens,
        answer_index,
        category,
        explanation,
        completed: false,
    })
}

fn validate_tokens(value: &Value) -> Result<Vec<String>, ValidationError> {
    let items = value.as_array().ok_or(ValidationError::TokensNotArray)?;
    if items.len() != TOKEN_COUNT {
        return Err(ValidationError::WrongTokenCount {
            expected: TOKEN_COUNT,
            actual: items.len(),
        });
    }

    let mut tokens: Vec<String> = Vec::with_capacity(TOKEN_COUNT);
    for (index, item) in items.iter().enumerate() {
        let text = item.as_str().ok_or(ValidationError::TokenNotString(index))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyToken(index));
        }
        if let Some(first) = tokens.iter().position(|seen| seen == text) {
            return Err(ValidationError::DuplicateToken {
                first,
                second: index,
            });
        }
        tokens.push(text.to_string());
    }
    Ok(tokens)
}

fn validate_answer_index(value: &Value) -> Result<usize, ValidationError> {
    let Value::Number(number) = value else {
        return Err(ValidationError::AnswerIndexNotInteger);
    };

    if let Some(index) = number.as_i64() {
        return index_in_range(index);
    }
    if number.as_u64().is_some() {
        // Only reachable for values above i64::MAX.
        return Err(ValidationError::AnswerIndexOutOfRange(i64::MAX));
    }

    // Whole-valued floats like 2.0 are accepted.
    let float = number
        .as_f64()
        .ok_or(ValidationError::AnswerIndexNotInteger)?;
    if !float.is_finite() || float.fract() != 0.0 {
        return Err(ValidationError::AnswerIndexNotInteger);
    }
    index_in_range(float as i64)
}

fn index_in_range(index: i64) -> Result<usize, ValidationError> {
    if (0..TOKEN_COUNT as i64).contains(&index) {
        Ok(index as usize)
    } else {
        Err(ValidationError::AnswerIndexOutOfRange(index))
    }
}

fn required_text(value: Option<&Value>, field: &'static str) -> Result<String, ValidationError> {
    let text = value
        .ok_or(ValidationError::MissingField(field))?
        .as_str()
        .ok_or(ValidationError::NotAString(field))?
        .trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(text.to_string())
}
