//! Fixed prompt text sent to the model.

use serde_json::{json, Value};

/// Persona and rules sent as the system instruction on every call.
pub const SYSTEM_INSTRUCTION: &str = "\
You are a creative and clever puzzle designer. Your task is to generate a single 'Odd One Out' puzzle.
The puzzle consists of 5 tokens (words or phrases). Four of the tokens share a clean, nameable feature, and one does not.
You must provide the 5 tokens, the 0-based index of the 'odd one out', the name of the category, and a concise explanation.
Avoid obscure trivia. Ensure there is only ONE correct answer and the category is unambiguous.
All 5 tokens must be different from each other.
Reply with a single JSON object with the keys tokens, answer_index, category and explanation, and nothing else.";

/// One prompt per puzzle slot, easiest first.
pub const PROMPTS: [&str; 3] = [
    "Generate a new puzzle with an easy difficulty, based on letters or spelling.",
    "Generate a new puzzle with a medium difficulty, based on semantics or meaning.",
    "Generate a new clever puzzle with a hard difficulty.",
];

/// Number of puzzles in a complete batch.
pub const PUZZLES_PER_RUN: usize = PROMPTS.len();

/// Response schema for structured-output mode, in Gemini's OpenAPI subset.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "tokens": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "answer_index": {
                "type": "INTEGER",
                "description": "The 0-based index of the token that is the odd one out."
            },
            "category": { "type": "STRING" },
            "explanation": { "type": "STRING" }
        },
        "required": ["tokens", "answer_index", "category", "explanation"]
    })
}
