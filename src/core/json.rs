//! JSON ingestion
//!
//! Decodes JSON payloads and translates decode failures into typed errors.

use serde_json::Value;
use thiserror::Error;

/// Outcome of the last JSON decode attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    None,
    MaxDepthExceeded,
    StateMismatch,
    ControlCharacter,
    SyntaxError,
    MalformedEncoding,
    Unknown,
}

impl DecodeStatus {
    /// Classify a serde_json error raised while decoding `input`.
    ///
    /// serde_json does not expose its error codes, so this looks at the
    /// category first and then at the message. A closing bracket that does
    /// not match the open structure is a state mismatch; truncated input is
    /// a syntax error. Anything unrecognised is `Unknown`.
    pub fn classify(err: &serde_json::Error, input: &[u8]) -> Self {
        use serde_json::error::Category;

        let message = err.to_string();
        match err.classify() {
            Category::Eof => DecodeStatus::SyntaxError,
            Category::Syntax => {
                if message.starts_with("recursion limit exceeded") {
                    DecodeStatus::MaxDepthExceeded
                } else if message.starts_with("control character") {
                    DecodeStatus::ControlCharacter
                } else if message.starts_with("invalid unicode code point")
                    || message.contains("surrogate")
                {
                    DecodeStatus::MalformedEncoding
                } else if is_mismatched_close(&message, byte_at(input, err.line(), err.column())) {
                    DecodeStatus::StateMismatch
                } else {
                    DecodeStatus::SyntaxError
                }
            }
            Category::Io | Category::Data => DecodeStatus::Unknown,
        }
    }
}

/// `]` where an object expected `,` or `}`, or `}` where an array expected `,` or `]`
fn is_mismatched_close(message: &str, found: Option<u8>) -> bool {
    match found {
        Some(b'}') => message.starts_with("expected `,` or `]`"),
        Some(b']') => message.starts_with("expected `,` or `}`"),
        _ => false,
    }
}

/// Byte at a 1-based line and column, as reported by serde_json
fn byte_at(input: &[u8], line: usize, column: usize) -> Option<u8> {
    let start = if line <= 1 {
        0
    } else {
        input
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte == b'\n')
            .nth(line - 2)
            .map(|(index, _)| index + 1)?
    };
    input.get(start + column.checked_sub(1)?).copied()
}

/// Typed JSON decode failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JsonDecodeError {
    #[error("Maximum stack depth exceeded.")]
    MaxDepthExceeded,
    #[error("Underflow or the modes mismatch.")]
    StateMismatch,
    #[error("Unexpected control character found.")]
    ControlCharacter,
    #[error("Syntax error; Malformed JSON.")]
    SyntaxError,
    #[error("Malformed UTF-8 characters; Possibly incorrectly encoded.")]
    MalformedEncoding,
    #[error("Unknown JSON encoding error.")]
    Unknown,
}

/// Translate a decode status into `Ok(())` or the matching error kind
pub fn translate(status: DecodeStatus) -> Result<(), JsonDecodeError> {
    match status {
        DecodeStatus::None => Ok(()),
        DecodeStatus::MaxDepthExceeded => Err(JsonDecodeError::MaxDepthExceeded),
        DecodeStatus::StateMismatch => Err(JsonDecodeError::StateMismatch),
        DecodeStatus::ControlCharacter => Err(JsonDecodeError::ControlCharacter),
        DecodeStatus::SyntaxError => Err(JsonDecodeError::SyntaxError),
        DecodeStatus::MalformedEncoding => Err(JsonDecodeError::MalformedEncoding),
        DecodeStatus::Unknown => Err(JsonDecodeError::Unknown),
    }
}

/// Decode raw JSON bytes, routing any failure through [`translate`]
pub fn decode(input: &[u8]) -> Result<Value, JsonDecodeError> {
    serde_json::from_slice(input).map_err(|err| {
        let status = DecodeStatus::classify(&err, input);
        tracing::debug!(?status, error = %err, "JSON payload failed to decode");
        translate(status).err().unwrap_or(JsonDecodeError::Unknown)
    })
}

/// Name of a JSON value's type, for error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
