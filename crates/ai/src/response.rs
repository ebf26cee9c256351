//! Gemini wire types and suggestion parsing.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use conciliar_core::classification::{AiCandidate, AiError, AiSuggestion};

/// `generateContent` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Conversation turns; a single user turn here.
    pub contents: Vec<Content>,
    /// Sampling settings.
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    /// A single-turn request with low temperature.
    #[must_use]
    pub fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: serde_json::json!(0.2),
                max_output_tokens: 1024,
                response_mime_type: "application/json".to_string(),
            },
        }
    }
}

/// One turn of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Text parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A text part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// The text.
    #[serde(default)]
    pub text: String,
}

/// Sampling settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature, a JSON number.
    pub temperature: Value,
    /// Output length limit.
    pub max_output_tokens: u32,
    /// Requested response format.
    pub response_mime_type: String,
}

/// `generateContent` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// Generated candidates; the first one is used.
    #[serde(default)]
    pub candidates: Vec<ResponseCandidate>,
}

impl GenerateResponse {
    /// Text of the first candidate.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .parts
            .first()
            .map(|p| p.text.as_str())
    }
}

/// One generated candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseCandidate {
    /// Generated content.
    pub content: Content,
}

#[derive(Debug, Deserialize)]
struct SuggestionPayload {
    #[serde(default)]
    candidates: Vec<PayloadCandidate>,
    #[serde(default)]
    rationale: String,
}

#[derive(Debug, Deserialize)]
struct PayloadCandidate {
    code: String,
    #[serde(default)]
    confidence: Value,
}

/// Reads a confidence written as a JSON number or string.
fn decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Parses the model text into a suggestion.
///
/// The JSON object may be wrapped in prose or a code fence. Confidences
/// are clamped to 0..=1 and empty codes dropped; the overall confidence
/// is the best candidate's.
pub fn parse_suggestion(text: &str, model: &str) -> Result<AiSuggestion, AiError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(AiError::Transient("AI response contains no JSON object".into()));
    };
    if end < start {
        return Err(AiError::Transient("AI response contains no JSON object".into()));
    }
    let payload: SuggestionPayload = serde_json::from_str(&text[start..=end])
        .map_err(|e| AiError::Transient(format!("Malformed AI response: {e}")))?;

    let candidates: Vec<AiCandidate> = payload
        .candidates
        .into_iter()
        .filter(|c| !c.code.trim().is_empty())
        .map(|c| AiCandidate {
            code: c.code.trim().to_string(),
            confidence: decimal(&c.confidence)
                .unwrap_or(Decimal::ZERO)
                .clamp(Decimal::ZERO, Decimal::ONE),
        })
        .collect();
    let confidence = candidates
        .iter()
        .map(|c| c.confidence)
        .max()
        .unwrap_or(Decimal::ZERO);

    Ok(AiSuggestion {
        candidates,
        confidence,
        rationale: payload.rationale,
        model: model.to_string(),
    })
}
