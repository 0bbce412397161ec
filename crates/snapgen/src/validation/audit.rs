//! Parsing of the two raw audit responses.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ParseError;

/// Feedback carried by a sentinel that replaced an unparseable response.
pub const PARSE_ERROR_FEEDBACK: &str = "parse error";

/// Removes a leading ```` ```json ```` or ```` ``` ```` fence and a trailing
/// ```` ``` ```` fence, then trims.
pub fn strip_json_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.trim_start();
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Scores arrive as JSON numbers of any shape. Fractions are floored so a
/// score below 100 never reaches the passing mark.
fn clamp_score(score: f64) -> u8 {
    if score.is_nan() {
        0
    } else {
        score.floor().clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAudit {
    #[serde(default)]
    is_valid: bool,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    word_count: f64,
    #[serde(default)]
    feedback: Vec<String>,
}

impl RawAudit {
    fn parse(raw: &str) -> Result<Self, ParseError> {
        let body = strip_json_fence(raw);
        if body.is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(serde_json::from_str(body)?)
    }
}

/// Factual audit of the draft against the source documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAudit {
    pub is_valid: bool,
    pub score: u8,
    pub feedback: Vec<String>,
}

impl ContentAudit {
    pub fn new(is_valid: bool, score: u8, feedback: Vec<String>) -> Self {
        Self {
            is_valid,
            score: score.min(100),
            feedback,
        }
    }

    pub fn sentinel() -> Self {
        Self::new(false, 0, vec![PARSE_ERROR_FEEDBACK.to_string()])
    }

    pub fn try_parse(raw: &str) -> Result<Self, ParseError> {
        let audit = RawAudit::parse(raw)?;
        Ok(Self::new(
            audit.is_valid,
            clamp_score(audit.score),
            audit.feedback,
        ))
    }

    /// Parses `raw`, substituting the sentinel when it is malformed.
    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw).unwrap_or_else(|e| {
            warn!("Content audit response could not be parsed: {}", e);
            Self::sentinel()
        })
    }
}

/// Structural audit of the draft: layout, length and style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatAudit {
    pub is_valid: bool,
    pub score: u8,
    pub word_count: u32,
    pub feedback: Vec<String>,
}

impl FormatAudit {
    pub fn new(is_valid: bool, score: u8, word_count: u32, feedback: Vec<String>) -> Self {
        Self {
            is_valid,
            score: score.min(100),
            word_count,
            feedback,
        }
    }

    pub fn sentinel() -> Self {
        Self::new(false, 0, 0, vec![PARSE_ERROR_FEEDBACK.to_string()])
    }

    pub fn try_parse(raw: &str) -> Result<Self, ParseError> {
        let audit = RawAudit::parse(raw)?;
        let word_count = if audit.word_count.is_finite() && audit.word_count > 0.0 {
            audit.word_count.round().min(f64::from(u32::MAX)) as u32
        } else {
            0
        };
        Ok(Self::new(
            audit.is_valid,
            clamp_score(audit.score),
            word_count,
            audit.feedback,
        ))
    }

    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw).unwrap_or_else(|e| {
            warn!("Format audit response could not be parsed: {}", e);
            Self::sentinel()
        })
    }
}
