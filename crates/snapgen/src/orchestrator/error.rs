use thiserror::Error;

/// Shown for any rate-limit or quota failure.
pub const QUOTA_EXCEEDED_MESSAGE: &str = "Daily quota exceeded (429). The AI model is currently busy or your API key has hit its limit. Please try again later.";

/// Shown when a failure carries no message at all.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

const RATE_LIMIT_MARKERS: [&str; 3] = ["429", "quota", "RESOURCE_EXHAUSTED"];

/// Failure reported by the generation or audit service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("{0}")]
    Service(String),
}

impl ServiceError {
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ServiceError::RateLimited(_) => true,
            ServiceError::Service(message) => {
                RATE_LIMIT_MARKERS.iter().any(|m| message.contains(m))
            }
        }
    }

    /// Message suitable for showing to the analyst.
    pub fn friendly_message(&self) -> String {
        if self.is_rate_limited() {
            return QUOTA_EXCEEDED_MESSAGE.to_string();
        }
        match self {
            ServiceError::Service(message) if !message.trim().is_empty() => message.clone(),
            _ => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("A pipeline run is already in progress")]
    Busy,

    #[error("AI service failed: {0}")]
    Service(#[from] ServiceError),
}
