//! Combines the content audit and the format audit into one gating result.

pub mod audit;
pub mod merger;

pub use audit::{strip_json_fence, ContentAudit, FormatAudit, PARSE_ERROR_FEEDBACK};
pub use merger::{merge, ValidationResult, PASSING_SCORE};
