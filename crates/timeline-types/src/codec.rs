//! JSON encoding of activities as stored inside feeds.
//!
//! The payload layout is:
//!
//! ```text
//! {"verb": "...", "actor": {...}, "object": {...}|null,
//!  "target": {...}|null, "created_at": "<RFC 3339 UTC>"}
//! ```
//!
//! Timestamps keep nanosecond precision, so decoding reproduces the exact
//! value that was encoded.

use crate::Activity;

/// Errors that can occur while encoding or decoding a feed payload.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON serialization or deserialization failed.
    #[error("activity serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The payload decoded but violates an activity invariant.
    #[error("invalid activity record: {0}")]
    InvalidRecord(String),
}

/// Serialises an activity into its feed payload.
///
/// # Errors
///
/// Returns `CodecError::InvalidRecord` if the verb is empty, or
/// `CodecError::Serialization` if an extra field cannot be serialised.
pub fn encode_activity(activity: &Activity) -> Result<String, CodecError> {
    if activity.verb.trim().is_empty() {
        return Err(CodecError::InvalidRecord("verb is empty".to_string()));
    }
    Ok(serde_json::to_string(activity)?)
}

/// Parses a feed payload back into an activity.
///
/// # Errors
///
/// Returns `CodecError::Serialization` for malformed JSON or missing fields,
/// and `CodecError::InvalidRecord` if the decoded verb is empty.
pub fn decode_activity(payload: &str) -> Result<Activity, CodecError> {
    let activity: Activity = serde_json::from_str(payload)?;
    if activity.verb.trim().is_empty() {
        return Err(CodecError::InvalidRecord("verb is empty".to_string()));
    }
    Ok(activity)
}
