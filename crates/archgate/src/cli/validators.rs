//! CLI input validation used by clap's `value_parser`.

use crate::domain::MAX_TITLE_LENGTH;

/// Validate and trim a review id prefix.
pub fn validate_prefix(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    crate::config::validate_prefix(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate a review id of the form `prefix-hash`.
pub fn validate_review_id(s: &str) -> Result<String, String> {
    let s = s.trim();
    let Some((prefix, hash)) = s.split_once('-') else {
        return Err(format!(
            "Invalid review id '{s}'. Expected format: prefix-hash (e.g. rev-a3f8)"
        ));
    };
    validate_prefix(prefix).map_err(|e| format!("Review id prefix: {e}"))?;
    if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!(
            "Invalid review id '{s}': hash must be non-empty and alphanumeric"
        ));
    }
    Ok(s.to_string())
}

/// Validate a review title.
pub fn validate_title(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!("Title cannot exceed {MAX_TITLE_LENGTH} characters"));
    }
    Ok(trimmed.to_string())
}

/// Validate a non-blank name (actor, applicant, node id).
pub fn validate_name(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Value cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}
