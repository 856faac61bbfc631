//! Common validation rules shared across request payloads.

use validator::ValidationError;

/// Validates a project name as a DNS label.
///
/// Requirements:
/// - lowercase alphanumeric characters and hyphens
/// - must start and end with an alphanumeric character
/// - 1-63 characters in length
pub fn validate_project_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.len() > 63 {
        return Err(ValidationError::new("project_name_invalid_length"));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::new("project_name_invalid_characters"));
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(ValidationError::new("project_name_invalid_hyphen"));
    }

    Ok(())
}

/// Validates a deployment token name.
///
/// Requirements:
/// - alphanumeric characters, underscores and hyphens
/// - 1-50 characters in length
pub fn validate_token_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.len() > 50 {
        return Err(ValidationError::new("token_name_invalid_length"));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::new("token_name_invalid_characters"));
    }

    Ok(())
}
