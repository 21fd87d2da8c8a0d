//! Field checks shared by the services.

use super::error::ValidationError;

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 255;

/// Trim `value` and require it to be non-empty and at most `max` characters
pub fn required_text(value: &str, field: &'static str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

/// Like [`required_text`], but a missing or blank value becomes `None`
pub fn optional_text(
    value: Option<&str>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        Some(text) => Ok(Some(text.to_string())),
    }
}

pub fn currency_code(value: &str) -> Result<String, ValidationError> {
    let code = value.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(code.to_string())
    } else {
        Err(ValidationError::InvalidCurrencyCode)
    }
}

pub fn email(value: &str) -> Result<String, ValidationError> {
    let email = value.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') =>
        {
            Ok(email.to_string())
        }
        _ => Err(ValidationError::InvalidEmail),
    }
}
