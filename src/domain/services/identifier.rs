use crate::error::AppError;

/// One login-handle scheme for every flow: anything with an `@` is an email
/// (trimmed, lowercased), everything else is a phone number reduced to digits.
pub fn normalize_identifier(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.contains('@') {
        trimmed.to_lowercase()
    } else {
        trimmed.chars().filter(char::is_ascii_digit).collect()
    };

    if normalized.is_empty() {
        return Err(AppError::Validation("Please enter a valid mobile number or email.".into()));
    }
    Ok(normalized)
}

pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}
