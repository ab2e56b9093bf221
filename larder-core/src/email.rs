use crate::error::EmailError;

/// Normalize an email address for storage and lookup.
///
/// Surrounding whitespace is dropped and the whole address is lowercased, so
/// `Test@Example.COM` and `test@example.com` name the same account.
pub fn normalize_email(raw: &str) -> Result<String, EmailError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(EmailError::Missing);
    }

    let (local, domain) = email.split_once('@').ok_or(EmailError::Invalid)?;

    let domain_ok = !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.');

    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(EmailError::Invalid);
    }

    Ok(email.to_lowercase())
}
