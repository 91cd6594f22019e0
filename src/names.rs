use crate::error::ValidationError;

/// Splits a full name on whitespace: the first word is the first name, the rest the last name.
pub fn split_full_name(full_name: &str) -> Result<(String, String), ValidationError> {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().ok_or(ValidationError::EmptyName)?;
    let rest = parts.collect::<Vec<_>>().join(" ");

    Ok((first.to_string(), rest))
}
