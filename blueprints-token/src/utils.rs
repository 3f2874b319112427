use std::fs::read_to_string;
use std::path::Path;

use crate::error::TokenError;

/// Read a PEM file and check that it at least looks like PEM
///
/// # Arguments
///
/// * `path` - Path to the PEM file
///
/// # Returns
///
/// The file contents or TokenError if the file cannot be read or has no PEM markers
pub fn read_pem_file(path: impl AsRef<Path>) -> Result<String, TokenError> {
    let path = path.as_ref();
    let contents = read_to_string(path)?;
    if !contents.contains("-----BEGIN") {
        return Err(TokenError::invalid_key(format!(
            "{} does not contain a PEM block",
            path.display()
        )));
    }
    Ok(contents)
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively and surrounding whitespace is ignored.
/// Returns `None` for any other scheme or an empty token.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let header_value = header_value.trim();
    let (scheme, token) = header_value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
