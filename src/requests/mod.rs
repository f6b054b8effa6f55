//! Request validation: raw form bodies in, typed fill data out.

pub mod permission;
pub mod validate;

pub use self::permission::{PermissionInput, StorePermissionRequest, UpdatePermissionRequest};

use crate::errors::AppError;

/// Parse a URL-encoded form body, keeping duplicate keys (checkbox lists).
pub fn parse_form_body(body: &str) -> Result<Vec<(String, String)>, AppError> {
    serde_urlencoded::from_str(body)
        .map_err(|e| AppError::Validation(vec![format!("Malformed form body: {e}")]))
}

pub fn get_field<'a>(params: &'a [(String, String)], key: &str) -> &'a str {
    params.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

pub fn get_all<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    params.iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_duplicate_keys() {
        let params = parse_form_body("name=Edit+Articles&roles=1&roles=3&slug=edit%2Earticles").unwrap();
        assert_eq!(get_field(&params, "name"), "Edit Articles");
        assert_eq!(get_field(&params, "slug"), "edit.articles");
        assert_eq!(get_all(&params, "roles"), vec!["1", "3"]);
        assert_eq!(get_field(&params, "missing"), "");
    }
}
