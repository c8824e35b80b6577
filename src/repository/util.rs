//! Repository utilities.

use diesel::result::DatabaseErrorInformation;

/// Simple error info wrapper for database errors.
#[derive(Debug)]
pub struct DbErrorInfo(pub String);

impl DatabaseErrorInformation for DbErrorInfo {
    fn message(&self) -> &str {
        &self.0
    }
    fn details(&self) -> Option<&str> {
        None
    }
    fn hint(&self) -> Option<&str> {
        None
    }
    fn table_name(&self) -> Option<&str> {
        None
    }
    fn column_name(&self) -> Option<&str> {
        None
    }
    fn constraint_name(&self) -> Option<&str> {
        None
    }
    fn statement_position(&self) -> Option<i32> {
        None
    }
}

/// Convert any displayable error to a diesel error with proper message.
pub fn to_diesel_error(e: impl std::fmt::Display) -> diesel::result::Error {
    diesel::result::Error::DatabaseError(
        diesel::result::DatabaseErrorKind::Unknown,
        Box::new(DbErrorInfo(e.to_string())),
    )
}

/// Serialize a route list for storage; empty lists are stored as NULL.
pub fn routes_to_json(routes: &[String]) -> Option<String> {
    if routes.is_empty() {
        return None;
    }
    serde_json::to_string(routes).ok()
}

/// Parse a stored route list, treating NULL or malformed JSON as empty.
pub fn routes_from_json(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_json() {
        assert_eq!(routes_to_json(&[]), None);
        let stored = routes_to_json(&["GMP-CJU".to_string()]);
        assert_eq!(stored.as_deref(), Some(r#"["GMP-CJU"]"#));
        assert_eq!(routes_from_json(stored), vec!["GMP-CJU".to_string()]);
        assert!(routes_from_json(Some("not json".to_string())).is_empty());
        assert!(routes_from_json(None).is_empty());
    }
}
