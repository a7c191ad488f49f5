//! Test utilities for legalchat
//!
//! Temporary stores, input files, and error assertions shared by the unit
//! tests.

use crate::error::{LegalchatError, Result};
use crate::storage::SqliteStorage;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// SQLite store in a fresh temporary directory
///
/// The directory must outlive the store, so both are returned.
pub fn temp_store() -> (Arc<SqliteStorage>, TempDir) {
    let dir = temp_dir();
    let store = SqliteStorage::new_with_path(dir.path().join("legal_db.sqlite"))
        .expect("Failed to create sqlite storage");
    (Arc::new(store), dir)
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Assert that an error classifies as the given kind
///
/// # Panics
///
/// Panics if the error is not a [`LegalchatError`] matching `predicate`
pub fn assert_error_kind(err: &anyhow::Error, predicate: fn(&LegalchatError) -> bool) {
    match LegalchatError::kind_of(err) {
        Some(kind) if predicate(kind) => {}
        other => panic!("Unexpected error kind {:?} for '{:#}'", other, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Message;
    use crate::storage::MessageStore;

    #[test]
    fn test_temp_store_is_usable() {
        let (store, dir) = temp_store();
        store.append("s", &Message::human("hi")).unwrap();
        assert!(store.db_path().starts_with(dir.path()));
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(LegalchatError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_assert_error_kind() {
        let err: anyhow::Error = LegalchatError::InputFormat("x".to_string()).into();
        assert_error_kind(&err, |k| matches!(k, LegalchatError::InputFormat(_)));
    }

    #[test]
    #[should_panic(expected = "Unexpected error kind")]
    fn test_assert_error_kind_mismatch() {
        let err = anyhow::anyhow!("plain");
        assert_error_kind(&err, |k| matches!(k, LegalchatError::InputFormat(_)));
    }
}
