mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryUserStore;

use async_trait::async_trait;
use log::info;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;
use crate::cli::Args;
use crate::models::chat::UserRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("user store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("user record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence for whole user records. Writes replace the record; there is no
/// coordination between concurrent writers, so the last save wins.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns the stored record, or an unsaved empty one when the user is unknown.
    async fn load(&self, username: &str) -> Result<UserRecord, StoreError>;

    async fn save(&self, username: &str, record: &UserRecord) -> Result<(), StoreError>;

    async fn exists(&self, username: &str) -> Result<bool, StoreError>;
}

/// Usernames name files on disk, so anything that could escape the data
/// directory is rejected. Surrounding whitespace is rejected rather than
/// trimmed so that " alice" never aliases "alice".
pub fn validate_username(username: &str) -> Result<&str, StoreError> {
    let invalid = username.is_empty()
        || username.trim() != username
        || username.contains(['/', '\\'])
        || username.contains("..")
        || username.chars().any(char::is_control);
    if invalid {
        return Err(StoreError::InvalidUsername(username.to_string()));
    }
    Ok(username)
}

pub async fn create_user_store(
    args: &Args
) -> Result<Arc<dyn UserStore>, Box<dyn StdError + Send + Sync>> {
    match args.store_type.to_lowercase().as_str() {
        "file" => {
            info!("User records will be stored as JSON files in: {}", args.data_dir);
            let store = JsonFileStore::open(&args.data_dir).await?;
            Ok(Arc::new(store))
        }
        "memory" => {
            info!("User records will be kept in memory only");
            Ok(Arc::new(MemoryUserStore::new()))
        }
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported user store type: {}", args.store_type)
                    )
                )
            ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_usernames() {
        assert_eq!(validate_username("alice").unwrap(), "alice");
        assert_eq!(validate_username("bob.smith").unwrap(), "bob.smith");
    }

    #[test]
    fn rejects_path_like_usernames() {
        for bad in ["", "   ", " alice ", "alice ", "../etc", "a/b", "a\\b", "..", "tab\tname"] {
            assert!(
                matches!(validate_username(bad), Err(StoreError::InvalidUsername(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }
}
