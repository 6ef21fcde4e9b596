use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };
use tokio::fs;

use super::{ validate_username, StoreError, UserStore };
use crate::models::chat::UserRecord;

/// One pretty-printed JSON document per user at `<data_dir>/<username>.json`.
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Opens the store, creating the data directory if it does not exist.
    pub async fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).await?;
        Ok(Self { data_dir })
    }

    fn user_path(&self, username: &str) -> Result<PathBuf, StoreError> {
        let username = validate_username(username)?;
        Ok(self.data_dir.join(format!("{}.json", username)))
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn load(&self, username: &str) -> Result<UserRecord, StoreError> {
        let path = self.user_path(username)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No record on disk for '{}', starting empty", username);
                Ok(UserRecord::empty(username))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, username: &str, record: &UserRecord) -> Result<(), StoreError> {
        let path = self.user_path(username)?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).await?;
        debug!("Saved {} chat(s) for '{}' to {}", record.chats.len(), username, path.display());
        Ok(())
    }

    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        let path = self.user_path(username)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ Chat, Message, Sender };
    use tempfile::tempdir;

    #[tokio::test]
    async fn unknown_user_loads_empty_without_creating_a_file() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let record = store.load("ghost").await.unwrap();

        assert_eq!(record, UserRecord::empty("ghost"));
        assert!(!store.exists("ghost").await.unwrap());
        assert!(!dir.path().join("ghost.json").exists());
    }

    #[tokio::test]
    async fn save_then_load_is_a_fixed_point() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let mut record = store.load("alice").await.unwrap();
        let mut chat = Chat::new("100".into(), Some("Greetings".into()));
        chat.messages.push(Message::new("101".into(), "hello".into(), Sender::User));
        chat.messages.push(Message::new("102".into(), "hi!".into(), Sender::Ai));
        record.chats.insert(0, chat);

        store.save("alice", &record).await.unwrap();
        let reloaded = store.load("alice").await.unwrap();
        assert_eq!(reloaded, record);

        store.save("alice", &reloaded).await.unwrap();
        assert_eq!(store.load("alice").await.unwrap(), record);
    }

    #[tokio::test]
    async fn creates_missing_data_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");
        let store = JsonFileStore::open(&nested).await.unwrap();
        store.save("bob", &UserRecord::empty("bob")).await.unwrap();
        assert!(nested.join("bob.json").is_file());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("carol.json"), "{ not json").unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        assert!(matches!(store.load("carol").await, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn rejects_traversal_usernames() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        assert!(matches!(store.load("../outside").await, Err(StoreError::InvalidUsername(_))));
    }
}
