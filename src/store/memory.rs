use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ validate_username, StoreError, UserStore };
use crate::models::chat::UserRecord;

#[derive(Default)]
pub struct MemoryUserStore {
    records: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn load(&self, username: &str) -> Result<UserRecord, StoreError> {
        let username = validate_username(username)?;
        let records = self.records.read().await;
        Ok(records.get(username).cloned().unwrap_or_else(|| UserRecord::empty(username)))
    }

    async fn save(&self, username: &str, record: &UserRecord) -> Result<(), StoreError> {
        let username = validate_username(username)?;
        self.records.write().await.insert(username.to_string(), record.clone());
        Ok(())
    }

    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        let username = validate_username(username)?;
        Ok(self.records.read().await.contains_key(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Chat;

    #[tokio::test]
    async fn behaves_like_a_store() {
        let store = MemoryUserStore::new();
        assert_eq!(store.load("dana").await.unwrap(), UserRecord::empty("dana"));
        assert!(!store.exists("dana").await.unwrap());

        let mut record = UserRecord::empty("dana");
        record.chats.push(Chat::new("1".into(), None));
        store.save("dana", &record).await.unwrap();

        assert!(store.exists("dana").await.unwrap());
        assert_eq!(store.load("dana").await.unwrap(), record);
    }
}
