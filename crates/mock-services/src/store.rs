//! In-memory profile store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use console_core::{
    async_trait, merge_documents, ConsoleError, ProfileStore, ProfileUpdate, UserProfile,
};
use serde_json::Value;

use crate::completion::lock;

/// A [`ProfileStore`] keeping documents in a map.
///
/// Counts merges so tests can assert that a workflow never wrote.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Value>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without counting it as a write.
    pub fn insert_document(&self, user_id: &str, document: Value) {
        lock(&self.documents).insert(user_id.to_string(), document);
    }

    /// Seed a profile without counting it as a write.
    pub fn insert_profile(&self, profile: &UserProfile) -> Result<(), ConsoleError> {
        let document = serde_json::to_value(profile)
            .map_err(|e| ConsoleError::Store(e.to_string()))?;
        self.insert_document(&profile.user_id, document);
        Ok(())
    }

    /// The stored document for a user.
    pub fn document(&self, user_id: &str) -> Option<Value> {
        lock(&self.documents).get(user_id).cloned()
    }

    /// Number of merges performed.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent merges fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<UserProfile, ConsoleError> {
        let document = self
            .document(user_id)
            .ok_or_else(|| ConsoleError::profile_not_found(user_id))?;
        let mut profile: UserProfile =
            serde_json::from_value(document).map_err(|e| ConsoleError::Store(e.to_string()))?;
        profile.user_id = user_id.to_string();
        Ok(profile)
    }

    async fn merge(&self, user_id: &str, update: ProfileUpdate) -> Result<(), ConsoleError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ConsoleError::Store("write rejected".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut documents = lock(&self.documents);
        let document = documents
            .entry(user_id.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        merge_documents(document, update.into_document());
        Ok(())
    }

    async fn exists(&self, user_id: &str) -> Result<bool, ConsoleError> {
        Ok(lock(&self.documents).contains_key(user_id))
    }
}
