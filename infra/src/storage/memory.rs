//! Process-local storage

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use cg_core::errors::StorageError;
use cg_core::services::DurableStorage;

/// Storage that lives as long as the process
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DurableStorage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get("missing").unwrap(), None);

        storage.set("otp:code_issued_at:a@b.com", "1714564800000").unwrap();
        storage.set("otp:code_issued_at:a@b.com", "1714564860000").unwrap();
        assert_eq!(
            storage.get("otp:code_issued_at:a@b.com").unwrap(),
            Some("1714564860000".to_string())
        );
        assert_eq!(storage.len(), 1);

        storage.remove("otp:code_issued_at:a@b.com").unwrap();
        storage.remove("otp:code_issued_at:a@b.com").unwrap();
        assert!(storage.is_empty());
    }
}
