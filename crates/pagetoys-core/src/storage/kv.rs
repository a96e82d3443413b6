//! Key-value persistence capability.
//!
//! Widgets only ever need a handful of scalar values under fixed keys, so
//! storage is reduced to string get/set. [`Database`](super::Database) backs
//! it with SQLite; [`MemoryStore`] is the in-process substitute for tests.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;

pub trait KvStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>>;
    fn kv_set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        (**self).kv_get(key)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        (**self).kv_set(key, value)
    }
}

/// Volatile store. Single-threaded like the widgets that use it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
