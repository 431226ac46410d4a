use log::debug;
use std::collections::{ HashMap, VecDeque };
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::llm::ModelChoice;

pub const DEFAULT_CACHE_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub prompt: String,
    pub model: ModelChoice,
}

impl CacheKey {
    pub fn new(prompt: &str, model: ModelChoice) -> Self {
        Self { prompt: prompt.to_string(), model }
    }
}

#[derive(Default)]
struct Entries {
    map: HashMap<CacheKey, String>,
    order: VecDeque<CacheKey>,
}

/// Bounded reply memo. When full, the oldest inserted entry is dropped.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Arc<Mutex<Entries>>,
    capacity: usize,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Entries::default())),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        let guard = self.inner.lock().await;
        guard.map.get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, value: String) {
        if self.capacity == 0 {
            return;
        }
        let mut guard = self.inner.lock().await;
        if guard.map.insert(key.clone(), value).is_some() {
            return;
        }
        guard.order.push_back(key);
        while guard.order.len() > self.capacity {
            if let Some(evicted) = guard.order.pop_front() {
                guard.map.remove(&evicted);
                debug!("Evicted cached reply for model {}", evicted.model.display_name());
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.map.len()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
