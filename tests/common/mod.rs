//! Shared test doubles for the accessor integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use gcecloud::cloud::{CallScope, CallScopeProvider, Filter, Key, KeyScope, Resource, ResourceService, ScopeHandle};
use gcecloud::error::{Error, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// In-memory resource service keyed by [`Key`] display form
pub struct FakeService<R> {
    objects: Mutex<BTreeMap<String, R>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl<R: Resource> FakeService<R> {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Service whose every call takes `delay`
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn seed(self, key: &Key, obj: R) -> Self {
        self.objects.lock().unwrap().insert(key.to_string(), obj);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.objects.lock().unwrap().contains_key(&key.to_string())
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceService<R> for FakeService<R> {
    async fn get(&self, _scope: &ScopeHandle, key: &Key) -> Result<R> {
        self.enter().await;
        self.objects
            .lock()
            .unwrap()
            .get(&key.to_string())
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{} not found", key)))
    }

    async fn list(&self, _scope: &ScopeHandle, _location: &KeyScope, filter: &Filter) -> Result<Vec<R>> {
        self.enter().await;
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .values()
            .filter(|obj| serde_json::to_value(obj).map(|v| filter.matches(&v)).unwrap_or(false))
            .cloned()
            .collect())
    }

    async fn insert(&self, _scope: &ScopeHandle, key: &Key, obj: &R) -> Result<()> {
        self.enter().await;
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&key.to_string()) {
            return Err(Error::conflict(format!("{} already exists", key)));
        }
        objects.insert(key.to_string(), obj.clone());
        Ok(())
    }

    async fn update(&self, _scope: &ScopeHandle, key: &Key, obj: &R) -> Result<()> {
        self.enter().await;
        let mut objects = self.objects.lock().unwrap();
        match objects.get_mut(&key.to_string()) {
            Some(existing) => {
                *existing = obj.clone();
                Ok(())
            }
            None => Err(Error::not_found(format!("{} not found", key))),
        }
    }

    async fn delete(&self, _scope: &ScopeHandle, key: &Key) -> Result<()> {
        self.enter().await;
        self.objects
            .lock()
            .unwrap()
            .remove(&key.to_string())
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("{} not found", key)))
    }
}

/// Hands out scopes whose deadline has already passed
pub struct ExpiredScopes;

impl CallScopeProvider for ExpiredScopes {
    fn acquire(&self) -> CallScope {
        CallScope::with_deadline(Instant::now(), Duration::from_secs(1))
    }
}
