use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error_catalog::{fetch_error, CatalogResult, CatalogSource};
use crate::mutation::{
    DependentRead, MutationError, MutationInvocation, MutationResult, MutationTransport,
    ReadRefresher,
};
use crate::notification::{Notification, NotificationSink};
use crate::platform::runtime;

/// Sink that keeps every notification for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Transport replaying scripted results in order; resolves `null` once exhausted.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<MutationResult<Value>>>,
    invocations: Mutex<Vec<MutationInvocation>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(self, payload: Value) -> Self {
        self.script.lock().unwrap().push_back(Ok(payload));
        self
    }

    pub fn reject(self, error: MutationError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn invocations(&self) -> Vec<MutationInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl MutationTransport for ScriptedTransport {
    async fn invoke(&self, invocation: MutationInvocation) -> MutationResult<Value> {
        self.invocations.lock().unwrap().push(invocation);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }
}

/// Refresher recording the query text of every refreshed read.
#[derive(Default)]
pub struct RecordingRefresher {
    refreshed: Mutex<Vec<String>>,
    failure: Mutex<Option<MutationError>>,
    latency: Duration,
}

impl RecordingRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every refresh by `latency` before recording it.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes every subsequent refresh fail with `error`.
    pub fn fail_with(&self, error: MutationError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn refreshed(&self) -> Vec<String> {
        self.refreshed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReadRefresher for RecordingRefresher {
    async fn refresh(&self, read: &DependentRead) -> MutationResult<()> {
        runtime::sleep(self.latency).await;
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        self.refreshed.lock().unwrap().push(read.query.clone());
        Ok(())
    }
}

/// Catalog source counting fetches per locale, with optional artificial latency.
#[derive(Default)]
pub struct CountingCatalogSource {
    documents: HashMap<String, String>,
    latency: Duration,
    fetches: Mutex<HashMap<String, usize>>,
}

impl CountingCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, locale: &str, document: &str) -> Self {
        self.documents.insert(locale.to_string(), document.to_string());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn fetches(&self, locale: &str) -> usize {
        self.fetches.lock().unwrap().get(locale).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl CatalogSource for CountingCatalogSource {
    async fn fetch(&self, locale: &str) -> CatalogResult<String> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(locale.to_string())
            .or_insert(0) += 1;
        runtime::sleep(self.latency).await;
        self.documents
            .get(locale)
            .cloned()
            .ok_or_else(|| fetch_error(format!("no catalog for `{locale}`")).with_status(404))
    }
}
