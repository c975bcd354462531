//! Scripted [`SessionBackend`] for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tokio::sync::oneshot;

use cyclegraph_api::SessionReport;

use crate::error::{Result, SyncError};
use crate::source::SessionBackend;

struct Scripted<T> {
    result: Result<T>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Backend whose responses are queued up front and handed out in call order.
///
/// A gated response holds its caller until the returned sender fires (or is
/// dropped), which lets tests finish requests out of order.
#[derive(Default)]
pub struct FakeBackend {
    lists: Mutex<VecDeque<Scripted<Value>>>,
    reports: Mutex<VecDeque<Scripted<SessionReport>>>,
    versions: Mutex<VecDeque<Result<Option<String>>>>,
    report_ids: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
    report_calls: AtomicUsize,
    version_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_list(&self, result: Result<Value>) {
        push(&self.lists, result, None);
    }

    pub fn push_list_gated(&self, result: Result<Value>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        push(&self.lists, result, Some(rx));
        tx
    }

    pub fn push_report(&self, result: Result<SessionReport>) {
        push(&self.reports, result, None);
    }

    pub fn push_report_gated(&self, result: Result<SessionReport>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        push(&self.reports, result, Some(rx));
        tx
    }

    pub fn push_version(&self, result: Result<Option<String>>) {
        if let Ok(mut versions) = self.versions.lock() {
            versions.push_back(result);
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub fn version_calls(&self) -> usize {
        self.version_calls.load(Ordering::SeqCst)
    }

    pub fn report_ids(&self) -> Vec<String> {
        self.report_ids
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

fn push<T>(
    queue: &Mutex<VecDeque<Scripted<T>>>,
    result: Result<T>,
    gate: Option<oneshot::Receiver<()>>,
) {
    if let Ok(mut queue) = queue.lock() {
        queue.push_back(Scripted { result, gate });
    }
}

fn pop<T>(queue: &Mutex<VecDeque<Scripted<T>>>) -> Option<Scripted<T>> {
    queue.lock().ok()?.pop_front()
}

async fn resolve<T>(scripted: Option<Scripted<T>>, what: &str) -> Result<T> {
    let Some(Scripted { result, gate }) = scripted else {
        return Err(SyncError::Network(format!("no scripted {what} response")));
    };
    if let Some(gate) = gate {
        let _ = gate.await;
    }
    result
}

impl SessionBackend for FakeBackend {
    async fn list_sessions(&self) -> Result<Value> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let next = pop(&self.lists);
        resolve(next, "list").await
    }

    async fn session_report(&self, id: &str) -> Result<SessionReport> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut ids) = self.report_ids.lock() {
            ids.push(id.to_string());
        }
        let next = pop(&self.reports);
        resolve(next, "report").await
    }

    async fn profile_version(&self) -> Result<Option<String>> {
        self.version_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.versions.lock().ok().and_then(|mut v| v.pop_front());
        next.unwrap_or(Ok(None))
    }
}
