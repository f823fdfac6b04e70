use crate::client::Gateway;
use crate::endpoint::Endpoint;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Data(Value),
    Status(u16, String),
}

#[derive(Debug, Default)]
struct MockState {
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    calls: Vec<String>,
    submissions: Vec<String>,
}

/// In-memory gateway serving canned payloads keyed by endpoint path.
/// Used by the dashboard tests and for running the UI without a backend.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(self, endpoint: Endpoint, data: Value) -> Self {
        self.set_data(endpoint, data);
        self
    }

    pub fn set_data(&self, endpoint: Endpoint, data: Value) {
        self.lock().replies.insert(endpoint.to_string(), Reply::Data(data));
    }

    pub fn set_status(&self, endpoint: Endpoint, status: u16, body: impl Into<String>) {
        self.lock()
            .replies
            .insert(endpoint.to_string(), Reply::Status(status, body.into()));
    }

    /// Hold every response for `endpoint` for `delay` before answering.
    pub fn set_delay(&self, endpoint: Endpoint, delay: Duration) {
        self.lock().delays.insert(endpoint.to_string(), delay);
    }

    /// Paths requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn submissions(&self) -> Vec<String> {
        self.lock().submissions.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test thread must not poison the other tests' view.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn answer(&self, endpoint: &Endpoint) -> Result<Value> {
        let path = endpoint.to_string();
        let (reply, delay) = {
            let mut state = self.lock();
            state.calls.push(path.clone());
            (
                state.replies.get(&path).cloned(),
                state.delays.get(&path).copied(),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Some(Reply::Data(data)) => Ok(data),
            Some(Reply::Status(status, body)) => Err(ClientError::Status { path, status, body }),
            None => Err(ClientError::Unmocked { path }),
        }
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn get(&self, endpoint: &Endpoint) -> Result<Value> {
        self.answer(endpoint).await
    }

    async fn submit_sentiment(&self, text: &str) -> Result<Value> {
        self.lock().submissions.push(text.to_string());
        self.answer(&Endpoint::SentimentSubmit).await
    }
}
