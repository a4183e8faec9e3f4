// Scripted transport for testing - no network

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::transport::{ApiRequest, Transport, TransportError};

/// Transport that answers from per-route queues and records every request
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, TransportError>>>>,
    delays: Mutex<HashMap<String, VecDeque<Duration>>>,
    sent: Mutex<Vec<ApiRequest>>,
}

fn route_key(method: &str, path: &str) -> String {
    format!("{method} {path}")
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful payload for `method path`
    pub fn respond(self, method: &str, path: &str, payload: Value) -> Self {
        self.push(method, path, Ok(payload));
        self
    }

    /// Queue a service failure for `method path`
    pub fn fail(self, method: &str, path: &str, status: u16, message: &str) -> Self {
        self.push(
            method,
            path,
            Err(TransportError::Status {
                status,
                message: message.to_string(),
            }),
        );
        self
    }

    /// Hold the next answer for `method path` back by `delay`
    pub fn delay(self, method: &str, path: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .entry(route_key(method, path))
            .or_default()
            .push_back(delay);
        self
    }

    fn push(&self, method: &str, path: &str, response: Result<Value, TransportError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(route_key(method, path))
            .or_default()
            .push_back(response);
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.sent.lock().unwrap().last().and_then(|r| r.body.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let key = route_key(&request.method.to_string(), &request.path);
        self.sent.lock().unwrap().push(request);

        let delay = self
            .delays
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&key);
        match queue {
            // The last scripted answer keeps being served once the queue drains
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Ok(Value::Null)),
            Some(queue) => queue.front().cloned().unwrap_or(Ok(Value::Null)),
            None => Err(TransportError::Status {
                status: 404,
                message: format!("No scripted response for {key}"),
            }),
        }
    }
}
