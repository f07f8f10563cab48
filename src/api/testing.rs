//! Recording transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ApiRequest, Method, RawResponse, Transport};
use crate::error::{AppError, Result};

enum Reply {
    Response(RawResponse),
    Offline,
}

/// Transport that answers from canned replies and records every request.
///
/// Route replies (`on`) take priority over the FIFO queue (`respond`).
/// Anything unmatched answers 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    queue: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next unrouted request.
    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.queue.lock().unwrap().push_back(Reply::Response(RawResponse {
            status,
            body: body.to_string(),
        }));
    }

    /// Queue a connection failure for the next unrouted request.
    pub(crate) fn offline(&self) {
        self.queue.lock().unwrap().push_back(Reply::Offline);
    }

    /// Register a reply for a method and path; repeated calls queue further replies.
    pub(crate) fn on(&self, method: Method, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Reply::Response(RawResponse {
                status,
                body: body.to_string(),
            }));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let routed = {
            let mut routes = self.routes.lock().unwrap();
            let key = (request.method, request.path.clone());
            match routes.get_mut(&key) {
                // Last routed reply sticks, so refetches keep working.
                Some(replies) if replies.len() > 1 => replies.pop_front(),
                Some(replies) => replies.front().map(|r| match r {
                    Reply::Response(raw) => Reply::Response(raw.clone()),
                    Reply::Offline => Reply::Offline,
                }),
                None => None,
            }
        };

        let reply = routed.or_else(|| self.queue.lock().unwrap().pop_front());
        match reply {
            Some(Reply::Response(raw)) => Ok(raw),
            Some(Reply::Offline) => Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            None => Ok(RawResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}
