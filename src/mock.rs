// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory HTTP client shared by the unit tests

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tokio::sync::Notify;

use crate::api::ApiClient;
use crate::config::ApiConfig;
use crate::http::{HttpClient, HttpRequest, HttpResponse, Method};

type Route = (Method, String);

#[derive(Default)]
struct MockState {
    responses: HashMap<Route, VecDeque<HttpResponse>>,
    gates: HashMap<Route, Arc<Notify>>,
    failing: HashSet<Route>,
    requests: Vec<HttpRequest>,
}

/// Records every request and answers from queued responses.
///
/// Paths are matched without the `/api` prefix of the default base URL.
/// The last queued response for a route is repeated; unknown routes get 404.
#[derive(Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<MockState>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api(&self) -> ApiClient<MockHttpClient> {
        ApiClient::new(self.clone(), ApiConfig::default())
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        let response = HttpResponse {
            status,
            body: Bytes::from(body.to_string()),
        };
        self.push(method, path, response)
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        let response = HttpResponse {
            status,
            body: Bytes::from(body.to_string()),
        };
        self.push(method, path, response)
    }

    /// Make every request to a route fail before any response arrives
    pub fn fail(&self, method: Method, path: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert((method, path.to_string()));
        self
    }

    fn push(&self, method: Method, path: &str, response: HttpResponse) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    /// Hold the next request to a route until the returned handle is notified.
    ///
    /// Only the first matching request is held; its response is picked
    /// from the queue after release.
    pub fn gate(&self, method: Method, path: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state
            .lock()
            .unwrap()
            .gates
            .insert((method, path.to_string()), notify.clone());
        notify
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && route_path(r) == path)
            .collect()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    /// JSON bodies sent to a route, in order
    pub fn bodies(&self, method: Method, path: &str) -> Vec<Value> {
        self.requests_to(method, path)
            .iter()
            .map(|r| serde_json::from_slice(r.body.as_ref().unwrap()).unwrap())
            .collect()
    }
}

/// A `reqwest::Error` for tests; reqwest offers no public constructor
pub fn transport_error() -> reqwest::Error {
    reqwest::Client::new()
        .get("not a url")
        .build()
        .unwrap_err()
}

fn route_path(request: &HttpRequest) -> String {
    let path = request.url.path();
    path.strip_prefix("/api").unwrap_or(path).to_string()
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, reqwest::Error> {
        let route = (request.method, route_path(&request));

        let gate = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            state.gates.remove(&route)
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        if state.failing.contains(&route) {
            return Err(transport_error());
        }
        let response = state
            .responses
            .get_mut(&route)
            .and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
            .unwrap_or_else(|| HttpResponse {
                status: 404,
                body: Bytes::from(r#"{"detail":"Not Found"}"#),
            });
        Ok(response)
    }
}
