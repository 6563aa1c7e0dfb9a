//! In-memory transport for tests.

use crate::{FetchError, Request, Response, Transport};
use async_trait::async_trait;
use http::Method;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Result<Response, FetchError>>,
}

/// Transport that answers from canned replies and records every request.
///
/// Replies are matched by method and path. A route with several replies
/// hands them out in order and repeats the last one. Unmatched requests
/// get a 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<Request>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply for `method path`.
    pub fn on(&self, method: Method, path: &str, status: u16, body: serde_json::Value) -> &Self {
        self.reply(method, path, Ok(Response::json_body(status, &body)))
    }

    /// Queue a transport failure for `method path`.
    pub fn fail(&self, method: Method, path: &str, error: FetchError) -> &Self {
        self.reply(method, path, Err(error))
    }

    fn reply(&self, method: Method, path: &str, reply: Result<Response, FetchError>) -> &Self {
        let mut routes = lock(&self.routes);
        match routes.iter_mut().find(|r| r.method == method && r.path == path) {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                path: path.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<Request> {
        lock(&self.requests).clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<Request> {
        lock(&self.requests).last().cloned()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let path = request.path().to_string();
        let method = request.method.clone();
        lock(&self.requests).push(request);

        let mut routes = lock(&self.routes);
        let Some(route) = routes.iter_mut().find(|r| r.method == method && r.path == path) else {
            return Ok(Response::json_body(
                404,
                &serde_json::json!({ "message": format!("no mock route for {} {}", method, path) }),
            ));
        };

        if route.replies.len() > 1 {
            route
                .replies
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("mock route exhausted".into())))
        } else {
            route
                .replies
                .front()
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Transport("mock route exhausted".into())))
        }
    }
}
