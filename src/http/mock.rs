//! Scripted in-memory transport for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::request::{HttpRequest, HttpResponse};
use super::transport::{AsyncTransport, Transport};
use crate::error::BoxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Auth,
    Rest,
    Soap,
}

fn route_of(request: &HttpRequest) -> Option<Route> {
    let host = request.url.host_str()?;
    if host.contains(".auth.") {
        Some(Route::Auth)
    } else if host.contains(".rest.") {
        Some(Route::Rest)
    } else if host.contains(".soap.") {
        Some(Route::Soap)
    } else {
        None
    }
}

/// Answers every request to a route with the same canned response and
/// records what was sent. Unscripted routes fail like a refused connection.
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Vec<(Route, HttpResponse)>,
    delay: Option<Duration>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn respond(mut self, route: Route, status: u16, body: &str) -> Self {
        self.responses.push((route, HttpResponse::new(status, body)));
        self
    }

    pub(crate) fn auth(self, status: u16, body: &str) -> Self {
        self.respond(Route::Auth, status, body)
    }

    pub(crate) fn rest(self, status: u16, body: &str) -> Self {
        self.respond(Route::Rest, status, body)
    }

    pub(crate) fn soap(self, status: u16, body: &str) -> Self {
        self.respond(Route::Soap, status, body)
    }

    /// Hold every response for `delay`, widening race windows.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub(crate) fn calls_to(&self, route: Route) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|req| route_of(req) == Some(route))
            .count()
    }

    fn answer(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let route = route_of(&request);
        self.sent.lock().unwrap().push(request);
        self.responses
            .iter()
            .find(|(r, _)| Some(*r) == route)
            .map(|(_, response)| response.clone())
            .ok_or_else(|| "connection refused".into())
    }
}

impl Transport for MockTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.answer(request)
    }
}

#[async_trait]
impl AsyncTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer(request)
    }
}
