//! Diagnostic hooks around each HTTP exchange with the model server.
//!
//! An [`HttpObserver`] is told about every outgoing request right
//! before it is sent and every response right after its body has been
//! read. Observers only look, they can't change the exchange.
//! [`HttpLogger`] prints both sides with credentials redacted.

use std::fmt::Write;

use http::{HeaderMap, StatusCode};
use serde_json::Value;

/// A response that has been fully read from the wire.
#[derive(Debug)]
pub struct ReceivedResponse<'a> {
    pub status: StatusCode,
    pub headers: &'a HeaderMap,
    pub body: &'a [u8],
}

pub trait HttpObserver: Send + Sync {
    fn before_send(&self, _request: &reqwest::Request) {}

    fn after_receive(&self, _response: &ReceivedResponse<'_>) {}
}

pub type BoxedHttpObserver = Box<dyn HttpObserver + 'static>;

/// Prints every request and response to stdout.
#[derive(Clone, Debug, Default)]
pub struct HttpLogger;

impl HttpObserver for HttpLogger {
    fn before_send(&self, request: &reqwest::Request) {
        print!("{}", render_request(request));
    }

    fn after_receive(&self, response: &ReceivedResponse<'_>) {
        print!("{}", render_response(response));
    }
}

pub fn render_request(request: &reqwest::Request) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Request: {} {}", request.method(), request.url());
    render_headers(&mut out, request.headers());
    let body = request.body().and_then(|b| b.as_bytes()).unwrap_or_default();
    render_body(&mut out, body);
    out
}

pub fn render_response(response: &ReceivedResponse<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Response: status_code={}", response.status.as_u16());
    render_headers(&mut out, response.headers);
    render_body(&mut out, response.body);
    out
}

fn render_headers(out: &mut String, headers: &HeaderMap) {
    let _ = writeln!(out, "  Headers:");
    for (name, value) in headers.iter() {
        let value = String::from_utf8_lossy(value.as_bytes());
        let _ = writeln!(out, "    {}: {}", name, redact_header(name.as_str(), &value));
    }
}

fn render_body(out: &mut String, body: &[u8]) {
    let _ = writeln!(out, "  Body:");
    let text = match serde_json::from_slice::<Value>(body) {
        Ok(json) => serde_json::to_string_pretty(&json)
            .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned()),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    };
    for line in text.lines() {
        let _ = writeln!(out, "    {}", line);
    }
}

/// Hides credentials. Cookies keep their name so you can still tell
/// which one was sent.
pub fn redact_header(name: &str, value: &str) -> String {
    if name.eq_ignore_ascii_case("authorization") {
        return String::from("[...]");
    }
    if name.eq_ignore_ascii_case("cookie") || name.eq_ignore_ascii_case("set-cookie") {
        let cookie_name = value.split('=').next().unwrap_or_default();
        return format!("{}=...", cookie_name);
    }
    value.to_string()
}
