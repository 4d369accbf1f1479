//! Purpose: Provide a blocking HTTP client for the sum endpoint.
//! Exports: `RemoteClient`.
//! Role: Client half of the demo; mirrors `SumService::handle` across the network.
//! Invariants: Request/response envelopes are the shared types in `api::wire`.
//! Invariants: Failures are terminal; the client never retries on its own.
#![allow(clippy::result_large_err)]

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::wire::{ErrorEnvelope, SumRequest, SumResponse};
use crate::core::error::{Error, ErrorKind};
use crate::core::numeric::NumericArray;

type ApiResult<T> = Result<T, Error>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<RemoteClientInner>,
}

struct RemoteClientInner {
    sum_url: Url,
    agent: ureq::Agent,
}

impl RemoteClient {
    /// Accepts either the full endpoint (`http://host:port/sum`) or a bare
    /// server URL, in which case `/sum` is appended.
    pub fn new(url: impl Into<String>) -> ApiResult<Self> {
        let sum_url = normalize_sum_url(url.into())?;
        Ok(Self {
            inner: Arc::new(RemoteClientInner {
                sum_url,
                agent: build_agent(DEFAULT_TIMEOUT),
            }),
        })
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(RemoteClientInner {
                sum_url: self.inner.sum_url.clone(),
                agent: build_agent(timeout),
            }),
        }
    }

    pub fn sum_url(&self) -> &Url {
        &self.inner.sum_url
    }

    pub fn sum_integers(&self, input: &[i64]) -> ApiResult<SumResponse> {
        self.post_json(&self.inner.sum_url, &SumRequest::new(input))
    }

    pub fn sum_reals(&self, input: &[f64]) -> ApiResult<SumResponse> {
        self.post_json(&self.inner.sum_url, &SumRequest::new(input))
    }

    pub fn sum(&self, array: &NumericArray) -> ApiResult<SumResponse> {
        match array {
            NumericArray::Integer(values) => self.sum_integers(values),
            NumericArray::Real(values) => self.sum_reals(values),
        }
    }

    pub fn health(&self) -> ApiResult<()> {
        let url = self.inner.sum_url.join("/healthz").map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("invalid health url")
                .with_source(err)
        })?;
        let response = self
            .inner
            .agent
            .get(url.as_str())
            .set("Accept", "application/json")
            .call();
        let _value: serde_json::Value = handle_response(response)?;
        Ok(())
    }

    fn post_json<T, R>(&self, url: &Url, body: &T) -> ApiResult<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_string(body).map_err(|err| {
            Error::new(ErrorKind::Encoding)
                .with_message("failed to encode request json")
                .with_source(err)
        })?;
        let response = self
            .inner
            .agent
            .post(url.as_str())
            .set("Accept", "application/json")
            .set("Content-Type", "application/json")
            .send_string(&payload);
        handle_response(response)
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

fn normalize_sum_url(input: String) -> ApiResult<Url> {
    let mut url = Url::parse(&input).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid server url")
            .with_hint("Use a URL like http://127.0.0.1:8080/sum.")
            .with_source(err)
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("server url must use http or https")
            .with_hint("Use a URL like http://127.0.0.1:8080/sum."));
    }
    if url.path().is_empty() || url.path() == "/" {
        url.set_path("/sum");
    }
    Ok(url)
}

fn handle_response<R: DeserializeOwned>(
    response: Result<ureq::Response, ureq::Error>,
) -> ApiResult<R> {
    match response {
        Ok(resp) => read_json_response(resp),
        Err(ureq::Error::Status(code, resp)) => Err(parse_error_response(code, resp)),
        Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Transport)
            .with_message("request failed")
            .with_source(err)),
    }
}

fn read_json_response<R: DeserializeOwned>(response: ureq::Response) -> ApiResult<R> {
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::Transport)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    serde_json::from_str(&body).map_err(|err| {
        Error::new(ErrorKind::Encoding)
            .with_message("invalid response json")
            .with_source(err)
    })
}

fn parse_error_response(status: u16, response: ureq::Response) -> Error {
    let body = response.into_string().unwrap_or_default();
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
        return envelope.error.into_error();
    }
    let kind = error_kind_from_status(status);
    Error::new(kind).with_message(format!("server responded with status {status}"))
}

fn error_kind_from_status(status: u16) -> ErrorKind {
    match status {
        400 => ErrorKind::MalformedPayload,
        405 | 413 => ErrorKind::Usage,
        404 => ErrorKind::NotFound,
        500..=599 => ErrorKind::Internal,
        _ => ErrorKind::Transport,
    }
}

#[cfg(test)]
mod tests {
    use super::{RemoteClient, error_kind_from_status, normalize_sum_url};
    use crate::core::error::ErrorKind;
    use std::net::TcpListener;
    use std::time::Duration;

    #[test]
    fn bare_server_url_gets_sum_path() {
        let url = normalize_sum_url("http://127.0.0.1:8080".to_string()).expect("url");
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/sum");

        let url = normalize_sum_url("http://localhost:9000/".to_string()).expect("url");
        assert_eq!(url.as_str(), "http://localhost:9000/sum");
    }

    #[test]
    fn explicit_path_is_kept() {
        let url = normalize_sum_url("http://localhost:8080/api/sum".to_string()).expect("url");
        assert_eq!(url.path(), "/api/sum");
    }

    #[test]
    fn rejects_non_http_urls() {
        for input in ["localhost:8080", "ftp://example.com/sum", "not a url"] {
            let err = normalize_sum_url(input.to_string()).expect_err("invalid url");
            assert_eq!(err.kind(), ErrorKind::Usage, "input: {input}");
        }
    }

    #[test]
    fn client_exposes_normalized_url_across_timeouts() {
        let client = RemoteClient::new("http://127.0.0.1:8080").expect("client");
        assert_eq!(client.sum_url().as_str(), "http://127.0.0.1:8080/sum");

        let client = client.with_timeout(Duration::from_millis(250));
        assert_eq!(client.sum_url().as_str(), "http://127.0.0.1:8080/sum");
    }

    #[test]
    fn status_codes_map_to_kinds() {
        let cases = [
            (400, ErrorKind::MalformedPayload),
            (404, ErrorKind::NotFound),
            (405, ErrorKind::Usage),
            (413, ErrorKind::Usage),
            (500, ErrorKind::Internal),
            (503, ErrorKind::Internal),
            (302, ErrorKind::Transport),
        ];
        for (status, kind) in cases {
            assert_eq!(error_kind_from_status(status), kind, "status: {status}");
        }
    }

    #[test]
    fn refused_connection_is_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let client = RemoteClient::new(format!("http://127.0.0.1:{port}/sum")).expect("client");
        let err = client.sum_integers(&[1, 2]).expect_err("connection refused");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
