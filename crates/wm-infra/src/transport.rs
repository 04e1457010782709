//! Blocking HTTP transport on `ureq`

use std::time::Duration;

use tracing::trace;
use wm_domain::repository::HttpTransport;
use wm_types::{HttpRequest, HttpResponse, TransportError};

/// Fixed per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut call = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        let outcome = match &request.body {
            Some(body) => call.send_string(body),
            None => call.call(),
        };

        // ureq reports 4xx/5xx as errors; here they are ordinary responses
        let response = match outcome {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(match err.kind() {
                    ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
                        TransportError::InvalidUrl(err.to_string())
                    }
                    _ => TransportError::Connection(err.to_string()),
                });
            }
        };

        let status = response.status();
        let content_type = response.header("content-type").map(str::to_string);
        let body = response
            .into_string()
            .map_err(|e| TransportError::Body(e.to_string()))?;
        trace!("{} {} -> {} ({} bytes)", request.method, request.url, status, body.len());

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
