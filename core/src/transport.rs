//! Executes `HttpRequest` values against the network.
//!
//! `UreqTransport` disables ureq's status-code-as-error behavior so 4xx/5xx
//! responses come back as data and `BrevoClient` decides what they mean. Only
//! failures that produce no response at all become `ApiError::Transport`.

use std::time::Duration;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// One blocking HTTP round-trip. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.timeout)
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.path);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.path);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match request.body.as_deref() {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses in order and records every request it sees.
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn respond(self, status: u16, body: &str) -> Self {
            self.responses.lock().unwrap().push_back(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }));
            self
        }

        pub fn fail(self, message: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(ApiError::Transport(message.to_string())));
            self
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".to_string())))
        }
    }
}
