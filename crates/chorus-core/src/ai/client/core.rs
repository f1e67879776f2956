//! Shared HTTP layer for provider adapters
//!
//! Owns the reqwest client, credential and base URL for one provider and
//! turns a JSON request into a cold `ChunkStream` of SSE events.

use futures::stream::{self, TryStreamExt};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{error, info};

use crate::ai::providers::ProviderId;
use crate::ai::sse::{sse_json_stream, stream_error_message};
use crate::ai::stream::ChunkStream;
use crate::config::ProviderSettings;
use crate::constants;
use crate::error::ChatError;

/// How the API key is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthHeader {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>`
    XApiKey,
    /// `x-goog-api-key: <key>`
    GoogApiKey,
}

pub struct HttpTransport {
    http: Client,
    provider: ProviderId,
    api_key: String,
    base_url: String,
    auth: AuthHeader,
    extra_headers: Vec<(&'static str, &'static str)>,
}

impl HttpTransport {
    /// Create the HTTP client with configuration optimized for SSE streaming
    fn create_http_client() -> Client {
        Client::builder()
            .user_agent(constants::http::USER_AGENT)
            .connect_timeout(constants::http::CONNECT_TIMEOUT)
            .timeout(constants::http::STREAM_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build HTTP client: {}. Using default client.", e);
                Client::new()
            })
    }

    /// Fails with `MissingCredential` when no usable API key is configured
    pub fn new(
        provider: ProviderId,
        settings: &ProviderSettings,
        auth: AuthHeader,
    ) -> Result<Self, ChatError> {
        let api_key = settings
            .api_key()
            .ok_or(ChatError::MissingCredential { provider })?
            .to_string();
        Ok(Self {
            http: Self::create_http_client(),
            provider,
            api_key,
            base_url: settings.base_url(provider),
            auth,
            extra_headers: Vec::new(),
        })
    }

    /// Static header sent with every request
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.extra_headers.push((name, value));
        self
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a POST with authentication and common headers
    fn build_request(&self, url: &str) -> RequestBuilder {
        let mut request = self.http.post(url);

        request = match self.auth {
            AuthHeader::Bearer => {
                request.header("authorization", format!("Bearer {}", self.api_key))
            }
            AuthHeader::XApiKey => request.header("x-api-key", &self.api_key),
            AuthHeader::GoogApiKey => request.header("x-goog-api-key", &self.api_key),
        };

        for (name, value) in &self.extra_headers {
            request = request.header(*name, *value);
        }

        request
            .header("content-type", "application/json")
            .header("accept", "text/event-stream")
    }

    /// POST `body` and stream the SSE response as JSON events
    ///
    /// Nothing is sent until the returned stream is first polled. Connection
    /// and status failures surface as the first item.
    pub fn stream_json(&self, url: String, body: Value) -> ChunkStream {
        let provider = self.provider;
        let request = self.build_request(&url).json(&body);

        let open = async move {
            info!("{} stream request: POST {}", provider, url);
            let response = request
                .send()
                .await
                .map_err(|e| ChatError::stream_fault(provider, e.to_string()))?;
            let response = handle_error_response(provider, response).await?;
            Ok::<_, ChatError>(sse_json_stream(response.bytes_stream(), provider))
        };

        ChunkStream::new(stream::once(open).try_flatten())
    }
}

/// Turn a non-success response into a `StreamFault` carrying the status
async fn handle_error_response(
    provider: ProviderId,
    response: Response,
) -> Result<Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    error!("{} API error response: {} - {}", provider, status, error_text);

    let message = serde_json::from_str::<Value>(&error_text)
        .ok()
        .and_then(|json| stream_error_message(&json))
        .or_else(|| (!error_text.trim().is_empty()).then(|| error_text.trim().to_string()))
        .unwrap_or_else(|| status.to_string());

    Err(ChatError::StreamFault {
        provider,
        status: Some(status.as_u16()),
        message,
    })
}

/// Minimal HTTP server for adapter tests
///
/// Serves one canned response per accepted connection and records the raw
/// request text.
#[cfg(test)]
pub(crate) mod test_server {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    pub struct TestServer {
        pub base_url: String,
        pub requests: Arc<Mutex<Vec<String>>>,
    }

    impl TestServer {
        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }

        pub fn last_request(&self) -> String {
            self.requests.lock().last().cloned().unwrap_or_default()
        }
    }

    /// Serve an SSE body with the given status line, e.g. `"200 OK"`
    pub async fn serve(status: &'static str, content_type: &'static str, body: String) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let request = read_request(&mut socket).await;
                seen.lock().push(request);
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    content_type,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        TestServer {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// Read headers plus a content-length body
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }
}
