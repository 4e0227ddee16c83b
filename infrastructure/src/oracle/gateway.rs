//! HTTP LLM Gateway implementation

use super::session::{Endpoint, HttpSession};
use async_trait::async_trait;
use ecogroup_application::{GatewayError, LlmGateway, LlmSession};
use ecogroup_domain::Model;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Settings for [`HttpLlmGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpGatewayConfig {
    /// Base URL; `/chat/completions` is appended.
    pub endpoint: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout: Duration,
}

impl HttpGatewayConfig {
    /// Read the API key from `api_key_env`. A missing variable leaves the
    /// key unset.
    pub fn from_env(
        endpoint: impl Into<String>,
        api_key_env: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        let api_key = std::env::var(api_key_env).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("{} is not set; oracle requests are sent without a token", api_key_env);
        }
        Self {
            endpoint: endpoint.into(),
            api_key,
            temperature,
            timeout,
        }
    }
}

/// LLM Gateway for OpenAI-compatible chat completion endpoints
pub struct HttpLlmGateway {
    endpoint: Arc<Endpoint>,
}

impl HttpLlmGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        let url = format!(
            "{}/chat/completions",
            config.endpoint.trim_end_matches('/')
        );
        info!("HttpLlmGateway initialized for {}", url);

        Ok(Self {
            endpoint: Arc::new(Endpoint {
                client,
                url,
                api_key: config.api_key,
                temperature: config.temperature,
            }),
        })
    }

    /// Full URL requests are sent to.
    pub fn url(&self) -> &str {
        &self.endpoint.url
    }
}

#[async_trait]
impl LlmGateway for HttpLlmGateway {
    async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(HttpSession::new(
            Arc::clone(&self.endpoint),
            model.clone(),
            None,
        )))
    }

    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(HttpSession::new(
            Arc::clone(&self.endpoint),
            model.clone(),
            Some(system_prompt),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64 * 1024];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{}", addr), handle)
    }

    fn gateway(endpoint: String) -> HttpLlmGateway {
        HttpLlmGateway::new(HttpGatewayConfig {
            endpoint,
            api_key: Some("secret".into()),
            temperature: 0.2,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_returns_first_choice() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"Gadidae\":\"Fish\"}"}}]}"#,
        )
        .await;
        let gateway = gateway(endpoint);

        let session = gateway
            .create_session_with_system_prompt(&Model::Gemini, "be brief")
            .await
            .unwrap();
        let reply = session.send("classify Gadidae").await.unwrap();
        assert_eq!(reply, r#"{"Gadidae":"Fish"}"#);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /chat/completions"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"));
        assert!(request.contains("classify Gadidae"));
        assert!(request.contains(Model::Gemini.api_id()));
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_transient_error() {
        let (endpoint, _server) =
            serve_once("429 Too Many Requests", r#"{"error":"slow down"}"#).await;
        let gateway = gateway(endpoint);

        let session = gateway.create_session(&Model::default()).await.unwrap();
        let err = session.send("hi").await.unwrap_err();
        assert!(matches!(err, GatewayError::RateLimited(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_bad_request_is_permanent() {
        let (endpoint, _server) = serve_once("400 Bad Request", r#"{"error":"bad model"}"#).await;
        let gateway = gateway(endpoint);

        let session = gateway.create_session(&Model::default()).await.unwrap();
        let err = session.send("hi").await.unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let session = gateway(endpoint)
            .create_session(&Model::default())
            .await
            .unwrap();
        let err = session.send("hi").await.unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_url_joins_endpoint() {
        let gateway = gateway("https://api.example.org/v1/".to_string());
        assert_eq!(gateway.url(), "https://api.example.org/v1/chat/completions");
    }
}
