//! HTTP client for `POST /api/chat`.

use async_trait::async_trait;
use chatmeter_types::{ChatReply, ChatRequest, ProxyResponse};
use reqwest::Client;
use url::Url;

use crate::error::ClientError;

/// Message used when a failed proxy response carries no `error` field.
const DEFAULT_FAILURE: &str = "Failed to get response";

/// Something that can answer a chat request.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ClientError>;
}

/// Talks to a chatmeter proxy over HTTP.
pub struct ProxyClient {
    client: Client,
    endpoint: Url,
}

impl ProxyClient {
    /// `base_url` is the proxy root, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client,
            endpoint: base.join("api/chat")?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for ProxyClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ClientError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<ProxyResponse>(&body).ok();

        if !status.is_success() {
            let message = match parsed {
                Some(ProxyResponse::Error(e)) if !e.error.is_empty() => e.error,
                _ => DEFAULT_FAILURE.to_string(),
            };
            return Err(ClientError::Proxy {
                status: status.as_u16(),
                message,
            });
        }

        match parsed {
            Some(ProxyResponse::Reply(reply)) => Ok(reply),
            Some(ProxyResponse::Error(e)) => Err(ClientError::Proxy {
                status: status.as_u16(),
                message: e.error,
            }),
            None => Err(ClientError::InvalidResponse(body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use chatmeter_types::ChatMessage;
    use tokio::net::TcpListener;

    async fn spawn_proxy(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route(
            "/api/chat",
            post(move || async move { (status, [("content-type", "application/json")], body) }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request() -> ChatRequest {
        ChatRequest::Conversation {
            messages: vec![ChatMessage::user("hi")],
        }
    }

    #[test]
    fn endpoint_joins_api_path() {
        let client = ProxyClient::new("http://localhost:8080").unwrap();
        assert_eq!(client.endpoint().as_str(), "http://localhost:8080/api/chat");

        let client = ProxyClient::new("http://example.com/chat-proxy").unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "http://example.com/chat-proxy/api/chat"
        );
    }

    #[test]
    fn invalid_url_rejected() {
        assert!(matches!(
            ProxyClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn success_parses_reply() {
        let url = spawn_proxy(
            StatusCode::OK,
            r#"{"message":"hello","usage":{"input_tokens":1,"output_tokens":2,"input_cost":"0.000003","output_cost":"0.000030","total_cost":"0.000033"}}"#,
        )
        .await;

        let reply = ProxyClient::new(&url).unwrap().send(&request()).await.unwrap();
        assert_eq!(reply.message, "hello");
        assert_eq!(reply.usage.total_cost, "0.000033");
    }

    #[tokio::test]
    async fn failure_uses_error_field() {
        let url = spawn_proxy(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"Anthropic API error: Overloaded"}"#,
        )
        .await;

        let err = ProxyClient::new(&url)
            .unwrap()
            .send(&request())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Anthropic API error: Overloaded");
    }

    #[tokio::test]
    async fn failure_without_error_field_uses_default() {
        let url = spawn_proxy(StatusCode::BAD_GATEWAY, "<html>oops</html>").await;

        let err = ProxyClient::new(&url)
            .unwrap()
            .send(&request())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_FAILURE);
    }

    #[tokio::test]
    async fn unreachable_proxy_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = ProxyClient::new(&format!("http://{addr}"))
            .unwrap()
            .send(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
