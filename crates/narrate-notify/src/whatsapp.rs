//! WhatsApp gateway notifier

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::NotifyError;
use crate::notifier::Notifier;

/// WhatsApp gateway configuration
#[derive(Clone, Debug)]
pub struct WhatsAppConfig {
    /// Endpoint accepting `{"phoneNumber", "message"}` JSON posts
    pub api_url: String,
    /// Bearer API key for the gateway
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    phone_number: &'a str,
    message: &'a str,
}

/// Notifier backed by an HTTP messaging gateway
pub struct WhatsAppNotifier {
    config: WhatsAppConfig,
    client: Client,
}

impl WhatsAppNotifier {
    /// Create a new gateway notifier
    pub fn new(config: WhatsAppConfig) -> Result<Self, NotifyError> {
        if config.api_url.is_empty() {
            return Err(NotifyError::Configuration(
                "WhatsApp gateway URL is not set".to_string(),
            ));
        }
        if config.api_key.is_empty() {
            return Err(NotifyError::Configuration(
                "WhatsApp gateway API key is not set".to_string(),
            ));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        info!("Created WhatsApp notifier for {}", config.api_url);

        Ok(Self { config, client })
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    async fn send(&self, phone_number: &str, message: &str) -> Result<(), NotifyError> {
        debug!("Sending message through WhatsApp gateway");

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&SendRequest {
                phone_number,
                message,
            })
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(NotifyError::Unauthorized);
        }

        if !status.is_success() {
            return Err(NotifyError::GatewayError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode as GatewayStatus};
    use axum::routing::post;
    use serde_json::Value;
    use tokio::net::TcpListener;

    /// Serve `router` on an ephemeral port and return its send URL
    async fn spawn_gateway(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/send", addr)
    }

    fn notifier(api_url: String) -> WhatsAppNotifier {
        WhatsAppNotifier::new(WhatsAppConfig {
            api_url,
            api_key: "gateway-key".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    async fn respond_with(status: GatewayStatus) -> String {
        spawn_gateway(Router::new().route("/send", post(move || async move { (status, "nope") })))
            .await
    }

    #[tokio::test]
    async fn test_send_posts_json_with_bearer_key() {
        let router = Router::new().route(
            "/send",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer gateway-key");
                if authorized
                    && body["phoneNumber"] == "+15550001"
                    && body["message"] == "hello"
                {
                    GatewayStatus::OK
                } else {
                    GatewayStatus::BAD_REQUEST
                }
            }),
        );
        let url = spawn_gateway(router).await;

        notifier(url).send("+15550001", "hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_key_maps_to_unauthorized() {
        for status in [GatewayStatus::UNAUTHORIZED, GatewayStatus::FORBIDDEN] {
            let url = respond_with(status).await;
            let result = notifier(url).send("+15550001", "hello").await;
            assert!(matches!(result, Err(NotifyError::Unauthorized)));
        }
    }

    #[tokio::test]
    async fn test_gateway_failure_carries_status() {
        let url = respond_with(GatewayStatus::BAD_GATEWAY).await;

        let result = notifier(url).send("+15550001", "hello").await;
        match result {
            Err(NotifyError::GatewayError { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "nope");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_api_url_rejected() {
        let result = WhatsAppNotifier::new(WhatsAppConfig {
            api_url: String::new(),
            api_key: "key".to_string(),
            timeout: Duration::from_secs(5),
        });
        assert!(matches!(result, Err(NotifyError::Configuration(_))));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let result = WhatsAppNotifier::new(WhatsAppConfig {
            api_url: "https://gateway.invalid/send".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(5),
        });
        assert!(matches!(result, Err(NotifyError::Configuration(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(SendRequest {
            phone_number: "+15550001",
            message: "Your code is 123456",
        })
        .unwrap();
        assert_eq!(body["phoneNumber"], "+15550001");
        assert_eq!(body["message"], "Your code is 123456");
    }
}
