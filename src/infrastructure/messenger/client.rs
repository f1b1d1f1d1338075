// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MessengerSettings;
use crate::domain::models::integration::BotToken;
use crate::domain::services::delivery_client::{DeliveryClient, DeliveryError, DeliveryReceipt};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendTextResponse {
    ok: bool,
    #[serde(default)]
    message_id: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

/// 消息平台 Bot API 客户端
///
/// 每次调用都使用调用方传入的凭据，客户端本身不保存任何凭据
#[derive(Clone)]
pub struct MessengerClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl MessengerClient {
    /// 创建新的客户端
    ///
    /// # 参数
    ///
    /// * `base_url` - Bot API 基础地址
    /// * `timeout` - 单次请求超时
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hookrelay/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_settings(settings: &MessengerSettings) -> Result<Self, reqwest::Error> {
        Self::new(
            settings.base_url.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    fn send_text_url(&self) -> String {
        format!("{}/messages/sendText/", self.base_url)
    }
}

#[async_trait]
impl DeliveryClient for MessengerClient {
    async fn send(
        &self,
        credential: &BotToken,
        chat_id: &str,
        text: &str,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let response = self
            .http
            .post(self.send_text_url())
            .header(AUTHORIZATION, format!("OAuth {}", credential.expose()))
            .json(&SendTextRequest { chat_id, text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout(self.timeout)
                } else {
                    DeliveryError::Transport {
                        status: None,
                        body: String::new(),
                        message: e.without_url().to_string(),
                    }
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| DeliveryError::Transport {
            status: Some(status.as_u16()),
            body: String::new(),
            message: e.without_url().to_string(),
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Messenger API returned error status");
            return Err(DeliveryError::Transport {
                status: Some(status.as_u16()),
                message: format!("HTTP {}", status.as_u16()),
                body,
            });
        }

        let parsed: SendTextResponse =
            serde_json::from_str(&body).map_err(|e| DeliveryError::Protocol {
                status: status.as_u16(),
                body: body.clone(),
                message: format!("unparseable response: {}", e),
            })?;

        if !parsed.ok {
            return Err(DeliveryError::Protocol {
                status: status.as_u16(),
                message: parsed
                    .description
                    .unwrap_or_else(|| "API reported ok=false".to_string()),
                body,
            });
        }

        debug!(message_id = ?parsed.message_id, "Message delivered");
        Ok(DeliveryReceipt {
            status: status.as_u16(),
            body,
            message_id: parsed.message_id,
        })
    }
}
