// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::integration::BotToken;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 单次投递的成功回执
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub body: String,
    pub message_id: Option<i64>,
}

/// 投递错误
#[derive(Error, Debug, Clone)]
pub enum DeliveryError {
    /// 网络错误或非 2xx 响应
    #[error("transport error: {message}")]
    Transport {
        status: Option<u16>,
        body: String,
        message: String,
    },
    /// 响应无法解析或报告逻辑失败
    #[error("protocol error: {message}")]
    Protocol {
        status: u16,
        body: String,
        message: String,
    },
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}

impl DeliveryError {
    /// 用于日志记录的响应状态码，没有响应时为 0
    pub fn status(&self) -> u16 {
        match self {
            DeliveryError::Transport { status, .. } => status.unwrap_or(0),
            DeliveryError::Protocol { status, .. } => *status,
            DeliveryError::Timeout(_) => 0,
        }
    }

    pub fn response_body(&self) -> &str {
        match self {
            DeliveryError::Transport { body, .. } | DeliveryError::Protocol { body, .. } => body,
            DeliveryError::Timeout(_) => "",
        }
    }

    /// 指标标签
    pub fn reason(&self) -> &'static str {
        match self {
            DeliveryError::Transport { .. } => "transport",
            DeliveryError::Protocol { .. } => "protocol",
            DeliveryError::Timeout(_) => "timeout",
        }
    }
}

/// 目标消息平台的发送接口
///
/// 实现必须是无状态的，凭据只在单次调用内使用
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    async fn send(
        &self,
        credential: &BotToken,
        chat_id: &str,
        text: &str,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}
