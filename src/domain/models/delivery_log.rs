// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

/// 记录产生的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPhase {
    /// 入站请求内的首次同步投递
    Initial,
    /// 后台重试序列的终态
    Retry,
}

impl DeliveryPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryPhase::Initial => "initial",
            DeliveryPhase::Retry => "retry",
        }
    }
}

impl FromStr for DeliveryPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(DeliveryPhase::Initial),
            "retry" => Ok(DeliveryPhase::Retry),
            other => Err(format!("unknown delivery phase: {}", other)),
        }
    }
}

/// 投递日志
///
/// 每个终态写入一条，写入后不再修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryLog {
    pub id: i64,
    pub integration_id: Uuid,
    /// 来源提供的幂等键，没有时为空
    pub source_event_id: String,
    pub request_payload: Value,
    /// 原始请求体的 SHA-256
    pub payload_digest: String,
    pub response_status: i32,
    pub response_body: String,
    /// 成功时为空
    pub error: String,
    pub phase: DeliveryPhase,
    /// 包含首次投递在内的总尝试次数
    pub attempts: i32,
    pub delivered_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl DeliveryLog {
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }
}

/// 待写入的投递日志
#[derive(Debug, Clone)]
pub struct NewDeliveryLog {
    pub integration_id: Uuid,
    pub source_event_id: String,
    pub request_payload: Value,
    pub payload_digest: String,
    pub response_status: i32,
    pub response_body: String,
    pub error: String,
    pub phase: DeliveryPhase,
    pub attempts: i32,
    pub duration_ms: i64,
}
