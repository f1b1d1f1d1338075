// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::delivery_log::{DeliveryPhase, NewDeliveryLog};
use crate::domain::repositories::delivery_log_repository::DeliveryLogRepository;
use crate::domain::services::delivery_client::{DeliveryError, DeliveryReceipt};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

/// 一次入站调用的审计上下文
///
/// 首次投递和后台重试共用同一份上下文，保证两类记录可以关联
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub integration_id: Uuid,
    pub source_event_id: String,
    pub request_payload: Value,
    pub payload_digest: String,
}

impl AuditContext {
    /// 由原始请求体构造，摘要基于原始字节
    pub fn from_body(integration_id: Uuid, source_event_id: Option<String>, body: &[u8]) -> Self {
        let request_payload = serde_json::from_slice(body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()));
        Self {
            integration_id,
            source_event_id: source_event_id.unwrap_or_default(),
            request_payload,
            payload_digest: payload_digest(body),
        }
    }
}

/// 计算请求体的 SHA-256 十六进制摘要
pub fn payload_digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// 投递终态
#[derive(Debug)]
pub enum DeliveryOutcome<'a> {
    Delivered(&'a DeliveryReceipt),
    Failed(&'a DeliveryError),
}

/// 投递日志记录器
///
/// 写入失败只记录错误日志，不影响调用方
#[derive(Clone)]
pub struct DeliveryRecorder {
    repository: Arc<dyn DeliveryLogRepository>,
}

impl DeliveryRecorder {
    pub fn new(repository: Arc<dyn DeliveryLogRepository>) -> Self {
        Self { repository }
    }

    /// 记录一次终态
    ///
    /// # 参数
    ///
    /// * `context` - 入站调用的审计上下文
    /// * `outcome` - 成功回执或最后一次错误
    /// * `phase` - 首次投递或重试序列
    /// * `attempts` - 包含首次在内的总尝试次数
    /// * `duration` - 本阶段耗时
    pub async fn record(
        &self,
        context: &AuditContext,
        outcome: DeliveryOutcome<'_>,
        phase: DeliveryPhase,
        attempts: u32,
        duration: Duration,
    ) {
        let (response_status, response_body, error) = match outcome {
            DeliveryOutcome::Delivered(receipt) => {
                (receipt.status, receipt.body.clone(), String::new())
            }
            DeliveryOutcome::Failed(err) => (
                err.status(),
                err.response_body().to_string(),
                err.to_string(),
            ),
        };

        let log = NewDeliveryLog {
            integration_id: context.integration_id,
            source_event_id: context.source_event_id.clone(),
            request_payload: context.request_payload.clone(),
            payload_digest: context.payload_digest.clone(),
            response_status: i32::from(response_status),
            response_body,
            error,
            phase,
            attempts: i32::try_from(attempts).unwrap_or(i32::MAX),
            duration_ms: i64::try_from(duration.as_millis()).unwrap_or(i64::MAX),
        };

        match self.repository.create(&log).await {
            Ok(saved) => debug!(
                integration_id = %context.integration_id,
                log_id = saved.id,
                phase = phase.as_str(),
                "Delivery log recorded"
            ),
            Err(e) => error!(
                integration_id = %context.integration_id,
                error = %e,
                "Failed to record delivery log"
            ),
        }
    }
}
