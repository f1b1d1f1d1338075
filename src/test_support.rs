// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 单元测试共用的内存实现

use crate::domain::models::delivery_log::{DeliveryLog, NewDeliveryLog};
use crate::domain::models::integration::{BotToken, Integration};
use crate::domain::repositories::delivery_log_repository::DeliveryLogRepository;
use crate::domain::repositories::integration_repository::IntegrationRepository;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::credential_cipher::{CredentialCipher, CryptoError};
use crate::domain::services::delivery_client::{DeliveryClient, DeliveryError, DeliveryReceipt};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryIntegrationRepository {
    rows: Mutex<HashMap<Uuid, Integration>>,
}

impl InMemoryIntegrationRepository {
    pub fn insert(&self, integration: Integration) {
        self.rows
            .lock()
            .unwrap()
            .insert(integration.id, integration);
    }

    pub fn get(&self, id: Uuid) -> Option<Integration> {
        self.rows.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl IntegrationRepository for InMemoryIntegrationRepository {
    async fn create(&self, integration: &Integration) -> Result<Integration, RepositoryError> {
        self.insert(integration.clone());
        Ok(integration.clone())
    }

    async fn update(&self, integration: &Integration) -> Result<Integration, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&integration.id) {
            Some(row) if row.user_id == integration.user_id => {
                *row = integration.clone();
                row.updated_at = Utc::now();
                Ok(row.clone())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid, user_id: &str) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get(&id) {
            Some(row) if row.user_id == user_id => {
                rows.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Integration>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn find_by_id_and_user(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<Integration>, RepositoryError> {
        Ok(self.get(id).filter(|i| i.user_id == user_id))
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Integration>, RepositoryError> {
        let mut found: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryDeliveryLogRepository {
    rows: Mutex<Vec<DeliveryLog>>,
}

impl InMemoryDeliveryLogRepository {
    pub fn all(&self) -> Vec<DeliveryLog> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryLogRepository for InMemoryDeliveryLogRepository {
    async fn create(&self, log: &NewDeliveryLog) -> Result<DeliveryLog, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let saved = DeliveryLog {
            id: rows.len() as i64 + 1,
            integration_id: log.integration_id,
            source_event_id: log.source_event_id.clone(),
            request_payload: log.request_payload.clone(),
            payload_digest: log.payload_digest.clone(),
            response_status: log.response_status,
            response_body: log.response_body.clone(),
            error: log.error.clone(),
            phase: log.phase,
            attempts: log.attempts,
            delivered_at: Utc::now(),
            duration_ms: log.duration_ms,
        };
        rows.push(saved.clone());
        Ok(saved)
    }

    async fn list_by_integration(
        &self,
        integration_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<DeliveryLog>, u64), RepositoryError> {
        let matching: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|l| l.integration_id == integration_id)
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }
}

/// 以固定前缀代替真实加密，`garbage` 之类无前缀的密文解密失败
pub struct PrefixCipher;

const CIPHER_PREFIX: &str = "enc:";

impl CredentialCipher for PrefixCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        Ok(format!("{}{}", CIPHER_PREFIX, plaintext))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        ciphertext
            .strip_prefix(CIPHER_PREFIX)
            .map(str::to_string)
            .ok_or(CryptoError::Decrypt)
    }
}

/// 一次发送调用的记录
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub token: String,
    pub chat_id: String,
    pub text: String,
    pub at: Instant,
}

/// 按脚本返回结果的投递客户端，脚本耗尽后一律成功
#[derive(Default)]
pub struct ScriptedDeliveryClient {
    script: Mutex<VecDeque<Result<DeliveryReceipt, DeliveryError>>>,
    sent: Mutex<Vec<SentMessage>>,
    latency: Mutex<Option<Duration>>,
}

impl ScriptedDeliveryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_failure(&self, times: usize) {
        let mut script = self.script.lock().unwrap();
        for _ in 0..times {
            script.push_back(Err(transport_error(503)));
        }
    }

    /// 之后每次发送先等待 `latency` 再返回
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub fn push_success(&self) {
        self.script.lock().unwrap().push_back(Ok(receipt()));
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

pub fn receipt() -> DeliveryReceipt {
    DeliveryReceipt {
        status: 200,
        body: r#"{"ok":true,"message_id":1}"#.to_string(),
        message_id: Some(1),
    }
}

pub fn transport_error(status: u16) -> DeliveryError {
    DeliveryError::Transport {
        status: Some(status),
        body: "unavailable".to_string(),
        message: format!("HTTP {}", status),
    }
}

#[async_trait]
impl DeliveryClient for ScriptedDeliveryClient {
    async fn send(
        &self,
        credential: &BotToken,
        chat_id: &str,
        text: &str,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        self.sent.lock().unwrap().push(SentMessage {
            token: credential.expose().to_string(),
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            at: Instant::now(),
        });
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(receipt()))
    }
}
