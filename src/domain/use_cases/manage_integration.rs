// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::delivery_log::DeliveryLog;
use crate::domain::models::integration::{BotToken, Integration, SourceType, REDACTED_TOKEN};
use crate::domain::models::source_config::{SourceConfig, SourceConfigError};
use crate::domain::repositories::delivery_log_repository::DeliveryLogRepository;
use crate::domain::repositories::integration_repository::IntegrationRepository;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::credential_cipher::{CredentialCipher, CryptoError};
use crate::domain::services::delivery_client::{DeliveryClient, DeliveryError, DeliveryReceipt};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_LOG_LIMIT: u64 = 50;
pub const MAX_LOG_LIMIT: u64 = 100;

/// 集成管理错误
#[derive(Error, Debug)]
pub enum ManageError {
    #[error("integration not found")]
    NotFound,
    #[error(transparent)]
    InvalidConfig(#[from] SourceConfigError),
    #[error("credential error: {0}")]
    Credential(#[from] CryptoError),
    #[error("test delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ManageError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ManageError::NotFound,
            other => ManageError::Repository(other),
        }
    }
}

/// 新建集成的输入
#[derive(Debug, Clone)]
pub struct NewIntegration {
    pub name: String,
    pub source_type: SourceType,
    pub source_config: Value,
    pub chat_id: String,
    /// 明文凭据
    pub bot_token: String,
    pub is_active: bool,
}

/// 更新集成的输入，`None` 表示保持原值
#[derive(Debug, Clone, Default)]
pub struct IntegrationChanges {
    pub name: Option<String>,
    pub source_config: Option<Value>,
    pub chat_id: Option<String>,
    /// 为空或为脱敏标记时保留原密文
    pub bot_token: Option<String>,
    pub is_active: Option<bool>,
}

/// 一页投递日志
#[derive(Debug, Clone)]
pub struct LogPage {
    pub logs: Vec<DeliveryLog>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// 集成管理用例
///
/// 来源配置在写入时校验，凭据在写入前加密
#[derive(Clone)]
pub struct ManageIntegrationUseCase {
    integrations: Arc<dyn IntegrationRepository>,
    logs: Arc<dyn DeliveryLogRepository>,
    cipher: Arc<dyn CredentialCipher>,
    client: Arc<dyn DeliveryClient>,
}

impl ManageIntegrationUseCase {
    pub fn new(
        integrations: Arc<dyn IntegrationRepository>,
        logs: Arc<dyn DeliveryLogRepository>,
        cipher: Arc<dyn CredentialCipher>,
        client: Arc<dyn DeliveryClient>,
    ) -> Self {
        Self {
            integrations,
            logs,
            cipher,
            client,
        }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Integration>, ManageError> {
        Ok(self.integrations.find_by_user(user_id).await?)
    }

    pub async fn get(&self, user_id: &str, id: Uuid) -> Result<Integration, ManageError> {
        self.integrations
            .find_by_id_and_user(id, user_id)
            .await?
            .ok_or(ManageError::NotFound)
    }

    /// 创建集成
    ///
    /// # 返回值
    ///
    /// * `Ok(Integration)` - 已持久化的集成，凭据为密文
    /// * `Err(ManageError::InvalidConfig)` - 来源配置不合法
    pub async fn create(
        &self,
        user_id: &str,
        input: NewIntegration,
    ) -> Result<Integration, ManageError> {
        let source_config = SourceConfig::parse(input.source_type, &input.source_config)?;
        let encrypted = self.cipher.encrypt(&input.bot_token)?;

        let integration = Integration::new(
            user_id.to_string(),
            input.name,
            source_config,
            input.chat_id,
            encrypted,
            input.is_active,
        );
        let created = self.integrations.create(&integration).await?;
        info!(integration_id = %created.id, source = %created.source_type, "Integration created");
        Ok(created)
    }

    /// 更新集成，来源类型不可修改
    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        changes: IntegrationChanges,
    ) -> Result<Integration, ManageError> {
        let mut integration = self.get(user_id, id).await?;

        if let Some(name) = changes.name {
            integration.name = name;
        }
        if let Some(value) = changes.source_config {
            integration.source_config = SourceConfig::parse(integration.source_type, &value)?;
        }
        if let Some(chat_id) = changes.chat_id.filter(|c| !c.is_empty()) {
            integration.destination_config.chat_id = chat_id;
        }
        if let Some(token) = changes
            .bot_token
            .filter(|t| !t.is_empty() && t != REDACTED_TOKEN)
        {
            integration.destination_config.bot_token = self.cipher.encrypt(&token)?;
        }
        if let Some(is_active) = changes.is_active {
            integration.is_active = is_active;
        }

        let updated = self.integrations.update(&integration).await?;
        info!(integration_id = %id, "Integration updated");
        Ok(updated)
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<(), ManageError> {
        self.integrations.delete(id, user_id).await?;
        info!(integration_id = %id, "Integration deleted");
        Ok(())
    }

    /// 分页查询投递日志
    ///
    /// `limit` 缺省或超出 1..=100 时取 50
    pub async fn logs(
        &self,
        user_id: &str,
        id: Uuid,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<LogPage, ManageError> {
        self.get(user_id, id).await?;

        let limit = limit
            .filter(|l| (1..=MAX_LOG_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LOG_LIMIT);
        let offset = offset.unwrap_or(0);
        let (logs, total) = self.logs.list_by_integration(id, limit, offset).await?;

        Ok(LogPage {
            logs,
            total,
            limit,
            offset,
        })
    }

    /// 通过投递客户端发送一条测试消息
    pub async fn send_test(&self, user_id: &str, id: Uuid) -> Result<DeliveryReceipt, ManageError> {
        let integration = self.get(user_id, id).await?;
        let token = BotToken::new(
            self.cipher
                .decrypt(&integration.destination_config.bot_token)?,
        );
        let text = format!(
            "✅ Test message from integration *{}* ({})",
            integration.name, integration.source_type
        );

        let receipt = self
            .client
            .send(&token, &integration.destination_config.chat_id, &text)
            .await?;
        info!(integration_id = %id, "Test message sent");
        Ok(receipt)
    }
}
