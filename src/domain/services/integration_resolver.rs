// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::integration::{BotToken, Integration};
use crate::domain::repositories::integration_repository::IntegrationRepository;
use crate::domain::repositories::RepositoryError;
use crate::domain::services::credential_cipher::{CredentialCipher, CryptoError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

/// 集成解析错误
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("integration not found")]
    NotFound,
    #[error("integration is inactive")]
    Inactive,
    #[error("stored configuration is corrupt: {0}")]
    CorruptConfig(String),
    #[error("credential error: {0}")]
    Credential(#[from] CryptoError),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl ResolveError {
    /// 对调用方呈现为“不存在”的错误
    ///
    /// 停用和配置损坏的集成与不存在的集成对外不可区分
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolveError::NotFound | ResolveError::Inactive | ResolveError::CorruptConfig(_)
        )
    }
}

impl From<RepositoryError> for ResolveError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ResolveError::NotFound,
            RepositoryError::Corrupt(msg) => ResolveError::CorruptConfig(msg),
            other => ResolveError::Repository(other),
        }
    }
}

/// 解析完成、凭据已解密的集成
#[derive(Debug, Clone)]
pub struct ResolvedIntegration {
    pub integration: Integration,
    pub bot_token: BotToken,
}

/// 集成解析器
///
/// 只读；每次调用都重新解密凭据，不缓存明文
#[derive(Clone)]
pub struct IntegrationResolver {
    repository: Arc<dyn IntegrationRepository>,
    cipher: Arc<dyn CredentialCipher>,
}

impl IntegrationResolver {
    pub fn new(
        repository: Arc<dyn IntegrationRepository>,
        cipher: Arc<dyn CredentialCipher>,
    ) -> Self {
        Self { repository, cipher }
    }

    /// 按标识符解析集成
    ///
    /// # 参数
    ///
    /// * `integration_id` - 路径中的集成标识符，非 UUID 视为不存在
    ///
    /// # 返回值
    ///
    /// * `Ok(ResolvedIntegration)` - 启用中的集成及其明文凭据
    /// * `Err(ResolveError)` - 不存在、已停用、配置损坏或凭据无法解密
    pub async fn resolve(&self, integration_id: &str) -> Result<ResolvedIntegration, ResolveError> {
        let id = Uuid::parse_str(integration_id).map_err(|_| ResolveError::NotFound)?;
        self.resolve_id(id).await
    }

    pub async fn resolve_id(&self, id: Uuid) -> Result<ResolvedIntegration, ResolveError> {
        let integration = match self.repository.find_by_id(id).await {
            Ok(Some(integration)) => integration,
            Ok(None) => return Err(ResolveError::NotFound),
            Err(RepositoryError::Corrupt(msg)) => {
                error!(integration_id = %id, error = %msg, "Stored integration is corrupt");
                return Err(ResolveError::CorruptConfig(msg));
            }
            Err(e) => return Err(e.into()),
        };

        if !integration.is_active {
            debug!(integration_id = %id, "Integration is inactive");
            return Err(ResolveError::Inactive);
        }

        let plaintext = self
            .cipher
            .decrypt(&integration.destination_config.bot_token)
            .map_err(|e| {
                error!(integration_id = %id, error = %e, "Failed to decrypt bot token");
                ResolveError::Credential(e)
            })?;

        Ok(ResolvedIntegration {
            integration,
            bot_token: BotToken::new(plaintext),
        })
    }
}
