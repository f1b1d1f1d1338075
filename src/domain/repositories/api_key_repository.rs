// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::api_key::ApiKey;
use async_trait::async_trait;
use uuid::Uuid;

/// API 密钥仓库特质
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// 创建密钥记录
    async fn create(&self, key: &ApiKey) -> Result<ApiKey, RepositoryError>;
    /// 根据摘要查找密钥
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, RepositoryError>;
    /// 更新最后使用时间
    async fn touch(&self, id: Uuid) -> Result<(), RepositoryError>;
}
