// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::integration::Integration;
use async_trait::async_trait;
use uuid::Uuid;

/// 集成仓库特质
#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    /// 创建集成
    async fn create(&self, integration: &Integration) -> Result<Integration, RepositoryError>;
    /// 更新集成，记录不存在时返回 `NotFound`
    async fn update(&self, integration: &Integration) -> Result<Integration, RepositoryError>;
    /// 删除指定用户的集成
    async fn delete(&self, id: Uuid, user_id: &str) -> Result<(), RepositoryError>;
    /// 根据ID查找集成，不区分所属用户
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Integration>, RepositoryError>;
    /// 查找属于指定用户的集成
    async fn find_by_id_and_user(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<Integration>, RepositoryError>;
    /// 列出用户的全部集成，按创建时间倒序
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Integration>, RepositoryError>;
}
