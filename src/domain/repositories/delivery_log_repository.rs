// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::delivery_log::{DeliveryLog, NewDeliveryLog};
use async_trait::async_trait;
use uuid::Uuid;

/// 投递日志仓库特质
///
/// 日志只追加，不提供更新接口
#[async_trait]
pub trait DeliveryLogRepository: Send + Sync {
    /// 写入一条投递日志
    async fn create(&self, log: &NewDeliveryLog) -> Result<DeliveryLog, RepositoryError>;

    /// 分页查询集成的投递日志，按投递时间倒序
    ///
    /// # 返回值
    ///
    /// 当前页的日志和总条数
    async fn list_by_integration(
        &self,
        integration_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<DeliveryLog>, u64), RepositoryError>;
}
