// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 领域层只依赖这些抽象契约，具体实现由基础设施层提供：
/// - 集成仓库（integration_repository）
/// - 投递日志仓库（delivery_log_repository）
/// - API 密钥仓库（api_key_repository）
pub mod api_key_repository;
pub mod delivery_log_repository;
pub mod integration_repository;

use sea_orm::DbErr;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 持久化数据无法还原为领域模型
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}
