// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 依赖领域层的抽象接口，提供具体技术实现：
/// - 凭据加密（crypto）：AES-256-GCM
/// - 数据库（database）：连接池和实体映射
/// - 消息平台客户端（messenger）
/// - 指标（metrics）：Prometheus 导出
/// - 仓库实现（repositories）
pub mod crypto;
pub mod database;
pub mod messenger;
pub mod metrics;
pub mod repositories;
