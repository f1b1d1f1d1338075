// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：集成、来源配置、入站事件和投递日志
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：集成解析、过滤格式化和投递记录
/// - 用例（use_cases）：Webhook 处理和集成管理流程
pub mod models;
pub mod repositories;
pub mod services;
pub mod use_cases;
