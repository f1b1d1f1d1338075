// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// - 凭据加密接口（credential_cipher）
/// - 投递客户端接口（delivery_client）
/// - 投递日志记录（delivery_recorder）
/// - 过滤与格式化引擎（format_engine）
/// - 集成解析（integration_resolver）
pub mod credential_cipher;
pub mod delivery_client;
pub mod delivery_recorder;
pub mod format_engine;
pub mod integration_resolver;
