// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// - 入站 Webhook（webhook_handler）：按来源决定响应状态
/// - 集成管理（integration_handler）：需要 API 密钥
pub mod integration_handler;
pub mod webhook_handler;
