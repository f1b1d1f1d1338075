// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域用例模块
///
/// 每个用例代表一个完整的业务流程：
/// - 处理入站 Webhook（process_webhook）：解析、过滤、格式化并投递
/// - 管理集成（manage_integration）：集成的增删改查、日志查询和测试发送
pub mod manage_integration;
pub mod process_webhook;
