// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 集成（integration）：租户配置的来源到聊天目标的绑定
/// - 来源配置（source_config）：按来源类型划分的过滤配置
/// - 入站事件（inbound_event 及各来源的负载结构）
/// - 投递日志（delivery_log）：投递结果的审计记录
/// - API 密钥（api_key）：管理 API 的访问凭据
pub mod alertmanager_event;
pub mod api_key;
pub mod delivery_log;
pub mod gitlab_event;
pub mod inbound_event;
pub mod integration;
pub mod jira_event;
pub mod source_config;
