// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::source_config::SourceConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// API 与界面中替代 bot_token 的固定脱敏标记
pub const REDACTED_TOKEN: &str = "***";

/// 事件来源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Jira,
    Gitlab,
    Alertmanager,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Jira => "jira",
            SourceType::Gitlab => "gitlab",
            SourceType::Alertmanager => "alertmanager",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jira" => Ok(SourceType::Jira),
            "gitlab" => Ok(SourceType::Gitlab),
            "alertmanager" => Ok(SourceType::Alertmanager),
            other => Err(format!("unknown source type: {}", other)),
        }
    }
}

/// 目标类型，目前固定为消息平台机器人
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DestinationType {
    #[default]
    YandexMessenger,
}

impl DestinationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationType::YandexMessenger => "yandex_messenger",
        }
    }
}

impl FromStr for DestinationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yandex_messenger" => Ok(DestinationType::YandexMessenger),
            other => Err(format!("unknown destination type: {}", other)),
        }
    }
}

/// 目标配置
///
/// `bot_token` 持久化时始终为密文，只在投递期间临时解密
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub chat_id: String,
    pub bot_token: String,
}

/// 解密后的机器人凭据
///
/// 仅在单次投递期间存在于内存中，`Debug` 输出始终脱敏
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(plaintext: String) -> Self {
        Self(plaintext)
    }

    /// 读取明文，仅供投递客户端构造认证头使用
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BotToken({})", REDACTED_TOKEN)
    }
}

/// 集成实体
///
/// 租户配置的一条从事件来源到聊天目标的绑定
#[derive(Debug, Clone, PartialEq)]
pub struct Integration {
    /// 集成唯一标识符
    pub id: Uuid,
    /// 所属用户
    pub user_id: String,
    /// 名称
    pub name: String,
    /// 来源类型
    pub source_type: SourceType,
    /// 已校验的来源配置
    pub source_config: SourceConfig,
    /// 目标类型
    pub destination_type: DestinationType,
    /// 目标配置（bot_token 为密文）
    pub destination_config: DestinationConfig,
    /// 是否启用
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Integration {
    /// 创建新的集成
    ///
    /// # 参数
    ///
    /// * `user_id` - 所属用户
    /// * `name` - 名称
    /// * `source_config` - 已校验的来源配置，来源类型由其决定
    /// * `chat_id` - 目标聊天
    /// * `encrypted_token` - 已加密的机器人凭据
    pub fn new(
        user_id: String,
        name: String,
        source_config: SourceConfig,
        chat_id: String,
        encrypted_token: String,
        is_active: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            source_type: source_config.source_type(),
            source_config,
            destination_type: DestinationType::YandexMessenger,
            destination_config: DestinationConfig {
                chat_id,
                bot_token: encrypted_token,
            },
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// 生成对外展示的视图，bot_token 被替换为脱敏标记
    pub fn to_view(&self, webhook_url: String) -> IntegrationView {
        IntegrationView {
            id: self.id,
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            source_type: self.source_type,
            source_config: self.source_config.to_value(),
            destination_type: self.destination_type,
            destination_config: DestinationConfig {
                chat_id: self.destination_config.chat_id.clone(),
                bot_token: REDACTED_TOKEN.to_string(),
            },
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            webhook_url,
        }
    }
}

/// 集成的对外表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationView {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub source_type: SourceType,
    pub source_config: serde_json::Value,
    pub destination_type: DestinationType,
    pub destination_config: DestinationConfig,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub webhook_url: String,
}
