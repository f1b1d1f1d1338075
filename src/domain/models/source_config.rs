// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 每种来源的类型化过滤配置
//!
//! 配置在集成创建或更新时解析和校验，持久化为 JSON，读取时重新还原。
//! 未配置的过滤维度表示对该维度全部放行。

use super::integration::SourceType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// 来源配置解析错误
#[derive(Error, Debug)]
pub enum SourceConfigError {
    #[error("invalid {source_type} configuration: {message}")]
    Invalid {
        source_type: SourceType,
        message: String,
    },
}

/// 告警严重级别
///
/// 固定序数：critical(4) > warning(3) > info(2) > none(1)，未知级别为 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    None,
}

impl Severity {
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::Warning => 3,
            Severity::Info => 2,
            Severity::None => 1,
        }
    }

    /// 对告警标签中的任意字符串求序数，按原样精确匹配
    pub fn rank_of(label: &str) -> u8 {
        match label {
            "critical" => 4,
            "warning" => 3,
            "info" => 2,
            "none" => 1,
            _ => 0,
        }
    }
}

/// Alertmanager 消息分组模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    Single,
    Group,
}

/// Alertmanager 过滤配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertmanagerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_severity: Option<Severity>,
    pub send_resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_mode: Option<GroupMode>,
    pub label_filters: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl AlertmanagerConfig {
    /// 单条告警是否应当发送
    ///
    /// # 参数
    ///
    /// * `resolved` - 告警是否已恢复
    /// * `severity` - 从 `severity` 或 `level` 标签推导出的级别
    /// * `labels` - 告警的全部标签
    pub fn should_send_alert(
        &self,
        resolved: bool,
        severity: &str,
        labels: &BTreeMap<String, String>,
    ) -> bool {
        if resolved && !self.send_resolved {
            return false;
        }

        if let Some(min) = self.min_severity {
            if Severity::rank_of(severity) < min.rank() {
                return false;
            }
        }

        self.label_filters
            .iter()
            .all(|(key, expected)| labels.get(key) == Some(expected))
    }
}

/// GitLab 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GitLabEventKind {
    Push,
    MergeRequest,
    Pipeline,
    Issue,
    Comment,
}

impl GitLabEventKind {
    /// 由 `X-Gitlab-Event` 请求头解析事件类型
    pub fn from_header(value: &str) -> Option<Self> {
        match value {
            "Push Hook" => Some(GitLabEventKind::Push),
            "Merge Request Hook" => Some(GitLabEventKind::MergeRequest),
            "Pipeline Hook" => Some(GitLabEventKind::Pipeline),
            "Issue Hook" => Some(GitLabEventKind::Issue),
            "Note Hook" => Some(GitLabEventKind::Comment),
            _ => None,
        }
    }
}

/// GitLab 各事件类型的消息模板
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitLabTemplates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl GitLabTemplates {
    pub fn for_kind(&self, kind: GitLabEventKind) -> Option<&str> {
        let template = match kind {
            GitLabEventKind::Push => &self.push,
            GitLabEventKind::MergeRequest => &self.merge_request,
            GitLabEventKind::Pipeline => &self.pipeline,
            GitLabEventKind::Issue => &self.issue,
            GitLabEventKind::Comment => &self.comment,
        };
        template.as_deref().filter(|t| !t.is_empty())
    }
}

/// GitLab 过滤配置
#[derive(Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitLabConfig {
    /// 与 `X-Gitlab-Token` 比对的共享密钥，为空表示不校验
    pub secret_token: String,
    pub events: Vec<GitLabEventKind>,
    pub branch_filter: String,
    pub project_filter: Vec<String>,
    pub templates: GitLabTemplates,
}

impl std::fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secret = if self.secret_token.is_empty() { "" } else { "***" };
        f.debug_struct("GitLabConfig")
            .field("secret_token", &secret)
            .field("events", &self.events)
            .field("branch_filter", &self.branch_filter)
            .field("project_filter", &self.project_filter)
            .field("templates", &self.templates)
            .finish()
    }
}

impl GitLabConfig {
    pub fn allows_event(&self, kind: GitLabEventKind) -> bool {
        self.events.is_empty() || self.events.contains(&kind)
    }
}

/// Jira 优先级
///
/// 固定序数：Highest(5) > High(4) > Medium(3) > Low(2) > Lowest(1)，未知优先级为 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Highest,
    High,
    Medium,
    Low,
    Lowest,
}

impl Priority {
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Highest => 5,
            Priority::High => 4,
            Priority::Medium => 3,
            Priority::Low => 2,
            Priority::Lowest => 1,
        }
    }

    pub fn rank_of(name: &str) -> u8 {
        match name {
            "Highest" => 5,
            "High" => 4,
            "Medium" => 3,
            "Low" => 2,
            "Lowest" => 1,
            _ => 0,
        }
    }
}

/// Jira 过滤配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JiraConfig {
    pub project_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_priority: Option<Priority>,
    /// 允许的 `webhookEvent` 值，如 `jira:issue_created`
    pub events: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl JiraConfig {
    /// 事件是否通过事件、项目和优先级过滤
    pub fn should_process(&self, event_kind: &str, project_key: &str, priority: Option<&str>) -> bool {
        if !self.events.is_empty() && !self.events.iter().any(|e| e == event_kind) {
            return false;
        }

        if !self.project_keys.is_empty() && !self.project_keys.iter().any(|k| k == project_key) {
            return false;
        }

        if let Some(min) = self.min_priority {
            if Priority::rank_of(priority.unwrap_or_default()) < min.rank() {
                return false;
            }
        }

        true
    }
}

/// 集成的来源配置
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Jira(JiraConfig),
    Gitlab(GitLabConfig),
    Alertmanager(AlertmanagerConfig),
}

impl SourceConfig {
    /// 按来源类型解析并校验配置
    ///
    /// `null` 视为空对象，即全部放行
    ///
    /// # 参数
    ///
    /// * `source_type` - 来源类型
    /// * `value` - 原始 JSON 配置
    ///
    /// # 返回值
    ///
    /// * `Ok(SourceConfig)` - 校验通过的配置
    /// * `Err(SourceConfigError)` - 存在未知字段、类型错误或取值非法
    pub fn parse(source_type: SourceType, value: &Value) -> Result<Self, SourceConfigError> {
        let value = if value.is_null() {
            Value::Object(Default::default())
        } else {
            value.clone()
        };
        let invalid = |e: serde_json::Error| SourceConfigError::Invalid {
            source_type,
            message: e.to_string(),
        };

        let config = match source_type {
            SourceType::Jira => SourceConfig::Jira(serde_json::from_value(value).map_err(invalid)?),
            SourceType::Gitlab => {
                SourceConfig::Gitlab(serde_json::from_value(value).map_err(invalid)?)
            }
            SourceType::Alertmanager => {
                SourceConfig::Alertmanager(serde_json::from_value(value).map_err(invalid)?)
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SourceConfigError> {
        if let SourceConfig::Gitlab(config) = self {
            if config.branch_filter.matches('*').count() > 1 {
                return Err(SourceConfigError::Invalid {
                    source_type: SourceType::Gitlab,
                    message: "branch_filter supports a single '*' wildcard".to_string(),
                });
            }
            if let Some(bad) = config
                .project_filter
                .iter()
                .find(|p| p.matches('*').count() > 1)
            {
                return Err(SourceConfigError::Invalid {
                    source_type: SourceType::Gitlab,
                    message: format!("project_filter pattern '{}' has more than one '*'", bad),
                });
            }
        }
        Ok(())
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            SourceConfig::Jira(_) => SourceType::Jira,
            SourceConfig::Gitlab(_) => SourceType::Gitlab,
            SourceConfig::Alertmanager(_) => SourceType::Alertmanager,
        }
    }

    /// 序列化为持久化用的 JSON
    pub fn to_value(&self) -> Value {
        let result = match self {
            SourceConfig::Jira(c) => serde_json::to_value(c),
            SourceConfig::Gitlab(c) => serde_json::to_value(c),
            SourceConfig::Alertmanager(c) => serde_json::to_value(c),
        };
        result.unwrap_or(Value::Null)
    }
}
