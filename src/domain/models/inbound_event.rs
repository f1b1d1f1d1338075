// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::alertmanager_event::AlertmanagerBatch;
use super::gitlab_event::GitLabEvent;
use super::integration::SourceType;
use super::jira_event::JiraEvent;

/// 单次入站调用解码后的事件
///
/// 每次请求构造一次，之后不可变，流水线结束即丢弃
#[derive(Debug, Clone)]
pub enum InboundEvent {
    GitLab(GitLabEvent),
    Jira(JiraEvent),
    Alertmanager(AlertmanagerBatch),
}

impl InboundEvent {
    pub fn source_type(&self) -> SourceType {
        match self {
            InboundEvent::GitLab(_) => SourceType::Gitlab,
            InboundEvent::Jira(_) => SourceType::Jira,
            InboundEvent::Alertmanager(_) => SourceType::Alertmanager,
        }
    }
}
