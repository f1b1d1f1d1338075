// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Jira Webhook 负载

use serde::Deserialize;

pub const ISSUE_CREATED: &str = "jira:issue_created";
pub const ISSUE_UPDATED: &str = "jira:issue_updated";
pub const COMMENT_CREATED: &str = "comment_created";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JiraUser {
    pub display_name: String,
    pub email_address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JiraNamed {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JiraProject {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JiraIssueFields {
    pub summary: String,
    pub status: Option<JiraNamed>,
    pub priority: Option<JiraNamed>,
    pub issuetype: Option<JiraNamed>,
    pub assignee: Option<JiraUser>,
    pub reporter: Option<JiraUser>,
    pub project: Option<JiraProject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JiraIssue {
    pub id: String,
    pub key: String,
    #[serde(rename = "self")]
    pub self_url: String,
    pub fields: JiraIssueFields,
}

impl JiraIssue {
    /// 项目键，字段缺失时取问题键的前缀
    pub fn project_key(&self) -> &str {
        if let Some(project) = &self.fields.project {
            if !project.key.is_empty() {
                return &project.key;
            }
        }
        self.key.split('-').next().unwrap_or_default()
    }

    pub fn priority(&self) -> Option<&str> {
        self.fields.priority.as_ref().map(|p| p.name.as_str())
    }

    pub fn status(&self) -> &str {
        self.fields
            .status
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or_default()
    }

    /// 浏览地址，由 REST 地址推导
    pub fn browse_url(&self) -> String {
        match self.self_url.find("/rest/") {
            Some(idx) if !self.key.is_empty() => {
                format!("{}/browse/{}", &self.self_url[..idx], self.key)
            }
            _ => self.self_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JiraChangeItem {
    pub field: String,
    pub from_string: Option<String>,
    pub to_string: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JiraChangelog {
    pub items: Vec<JiraChangeItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JiraComment {
    pub body: String,
    pub author: Option<JiraUser>,
}

/// 已解码的 Jira 事件
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraEvent {
    #[serde(default)]
    pub timestamp: i64,
    pub webhook_event: String,
    #[serde(default)]
    pub user: Option<JiraUser>,
    #[serde(default)]
    pub issue: JiraIssue,
    #[serde(default)]
    pub changelog: Option<JiraChangelog>,
    #[serde(default)]
    pub comment: Option<JiraComment>,
}

impl JiraEvent {
    /// 触发事件的用户显示名
    pub fn actor(&self) -> &str {
        self.user
            .as_ref()
            .or_else(|| self.comment.as_ref().and_then(|c| c.author.as_ref()))
            .map(|u| u.display_name.as_str())
            .unwrap_or_default()
    }
}
