// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! GitLab Webhook 负载
//!
//! 各事件类型的负载结构有重叠，事件类型由 `X-Gitlab-Event` 请求头决定，
//! 不从负载结构推断。

use super::source_config::GitLabEventKind;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitLabProject {
    pub id: i64,
    pub name: String,
    pub web_url: String,
    pub path_with_namespace: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitLabUser {
    pub name: String,
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitLabCommitAuthor {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitLabCommit {
    pub id: String,
    pub message: String,
    pub title: String,
    pub url: String,
    pub author: GitLabCommitAuthor,
}

impl GitLabCommit {
    /// 8 位短 SHA
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    /// 提交标题，缺失时取消息首行
    pub fn headline(&self) -> &str {
        if !self.title.is_empty() {
            return &self.title;
        }
        self.message.lines().next().unwrap_or_default()
    }
}

/// Push Hook
#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_username: String,
    pub project: GitLabProject,
    #[serde(default)]
    pub commits: Vec<GitLabCommit>,
    #[serde(default)]
    pub total_commits_count: Option<usize>,
}

impl PushEvent {
    pub fn branch(&self) -> &str {
        strip_branch_prefix(&self.git_ref)
    }

    pub fn commit_count(&self) -> usize {
        self.total_commits_count.unwrap_or(self.commits.len())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MergeRequestAttributes {
    pub iid: i64,
    pub title: String,
    pub state: String,
    pub action: String,
    pub source_branch: String,
    pub target_branch: String,
    pub url: String,
}

/// Merge Request Hook
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequestEvent {
    #[serde(default)]
    pub user: GitLabUser,
    pub project: GitLabProject,
    pub object_attributes: MergeRequestAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoteAttributes {
    pub note: String,
    pub noteable_type: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoteTarget {
    pub iid: i64,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoteCommit {
    pub id: String,
    pub url: String,
}

/// Note Hook（评论）
#[derive(Debug, Clone, Deserialize)]
pub struct NoteEvent {
    #[serde(default)]
    pub user: GitLabUser,
    pub project: GitLabProject,
    pub object_attributes: NoteAttributes,
    #[serde(default)]
    pub merge_request: Option<NoteTarget>,
    #[serde(default)]
    pub issue: Option<NoteTarget>,
    #[serde(default)]
    pub commit: Option<NoteCommit>,
}

impl NoteEvent {
    /// 评论所针对对象的 Markdown 链接
    pub fn target(&self) -> String {
        match self.object_attributes.noteable_type.as_str() {
            "MergeRequest" => self
                .merge_request
                .as_ref()
                .map(|mr| format!("[merge request !{}]({})", mr.iid, mr.url)),
            "Issue" => self
                .issue
                .as_ref()
                .map(|issue| format!("[issue #{}]({})", issue.iid, issue.url)),
            "Commit" => self
                .commit
                .as_ref()
                .map(|commit| format!("[commit]({})", commit.url)),
            _ => None,
        }
        .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineAttributes {
    pub id: i64,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub status: String,
    pub duration: Option<i64>,
}

/// Pipeline Hook
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineEvent {
    #[serde(default)]
    pub user: GitLabUser,
    pub project: GitLabProject,
    pub object_attributes: PipelineAttributes,
}

impl PipelineEvent {
    pub fn branch(&self) -> &str {
        strip_branch_prefix(&self.object_attributes.git_ref)
    }

    pub fn url(&self) -> String {
        format!(
            "{}/-/pipelines/{}",
            self.project.web_url, self.object_attributes.id
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueAttributes {
    pub iid: i64,
    pub title: String,
    pub state: String,
    pub action: String,
    pub url: String,
}

/// Issue Hook
#[derive(Debug, Clone, Deserialize)]
pub struct IssueEvent {
    #[serde(default)]
    pub user: GitLabUser,
    pub project: GitLabProject,
    pub object_attributes: IssueAttributes,
}

/// 已解码的 GitLab 事件
#[derive(Debug, Clone)]
pub enum GitLabEvent {
    Push(PushEvent),
    MergeRequest(MergeRequestEvent),
    Note(NoteEvent),
    Pipeline(PipelineEvent),
    Issue(IssueEvent),
}

impl GitLabEvent {
    pub fn kind(&self) -> GitLabEventKind {
        match self {
            GitLabEvent::Push(_) => GitLabEventKind::Push,
            GitLabEvent::MergeRequest(_) => GitLabEventKind::MergeRequest,
            GitLabEvent::Note(_) => GitLabEventKind::Comment,
            GitLabEvent::Pipeline(_) => GitLabEventKind::Pipeline,
            GitLabEvent::Issue(_) => GitLabEventKind::Issue,
        }
    }

    pub fn project(&self) -> &GitLabProject {
        match self {
            GitLabEvent::Push(e) => &e.project,
            GitLabEvent::MergeRequest(e) => &e.project,
            GitLabEvent::Note(e) => &e.project,
            GitLabEvent::Pipeline(e) => &e.project,
            GitLabEvent::Issue(e) => &e.project,
        }
    }

    /// 参与分支过滤的分支名，评论和 Issue 没有分支
    pub fn branch(&self) -> Option<&str> {
        match self {
            GitLabEvent::Push(e) => Some(e.branch()),
            GitLabEvent::Pipeline(e) => Some(e.branch()),
            GitLabEvent::MergeRequest(e) => Some(&e.object_attributes.target_branch),
            GitLabEvent::Note(_) | GitLabEvent::Issue(_) => None,
        }
    }

    /// 触发事件的用户名称
    pub fn actor(&self) -> &str {
        let user = match self {
            GitLabEvent::Push(e) => return &e.user_name,
            GitLabEvent::MergeRequest(e) => &e.user,
            GitLabEvent::Note(e) => &e.user,
            GitLabEvent::Pipeline(e) => &e.user,
            GitLabEvent::Issue(e) => &e.user,
        };
        if user.name.is_empty() {
            &user.username
        } else {
            &user.name
        }
    }
}

fn strip_branch_prefix(git_ref: &str) -> &str {
    git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref)
}
