// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::alertmanager::AlertmanagerAdapter;
use super::gitlab::GitLabAdapter;
use super::jira::JiraAdapter;
use super::traits::SourceAdapter;
use crate::domain::models::integration::SourceType;
use std::collections::HashMap;
use std::sync::Arc;

/// 按来源类型索引的适配器注册表
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<SourceType, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册全部内置适配器
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GitLabAdapter::new()));
        registry.register(Arc::new(JiraAdapter::new()));
        registry.register(Arc::new(AlertmanagerAdapter::new()));
        registry
    }

    /// 注册适配器，同一来源类型的旧适配器被替换
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.source_type(), adapter);
    }

    pub fn get(&self, source: SourceType) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(&source).cloned()
    }
}
