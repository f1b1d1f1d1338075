// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 基于 SeaORM 实现领域层定义的仓库接口
pub mod api_key_repo_impl;
pub mod delivery_log_repo_impl;
pub mod integration_repo_impl;
