// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 消息平台 Bot API 客户端模块
pub mod client;

pub use client::MessengerClient;
