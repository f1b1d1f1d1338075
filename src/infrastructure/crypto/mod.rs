// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 凭据加密模块
pub mod aes_gcm_cipher;

pub use aes_gcm_cipher::AesGcmCipher;
