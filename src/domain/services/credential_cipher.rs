// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 凭据加解密错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CryptoError {
    #[error("encryption failed")]
    Encrypt,
    #[error("malformed ciphertext: {0}")]
    Malformed(String),
    #[error("decryption failed")]
    Decrypt,
}

/// 静态凭据加密接口
///
/// 解密失败时必须返回错误，不得返回部分明文
pub trait CredentialCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError>;
    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError>;
}
