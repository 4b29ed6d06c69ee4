//! # saslink 暗号処理
//!
//! ストレージアカウントの共有キーによる署名付きURLの署名計算を実装する。
//!
//! ## 暗号アルゴリズム
//! | 用途 | アルゴリズム |
//! |------|------------|
//! | 署名 | HMAC-SHA256 |
//! | 鍵・署名のエンコード | Base64 (Standard) |

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 暗号処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// アカウントキーがBase64として不正
    #[error("アカウントキーのBase64デコードに失敗しました: {0}")]
    InvalidAccountKey(String),
    /// アカウントキーが空
    #[error("アカウントキーが空です")]
    EmptyAccountKey,
    /// HMACの初期化に失敗
    #[error("HMACの初期化に失敗しました: {0}")]
    Hmac(String),
}

/// Base64エンジン（Standard）
pub fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// ストレージアカウントの共有キー（デコード済み）。
///
/// `Debug` 出力に鍵素材を含めない。
#[derive(Clone)]
pub struct AccountKey(Vec<u8>);

impl std::fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccountKey").field(&"<redacted>").finish()
    }
}

impl AccountKey {
    /// 接続文字列の `AccountKey`（Base64）をデコードする。
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = b64()
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidAccountKey(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    /// 生の鍵バイト列から構築する。
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.is_empty() {
            return Err(CryptoError::EmptyAccountKey);
        }
        Ok(Self(bytes))
    }

    /// `string_to_sign` のHMAC-SHA256署名をBase64で返す。
    pub fn sign(&self, string_to_sign: &str) -> Result<String, CryptoError> {
        let mac = hmac_sha256(&self.0, string_to_sign.as_bytes())?;
        Ok(b64().encode(mac))
    }
}

/// HMAC-SHA256計算。
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; 32], CryptoError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| CryptoError::Hmac(e.to_string()))?;
    mac.update(message);
    let result = mac.finalize().into_bytes();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    Ok(out)
}
