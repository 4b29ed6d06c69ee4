//! # saslink Core
//!
//! 期限付き署名URLの発行と、フレンドリーURLを経由したリダイレクト検証を実装する。
//! HTTPサーバーには依存しない。
//!
//! ## 処理フロー
//! 1. 接続文字列からストレージアカウント情報を読み込む
//! 2. 固定リソースに対する読み取り専用のアクセス許可を構築する
//! 3. アカウントキーで署名付きURL（サービスSAS）を発行する
//! 4. 署名付きURLをリクエストと同一オリジンのフレンドリーURLに埋め込む
//! 5. アクセス時に埋め込まれた署名付きURLのホストと有効期限を検証する

mod connection_string;
mod link;
mod sas;

pub use connection_string::{StorageAccount, DEV_STORAGE_ACCOUNT_NAME};
pub use link::{
    build_friendly_url, extract_original_url, validate_signed_link, RequestOrigin,
    FILE_PROXY_ROUTE, GENERATE_LINK_ROUTE,
};
pub use sas::{blob_service_sas_url, format_sas_datetime, parse_sas_datetime, SAS_VERSION};

/// Coreモジュールのエラー型
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// 接続文字列が不正
    #[error("接続文字列が不正です: {0}")]
    InvalidConnectionString(String),
    /// リクエスト元のオリジンが不正
    #[error("リクエスト元のオリジンが不正です: {0}")]
    InvalidOrigin(String),
    /// Blob URLの構築に失敗
    #[error("Blob URLの構築に失敗しました: {0}")]
    InvalidBlobUrl(String),
    /// アクセス許可に権限が含まれていない
    #[error("アクセス許可に権限が1つも含まれていません")]
    EmptyPermissions,
    /// 署名計算に失敗
    #[error(transparent)]
    Crypto(#[from] saslink_crypto::CryptoError),
}
