//! # Blobストレージ
//!
//! 署名付きURLを発行するストレージの抽象インターフェース。
//! 共有キーによるAzure Blob実装は `azure` サブモジュールを参照。

pub mod azure;

pub use azure::AzureBlobStorage;

use saslink_types::AccessGrant;

use crate::error::GatewayError;

/// 署名付きURLを発行するストレージの抽象インターフェース。
///
/// リンク生成エンドポイントはこのトレイト経由でのみストレージに触れる。
/// テストでは実ストレージなしのモック実装に差し替える。
#[async_trait::async_trait]
pub trait BlobStorage: Send + Sync {
    /// アクセス許可に対する期限付きの署名付きURLを発行する。
    async fn mint_signed_url(&self, grant: &AccessGrant) -> Result<String, GatewayError>;
}
