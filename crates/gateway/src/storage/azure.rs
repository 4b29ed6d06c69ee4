//! # Azure Blob ストレージ実装
//!
//! 接続文字列の共有キーでサービスSASを発行する。
//! 署名はローカルで計算するため、発行時にストレージへの通信は発生しない。

use saslink_core::{blob_service_sas_url, StorageAccount};
use saslink_types::AccessGrant;

use super::BlobStorage;
use crate::error::GatewayError;

/// 共有キーによるAzure Blob実装。
pub struct AzureBlobStorage {
    account: StorageAccount,
}

impl AzureBlobStorage {
    pub fn new(account: StorageAccount) -> Self {
        Self { account }
    }
}

#[async_trait::async_trait]
impl BlobStorage for AzureBlobStorage {
    async fn mint_signed_url(&self, grant: &AccessGrant) -> Result<String, GatewayError> {
        blob_service_sas_url(&self.account, grant)
            .map_err(|e| GatewayError::Storage(format!("署名付きURL生成失敗: {e}")))
    }
}
