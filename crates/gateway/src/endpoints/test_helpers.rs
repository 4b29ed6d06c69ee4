//! # エンドポイントテスト用共通ヘルパー
//!
//! generate_link, file_proxyテストで共有するモックとGateway起動処理。

use std::sync::Arc;

use saslink_core::{format_sas_datetime, StorageAccount};
use saslink_types::{AccessGrant, BlobResource};

use crate::config::{GatewayConfig, GatewayState};
use crate::error::GatewayError;
use crate::storage::BlobStorage;

/// テストで許可するストレージホスト
pub const STORAGE_HOST: &str = "acct.blob.core.windows.net";

/// テスト用のモックBlobStorage。
/// 実ストレージなしで署名付きURLのダミーを返す。
pub struct MockBlobStorage;

#[async_trait::async_trait]
impl BlobStorage for MockBlobStorage {
    async fn mint_signed_url(&self, grant: &AccessGrant) -> Result<String, GatewayError> {
        let se = format_sas_datetime(&grant.expiry).replace(':', "%3A");
        Ok(format!(
            "https://{STORAGE_HOST}/{}?sv=2020-12-06&se={se}&sr=b&sp={}&sig=mock%2Bsig%3D",
            grant.resource,
            grant.permissions.as_sas_str()
        ))
    }
}

/// 常に失敗するBlobStorage。
pub struct FailingBlobStorage;

#[async_trait::async_trait]
impl BlobStorage for FailingBlobStorage {
    async fn mint_signed_url(&self, _grant: &AccessGrant) -> Result<String, GatewayError> {
        Err(GatewayError::Storage("ストレージに到達できません".to_string()))
    }
}

/// テスト用GatewayConfig
pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        storage_account: StorageAccount::development_storage().unwrap(),
        resource: BlobResource::new("c", "f.pdf"),
        storage_host: STORAGE_HOST.to_string(),
        link_ttl: chrono::Duration::hours(1),
        bind_addr: "127.0.0.1:0".to_string(),
        default_scheme: "http".to_string(),
        trust_forwarded_proto: false,
    }
}

/// テスト用GatewayStateを構築するヘルパー
pub fn test_state_with(
    config: GatewayConfig,
    blob_storage: impl BlobStorage + 'static,
) -> Arc<GatewayState> {
    Arc::new(GatewayState {
        config,
        blob_storage: Box::new(blob_storage),
    })
}

/// モックストレージを使うGatewayState
pub fn test_state() -> Arc<GatewayState> {
    test_state_with(test_config(), MockBlobStorage)
}

/// Gatewayをローカルポートで起動し、ポート番号を返す。
pub async fn start_gateway(state: Arc<GatewayState>) -> u16 {
    let app = super::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}

/// リダイレクトを追わないHTTPクライアント
pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
