//! # saslink Gateway
//!
//! 期限付き署名URLを、期限を検証するプロキシ経由の安定したURLとして配布するGateway。
//!
//! ## 役割
//! - 固定リソースに対する読み取り専用の署名付きURL発行
//! - リクエストと同一オリジンのフレンドリーURLへの埋め込み
//! - アクセス時のホスト許可リスト照合と有効期限検証
//! - 検証済みURLへのリダイレクト
//!
//! ## API エンドポイント
//! - `GET /api/generateFileLink` — フレンドリーURL発行（平文）
//! - `GET /api/fileProxy?originalUrl=...` — 302リダイレクト、または無効リンクページ

mod config;
mod endpoints;
mod error;
mod storage;

use std::sync::Arc;

use config::{GatewayConfig, GatewayState};
use storage::AzureBlobStorage;

// ---------------------------------------------------------------------------
// エントリポイント
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // 環境変数の読み込み
    let config = GatewayConfig::from_env()?;
    tracing::info!(
        resource = %config.resource,
        storage_host = %config.storage_host,
        account = %config.storage_account.account_name,
        link_ttl_secs = config.link_ttl.num_seconds(),
        "設定を読み込みました"
    );

    // 署名付きURLの発行元（共有キーによるサービスSAS）
    let blob_storage = AzureBlobStorage::new(config.storage_account.clone());

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(GatewayState {
        config,
        blob_storage: Box::new(blob_storage),
    });

    let app = endpoints::router(state);

    tracing::info!("Gatewayを {} で起動します", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
