//! `mint` サブコマンド

use anyhow::Context;
use chrono::{Duration, Utc};
use saslink_core::{
    blob_service_sas_url, build_friendly_url, RequestOrigin, StorageAccount, FILE_PROXY_ROUTE,
};
use saslink_types::{AccessGrant, BlobPermissions, BlobResource};

/// 署名付きURLを発行し、`origin` があればフレンドリーURLに包んで返す。
pub fn run_mint(
    connection_string: &str,
    resource: BlobResource,
    ttl_secs: u32,
    permissions: BlobPermissions,
    origin: Option<&str>,
) -> anyhow::Result<String> {
    let account = StorageAccount::from_connection_string(connection_string)
        .context("接続文字列の読み込みに失敗しました")?;
    let grant = AccessGrant::new(
        resource,
        Utc::now(),
        Duration::seconds(i64::from(ttl_secs)),
        permissions,
    )?;
    let signed = blob_service_sas_url(&account, &grant)?;

    match origin {
        Some(origin) => {
            let origin = RequestOrigin::parse(origin)?;
            Ok(build_friendly_url(&origin, FILE_PROXY_ROUTE, &signed)?.to_string())
        }
        None => Ok(signed),
    }
}
