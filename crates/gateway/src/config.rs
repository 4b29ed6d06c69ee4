//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。
//!
//! | 環境変数 | 必須 | 既定値 |
//! |----------|------|--------|
//! | `STORAGE_ACCOUNT_CONNECTION_STRING` | ○ | – |
//! | `BLOB_RESOURCE_PATH` | ○ | – |
//! | `STORAGE_HOST` | | Blobエンドポイントのホスト |
//! | `LINK_TTL_SECS` | | `3600`（1〜31536000） |
//! | `BIND_ADDR` | | `0.0.0.0:3000` |
//! | `DEFAULT_SCHEME` | | `http` |
//! | `TRUST_FORWARDED_PROTO` | | `false` |

use anyhow::Context;
use saslink_core::StorageAccount;
use saslink_types::BlobResource;

use crate::storage::BlobStorage;

const DEFAULT_LINK_TTL_SECS: i64 = 3600;
/// `LINK_TTL_SECS` の上限（365日）
const MAX_LINK_TTL_SECS: i64 = 365 * 24 * 60 * 60;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SCHEME: &str = "http";

/// 起動時に確定するGateway設定。
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 署名に使うストレージアカウント
    pub storage_account: StorageAccount,
    /// リンクを発行する唯一のリソース
    pub resource: BlobResource,
    /// リダイレクトを許可するストレージホスト
    pub storage_host: String,
    /// 署名付きURLの有効期間
    pub link_ttl: chrono::Duration,
    /// 待ち受けアドレス
    pub bind_addr: String,
    /// リクエストがスキームを持たない場合に使うスキーム
    pub default_scheme: String,
    /// `X-Forwarded-Proto` をスキームとして信頼するか
    pub trust_forwarded_proto: bool,
}

impl GatewayConfig {
    /// 環境変数から構築する。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から構築する。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let connection_string = lookup("STORAGE_ACCOUNT_CONNECTION_STRING")
            .context("STORAGE_ACCOUNT_CONNECTION_STRINGが設定されていません")?;
        let storage_account = StorageAccount::from_connection_string(&connection_string)
            .context("STORAGE_ACCOUNT_CONNECTION_STRINGが不正です")?;

        let resource = lookup("BLOB_RESOURCE_PATH")
            .context("BLOB_RESOURCE_PATHが設定されていません")?
            .parse::<BlobResource>()
            .context("BLOB_RESOURCE_PATHが不正です")?;

        let storage_host = match lookup("STORAGE_HOST").filter(|h| !h.trim().is_empty()) {
            Some(host) => host.trim().to_string(),
            None => storage_account
                .blob_host()
                .context("Blobエンドポイントからホストを決定できません")?
                .to_string(),
        };

        let ttl_secs = match lookup("LINK_TTL_SECS") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| (1..=MAX_LINK_TTL_SECS).contains(secs))
                .with_context(|| {
                    format!("LINK_TTL_SECSは1〜{MAX_LINK_TTL_SECS}の整数である必要があります: {v}")
                })?,
            None => DEFAULT_LINK_TTL_SECS,
        };
        let link_ttl = chrono::Duration::try_seconds(ttl_secs)
            .with_context(|| format!("LINK_TTL_SECSが範囲外です: {ttl_secs}"))?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let default_scheme = lookup("DEFAULT_SCHEME")
            .map(|s| s.trim().to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_SCHEME.to_string());
        if !matches!(default_scheme.as_str(), "http" | "https") {
            anyhow::bail!("DEFAULT_SCHEMEはhttpまたはhttpsである必要があります: {default_scheme}");
        }

        let trust_forwarded_proto = match lookup("TRUST_FORWARDED_PROTO") {
            Some(v) => parse_bool(&v)
                .with_context(|| format!("TRUST_FORWARDED_PROTOが不正です: {v}"))?,
            None => false,
        };

        Ok(Self {
            storage_account,
            resource,
            storage_host,
            link_ttl,
            bind_addr,
            default_scheme,
            trust_forwarded_proto,
        })
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Gatewayの共有状態。
pub struct GatewayState {
    /// 起動時設定
    pub config: GatewayConfig,
    /// 署名付きURLを発行するストレージ
    pub blob_storage: Box<dyn BlobStorage>,
}
